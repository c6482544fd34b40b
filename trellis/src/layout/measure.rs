//! Sizing: ideal measurement, the fit test, growing and shrinking.

use super::context::LayoutContext;
use super::length::{Alignment, Axis};
use crate::error::Result;
use crate::item::{Container, Item, ItemKind};
use crate::primitives::Size;

/// Slack allowed when checking whether shrunk children fit.
const FIT_TOLERANCE: f32 = 1e-3;

/// Measure the unconstrained size of `item` and its subtree, storing the
/// result (floored by `item.min`) in `item.ideal`.
pub(super) fn measure_ideal(item: &mut Item, ctx: &mut LayoutContext<'_>) -> Result<Size> {
    let typesetter = ctx.typesetter;
    let ideal = match &mut item.kind {
        ItemKind::TextBlock(block) => typesetter.measure_ideal(block)?,
        ItemKind::Button(button) => typesetter.measure_ideal(&mut button.label)?,
        ItemKind::TextInput(input) => {
            let text = typesetter.measure_ideal(&mut input.text)?;
            let label = typesetter.measure_ideal(&mut input.label)?;
            text.max(label)
        }
        // A list wants all the room it can get, so its content never
        // constrains its siblings.
        ItemKind::List(_) => Size::INFINITE,
        ItemKind::Container(container) => {
            let main = container.axis;
            let cross = main.cross();
            let mut main_length = 0.0;
            let mut cross_length: f32 = 0.0;
            for child in &mut container.children {
                let size = measure_ideal(child, ctx)?;
                main_length += main.of(size);
                cross_length = cross_length.max(cross.of(size));
            }
            main.size(
                main_length + container.padding.along(main),
                cross_length + container.padding.along(cross),
            )
        }
    };
    item.ideal = ideal.max(item.min);
    Ok(item.ideal)
}

/// Size a layout root. The root takes the full main-axis length of `space`
/// when its children fit, and its ideal cross length.
pub(super) fn size_root(item: &mut Item, space: Size, ctx: &mut LayoutContext<'_>) -> Result<()> {
    let ideal = item.ideal;
    let min = item.min;
    let growable = item.growable;

    let ItemKind::Container(container) = &mut item.kind else {
        return size_item(item, space, ctx);
    };

    let main = container.axis;
    let (ideal_length, available) = fit_lengths(container, space);
    let size = if ideal_length <= available {
        let size = main.size(main.of(space), main.cross().of(ideal));
        grow(container, size, ctx)?;
        size
    } else {
        let shrink = shrink_factor(&container.children, main, available, &mut ctx.clamped);
        let mut bound = measure_bound(container, space, shrink, main, ctx)?.max(min);
        if growable {
            main.set(&mut bound, main.of(space));
        }
        bound
    };
    item.bounds.set_size(size);
    Ok(())
}

/// Give `item` exactly `space` and size its subtree to match.
fn size_item(item: &mut Item, space: Size, ctx: &mut LayoutContext<'_>) -> Result<()> {
    item.bounds.set_size(space);
    let typesetter = ctx.typesetter;
    match &mut item.kind {
        ItemKind::Container(container) => {
            let main = container.axis;
            let (ideal_length, available) = fit_lengths(container, space);
            if ideal_length <= available {
                grow(container, space, ctx)?;
            } else {
                let shrink = shrink_factor(&container.children, main, available, &mut ctx.clamped);
                measure_bound(container, space, shrink, main, ctx)?;
            }
        }
        ItemKind::TextBlock(block) => {
            typesetter.measure_bound(block, space)?;
        }
        ItemKind::Button(button) => {
            typesetter.measure_bound(&mut button.label, space)?;
        }
        ItemKind::TextInput(input) => {
            typesetter.measure_bound(&mut input.text, space)?;
            typesetter.measure_bound(&mut input.label, space)?;
        }
        ItemKind::List(_) => {}
    }
    Ok(())
}

/// Sum of the children's ideal main lengths, and the main length available
/// inside the container's padding.
fn fit_lengths(container: &Container, space: Size) -> (f32, f32) {
    let main = container.axis;
    let ideal_length = container
        .children
        .iter()
        .map(|child| main.of(child.ideal))
        .sum();
    let available = main.of(space) - container.padding.along(main);
    (ideal_length, available)
}

/// Children fit: each gets its ideal main length, plus an equal share of the
/// leftover space if it is growable.
fn grow(container: &mut Container, size: Size, ctx: &mut LayoutContext<'_>) -> Result<()> {
    let main = container.axis;
    let cross = main.cross();
    let content = container.padding.deflate(size);

    let ideal_length: f32 = container
        .children
        .iter()
        .map(|child| main.of(child.ideal))
        .sum();
    let growable = container.children.iter().filter(|child| child.growable).count();
    let extra = if growable > 0 {
        (main.of(content) - ideal_length).max(0.0) / growable as f32
    } else {
        0.0
    };

    let stretch = container.alignment == Alignment::Stretch;
    for child in &mut container.children {
        let mut main_length = main.of(child.ideal);
        if child.growable {
            main_length += extra;
        }
        let cross_length = if stretch {
            cross.of(content)
        } else {
            cross.of(child.ideal)
        };
        size_item(child, main.size(main_length, cross_length), ctx)?;
    }
    Ok(())
}

/// Length along an axis after shrinking. Infinite ideals shrink to nothing
/// and rely on their minimum and on growing.
#[inline]
fn shrunk(shrink: f32, ideal: f32) -> f32 {
    if ideal.is_finite() { shrink * ideal } else { 0.0 }
}

/// Find the factor that scales `children`'s ideal lengths along `axis` to
/// fit `available`, honouring each child's minimum.
///
/// Children whose shrunk length falls below their minimum are clamped to it
/// and stay clamped; the factor is then recomputed from the remaining space.
/// Every round clamps at least one more child or stops, so the loop ends
/// after at most `children.len() + 1` rounds. If every child ends up at its
/// minimum and they still overflow, the overflow is accepted.
pub fn shrink_factor(
    children: &[Item],
    axis: Axis,
    available: f32,
    clamped: &mut Vec<bool>,
) -> f32 {
    let ideal_length: f32 = children.iter().map(|child| axis.of(child.ideal)).sum();
    if children.is_empty() || ideal_length <= 0.0 {
        return 1.0;
    }

    clamped.clear();
    clamped.resize(children.len(), false);

    let mut shrink = (available / ideal_length).max(0.0);
    loop {
        let mut fitted = 0.0;
        let mut min_filled = 0.0;
        let mut clamped_count = 0;
        let mut newly_clamped = false;

        for (child, is_clamped) in children.iter().zip(clamped.iter_mut()) {
            let min = axis.of(child.min);
            let length = shrunk(shrink, axis.of(child.ideal));
            if *is_clamped || length < min {
                newly_clamped |= !*is_clamped;
                *is_clamped = true;
                fitted += min;
                min_filled += min;
                clamped_count += 1;
            } else {
                fitted += length;
            }
        }

        if fitted - FIT_TOLERANCE <= available {
            break;
        }
        if clamped_count == children.len() || !newly_clamped {
            tracing::debug!(fitted, available, "children overflow at their minimum size");
            break;
        }
        shrink = ((available - min_filled) / (ideal_length - min_filled)).max(0.0);
    }
    shrink
}

/// Measure `container`'s children against their shrunk allotments and return
/// the container's resulting size, padding included.
///
/// Along `shrink_axis` every child gets `shrink` times its ideal length
/// (never less than its minimum) and keeps at least that much; text that
/// needs more room across lines keeps its measured length. Across
/// `shrink_axis` children get the container's content length and keep their
/// measured length.
fn measure_bound(
    container: &mut Container,
    space: Size,
    shrink: f32,
    shrink_axis: Axis,
    ctx: &mut LayoutContext<'_>,
) -> Result<Size> {
    let typesetter = ctx.typesetter;
    let main = container.axis;
    let cross = main.cross();
    let other = shrink_axis.cross();
    let content = container.padding.deflate(space);

    let mut main_length = 0.0;
    let mut cross_length: f32 = 0.0;

    for child in &mut container.children {
        let mut allotment = Size::ZERO;
        shrink_axis.set(&mut allotment, shrunk(shrink, shrink_axis.of(child.ideal)));
        other.set(&mut allotment, other.of(content));
        let allotment = allotment.max(child.min);

        let measured = match &mut child.kind {
            ItemKind::Container(nested) => {
                measure_bound(nested, allotment, shrink, shrink_axis, ctx)?
            }
            ItemKind::TextBlock(block) => typesetter.measure_bound(block, allotment)?,
            ItemKind::Button(button) => typesetter.measure_bound(&mut button.label, allotment)?,
            ItemKind::TextInput(input) => {
                let text = typesetter.measure_bound(&mut input.text, allotment)?;
                let label = typesetter.measure_bound(&mut input.label, allotment)?;
                text.max(label)
            }
            ItemKind::List(_) => allotment,
        };

        let mut size = Size::ZERO;
        let along = shrink_axis.of(allotment).max(shrink_axis.of(measured));
        shrink_axis.set(&mut size, along);
        other.set(&mut size, other.of(measured));
        let size = size.max(child.min);
        child.bounds.set_size(size);

        main_length += main.of(size);
        cross_length = cross_length.max(cross.of(size));
    }

    let mut result = main.size(
        main_length + container.padding.along(main),
        cross_length + container.padding.along(cross),
    );

    // Hand any space the shrunk children left unused to the growable ones.
    let leftover = main.of(space) - main.of(result);
    let growable = container.children.iter().filter(|child| child.growable).count();
    if leftover > 0.0 && growable > 0 {
        let extra = leftover / growable as f32;
        for child in container.children.iter_mut().filter(|child| child.growable) {
            let mut size = child.bounds.size();
            let grown = main.of(size) + extra;
            main.set(&mut size, grown);
            child.bounds.set_size(size);
        }
        main.set(&mut result, main.of(space));
    }

    if container.alignment == Alignment::Stretch {
        let stretched = cross.of(content).max(cross_length);
        for child in &mut container.children {
            let mut size = child.bounds.size();
            cross.set(&mut size, stretched);
            child.bounds.set_size(size);
        }
        cross.set(&mut result, stretched + container.padding.along(cross));
    }

    Ok(result)
}
