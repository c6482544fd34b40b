//! Placement: positions sized children inside their parent, top-down.

use super::context::LayoutContext;
use super::length::{Alignment, Axis, Direction, Justification};
use crate::error::{Result, UiError};
use crate::item::{Container, Item, ItemKind, List};
use crate::primitives::{Rect, Size};

/// Position the children of `item`, whose own bounds are already final, and
/// recurse into them.
pub(super) fn place(item: &mut Item, ctx: &mut LayoutContext<'_>) -> Result<()> {
    let bounds = item.bounds;
    match &mut item.kind {
        ItemKind::Container(container) => {
            place_children(container, bounds);
            for child in &mut container.children {
                place(child, ctx)?;
            }
        }
        ItemKind::List(list) => place_rows(list, bounds, ctx)?,
        ItemKind::Button(_) | ItemKind::TextBlock(_) | ItemKind::TextInput(_) => {}
    }
    Ok(())
}

fn place_children(container: &mut Container, bounds: Rect) {
    let count = container.children.len();
    if count == 0 {
        return;
    }
    let padding = container.padding;
    let main = container.axis;

    // Main axis endpoints and fill direction.
    let (first, last, forward) = match (main, container.direction) {
        (Axis::Horizontal, Direction::LeftToRight) => {
            (bounds.x + padding.start, bounds.right() - padding.end, true)
        }
        (Axis::Horizontal, Direction::RightToLeft) => {
            (bounds.right() - padding.start, bounds.x + padding.end, false)
        }
        (Axis::Vertical, _) => (bounds.y + padding.top, bounds.bottom() - padding.bottom, true),
    };
    let sign = if forward { 1.0 } else { -1.0 };
    let span = (last - first).abs();
    let used: f32 = container
        .children
        .iter()
        .map(|child| main.of(child.bounds.size()))
        .sum();

    let around = |slots: usize| ((span - used) / slots as f32).max(0.0);
    let (mut cursor, apart) = match container.justification {
        Justification::Start => (first, 0.0),
        Justification::End => (last - sign * used, 0.0),
        Justification::Center => ((first + last) * 0.5 - sign * used * 0.5, 0.0),
        Justification::SpaceBetween if count >= 2 => (first, around(count - 1)),
        Justification::SpaceAround | Justification::SpaceBetween => {
            let apart = around(count + 1);
            (first + sign * apart, apart)
        }
    };

    for child in &mut container.children {
        let length = main.of(child.bounds.size());
        let position = if forward { cursor } else { cursor - length };
        cursor += sign * (length + apart);
        match main {
            Axis::Horizontal => child.bounds.x = position,
            Axis::Vertical => child.bounds.y = position,
        }
    }

    // Cross axis: an anchor point plus a centering coefficient per child.
    let alignment = container.alignment;
    match main {
        Axis::Horizontal => {
            let top = bounds.y + padding.top;
            let bottom = bounds.bottom() - padding.bottom;
            let anchor = cross_anchor(alignment, top, bottom);
            for child in &mut container.children {
                child.bounds.y = anchor - alignment.centering() * child.bounds.height;
            }
        }
        Axis::Vertical => {
            let rtl = container.direction == Direction::RightToLeft;
            let (near, far) = if rtl {
                (bounds.right() - padding.start, bounds.x + padding.end)
            } else {
                (bounds.x + padding.start, bounds.right() - padding.end)
            };
            let anchor = cross_anchor(alignment, near, far);
            let centering = if rtl {
                1.0 - alignment.centering()
            } else {
                alignment.centering()
            };
            for child in &mut container.children {
                child.bounds.x = anchor - centering * child.bounds.width;
            }
        }
    }
}

fn cross_anchor(alignment: Alignment, near: f32, far: f32) -> f32 {
    match alignment {
        Alignment::Start | Alignment::Stretch => near,
        Alignment::End => far,
        Alignment::Center => (near + far) * 0.5,
    }
}

/// Lay out every row of `list` one below the other and keep the scroll
/// offset in range for the new size.
fn place_rows(list: &mut List, bounds: Rect, ctx: &mut LayoutContext<'_>) -> Result<()> {
    let typesetter = ctx.typesetter;
    let row_height = list.row_height(typesetter.line_height());
    let spacing = list.item_spacing;
    let margin = list.side_margin;

    list.row_bounds.clear();
    list.row_bounds
        .try_reserve_exact(list.rows.len())
        .map_err(|_| UiError::OutOfMemory {
            requested: list.rows.len() * std::mem::size_of::<Rect>(),
        })?;

    for (index, row) in list.rows.iter_mut().enumerate() {
        let rect = Rect::new(
            bounds.x + margin,
            bounds.y + spacing + index as f32 * row_height,
            (bounds.width - 2.0 * margin).max(0.0),
            row_height - spacing,
        );
        typesetter.measure_bound(row, Size::new(rect.width, rect.height))?;
        list.row_bounds.push(rect);
    }

    list.clamp_scroll(row_height, bounds.height);
    Ok(())
}
