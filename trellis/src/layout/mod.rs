//! Two-pass box layout over the item tree.
//!
//! ```text
//! measure ideal (bottom-up) -> fit test -> grow | shrink + bound measure -> place
//! ```
//!
//! Ideal sizes ignore the available space. A container whose children's
//! ideal lengths fit along its main axis hands leftover space to growable
//! children; otherwise every child is scaled by a common shrink factor and
//! measured again against its allotment, wrapping or ellipsizing text.

pub mod context;
pub mod length;
mod measure;
mod place;

pub use context::LayoutContext;
pub use length::{Alignment, Axis, Direction, Justification, Padding};
pub use measure::shrink_factor;

use crate::error::Result;
use crate::item::Item;
use crate::primitives::Rect;

/// Assign bounds to `item` and every descendant, fitting it into `space`.
pub fn lay_out(item: &mut Item, space: Rect, ctx: &mut LayoutContext<'_>) -> Result<()> {
    measure::measure_ideal(item, ctx)?;
    measure::size_root(item, space.size(), ctx)?;
    item.bounds.x = space.x;
    item.bounds.y = space.y;
    place::place(item, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaks::UnicodeBreaks;
    use crate::font::BitmapFont;
    use crate::id::ItemId;
    use crate::item::{Button, Container, List};
    use crate::primitives::{Point, Size};
    use crate::text_block::TextBlock;
    use crate::typeset::Typesetter;

    const CELL: f32 = 10.0;
    const LINE: f32 = 20.0;

    fn run(root: &mut Item, space: Rect) {
        let font = BitmapFont::monospace(CELL, LINE);
        let mut ctx = LayoutContext::new(Typesetter::new(&font, &UnicodeBreaks, "…"));
        lay_out(root, space, &mut ctx).unwrap();
    }

    fn label(id: u64, chars: usize) -> Item {
        Item::new(ItemId(id), Button::new("x".repeat(chars)).padding(Padding::default()))
    }

    fn widths(root: &Item) -> Vec<f32> {
        root.children().iter().map(|child| child.bounds.width).collect()
    }

    fn xs(root: &Item) -> Vec<f32> {
        root.children().iter().map(|child| child.bounds.x).collect()
    }

    #[test]
    fn shrinks_overflowing_children_proportionally() {
        let mut root = Item::new(
            ItemId(1),
            Container::row().child(label(2, 10)).child(label(3, 15)),
        );
        run(&mut root, Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(widths(&root), vec![80.0, 120.0]);
        assert_eq!(xs(&root), vec![0.0, 80.0]);
    }

    #[test]
    fn growable_children_consume_leftover_space() {
        let mut root = Item::new(
            ItemId(1),
            Container::row()
                .padding(Padding::all(5.0))
                .child(label(2, 3).growable(true))
                .child(label(3, 4))
                .child(label(4, 2).growable(true)),
        );
        run(&mut root, Rect::new(0.0, 0.0, 200.0, 100.0));
        let total: f32 = widths(&root).iter().sum();
        assert_eq!(total, 190.0);
        // 190 - 90 ideal = 100 split between two growable children.
        assert_eq!(widths(&root), vec![80.0, 40.0, 70.0]);
        assert_eq!(root.bounds.size(), Size::new(200.0, LINE + 10.0));
    }

    #[test]
    fn without_growable_children_ideal_lengths_are_kept() {
        let mut root = Item::new(ItemId(1), Container::row().child(label(2, 3)).child(label(3, 4)));
        run(&mut root, Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(widths(&root), vec![30.0, 40.0]);
    }

    #[test]
    fn justification_along_main_axis() {
        let place_with = |justification| {
            let mut root = Item::new(
                ItemId(1),
                Container::row()
                    .justify(justification)
                    .child(label(2, 2))
                    .child(label(3, 2)),
            );
            run(&mut root, Rect::new(0.0, 0.0, 100.0, 40.0));
            xs(&root)
        };
        assert_eq!(place_with(Justification::Start), vec![0.0, 20.0]);
        assert_eq!(place_with(Justification::End), vec![60.0, 80.0]);
        assert_eq!(place_with(Justification::Center), vec![30.0, 50.0]);
        assert_eq!(place_with(Justification::SpaceBetween), vec![0.0, 80.0]);
        assert_eq!(place_with(Justification::SpaceAround), vec![20.0, 60.0]);
    }

    #[test]
    fn space_between_with_one_child_centers_it() {
        let mut root = Item::new(
            ItemId(1),
            Container::row()
                .justify(Justification::SpaceBetween)
                .child(label(2, 2)),
        );
        run(&mut root, Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(xs(&root), vec![40.0]);
    }

    #[test]
    fn right_to_left_fills_from_the_right() {
        let mut root = Item::new(
            ItemId(1),
            Container::row()
                .direction(Direction::RightToLeft)
                .padding(Padding::new(5.0, 0.0, 0.0, 0.0))
                .child(label(2, 2))
                .child(label(3, 3)),
        );
        run(&mut root, Rect::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(xs(&root), vec![75.0, 45.0]);
    }

    #[test]
    fn cross_axis_alignment() {
        let place_with = |alignment| {
            let mut root = Item::new(
                ItemId(1),
                Container::column()
                    .align(alignment)
                    .child(label(2, 2))
                    .child(label(3, 6)),
            );
            run(&mut root, Rect::new(10.0, 0.0, 100.0, 100.0));
            root.children()
                .iter()
                .map(|child| (child.bounds.x, child.bounds.width))
                .collect::<Vec<_>>()
        };
        // The root keeps its ideal cross length: the widest child, 60.
        assert_eq!(place_with(Alignment::Start), vec![(10.0, 20.0), (10.0, 60.0)]);
        assert_eq!(place_with(Alignment::End), vec![(50.0, 20.0), (10.0, 60.0)]);
        assert_eq!(place_with(Alignment::Center), vec![(30.0, 20.0), (10.0, 60.0)]);
        assert_eq!(place_with(Alignment::Stretch), vec![(10.0, 60.0), (10.0, 60.0)]);
    }

    #[test]
    fn nested_children_are_placed_relative_to_parent() {
        let inner = Item::new(
            ItemId(2),
            Container::row()
                .padding(Padding::all(3.0))
                .child(label(3, 1)),
        );
        let mut root = Item::new(
            ItemId(1),
            Container::column().child(label(4, 1)).child(inner),
        );
        run(&mut root, Rect::new(7.0, 9.0, 100.0, 100.0));
        let leaf = root.find(ItemId(3)).unwrap();
        assert_eq!(leaf.bounds.origin(), Point::new(10.0, 9.0 + LINE + 3.0));
    }

    #[test]
    fn list_takes_remaining_space_and_lays_out_rows() {
        let list = Item::new(ItemId(2), List::new(["one", "two", "three"]));
        let mut root = Item::new(
            ItemId(1),
            Container::column()
                .align(Alignment::Stretch)
                .child(Item::new(ItemId(3), TextBlock::new("title")))
                .child(list),
        );
        run(&mut root, Rect::new(0.0, 0.0, 120.0, 200.0));

        let list = root.find(ItemId(2)).unwrap();
        assert_eq!(list.bounds, Rect::new(0.0, LINE, 120.0, 200.0 - LINE));
        let rows = &list.as_list().unwrap().row_bounds;
        // Row pitch: 4 vertical padding + line + 2 spacing.
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Rect::new(4.0, LINE + 2.0, 112.0, 24.0));
        assert_eq!(rows[1].y - rows[0].y, 26.0);
    }

    #[test]
    fn minimum_size_floors_ideal() {
        let mut root = Item::new(
            ItemId(1),
            Container::row().child(label(2, 1).min_size(Size::new(50.0, 30.0))),
        );
        run(&mut root, Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(root.children()[0].bounds.size(), Size::new(50.0, 30.0));
    }
}
