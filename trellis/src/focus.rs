//! Keyboard focus, pointer capture, hover and tab order.
//!
//! Focus and capture are independent: focus decides who receives keyboard
//! input, capture who receives pointer input. Both only ever hold an
//! [`ItemId`], so removing an item makes a stale reference a failed lookup
//! rather than a dangling one; the context still clears them first.
//!
//! Hit testing starts at the topmost toplevel containing the pointer (the
//! last one in creation order) and descends through children that contain it.

use crate::id::ItemId;
use crate::input::{CursorShape, Platform};
use crate::item::{Item, ItemKind};
use crate::primitives::Point;

/// Which item receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Unfocused,
    Focused(ItemId),
}

impl FocusState {
    pub fn from_item(id: Option<ItemId>) -> Self {
        match id {
            Some(id) => FocusState::Focused(id),
            None => FocusState::Unfocused,
        }
    }

    pub fn focused(&self) -> Option<ItemId> {
        match self {
            FocusState::Focused(id) => Some(*id),
            FocusState::Unfocused => None,
        }
    }

    pub fn is_focused(&self, id: ItemId) -> bool {
        self.focused() == Some(id)
    }
}

/// Which item receives pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// No capture.
    #[default]
    None,

    /// Captured by a specific item. Pointer input goes to it until another
    /// click moves the capture.
    Captured(ItemId),
}

impl CaptureState {
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureState::Captured(_))
    }

    pub fn captured_by(&self) -> Option<ItemId> {
        match self {
            CaptureState::Captured(id) => Some(*id),
            CaptureState::None => None,
        }
    }
}

/// Index of the topmost toplevel whose bounds contain `pointer`.
pub fn topmost_at(toplevels: &[Item], pointer: Point) -> Option<usize> {
    toplevels.iter().rposition(|item| item.bounds.contains(pointer))
}

/// Toplevel that holds `id`, used as the scope of a focus change.
pub fn scope_of(toplevels: &[Item], id: ItemId) -> Option<ItemId> {
    toplevels
        .iter()
        .find(|toplevel| toplevel.contains(id))
        .map(|toplevel| toplevel.id)
}

/// The focusable item under `pointer`, descending through containers. `None`
/// when the click lands on nothing that takes focus.
pub fn focus_target(item: &Item, pointer: Point) -> Option<ItemId> {
    match &item.kind {
        ItemKind::Container(container) => container
            .children
            .iter()
            .filter(|child| child.bounds.contains(pointer))
            .find_map(|child| focus_target(child, pointer)),
        _ if item.is_focusable() => Some(item.id),
        _ => None,
    }
}

/// The item that captures a click at `pointer`. Leaves always capture; a
/// container captures only when none of its children under the pointer do.
pub fn capture_target(item: &Item, pointer: Point) -> ItemId {
    match &item.kind {
        ItemKind::Container(container) => container
            .children
            .iter()
            .find(|child| child.bounds.contains(pointer))
            .map_or(item.id, |child| capture_target(child, pointer)),
        _ => item.id,
    }
}

/// Forget hover state in a subtree.
pub fn clear_hover(item: &mut Item) {
    match &mut item.kind {
        ItemKind::Button(button) => button.hovered = false,
        ItemKind::List(list) => list.hovered = None,
        ItemKind::Container(container) => container.children.iter_mut().for_each(clear_hover),
        ItemKind::TextBlock(_) | ItemKind::TextInput(_) => {}
    }
}

/// Mark what lies under `pointer` as hovered and ask the platform for a
/// matching cursor. Returns whether anything interactive was hit.
pub fn detect_hover(item: &mut Item, pointer: Point, platform: &mut dyn Platform) -> bool {
    let bounds = item.bounds;
    match &mut item.kind {
        ItemKind::Button(button) => {
            button.hovered = bounds.contains(pointer);
            if button.hovered {
                platform.set_cursor(if button.enabled {
                    CursorShape::Arrow
                } else {
                    CursorShape::ProhibitionSign
                });
            }
            button.hovered
        }
        ItemKind::Container(container) => {
            let mut detected = false;
            for child in &mut container.children {
                detected |= detect_hover(child, pointer, platform);
            }
            detected
        }
        ItemKind::List(list) => {
            list.hovered = (0..list.rows.len()).find(|&index| {
                list.visible_row_bounds(index)
                    .and_then(|row| row.intersection(&bounds))
                    .is_some_and(|row| row.contains(pointer))
            });
            if list.hovered.is_some() {
                platform.set_cursor(CursorShape::Arrow);
            }
            list.hovered.is_some()
        }
        ItemKind::TextInput(_) => {
            let hovered = bounds.contains(pointer);
            if hovered {
                platform.set_cursor(CursorShape::IBeam);
            }
            hovered
        }
        ItemKind::TextBlock(_) => false,
    }
}

/// Rebuild the tab order: focusable items of every toplevel, depth first.
pub fn build_tab_list(toplevels: &[Item], tab_list: &mut Vec<ItemId>) {
    tab_list.clear();
    for toplevel in toplevels {
        toplevel.walk(&mut |item| {
            if item.is_focusable() {
                tab_list.push(item.id);
            }
        });
    }
}

/// Item that Tab (or Shift+Tab when `backward`) moves focus to. Without
/// focus, Tab starts at the first item and Shift+Tab at the last. A focused
/// item missing from the tab list keeps focus.
pub fn next_in_tab_order(
    tab_list: &[ItemId],
    focused: Option<ItemId>,
    backward: bool,
) -> Option<ItemId> {
    let count = tab_list.len();
    if count == 0 {
        return None;
    }
    let Some(focused) = focused else {
        return if backward {
            tab_list.last().copied()
        } else {
            tab_list.first().copied()
        };
    };
    let found = tab_list.iter().position(|&id| id == focused)?;
    let index = if backward {
        (found + count - 1) % count
    } else {
        (found + 1) % count
    };
    Some(tab_list[index])
}
