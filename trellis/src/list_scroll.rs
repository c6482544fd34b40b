//! Scrolling and selection for lists.
//!
//! The scroll offset always stays in `[0, max(content - visible, 0)]`, where
//! the content height is the row count times the row pitch. Keyboard
//! selection scrolls smoothly to keep the selected row a few rows away from
//! the window edges: each frame covers a fraction of the remaining distance
//! plus a minimum speed, never overshooting.

use crate::config::ScrollConfig;
use crate::event_queue::{Event, EventQueue};
use crate::id::ItemId;
use crate::input::{InputSnapshot, MouseButton, NamedKey};
use crate::item::List;
use crate::primitives::{Point, Rect};

impl List {
    pub fn content_height(&self, row_height: f32) -> f32 {
        self.rows.len() as f32 * row_height
    }

    /// Largest valid scroll offset for a window `visible_height` tall.
    pub fn max_scroll_top(&self, row_height: f32, visible_height: f32) -> f32 {
        (self.content_height(row_height) - visible_height).max(0.0)
    }

    pub fn set_scroll_top(&mut self, scroll_top: f32, row_height: f32, visible_height: f32) {
        let max = self.max_scroll_top(row_height, visible_height);
        self.scroll_top = if scroll_top.is_nan() {
            0.0
        } else {
            scroll_top.max(0.0).min(max)
        };
    }

    pub fn clamp_scroll(&mut self, row_height: f32, visible_height: f32) {
        self.set_scroll_top(self.scroll_top, row_height, visible_height);
    }
}

/// Drives one list's scroll offset and selection from input.
#[derive(Debug, Clone, Copy)]
pub struct ListScrollController<'a> {
    config: &'a ScrollConfig,
    row_height: f32,
    /// Visible window of the list.
    bounds: Rect,
}

impl<'a> ListScrollController<'a> {
    pub fn new(config: &'a ScrollConfig, list: &List, bounds: Rect, line_height: f32) -> Self {
        Self {
            config,
            row_height: list.row_height(line_height),
            bounds,
        }
    }

    #[inline]
    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn clamp(&self, list: &mut List) {
        list.clamp_scroll(self.row_height, self.bounds.height);
    }

    /// Apply wheel velocity. Positive velocity scrolls towards the top.
    pub fn scroll(&self, list: &mut List, velocity_y: f32) {
        let distance = self.config.wheel_speed * self.config.wheel_sensitivity * velocity_y;
        list.set_scroll_top(list.scroll_top - distance, self.row_height, self.bounds.height);
    }

    /// Rows moved by PageUp and PageDown.
    pub fn page_rows(&self) -> usize {
        if self.row_height <= 0.0 {
            return 1;
        }
        ((self.bounds.height / self.row_height).round() as usize).max(1)
    }

    /// Keyboard handling for the focused list. Returns true if an event was
    /// emitted.
    pub fn handle_keys(
        &self,
        id: ItemId,
        list: &mut List,
        input: &InputSnapshot,
        queue: &mut EventQueue,
    ) -> bool {
        let count = list.rows.len();
        let before = list.selected;
        let mut expand = false;

        if count > 0 {
            let last = count - 1;
            if input.fired(NamedKey::ArrowDown) {
                list.selected = Some(list.selected.map_or(0, |index| (index + 1) % count));
            }
            if input.fired(NamedKey::ArrowUp) {
                list.selected =
                    Some(list.selected.map_or(last, |index| (index + count - 1) % count));
            }
            if input.key(NamedKey::Home).tapped {
                list.selected = Some(0);
            }
            if input.key(NamedKey::End).tapped {
                list.selected = Some(last);
            }
            let page = self.page_rows();
            if input.key(NamedKey::PageUp).tapped {
                list.selected = Some(list.selected.map_or(0, |index| index.saturating_sub(page)));
            }
            if input.key(NamedKey::PageDown).tapped {
                let target = list.selected.map_or(page - 1, |index| index + page);
                list.selected = Some(target.min(last));
            }
        }

        if input.key(NamedKey::Space).tapped || input.key(NamedKey::Enter).tapped {
            expand = list.selected.is_some();
        }

        let emitted = match list.selected {
            Some(index) if expand || list.selected != before => {
                queue.emit(Event::ListSelection { id, index, expand });
                true
            }
            _ => false,
        };

        self.follow_selection(list);
        emitted
    }

    /// Move the scroll offset one step towards keeping the selected row
    /// inside the guard band.
    pub fn follow_selection(&self, list: &mut List) {
        let Some(index) = list.selected else {
            return;
        };
        let spacing = list.item_spacing;
        let item_top = self.row_height * index as f32 + spacing;
        let guard = self.config.guard_rows * self.row_height;

        let window_top = list.scroll_top + guard;
        let window_bottom = list.scroll_top + self.bounds.height - guard;
        let above = item_top - window_top;
        let below = item_top - window_bottom;

        let factor = self.config.follow_factor;
        let min_speed = self.config.follow_min_speed;
        let scroll_top = if above < 0.0 {
            let velocity = factor * above - min_speed;
            list.scroll_top + velocity.max(above)
        } else if below > 0.0 {
            let velocity = factor * below + min_speed;
            list.scroll_top + velocity.min(below)
        } else {
            return;
        };
        list.set_scroll_top(scroll_top, self.row_height, self.bounds.height);
    }

    /// Row under `pointer`, if it is inside the visible window.
    pub fn row_at(&self, list: &List, pointer: Point) -> Option<usize> {
        if !self.bounds.contains(pointer) {
            return None;
        }
        (0..list.rows.len()).find(|&index| {
            list.visible_row_bounds(index)
                .is_some_and(|rect| rect.contains(pointer))
        })
    }

    /// Pointer handling for the captor list: wheel scrolling and selecting
    /// the hovered row on a primary click.
    pub fn handle_pointer(
        &self,
        id: ItemId,
        list: &mut List,
        input: &InputSnapshot,
        queue: &mut EventQueue,
    ) {
        self.scroll(list, input.scroll_velocity().y);

        if !input.clicked(MouseButton::Left) {
            return;
        }
        if let Some(index) = list.hovered {
            list.selected = Some(index);
            queue.emit(Event::ListSelection {
                id,
                index,
                expand: true,
            });
        }
    }
}
