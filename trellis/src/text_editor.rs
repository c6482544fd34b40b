//! Editing operations on a text input.
//!
//! All positions are byte indices into the text. Indices coming from the
//! item are clamped and snapped to character boundaries before use, so the
//! editor keeps `min(cursor, selection_start) <= max(..) <= len` no matter
//! what state it is handed.
//!
//! Every operation that changes the text retypesets the block and emits a
//! single [`Event::TextChange`].

use crate::breaks::{clamp_to_char_boundary, next_codepoint, prior_codepoint};
use crate::error::Result;
use crate::event_queue::{Event, EventQueue};
use crate::id::ItemId;
use crate::input::{Hotkey, InputSnapshot, Modifiers, NamedKey, Platform};
use crate::item::TextInput;
use crate::primitives::{Point, Rect, Size};
use crate::typeset::Typesetter;

/// Borrowed view of one text input while it is being edited.
pub struct TextEditor<'a> {
    id: ItemId,
    input: &'a mut TextInput,
    /// Viewport bounds of the item, for wrapping and the IME anchor.
    bounds: Rect,
    /// Limits for the IME anchor. Zero means unbounded.
    viewport: Size,
    typesetter: Typesetter<'a>,
    queue: &'a mut EventQueue,
}

impl<'a> TextEditor<'a> {
    pub fn new(
        id: ItemId,
        input: &'a mut TextInput,
        bounds: Rect,
        typesetter: Typesetter<'a>,
        queue: &'a mut EventQueue,
    ) -> Self {
        let mut editor = Self {
            id,
            input,
            bounds,
            viewport: Size::ZERO,
            typesetter,
            queue,
        };
        editor.clamp_indices();
        editor
    }

    /// Keep the IME anchor inside `viewport`.
    pub fn within_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    #[inline]
    pub fn text(&self) -> &str {
        self.input.text.text()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.input.cursor
    }

    #[inline]
    pub fn selection_start(&self) -> usize {
        self.input.selection_start
    }

    fn clamp_indices(&mut self) {
        let text = self.input.text.text();
        self.input.cursor = clamp_to_char_boundary(text, self.input.cursor);
        self.input.selection_start = clamp_to_char_boundary(text, self.input.selection_start);
    }

    fn collapse_to(&mut self, index: usize) {
        self.input.cursor = index;
        self.input.selection_start = index;
    }

    /// Place the cursor, keeping the selection anchor when `extend` is set.
    fn move_to(&mut self, index: usize, extend: bool) {
        self.input.cursor = clamp_to_char_boundary(self.text(), index);
        if !extend {
            self.input.selection_start = self.input.cursor;
        }
    }

    // =========================================================================
    // Text changes
    // =========================================================================

    /// Replace the selection (or insert at the cursor) with `text`. Empty
    /// text is a no-op and leaves any selection alone.
    pub fn insert(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let selection = self.input.selection();
        let removed = self.input.text.splice(selection, text)?;
        let cursor = (removed.start + text.len()).min(self.input.text.len());
        self.collapse_to(cursor);
        self.text_changed()
    }

    /// Delete the selection, or the codepoint after the cursor.
    pub fn delete_forward(&mut self) -> Result<()> {
        let range = if self.input.has_selection() {
            self.input.selection()
        } else {
            let cursor = self.input.cursor;
            cursor..next_codepoint(self.text(), cursor)
        };
        self.delete(range)
    }

    /// Delete the selection, or the codepoint before the cursor.
    pub fn delete_backward(&mut self) -> Result<()> {
        let range = if self.input.has_selection() {
            self.input.selection()
        } else {
            let cursor = self.input.cursor;
            prior_codepoint(self.text(), cursor)..cursor
        };
        self.delete(range)
    }

    pub fn delete_selection(&mut self) -> Result<()> {
        let selection = self.input.selection();
        self.delete(selection)
    }

    fn delete(&mut self, range: std::ops::Range<usize>) -> Result<()> {
        if range.is_empty() {
            self.collapse_to(range.start);
            return Ok(());
        }
        let removed = self.input.text.splice(range, "")?;
        self.collapse_to(removed.start);
        self.text_changed()
    }

    fn text_changed(&mut self) -> Result<()> {
        self.retypeset()?;
        self.queue.emit(Event::TextChange { id: self.id });
        Ok(())
    }

    /// Typeset the text for the item's current width, or unconstrained if the
    /// item has not been laid out yet.
    pub fn retypeset(&mut self) -> Result<()> {
        if self.bounds.width > 0.0 {
            self.typesetter
                .measure_bound(&mut self.input.text, self.bounds.size())?;
        } else {
            self.typesetter.measure_ideal(&mut self.input.text)?;
        }
        Ok(())
    }

    // =========================================================================
    // Cursor movement
    // =========================================================================

    /// One grapheme cluster left, or to the start of the word with `ctrl`.
    pub fn move_left(&mut self, modifiers: Modifiers) {
        let breaks = self.typesetter.breaks();
        let cursor = self.input.cursor;
        let index = if modifiers.ctrl {
            breaks.prior_word_boundary(self.text(), cursor)
        } else {
            breaks.prior_grapheme_boundary(self.text(), cursor)
        };
        self.move_to(index, modifiers.shift);
    }

    /// One grapheme cluster right, or to the end of the word with `ctrl`.
    pub fn move_right(&mut self, modifiers: Modifiers) {
        let breaks = self.typesetter.breaks();
        let cursor = self.input.cursor;
        let index = if modifiers.ctrl {
            breaks.next_word_boundary(self.text(), cursor)
        } else {
            breaks.next_grapheme_boundary(self.text(), cursor)
        };
        self.move_to(index, modifiers.shift);
    }

    /// Move to the nearest caret position on the line above.
    pub fn move_up(&mut self, modifiers: Modifiers) {
        self.move_vertically(-1.0, modifiers);
    }

    /// Move to the nearest caret position on the line below.
    pub fn move_down(&mut self, modifiers: Modifiers) {
        self.move_vertically(1.0, modifiers);
    }

    fn move_vertically(&mut self, lines: f32, modifiers: Modifiers) {
        let font = self.typesetter.font();
        let line_height = font.line_height();
        let position = self.input.text.cursor_position(self.input.cursor, font);
        // Aim at the middle of the target row.
        let target = Point::new(position.x, position.y + lines * line_height + line_height * 0.5);
        if let Some(index) = self.input.text.index_at_position(target, font) {
            self.move_to(index, modifiers.shift);
        }
    }

    /// Start of the visual line, or of the text with `ctrl`.
    pub fn move_home(&mut self, modifiers: Modifiers) {
        let index = if modifiers.ctrl {
            0
        } else {
            self.input
                .text
                .line_begin(self.input.cursor, self.typesetter.font())
        };
        self.move_to(index, modifiers.shift);
    }

    /// End of the visual line, or of the text with `ctrl`.
    pub fn move_end(&mut self, modifiers: Modifiers) {
        let index = if modifiers.ctrl {
            self.input.text.len()
        } else {
            self.input
                .text
                .line_end(self.input.cursor, self.typesetter.font())
        };
        self.move_to(index, modifiers.shift);
    }

    /// Place the cursor at the glyph nearest to `point` (viewport space).
    /// Clicking collapses the selection there; dragging only moves the cursor.
    pub fn place_at(&mut self, point: Point, extend: bool) {
        let local = point - self.bounds.origin();
        if let Some(index) = self
            .input
            .text
            .index_at_position(local, self.typesetter.font())
        {
            self.move_to(index, extend);
        }
    }

    // =========================================================================
    // Selection and clipboard
    // =========================================================================

    pub fn select_all(&mut self) {
        self.input.selection_start = 0;
        self.input.cursor = self.input.text.len();
    }

    /// Copy the selection to the clipboard. Returns false if nothing was
    /// selected or the platform refused it.
    pub fn copy(&self, platform: &mut dyn Platform) -> bool {
        let selection = self.input.selection();
        if selection.is_empty() {
            return false;
        }
        let copied = platform.copy_to_clipboard(&self.text()[selection]);
        if !copied {
            tracing::warn!(id = %self.id, "clipboard rejected copied text");
        }
        copied
    }

    pub fn cut(&mut self, platform: &mut dyn Platform) -> Result<()> {
        if self.copy(platform) {
            self.delete_selection()?;
        }
        Ok(())
    }

    /// Paste arrives later through the host, see
    /// [`Context::accept_paste_from_clipboard`](crate::Context::accept_paste_from_clipboard).
    pub fn paste(&self, platform: &mut dyn Platform) {
        platform.request_paste();
    }

    /// Tell the input method where the caret is.
    pub fn update_ime_anchor(&self, platform: &mut dyn Platform) {
        let position = self
            .input
            .text
            .cursor_position(self.input.cursor, self.typesetter.font());
        let mut anchor = self.bounds.origin() + position;
        if self.viewport.width > 0.0 && self.viewport.height > 0.0 {
            anchor.x = anchor.x.clamp(0.0, self.viewport.width);
            anchor.y = anchor.y.clamp(0.0, self.viewport.height);
        }
        platform.set_ime_anchor(anchor);
    }

    // =========================================================================
    // Frame input
    // =========================================================================

    /// Apply this frame's keyboard input to the focused text input.
    pub fn handle_keys(
        &mut self,
        input: &InputSnapshot,
        platform: &mut dyn Platform,
    ) -> Result<()> {
        let prior_cursor = self.input.cursor;

        self.insert(input.composed_text())?;

        let key = input.key(NamedKey::ArrowLeft);
        if key.fired() {
            self.move_left(key.modifiers);
        }
        let key = input.key(NamedKey::ArrowRight);
        if key.fired() {
            self.move_right(key.modifiers);
        }
        let key = input.key(NamedKey::ArrowUp);
        if key.fired() {
            self.move_up(key.modifiers);
        }
        let key = input.key(NamedKey::ArrowDown);
        if key.fired() {
            self.move_down(key.modifiers);
        }
        let key = input.key(NamedKey::Home);
        if key.tapped {
            self.move_home(key.modifiers);
        }
        let key = input.key(NamedKey::End);
        if key.tapped {
            self.move_end(key.modifiers);
        }
        if input.fired(NamedKey::Delete) {
            self.delete_forward()?;
        }
        if input.fired(NamedKey::Backspace) {
            self.delete_backward()?;
        }

        if input.hotkey_pressed(Hotkey::SelectAll) {
            self.select_all();
        }
        if input.hotkey_pressed(Hotkey::Copy) {
            self.copy(platform);
        }
        if input.hotkey_pressed(Hotkey::Cut) {
            self.cut(platform)?;
        }
        if input.hotkey_pressed(Hotkey::Paste) {
            self.paste(platform);
        }

        if self.input.cursor != prior_cursor {
            self.update_ime_anchor(platform);
        }
        Ok(())
    }
}
