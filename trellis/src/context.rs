//! The UI context: owner of every toplevel and of the per-frame state.
//!
//! A host creates one [`Context`], builds toplevel containers out of items,
//! then once per frame lays them out, feeds an [`InputSnapshot`] through
//! [`Context::update`], drains the event queue and draws.
//!
//! ```text
//! lay_out -> update(input) -> drain events -> draw
//! ```
//!
//! Everything runs on the caller's thread. Items refer to each other only by
//! [`ItemId`], so focus and capture survive any edit of the tree and are
//! cleared explicitly when the items they point at go away.

use crate::breaks::{BreakService, UnicodeBreaks, clamp_to_char_boundary};
use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::event_queue::{Event, EventQueue};
use crate::focus::{
    CaptureState, FocusState, build_tab_list, capture_target, clear_hover, detect_hover,
    focus_target, next_in_tab_order, scope_of, topmost_at,
};
use crate::font::FontService;
use crate::id::{IdSeed, ItemId};
use crate::input::{CursorShape, InputSnapshot, MouseButton, NamedKey, Platform};
use crate::item::{Button, Container, Item, ItemKind, List, TextInput};
use crate::layout::{self, Axis, LayoutContext};
use crate::list_scroll::ListScrollController;
use crate::primitives::{Point, Rect, Size};
use crate::render::{self, DrawList};
use crate::text_block::TextBlock;
use crate::text_editor::TextEditor;
use crate::typeset::Typesetter;

pub struct Context {
    config: UiConfig,
    queue: EventQueue,
    seed: IdSeed,
    focus: FocusState,
    capture: CaptureState,
    /// Toplevel containers in creation order. Later ones sit on top.
    toplevels: Vec<Item>,
    /// Focusable items in tab order, rebuilt every update.
    tab_list: Vec<ItemId>,
    anything_hovered: bool,
    viewport: Size,
    font: Box<dyn FontService>,
    breaks: Box<dyn BreakService>,
}

impl Context {
    pub fn new(config: UiConfig, font: impl FontService + 'static) -> Self {
        let queue = EventQueue::new(config.event_queue_capacity);
        Self {
            config,
            queue,
            seed: IdSeed::new(),
            focus: FocusState::Unfocused,
            capture: CaptureState::None,
            toplevels: Vec::new(),
            tab_list: Vec::new(),
            anything_hovered: false,
            viewport: Size::ZERO,
            font: Box::new(font),
            breaks: Box::new(UnicodeBreaks),
        }
    }

    /// Replace the default `unicode-segmentation` boundary detection.
    pub fn with_break_service(mut self, breaks: impl BreakService + 'static) -> Self {
        self.breaks = Box::new(breaks);
        self
    }

    #[inline]
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn font(&self) -> &dyn FontService {
        self.font.as_ref()
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    #[inline]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Wrap `kind` in an item with a fresh id. The item lives nowhere until it
    /// is added to a container or becomes a toplevel.
    pub fn create_item(&mut self, kind: impl Into<ItemKind>) -> Item {
        Item::new(self.seed.generate(), kind)
    }

    pub fn button(&mut self, label: impl Into<String>) -> Item {
        self.create_item(Button::new(label))
    }

    pub fn text_block(&mut self, text: impl Into<String>) -> Item {
        self.create_item(TextBlock::new(text))
    }

    /// An empty text input showing `label` until something is typed.
    pub fn text_input(&mut self, label: impl Into<String>) -> Item {
        self.create_item(TextInput::new(label))
    }

    pub fn list<S: Into<String>>(&mut self, rows: impl IntoIterator<Item = S>) -> Item {
        self.create_item(List::new(rows))
    }

    pub fn create_toplevel_container(&mut self, container: Container) -> ItemId {
        let item = self.create_item(container);
        let id = item.id;
        self.toplevels.push(item);
        tracing::debug!(%id, toplevels = self.toplevels.len(), "created toplevel");
        id
    }

    /// Remove a toplevel and its subtree. Focus and capture inside it are
    /// released first, with a focus change event when focus was there.
    pub fn destroy_toplevel_container(&mut self, id: ItemId) -> Result<()> {
        let Some(index) = self.toplevels.iter().position(|toplevel| toplevel.id == id) else {
            tracing::warn!(%id, "destroying unknown toplevel");
            return Err(UiError::UnknownItem(id));
        };
        self.release_within(index);
        self.toplevels.remove(index);
        tracing::debug!(%id, toplevels = self.toplevels.len(), "destroyed toplevel");
        Ok(())
    }

    pub fn toplevels(&self) -> &[Item] {
        &self.toplevels
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.toplevels.iter().find_map(|toplevel| toplevel.find(id))
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        find_item_mut(&mut self.toplevels, id)
    }

    /// Replace the text of a text block, button label or text input. A text
    /// input keeps its cursor and selection, clamped to the new text.
    pub fn set_text(&mut self, id: ItemId, text: &str) -> Result<()> {
        let typesetter =
            Typesetter::new(self.font.as_ref(), self.breaks.as_ref(), &self.config.ellipsis);
        let item = find_item_mut(&mut self.toplevels, id).ok_or(UiError::UnknownItem(id))?;
        let bounds = item.bounds;
        let block = item.text_block_mut().ok_or(UiError::NotText(id))?;
        block.set_text(text)?;
        if bounds.width > 0.0 {
            typesetter.measure_bound(block, bounds.size())?;
        } else {
            typesetter.measure_ideal(block)?;
        }

        if let ItemKind::TextInput(input) = &mut item.kind {
            let len = input.text.len();
            input.cursor = clamp_to_char_boundary(input.text.text(), input.cursor.min(len));
            input.selection_start =
                clamp_to_char_boundary(input.text.text(), input.selection_start.min(len));
        }
        Ok(())
    }

    /// Replace the rows of a list. Selection survives if it is still in range.
    pub fn set_list_rows<S: Into<String>>(
        &mut self,
        id: ItemId,
        rows: impl IntoIterator<Item = S>,
    ) -> Result<()> {
        let item = find_item_mut(&mut self.toplevels, id).ok_or(UiError::UnknownItem(id))?;
        let ItemKind::List(list) = &mut item.kind else {
            return Err(UiError::NotAList(id));
        };
        list.rows = rows.into_iter().map(List::row).collect();
        list.row_bounds.clear();
        list.hovered = None;
        list.selected = list.selected.filter(|&index| index < list.rows.len());
        Ok(())
    }

    /// Drop the children of a container or the rows of a list. Focus and
    /// capture held by a dropped child are released first.
    pub fn empty_item(&mut self, id: ItemId) -> Result<()> {
        self.release_children(id)?;
        let item = find_item_mut(&mut self.toplevels, id).ok_or(UiError::UnknownItem(id))?;
        match &mut item.kind {
            ItemKind::Container(container) => container.children.clear(),
            ItemKind::List(list) => {
                list.rows.clear();
                list.row_bounds.clear();
                list.hovered = None;
                list.selected = None;
                list.scroll_top = 0.0;
            }
            _ => return Err(UiError::NotAContainer(id)),
        }
        Ok(())
    }

    /// Make `id` a row holding `children`, replacing what it held before.
    pub fn add_row(&mut self, id: ItemId, children: impl IntoIterator<Item = Item>) -> Result<()> {
        self.replace_children(id, Axis::Horizontal, children)
    }

    /// Make `id` a column holding `children`, replacing what it held before.
    pub fn add_column(
        &mut self,
        id: ItemId,
        children: impl IntoIterator<Item = Item>,
    ) -> Result<()> {
        self.replace_children(id, Axis::Vertical, children)
    }

    fn replace_children(
        &mut self,
        id: ItemId,
        axis: Axis,
        children: impl IntoIterator<Item = Item>,
    ) -> Result<()> {
        self.release_children(id)?;
        let item = find_item_mut(&mut self.toplevels, id).ok_or(UiError::UnknownItem(id))?;
        let container = item.as_container_mut().ok_or(UiError::NotAContainer(id))?;
        container.axis = axis;
        container.children.clear();
        container.children.extend(children);
        Ok(())
    }

    /// Release focus and capture held strictly below `id`.
    fn release_children(&mut self, id: ItemId) -> Result<()> {
        let item = self.item(id).ok_or(UiError::UnknownItem(id))?;
        let below = |target: Option<ItemId>| {
            target.is_some_and(|target| target != id && item.contains(target))
        };
        let drop_focus = below(self.focus.focused());
        let drop_capture = below(self.capture.captured_by());
        if drop_focus {
            self.focus_on(None);
        }
        if drop_capture {
            self.capture_on(CaptureState::None);
        }
        Ok(())
    }

    /// Release focus and capture held anywhere in toplevel `index`.
    fn release_within(&mut self, index: usize) {
        let toplevel = &self.toplevels[index];
        let drop_focus = self.focus.focused().is_some_and(|target| toplevel.contains(target));
        let drop_capture =
            self.capture.captured_by().is_some_and(|target| toplevel.contains(target));
        if drop_focus {
            self.focus_on(None);
        }
        if drop_capture {
            self.capture_on(CaptureState::None);
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Size and place `id` and its subtree inside `space`.
    pub fn lay_out(&mut self, id: ItemId, space: Rect) -> Result<()> {
        let typesetter =
            Typesetter::new(self.font.as_ref(), self.breaks.as_ref(), &self.config.ellipsis);
        let item = find_item_mut(&mut self.toplevels, id).ok_or(UiError::UnknownItem(id))?;
        let mut ctx = LayoutContext::new(typesetter);
        layout::lay_out(item, space, &mut ctx)
    }

    // =========================================================================
    // Focus and capture
    // =========================================================================

    #[inline]
    pub fn focused(&self) -> Option<ItemId> {
        self.focus.focused()
    }

    #[inline]
    pub fn captor(&self) -> Option<ItemId> {
        self.capture.captured_by()
    }

    /// Whether the pointer was over something interactive in the last update.
    #[inline]
    pub fn anything_hovered(&self) -> bool {
        self.anything_hovered
    }

    /// Move keyboard focus, emitting a focus change event. `None` clears it.
    pub fn set_focus(&mut self, id: Option<ItemId>) -> Result<()> {
        if let Some(id) = id {
            if self.item(id).is_none() {
                tracing::warn!(%id, "focusing unknown item");
                return Err(UiError::UnknownItem(id));
            }
        }
        self.focus_on(id);
        Ok(())
    }

    fn focus_on(&mut self, target: Option<ItemId>) {
        let previous = self.focus.focused();
        if previous == target {
            return;
        }
        self.focus = FocusState::from_item(target);
        let scope = target.and_then(|id| scope_of(&self.toplevels, id));
        tracing::debug!(?previous, ?target, ?scope, "focus changed");
        self.queue.emit(Event::FocusChange {
            now_focused: target,
            now_unfocused: previous,
            scope,
        });
    }

    fn capture_on(&mut self, capture: CaptureState) {
        if self.capture != capture {
            tracing::debug!(previous = ?self.capture, now = ?capture, "capture changed");
            self.capture = capture;
        }
    }

    // =========================================================================
    // Frame update
    // =========================================================================

    /// Run one frame of input through the tree.
    ///
    /// Order matters: a click first moves focus, the focused item then gets
    /// the keyboard, hover and capture are resolved, the captor gets the
    /// pointer, and Tab runs last so it acts on the focus of this frame.
    pub fn update(&mut self, input: &InputSnapshot, platform: &mut dyn Platform) -> Result<()> {
        build_tab_list(&self.toplevels, &mut self.tab_list);

        let pointer = input.pointer();
        let topmost = topmost_at(&self.toplevels, pointer);
        let clicked = input.any_clicked();

        if clicked {
            match topmost {
                Some(index) => {
                    if let Some(target) = focus_target(&self.toplevels[index], pointer) {
                        self.focus_on(Some(target));
                    }
                }
                None => self.focus_on(None),
            }
        }

        if let Some(focused) = self.focus.focused() {
            self.dispatch_keys(focused, input, platform)?;
        }

        self.toplevels.iter_mut().for_each(clear_hover);
        self.anything_hovered = false;
        match topmost {
            Some(index) => {
                platform.set_cursor(CursorShape::Arrow);
                self.anything_hovered = detect_hover(&mut self.toplevels[index], pointer, platform);
                if clicked {
                    let captor = capture_target(&self.toplevels[index], pointer);
                    self.capture_on(CaptureState::Captured(captor));
                }
            }
            None if clicked => self.capture_on(CaptureState::None),
            None => {}
        }

        if let Some(captor) = self.capture.captured_by() {
            self.dispatch_pointer(captor, input, platform)?;
        }

        let tab = input.key(NamedKey::Tab);
        if tab.fired() {
            let next = next_in_tab_order(&self.tab_list, self.focus.focused(), tab.modifiers.shift);
            if let Some(next) = next {
                self.focus_on(Some(next));
            }
        }
        Ok(())
    }

    fn dispatch_keys(
        &mut self,
        id: ItemId,
        input: &InputSnapshot,
        platform: &mut dyn Platform,
    ) -> Result<()> {
        let line_height = self.font.line_height();
        let typesetter =
            Typesetter::new(self.font.as_ref(), self.breaks.as_ref(), &self.config.ellipsis);
        let Some(item) = find_item_mut(&mut self.toplevels, id) else {
            tracing::warn!(%id, "focused item is gone");
            self.focus = FocusState::Unfocused;
            return Ok(());
        };
        let bounds = item.bounds;

        match &mut item.kind {
            ItemKind::Button(button) => {
                let activated =
                    input.key(NamedKey::Space).tapped || input.key(NamedKey::Enter).tapped;
                if button.enabled && activated {
                    self.queue.emit(Event::Button { id });
                }
            }
            ItemKind::List(list) => {
                let controller =
                    ListScrollController::new(&self.config.scroll, list, bounds, line_height);
                controller.handle_keys(id, list, input, &mut self.queue);
            }
            ItemKind::TextInput(text_input) => {
                TextEditor::new(id, text_input, bounds, typesetter, &mut self.queue)
                    .within_viewport(self.viewport)
                    .handle_keys(input, platform)?;
            }
            ItemKind::Container(_) | ItemKind::TextBlock(_) => {}
        }
        Ok(())
    }

    fn dispatch_pointer(
        &mut self,
        id: ItemId,
        input: &InputSnapshot,
        platform: &mut dyn Platform,
    ) -> Result<()> {
        let line_height = self.font.line_height();
        let typesetter =
            Typesetter::new(self.font.as_ref(), self.breaks.as_ref(), &self.config.ellipsis);
        let Some(item) = find_item_mut(&mut self.toplevels, id) else {
            tracing::warn!(%id, "captor is gone");
            self.capture = CaptureState::None;
            return Ok(());
        };
        let bounds = item.bounds;

        match &mut item.kind {
            ItemKind::Button(button) => {
                if button.hovered && button.enabled && input.clicked(MouseButton::Left) {
                    self.queue.emit(Event::Button { id });
                }
            }
            ItemKind::List(list) => {
                let controller =
                    ListScrollController::new(&self.config.scroll, list, bounds, line_height);
                controller.handle_pointer(id, list, input, &mut self.queue);
            }
            ItemKind::TextInput(text_input) => {
                if input.pressed(MouseButton::Left) {
                    let extend = !input.clicked(MouseButton::Left);
                    let mut editor =
                        TextEditor::new(id, text_input, bounds, typesetter, &mut self.queue)
                            .within_viewport(self.viewport);
                    let prior_cursor = editor.cursor();
                    editor.place_at(input.pointer(), extend);
                    if editor.cursor() != prior_cursor {
                        editor.update_ime_anchor(platform);
                    }
                }
            }
            ItemKind::Container(_) | ItemKind::TextBlock(_) => {}
        }
        Ok(())
    }

    /// Insert clipboard text delivered by the host after a paste request.
    /// Does nothing unless a text input has focus.
    pub fn accept_paste_from_clipboard(
        &mut self,
        text: &str,
        platform: &mut dyn Platform,
    ) -> Result<()> {
        let Some(id) = self.focus.focused() else {
            return Ok(());
        };
        let typesetter =
            Typesetter::new(self.font.as_ref(), self.breaks.as_ref(), &self.config.ellipsis);
        let Some(item) = find_item_mut(&mut self.toplevels, id) else {
            return Ok(());
        };
        let bounds = item.bounds;
        let ItemKind::TextInput(text_input) = &mut item.kind else {
            return Ok(());
        };

        tracing::debug!(%id, bytes = text.len(), "accepting paste");
        let mut editor = TextEditor::new(id, text_input, bounds, typesetter, &mut self.queue)
            .within_viewport(self.viewport);
        editor.insert(text)?;
        editor.update_ime_anchor(platform);
        Ok(())
    }

    // =========================================================================
    // Events and drawing
    // =========================================================================

    pub fn dequeue_event(&mut self) -> Option<Event> {
        self.queue.dequeue()
    }

    /// Everything produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain()
    }

    /// Draw commands for the current frame. With a viewport set, everything
    /// is clipped to it.
    pub fn draw(&self) -> DrawList {
        let list = render::draw(&self.toplevels, self.focus, &self.config, self.font.as_ref());
        if self.viewport == Size::ZERO {
            return list;
        }
        let mut clipped = DrawList::new();
        clipped.push_clip(Rect::from_origin_size(Point::ORIGIN, self.viewport));
        clipped.extend(list);
        clipped.pop_clip();
        clipped
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("focus", &self.focus)
            .field("capture", &self.capture)
            .field("toplevels", &self.toplevels.len())
            .field("queued_events", &self.queue.len())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

fn find_item_mut(toplevels: &mut [Item], id: ItemId) -> Option<&mut Item> {
    toplevels.iter_mut().find_map(|toplevel| toplevel.find_mut(id))
}
