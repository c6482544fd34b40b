//! The item tree.
//!
//! An [`Item`] is one node of a retained UI: its geometry, sizing flags and a
//! kind-specific payload. Containers own their children; everything else
//! refers to items by [`ItemId`] and resolves them through [`Item::find`].

use crate::id::ItemId;
use crate::layout::{Alignment, Axis, Direction, Justification, Padding};
use crate::primitives::{Color, Rect, Size};
use crate::text_block::{Overflow, TextBlock};

#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    /// Position and size in viewport space, assigned by layout.
    pub bounds: Rect,
    /// Unconstrained preferred size from the last measurement.
    pub ideal: Size,
    /// Floor for both the ideal and the bound size.
    pub min: Size,
    /// Receives a share of leftover main-axis space.
    pub growable: bool,
    /// Never takes keyboard focus, even if its kind normally would.
    pub unfocusable: bool,
    pub kind: ItemKind,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    Button(Button),
    Container(Container),
    List(List),
    TextBlock(TextBlock),
    TextInput(TextInput),
}

impl Item {
    pub fn new(id: ItemId, kind: impl Into<ItemKind>) -> Self {
        let kind = kind.into();
        let growable = matches!(kind, ItemKind::List(_));
        Self {
            id,
            bounds: Rect::ZERO,
            ideal: Size::ZERO,
            min: Size::ZERO,
            growable,
            unfocusable: false,
            kind,
        }
    }

    pub fn growable(mut self, growable: bool) -> Self {
        self.growable = growable;
        self
    }

    pub fn unfocusable(mut self) -> Self {
        self.unfocusable = true;
        self
    }

    pub fn min_size(mut self, min: Size) -> Self {
        self.min = min;
        self
    }

    /// Buttons, lists and text inputs take focus unless flagged otherwise.
    pub fn is_focusable(&self) -> bool {
        !self.unfocusable
            && matches!(
                self.kind,
                ItemKind::Button(_) | ItemKind::List(_) | ItemKind::TextInput(_)
            )
    }

    pub fn children(&self) -> &[Item] {
        match &self.kind {
            ItemKind::Container(container) => &container.children,
            _ => &[],
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match &self.kind {
            ItemKind::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            ItemKind::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match &self.kind {
            ItemKind::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_text_input(&self) -> Option<&TextInput> {
        match &self.kind {
            ItemKind::TextInput(input) => Some(input),
            _ => None,
        }
    }

    /// The primary text of the item: a text block, a button label or the
    /// contents of a text input.
    pub fn text_block(&self) -> Option<&TextBlock> {
        match &self.kind {
            ItemKind::TextBlock(block) => Some(block),
            ItemKind::Button(button) => Some(&button.label),
            ItemKind::TextInput(input) => Some(&input.text),
            ItemKind::Container(_) | ItemKind::List(_) => None,
        }
    }

    pub fn text_block_mut(&mut self) -> Option<&mut TextBlock> {
        match &mut self.kind {
            ItemKind::TextBlock(block) => Some(block),
            ItemKind::Button(button) => Some(&mut button.label),
            ItemKind::TextInput(input) => Some(&mut input.text),
            ItemKind::Container(_) | ItemKind::List(_) => None,
        }
    }

    // =========================================================================
    // Tree queries
    // =========================================================================

    /// Find `id` in this subtree, depth first.
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            ItemKind::Container(container) => container
                .children
                .iter_mut()
                .find_map(|child| child.find_mut(id)),
            _ => None,
        }
    }

    /// Whether `id` is this item or one of its descendants.
    pub fn contains(&self, id: ItemId) -> bool {
        self.find(id).is_some()
    }

    /// Visit this item and every descendant in depth-first pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Item)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone)]
pub struct Button {
    pub label: TextBlock,
    pub enabled: bool,
    /// Set while the pointer is over the button.
    pub hovered: bool,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: TextBlock::new(label).padding(Padding::symmetric(8.0, 4.0)),
            enabled: true,
            hovered: false,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.label.padding = padding;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Container {
    pub padding: Padding,
    pub background: Color,
    pub children: Vec<Item>,
    pub axis: Axis,
    pub direction: Direction,
    pub justification: Justification,
    pub alignment: Alignment,
}

impl Container {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            ..Self::default()
        }
    }

    /// Children side by side.
    pub fn row() -> Self {
        Self::new(Axis::Horizontal)
    }

    /// Children stacked top to bottom.
    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn justify(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn child(mut self, item: Item) -> Self {
        self.children.push(item);
        self
    }

    pub fn children(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.children.extend(items);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct List {
    pub rows: Vec<TextBlock>,
    /// Row rectangles in viewport space before scrolling, parallel to `rows`.
    pub row_bounds: Vec<Rect>,
    pub item_spacing: f32,
    pub side_margin: f32,
    /// How far the content is scrolled up, in pixels from the top.
    pub scroll_top: f32,
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

impl List {
    pub fn new<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> Self {
        Self {
            rows: rows.into_iter().map(Self::row).collect(),
            item_spacing: 2.0,
            side_margin: 4.0,
            ..Self::default()
        }
    }

    /// A single-line, ellipsized row.
    pub fn row(text: impl Into<String>) -> TextBlock {
        TextBlock::new(text)
            .padding(Padding::symmetric(4.0, 2.0))
            .overflow(Overflow::EllipsizeEnd)
    }

    pub fn item_spacing(mut self, spacing: f32) -> Self {
        self.item_spacing = spacing;
        self
    }

    pub fn side_margin(mut self, margin: f32) -> Self {
        self.side_margin = margin;
        self
    }

    /// Distance from the top of one row to the top of the next.
    pub fn row_height(&self, line_height: f32) -> f32 {
        let padding = self.rows.first().map_or(0.0, |row| row.padding.vertical());
        padding + line_height + self.item_spacing
    }

    /// Row rectangle in viewport space with scrolling applied.
    pub fn visible_row_bounds(&self, index: usize) -> Option<Rect> {
        self.row_bounds
            .get(index)
            .map(|rect| Rect::new(rect.x, rect.y - self.scroll_top, rect.width, rect.height))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub text: TextBlock,
    /// Placeholder shown while the field is empty and unfocused.
    pub label: TextBlock,
    /// Byte index of the caret.
    pub cursor: usize,
    /// Byte index of the other end of the selection. Equal to `cursor` when
    /// nothing is selected.
    pub selection_start: usize,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        let padding = Padding::symmetric(4.0, 2.0);
        Self {
            text: TextBlock::new("").padding(padding),
            label: TextBlock::new(label).padding(padding),
            cursor: 0,
            selection_start: 0,
        }
    }

    /// Start with `text` and the caret at its end.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let padding = self.text.padding;
        self.text = TextBlock::new(text).padding(padding);
        self.cursor = self.text.len();
        self.selection_start = self.cursor;
        self
    }

    /// Selected byte range, ordered.
    pub fn selection(&self) -> std::ops::Range<usize> {
        self.cursor.min(self.selection_start)..self.cursor.max(self.selection_start)
    }

    pub fn has_selection(&self) -> bool {
        self.cursor != self.selection_start
    }
}

impl From<Button> for ItemKind {
    fn from(button: Button) -> Self {
        ItemKind::Button(button)
    }
}

impl From<Container> for ItemKind {
    fn from(container: Container) -> Self {
        ItemKind::Container(container)
    }
}

impl From<List> for ItemKind {
    fn from(list: List) -> Self {
        ItemKind::List(list)
    }
}

impl From<TextBlock> for ItemKind {
    fn from(block: TextBlock) -> Self {
        ItemKind::TextBlock(block)
    }
}

impl From<TextInput> for ItemKind {
    fn from(input: TextInput) -> Self {
        ItemKind::TextInput(input)
    }
}
