//! Draw-list generation.
//!
//! The core never touches a GPU. Drawing walks the toplevels in creation
//! order and records flat commands in viewport space: solid rectangles,
//! glyph quads that sample a font texture page, and a clip stack around
//! scrolled content. A renderer replays the list front to back.

use crate::config::{Theme, UiConfig};
use crate::focus::FocusState;
use crate::font::FontService;
use crate::item::{Button, Container, Item, ItemKind, List, TextInput};
use crate::primitives::{Color, Point, Rect, Size};
use crate::text_block::TextBlock;

/// One textured quad: where it lands and which part of the font page it
/// samples (normalised to the page size).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub rect: Rect,
    pub texture_rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A solid rectangle (sharp corners).
    Fill { rect: Rect, color: Color },

    /// Glyphs of one text block, all in one colour.
    Glyphs { quads: Vec<GlyphQuad>, color: Color },

    /// Intersect the clip region with `rect` until the matching pop.
    PushClip(Rect),

    PopClip,
}

/// Commands for one frame, in painting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn fill(&mut self, rect: Rect, color: Color) {
        if rect.width <= 0.0 || rect.height <= 0.0 || color.a <= 0.0 {
            return;
        }
        self.commands.push(DrawCommand::Fill { rect, color });
    }

    /// Quads for the visible glyphs of `block`, whose glyph rects are
    /// relative to `origin`.
    pub fn text(&mut self, block: &TextBlock, origin: Point, color: Color) {
        let quads: Vec<GlyphQuad> = block
            .glyphs()
            .iter()
            .filter(|glyph| glyph.is_visible())
            .map(|glyph| GlyphQuad {
                rect: glyph.rect.translate(origin),
                texture_rect: glyph.texture_rect,
            })
            .collect();
        if !quads.is_empty() {
            self.commands.push(DrawCommand::Glyphs { quads, color });
        }
    }

    /// Append every command of `other`.
    pub fn extend(&mut self, other: DrawList) {
        self.commands.extend(other.commands);
    }

    pub fn push_clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::PushClip(rect));
    }

    pub fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }
}

/// Record every toplevel of a frame, plus the focus frame around the focused
/// item inside the toplevel that holds it.
pub fn draw(
    toplevels: &[Item],
    focus: FocusState,
    config: &UiConfig,
    font: &dyn FontService,
) -> DrawList {
    let mut painter = Painter {
        config,
        theme: &config.theme,
        font,
        focus,
        out: DrawList::new(),
    };
    for toplevel in toplevels {
        painter.item(toplevel);
        if let Some(focused) = focus.focused().and_then(|id| toplevel.find(id)) {
            painter.focus_indicator(focused.bounds);
        }
    }
    painter.out
}

struct Painter<'a> {
    config: &'a UiConfig,
    theme: &'a Theme,
    font: &'a dyn FontService,
    focus: FocusState,
    out: DrawList,
}

impl Painter<'_> {
    fn item(&mut self, item: &Item) {
        match &item.kind {
            ItemKind::Container(container) => self.container(container, item.bounds),
            ItemKind::Button(button) => self.button(button, item.bounds),
            ItemKind::TextBlock(block) => {
                self.out.text(block, item.bounds.origin(), self.theme.text)
            }
            ItemKind::List(list) => self.rows(list, item.bounds),
            ItemKind::TextInput(input) => {
                self.text_input(input, item.bounds, self.focus.is_focused(item.id))
            }
        }
    }

    fn container(&mut self, container: &Container, bounds: Rect) {
        self.out.fill(bounds, container.background);
        for child in &container.children {
            self.item(child);
        }
    }

    fn button(&mut self, button: &Button, bounds: Rect) {
        let theme = self.theme;
        let (cap, label) = match (button.enabled, button.hovered) {
            (true, false) => (theme.button_cap_enabled, theme.button_label_enabled),
            (true, true) => (theme.button_cap_hovered_enabled, theme.button_label_enabled),
            (false, false) => (theme.button_cap_disabled, theme.button_label_disabled),
            (false, true) => (theme.button_cap_hovered_disabled, theme.button_label_disabled),
        };
        self.out.fill(bounds, cap);
        self.out.text(&button.label, bounds.origin(), label);
    }

    fn rows(&mut self, list: &List, bounds: Rect) {
        self.out.push_clip(bounds);

        if let Some(hovered) = list.hovered.filter(|&index| Some(index) != list.selected) {
            if let Some(row) = list.visible_row_bounds(hovered) {
                self.out.fill(row, self.theme.list_item_background_hovered);
            }
        }
        if let Some(row) = list.selected.and_then(|index| list.visible_row_bounds(index)) {
            self.out.fill(row, self.theme.list_item_background_selected);
        }

        for (index, row) in list.rows.iter().enumerate() {
            let Some(rect) = list.visible_row_bounds(index) else {
                continue;
            };
            if rect.intersection(&bounds).is_none() {
                continue;
            }
            self.out.text(row, rect.origin(), self.theme.text);
        }

        self.out.pop_clip();
    }

    fn text_input(&mut self, input: &TextInput, bounds: Rect, focused: bool) {
        let origin = bounds.origin();
        if !focused && input.text.glyphs().is_empty() {
            self.out.text(&input.label, origin, self.theme.text.with_alpha(0.5));
            return;
        }

        if focused && input.has_selection() {
            self.selection(input, bounds);
        }
        self.out.text(&input.text, origin, self.theme.text);

        if focused {
            let caret = input.text.cursor_position(input.cursor, self.font);
            self.out.fill(
                Rect::from_origin_size(
                    origin + caret,
                    Size::new(self.config.cursor_width, self.font.line_height()),
                ),
                self.theme.text_input_cursor,
            );
        }
    }

    /// Selection highlight: a partial first line, full middle lines and a
    /// partial last line.
    fn selection(&mut self, input: &TextInput, bounds: Rect) {
        let origin = bounds.origin();
        let line_height = self.font.line_height();
        let color = self.theme.text_input_selection;
        let range = input.selection();
        let first = input.text.cursor_position(range.start, self.font);
        let second = input.text.cursor_position(range.end, self.font);

        if (first.y - second.y).abs() < 0.01 {
            self.out.fill(
                Rect::new(first.x, first.y, second.x - first.x, line_height).translate(origin),
                color,
            );
            return;
        }

        let padding = input.text.padding;
        let left = padding.start;
        let right = bounds.width - padding.end;

        self.out.fill(
            Rect::new(first.x, first.y, right - first.x, line_height).translate(origin),
            color,
        );
        let mut top = first.y + line_height;
        while top + 0.01 < second.y {
            self.out
                .fill(Rect::new(left, top, right - left, line_height).translate(origin), color);
            top += line_height;
        }
        self.out.fill(
            Rect::new(left, second.y, second.x - left, line_height).translate(origin),
            color,
        );
    }

    /// Four bars hugging `bounds` from the outside.
    fn focus_indicator(&mut self, bounds: Rect) {
        let width = self.config.focus_indicator_width;
        let color = self.theme.focus_indicator;
        let tall = bounds.height + 2.0 * width;
        self.out
            .fill(Rect::new(bounds.x, bounds.y - width, bounds.width, width), color);
        self.out
            .fill(Rect::new(bounds.x, bounds.bottom(), bounds.width, width), color);
        self.out
            .fill(Rect::new(bounds.x - width, bounds.y - width, width, tall), color);
        self.out
            .fill(Rect::new(bounds.right(), bounds.y - width, width, tall), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaks::UnicodeBreaks;
    use crate::font::BitmapFont;
    use crate::id::ItemId;
    use crate::layout::Padding;
    use crate::typeset::Typesetter;

    const CELL: f32 = 10.0;
    const LINE: f32 = 20.0;

    fn font() -> BitmapFont {
        BitmapFont::monospace(CELL, LINE)
    }

    fn typeset(block: &mut TextBlock, width: f32) {
        let font = font();
        Typesetter::new(&font, &UnicodeBreaks, "…")
            .measure_bound(block, Size::new(width, 1000.0))
            .unwrap();
    }

    fn fills(list: &DrawList) -> Vec<(Rect, Color)> {
        list.commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Fill { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn button_cap_follows_hover_and_glyphs_are_translated() {
        let config = UiConfig::default();
        let mut button = Button::new("ab").padding(Padding::default());
        typeset(&mut button.label, 100.0);
        button.hovered = true;
        let mut item = Item::new(ItemId(1), button);
        item.bounds = Rect::new(30.0, 40.0, 20.0, 20.0);

        let list = draw(&[item], FocusState::Unfocused, &config, &font());
        assert_eq!(
            list.commands()[0],
            DrawCommand::Fill {
                rect: Rect::new(30.0, 40.0, 20.0, 20.0),
                color: config.theme.button_cap_hovered_enabled,
            }
        );
        let DrawCommand::Glyphs { quads, color } = &list.commands()[1] else {
            panic!("expected glyphs");
        };
        assert_eq!(*color, config.theme.button_label_enabled);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].rect, Rect::new(40.0, 40.0, CELL, LINE));
    }

    #[test]
    fn spaces_produce_no_quads() {
        let mut block = TextBlock::new("a b");
        typeset(&mut block, 100.0);
        let mut list = DrawList::new();
        list.text(&block, Point::ORIGIN, Color::BLACK);
        let DrawCommand::Glyphs { quads, .. } = &list.commands()[0] else {
            panic!("expected glyphs");
        };
        assert_eq!(quads.len(), 2);
    }

    #[test]
    fn list_rows_are_clipped_and_highlighted() {
        let config = UiConfig::default();
        let mut rows = List::new(["one", "two", "three"]);
        for row in &mut rows.rows {
            typeset(row, 92.0);
        }
        rows.row_bounds = (0..3)
            .map(|i| Rect::new(4.0, 2.0 + i as f32 * 26.0, 92.0, 24.0))
            .collect();
        rows.scroll_top = 26.0;
        rows.hovered = Some(1);
        rows.selected = Some(2);
        let mut item = Item::new(ItemId(1), rows);
        item.bounds = Rect::new(0.0, 0.0, 100.0, 52.0);

        let list = draw(&[item], FocusState::Unfocused, &config, &font());
        let commands = list.commands();
        let viewport = Rect::new(0.0, 0.0, 100.0, 52.0);
        assert_eq!(commands.first(), Some(&DrawCommand::PushClip(viewport)));
        assert_eq!(commands.last(), Some(&DrawCommand::PopClip));
        assert_eq!(
            fills(&list),
            vec![
                (Rect::new(4.0, 2.0, 92.0, 24.0), config.theme.list_item_background_hovered),
                (Rect::new(4.0, 28.0, 92.0, 24.0), config.theme.list_item_background_selected),
            ]
        );
        // The first row scrolled out of the window entirely.
        let glyph_runs = commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Glyphs { .. }))
            .count();
        assert_eq!(glyph_runs, 2);
    }

    #[test]
    fn hovered_selected_row_is_highlighted_once() {
        let config = UiConfig::default();
        let mut rows = List::new(["one"]);
        rows.row_bounds = vec![Rect::new(4.0, 2.0, 92.0, 24.0)];
        rows.hovered = Some(0);
        rows.selected = Some(0);
        let mut item = Item::new(ItemId(1), rows);
        item.bounds = Rect::new(0.0, 0.0, 100.0, 52.0);

        let list = draw(&[item], FocusState::Unfocused, &config, &font());
        assert_eq!(fills(&list).len(), 1);
    }

    fn text_input(text: &str, width: f32) -> Item {
        let mut input = TextInput::new("name").with_text(text);
        input.text.padding = Padding::default();
        typeset(&mut input.text, width);
        typeset(&mut input.label, width);
        let mut item = Item::new(ItemId(5), input);
        item.bounds = Rect::new(10.0, 10.0, width, 100.0);
        item
    }

    #[test]
    fn empty_unfocused_input_shows_label() {
        let config = UiConfig::default();
        let item = text_input("", 100.0);
        let list = draw(&[item], FocusState::Unfocused, &config, &font());
        let DrawCommand::Glyphs { quads, .. } = &list.commands()[0] else {
            panic!("expected glyphs");
        };
        assert_eq!(quads.len(), 4);
    }

    #[test]
    fn focused_input_draws_caret_and_frame() {
        let config = UiConfig::default();
        let item = text_input("abc", 100.0);
        let list = draw(&[item], FocusState::Focused(ItemId(5)), &config, &font());
        let fills = fills(&list);
        assert_eq!(
            fills[0],
            (Rect::new(40.0, 10.0, config.cursor_width, LINE), config.theme.text_input_cursor)
        );
        let w = config.focus_indicator_width;
        let frame: Vec<Rect> = fills[1..].iter().map(|(rect, _)| *rect).collect();
        assert_eq!(
            frame,
            vec![
                Rect::new(10.0, 10.0 - w, 100.0, w),
                Rect::new(10.0, 110.0, 100.0, w),
                Rect::new(10.0 - w, 10.0 - w, w, 100.0 + 2.0 * w),
                Rect::new(110.0, 10.0 - w, w, 100.0 + 2.0 * w),
            ]
        );
    }

    #[test]
    fn selection_spans_lines() {
        let config = UiConfig::default();
        // Three lines in a 40 pixel wide box.
        let mut item = text_input("abc def ghi", 40.0);
        if let ItemKind::TextInput(input) = &mut item.kind {
            input.selection_start = 1;
            input.cursor = 9;
        }
        let list = draw(&[item], FocusState::Focused(ItemId(5)), &config, &font());
        let selection: Vec<Rect> = fills(&list)
            .into_iter()
            .filter(|(_, color)| *color == config.theme.text_input_selection)
            .map(|(rect, _)| rect)
            .collect();
        assert_eq!(
            selection,
            vec![
                Rect::new(20.0, 10.0, 30.0, LINE),
                Rect::new(10.0, 30.0, 40.0, LINE),
                Rect::new(10.0, 50.0, 10.0, LINE),
            ]
        );
    }
}
