//! Glyph placement for text blocks.
//!
//! Two passes share the same pen model:
//!
//! - **Ideal**: only mandatory breaks start new lines. Used to measure how much
//!   room text would like.
//! - **Bound**: the text is fitted into a given width, either wrapping at break
//!   opportunities (with an emergency break inside runs wider than the whole
//!   line) or truncating with an ellipsis.
//!
//! Glyph rectangles are relative to the top-left corner of the owning item.
//! Every newline produces an invisible zero-width glyph so each line of text
//! has an entry the cursor can be mapped to.

use crate::breaks::{BreakService, clamp_to_char_boundary, is_default_ignorable, is_newline};
use crate::error::Result;
use crate::font::{FontService, GlyphMetrics};
use crate::layout::Padding;
use crate::primitives::{Point, Rect, Size};
use crate::text_block::{Glyph, GlyphRun, Overflow, TextBlock};

/// Places glyphs for text blocks using a font and a break detector.
#[derive(Clone, Copy)]
pub struct Typesetter<'a> {
    font: &'a dyn FontService,
    breaks: &'a dyn BreakService,
    ellipsis: &'a str,
}

impl<'a> Typesetter<'a> {
    pub fn new(font: &'a dyn FontService, breaks: &'a dyn BreakService, ellipsis: &'a str) -> Self {
        Self {
            font,
            breaks,
            ellipsis,
        }
    }

    #[inline]
    pub fn font(&self) -> &'a dyn FontService {
        self.font
    }

    #[inline]
    pub fn breaks(&self) -> &'a dyn BreakService {
        self.breaks
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.font.line_height()
    }

    /// Lay out `block` breaking only at mandatory breaks and return the size
    /// it occupies including padding.
    pub fn measure_ideal(&self, block: &mut TextBlock) -> Result<Size> {
        let padding = block.padding;
        let (text, mut run) = block.begin_pass(0)?;
        let mut pen = Pen::new(padding);

        let mut next_break = self.breaks.next_mandatory_break(text, 0);
        for (index, current) in text.char_indices() {
            if index == next_break {
                next_break = self.breaks.next_mandatory_break(text, next_break);
                pen.new_line(self.font.line_height());
            }

            if is_newline(current) {
                self.place_newline(&mut run, index, &mut pen);
            } else if !is_default_ignorable(current) {
                let metrics = self.font.find_glyph(current);
                self.place_glyph(&mut run, metrics, current, index, &mut pen);
            }
        }

        Ok(self.finish(text, &mut pen))
    }

    /// Fit `block` into `dimensions.width` according to its overflow policy and
    /// return the size it occupies including padding. The height is whatever
    /// the lines need; it is not limited by `dimensions.height`.
    pub fn measure_bound(&self, block: &mut TextBlock, dimensions: Size) -> Result<Size> {
        let padding = block.padding;
        let overflow = block.overflow;
        let ellipsis_glyphs = self.ellipsis.chars().count();
        let (text, mut run) = block.begin_pass(ellipsis_glyphs)?;
        let line_height = self.font.line_height();

        let right = dimensions.width - padding.end;
        let whole_width = dimensions.width - padding.horizontal();
        let extra = match overflow {
            Overflow::Wrap => 0.0,
            Overflow::EllipsizeEnd => self.run_length(self.ellipsis),
        };

        let mut pen = Pen::new(padding);
        let mut truncated_at = None;

        let mut next_break = self.breaks.next_line_break(text, 0);
        let mut run_length = self.run_length(&text[..next_break.index]);

        for (index, current) in text.char_indices() {
            if index == next_break.index {
                let mandatory = next_break.mandatory;
                next_break = self.breaks.next_line_break(text, index);
                run_length = self.run_length(&text[index..next_break.index]);

                if mandatory || (pen.has_content && pen.x + run_length > right) {
                    match overflow {
                        Overflow::Wrap => pen.new_line(line_height),
                        Overflow::EllipsizeEnd if mandatory => {
                            truncated_at = Some(index);
                            break;
                        }
                        // Single-line text ignores soft breaks.
                        Overflow::EllipsizeEnd => {}
                    }
                }
            }

            if is_newline(current) {
                self.place_newline(&mut run, index, &mut pen);
                continue;
            }
            if is_default_ignorable(current) {
                continue;
            }

            let metrics = self.font.find_glyph(current);
            if pen.has_content && pen.x + metrics.x_advance + extra > right {
                match overflow {
                    Overflow::Wrap if run_length > whole_width => pen.new_line(line_height),
                    Overflow::Wrap => {}
                    Overflow::EllipsizeEnd => {
                        let line_end = self.breaks.next_mandatory_break(text, index);
                        let rest = self.run_length(&text[index..line_end]);
                        if pen.x + rest > right || line_end < text.len() {
                            truncated_at = Some(index);
                            break;
                        }
                    }
                }
            }
            self.place_glyph(&mut run, metrics, current, index, &mut pen);
        }

        if let Some(index) = truncated_at {
            for current in self.ellipsis.chars() {
                let metrics = self.font.find_glyph(current);
                self.place_glyph(&mut run, metrics, current, index, &mut pen);
            }
        }

        Ok(self.finish(text, &mut pen))
    }

    /// Total advance of the visible codepoints in `text`.
    pub fn run_length(&self, text: &str) -> f32 {
        text.chars()
            .filter(|&c| !is_newline(c) && !is_default_ignorable(c))
            .map(|c| self.font.find_glyph(c).x_advance)
            .sum()
    }

    fn place_glyph(
        &self,
        run: &mut GlyphRun<'_>,
        metrics: &GlyphMetrics,
        current: char,
        text_index: usize,
        pen: &mut Pen,
    ) {
        if let Some(prior) = pen.prior {
            pen.x += self.font.kerning(prior, current);
        }

        let image = self.font.image_size();
        let normalise = |value: f32, extent: f32| if extent > 0.0 { value / extent } else { 0.0 };

        run.push(Glyph {
            rect: Rect::new(
                pen.x + metrics.offset.x,
                pen.line_top + metrics.offset.y,
                metrics.rect.width,
                metrics.rect.height,
            ),
            texture_rect: Rect::new(
                normalise(metrics.rect.x, image.width),
                normalise(metrics.rect.y, image.height),
                normalise(metrics.rect.width, image.width),
                normalise(metrics.rect.height, image.height),
            ),
            baseline_start: Point::new(pen.x, pen.line_top + self.font.baseline()),
            x_advance: metrics.x_advance,
            text_index,
        });

        pen.x += metrics.x_advance;
        pen.prior = Some(current);
        pen.has_content = true;
    }

    fn place_newline(&self, run: &mut GlyphRun<'_>, text_index: usize, pen: &mut Pen) {
        run.push(Glyph {
            rect: Rect::new(pen.x, pen.line_top, 0.0, self.font.line_height()),
            texture_rect: Rect::ZERO,
            baseline_start: Point::new(pen.x, pen.line_top + self.font.baseline()),
            x_advance: 0.0,
            text_index,
        });
        pen.prior = None;
    }

    fn finish(&self, text: &str, pen: &mut Pen) -> Size {
        // A trailing newline opens an empty last line the cursor can sit on.
        if text.chars().next_back().is_some_and(is_newline) {
            pen.new_line(self.font.line_height());
        }
        pen.widest = pen.widest.max(pen.x);
        Size::new(
            pen.widest + pen.padding.end,
            pen.line_top + self.font.line_height() + pen.padding.bottom,
        )
    }
}

struct Pen {
    padding: Padding,
    x: f32,
    line_top: f32,
    widest: f32,
    prior: Option<char>,
    has_content: bool,
}

impl Pen {
    fn new(padding: Padding) -> Self {
        Self {
            padding,
            x: padding.start,
            line_top: padding.top,
            widest: 0.0,
            prior: None,
            has_content: false,
        }
    }

    fn new_line(&mut self, line_height: f32) {
        self.widest = self.widest.max(self.x);
        self.x = self.padding.start;
        self.line_top += line_height;
        self.prior = None;
        self.has_content = false;
    }
}

// ============================================================================
// Cursor geometry
// ============================================================================

fn line_top(glyph: &Glyph, font: &dyn FontService) -> f32 {
    glyph.baseline_start.y - font.baseline()
}

fn same_line(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

impl TextBlock {
    /// Top-left corner of a caret placed before the codepoint at `index`,
    /// relative to the block's origin. Out-of-range indices are clamped.
    pub fn cursor_position(&self, index: usize, font: &dyn FontService) -> Point {
        let text = self.text();
        let index = clamp_to_char_boundary(text, index);
        let start = Point::new(self.padding.start, self.padding.top);

        if index == text.len() {
            let Some(last) = self.glyphs.last() else {
                return start;
            };
            if text.chars().next_back().is_some_and(is_newline) {
                return Point::new(self.padding.start, line_top(last, font) + font.line_height());
            }
            return Point::new(last.baseline_start.x + last.x_advance, line_top(last, font));
        }

        match self.glyph_at_or_before(index) {
            Some((key, glyph)) if key == index => {
                Point::new(glyph.baseline_start.x, line_top(glyph, font))
            }
            // `index` was skipped by the typesetter; sit after the glyph before it.
            Some((_, glyph)) => {
                Point::new(glyph.baseline_start.x + glyph.x_advance, line_top(glyph, font))
            }
            None => start,
        }
    }

    /// Text index whose caret position is nearest to `position` on the line
    /// under it. Ties go to the first glyph in text order. `None` when the
    /// position is above or below every line.
    pub fn index_at_position(&self, position: Point, font: &dyn FontService) -> Option<usize> {
        let line_height = font.line_height();
        let mut closest = f32::INFINITY;
        let mut found = None;

        for glyph in &self.glyphs {
            let top = line_top(glyph, font);
            if position.y < top {
                break;
            }
            if position.y < top + line_height {
                let distance = (glyph.baseline_start.x - position.x).abs();
                if distance < closest {
                    closest = distance;
                    found = Some(glyph.text_index);
                }
            }
        }

        let end = self.cursor_position(self.len(), font);
        if position.y >= end.y && position.y < end.y + line_height {
            let distance = (end.x - position.x).abs();
            if distance < closest {
                found = Some(self.len());
            }
        }

        found
    }

    /// Text index of the first glyph on the visual line holding `index`.
    pub fn line_begin(&self, index: usize, font: &dyn FontService) -> usize {
        let Some(glyph_index) = self.line_anchor(index) else {
            return self.line_fallback(index);
        };
        let top = line_top(&self.glyphs[glyph_index], font);
        let first = self.glyphs[..=glyph_index]
            .iter()
            .rposition(|g| !same_line(line_top(g, font), top))
            .map_or(0, |before| before + 1);
        self.glyphs[first].text_index
    }

    /// Text index of the last glyph on the visual line holding `index`, or
    /// the end of the text on the last line.
    pub fn line_end(&self, index: usize, font: &dyn FontService) -> usize {
        let Some(glyph_index) = self.line_anchor(index) else {
            return self.line_fallback(index);
        };
        let top = line_top(&self.glyphs[glyph_index], font);
        match self.glyphs[glyph_index..]
            .iter()
            .position(|g| !same_line(line_top(g, font), top))
        {
            Some(offset) => self.glyphs[glyph_index + offset - 1].text_index,
            None => self.len(),
        }
    }

    /// Glyph used to find the line of `index`. The end of the text counts as
    /// part of the last glyph's line unless a trailing newline opened a new one.
    fn line_anchor(&self, index: usize) -> Option<usize> {
        let text = self.text();
        let index = clamp_to_char_boundary(text, index);
        if index == text.len() {
            if text.chars().next_back().is_some_and(is_newline) {
                return None;
            }
            return self.glyphs.len().checked_sub(1);
        }
        self.glyph_at_or_before(index)
            .and_then(|(key, _)| self.glyph_index(key))
    }

    fn line_fallback(&self, index: usize) -> usize {
        let text = self.text();
        if clamp_to_char_boundary(text, index) == text.len() {
            text.len()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaks::UnicodeBreaks;
    use crate::font::BitmapFont;

    const CELL: f32 = 10.0;
    const LINE: f32 = 20.0;

    fn font() -> BitmapFont {
        BitmapFont::monospace(CELL, LINE)
    }

    /// Reassemble the visual lines from the glyph run. Ellipsis glyphs share
    /// the truncated text index, so they are recognised by texture position.
    fn lines(block: &TextBlock, font: &BitmapFont) -> Vec<String> {
        let image = font.image_size();
        let ellipsis = font.find_glyph('…').rect;
        let mut out: Vec<(f32, String)> = Vec::new();
        for glyph in block.glyphs() {
            let source = block.text()[glyph.text_index..].chars().next();
            let c = if glyph.is_visible()
                && glyph.texture_rect.x == ellipsis.x / image.width
                && glyph.texture_rect.y == ellipsis.y / image.height
            {
                '…'
            } else {
                match source {
                    Some(c) if !is_newline(c) => c,
                    _ => continue,
                }
            };
            let top = line_top(glyph, font);
            match out.last_mut() {
                Some((t, s)) if same_line(*t, top) => s.push(c),
                _ => out.push((top, c.to_string())),
            }
        }
        out.into_iter().map(|(_, s)| s).collect()
    }

    #[test]
    fn ideal_single_line() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("hello").padding(Padding::all(2.0));
        let size = ts.measure_ideal(&mut block).unwrap();
        assert_eq!(size, Size::new(2.0 + 50.0 + 2.0, 2.0 + LINE + 2.0));
        assert_eq!(block.glyphs().len(), 5);
        assert_eq!(block.glyphs()[1].rect.x, 12.0);
    }

    #[test]
    fn ideal_breaks_only_at_newlines() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("ab cd\nefg");
        let size = ts.measure_ideal(&mut block).unwrap();
        assert_eq!(size, Size::new(50.0, 2.0 * LINE));
        // The newline gets an invisible marker so every index is mapped.
        let marker = block.glyph_index(5).unwrap();
        assert!(!block.glyphs()[marker].is_visible());
        assert_eq!(block.glyph_index(6).map(|g| block.glyphs()[g].rect.y), Some(LINE));
    }

    #[test]
    fn default_ignorables_are_skipped() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("a\u{200B}b");
        let size = ts.measure_ideal(&mut block).unwrap();
        assert_eq!(size.width, 20.0);
        assert_eq!(block.glyphs().len(), 2);
        assert_eq!(block.glyph_index(1), None);
    }

    #[test]
    fn kerning_between_consecutive_codepoints() {
        let font = font().with_kerning('A', 'V', -3.0);
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("AV");
        let size = ts.measure_ideal(&mut block).unwrap();
        assert_eq!(block.glyphs()[1].rect.x, 7.0);
        assert_eq!(size.width, 17.0);
    }

    #[test]
    fn wraps_at_break_opportunities() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("aaa bbb ccc");
        let size = ts.measure_bound(&mut block, Size::new(80.0, 100.0)).unwrap();
        assert_eq!(lines(&block, &font), vec!["aaa bbb ", "ccc"]);
        assert_eq!(size.height, 2.0 * LINE);
    }

    #[test]
    fn emergency_break_inside_long_run() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("abcdefgh");
        ts.measure_bound(&mut block, Size::new(30.0, 100.0)).unwrap();
        assert_eq!(lines(&block, &font), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn ellipsizes_overflowing_text() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("hello world").overflow(Overflow::EllipsizeEnd);
        let size = ts.measure_bound(&mut block, Size::new(60.0, 100.0)).unwrap();
        assert_eq!(lines(&block, &font), vec!["hello…"]);
        assert_eq!(size, Size::new(60.0, LINE));
        // The ellipsis maps to the first truncated index.
        let ellipsis = block.glyphs().last().unwrap();
        assert_eq!(ellipsis.text_index, 5);
    }

    #[test]
    fn ellipsize_keeps_text_that_fits() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("hello").overflow(Overflow::EllipsizeEnd);
        ts.measure_bound(&mut block, Size::new(50.0, 100.0)).unwrap();
        assert_eq!(lines(&block, &font), vec!["hello"]);
    }

    #[test]
    fn ellipsize_truncates_at_mandatory_break() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("ab\ncd").overflow(Overflow::EllipsizeEnd);
        ts.measure_bound(&mut block, Size::new(200.0, 100.0)).unwrap();
        assert_eq!(lines(&block, &font), vec!["ab…"]);
    }

    #[test]
    fn cursor_positions() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("ab\ncd");
        ts.measure_ideal(&mut block).unwrap();
        assert_eq!(block.cursor_position(0, &font), Point::new(0.0, 0.0));
        assert_eq!(block.cursor_position(2, &font), Point::new(20.0, 0.0));
        assert_eq!(block.cursor_position(3, &font), Point::new(0.0, LINE));
        assert_eq!(block.cursor_position(5, &font), Point::new(20.0, LINE));
        assert_eq!(block.cursor_position(99, &font), Point::new(20.0, LINE));
    }

    #[test]
    fn trailing_newline_opens_a_line() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("ab\n");
        let size = ts.measure_ideal(&mut block).unwrap();
        assert_eq!(size.height, 2.0 * LINE);
        assert_eq!(block.cursor_position(3, &font), Point::new(0.0, LINE));
        assert_eq!(block.line_begin(3, &font), 3);
    }

    #[test]
    fn index_at_position_picks_nearest_on_row() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("abc\ndef");
        ts.measure_ideal(&mut block).unwrap();
        assert_eq!(block.index_at_position(Point::new(12.0, 5.0), &font), Some(1));
        assert_eq!(block.index_at_position(Point::new(29.0, 25.0), &font), Some(7));
        // Equidistant from 'a' and 'b': the first in text order wins.
        assert_eq!(block.index_at_position(Point::new(5.0, 5.0), &font), Some(0));
        assert_eq!(block.index_at_position(Point::new(5.0, 99.0), &font), None);
    }

    #[test]
    fn line_begin_and_end() {
        let font = font();
        let ts = Typesetter::new(&font, &UnicodeBreaks, "…");
        let mut block = TextBlock::new("abc\ndef");
        ts.measure_ideal(&mut block).unwrap();
        assert_eq!(block.line_begin(2, &font), 0);
        assert_eq!(block.line_end(1, &font), 3);
        assert_eq!(block.line_begin(6, &font), 4);
        assert_eq!(block.line_end(4, &font), 7);
        assert_eq!(block.line_begin(7, &font), 4);
    }
}
