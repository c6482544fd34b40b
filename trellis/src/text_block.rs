//! Text blocks and their typeset glyphs.
//!
//! A [`TextBlock`] owns its string plus the glyph run produced by the last
//! typesetting pass. The glyph map links byte indices of the text to entries
//! of the glyph run; it is rebuilt on every pass since edits shift every
//! index after the edit point.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::breaks::clamp_to_char_boundary;
use crate::error::{Result, UiError};
use crate::layout::Padding;
use crate::primitives::{Point, Rect};

/// What to do with text that does not fit the width of its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Wrap,
    /// Cut the text and append an ellipsis.
    EllipsizeEnd,
}

/// One positioned glyph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Glyph {
    /// Destination rectangle, relative to the top-left of the owning item.
    pub rect: Rect,
    /// Source rectangle normalised to the font's texture page.
    pub texture_rect: Rect,
    /// Pen position on the baseline where this glyph starts.
    pub baseline_start: Point,
    pub x_advance: f32,
    /// Byte index of the codepoint this glyph was produced from.
    pub text_index: usize,
}

impl Glyph {
    /// False for newline markers and blank glyphs such as space.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.texture_rect.width > 0.0 && self.texture_rect.height > 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    text: String,
    pub padding: Padding,
    pub overflow: Overflow,
    pub(crate) glyphs: Vec<Glyph>,
    pub(crate) glyph_map: BTreeMap<usize, usize>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Index into [`glyphs`](Self::glyphs) of the glyph produced from `text_index`.
    pub fn glyph_index(&self, text_index: usize) -> Option<usize> {
        self.glyph_map.get(&text_index).copied()
    }

    /// The last glyph produced from a codepoint at or before `text_index`.
    pub(crate) fn glyph_at_or_before(&self, text_index: usize) -> Option<(usize, &Glyph)> {
        self.glyph_map
            .range(..=text_index)
            .next_back()
            .and_then(|(&key, &glyph)| self.glyphs.get(glyph).map(|g| (key, g)))
    }

    /// Replace the whole text. Glyphs from the previous pass are discarded so
    /// the run and the map never describe different strings.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let mut replacement = String::new();
        replacement
            .try_reserve_exact(text.len())
            .map_err(|_| UiError::OutOfMemory {
                requested: text.len(),
            })?;
        replacement.push_str(text);
        self.reserve_glyphs(text.len())?;

        self.text = replacement;
        self.glyphs.clear();
        self.glyph_map.clear();
        Ok(())
    }

    /// Replace `range` of the text with `insert`. Both ends of the range are
    /// clamped to the text and snapped to character boundaries.
    ///
    /// Returns the range actually removed. On allocation failure nothing changes.
    pub(crate) fn splice(&mut self, range: Range<usize>, insert: &str) -> Result<Range<usize>> {
        let start = clamp_to_char_boundary(&self.text, range.start.min(range.end));
        let end = clamp_to_char_boundary(&self.text, range.start.max(range.end));

        let new_len = self.text.len() - (end - start) + insert.len();
        let mut edited = String::new();
        edited
            .try_reserve_exact(new_len)
            .map_err(|_| UiError::OutOfMemory { requested: new_len })?;
        edited.push_str(&self.text[..start]);
        edited.push_str(insert);
        edited.push_str(&self.text[end..]);
        self.reserve_glyphs(new_len)?;

        self.text = edited;
        self.glyphs.clear();
        self.glyph_map.clear();
        Ok(start..end)
    }

    /// Make room for `glyph_count` glyphs up front so a typesetting pass
    /// never has to grow the run while pushing.
    pub(crate) fn reserve_glyphs(&mut self, glyph_count: usize) -> Result<()> {
        if glyph_count > self.glyphs.capacity() {
            let additional = glyph_count - self.glyphs.len();
            self.glyphs
                .try_reserve_exact(additional)
                .map_err(|_| UiError::OutOfMemory {
                    requested: additional * std::mem::size_of::<Glyph>(),
                })?;
        }
        Ok(())
    }

    /// Clear the previous glyph run and hand out the text together with a
    /// sink for the new one. Room for every codepoint plus `extra` glyphs is
    /// reserved first, so a failed reservation leaves the old run intact.
    pub(crate) fn begin_pass(&mut self, extra: usize) -> Result<(&str, GlyphRun<'_>)> {
        self.reserve_glyphs(self.text.len() + extra)?;
        self.glyphs.clear();
        self.glyph_map.clear();
        Ok((
            &self.text,
            GlyphRun {
                glyphs: &mut self.glyphs,
                map: &mut self.glyph_map,
            },
        ))
    }
}

/// Write access to a text block's glyphs during a typesetting pass.
pub(crate) struct GlyphRun<'a> {
    glyphs: &'a mut Vec<Glyph>,
    map: &'a mut BTreeMap<usize, usize>,
}

impl GlyphRun<'_> {
    /// Append a glyph. Only the first glyph for a text index enters the map.
    pub(crate) fn push(&mut self, glyph: Glyph) {
        let index = self.glyphs.len();
        self.map.entry(glyph.text_index).or_insert(index);
        self.glyphs.push(glyph);
    }
}
