//! Bitmap font metrics.
//!
//! The typesetter never rasterizes anything. It asks a [`FontService`] where
//! each glyph lives in the font's texture page and how far to advance the pen.
//! [`BitmapFont`] is an in-memory implementation that hosts fill from whatever
//! font description format they load.

use std::collections::HashMap;

use crate::primitives::{Point, Rect, Size};

/// Placement data for one glyph of a bitmap font.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    /// Source rectangle in texture pixels.
    pub rect: Rect,
    /// Offset from the pen position (line top) to the glyph's top-left corner.
    pub offset: Point,
    pub x_advance: f32,
    pub page: u32,
}

/// Glyph metrics and kerning consumed by the typesetter.
pub trait FontService {
    /// Metrics for `codepoint`, or the missing-glyph entry when the font lacks it.
    fn find_glyph(&self, codepoint: char) -> &GlyphMetrics;

    /// Extra advance between two consecutive codepoints. Zero when no pair matches.
    fn kerning(&self, prior: char, current: char) -> f32;

    fn line_height(&self) -> f32;

    /// Distance from the top of a line to its baseline.
    fn baseline(&self) -> f32;

    /// Size of the texture page, used to normalise glyph source rectangles.
    fn image_size(&self) -> Size;
}

/// A bitmap font held entirely in memory.
#[derive(Debug, Clone)]
pub struct BitmapFont {
    glyphs: HashMap<char, GlyphMetrics>,
    kerning_pairs: HashMap<(char, char), f32>,
    missing_glyph: GlyphMetrics,
    line_height: f32,
    baseline: f32,
    image_size: Size,
}

impl BitmapFont {
    pub fn new(
        line_height: f32,
        baseline: f32,
        image_size: Size,
        missing_glyph: GlyphMetrics,
    ) -> Self {
        Self {
            glyphs: HashMap::new(),
            kerning_pairs: HashMap::new(),
            missing_glyph,
            line_height,
            baseline,
            image_size,
        }
    }

    pub fn with_glyph(mut self, codepoint: char, metrics: GlyphMetrics) -> Self {
        self.glyphs.insert(codepoint, metrics);
        self
    }

    pub fn with_kerning(mut self, prior: char, current: char, amount: f32) -> Self {
        self.kerning_pairs.insert((prior, current), amount);
        self
    }

    /// Whether the font has its own entry for `codepoint`.
    pub fn contains(&self, codepoint: char) -> bool {
        self.glyphs.contains_key(&codepoint)
    }

    /// A fixed-advance font covering printable ASCII and the ellipsis.
    ///
    /// Cells are packed sixteen to a row in the texture page. Space has an
    /// empty source rectangle but still advances the pen.
    pub fn monospace(cell_width: f32, line_height: f32) -> Self {
        const COLUMNS: usize = 16;

        let codepoints: Vec<char> = (' '..='~').chain(['…']).collect();
        let rows = codepoints.len().div_ceil(COLUMNS) + 1;
        let image_size = Size::new(cell_width * COLUMNS as f32, line_height * rows as f32);
        let baseline = (line_height * 0.8).round();

        // The missing glyph occupies the last cell of the page.
        let missing = GlyphMetrics {
            rect: Rect::new(
                image_size.width - cell_width,
                image_size.height - line_height,
                cell_width,
                line_height,
            ),
            offset: Point::ORIGIN,
            x_advance: cell_width,
            page: 0,
        };

        let mut font = Self::new(line_height, baseline, image_size, missing);
        for (slot, codepoint) in codepoints.into_iter().enumerate() {
            let column = (slot % COLUMNS) as f32;
            let row = (slot / COLUMNS) as f32;
            let rect = if codepoint == ' ' {
                Rect::new(column * cell_width, row * line_height, 0.0, 0.0)
            } else {
                Rect::new(column * cell_width, row * line_height, cell_width, line_height)
            };
            font.glyphs.insert(
                codepoint,
                GlyphMetrics {
                    rect,
                    offset: Point::ORIGIN,
                    x_advance: cell_width,
                    page: 0,
                },
            );
        }
        font
    }
}

impl FontService for BitmapFont {
    fn find_glyph(&self, codepoint: char) -> &GlyphMetrics {
        self.glyphs.get(&codepoint).unwrap_or(&self.missing_glyph)
    }

    fn kerning(&self, prior: char, current: char) -> f32 {
        self.kerning_pairs
            .get(&(prior, current))
            .copied()
            .unwrap_or(0.0)
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn baseline(&self) -> f32 {
        self.baseline
    }

    fn image_size(&self) -> Size {
        self.image_size
    }
}
