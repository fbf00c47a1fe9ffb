// ABOUTME: Glyph cache for CPU text painting.
// ABOUTME: Rasterizes font glyphs once with fontdue and keeps their coverage masks.

use fontdue::{Font, FontSettings};
use std::collections::HashMap;

use crate::fonts::FontError;

/// Cell geometry in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f32,
    pub height: f32,
    /// Baseline offset from the top of the cell
    pub ascent: f32,
}

/// A rasterized glyph
#[derive(Debug, Clone, Default)]
pub struct Glyph {
    pub width: usize,
    pub height: usize,
    pub offset_x: i32,
    pub offset_y: i32,
    pub coverage: Vec<u8>,
}

impl Glyph {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Where the painter gets glyph bitmaps and cell geometry from
pub trait GlyphSource {
    fn metrics(&self) -> CellMetrics;
    fn glyph(&mut self, c: char) -> &Glyph;
}

pub struct GlyphAtlas {
    font: Font,
    font_size: f32,
    metrics: CellMetrics,
    glyphs: HashMap<char, Glyph>,
}

impl GlyphAtlas {
    /// `font_size` is in device pixels (logical size times scale factor)
    pub fn new(font_data: &[u8], font_size: f32) -> Result<Self, FontError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;

        // Get line metrics for proper baseline positioning
        let line_metrics = font
            .horizontal_line_metrics(font_size)
            .unwrap_or(fontdue::LineMetrics {
                ascent: font_size * 0.8,
                descent: font_size * -0.2,
                line_gap: 0.0,
                new_line_size: font_size,
            });

        // Use 'M' advance for cell width (standard for monospace)
        let advance = font.metrics('M', font_size).advance_width;
        let metrics = CellMetrics {
            width: advance.ceil().max(1.0),
            height: line_metrics.new_line_size.ceil().max(1.0),
            ascent: line_metrics.ascent.round(),
        };

        Ok(Self {
            font,
            font_size,
            metrics,
            glyphs: HashMap::new(),
        })
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn cached_glyphs(&self) -> usize {
        self.glyphs.len()
    }
}

impl GlyphSource for GlyphAtlas {
    fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    fn glyph(&mut self, c: char) -> &Glyph {
        let font = &self.font;
        let font_size = self.font_size;
        self.glyphs.entry(c).or_insert_with(|| {
            let (metrics, bitmap) = font.rasterize(c, font_size);
            Glyph {
                width: metrics.width,
                height: metrics.height,
                offset_x: metrics.xmin,
                offset_y: metrics.ymin,
                coverage: bitmap,
            }
        })
    }
}
