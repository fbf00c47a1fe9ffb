// ABOUTME: Paints a screen snapshot into the element's layer canvases.
// ABOUTME: Screen gets backgrounds and glyphs, cursor gets the block, link gets selection and hover.

use glitch_core::{Canvas, ColorScheme};

use crate::atlas::{CellMetrics, GlyphSource};
use crate::links::LinkSpan;
use crate::snapshot::ScreenSnapshot;

/// Cursor block opacity; the glyph underneath stays readable
const CURSOR_ALPHA: f32 = 0.7;

pub struct Painter {
    glyphs: Box<dyn GlyphSource>,
    scheme: ColorScheme,
}

impl Painter {
    pub fn new(glyphs: Box<dyn GlyphSource>, scheme: ColorScheme) -> Self {
        Self { glyphs, scheme }
    }

    pub fn metrics(&self) -> CellMetrics {
        self.glyphs.metrics()
    }

    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    /// Grid cell under a device-pixel position, clamped to the grid.
    /// The flag is true when the position is in the right half of the cell.
    pub fn cell_at(&self, snapshot: &ScreenSnapshot, x: f64, y: f64) -> (usize, usize, bool) {
        let m = self.metrics();
        let fx = (x.max(0.0) / m.width as f64) as f32;
        let fy = (y.max(0.0) / m.height as f64) as f32;
        let last_col = snapshot.columns.saturating_sub(1);
        let last_row = snapshot.rows.saturating_sub(1);
        let col = (fx.floor() as usize).min(last_col);
        let row = (fy.floor() as usize).min(last_row);
        (col, row, fx.fract() >= 0.5)
    }

    pub fn paint_screen(&mut self, snapshot: &ScreenSnapshot, canvas: &mut Canvas) {
        let m = self.metrics();
        canvas.fill(self.scheme.background);

        for row in 0..snapshot.rows {
            let top = row as f32 * m.height;
            for col in 0..snapshot.columns {
                let Some(cell) = snapshot.cell(col, row) else {
                    continue;
                };
                let left = col as f32 * m.width;

                if let Some(bg) = cell.bg {
                    canvas.fill_rect(left, top, m.width, m.height, bg);
                }

                if cell.has_glyph() {
                    let glyph = self.glyphs.glyph(cell.c);
                    if !glyph.is_empty() {
                        let x = left.round() as i32 + glyph.offset_x;
                        let y = (top + m.ascent).round() as i32 - glyph.height as i32 - glyph.offset_y;
                        canvas.draw_coverage(x, y, glyph.width, glyph.height, &glyph.coverage, cell.fg);
                    }
                }

                if cell.underline {
                    canvas.fill_rect(left, top + m.ascent + 1.0, m.width, underline_thickness(m), cell.fg);
                }
            }
        }
    }

    pub fn paint_cursor(&self, snapshot: &ScreenSnapshot, canvas: &mut Canvas) {
        canvas.clear();
        let Some((col, row)) = snapshot.cursor else {
            return;
        };
        if col >= snapshot.columns || row >= snapshot.rows {
            return;
        }
        let m = self.metrics();
        let mut color = self.scheme.foreground;
        color[3] = CURSOR_ALPHA;
        canvas.fill_rect(col as f32 * m.width, row as f32 * m.height, m.width, m.height, color);
    }

    pub fn paint_link(&self, snapshot: &ScreenSnapshot, hovered: Option<&LinkSpan>, canvas: &mut Canvas) {
        canvas.clear();
        let m = self.metrics();

        let highlight = self.scheme.selection();
        for row in 0..snapshot.rows {
            for col in 0..snapshot.columns {
                if snapshot.is_selected(col, row) {
                    canvas.fill_rect(col as f32 * m.width, row as f32 * m.height, m.width, m.height, highlight);
                }
            }
        }

        if let Some(link) = hovered {
            let left = link.columns.start as f32 * m.width;
            let width = link.columns.len() as f32 * m.width;
            let top = link.row as f32 * m.height + m.ascent + 1.0;
            canvas.fill_rect(left, top, width, underline_thickness(m), self.scheme.foreground);
        }
    }
}

fn underline_thickness(m: CellMetrics) -> f32 {
    (m.height / 16.0).round().max(1.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::atlas::Glyph;
    use crate::snapshot::CellSnapshot;
    use glitch_core::LayerRole;

    /// Glyph source drawing every character as a solid block
    pub(crate) struct BlockGlyphs {
        metrics: CellMetrics,
        block: Glyph,
    }

    impl BlockGlyphs {
        pub(crate) fn new(width: f32, height: f32) -> Self {
            let w = (width as usize).saturating_sub(2).max(1);
            let h = (height as usize).saturating_sub(2).max(1);
            Self {
                metrics: CellMetrics {
                    width,
                    height,
                    ascent: height - 1.0,
                },
                block: Glyph {
                    width: w,
                    height: h,
                    offset_x: 1,
                    offset_y: 0,
                    coverage: vec![255; w * h],
                },
            }
        }
    }

    impl GlyphSource for BlockGlyphs {
        fn metrics(&self) -> CellMetrics {
            self.metrics
        }

        fn glyph(&mut self, _c: char) -> &Glyph {
            &self.block
        }
    }

    fn snapshot(text: &str, columns: usize, rows: usize) -> ScreenSnapshot {
        let scheme = ColorScheme::white();
        let mut cells = vec![
            CellSnapshot {
                c: ' ',
                fg: scheme.foreground,
                bg: None,
                underline: false,
            };
            columns * rows
        ];
        for (i, c) in text.chars().enumerate() {
            cells[i].c = c;
        }
        ScreenSnapshot {
            columns,
            rows,
            cells,
            cursor: Some((0, 1)),
            selected: vec![false; columns * rows],
        }
    }

    #[test]
    fn screen_paints_background_and_glyphs() {
        let mut painter = Painter::new(Box::new(BlockGlyphs::new(8.0, 16.0)), ColorScheme::white());
        let snap = snapshot("a", 2, 2);
        let mut canvas = Canvas::new(LayerRole::Screen, 16, 32);

        painter.paint_screen(&snap, &mut canvas);

        // Inside the glyph of cell (0, 0)
        assert_eq!(canvas.pixel(3, 8), [255, 255, 255, 255]);
        // Empty cell (1, 0) shows the background
        assert_eq!(canvas.pixel(12, 8), [0, 0, 0, 255]);
    }

    #[test]
    fn cursor_layer_only_has_the_block() {
        let painter = Painter::new(Box::new(BlockGlyphs::new(8.0, 16.0)), ColorScheme::white());
        let snap = snapshot("", 2, 2);
        let mut canvas = Canvas::new(LayerRole::Cursor, 16, 32);

        painter.paint_cursor(&snap, &mut canvas);

        assert_eq!(canvas.pixel(4, 20)[3], (CURSOR_ALPHA * 255.0).round() as u8);
        assert_eq!(canvas.pixel(4, 4), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(12, 20), [0, 0, 0, 0]);
    }

    #[test]
    fn link_layer_highlights_selection_and_hover() {
        let painter = Painter::new(Box::new(BlockGlyphs::new(8.0, 16.0)), ColorScheme::white());
        let mut snap = snapshot("", 2, 2);
        snap.selected[1] = true;
        let mut canvas = Canvas::new(LayerRole::Link, 16, 48);

        let link = LinkSpan {
            row: 1,
            columns: 0..2,
            uri: "https://example.com".to_string(),
        };
        painter.paint_link(&snap, Some(&link), &mut canvas);

        assert!(canvas.pixel(12, 4)[3] > 0);
        assert_eq!(canvas.pixel(4, 4), [0, 0, 0, 0]);
        // Underline sits just below the baseline of row 1
        assert_eq!(canvas.pixel(4, 32), [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(4, 31), [0, 0, 0, 0]);
    }

    #[test]
    fn cell_at_clamps_to_grid() {
        let painter = Painter::new(Box::new(BlockGlyphs::new(8.0, 16.0)), ColorScheme::white());
        let snap = snapshot("", 4, 2);

        assert_eq!(painter.cell_at(&snap, 9.0, 17.0), (1, 1, false));
        assert_eq!(painter.cell_at(&snap, 14.0, 0.0), (1, 0, true));
        assert_eq!(painter.cell_at(&snap, 1000.0, 1000.0).0, 3);
        assert_eq!(painter.cell_at(&snap, -5.0, -5.0), (0, 0, false));
    }
}
