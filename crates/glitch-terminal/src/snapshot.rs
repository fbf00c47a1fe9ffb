// ABOUTME: Copies the visible grid out of the engine under a single lock.
// ABOUTME: Resolves ANSI colors against the scheme so painting needs no engine access.

use alacritty_terminal::event::EventListener;
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line, Point};
use alacritty_terminal::term::cell::Flags;
use alacritty_terminal::term::{Term, TermMode};
use alacritty_terminal::vte::ansi::{Color as AnsiColor, NamedColor, Rgb as AnsiRgb};
use glitch_core::ColorScheme;

#[derive(Debug, Clone, PartialEq)]
pub struct CellSnapshot {
    pub c: char,
    pub fg: [f32; 4],
    /// `None` for the default background
    pub bg: Option<[f32; 4]>,
    pub underline: bool,
}

impl CellSnapshot {
    fn blank(scheme: &ColorScheme) -> Self {
        Self {
            c: ' ',
            fg: scheme.foreground,
            bg: None,
            underline: false,
        }
    }

    /// Whether a glyph has to be drawn for this cell
    pub fn has_glyph(&self) -> bool {
        !(self.c == ' ' || self.c == '\0' || self.c.is_control())
    }
}

/// The visible screen at one point in time
#[derive(Debug, Clone)]
pub struct ScreenSnapshot {
    pub columns: usize,
    pub rows: usize,
    /// Row-major, `columns * rows` cells
    pub cells: Vec<CellSnapshot>,
    /// (column, row) when the cursor is shown
    pub cursor: Option<(usize, usize)>,
    /// Row-major selection mask
    pub selected: Vec<bool>,
}

impl ScreenSnapshot {
    pub fn capture<T: EventListener>(term: &Term<T>, scheme: &ColorScheme) -> Self {
        let grid = term.grid();
        let columns = grid.columns();
        let rows = grid.screen_lines();
        let selection = term.selection.as_ref().and_then(|s| s.to_range(term));

        let mut cells = Vec::with_capacity(columns * rows);
        let mut selected = Vec::with_capacity(columns * rows);

        for row in 0..rows {
            let line = Line(row as i32);
            for col in 0..columns {
                let cell = &grid[line][Column(col)];
                let flags = cell.flags;

                selected.push(
                    selection
                        .as_ref()
                        .is_some_and(|range| range.contains(Point::new(line, Column(col)))),
                );

                if flags.contains(Flags::WIDE_CHAR_SPACER) {
                    cells.push(CellSnapshot::blank(scheme));
                    continue;
                }

                let is_dim = flags.contains(Flags::DIM);
                let mut fg = ansi_color_to_rgba(cell.fg, scheme, is_dim);

                let has_explicit_bg = !matches!(cell.bg, AnsiColor::Named(NamedColor::Background));
                let mut bg = has_explicit_bg.then(|| ansi_color_to_rgba(cell.bg, scheme, false));

                // Inverse video swaps fg/bg, the default background becomes explicit
                if flags.contains(Flags::INVERSE) {
                    let back = bg.unwrap_or(scheme.background);
                    bg = Some(fg);
                    fg = back;
                }

                let c = if flags.contains(Flags::HIDDEN) { ' ' } else { cell.c };

                cells.push(CellSnapshot {
                    c,
                    fg,
                    bg,
                    underline: flags.intersects(Flags::ALL_UNDERLINES),
                });
            }
        }

        let cursor = term.mode().contains(TermMode::SHOW_CURSOR).then(|| {
            let point = grid.cursor.point;
            (point.column.0, point.line.0.max(0) as usize)
        });

        Self {
            columns,
            rows,
            cells,
            cursor,
            selected,
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&CellSnapshot> {
        if col >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.columns + col)
    }

    pub fn is_selected(&self, col: usize, row: usize) -> bool {
        col < self.columns && row < self.rows && self.selected[row * self.columns + col]
    }

    /// Text of one row, one char per column
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        self.cells[row * self.columns..(row + 1) * self.columns]
            .iter()
            .map(|cell| if cell.c == '\0' { ' ' } else { cell.c })
            .collect()
    }
}

/// Convert an ANSI color from alacritty_terminal to our [f32; 4] format
pub fn ansi_color_to_rgba(color: AnsiColor, scheme: &ColorScheme, is_dim: bool) -> [f32; 4] {
    let base = match color {
        AnsiColor::Named(named) => match named {
            NamedColor::Black => scheme.colors[0],
            NamedColor::Red => scheme.colors[1],
            NamedColor::Green => scheme.colors[2],
            NamedColor::Yellow => scheme.colors[3],
            NamedColor::Blue => scheme.colors[4],
            NamedColor::Magenta => scheme.colors[5],
            NamedColor::Cyan => scheme.colors[6],
            NamedColor::White => scheme.colors[7],
            NamedColor::BrightBlack => scheme.colors[8],
            NamedColor::BrightRed => scheme.colors[9],
            NamedColor::BrightGreen => scheme.colors[10],
            NamedColor::BrightYellow => scheme.colors[11],
            NamedColor::BrightBlue => scheme.colors[12],
            NamedColor::BrightMagenta => scheme.colors[13],
            NamedColor::BrightCyan => scheme.colors[14],
            NamedColor::BrightWhite => scheme.colors[15],
            NamedColor::DimBlack => dim_color(scheme.colors[0]),
            NamedColor::DimRed => dim_color(scheme.colors[1]),
            NamedColor::DimGreen => dim_color(scheme.colors[2]),
            NamedColor::DimYellow => dim_color(scheme.colors[3]),
            NamedColor::DimBlue => dim_color(scheme.colors[4]),
            NamedColor::DimMagenta => dim_color(scheme.colors[5]),
            NamedColor::DimCyan => dim_color(scheme.colors[6]),
            NamedColor::DimWhite => dim_color(scheme.colors[7]),
            NamedColor::Foreground | NamedColor::BrightForeground => scheme.foreground,
            NamedColor::DimForeground => dim_color(scheme.foreground),
            NamedColor::Background => scheme.background,
            NamedColor::Cursor => scheme.foreground,
        },
        AnsiColor::Spec(AnsiRgb { r, g, b }) => {
            [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
        }
        AnsiColor::Indexed(idx) => scheme.indexed_color(idx),
    };

    if is_dim {
        dim_color(base)
    } else {
        base
    }
}

/// 60% brightness
fn dim_color(color: [f32; 4]) -> [f32; 4] {
    [color[0] * 0.6, color[1] * 0.6, color[2] * 0.6, color[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_use_scheme() {
        let scheme = ColorScheme::green();
        assert_eq!(
            ansi_color_to_rgba(AnsiColor::Named(NamedColor::Red), &scheme, false),
            scheme.colors[1]
        );
        assert_eq!(
            ansi_color_to_rgba(AnsiColor::Named(NamedColor::Foreground), &scheme, false),
            scheme.foreground
        );
    }

    #[test]
    fn dim_scales_rgb_but_not_alpha() {
        let scheme = ColorScheme::white();
        let dimmed = ansi_color_to_rgba(AnsiColor::Named(NamedColor::BrightWhite), &scheme, true);
        assert!((dimmed[0] - 0.6).abs() < 1e-6);
        assert_eq!(dimmed[3], 1.0);
    }

    #[test]
    fn true_color_passes_through() {
        let scheme = ColorScheme::default();
        let color = ansi_color_to_rgba(AnsiColor::Spec(AnsiRgb { r: 255, g: 0, b: 51 }), &scheme, false);
        assert_eq!(color, [1.0, 0.0, 0.2, 1.0]);
    }
}
