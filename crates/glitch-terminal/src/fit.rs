// ABOUTME: Fit addon: sizes the grid to the element's content box.
// ABOUTME: Columns and rows are the whole cells that fit in the canvas.

use crate::addon::Addon;
use crate::terminal::Terminal;

/// Smallest grid the fit addon will propose
const MIN_COLUMNS: u16 = 2;
const MIN_ROWS: u16 = 1;

#[derive(Debug, Default, Clone, Copy)]
pub struct FitAddon;

impl FitAddon {
    /// Grid size for the current element, `None` before `open`
    pub fn propose_dimensions(terminal: &Terminal) -> Option<(u16, u16)> {
        let element = terminal.element()?;
        let metrics = terminal.cell_metrics()?;
        let (width, height) = element.size();
        Some(dimensions_for(width, height, metrics.width, metrics.height))
    }

    /// Resize the terminal to the proposed dimensions if they differ
    pub fn fit(terminal: &mut Terminal) {
        let Some((columns, rows)) = Self::propose_dimensions(terminal) else {
            tracing::debug!("Fit skipped: terminal not opened");
            return;
        };
        if terminal.size() != (columns, rows) {
            terminal.resize(columns, rows);
        }
    }
}

impl Addon for FitAddon {
    fn name(&self) -> &'static str {
        "fit"
    }

    fn activate(&mut self, terminal: &mut Terminal) {
        Self::fit(terminal);
    }
}

fn dimensions_for(width: u32, height: u32, cell_width: f32, cell_height: f32) -> (u16, u16) {
    let columns = (width as f32 / cell_width.max(1.0)).floor() as u16;
    let rows = (height as f32 / cell_height.max(1.0)).floor() as u16;
    (columns.max(MIN_COLUMNS), rows.max(MIN_ROWS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_cells_only() {
        assert_eq!(dimensions_for(800, 600, 9.0, 18.0), (88, 33));
        assert_eq!(dimensions_for(80, 16, 8.0, 16.0), (10, 1));
    }

    #[test]
    fn tiny_boxes_keep_a_minimum_grid() {
        assert_eq!(dimensions_for(1, 1, 8.0, 16.0), (MIN_COLUMNS, MIN_ROWS));
    }
}
