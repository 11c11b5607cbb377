//! Terminal geometry of the link grid, exposed to the scroll engine in
//! virtual pixels

use tabdeck_core::config::UiConfig;

use crate::scroll::ScrollSurface;

/// Links flow top to bottom, then left to right, `rows` per column
#[derive(Debug, Clone)]
pub struct GridSurface {
    cell_px: f64,
    tile_width: u16,
    tile_gap: u16,
    rows: usize,
    viewport_cells: u16,
    column_count: usize,
    offset_px: f64,
}

impl GridSurface {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            cell_px: if ui.cell_px > 0.0 { ui.cell_px } else { 1.0 },
            tile_width: ui.tile_width.max(4),
            tile_gap: ui.tile_gap,
            rows: 1,
            viewport_cells: 0,
            column_count: 0,
            offset_px: 0.0,
        }
    }

    pub fn tile_width(&self) -> u16 {
        self.tile_width
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn column_step_cells(&self) -> u16 {
        self.tile_width + self.tile_gap
    }

    pub fn viewport_cells(&self) -> u16 {
        self.viewport_cells
    }

    /// Fit the viewport to at most `max_columns` whole columns of `available` cells
    pub fn set_viewport(&mut self, available: u16, max_columns: u16) {
        let page = self.column_step_cells().saturating_mul(max_columns.max(1));
        self.viewport_cells = available.min(page);
    }

    /// Lay out `link_count` links in columns of `rows`
    pub fn set_links(&mut self, link_count: usize, rows: u16) {
        self.rows = rows.max(1) as usize;
        self.column_count = link_count.div_ceil(self.rows);
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Grid position of link `index`
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index / self.rows, index % self.rows)
    }

    /// Scroll offset rounded to whole cells
    pub fn offset_cells(&self) -> i64 {
        (self.offset_px / self.cell_px).round() as i64
    }

    /// Left edge of `column` relative to the viewport, in cells
    pub fn column_x(&self, column: usize) -> i64 {
        column as i64 * self.column_step_cells() as i64 - self.offset_cells()
    }

    /// Columns at least partly inside the viewport
    pub fn visible_columns(&self) -> std::ops::Range<usize> {
        let step = self.column_step_cells().max(1) as i64;
        let offset = self.offset_cells().max(0);
        let first = (offset / step) as usize;
        let last = ((offset + self.viewport_cells as i64 + step - 1) / step) as usize;
        first.min(self.column_count)..last.min(self.column_count)
    }

    /// Scroll offset, in virtual pixels, at which `column` starts
    pub fn column_offset_px(&self, column: usize) -> f64 {
        column as f64 * self.column_step()
    }
}

impl ScrollSurface for GridSurface {
    fn viewport_width(&self) -> f64 {
        self.viewport_cells as f64 * self.cell_px
    }

    fn content_width(&self) -> f64 {
        self.column_count as f64 * self.column_step()
    }

    fn column_step(&self) -> f64 {
        self.column_step_cells() as f64 * self.cell_px
    }

    fn scroll_offset(&self) -> f64 {
        self.offset_px
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.offset_px = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> GridSurface {
        let mut grid = GridSurface::new(&UiConfig::default());
        grid.set_viewport(200, 6);
        grid.set_links(40, 3);
        grid
    }

    #[test]
    fn test_geometry_in_virtual_pixels() {
        let grid = surface();
        // 6 columns of 20 cells at 8px per cell
        assert_eq!(grid.viewport_cells(), 120);
        assert_eq!(grid.viewport_width(), 960.0);
        assert_eq!(grid.column_step(), 160.0);
        assert_eq!(grid.column_count(), 14);
        assert_eq!(grid.content_width(), 2240.0);
    }

    #[test]
    fn test_narrow_terminal_limits_viewport() {
        let mut grid = surface();
        grid.set_viewport(50, 6);
        assert_eq!(grid.viewport_cells(), 50);
    }

    #[test]
    fn test_links_flow_down_columns() {
        let grid = surface();
        assert_eq!(grid.cell_of(0), (0, 0));
        assert_eq!(grid.cell_of(2), (0, 2));
        assert_eq!(grid.cell_of(3), (1, 0));
    }

    #[test]
    fn test_visible_columns_follow_offset() {
        let mut grid = surface();
        assert_eq!(grid.visible_columns(), 0..6);

        // half a column in
        grid.set_scroll_offset(80.0);
        assert_eq!(grid.offset_cells(), 10);
        assert_eq!(grid.visible_columns(), 0..7);
        assert_eq!(grid.column_x(1), 10);

        grid.set_scroll_offset(grid.column_offset_px(8));
        assert_eq!(grid.visible_columns(), 8..14);
    }
}
