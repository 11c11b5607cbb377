//! Page boundaries for a horizontally scrolling row of columns

/// Upper bound on generated snap points for pathological geometry
pub const MAX_SNAP_POINTS: usize = 5000;

/// Ordered scroll offsets at which pages start
///
/// Always non-empty, starts at 0 and ends at the maximum scroll offset.
/// Rebuilt wholesale whenever layout changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoints {
    points: Vec<f64>,
    column_step: f64,
}

impl Default for SnapPoints {
    fn default() -> Self {
        Self::single()
    }
}

impl SnapPoints {
    /// A single page at offset 0
    pub fn single() -> Self {
        Self {
            points: vec![0.0],
            column_step: 0.0,
        }
    }

    /// Compute snap points for `content_width` shown through `viewport_width`
    ///
    /// Pages are whole numbers of `column_step`. Degenerate geometry collapses
    /// to a single page.
    pub fn compute(content_width: f64, viewport_width: f64, column_step: f64) -> Self {
        let max_offset = (content_width - viewport_width).max(0.0);
        if !max_offset.is_finite() || max_offset <= 0.0 {
            return Self::single();
        }
        if !column_step.is_finite() || column_step <= 0.0 || !viewport_width.is_finite() {
            return Self::single();
        }

        let columns_per_page = (viewport_width / column_step).round().max(1.0);
        let page_step = column_step.max(columns_per_page * column_step);
        if !page_step.is_finite() || page_step <= 0.0 {
            return Self::single();
        }

        let mut points = Vec::new();
        let mut offset = 0.0;
        while offset < max_offset && points.len() < MAX_SNAP_POINTS {
            points.push(offset);
            offset += page_step;
        }
        if points.last() != Some(&max_offset) {
            points.push(max_offset);
        }

        Self {
            points,
            column_step,
        }
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn page_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_single_page(&self) -> bool {
        self.points.len() <= 1
    }

    pub fn column_step(&self) -> f64 {
        self.column_step
    }

    pub fn max_offset(&self) -> f64 {
        self.points.last().copied().unwrap_or(0.0)
    }

    /// Offset of page `index`, clamped to the last page
    pub fn offset_of(&self, index: usize) -> f64 {
        let last = self.points.len().saturating_sub(1);
        self.points.get(index.min(last)).copied().unwrap_or(0.0)
    }

    /// Index of the point closest to `x`; ties keep the lower index
    pub fn nearest_index(&self, x: f64) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, point) in self.points.iter().enumerate() {
            let distance = (point - x).abs();
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        best
    }

    /// Index of the next point from `x` in the direction of travel
    ///
    /// Forward picks the first point at or after `x`, backward the last point
    /// at or before it. A zero direction falls back to the nearest point.
    pub fn directional_index(&self, x: f64, direction: f64) -> usize {
        if direction > 0.0 {
            self.points
                .iter()
                .position(|&p| p >= x)
                .unwrap_or(self.points.len().saturating_sub(1))
        } else if direction < 0.0 {
            self.points.iter().rposition(|&p| p <= x).unwrap_or(0)
        } else {
            self.nearest_index(x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snaps(points: &[f64]) -> SnapPoints {
        SnapPoints {
            points: points.to_vec(),
            column_step: 100.0,
        }
    }

    #[test]
    fn test_pages_are_whole_columns() {
        // 10 columns of 140, viewport fits 4
        let s = SnapPoints::compute(1400.0, 560.0, 140.0);
        assert_eq!(s.points(), &[0.0, 560.0, 840.0]);
        assert_eq!(s.page_count(), 3);
        assert_eq!(s.max_offset(), 840.0);
    }

    #[test]
    fn test_invariants_hold_across_geometries() {
        for content in [150.0, 999.0, 1000.0, 1401.5, 7777.0] {
            for viewport in [0.0, 100.0, 333.0, 560.0] {
                for step in [37.0, 100.0, 140.0] {
                    if content < viewport {
                        continue;
                    }
                    let s = SnapPoints::compute(content, viewport, step);
                    let points = s.points();
                    assert_eq!(points[0], 0.0);
                    assert_eq!(*points.last().unwrap(), (content - viewport).max(0.0));
                    assert!(points.windows(2).all(|w| w[0] < w[1]), "{:?}", points);
                }
            }
        }
    }

    #[test]
    fn test_no_overflow_is_single_page() {
        assert_eq!(SnapPoints::compute(500.0, 500.0, 100.0).points(), &[0.0]);
        assert_eq!(SnapPoints::compute(300.0, 500.0, 100.0).points(), &[0.0]);
        assert_eq!(SnapPoints::compute(300.0, 500.0, 100.0).page_count(), 1);
    }

    #[test]
    fn test_degenerate_step_is_single_page() {
        assert!(SnapPoints::compute(1000.0, 200.0, 0.0).is_single_page());
        assert!(SnapPoints::compute(1000.0, 200.0, -5.0).is_single_page());
        assert!(SnapPoints::compute(1000.0, 200.0, f64::NAN).is_single_page());
        assert!(SnapPoints::compute(f64::INFINITY, 200.0, 100.0).is_single_page());
    }

    #[test]
    fn test_narrow_viewport_steps_one_column() {
        // rounds to zero columns per page, clamped to one
        let s = SnapPoints::compute(500.0, 40.0, 100.0);
        assert_eq!(s.points(), &[0.0, 100.0, 200.0, 300.0, 400.0, 460.0]);
    }

    #[test]
    fn test_iteration_bound() {
        let s = SnapPoints::compute(1.0e9, 1.0, 1.0);
        assert_eq!(s.page_count(), MAX_SNAP_POINTS + 1);
        assert_eq!(s.max_offset(), 1.0e9 - 1.0);
    }

    #[test]
    fn test_directional_index() {
        let s = snaps(&[0.0, 100.0, 200.0, 300.0]);
        assert_eq!(s.directional_index(150.0, 1.0), 2);
        assert_eq!(s.directional_index(150.0, -1.0), 1);
        assert_eq!(s.directional_index(150.0, 0.0), 1);
        assert_eq!(s.directional_index(350.0, 1.0), 3);
        assert_eq!(s.directional_index(-10.0, -1.0), 0);
        assert_eq!(s.directional_index(200.0, 1.0), 2);
        assert_eq!(s.directional_index(200.0, -1.0), 2);
    }

    #[test]
    fn test_nearest_tie_keeps_lower_index() {
        let s = snaps(&[0.0, 100.0, 200.0]);
        assert_eq!(s.nearest_index(50.0), 0);
        assert_eq!(s.nearest_index(51.0), 1);
        assert_eq!(s.nearest_index(1000.0), 2);
    }

    #[test]
    fn test_offset_of_clamps() {
        let s = snaps(&[0.0, 100.0, 200.0]);
        assert_eq!(s.offset_of(1), 100.0);
        assert_eq!(s.offset_of(9), 200.0);
    }
}
