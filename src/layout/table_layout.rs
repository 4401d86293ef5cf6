//! Cell geometry for a count-based table.
//!
//! Every line of the table (outer edge and grid) has the same thickness
//! `e`, the effective outer width. Cells are equal-sized and separated by
//! exactly `e`; the cells plus the lines tile `[0, width] x [0, height]`.
//!
//! ```text
//!  e   cell   e   cell   e
//! |##|------|##|------|##|
//! ```

/// Axis-aligned rectangle in shape coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by `amount` on every side. Never produces a negative size.
    pub fn inset(&self, amount: f32) -> Self {
        let amount = amount.max(0.0);
        let width = (self.width - amount * 2.0).max(0.0);
        let height = (self.height - amount * 2.0).max(0.0);
        Self {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }

    /// Area shared with `other` (0 when disjoint or touching).
    pub fn intersection_area(&self, other: &Self) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Straight line segment.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Line {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Line {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// Thickness of one shared table line: a border stroke with an outer
/// accent on each side.
pub fn effective_outer_width(border_width: f32, outer_border_width: f32) -> f32 {
    outer_border_width.max(0.0) * 2.0 + border_width.max(0.0)
}

/// Width (or height) of one cell along an axis of `count` cells.
#[allow(clippy::cast_precision_loss)]
pub fn cell_extent(count: usize, total: f32, e: f32) -> f32 {
    let n = count as f32;
    (total - e * 2.0 - e * (n - 1.0)) / n
}

/// Rectangle of cell `(row, col)`.
///
/// Counts must be at least 1; callers clamp them.
#[allow(clippy::cast_precision_loss)]
pub fn cell_rect(
    row: usize,
    col: usize,
    row_count: usize,
    col_count: usize,
    width: f32,
    height: f32,
    e: f32,
) -> Rect {
    let cell_width = cell_extent(col_count, width, e);
    let cell_height = cell_extent(row_count, height, e);
    let (r, c) = (row as f32, col as f32);
    Rect {
        x: c * cell_width + e * (c + 1.0),
        y: r * cell_height + e * (r + 1.0),
        width: cell_width,
        height: cell_height,
    }
}

/// Centre-line rectangle of the outer border. Stroked at `e`, its outer
/// edge is flush with the shape bounds.
pub fn outer_border_rect(width: f32, height: f32, e: f32) -> Rect {
    let margin = e / 2.0;
    Rect {
        x: margin,
        y: margin,
        width: width - margin * 2.0,
        height: height - margin * 2.0,
    }
}

/// Pre-computed geometry of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableLayout {
    pub rows: usize,
    pub cols: usize,
    pub width: f32,
    pub height: f32,
    /// Shared line thickness.
    pub line_width: f32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl TableLayout {
    pub fn new(rows: usize, cols: usize, width: f32, height: f32, line_width: f32) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let line_width = line_width.max(0.0);
        Self {
            rows,
            cols,
            width,
            height,
            line_width,
            cell_width: cell_extent(cols, width, line_width),
            cell_height: cell_extent(rows, height, line_width),
        }
    }

    /// Cell rectangle, or `None` for positions outside the grid.
    pub fn cell_rect(&self, row: usize, col: usize) -> Option<Rect> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(cell_rect(
            row,
            col,
            self.rows,
            self.cols,
            self.width,
            self.height,
            self.line_width,
        ))
    }

    /// Row-major iterator over every `(row, col, rect)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Rect)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols).filter_map(move |c| self.cell_rect(r, c).map(|rect| (r, c, rect)))
        })
    }

    pub fn outer_rect(&self) -> Rect {
        outer_border_rect(self.width, self.height, self.line_width)
    }

    /// Centre x of the line between column `c - 1` and column `c`.
    #[allow(clippy::cast_precision_loss)]
    pub fn column_line_x(&self, c: usize) -> f32 {
        c as f32 * (self.cell_width + self.line_width) + self.line_width / 2.0
    }

    /// Centre y of the line between row `r - 1` and row `r`.
    #[allow(clippy::cast_precision_loss)]
    pub fn row_line_y(&self, r: usize) -> f32 {
        r as f32 * (self.cell_height + self.line_width) + self.line_width / 2.0
    }

    /// Internal vertical grid lines, spanning the outer rectangle's height.
    pub fn vertical_lines(&self) -> Vec<Line> {
        let margin = self.line_width / 2.0;
        (1..self.cols)
            .map(|c| {
                let x = self.column_line_x(c);
                Line::new(x, margin, x, self.height - margin)
            })
            .collect()
    }

    /// Internal horizontal grid lines, spanning the outer rectangle's width.
    pub fn horizontal_lines(&self) -> Vec<Line> {
        let margin = self.line_width / 2.0;
        (1..self.rows)
            .map(|r| {
                let y = self.row_line_y(r);
                Line::new(margin, y, self.width - margin, y)
            })
            .collect()
    }

    /// Cell interior shrunk by `padding`.
    pub fn inner_rect(&self, row: usize, col: usize, padding: f32) -> Option<Rect> {
        self.cell_rect(row, col).map(|r| r.inset(padding))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_scenario() {
        let e = effective_outer_width(4.0, 0.0);
        let layout = TableLayout::new(2, 2, 400.0, 300.0, e);
        assert_eq!(layout.cell_width, 194.0);
        assert_eq!(layout.cell_height, 144.0);
        assert_eq!(layout.column_line_x(1), 200.0);
        assert_eq!(layout.row_line_y(1), 150.0);

        let a = layout.cell_rect(0, 0).unwrap();
        let b = layout.cell_rect(0, 1).unwrap();
        assert_eq!(a, Rect::new(4.0, 4.0, 194.0, 144.0));
        assert_eq!(b.x - a.right(), 4.0);
        // The midline splits the table in half.
        assert_eq!(layout.column_line_x(1) * 2.0, layout.width);
        assert_eq!(layout.row_line_y(1) * 2.0, layout.height);
    }

    #[test]
    fn test_effective_width() {
        assert_eq!(effective_outer_width(4.0, 0.0), 4.0);
        assert_eq!(effective_outer_width(2.0, 3.0), 8.0);
        assert_eq!(effective_outer_width(-1.0, -1.0), 0.0);
    }

    #[test]
    fn test_outer_rect_flush() {
        let r = outer_border_rect(100.0, 50.0, 6.0);
        assert_eq!(r, Rect::new(3.0, 3.0, 94.0, 44.0));
        assert_eq!(r.x - 3.0, 0.0);
        assert_eq!(r.right() + 3.0, 100.0);
    }

    #[test]
    fn test_out_of_range_cell() {
        let layout = TableLayout::new(2, 3, 300.0, 200.0, 1.0);
        assert!(layout.cell_rect(2, 0).is_none());
        assert!(layout.cell_rect(0, 3).is_none());
        assert_eq!(layout.cells().count(), 6);
    }

    #[test]
    fn test_grid_lines() {
        let layout = TableLayout::new(3, 2, 200.0, 300.0, 2.0);
        let v = layout.vertical_lines();
        let h = layout.horizontal_lines();
        assert_eq!(v.len(), 1);
        assert_eq!(h.len(), 2);
        assert_eq!(v[0].y0, 1.0);
        assert_eq!(v[0].y1, 299.0);
        assert_eq!(h[1].x1, 199.0);
    }

    #[test]
    fn test_inset_never_negative() {
        let r = Rect::new(10.0, 10.0, 20.0, 8.0).inset(5.0);
        assert_eq!(r.width, 10.0);
        assert_eq!(r.height, 0.0);
        assert_eq!(r.y, 14.0);
    }

    #[test]
    fn test_intersection_touching_is_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&b), 0.0);
        let c = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&c), 25.0);
    }
}
