//! The logical grid owned by a table shape.
//!
//! `cells` is always rectangular: every row holds exactly `cols()` cells.
//! Structural changes go through [`TableModel::resize`]; every mutation bumps
//! a generation counter so observers can detect edits without listeners.

use serde::{Deserialize, Serialize};

use super::cell::{CellPos, TableCell};
use crate::animation::Animation;
use crate::error::{Result, TableError};

/// Pitch of the row boundary hints written by a resize.
pub const DEFAULT_ROW_HEIGHT: f64 = 50.0;

/// Pitch of the column boundary hints written by a resize.
pub const DEFAULT_COL_WIDTH: f64 = 80.0;

const BOUNDARIES_MIN: f64 = 0.0;
const BOUNDARIES_MAX: f64 = 100_000.0;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TableModel {
    #[serde(default)]
    row_boundaries: Vec<Animation>,
    #[serde(default)]
    column_boundaries: Vec<Animation>,
    #[serde(default)]
    cells: Vec<Vec<TableCell>>,
    #[serde(skip)]
    generation: u64,
}

impl Default for TableModel {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl PartialEq for TableModel {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
            && self.row_boundaries == other.row_boundaries
            && self.column_boundaries == other.column_boundaries
    }
}

impl TableModel {
    /// Create a `rows` x `cols` grid of default cells. Counts are clamped to 1.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut model = Self {
            row_boundaries: Vec::new(),
            column_boundaries: Vec::new(),
            cells: Vec::new(),
            generation: 0,
        };
        model.resize(rows, cols);
        model
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Incremented on every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.cells.get(row)?.get(col)
    }

    /// Mutable access to a cell. Counts as a mutation.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.touch();
        self.cells.get_mut(row)?.get_mut(col)
    }

    /// Replace a cell's text. Returns false for out-of-range positions.
    pub fn set_text(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                cell.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Rows of cells in row-major order.
    pub fn grid(&self) -> &[Vec<TableCell>] {
        &self.cells
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &TableCell> {
        self.cells.iter().flatten()
    }

    pub fn row_boundaries(&self) -> &[Animation] {
        &self.row_boundaries
    }

    pub fn column_boundaries(&self) -> &[Animation] {
        &self.column_boundaries
    }

    /// Every cell, including any past `cols()` in a ragged row. Counts as
    /// a mutation.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = (CellPos, &mut TableCell)> {
        self.touch();
        self.cells.iter_mut().enumerate().flat_map(|(r, row)| {
            row.iter_mut()
                .enumerate()
                .map(move |(c, cell)| (CellPos::new(r, c), cell))
        })
    }

    /// Row boundaries followed by column boundaries. Counts as a mutation.
    pub fn boundaries_mut(&mut self) -> impl Iterator<Item = &mut Animation> {
        self.touch();
        self.row_boundaries.iter_mut().chain(self.column_boundaries.iter_mut())
    }

    /// Change the grid shape, keeping existing cells at their positions.
    ///
    /// New positions get default cells; boundary hints are reset. Merge
    /// links that would reach outside the new shape are dropped. Returns
    /// false (and changes nothing) when the shape is already `rows` x `cols`.
    pub fn resize(&mut self, rows: usize, cols: usize) -> bool {
        let rows = rows.max(1);
        let cols = cols.max(1);
        if rows == self.rows() && cols == self.cols() {
            return false;
        }

        let mut old = std::mem::take(&mut self.cells).into_iter();
        let mut cells = Vec::with_capacity(rows);
        for _ in 0..rows {
            let mut row: Vec<TableCell> = old
                .next()
                .map(|r| r.into_iter().take(cols).collect())
                .unwrap_or_default();
            row.resize_with(cols, TableCell::default);
            cells.push(row);
        }
        self.cells = cells;

        self.prune_merges();
        self.reset_boundaries(rows, cols);
        self.touch();
        true
    }

    fn reset_boundaries(&mut self, rows: usize, cols: usize) {
        #[allow(clippy::cast_precision_loss)]
        let hint = |i: usize, pitch: f64| Animation::new(i as f64 * pitch, BOUNDARIES_MIN, BOUNDARIES_MAX);
        self.row_boundaries = (0..=rows).map(|r| hint(r, DEFAULT_ROW_HEIGHT)).collect();
        self.column_boundaries = (0..=cols).map(|c| hint(c, DEFAULT_COL_WIDTH)).collect();
    }

    /// Spread the boundary hints evenly over `width` x `height`.
    ///
    /// Only the first keyframe of each boundary is written.
    pub fn sync_boundaries(&mut self, width: f64, height: f64) {
        let rows = self.rows();
        let cols = self.cols();
        let mut changed = false;
        if cols > 0 {
            #[allow(clippy::cast_precision_loss)]
            let step = width / cols as f64;
            for (c, boundary) in self.column_boundaries.iter_mut().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let target = (c as f64 * step).clamp(BOUNDARIES_MIN, BOUNDARIES_MAX);
                if boundary.is_animated() || (boundary.value() - target).abs() > f64::EPSILON {
                    boundary.set_value(target);
                    changed = true;
                }
            }
        }
        if rows > 0 {
            #[allow(clippy::cast_precision_loss)]
            let step = height / rows as f64;
            for (r, boundary) in self.row_boundaries.iter_mut().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let target = (r as f64 * step).clamp(BOUNDARIES_MIN, BOUNDARIES_MAX);
                if boundary.is_animated() || (boundary.value() - target).abs() > f64::EPSILON {
                    boundary.set_value(target);
                    changed = true;
                }
            }
        }
        if changed {
            self.touch();
        }
    }

    /// Mark the rectangle `top..=bottom` x `left..=right` as one merged cell.
    ///
    /// The top-left cell becomes the root; every other covered cell gets a
    /// back-link to it. Overlapping merges are unmerged first.
    pub fn merge(&mut self, top: usize, left: usize, bottom: usize, right: usize) -> Result<()> {
        if top > bottom || left > right || bottom >= self.rows() || right >= self.cols() {
            return Err(TableError::Other(format!(
                "merge range ({top},{left})-({bottom},{right}) outside {}x{} table",
                self.rows(),
                self.cols()
            )));
        }
        for r in top..=bottom {
            for c in left..=right {
                self.unmerge(CellPos::new(r, c));
            }
        }
        let root = CellPos::new(top, left);
        for r in top..=bottom {
            for c in left..=right {
                if let Some(cell) = self.cells.get_mut(r).and_then(|row| row.get_mut(c)) {
                    if r == top && c == left {
                        cell.row_span = bottom - top + 1;
                        cell.col_span = right - left + 1;
                        cell.parent = None;
                    } else {
                        cell.clear_merge();
                        cell.parent = Some(root);
                    }
                }
            }
        }
        self.touch();
        Ok(())
    }

    /// Split the merge group containing `pos` back into single cells.
    pub fn unmerge(&mut self, pos: CellPos) {
        let Some(cell) = self.cell(pos.row, pos.col) else {
            return;
        };
        let root = cell.parent.unwrap_or(pos);
        let Some(root_cell) = self.cell(root.row, root.col) else {
            return;
        };
        if !root_cell.is_merge_root() && cell.parent.is_none() {
            return;
        }
        let bottom = root.row + root_cell.row_span.max(1) - 1;
        let right = root.col + root_cell.col_span.max(1) - 1;
        for r in root.row..=bottom {
            for c in root.col..=right {
                if let Some(cell) = self.cells.get_mut(r).and_then(|row| row.get_mut(c)) {
                    if (r == root.row && c == root.col) || cell.parent == Some(root) {
                        cell.clear_merge();
                    }
                }
            }
        }
        self.touch();
    }

    /// Drop merge roots and children whose group no longer fits the grid.
    fn prune_merges(&mut self) {
        let rows = self.rows();
        let cols = self.cols();
        let mut broken = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_merge_root() && (r + cell.row_span > rows || c + cell.col_span > cols) {
                    broken.push(CellPos::new(r, c));
                }
            }
        }
        for row in &mut self.cells {
            for cell in row.iter_mut() {
                let orphaned = cell
                    .parent
                    .is_some_and(|p| p.row >= rows || p.col >= cols || broken.contains(&p));
                if orphaned {
                    cell.clear_merge();
                }
            }
        }
        for pos in broken {
            if let Some(cell) = self.cells.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
                cell.clear_merge();
            }
        }
    }

    /// Repair a deserialized model: pad ragged rows and fix boundary counts.
    pub fn normalize(&mut self) {
        let rows = self.rows().max(1);
        let cols = self.cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        self.cells.resize_with(rows, Vec::new);
        for row in &mut self.cells {
            row.resize_with(cols, TableCell::default);
        }
        if self.row_boundaries.len() != rows + 1 || self.column_boundaries.len() != cols + 1 {
            self.reset_boundaries(rows, cols);
        }
        self.prune_merges();
        self.touch();
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
    fn test_new_shape() {
        let model = TableModel::new(3, 4);
        assert_eq!(model.rows(), 3);
        assert_eq!(model.cols(), 4);
        assert!(model.grid().iter().all(|r| r.len() == 4));
        assert_eq!(model.row_boundaries().len(), 4);
        assert_eq!(model.column_boundaries().len(), 5);
    }

    #[test]
    fn test_zero_counts_clamp_to_one() {
        let model = TableModel::new(0, 0);
        assert_eq!(model.rows(), 1);
        assert_eq!(model.cols(), 1);
    }

    #[test]
    fn test_resize_preserves_cells() {
        let mut model = TableModel::new(2, 2);
        model.set_text(0, 0, "a");
        model.set_text(1, 1, "d");
        assert!(model.resize(3, 2));
        assert_eq!(model.cell(0, 0).unwrap().text, "a");
        assert_eq!(model.cell(1, 1).unwrap().text, "d");
        assert_eq!(model.cell(2, 0).unwrap(), &TableCell::default());
        assert_eq!(model.cell(2, 1).unwrap(), &TableCell::default());
    }

    #[test]
    fn test_resize_same_shape_is_noop() {
        let mut model = TableModel::new(2, 2);
        let gen = model.generation();
        assert!(!model.resize(2, 2));
        assert_eq!(model.generation(), gen);
    }

    #[test]
    fn test_shrink_drops_cells() {
        let mut model = TableModel::new(3, 3);
        model.set_text(2, 2, "gone");
        model.resize(2, 2);
        model.resize(3, 3);
        assert_eq!(model.cell(2, 2).unwrap().text, "");
    }

    #[test]
    fn test_boundary_reset_pitch() {
        let model = TableModel::new(2, 3);
        assert_eq!(model.row_boundaries()[2].value(), 2.0 * DEFAULT_ROW_HEIGHT);
        assert_eq!(model.column_boundaries()[3].value(), 3.0 * DEFAULT_COL_WIDTH);
    }

    #[test]
    fn test_sync_boundaries() {
        let mut model = TableModel::new(2, 4);
        model.sync_boundaries(400.0, 300.0);
        let cols: Vec<f64> = model.column_boundaries().iter().map(Animation::value).collect();
        assert_eq!(cols, vec![0.0, 100.0, 200.0, 300.0, 400.0]);
        let rows: Vec<f64> = model.row_boundaries().iter().map(Animation::value).collect();
        assert_eq!(rows, vec![0.0, 150.0, 300.0]);

        let gen = model.generation();
        model.sync_boundaries(400.0, 300.0);
        assert_eq!(model.generation(), gen);
    }

    #[test]
    fn test_generation_bumps_on_edit() {
        let mut model = TableModel::new(1, 1);
        let gen = model.generation();
        model.set_text(0, 0, "x");
        assert!(model.generation() > gen);
        assert!(!model.set_text(5, 5, "y"));
    }

    #[test]
    fn test_merge_and_unmerge() {
        let mut model = TableModel::new(3, 3);
        model.merge(0, 0, 1, 1).unwrap();
        let root = model.cell(0, 0).unwrap();
        assert!(root.is_merge_root());
        assert_eq!((root.row_span, root.col_span), (2, 2));
        assert_eq!(model.cell(1, 1).unwrap().parent, Some(CellPos::new(0, 0)));
        assert!(model.cell(2, 2).unwrap().parent.is_none());

        model.unmerge(CellPos::new(1, 0));
        assert!(!model.cell(0, 0).unwrap().is_merge_root());
        assert!(model.iter().all(|c| c.parent.is_none()));
    }

    #[test]
    fn test_merge_out_of_range() {
        let mut model = TableModel::new(2, 2);
        assert!(model.merge(0, 0, 2, 1).is_err());
        assert!(model.merge(1, 1, 0, 0).is_err());
    }

    #[test]
    fn test_shrink_prunes_merges() {
        let mut model = TableModel::new(3, 3);
        model.merge(1, 1, 2, 2).unwrap();
        model.resize(2, 3);
        assert!(!model.cell(1, 1).unwrap().is_merge_root());
        assert!(model.iter().all(|c| c.parent.is_none()));
    }

    #[test]
    fn test_normalize_ragged_rows() {
        let json = r#"{"rowBoundaries":[],"columnBoundaries":[],"cells":[[{"text":"a"}],[{"text":"b"},{"text":"c"}]]}"#;
        let mut model: TableModel = serde_json::from_str(json).unwrap();
        model.normalize();
        assert_eq!(model.rows(), 2);
        assert_eq!(model.cols(), 2);
        assert_eq!(model.cell(0, 0).unwrap().text, "a");
        assert_eq!(model.cell(1, 1).unwrap().text, "c");
        assert_eq!(model.column_boundaries().len(), 3);
    }
}
