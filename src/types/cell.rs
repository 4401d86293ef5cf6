use serde::{Deserialize, Serialize};

use super::style::{CellStyle, CellStylePriority};

/// Zero-based (row, column) position in the table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One logical table cell: text, its own style, and merge metadata.
///
/// A merged child points at its root through `parent`, a plain position
/// rather than a reference, so cells can be cloned and compared by value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TableCell {
    pub text: String,
    pub style: CellStyle,
    pub style_priority: CellStylePriority,
    pub row_span: usize,
    pub col_span: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CellPos>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            text: String::new(),
            style: CellStyle::default(),
            style_priority: CellStylePriority::Inherit,
            row_span: 1,
            col_span: 1,
            parent: None,
        }
    }
}

impl TableCell {
    /// A default cell holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_merged_child(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_merge_root(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }

    /// Drop any merge role.
    pub(crate) fn clear_merge(&mut self) {
        self.row_span = 1;
        self.col_span = 1;
        self.parent = None;
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
    use crate::types::CellTextStyle;

    #[test]
    fn test_default_cell() {
        let cell = TableCell::default();
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.col_span, 1);
        assert!(!cell.is_merged_child());
        assert!(!cell.is_merge_root());
    }

    #[test]
    fn test_value_equality_covers_style() {
        let a = TableCell::with_text("x");
        let mut b = a.clone();
        assert_eq!(a, b);
        b.style.text_style = CellTextStyle::RoundedBorder;
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_equality_covers_parent() {
        let a = TableCell::default();
        let mut b = a.clone();
        b.parent = Some(CellPos::new(0, 0));
        assert_ne!(a, b);
        assert!(b.is_merged_child());
    }
}
