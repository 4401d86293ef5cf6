//! Geometry engine for the table shape.
//!
//! This module handles:
//! - Converting row/column counts and the shape size into cell rectangles
//! - The outer border rectangle and internal grid line positions
//! - Padded interior rectangles for text

mod table_layout;

pub use table_layout::{
    cell_extent, cell_rect, effective_outer_width, outer_border_rect, Line, Rect, TableLayout,
};
