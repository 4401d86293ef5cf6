//! Geometry properties of the table layout.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

mod common;

use common::{approx, assert_rect};
use tableshape::layout::{effective_outer_width, TableLayout};
use test_case::test_case;

const TOL: f32 = 1e-2;

/// A spread of valid inputs: counts, size, border and outer widths.
fn inputs() -> Vec<(usize, usize, f32, f32, f32, f32)> {
    let mut out = Vec::new();
    for rows in [1usize, 2, 3, 7] {
        for cols in [1usize, 2, 5, 9] {
            for (width, height) in [(400.0, 300.0), (1920.0, 1080.0), (333.0, 777.0)] {
                for (border, outer) in [(1.0, 0.0), (4.0, 0.0), (3.0, 2.5), (10.0, 6.0)] {
                    let e = effective_outer_width(border, outer);
                    let needed = e * (rows.max(cols) as f32 + 1.0);
                    if width > needed && height > needed {
                        out.push((rows, cols, width, height, border, outer));
                    }
                }
            }
        }
    }
    out
}

fn layout_of(rows: usize, cols: usize, width: f32, height: f32, border: f32, outer: f32) -> TableLayout {
    TableLayout::new(rows, cols, width, height, effective_outer_width(border, outer))
}

#[test]
fn test_all_cells_share_one_size() {
    for (rows, cols, w, h, b, o) in inputs() {
        let layout = layout_of(rows, cols, w, h, b, o);
        let first = layout.cell_rect(0, 0).unwrap();
        for (_, _, rect) in layout.cells() {
            assert!((rect.width - first.width).abs() < TOL);
            assert!((rect.height - first.height).abs() < TOL);
        }
    }
}

#[test]
fn test_adjacent_cells_are_one_line_apart() {
    for (rows, cols, w, h, b, o) in inputs() {
        let layout = layout_of(rows, cols, w, h, b, o);
        let e = layout.line_width;
        for (r, c, rect) in layout.cells() {
            if let Some(right) = layout.cell_rect(r, c + 1) {
                assert!((right.x - rect.right() - e).abs() < TOL, "{rows}x{cols} gap at ({r},{c})");
                assert_eq!(rect.intersection_area(&right), 0.0);
            }
            if let Some(below) = layout.cell_rect(r + 1, c) {
                assert!((below.y - rect.bottom() - e).abs() < TOL);
                assert_eq!(rect.intersection_area(&below), 0.0);
            }
        }
    }
}

#[test]
fn test_cells_inside_outer_rect() {
    for (rows, cols, w, h, b, o) in inputs() {
        let layout = layout_of(rows, cols, w, h, b, o);
        let outer = layout.outer_rect();
        for (_, _, rect) in layout.cells() {
            assert!(rect.x >= outer.x - TOL && rect.y >= outer.y - TOL);
            assert!(rect.right() <= outer.right() + TOL);
            assert!(rect.bottom() <= outer.bottom() + TOL);
        }
    }
}

#[test]
fn test_outer_rect_within_bounds() {
    for (rows, cols, w, h, b, o) in inputs() {
        let layout = layout_of(rows, cols, w, h, b, o);
        let e = layout.line_width;
        let outer = layout.outer_rect();
        assert!(outer.x >= 0.0 && outer.y >= 0.0);
        assert!(outer.right() <= w && outer.bottom() <= h);
        assert!(outer.x <= e / 2.0 + TOL && outer.y <= e / 2.0 + TOL);
        assert!(w - outer.right() <= e / 2.0 + TOL);
        assert!(h - outer.bottom() <= e / 2.0 + TOL);
    }
}

#[test]
fn test_grid_lines_centre_between_cells() {
    for (rows, cols, w, h, b, o) in inputs() {
        let layout = layout_of(rows, cols, w, h, b, o);
        for c in 1..cols {
            let left = layout.cell_rect(0, c - 1).unwrap();
            let right = layout.cell_rect(0, c).unwrap();
            let mid = (left.right() + right.x) / 2.0;
            assert!((layout.column_line_x(c) - mid).abs() < TOL);
        }
        for r in 1..rows {
            let above = layout.cell_rect(r - 1, 0).unwrap();
            let below = layout.cell_rect(r, 0).unwrap();
            let mid = (above.bottom() + below.y) / 2.0;
            assert!((layout.row_line_y(r) - mid).abs() < TOL);
        }
    }
}

#[test]
fn test_reference_scenario() {
    let layout = layout_of(2, 2, 400.0, 300.0, 4.0, 0.0);
    assert_rect(&layout.cell_rect(0, 0).unwrap(), 4.0, 4.0, 194.0, 144.0);
    assert_rect(&layout.cell_rect(0, 1).unwrap(), 202.0, 4.0, 194.0, 144.0);
    assert_rect(&layout.cell_rect(1, 0).unwrap(), 4.0, 152.0, 194.0, 144.0);
    assert_rect(&layout.cell_rect(1, 1).unwrap(), 202.0, 152.0, 194.0, 144.0);
    assert!(approx(layout.column_line_x(1), 200.0));
    assert!(approx(layout.row_line_y(1), 150.0));
    assert_rect(&layout.outer_rect(), 2.0, 2.0, 396.0, 296.0);

    // Cell pitch: cell plus one line.
    let a = layout.cell_rect(0, 0).unwrap();
    let b = layout.cell_rect(0, 1).unwrap();
    assert!(approx(b.x - a.x, 198.0));
}

#[test_case(4.0, 0.0, 4.0 ; "border only")]
#[test_case(4.0, 2.0, 8.0 ; "outer accent on both sides")]
#[test_case(0.0, 3.0, 6.0 ; "outer only")]
#[test_case(-1.0, -1.0, 0.0 ; "negative clamps to zero")]
fn test_effective_outer_width(border: f32, outer: f32, expected: f32) {
    assert!(approx(effective_outer_width(border, outer), expected));
}

#[test]
fn test_single_cell_fills_interior() {
    let layout = layout_of(1, 1, 100.0, 50.0, 2.0, 1.0);
    assert_rect(&layout.cell_rect(0, 0).unwrap(), 4.0, 4.0, 92.0, 42.0);
    assert!(layout.vertical_lines().is_empty());
    assert!(layout.horizontal_lines().is_empty());
}

#[test]
fn test_padding_shrinks_interior() {
    let layout = layout_of(2, 2, 400.0, 300.0, 4.0, 0.0);
    assert_rect(&layout.inner_rect(1, 1, 10.0).unwrap(), 212.0, 162.0, 174.0, 124.0);
    assert!(layout.inner_rect(2, 0, 0.0).is_none());
}
