//! Table model reshaping, merges and change tracking.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use tableshape::{
    Animatable, CellPos, CellStylePriority, CellTextStyle, FrameTime, Rgba, TableCell, TableModel,
};

fn styled_2x2() -> TableModel {
    let mut model = TableModel::new(2, 2);
    for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let cell = model.cell_mut(r, c).unwrap();
        cell.text = format!("{r}{c}");
        cell.style_priority = CellStylePriority::Override;
        cell.style.font_color = Rgba::rgb(10 * r as u8, 10 * c as u8, 0);
        cell.style.text_style = CellTextStyle::ShapedBorder;
    }
    model
}

#[test]
fn test_grow_2x2_to_3x2_keeps_cells() {
    let mut model = styled_2x2();
    let before = model.clone();
    assert!(model.resize(3, 2));
    assert_eq!(model.rows(), 3);
    assert_eq!(model.cols(), 2);
    for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        assert_eq!(model.cell(r, c), before.cell(r, c));
    }
    assert_eq!(model.cell(2, 0).unwrap(), &TableCell::default());
    assert_eq!(model.cell(2, 1).unwrap(), &TableCell::default());
}

#[test]
fn test_shrink_then_grow_loses_dropped_cells() {
    let mut model = styled_2x2();
    model.resize(1, 1);
    assert_eq!(model.cell(0, 0).unwrap().text, "00");
    model.resize(2, 2);
    assert_eq!(model.cell(1, 1).unwrap().text, "");
}

#[test]
fn test_resize_to_same_shape_is_noop() {
    let mut model = styled_2x2();
    let generation = model.generation();
    assert!(!model.resize(2, 2));
    assert_eq!(model.generation(), generation);
}

#[test]
fn test_resize_resets_boundary_hints() {
    let mut model = TableModel::new(2, 2);
    model.resize(3, 4);
    let t = FrameTime::default();
    let rows: Vec<f64> = model.row_boundaries().iter().map(|b| b.value_at(&t)).collect();
    let cols: Vec<f64> = model.column_boundaries().iter().map(|b| b.value_at(&t)).collect();
    assert_eq!(rows, vec![0.0, 50.0, 100.0, 150.0]);
    assert_eq!(cols, vec![0.0, 80.0, 160.0, 240.0, 320.0]);
}

#[test]
fn test_sync_boundaries_spreads_evenly() {
    let mut model = TableModel::new(2, 4);
    model.sync_boundaries(400.0, 300.0);
    let t = FrameTime::default();
    let cols: Vec<f64> = model.column_boundaries().iter().map(|b| b.value_at(&t)).collect();
    assert_eq!(cols, vec![0.0, 100.0, 200.0, 300.0, 400.0]);
    let rows: Vec<f64> = model.row_boundaries().iter().map(|b| b.value_at(&t)).collect();
    assert_eq!(rows, vec![0.0, 150.0, 300.0]);

    let generation = model.generation();
    model.sync_boundaries(400.0, 300.0);
    assert_eq!(model.generation(), generation);
}

#[test]
fn test_every_mutation_bumps_generation() {
    let mut model = TableModel::new(2, 2);
    let mut last = model.generation();
    let mut bumped = |model: &TableModel| {
        let moved = model.generation() != last;
        last = model.generation();
        moved
    };
    model.set_text(0, 0, "a");
    assert!(bumped(&model));
    model.resize(3, 3);
    assert!(bumped(&model));
    model.merge(0, 0, 1, 1).unwrap();
    assert!(bumped(&model));
    model.unmerge(CellPos::new(1, 1));
    assert!(bumped(&model));
    assert!(!model.set_text(9, 9, "out"));
    assert!(!bumped(&model));
}

#[test]
fn test_merge_links_children_to_root() {
    let mut model = TableModel::new(3, 3);
    model.merge(0, 1, 1, 2).unwrap();
    let root = model.cell(0, 1).unwrap();
    assert!(root.is_merge_root());
    assert_eq!((root.row_span, root.col_span), (2, 2));
    for (r, c) in [(0, 2), (1, 1), (1, 2)] {
        let child = model.cell(r, c).unwrap();
        assert!(child.is_merged_child());
        assert_eq!(child.parent, Some(CellPos::new(0, 1)));
    }
    assert!(!model.cell(0, 0).unwrap().is_merged_child());
}

#[test]
fn test_unmerge_from_child_clears_group() {
    let mut model = TableModel::new(3, 3);
    model.merge(1, 1, 2, 2).unwrap();
    model.unmerge(CellPos::new(2, 2));
    assert!(model.iter().all(|c| !c.is_merge_root() && !c.is_merged_child()));
}

#[test]
fn test_overlapping_merge_replaces_old_group() {
    let mut model = TableModel::new(3, 3);
    model.merge(0, 0, 1, 1).unwrap();
    model.merge(1, 1, 2, 2).unwrap();
    assert!(!model.cell(0, 0).unwrap().is_merge_root());
    assert!(model.cell(0, 1).unwrap().parent.is_none());
    assert!(model.cell(1, 1).unwrap().is_merge_root());
}

#[test]
fn test_merge_out_of_range_is_error() {
    let mut model = TableModel::new(2, 2);
    assert!(model.merge(0, 0, 2, 1).is_err());
    assert!(model.merge(1, 1, 0, 0).is_err());
}

#[test]
fn test_shrink_drops_merge_reaching_outside() {
    let mut model = TableModel::new(3, 3);
    model.merge(1, 1, 2, 2).unwrap();
    model.resize(2, 3);
    assert!(model.iter().all(|c| !c.is_merge_root() && !c.is_merged_child()));
}
