//! Malformed JSON configurations and the host-facing entry points.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::frame0;
use tableshape::{
    host_catalog, render_table_svg, Animatable, FrameTime, RecordingDevice, TableError,
    TableShapeParameter, TableShapeSource, DEFAULT_FONT_NAME,
};
use test_case::test_case;

const GRID_2X2: &str = r#""rowCount": {"values": [2.0], "min": 1.0, "max": 100.0},
    "columnCount": {"values": [2.0], "min": 1.0, "max": 100.0}"#;

fn doc(body: &str) -> String {
    format!("{{{GRID_2X2}, {body}}}")
}

/// Load `json` and draw a few frames. Loading may reject the document, but
/// whatever loads must draw.
fn load_and_draw(json: &str) -> Result<TableShapeParameter, TableError> {
    let param = TableShapeParameter::from_json_str(json)?;
    let mut device = RecordingDevice::new();
    let mut source = TableShapeSource::new(param.clone(), Box::new(host_catalog(&param)));
    for frame in [0, 15, 29] {
        source.update(&mut device, &FrameTime::new(frame, 30, 30))?;
    }
    source.dispose(&mut device);
    Ok(param)
}

#[test_case(r#""tableModel": {"rowBoundaries": [
        {"values": [0.0], "min": 0.0, "max": 100000.0},
        {"values": [5.0], "min": 10.0, "max": 0.0},
        {"values": [100.0], "min": 0.0, "max": 100000.0}]}"# ; "inverted row boundary")]
#[test_case(r#""tableModel": {"columnBoundaries": [
        {"values": [0.0], "min": 0.0, "max": 100000.0},
        {"values": [50.0], "min": 100.0, "max": -1.0},
        {"values": [100.0], "min": 0.0, "max": 100000.0}]}"# ; "inverted column boundary")]
#[test_case(r#""tableModel": {"cells": [
        [{"text": "a"}],
        [{"text": "b"}, {"text": "c", "stylePriority": "Override",
            "style": {"fontSize": {"values": [20.0], "min": 50.0, "max": 1.0}}}]]}"# ; "ragged row with inverted font size")]
#[test_case(r#""cellStyle": {"padding": {"values": [4.0], "min": 8.0, "max": 2.0}}"# ; "inverted table padding")]
#[test_case(r#""height": {"values": [1e400], "min": 0.0, "max": 10000.0}"# ; "overflowing keyframe")]
#[test_case(r#""width": {"values": [], "min": 0.0, "max": 10000.0}"# ; "empty keyframes")]
#[test_case(r#""borderWidth": {"values": [-5.0, 1e9], "min": 1.0, "max": 100000.0}"# ; "keyframes out of range")]
fn test_malformed_config_never_panics(body: &str) {
    match load_and_draw(&doc(body)) {
        Ok(_) | Err(TableError::Config(_) | TableError::Json(_)) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_inverted_boundary_is_rejected() {
    let json = doc(r#""tableModel": {"rowBoundaries": [
        {"values": [0.0], "min": 0.0, "max": 100000.0},
        {"values": [5.0], "min": 10.0, "max": 0.0},
        {"values": [100.0], "min": 0.0, "max": 100000.0}]}"#);
    let err = TableShapeParameter::from_json_str(&json).unwrap_err();
    assert!(matches!(err, TableError::Config(ref m) if m.contains("boundaries[1]")), "{err}");
}

#[test]
fn test_ragged_cell_past_first_row_is_validated() {
    let json = doc(r#""tableModel": {"cells": [
        [{"text": "a"}],
        [{"text": "b"}, {"text": "c", "stylePriority": "Override",
            "style": {"fontSize": {"values": [20.0], "min": 50.0, "max": 1.0}}}]]}"#);
    let err = TableShapeParameter::from_json_str(&json).unwrap_err();
    assert!(matches!(err, TableError::Config(ref m) if m.contains("cells[1][1]")), "{err}");
}

#[test]
fn test_ragged_cell_keyframes_are_clamped() {
    let json = doc(r#""tableModel": {"cells": [
        [{"text": "a"}],
        [{"text": "b"}, {"text": "c", "stylePriority": "Override",
            "style": {"fontSize": {"values": [5000.0], "min": 1.0, "max": 1000.0}}}]]}"#);
    let param = load_and_draw(&json).unwrap();
    let cell = param.table_model.cell(1, 1).unwrap();
    assert_eq!(cell.text, "c");
    assert_eq!(cell.style.font_size.values(), &[1000.0]);
    assert_eq!(param.table_model.cell(0, 1).unwrap().text, "");
}

#[test]
fn test_empty_keyframes_fall_back_to_min() {
    let json = doc(r#""cellStyle": {"fontSize": {"values": [], "min": 12.0, "max": 1000.0}}"#);
    let param = load_and_draw(&json).unwrap();
    assert_eq!(param.cell_style.font_size.value_at(&frame0()), 12.0);
}

#[test]
fn test_host_catalog_knows_named_families() {
    let mut param = TableShapeParameter::with_grid(1, 2);
    param.cell_style.font = "Inter".to_string();
    param.table_model.cell_mut(0, 1).unwrap().style.font = "Noto Sans JP Bold".to_string();
    let catalog = host_catalog(&param);
    let families: Vec<&str> = catalog.faces().iter().map(|f| f.family.as_str()).collect();
    for family in [DEFAULT_FONT_NAME, "Inter", "Noto Sans JP Bold"] {
        assert!(families.contains(&family), "{family} missing");
    }
}

#[test]
fn test_host_catalog_fonts_resolve_from_cache() {
    let mut param = common::scenario();
    for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        param.table_model.set_text(r, c, "cell");
    }
    let mut device = RecordingDevice::new();
    let mut s = TableShapeSource::new(param.clone(), Box::new(host_catalog(&param)));
    s.update(&mut device, &frame0()).unwrap();
    let queries = s.resources().fonts.catalog_queries();
    assert!(s.resources().fonts.cached_len() > 0);

    s.parameter_mut().table_model.set_text(1, 1, "edited");
    assert!(s.update(&mut device, &frame0()).unwrap());
    assert_eq!(s.resources().fonts.catalog_queries(), queries);
}

#[test]
fn test_render_table_svg_scenario() {
    let json = r#"{
        "width": {"values": [400.0], "min": 0.0, "max": 10000.0},
        "height": {"values": [300.0], "min": 0.0, "max": 10000.0},
        "rowCount": {"values": [2.0], "min": 1.0, "max": 100.0},
        "columnCount": {"values": [2.0], "min": 1.0, "max": 100.0},
        "borderWidth": {"values": [4.0], "min": 1.0, "max": 100000.0},
        "outerBorderWidth": {"values": [0.0], "min": 0.0, "max": 100000.0}
    }"#;
    let svg = render_table_svg(json, 0, 60, 30).expect("render failed");
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\""));
    assert!(svg.contains(r#"<rect x="4" y="4" width="194" height="144""#));
    assert!(svg.contains(r#"<rect x="202" y="152" width="194" height="144""#));
    assert!(svg.contains(r#"<line x1="200" y1="2" x2="200" y2="298""#));
    assert!(svg.contains(r#"<line x1="2" y1="150" x2="398" y2="150""#));
}
