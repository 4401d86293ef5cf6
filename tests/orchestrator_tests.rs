//! Redraw skipping, animation and resource lifetime of the frame source.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::thread;
use std::time::Duration;

use common::{frame0, scenario, source};
use tableshape::render::{effective_style, ResolvedCellStyle};
use tableshape::{
    Animation, CellStylePriority, CellTextStyle, FrameTime, RecordingDevice, Rgba, TableError,
};

#[test]
fn test_style_resolution_is_idempotent() {
    let mut param = scenario();
    param.cell_style.font_size = Animation::keyframes(vec![10.0, 50.0], 1.0, 100.0);
    let cell = param.table_model.cell(0, 0).unwrap().clone();
    let time = FrameTime::new(15, 31, 30);
    let a: ResolvedCellStyle = effective_style(&cell, &param.cell_style).resolve(&time);
    let b = effective_style(&cell, &param.cell_style).resolve(&time);
    assert_eq!(a, b);
    assert!((a.font_size - 30.0).abs() < 0.5);
}

#[test]
fn test_unchanged_update_redraws_once() {
    let mut device = RecordingDevice::new();
    let mut s = source(scenario());
    s.parameter_mut().table_model.set_text(0, 0, "a");
    assert!(s.update(&mut device, &frame0()).unwrap());
    let stats = device.stats();
    for _ in 0..5 {
        assert!(!s.update(&mut device, &frame0()).unwrap());
    }
    assert_eq!(s.redraw_count(), 1);
    assert_eq!(device.stats(), stats);
}

#[test]
fn test_static_shape_skips_redraw_across_frames() {
    let mut device = RecordingDevice::new();
    let mut s = source(scenario());
    s.update(&mut device, &FrameTime::new(0, 60, 30)).unwrap();
    assert!(!s.update(&mut device, &FrameTime::new(30, 60, 30)).unwrap());
}

#[test]
fn test_animated_width_redraws_per_frame() {
    let mut param = scenario();
    param.width = Animation::keyframes(vec![400.0, 800.0], 0.0, 10_000.0);
    let mut device = RecordingDevice::new();
    let mut s = source(param);
    assert!(s.update(&mut device, &FrameTime::new(0, 60, 30)).unwrap());
    assert!(s.update(&mut device, &FrameTime::new(30, 60, 30)).unwrap());
    assert_eq!(s.redraw_count(), 2);
}

#[test]
fn test_animated_row_count_resizes_model() {
    let mut param = scenario();
    param.row_count = Animation::keyframes(vec![2.0, 4.0], 1.0, 100.0);
    param.table_model.set_text(1, 1, "kept");
    let mut device = RecordingDevice::new();
    let mut s = source(param);
    s.update(&mut device, &FrameTime::new(0, 11, 30)).unwrap();
    assert_eq!(s.parameter().table_model.rows(), 2);
    s.update(&mut device, &FrameTime::new(10, 11, 30)).unwrap();
    let model = &s.parameter().table_model;
    assert_eq!(model.rows(), 4);
    assert_eq!(model.cell(1, 1).unwrap().text, "kept");
}

#[test]
fn test_cell_style_edits_redraw() {
    let mut device = RecordingDevice::new();
    let mut s = source(scenario());
    s.parameter_mut().table_model.set_text(0, 0, "x");
    s.update(&mut device, &frame0()).unwrap();

    // The cell's own style is captured with the cell, so any edit is a miss.
    s.parameter_mut()
        .table_model
        .cell_mut(0, 0)
        .unwrap()
        .style
        .font_color = Rgba::rgb(1, 2, 3);
    assert!(s.update(&mut device, &frame0()).unwrap());

    let cell = s.parameter_mut().table_model.cell_mut(0, 0).unwrap();
    cell.style_priority = CellStylePriority::Override;
    cell.style.text_style = CellTextStyle::RoundedBorder;
    assert!(s.update(&mut device, &frame0()).unwrap());
    assert!(!s.update(&mut device, &frame0()).unwrap());
}

#[test]
fn test_every_device_object_released_exactly_once() {
    let mut device = RecordingDevice::new();
    let mut param = scenario();
    param.header_display = tableshape::ShowHeader::BothHeader;
    param.outer_border_width.set_value(2.0);
    param.cell_style.text_style = CellTextStyle::ShapedBorder;
    param.table_model.set_text(0, 0, "a");
    param.table_model.set_text(1, 1, "b\nc");
    let mut s = source(param);

    s.update(&mut device, &frame0()).unwrap();
    for color in [Rgba::rgb(255, 0, 0), Rgba::rgb(0, 255, 0), Rgba::rgb(0, 0, 255)] {
        s.parameter_mut().border_color = color;
        s.update(&mut device, &frame0()).unwrap();
    }
    assert!(device.live_resources() > 0);

    s.dispose(&mut device);
    let stats = device.stats();
    assert_eq!(device.live_resources(), 0);
    assert_eq!(stats.created, stats.released);
    assert_eq!(stats.double_releases, 0);
    assert_eq!(stats.unknown_releases, 0);
    assert_eq!(s.dispose(&mut device), 0);
    assert_eq!(device.stats().double_releases, 0);
}

#[test]
fn test_disposed_source_rejects_work() {
    let mut device = RecordingDevice::new();
    let mut s = source(scenario());
    s.update(&mut device, &frame0()).unwrap();
    s.dispose(&mut device);
    assert!(s.is_disposed());
    assert!(matches!(s.output(), Err(TableError::Disposed)));
    assert!(matches!(s.update(&mut device, &frame0()), Err(TableError::Disposed)));
}

#[test]
fn test_posted_edit_applies_on_next_update() {
    let mut device = RecordingDevice::new();
    let mut s = source(scenario());
    s.update(&mut device, &frame0()).unwrap();
    let editor = s.editor_handle();
    thread::spawn(move || {
        editor
            .post_edit(|p| {
                p.table_model.set_text(0, 0, "remote");
            })
            .unwrap();
    })
    .join()
    .unwrap();
    assert!(s.update(&mut device, &frame0()).unwrap());
    assert_eq!(s.parameter().table_model.cell(0, 0).unwrap().text, "remote");
}

#[test]
fn test_blocking_edit_returns_value() {
    let mut s = source(scenario());
    let editor = s.editor_handle();
    let worker = thread::spawn(move || editor.edit_blocking(|p| p.table_model.rows()));
    while !worker.is_finished() {
        s.drain_pending();
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(worker.join().unwrap().unwrap(), 2);
}
