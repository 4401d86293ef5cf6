//! Shared helpers for the integration tests.
//!
//! Every test drives the engine through the recording device and inspects
//! the resulting command list.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use tableshape::layout::Rect;
use tableshape::{
    DrawCommand, FrameTime, MemoryFontCatalog, RecordingDevice, Rgba, TableShapeParameter,
    TableShapeSource,
};

/// Family every test catalog knows about.
pub const TEST_FAMILY: &str = "Yu Gothic UI";

pub const EPS: f32 = 1e-3;

pub fn catalog() -> MemoryFontCatalog {
    MemoryFontCatalog::with_families([TEST_FAMILY, "Inter", "Noto Sans JP"])
}

pub fn frame0() -> FrameTime {
    FrameTime::new(0, 60, 30)
}

/// Parameters of the reference scenario: 2x2, 400x300, border 4, no outer border.
pub fn scenario() -> TableShapeParameter {
    let mut param = TableShapeParameter::with_grid(2, 2);
    param.width.set_value(400.0);
    param.height.set_value(300.0);
    param.border_width.set_value(4.0);
    param.outer_border_width.set_value(0.0);
    param
}

pub fn source(param: TableShapeParameter) -> TableShapeSource {
    TableShapeSource::new(param, Box::new(catalog()))
}

/// Draw one frame and return the recorded commands.
pub fn render(param: &TableShapeParameter) -> Vec<DrawCommand> {
    let mut device = RecordingDevice::new();
    let mut s = source(param.clone());
    s.update(&mut device, &frame0()).expect("update failed");
    let list = s.output().expect("no output");
    let commands = device.commands(list).expect("list released").to_vec();
    s.dispose(&mut device);
    commands
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

pub fn assert_rect(actual: &Rect, x: f32, y: f32, width: f32, height: f32) {
    assert!(
        approx(actual.x, x)
            && approx(actual.y, y)
            && approx(actual.width, width)
            && approx(actual.height, height),
        "expected ({x}, {y}, {width}, {height}), got {actual:?}"
    );
}

/// Background fills in draw order.
pub fn fills(commands: &[DrawCommand]) -> Vec<(Rect, Rgba)> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
            _ => None,
        })
        .collect()
}

/// Index of the first command matching `pred`.
pub fn position(commands: &[DrawCommand], pred: impl Fn(&DrawCommand) -> bool) -> Option<usize> {
    commands.iter().position(pred)
}
