//! tableshape - table shape renderer for video compositions
//!
//! Draws a rows x columns grid with layered borders, header backgrounds and
//! per-cell styled text through a pluggable drawing device:
//! - Exact cell geometry with shared grid-line centre lines
//! - Outer-border and border passes over the same lines
//! - Table-wide or per-cell text style, plain or outlined glyphs
//! - Font family suffix parsing with a cached catalog lookup
//! - Redraw skipped when nothing render-affecting changed
//!
//! # Usage (Rust)
//!
//! ```no_run
//! use tableshape::{FrameTime, MemoryFontCatalog, RecordingDevice, TableShapeParameter, TableShapeSource};
//!
//! let mut device = RecordingDevice::new();
//! let mut source = TableShapeSource::new(
//!     TableShapeParameter::with_grid(2, 2),
//!     Box::new(MemoryFontCatalog::new()),
//! );
//! source.update(&mut device, &FrameTime::new(0, 60, 30))?;
//! let _list = source.output()?;
//! # Ok::<(), tableshape::TableError>(())
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { TableView } from 'tableshape';
//! await init();
//! const view = new TableView(canvas);
//! view.set_parameters(json);
//! view.render(frame, length, fps);
//! ```

pub mod animation;
pub mod color;
pub mod dispatch;
pub mod error;
pub mod layout;
pub mod parameter;
pub mod render;
pub mod shape;
pub mod types;
#[cfg(target_arch = "wasm32")]
pub mod view;

use wasm_bindgen::prelude::*;

pub use animation::{Animatable, Animation, FrameTime};
pub use color::Rgba;
pub use error::{Result, TableError};
pub use parameter::TableShapeParameter;
pub use render::{
    DrawCommand, DrawingDevice, FontCatalog, MemoryFontCatalog, RecordingDevice, TableFrame,
};
pub use shape::{EditorHandle, TableShapeSource};
#[cfg(target_arch = "wasm32")]
pub use view::TableView;

pub use types::*;

/// Draw one frame of `param` through a fresh recording device.
///
/// Returns the recorded commands and the resolved table-wide values.
pub fn record_frame(
    param: &TableShapeParameter,
    time: &FrameTime,
    catalog: Box<dyn FontCatalog>,
) -> Result<(Vec<DrawCommand>, TableFrame)> {
    let mut device = RecordingDevice::new();
    let mut source = TableShapeSource::new(param.clone(), catalog);
    source.update(&mut device, time)?;
    let list = source.output()?;
    let commands = device.commands(list).map(<[DrawCommand]>::to_vec).unwrap_or_default();
    let frame = TableFrame::resolve(source.parameter(), time);
    source.dispose(&mut device);
    Ok((commands, frame))
}

/// Draw one frame of `param` and export it as SVG.
pub fn render_svg(
    param: &TableShapeParameter,
    time: &FrameTime,
    catalog: Box<dyn FontCatalog>,
) -> Result<String> {
    let (commands, frame) = record_frame(param, time, catalog)?;
    Ok(render::to_svg(&commands, frame.width, frame.height))
}

/// Catalog for hosts that resolve font names themselves (browsers, SVG
/// viewers): the default family plus every family `param` names.
pub fn host_catalog(param: &TableShapeParameter) -> MemoryFontCatalog {
    let mut catalog = MemoryFontCatalog::with_families([DEFAULT_FONT_NAME]);
    let named = std::iter::once(&param.cell_style)
        .chain(param.table_model.iter().map(|cell| &cell.style));
    for style in named {
        if !style.font.trim().is_empty() {
            catalog.add_family(style.font.trim());
        }
    }
    catalog
}

/// Render a table described by JSON parameters to an SVG string
///
/// # Errors
/// Returns an error if the parameters are invalid or drawing fails.
#[wasm_bindgen]
pub fn render_table_svg(
    json: &str,
    frame: i32,
    length: i32,
    fps: i32,
) -> std::result::Result<String, JsValue> {
    let param =
        TableShapeParameter::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let catalog = Box::new(host_catalog(&param));
    render_svg(&param, &FrameTime::new(frame, length, fps), catalog)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render a table and return the recorded command list as a `JsValue`
///
/// # Errors
/// Returns an error if the parameters are invalid or drawing fails.
#[wasm_bindgen]
pub fn render_table_commands(
    json: &str,
    frame: i32,
    length: i32,
    fps: i32,
) -> std::result::Result<JsValue, JsValue> {
    let param =
        TableShapeParameter::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let catalog = Box::new(host_catalog(&param));
    let (commands, _) = record_frame(&param, &FrameTime::new(frame, length, fps), catalog)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&commands)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
