//! `TableView` - browser entry point drawing a table shape onto a canvas.

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::animation::{Animatable, FrameTime};
use crate::parameter::TableShapeParameter;
use crate::render::{CanvasDevice, MemoryFontCatalog};
use crate::shape::TableShapeSource;
use crate::types::DEFAULT_FONT_NAME;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.ceil().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

#[wasm_bindgen]
pub struct TableView {
    device: CanvasDevice,
    source: TableShapeSource,
}

#[wasm_bindgen]
impl TableView {
    /// Create a view drawing onto `canvas` with default parameters.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<TableView, JsValue> {
        console_error_panic_hook::set_once();
        let device = CanvasDevice::new(canvas)?;
        let source = TableShapeSource::new(
            TableShapeParameter::default(),
            Box::new(MemoryFontCatalog::with_families([DEFAULT_FONT_NAME])),
        );
        Ok(Self { device, source })
    }

    /// Replace the parameters with a JSON document.
    pub fn set_parameters(&mut self, json: &str) -> Result<(), JsValue> {
        let param = TableShapeParameter::from_json_str(json)?;
        self.source.set_parameter(param);
        Ok(())
    }

    /// Current parameters as JSON.
    pub fn parameters(&self) -> Result<String, JsValue> {
        Ok(self.source.parameter().to_json_string()?)
    }

    /// Set one cell's text. Returns false when out of range.
    pub fn set_cell_text(&mut self, row: usize, col: usize, text: &str) -> bool {
        self.source
            .parameter_mut()
            .table_model
            .set_text(row, col, text)
    }

    /// Draw `frame` and show it. Returns true when the table was redrawn.
    pub fn render(&mut self, frame: i32, length: i32, fps: i32) -> Result<bool, JsValue> {
        let time = FrameTime::new(frame, length, fps);
        let param = self.source.parameter();
        self.device.resize(
            pixels(param.width.value_at(&time)),
            pixels(param.height.value_at(&time)),
        );
        let redrawn = self.source.update(&mut self.device, &time)?;
        self.device.present(self.source.output()?)?;
        Ok(redrawn)
    }

    /// Release every canvas resource held by the view.
    pub fn dispose(&mut self) -> usize {
        self.source.dispose(&mut self.device)
    }
}
