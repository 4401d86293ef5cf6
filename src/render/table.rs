//! Whole-table drawing.
//!
//! [`TableFrame`] holds every table-wide value resolved for one frame;
//! [`draw_table`] walks the cells row-major (background, then text) and
//! finishes with the border passes.

use serde::{Deserialize, Serialize};

use super::backend::DrawingDevice;
use super::borders::{draw_borders, fill_cell_background};
use super::style::effective_style;
use super::text::draw_cell_text;
use super::RenderResources;
use crate::animation::{Animatable, FrameTime};
use crate::color::Rgba;
use crate::error::Result;
use crate::layout::{effective_outer_width, TableLayout};
use crate::parameter::TableShapeParameter;
use crate::types::{CellStyle, ShowHeader, TableModel};

#[allow(clippy::cast_possible_truncation)]
fn as_f32(value: f64) -> f32 {
    value as f32
}

/// Table-wide scalars and colours at one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFrame {
    pub width: f32,
    pub height: f32,
    pub rows: usize,
    pub cols: usize,
    pub border_width: f32,
    pub outer_border_width: f32,
    pub border_color: Rgba,
    pub outer_border_color: Rgba,
    pub background_color: Rgba,
    pub header_display: ShowHeader,
    pub header_row_color: Rgba,
    pub header_column_color: Rgba,
}

impl TableFrame {
    pub fn resolve(param: &TableShapeParameter, time: &FrameTime) -> Self {
        let (rows, cols) = param.grid_at(time);
        Self {
            width: as_f32(param.width.value_at(time)),
            height: as_f32(param.height.value_at(time)),
            rows,
            cols,
            border_width: as_f32(param.border_width.value_at(time)),
            outer_border_width: as_f32(param.outer_border_width.value_at(time)),
            border_color: param.border_color,
            outer_border_color: param.outer_border_color,
            background_color: param.background_color,
            header_display: param.header_display,
            header_row_color: param.header_row_background_color,
            header_column_color: param.header_column_background_color,
        }
    }

    /// Width of one shared grid line.
    pub fn line_width(&self) -> f32 {
        effective_outer_width(self.border_width, self.outer_border_width)
    }

    pub fn layout(&self) -> TableLayout {
        TableLayout::new(
            self.rows,
            self.cols,
            self.width,
            self.height,
            self.line_width(),
        )
    }
}

/// Counts reported by [`draw_table`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawSummary {
    pub cells_drawn: usize,
    /// Positions the model had no cell for.
    pub cells_skipped: usize,
}

/// Draw the table into the current target.
///
/// Positions outside `model` (counts and model out of step during a resize)
/// still get their background but no text.
pub fn draw_table<D: DrawingDevice + ?Sized>(
    device: &mut D,
    res: &mut RenderResources,
    frame: &TableFrame,
    model: &TableModel,
    defaults: &CellStyle,
    time: &FrameTime,
) -> Result<DrawSummary> {
    let layout = frame.layout();
    let mut summary = DrawSummary::default();

    for (row, col, rect) in layout.cells() {
        fill_cell_background(device, res, frame, row, col, rect)?;
        let Some(cell) = model.cell(row, col) else {
            tracing::warn!(row, col, "no model cell at grid position, skipping");
            summary.cells_skipped += 1;
            continue;
        };
        let style = effective_style(cell, defaults).resolve(time);
        draw_cell_text(device, res, rect, &cell.text, &style)?;
        summary.cells_drawn += 1;
    }

    draw_borders(device, res, frame, &layout)?;
    Ok(summary)
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
    use crate::layout::Rect;
    use crate::render::recording::{DrawCommand, RecordingDevice};

    fn render(param: &TableShapeParameter) -> (Vec<DrawCommand>, DrawSummary) {
        let time = FrameTime::default();
        let frame = TableFrame::resolve(param, &time);
        let mut device = RecordingDevice::new();
        let mut res = RenderResources::default();
        let list = device.create_command_list().unwrap();
        device.begin_draw(list);
        let summary = draw_table(
            &mut device,
            &mut res,
            &frame,
            &param.table_model,
            &param.cell_style,
            &time,
        )
        .unwrap();
        device.end_draw().unwrap();
        (device.commands(list).unwrap().to_vec(), summary)
    }

    fn scenario() -> TableShapeParameter {
        let mut param = TableShapeParameter::with_grid(2, 2);
        param.width.set_value(400.0);
        param.height.set_value(300.0);
        param.border_width.set_value(4.0);
        param
    }

    #[test]
    fn test_frame_resolution() {
        let frame = TableFrame::resolve(&scenario(), &FrameTime::default());
        assert_eq!(frame.rows, 2);
        assert_eq!(frame.cols, 2);
        assert_eq!(frame.line_width(), 4.0);
    }

    #[test]
    fn test_backgrounds_then_borders() {
        let (commands, summary) = render(&scenario());
        assert_eq!(summary.cells_drawn, 4);
        let fills: Vec<Rect> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(
            fills,
            vec![
                Rect::new(4.0, 4.0, 194.0, 144.0),
                Rect::new(202.0, 4.0, 194.0, 144.0),
                Rect::new(4.0, 152.0, 194.0, 144.0),
                Rect::new(202.0, 152.0, 194.0, 144.0),
            ]
        );
        let first_stroke = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::StrokeRect { .. }))
            .unwrap();
        let last_fill = commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::FillRect { .. }))
            .unwrap();
        assert!(last_fill < first_stroke);
    }

    #[test]
    fn test_text_follows_its_background() {
        let mut param = scenario();
        param.table_model.set_text(0, 1, "x");
        let (commands, _) = render(&param);
        let text_at = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::DrawText { .. }))
            .unwrap();
        assert!(matches!(commands[text_at - 2], DrawCommand::FillRect { .. }));
        assert!(matches!(commands[text_at - 1], DrawCommand::PushClip { .. }));
        assert!(matches!(commands[text_at + 2], DrawCommand::FillRect { .. }));
    }

    #[test]
    fn test_model_smaller_than_grid_skips_text() {
        let mut param = scenario();
        param.row_count.set_value(3.0);
        let (commands, summary) = render(&param);
        assert_eq!(summary.cells_drawn, 4);
        assert_eq!(summary.cells_skipped, 2);
        let fills = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(fills, 6);
    }
}
