//! Background and border compositing.
//!
//! Cell backgrounds go down first. Borders are stroked afterwards in two
//! passes over the same centre lines: the outer-border pass at the full
//! shared line width, then the border pass at the border width on top.
//! A pass whose width is not positive is skipped.

use super::backend::{BrushHandle, DrawingDevice, Point};
use super::cache::BrushSlot;
use super::table::TableFrame;
use super::RenderResources;
use crate::color::Rgba;
use crate::error::Result;
use crate::layout::{Rect, TableLayout};

/// Background slot and colour for the cell at (`row`, `col`).
///
/// The row header (first row) wins over the column header (first column)
/// for the corner cell.
pub fn background_for(frame: &TableFrame, row: usize, col: usize) -> (BrushSlot, Rgba) {
    if row == 0 && frame.header_display.row_header() {
        (BrushSlot::HeaderRow, frame.header_row_color)
    } else if col == 0 && frame.header_display.column_header() {
        (BrushSlot::HeaderColumn, frame.header_column_color)
    } else {
        (BrushSlot::Background, frame.background_color)
    }
}

/// Fill one cell's background.
pub fn fill_cell_background<D: DrawingDevice + ?Sized>(
    device: &mut D,
    res: &mut RenderResources,
    frame: &TableFrame,
    row: usize,
    col: usize,
    rect: Rect,
) -> Result<()> {
    let (slot, color) = background_for(frame, row, col);
    let brush = res
        .cache
        .slot_brush(device, &mut res.disposer, slot, color)?;
    device.fill_rect(rect, brush);
    Ok(())
}

/// Stroke the outer rectangle and every internal grid line at `width`.
pub fn stroke_grid<D: DrawingDevice + ?Sized>(
    device: &mut D,
    layout: &TableLayout,
    brush: BrushHandle,
    width: f32,
) {
    device.stroke_rect(layout.outer_rect(), brush, width);
    for line in layout
        .vertical_lines()
        .into_iter()
        .chain(layout.horizontal_lines())
    {
        device.draw_line(
            Point::new(line.x0, line.y0),
            Point::new(line.x1, line.y1),
            brush,
            width,
        );
    }
}

/// Run both border passes over `layout`.
pub fn draw_borders<D: DrawingDevice + ?Sized>(
    device: &mut D,
    res: &mut RenderResources,
    frame: &TableFrame,
    layout: &TableLayout,
) -> Result<()> {
    if frame.outer_border_width > 0.0 {
        let brush = res.cache.slot_brush(
            device,
            &mut res.disposer,
            BrushSlot::OuterBorder,
            frame.outer_border_color,
        )?;
        tracing::trace!(width = layout.line_width, "outer border pass");
        stroke_grid(device, layout, brush, layout.line_width);
    }
    if frame.border_width > 0.0 {
        let brush = res.cache.slot_brush(
            device,
            &mut res.disposer,
            BrushSlot::Border,
            frame.border_color,
        )?;
        tracing::trace!(width = frame.border_width, "border pass");
        stroke_grid(device, layout, brush, frame.border_width);
    }
    Ok(())
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
    use crate::render::recording::{DrawCommand, RecordingDevice};
    use crate::types::ShowHeader;
    use test_case::test_case;

    fn frame(border: f32, outer: f32) -> TableFrame {
        TableFrame {
            width: 400.0,
            height: 300.0,
            rows: 2,
            cols: 2,
            border_width: border,
            outer_border_width: outer,
            border_color: Rgba::BLACK,
            outer_border_color: Rgba::WHITE,
            background_color: Rgba::WHITE_SMOKE,
            header_display: ShowHeader::None,
            header_row_color: Rgba::rgb(255, 0, 0),
            header_column_color: Rgba::rgb(0, 0, 255),
        }
    }

    fn record(frame: &TableFrame) -> Vec<DrawCommand> {
        let mut device = RecordingDevice::new();
        let mut res = RenderResources::default();
        let list = device.create_command_list().unwrap();
        device.begin_draw(list);
        draw_borders(&mut device, &mut res, frame, &frame.layout()).unwrap();
        device.end_draw().unwrap();
        device.commands(list).unwrap().to_vec()
    }

    #[test_case(ShowHeader::None, 0, 0, BrushSlot::Background)]
    #[test_case(ShowHeader::RowHeader, 0, 1, BrushSlot::HeaderRow)]
    #[test_case(ShowHeader::RowHeader, 1, 0, BrushSlot::Background)]
    #[test_case(ShowHeader::ColumnHeader, 1, 0, BrushSlot::HeaderColumn)]
    #[test_case(ShowHeader::ColumnHeader, 0, 1, BrushSlot::Background)]
    #[test_case(ShowHeader::BothHeader, 0, 0, BrushSlot::HeaderRow)]
    #[test_case(ShowHeader::BothHeader, 1, 0, BrushSlot::HeaderColumn)]
    #[test_case(ShowHeader::BothHeader, 1, 1, BrushSlot::Background)]
    fn test_background_selection(mode: ShowHeader, row: usize, col: usize, expected: BrushSlot) {
        let mut f = frame(1.0, 0.0);
        f.header_display = mode;
        assert_eq!(background_for(&f, row, col).0, expected);
    }

    #[test]
    fn test_border_only_pass() {
        let commands = record(&frame(4.0, 0.0));
        // Outer rect plus one vertical and one horizontal line.
        assert_eq!(commands.len(), 3);
        let DrawCommand::StrokeRect { rect, width, color } = &commands[0] else {
            panic!("expected outer rect");
        };
        assert_eq!(*rect, Rect::new(2.0, 2.0, 396.0, 296.0));
        assert_eq!(*width, 4.0);
        assert_eq!(*color, Rgba::BLACK);
        let DrawCommand::DrawLine { from, to, .. } = &commands[1] else {
            panic!("expected vertical line");
        };
        assert_eq!(from.x, 200.0);
        assert_eq!(to.x, 200.0);
        assert_eq!(from.y, 2.0);
        assert_eq!(to.y, 298.0);
        let DrawCommand::DrawLine { from, .. } = &commands[2] else {
            panic!("expected horizontal line");
        };
        assert_eq!(from.y, 150.0);
    }

    #[test]
    fn test_outer_pass_precedes_border_pass() {
        let commands = record(&frame(2.0, 3.0));
        assert_eq!(commands.len(), 6);
        let widths: Vec<(f32, Rgba)> = commands
            .iter()
            .map(|c| match c {
                DrawCommand::StrokeRect { width, color, .. }
                | DrawCommand::DrawLine { width, color, .. } => (*width, *color),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        // Shared line width is 2 * 3 + 2.
        assert!(widths[..3].iter().all(|w| *w == (8.0, Rgba::WHITE)));
        assert!(widths[3..].iter().all(|w| *w == (2.0, Rgba::BLACK)));
    }

    #[test]
    fn test_passes_share_centre_lines() {
        let commands = record(&frame(2.0, 3.0));
        let xs: Vec<f32> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawLine { from, to, .. } if from.x == to.x => Some(from.x),
                _ => None,
            })
            .collect();
        assert_eq!(xs.len(), 2);
        assert_eq!(xs[0], xs[1]);
    }

    #[test]
    fn test_zero_border_skips_pass() {
        let commands = record(&frame(0.0, 0.0));
        assert!(commands.is_empty());
    }
}
