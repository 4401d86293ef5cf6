//! Cell text rendering.
//!
//! Text is laid out inside the padded cell interior and drawn clipped to
//! the cell. Plain cells draw the layout as filled text. Outlined cells
//! extract the glyph outlines, stroke them at twice the outline width,
//! then fill them on top.

use super::backend::{
    DrawingDevice, LayoutMetrics, LineSpacing, Point, StrokeStyle, TextFormatHandle,
    TextFormatSpec, TextLayoutHandle,
};
use super::style::ResolvedCellStyle;
use super::RenderResources;
use crate::error::Result;
use crate::layout::Rect;
use crate::types::{CellTextStyle, ParagraphAlignment};

/// Baseline position of a uniformly spaced line, as a fraction of the font size.
pub const BASELINE_RATIO: f32 = 0.85;

/// Run `f` with `rect` pushed as the clip; the clip is popped on every path.
pub fn with_clip<D, R, F>(device: &mut D, rect: Rect, f: F) -> Result<R>
where
    D: DrawingDevice + ?Sized,
    F: FnOnce(&mut D) -> Result<R>,
{
    device.push_clip(rect);
    let result = f(device);
    device.pop_clip();
    result
}

/// Spacing for a layout with `line_count` lines.
pub fn line_spacing_for(line_count: usize, style: &ResolvedCellStyle) -> LineSpacing {
    if line_count > 1 {
        LineSpacing::Uniform {
            height: style.line_spacing(),
            baseline: style.font_size * BASELINE_RATIO,
        }
    } else {
        LineSpacing::Default
    }
}

/// Height the text occupies: the uniform pitch times the line count for
/// multi-line text, the layout's own measure otherwise.
#[allow(clippy::cast_precision_loss)]
pub fn text_block_height(metrics: &LayoutMetrics, style: &ResolvedCellStyle) -> f32 {
    if metrics.line_count > 1 {
        metrics.line_count as f32 * style.line_spacing()
    } else {
        metrics.height
    }
}

/// Top of a text block of `block_height` inside `area` for the anchor.
pub fn anchored_top(area: &Rect, block_height: f32, anchor: ParagraphAlignment) -> f32 {
    match anchor {
        ParagraphAlignment::Near => area.y,
        ParagraphAlignment::Center => area.y + (area.height - block_height) / 2.0,
        ParagraphAlignment::Far => area.y + area.height - block_height,
    }
}

fn stroke_style(text_style: CellTextStyle) -> StrokeStyle {
    match text_style {
        CellTextStyle::RoundedBorder => StrokeStyle::ROUNDED,
        CellTextStyle::ShapedBorder | CellTextStyle::Normal => StrokeStyle::SHAPED,
    }
}

/// Draw `text` for one cell.
///
/// `cell_rect` is the clip; the text box is `cell_rect` shrunk by the
/// style's padding. Empty text draws nothing.
pub fn draw_cell_text<D: DrawingDevice + ?Sized>(
    device: &mut D,
    res: &mut RenderResources,
    cell_rect: Rect,
    text: &str,
    style: &ResolvedCellStyle,
) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }

    let font = res.fonts.resolve(&style.font_family, style.bold, style.italic);
    let spec = TextFormatSpec {
        family: font.family,
        size: style.font_size,
        weight: font.weight,
        style: font.style,
    };
    let format = res
        .cache
        .text_format(device, &mut res.disposer, &spec, style.line_height_rate)?;

    let outlined = style.text_style.is_outlined();
    let horizontal = style.align.horizontal();
    let vertical = style.align.vertical();
    // The outline path anchors vertically itself.
    let layout_vertical = if outlined {
        ParagraphAlignment::Near
    } else {
        vertical
    };
    device.set_text_alignment(format, horizontal, layout_vertical);

    let area = cell_rect.inset(style.padding);
    let fill = res.cache.brush(device, &mut res.disposer, style.font_color)?;
    let outline = if outlined {
        Some(res.cache.brush(device, &mut res.disposer, style.outline_color)?)
    } else {
        None
    };

    let layout = build_layout(device, text, format, &area, style)?;
    let result = with_clip(device, cell_rect, |device| {
        let metrics = device.layout_metrics(layout);
        match outline {
            None => {
                device.draw_text_layout(layout, Point::new(area.x, area.y), fill);
                Ok(())
            }
            Some(outline) => {
                let top = anchored_top(&area, text_block_height(&metrics, style), vertical);
                let geometry = device.glyph_outline(layout, Point::new(area.x, top))?;
                if style.outline_width > 0.0 {
                    device.stroke_geometry(
                        geometry,
                        outline,
                        style.outline_width * 2.0,
                        stroke_style(style.text_style),
                    );
                }
                device.fill_geometry(geometry, fill);
                device.release(geometry.into());
                Ok(())
            }
        }
    });
    device.release(layout.into());
    result
}

/// Lay out `text` in `area` and apply the line spacing rule.
fn build_layout<D: DrawingDevice + ?Sized>(
    device: &mut D,
    text: &str,
    format: TextFormatHandle,
    area: &Rect,
    style: &ResolvedCellStyle,
) -> Result<TextLayoutHandle> {
    let layout = device.create_text_layout(text, format, area.width, area.height)?;
    let lines = device.layout_metrics(layout).line_count;
    device.set_line_spacing(layout, line_spacing_for(lines, style));
    tracing::trace!(lines, "text layout");
    Ok(layout)
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
    use crate::animation::FrameTime;
    use crate::render::recording::{DrawCommand, RecordingDevice};
    use crate::types::{CellContentAlign, CellStyle};
    use test_case::test_case;

    fn resolved(text_style: CellTextStyle) -> ResolvedCellStyle {
        let mut style = ResolvedCellStyle::from_style(&CellStyle::default(), &FrameTime::default());
        style.text_style = text_style;
        style.font_size = 10.0;
        style
    }

    fn record(text: &str, style: &ResolvedCellStyle) -> (RecordingDevice, Vec<DrawCommand>) {
        let mut device = RecordingDevice::new();
        let mut res = RenderResources::default();
        let list = device.create_command_list().unwrap();
        device.begin_draw(list);
        draw_cell_text(&mut device, &mut res, Rect::new(0.0, 0.0, 200.0, 100.0), text, style)
            .unwrap();
        device.end_draw().unwrap();
        let commands = device.commands(list).unwrap().to_vec();
        (device, commands)
    }

    #[test]
    fn test_plain_text_is_clipped_fill() {
        let (_, commands) = record("hi", &resolved(CellTextStyle::Normal));
        assert!(matches!(commands[0], DrawCommand::PushClip { .. }));
        assert!(matches!(commands[1], DrawCommand::DrawText { .. }));
        assert!(matches!(commands[2], DrawCommand::PopClip));
        assert_eq!(commands.len(), 3);
    }

    #[test_case(CellTextStyle::ShapedBorder, StrokeStyle::SHAPED)]
    #[test_case(CellTextStyle::RoundedBorder, StrokeStyle::ROUNDED)]
    fn test_outline_strokes_then_fills(text_style: CellTextStyle, expected: StrokeStyle) {
        let style = resolved(text_style);
        let (_, commands) = record("hi", &style);
        match &commands[1] {
            DrawCommand::StrokeGlyphs { width, style: s, .. } => {
                assert_eq!(*width, style.outline_width * 2.0);
                assert_eq!(*s, expected);
            }
            other => panic!("expected stroke, got {other:?}"),
        }
        assert!(matches!(commands[2], DrawCommand::FillGlyphs { .. }));
        assert!(matches!(commands[3], DrawCommand::PopClip));
    }

    #[test]
    fn test_zero_outline_width_skips_stroke() {
        let mut style = resolved(CellTextStyle::ShapedBorder);
        style.outline_width = 0.0;
        let (_, commands) = record("hi", &style);
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::StrokeGlyphs { .. })));
        assert!(commands.iter().any(|c| matches!(c, DrawCommand::FillGlyphs { .. })));
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let (device, commands) = record("", &resolved(CellTextStyle::Normal));
        assert!(commands.is_empty());
        assert_eq!(device.stats().created, 1);
    }

    #[test]
    fn test_layouts_and_geometries_released() {
        let (device, _) = record("a\nb", &resolved(CellTextStyle::RoundedBorder));
        let stats = device.stats();
        assert_eq!(stats.layouts_created, 1);
        assert_eq!(stats.geometries_created, 1);
        // Command list, format and two brushes stay alive.
        assert_eq!(device.live_resources(), 4);
    }

    #[test]
    fn test_multiline_uses_uniform_spacing() {
        let style = resolved(CellTextStyle::Normal);
        assert_eq!(line_spacing_for(1, &style), LineSpacing::Default);
        assert_eq!(
            line_spacing_for(2, &style),
            LineSpacing::Uniform {
                height: 10.0,
                baseline: 8.5
            }
        );
    }

    #[test]
    fn test_outline_origin_centered_for_multiline() {
        let mut style = resolved(CellTextStyle::ShapedBorder);
        style.align = CellContentAlign::MiddleLeft;
        style.line_height_rate = 200.0;
        let (_, commands) = record("a\nb", &style);
        let DrawCommand::StrokeGlyphs { origin, .. } = &commands[1] else {
            panic!("expected stroke");
        };
        // Two lines at 20 px pitch, centred in a 100 px cell.
        assert_eq!(origin.y, 30.0);
        assert_eq!(origin.x, 0.0);
    }

    #[test_case(ParagraphAlignment::Near, 10.0)]
    #[test_case(ParagraphAlignment::Center, 40.0)]
    #[test_case(ParagraphAlignment::Far, 70.0)]
    fn test_anchored_top(anchor: ParagraphAlignment, expected: f32) {
        let area = Rect::new(0.0, 10.0, 50.0, 80.0);
        assert_eq!(anchored_top(&area, 20.0, anchor), expected);
    }

    #[test]
    fn test_clip_popped_on_error() {
        let mut device = RecordingDevice::new();
        let list = device.create_command_list().unwrap();
        device.begin_draw(list);
        let out: Result<()> = with_clip(&mut device, Rect::new(0.0, 0.0, 1.0, 1.0), |_| {
            Err("boom".into())
        });
        assert!(out.is_err());
        device.end_draw().unwrap();
        let commands = device.commands(list).unwrap();
        assert!(matches!(commands.last(), Some(DrawCommand::PopClip)));
    }
}
