//! End-to-end rendering scenarios through the recording device.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{approx, assert_rect, fills, position, render, scenario};
use tableshape::render::StrokeStyle;
use tableshape::{
    CellContentAlign, CellStylePriority, CellTextStyle, DrawCommand, Rgba, ShowHeader,
    TextAlignment,
};
use test_case::test_case;

fn lines(commands: &[DrawCommand]) -> Vec<(f32, f32, f32, f32, f32)> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::DrawLine { from, to, width, .. } => Some((from.x, from.y, to.x, to.y, *width)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_scenario_cells_and_midlines() {
    let commands = render(&scenario());
    assert!(matches!(commands[0], DrawCommand::Clear { color: None }));

    let cells = fills(&commands);
    assert_eq!(cells.len(), 4);
    assert_rect(&cells[0].0, 4.0, 4.0, 194.0, 144.0);
    assert_rect(&cells[1].0, 202.0, 4.0, 194.0, 144.0);
    assert_rect(&cells[2].0, 4.0, 152.0, 194.0, 144.0);
    assert_rect(&cells[3].0, 202.0, 152.0, 194.0, 144.0);
    assert!(cells.iter().all(|(_, color)| *color == Rgba::WHITE_SMOKE));

    let grid = lines(&commands);
    assert_eq!(grid.len(), 2);
    let (x0, y0, x1, y1, w) = grid[0];
    assert!(approx(x0, 200.0) && approx(x1, 200.0));
    assert!(approx(y0, 2.0) && approx(y1, 298.0));
    assert!(approx(w, 4.0));
    let (x0, y0, x1, y1, _) = grid[1];
    assert!(approx(y0, 150.0) && approx(y1, 150.0));
    assert!(approx(x0, 2.0) && approx(x1, 398.0));
}

#[test]
fn test_borders_drawn_after_every_cell() {
    let mut param = scenario();
    param.table_model.set_text(1, 1, "last");
    let commands = render(&param);
    let last_text = commands
        .iter()
        .rposition(|c| matches!(c, DrawCommand::DrawText { .. }))
        .unwrap();
    let first_stroke = position(&commands, |c| matches!(c, DrawCommand::StrokeRect { .. })).unwrap();
    assert!(last_text < first_stroke);
}

#[test]
fn test_outer_pass_under_border_pass() {
    let mut param = scenario();
    param.outer_border_width.set_value(2.0);
    param.outer_border_color = Rgba::rgb(0, 0, 255);
    let commands = render(&param);
    let strokes: Vec<_> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::StrokeRect { rect, color, width } => Some((*rect, *color, *width)),
            _ => None,
        })
        .collect();
    assert_eq!(strokes.len(), 2);
    // e = 2 * 2 + 4: the outer pass is the full shared line.
    assert_eq!(strokes[0].1, Rgba::rgb(0, 0, 255));
    assert!(approx(strokes[0].2, 8.0));
    assert_eq!(strokes[1].1, Rgba::BLACK);
    assert!(approx(strokes[1].2, 4.0));
    assert_eq!(strokes[0].0, strokes[1].0);
    assert_rect(&strokes[0].0, 4.0, 4.0, 392.0, 292.0);

    let grid = lines(&commands);
    assert_eq!(grid.len(), 4);
    assert_eq!(grid[0].0, grid[2].0);
    assert!(approx(grid[0].0, 200.0));
}

const RED: Rgba = Rgba::rgb(200, 40, 40);
const GREEN: Rgba = Rgba::rgb(40, 200, 40);
const BG: Rgba = Rgba::WHITE_SMOKE;

#[test_case(ShowHeader::None, [BG, BG, BG, BG])]
#[test_case(ShowHeader::RowHeader, [RED, RED, BG, BG])]
#[test_case(ShowHeader::ColumnHeader, [GREEN, BG, GREEN, BG])]
#[test_case(ShowHeader::BothHeader, [RED, RED, GREEN, BG])]
fn test_header_backgrounds(mode: ShowHeader, expected: [Rgba; 4]) {
    let mut param = scenario();
    param.header_display = mode;
    param.header_row_background_color = RED;
    param.header_column_background_color = GREEN;
    let colors: Vec<Rgba> = fills(&render(&param)).into_iter().map(|(_, c)| c).collect();
    assert_eq!(colors, expected);
}

#[test]
fn test_override_rounded_border_uses_outline_path() {
    let mut param = scenario();
    let cell = param.table_model.cell_mut(0, 1).unwrap();
    cell.text = "Score".to_string();
    cell.style_priority = CellStylePriority::Override;
    cell.style.text_style = CellTextStyle::RoundedBorder;
    cell.style.font_color = Rgba::rgb(255, 255, 0);
    cell.style.outline_color = Rgba::rgb(0, 0, 128);
    cell.style.outline_width.set_value(3.0);

    let commands = render(&param);
    let stroke = position(&commands, |c| matches!(c, DrawCommand::StrokeGlyphs { .. })).unwrap();
    let fill = position(&commands, |c| matches!(c, DrawCommand::FillGlyphs { .. })).unwrap();
    assert!(stroke < fill);
    assert!(!commands.iter().any(|c| matches!(c, DrawCommand::DrawText { .. })));

    match &commands[stroke] {
        DrawCommand::StrokeGlyphs { color, width, style, run, .. } => {
            assert_eq!(*color, Rgba::rgb(0, 0, 128));
            assert!(approx(*width, 6.0));
            assert_eq!(*style, StrokeStyle::ROUNDED);
            assert_eq!(run.lines[0].text, "Score");
        }
        other => panic!("unexpected {other:?}"),
    }
    match &commands[fill] {
        DrawCommand::FillGlyphs { color, .. } => assert_eq!(*color, Rgba::rgb(255, 255, 0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_inherit_ignores_cell_style_fields() {
    let mut param = scenario();
    let cell = param.table_model.cell_mut(0, 1).unwrap();
    cell.text = "Score".to_string();
    cell.style_priority = CellStylePriority::Inherit;
    cell.style.text_style = CellTextStyle::RoundedBorder;
    cell.style.font = "Inter".to_string();
    cell.style.font_color = Rgba::rgb(255, 255, 0);
    cell.style.align = CellContentAlign::TopLeft;

    let commands = render(&param);
    assert!(!commands.iter().any(|c| matches!(c, DrawCommand::StrokeGlyphs { .. })));
    let text = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::DrawText { run, color, .. } => Some((run, *color)),
            _ => None,
        })
        .unwrap();
    assert_eq!(text.1, Rgba::BLACK);
    assert_eq!(text.0.font.family, common::TEST_FAMILY);
    assert_eq!(text.0.horizontal, TextAlignment::Center);
}

#[test]
fn test_shaped_border_without_outline_width_fills_only() {
    let mut param = scenario();
    param.cell_style.text_style = CellTextStyle::ShapedBorder;
    param.cell_style.outline_width.set_value(0.0);
    param.table_model.set_text(0, 0, "x");
    let commands = render(&param);
    assert!(!commands.iter().any(|c| matches!(c, DrawCommand::StrokeGlyphs { .. })));
    assert!(commands.iter().any(|c| matches!(c, DrawCommand::FillGlyphs { .. })));
}

#[test]
fn test_text_clipped_to_its_cell() {
    let mut param = scenario();
    param.table_model.set_text(1, 0, "clipped");
    let commands = render(&param);
    let text = position(&commands, |c| matches!(c, DrawCommand::DrawText { .. })).unwrap();
    match &commands[text - 1] {
        DrawCommand::PushClip { rect } => assert_rect(rect, 4.0, 152.0, 194.0, 144.0),
        other => panic!("expected clip, got {other:?}"),
    }
    assert!(matches!(commands[text + 1], DrawCommand::PopClip));
}

#[test]
fn test_multi_line_text_uses_uniform_pitch() {
    let mut param = scenario();
    param.cell_style.font_size.set_value(20.0);
    param.cell_style.line_height_rate.set_value(150.0);
    param.cell_style.align = CellContentAlign::TopLeft;
    param.table_model.set_text(0, 0, "one\ntwo\nthree");
    let commands = render(&param);
    let run = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::DrawText { run, .. } => Some(run),
            _ => None,
        })
        .unwrap();
    assert_eq!(run.lines.len(), 3);
    let pitch = run.lines[1].baseline - run.lines[0].baseline;
    assert!(approx(pitch, 30.0));
    assert!(approx(run.lines[2].baseline - run.lines[1].baseline, pitch));
}

#[test]
fn test_zero_border_draws_no_lines() {
    let mut param = scenario();
    param.border_width = tableshape::Animation::new(0.0, 0.0, 10.0);
    let commands = render(&param);
    assert!(!commands
        .iter()
        .any(|c| matches!(c, DrawCommand::StrokeRect { .. } | DrawCommand::DrawLine { .. })));
    // Cells now touch the edges.
    assert_rect(&fills(&commands)[0].0, 0.0, 0.0, 200.0, 150.0);
}
