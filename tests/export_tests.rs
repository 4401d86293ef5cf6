//! JSON configuration, recorded command dumps and SVG export.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{catalog, frame0, scenario};
use tableshape::{
    record_frame, render_svg, CellContentAlign, CellStylePriority, CellTextStyle, Rgba,
    ShowHeader, TableShapeParameter,
};

const PARAMS: &str = r##"{
    "width": {"values": [400.0], "min": 0.0, "max": 10000.0},
    "height": {"values": [300.0], "min": 0.0, "max": 10000.0},
    "rowCount": {"values": [2.0], "min": 1.0, "max": 100.0},
    "columnCount": {"values": [2.0], "min": 1.0, "max": 100.0},
    "borderWidth": {"values": [4.0], "min": 1.0, "max": 100000.0},
    "headerDisplay": "RowHeader",
    "headerRowBackgroundColor": "#336699",
    "cellStyle": {"font": "Inter", "align": "TopLeft"},
    "tableModel": {
        "cells": [
            [{"text": "Name"}, {"text": "Score"}],
            [{"text": "A & B"}, {
                "text": "42",
                "stylePriority": "Override",
                "style": {"textStyle": "RoundedBorder", "fontColor": "#FFFF00"}
            }]
        ]
    }
}"##;

#[test]
fn test_json_document_loads() {
    let param = TableShapeParameter::from_json_str(PARAMS).unwrap();
    assert_eq!(param.header_display, ShowHeader::RowHeader);
    assert_eq!(param.header_row_background_color, Rgba::rgb(0x33, 0x66, 0x99));
    assert_eq!(param.cell_style.font, "Inter");
    assert_eq!(param.cell_style.align, CellContentAlign::TopLeft);
    // Fields left out keep their defaults.
    assert_eq!(param.cell_style.font_size.value(), 34.0);
    assert_eq!(param.outer_border_color, Rgba::WHITE);

    let model = &param.table_model;
    assert_eq!((model.rows(), model.cols()), (2, 2));
    assert_eq!(model.row_boundaries().len(), 3);
    let cell = model.cell(1, 1).unwrap();
    assert_eq!(cell.style_priority, CellStylePriority::Override);
    assert_eq!(cell.style.text_style, CellTextStyle::RoundedBorder);
}

#[test]
fn test_json_round_trip() {
    let param = TableShapeParameter::from_json_str(PARAMS).unwrap();
    let again = TableShapeParameter::from_json_str(&param.to_json_string().unwrap()).unwrap();
    assert_eq!(param, again);
}

#[test]
fn test_ragged_cells_are_padded() {
    let json = r#"{"tableModel": {"cells": [[{"text": "a"}], [{"text": "b"}, {"text": "c"}]]}}"#;
    let param = TableShapeParameter::from_json_str(json).unwrap();
    // Counts default to 1x1, so the model follows them.
    assert_eq!(param.table_model.rows(), 1);
    assert_eq!(param.table_model.cols(), 1);
    assert_eq!(param.table_model.cell(0, 0).unwrap().text, "a");
}

#[test]
fn test_record_frame_returns_resolved_frame() {
    let param = TableShapeParameter::from_json_str(PARAMS).unwrap();
    let (commands, frame) = record_frame(&param, &frame0(), Box::new(catalog())).unwrap();
    assert_eq!((frame.rows, frame.cols), (2, 2));
    assert_eq!(frame.width, 400.0);
    assert_eq!(frame.border_width, 4.0);
    assert!(!commands.is_empty());
}

#[test]
fn test_commands_serialize_with_op_tag() {
    let (commands, _) = record_frame(&scenario(), &frame0(), Box::new(catalog())).unwrap();
    let json = serde_json::to_value(&commands).unwrap();
    let ops: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops[0], "clear");
    assert_eq!(ops.iter().filter(|op| **op == "fillRect").count(), 4);
    assert_eq!(ops.iter().filter(|op| **op == "drawLine").count(), 2);
}

#[test]
fn test_svg_document() {
    let param = TableShapeParameter::from_json_str(PARAMS).unwrap();
    let svg = render_svg(&param, &frame0(), Box::new(catalog())).unwrap();
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\""));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(r##"<rect x="4" y="4" width="194" height="144" fill="#336699"/>"##));
    assert!(svg.contains(r##"<line x1="200" y1="2" x2="200" y2="298" stroke="#000000" stroke-width="4"/>"##));
    assert!(svg.contains(">A &amp; B</text>"));
    assert!(svg.contains(r#"font-family="Inter""#));
    assert_eq!(svg.matches("<clipPath").count(), 4);
    assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
}

#[test]
fn test_svg_outline_text_single_element() {
    let param = TableShapeParameter::from_json_str(PARAMS).unwrap();
    let svg = render_svg(&param, &frame0(), Box::new(catalog())).unwrap();
    let outlined: Vec<&str> = svg.lines().filter(|l| l.contains("paint-order")).collect();
    assert_eq!(outlined.len(), 1);
    let line = outlined[0];
    assert!(line.contains(r##"fill="#FFFF00""##));
    assert!(line.contains(r##"stroke="#FFFFFF""##));
    assert!(line.contains(r#"stroke-linejoin="round""#));
    assert!(line.contains(">42</text>"));
}
