//! Font resolution through the public resolver and the full draw path.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{catalog, frame0, scenario, source};
use tableshape::render::recording::TextRun;
use tableshape::render::{FontFace, FontResolver, FontStyle, FontWeight};
use tableshape::{DrawCommand, RecordingDevice};
use test_case::test_case;

#[test_case("Inter Bold", "Inter", FontWeight::BOLD, FontStyle::Normal)]
#[test_case("Inter-Italic", "Inter", FontWeight::NORMAL, FontStyle::Italic)]
#[test_case("Inter SemiBold Italic", "Inter", FontWeight::SEMI_BOLD, FontStyle::Italic)]
#[test_case("Noto Sans JP Light", "Noto Sans JP", FontWeight::LIGHT, FontStyle::Normal)]
#[test_case("Yu Gothic UI Black", "Yu Gothic UI", FontWeight::BLACK, FontStyle::Normal)]
fn test_suffixed_family_round_trip(raw: &str, base: &str, weight: FontWeight, style: FontStyle) {
    let mut faces = catalog();
    faces.add_face(FontFace::new(base, weight, style));
    let mut resolver = FontResolver::new(Box::new(faces));

    let font = resolver.resolve(raw, false, false);
    assert!(font.found, "{raw} not found");
    assert_eq!(font.family, base);
    assert_eq!(font.weight, weight);
    assert_eq!(font.style, style);

    let queries = resolver.catalog_queries();
    assert_eq!(resolver.resolve(raw, false, false), font);
    assert_eq!(resolver.catalog_queries(), queries);
}

#[test]
fn test_bold_flag_combines_with_family() {
    let mut resolver = FontResolver::new(Box::new(catalog()));
    let font = resolver.resolve("Inter Italic", true, false);
    assert_eq!(font.family, "Inter");
    assert_eq!(font.weight, FontWeight::BOLD);
    assert_eq!(font.style, FontStyle::Italic);
}

fn text_runs(commands: &[DrawCommand]) -> Vec<&TextRun> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::DrawText { run, .. } => Some(run),
            _ => None,
        })
        .collect()
}

#[test]
fn test_recorded_text_uses_resolved_face() {
    let mut param = scenario();
    param.cell_style.font = "Inter-Bold".to_string();
    param.table_model.set_text(0, 0, "Total");
    let commands = common::render(&param);
    let runs = text_runs(&commands);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].font.family, "Inter");
    assert_eq!(runs[0].font.weight, FontWeight::BOLD);
}

#[test]
fn test_unknown_family_still_draws() {
    let mut param = scenario();
    param.cell_style.font = "Nowhere Sans Bold".to_string();
    param.table_model.set_text(1, 1, "x");
    let commands = common::render(&param);
    let runs = text_runs(&commands);
    assert_eq!(runs[0].font.family, "Nowhere Sans");
    assert_eq!(runs[0].font.weight, FontWeight::BOLD);
}

#[test]
fn test_redraw_reuses_font_and_format() {
    let mut device = RecordingDevice::new();
    let mut param = scenario();
    param.cell_style.font = "Inter Bold".to_string();
    for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        param.table_model.set_text(r, c, "cell");
    }
    let mut s = source(param);
    s.update(&mut device, &frame0()).unwrap();
    let queries = s.resources().fonts.catalog_queries();
    let formats = device.stats().formats_created;
    assert_eq!(formats, 1);

    s.parameter_mut().table_model.set_text(0, 0, "edited");
    assert!(s.update(&mut device, &frame0()).unwrap());
    assert_eq!(s.resources().fonts.catalog_queries(), queries);
    assert_eq!(device.stats().formats_created, formats);
    assert!(s.resources().cache.stats().format_hits > 0);
}
