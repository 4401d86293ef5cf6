//! SVG export of a recorded command list.
//!
//! Plain text becomes `<text>`; outlined text becomes a stroked `<text>`
//! with `paint-order="stroke"` so the fill sits on top of the outline.
//! Clips become `<clipPath>` groups.

use std::iter::Peekable;

use super::backend::{LineCap, LineJoin, StrokeStyle};
use super::font::FontStyle;
use super::recording::{DrawCommand, TextRun};
use crate::color::Rgba;
use crate::layout::Rect;

/// Minimal XML escaping for attribute/text content.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// `fill="#RRGGBB"` plus an opacity attribute when translucent.
fn paint(attr: &str, color: Rgba) -> String {
    let hex = format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b);
    if color.a == 0xFF {
        format!(r#"{attr}="{hex}""#)
    } else {
        format!(r#"{attr}="{hex}" {attr}-opacity="{:.3}""#, color.alpha())
    }
}

fn rect_attrs(rect: &Rect) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}""#,
        rect.x, rect.y, rect.width, rect.height
    )
}

fn stroke_attrs(width: f32, style: &StrokeStyle) -> String {
    let join = match style.line_join {
        LineJoin::Miter => "miter",
        LineJoin::Round => "round",
    };
    let cap = match style.line_cap {
        LineCap::Square => "square",
        LineCap::Round => "round",
    };
    format!(
        r#"stroke-width="{width}" stroke-linejoin="{join}" stroke-linecap="{cap}" stroke-miterlimit="{}""#,
        style.miter_limit
    )
}

fn font_attrs(run: &TextRun) -> String {
    let style = match run.font.style {
        FontStyle::Normal => "",
        FontStyle::Italic => r#" font-style="italic""#,
        FontStyle::Oblique => r#" font-style="oblique""#,
    };
    format!(
        r#"font-family="{}" font-size="{}" font-weight="{}"{style}"#,
        xml_escape(&run.font.family),
        run.font.size,
        run.font.weight.value()
    )
}

fn push_text(out: &mut String, run: &TextRun, paint_attrs: &str) {
    let font = font_attrs(run);
    for line in run.lines.iter().filter(|l| !l.text.is_empty()) {
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" {font} {paint_attrs} xml:space=\"preserve\">{}</text>\n",
            line.x,
            line.baseline,
            xml_escape(&line.text)
        ));
    }
}

/// Emit one command, consuming a following fill when it completes an outline.
fn push_command<'a, I>(
    out: &mut String,
    command: &DrawCommand,
    rest: &mut Peekable<I>,
    clips: &mut usize,
    open: &mut usize,
) where
    I: Iterator<Item = &'a DrawCommand>,
{
    match command {
        DrawCommand::Clear { color: Some(color) } => {
            out.push_str(&format!(
                "<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" {}/>\n",
                paint("fill", *color)
            ));
        }
        DrawCommand::Clear { color: None } => {}
        DrawCommand::FillRect { rect, color } => {
            out.push_str(&format!("<rect {} {}/>\n", rect_attrs(rect), paint("fill", *color)));
        }
        DrawCommand::StrokeRect { rect, color, width } => {
            out.push_str(&format!(
                "<rect {} fill=\"none\" {} stroke-width=\"{width}\"/>\n",
                rect_attrs(rect),
                paint("stroke", *color)
            ));
        }
        DrawCommand::DrawLine {
            from,
            to,
            color,
            width,
        } => {
            out.push_str(&format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {} stroke-width=\"{width}\"/>\n",
                from.x,
                from.y,
                to.x,
                to.y,
                paint("stroke", *color)
            ));
        }
        DrawCommand::PushClip { rect } => {
            *clips += 1;
            *open += 1;
            out.push_str(&format!(
                "<clipPath id=\"clip{clips}\"><rect {}/></clipPath>\n<g clip-path=\"url(#clip{clips})\">\n",
                rect_attrs(rect)
            ));
        }
        DrawCommand::PopClip => {
            if *open > 0 {
                *open -= 1;
                out.push_str("</g>\n");
            }
        }
        DrawCommand::DrawText { run, color, .. } => {
            push_text(out, run, &paint("fill", *color));
        }
        DrawCommand::StrokeGlyphs {
            geometry,
            run,
            color,
            width,
            style,
            ..
        } => {
            let fill = match rest.peek() {
                Some(DrawCommand::FillGlyphs {
                    geometry: next,
                    color: fill,
                    ..
                }) if next == geometry => {
                    let fill = *fill;
                    rest.next();
                    paint("fill", fill)
                }
                _ => "fill=\"none\"".to_string(),
            };
            let attrs = format!(
                "{fill} {} {} paint-order=\"stroke\"",
                paint("stroke", *color),
                stroke_attrs(*width, style)
            );
            push_text(out, run, &attrs);
        }
        DrawCommand::FillGlyphs { run, color, .. } => {
            push_text(out, run, &paint("fill", *color));
        }
    }
}

/// Render `commands` as a standalone SVG document of `width` x `height`.
pub fn to_svg(commands: &[DrawCommand], width: f32, height: f32) -> String {
    let mut out = String::with_capacity(256 + commands.len() * 96);
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    ));
    let mut clips = 0;
    let mut open = 0;
    let mut iter = commands.iter().peekable();
    while let Some(command) = iter.next() {
        push_command(&mut out, command, &mut iter, &mut clips, &mut open);
    }
    for _ in 0..open {
        out.push_str("</g>\n");
    }
    out.push_str("</svg>\n");
    out
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
    use crate::render::backend::{GeometryHandle, Point, TextFormatSpec};
    use crate::render::font::FontWeight;
    use crate::render::recording::PlacedLine;
    use crate::types::TextAlignment;

    fn run(text: &str) -> TextRun {
        TextRun {
            font: TextFormatSpec {
                family: "Inter".to_string(),
                size: 20.0,
                weight: FontWeight::BOLD,
                style: FontStyle::Italic,
            },
            horizontal: TextAlignment::Leading,
            lines: vec![PlacedLine {
                text: text.to_string(),
                x: 1.0,
                baseline: 17.0,
                width: 10.0,
            }],
        }
    }

    #[test]
    fn test_document_frame() {
        let svg = to_svg(&[], 400.0, 300.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 400 300""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_rect_and_line() {
        let commands = vec![
            DrawCommand::FillRect {
                rect: Rect::new(4.0, 4.0, 194.0, 144.0),
                color: Rgba::new(255, 0, 0, 128),
            },
            DrawCommand::DrawLine {
                from: Point::new(200.0, 2.0),
                to: Point::new(200.0, 298.0),
                color: Rgba::BLACK,
                width: 4.0,
            },
        ];
        let svg = to_svg(&commands, 400.0, 300.0);
        assert!(svg.contains(
            r##"<rect x="4" y="4" width="194" height="144" fill="#FF0000" fill-opacity="0.502"/>"##
        ));
        assert!(svg.contains(
            r##"<line x1="200" y1="2" x2="200" y2="298" stroke="#000000" stroke-width="4"/>"##
        ));
    }

    #[test]
    fn test_text_escaped_and_clipped() {
        let commands = vec![
            DrawCommand::PushClip {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            },
            DrawCommand::DrawText {
                origin: Point::new(0.0, 0.0),
                run: run("a<b & c"),
                color: Rgba::BLACK,
            },
            DrawCommand::PopClip,
        ];
        let svg = to_svg(&commands, 10.0, 10.0);
        assert!(svg.contains("a&lt;b &amp; c"));
        assert!(svg.contains(r#"clip-path="url(#clip1)""#));
        assert!(svg.contains(r#"font-weight="700" font-style="italic""#));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
    }

    #[test]
    fn test_outline_merges_stroke_and_fill() {
        let geometry = GeometryHandle(7);
        let commands = vec![
            DrawCommand::StrokeGlyphs {
                geometry,
                origin: Point::default(),
                run: run("Hi"),
                color: Rgba::WHITE,
                width: 4.0,
                style: StrokeStyle::ROUNDED,
            },
            DrawCommand::FillGlyphs {
                geometry,
                origin: Point::default(),
                run: run("Hi"),
                color: Rgba::BLACK,
            },
        ];
        let svg = to_svg(&commands, 10.0, 10.0);
        assert_eq!(svg.matches("<text").count(), 1);
        assert!(svg.contains(r##"fill="#000000" stroke="#FFFFFF""##));
        assert!(svg.contains(r#"stroke-linejoin="round""#));
        assert!(svg.contains(r#"paint-order="stroke""#));
    }

    #[test]
    fn test_unbalanced_clip_closed() {
        let commands = vec![DrawCommand::PushClip {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        }];
        let svg = to_svg(&commands, 1.0, 1.0);
        assert_eq!(svg.matches("</g>").count(), 1);
    }
}
