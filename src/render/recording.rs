//! In-memory drawing device.
//!
//! `RecordingDevice` keeps every drawing call as a serialisable
//! [`DrawCommand`] per command list, with colours and text placement
//! resolved so the list can be inspected or exported without the device.
//! Text layout is a deterministic approximation: ASCII characters advance
//! half an em, everything else a full em, lines wrap greedily at spaces
//! (or anywhere for unbroken runs) and break at `\n`.
//!
//! The device also counts resource creations and releases so callers can
//! check that every object is released exactly once.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::backend::{
    BrushHandle, CommandListHandle, DrawingDevice, GeometryHandle, LayoutMetrics, LineSpacing,
    Point, Resource, StrokeStyle, TextFormatHandle, TextFormatSpec, TextLayoutHandle,
};
use crate::color::Rgba;
use crate::error::{Result, TableError};
use crate::layout::Rect;
use crate::types::{ParagraphAlignment, TextAlignment};

/// Natural line height, in ems.
pub const NATURAL_LINE_HEIGHT: f32 = 1.2;

/// Natural baseline offset from the line top, in ems.
pub const NATURAL_BASELINE: f32 = 0.95;

/// One line of placed text. Coordinates are absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
}

/// Text with its font and final line positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub font: TextFormatSpec,
    pub horizontal: TextAlignment,
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Clear {
        color: Option<Rgba>,
    },
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    StrokeRect {
        rect: Rect,
        color: Rgba,
        width: f32,
    },
    DrawLine {
        from: Point,
        to: Point,
        color: Rgba,
        width: f32,
    },
    PushClip {
        rect: Rect,
    },
    PopClip,
    DrawText {
        origin: Point,
        run: TextRun,
        color: Rgba,
    },
    StrokeGlyphs {
        geometry: GeometryHandle,
        origin: Point,
        run: TextRun,
        color: Rgba,
        width: f32,
        style: StrokeStyle,
    },
    FillGlyphs {
        geometry: GeometryHandle,
        origin: Point,
        run: TextRun,
        color: Rgba,
    },
}

/// Resource accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub created: usize,
    pub released: usize,
    /// Releases of handles that were already released.
    pub double_releases: usize,
    /// Releases of handles this device never created.
    pub unknown_releases: usize,
    pub command_lists_created: usize,
    pub brushes_created: usize,
    pub formats_created: usize,
    pub layouts_created: usize,
    pub geometries_created: usize,
    pub draws: usize,
}

#[derive(Debug, Clone)]
struct FormatState {
    spec: TextFormatSpec,
    horizontal: TextAlignment,
    vertical: ParagraphAlignment,
}

/// Wrapped text inside a box, with the alignment it was created under.
#[derive(Debug, Clone)]
pub struct TextBlock {
    font: TextFormatSpec,
    horizontal: TextAlignment,
    vertical: ParagraphAlignment,
    max_width: f32,
    max_height: f32,
    /// Line text and its advance width.
    lines: Vec<(String, f32)>,
    spacing: LineSpacing,
}

impl TextBlock {
    /// Wrap `text` to `max_width` using `advance` for character widths.
    pub fn new<F>(
        text: &str,
        font: TextFormatSpec,
        align: (TextAlignment, ParagraphAlignment),
        max_width: f32,
        max_height: f32,
        advance: F,
    ) -> Self
    where
        F: Fn(char) -> f32,
    {
        Self {
            lines: wrap_with(text, max_width, advance),
            font,
            horizontal: align.0,
            vertical: align.1,
            max_width,
            max_height,
            spacing: LineSpacing::Default,
        }
    }

    pub fn set_spacing(&mut self, spacing: LineSpacing) {
        self.spacing = spacing;
    }

    pub fn font(&self) -> &TextFormatSpec {
        &self.font
    }

    fn line_metrics(&self) -> (f32, f32) {
        match self.spacing {
            LineSpacing::Default => (
                self.font.size * NATURAL_LINE_HEIGHT,
                self.font.size * NATURAL_BASELINE,
            ),
            LineSpacing::Uniform { height, baseline } => (height, baseline),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn metrics(&self) -> LayoutMetrics {
        let (line_height, _) = self.line_metrics();
        LayoutMetrics {
            line_count: self.lines.len(),
            width: self.lines.iter().map(|(_, w)| *w).fold(0.0, f32::max),
            height: self.lines.len() as f32 * line_height,
        }
    }

    /// Final line positions with the box's top-left at `origin`.
    #[allow(clippy::cast_precision_loss)]
    pub fn place(&self, origin: Point) -> TextRun {
        let (line_height, baseline) = self.line_metrics();
        let height = self.metrics().height;
        let top = match self.vertical {
            ParagraphAlignment::Near => 0.0,
            ParagraphAlignment::Center => (self.max_height - height) / 2.0,
            ParagraphAlignment::Far => self.max_height - height,
        };
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, (text, width))| {
                let x = match self.horizontal {
                    TextAlignment::Leading => 0.0,
                    TextAlignment::Center => (self.max_width - width) / 2.0,
                    TextAlignment::Trailing => self.max_width - width,
                };
                PlacedLine {
                    text: text.clone(),
                    x: origin.x + x,
                    baseline: origin.y + top + i as f32 * line_height + baseline,
                    width: *width,
                }
            })
            .collect();
        TextRun {
            font: self.font.clone(),
            horizontal: self.horizontal,
            lines,
        }
    }
}

#[derive(Debug, Clone)]
struct GeometryState {
    origin: Point,
    run: TextRun,
}

#[derive(Debug, Default)]
struct ListState {
    commands: Vec<DrawCommand>,
    closed: bool,
}

/// Advance of `c` at `size`.
pub fn advance(c: char, size: f32) -> f32 {
    if c.is_control() {
        0.0
    } else if c.is_ascii() {
        size * 0.5
    } else {
        size
    }
}

pub fn measure(text: &str, size: f32) -> f32 {
    text.chars().map(|c| advance(c, size)).sum()
}

/// Break `text` into lines no wider than `max_width` (when positive).
///
/// Lines break at `\n`, then greedily at the last space that fits; a run
/// with no space breaks at the character that overflows.
pub fn wrap_with<F>(text: &str, max_width: f32, advance: F) -> Vec<(String, f32)>
where
    F: Fn(char) -> f32,
{
    let width_of = |s: &str| -> f32 { s.chars().map(&advance).sum() };
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut line = String::new();
        let mut width = 0.0;
        let mut last_space: Option<usize> = None;
        for c in paragraph.chars() {
            let adv = advance(c);
            if max_width > 0.0 && width + adv > max_width && !line.is_empty() && c != ' ' {
                let rest = match last_space {
                    Some(idx) => line.split_off(idx),
                    None => String::new(),
                };
                let done = line.trim_end().to_string();
                if !done.is_empty() {
                    let done_width = width_of(&done);
                    out.push((done, done_width));
                }
                line = rest.trim_start().to_string();
                width = width_of(&line);
                last_space = None;
            }
            // Leading spaces are indentation, not break points.
            if c == ' ' && !line.trim_start().is_empty() {
                last_space = Some(line.len());
            }
            line.push(c);
            width += adv;
        }
        let done = line.trim_end().to_string();
        let done_width = width_of(&done);
        out.push((done, done_width));
    }
    out
}

/// [`wrap_with`] using the fixed half-em/full-em advances.
pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<(String, f32)> {
    wrap_with(text, max_width, |c| advance(c, size))
}

/// Reference device that records commands in memory.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u32,
    lists: HashMap<u32, ListState>,
    brushes: HashMap<u32, Rgba>,
    formats: HashMap<u32, FormatState>,
    layouts: HashMap<u32, TextBlock>,
    geometries: HashMap<u32, GeometryState>,
    released: HashSet<Resource>,
    target: Option<CommandListHandle>,
    clip_depth: usize,
    pending_error: Option<String>,
    fail_glyph_outlines: bool,
    stats: DeviceStats,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// Objects created and not yet released.
    pub fn live_resources(&self) -> usize {
        self.lists.len()
            + self.brushes.len()
            + self.formats.len()
            + self.layouts.len()
            + self.geometries.len()
    }

    /// Commands recorded into `list`, if it is alive.
    pub fn commands(&self, list: CommandListHandle) -> Option<&[DrawCommand]> {
        self.lists.get(&list.0).map(|l| l.commands.as_slice())
    }

    pub fn is_closed(&self, list: CommandListHandle) -> bool {
        self.lists.get(&list.0).is_some_and(|l| l.closed)
    }

    /// Make every later `glyph_outline` call fail.
    pub fn set_fail_glyph_outlines(&mut self, fail: bool) {
        self.fail_glyph_outlines = fail;
    }

    fn next_handle(&mut self) -> u32 {
        self.next_id += 1;
        self.stats.created += 1;
        self.next_id
    }

    fn flag(&mut self, message: impl Into<String>) {
        if self.pending_error.is_none() {
            self.pending_error = Some(message.into());
        }
    }

    fn record(&mut self, command: DrawCommand) {
        let Some(target) = self.target else {
            self.flag("drawing outside begin_draw/end_draw");
            return;
        };
        match self.lists.get_mut(&target.0) {
            Some(list) => list.commands.push(command),
            None => self.flag(format!("target {target:?} was released while drawing")),
        }
    }

    fn brush_color(&mut self, brush: BrushHandle) -> Option<Rgba> {
        let color = self.brushes.get(&brush.0).copied();
        if color.is_none() {
            self.flag(format!("unknown brush {brush:?}"));
        }
        color
    }

    fn geometry(&mut self, geometry: GeometryHandle) -> Option<GeometryState> {
        let state = self.geometries.get(&geometry.0).cloned();
        if state.is_none() {
            self.flag(format!("unknown geometry {geometry:?}"));
        }
        state
    }
}

impl DrawingDevice for RecordingDevice {
    fn create_command_list(&mut self) -> Result<CommandListHandle> {
        let id = self.next_handle();
        self.lists.insert(id, ListState::default());
        self.stats.command_lists_created += 1;
        Ok(CommandListHandle(id))
    }

    fn begin_draw(&mut self, target: CommandListHandle) {
        if self.target.is_some() {
            self.flag("begin_draw while already drawing");
        }
        match self.lists.get(&target.0) {
            Some(list) if list.closed => self.flag(format!("{target:?} is closed")),
            Some(_) => {}
            None => self.flag(format!("unknown command list {target:?}")),
        }
        self.target = Some(target);
        self.clip_depth = 0;
        self.stats.draws += 1;
    }

    fn end_draw(&mut self) -> Result<()> {
        if self.target.take().is_none() {
            self.flag("end_draw without begin_draw");
        }
        if self.clip_depth != 0 {
            let depth = self.clip_depth;
            self.clip_depth = 0;
            self.flag(format!("{depth} clip(s) still pushed at end_draw"));
        }
        match self.pending_error.take() {
            Some(message) => Err(TableError::Device(message)),
            None => Ok(()),
        }
    }

    fn close_command_list(&mut self, list: CommandListHandle) {
        match self.lists.get_mut(&list.0) {
            Some(state) => state.closed = true,
            None => self.flag(format!("unknown command list {list:?}")),
        }
    }

    fn clear(&mut self, color: Option<Rgba>) {
        self.record(DrawCommand::Clear { color });
    }

    fn create_solid_brush(&mut self, color: Rgba) -> Result<BrushHandle> {
        let id = self.next_handle();
        self.brushes.insert(id, color);
        self.stats.brushes_created += 1;
        Ok(BrushHandle(id))
    }

    fn fill_rect(&mut self, rect: Rect, brush: BrushHandle) {
        if let Some(color) = self.brush_color(brush) {
            self.record(DrawCommand::FillRect { rect, color });
        }
    }

    fn stroke_rect(&mut self, rect: Rect, brush: BrushHandle, width: f32) {
        if let Some(color) = self.brush_color(brush) {
            self.record(DrawCommand::StrokeRect { rect, color, width });
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, brush: BrushHandle, width: f32) {
        if let Some(color) = self.brush_color(brush) {
            self.record(DrawCommand::DrawLine {
                from,
                to,
                color,
                width,
            });
        }
    }

    fn push_clip(&mut self, rect: Rect) {
        self.clip_depth += 1;
        self.record(DrawCommand::PushClip { rect });
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            self.flag("pop_clip without push_clip");
            return;
        }
        self.clip_depth -= 1;
        self.record(DrawCommand::PopClip);
    }

    fn create_text_format(&mut self, spec: &TextFormatSpec) -> Result<TextFormatHandle> {
        if spec.size.is_nan() || spec.size <= 0.0 {
            return Err(TableError::Device(format!(
                "invalid font size {} for '{}'",
                spec.size, spec.family
            )));
        }
        let id = self.next_handle();
        self.formats.insert(
            id,
            FormatState {
                spec: spec.clone(),
                horizontal: TextAlignment::Leading,
                vertical: ParagraphAlignment::Near,
            },
        );
        self.stats.formats_created += 1;
        Ok(TextFormatHandle(id))
    }

    fn set_text_alignment(
        &mut self,
        format: TextFormatHandle,
        horizontal: TextAlignment,
        vertical: ParagraphAlignment,
    ) {
        match self.formats.get_mut(&format.0) {
            Some(state) => {
                state.horizontal = horizontal;
                state.vertical = vertical;
            }
            None => self.flag(format!("unknown text format {format:?}")),
        }
    }

    fn create_text_layout(
        &mut self,
        text: &str,
        format: TextFormatHandle,
        max_width: f32,
        max_height: f32,
    ) -> Result<TextLayoutHandle> {
        let Some(state) = self.formats.get(&format.0).cloned() else {
            return Err(TableError::Device(format!("unknown text format {format:?}")));
        };
        let size = state.spec.size;
        let block = TextBlock::new(
            text,
            state.spec,
            (state.horizontal, state.vertical),
            max_width,
            max_height,
            |c| advance(c, size),
        );
        let id = self.next_handle();
        self.layouts.insert(id, block);
        self.stats.layouts_created += 1;
        Ok(TextLayoutHandle(id))
    }

    fn layout_metrics(&self, layout: TextLayoutHandle) -> LayoutMetrics {
        self.layouts
            .get(&layout.0)
            .map(TextBlock::metrics)
            .unwrap_or_default()
    }

    fn set_line_spacing(&mut self, layout: TextLayoutHandle, spacing: LineSpacing) {
        match self.layouts.get_mut(&layout.0) {
            Some(block) => block.set_spacing(spacing),
            None => self.flag(format!("unknown text layout {layout:?}")),
        }
    }

    fn draw_text_layout(&mut self, layout: TextLayoutHandle, origin: Point, brush: BrushHandle) {
        let Some(color) = self.brush_color(brush) else {
            return;
        };
        let Some(run) = self.layouts.get(&layout.0).map(|l| l.place(origin)) else {
            self.flag(format!("unknown text layout {layout:?}"));
            return;
        };
        self.record(DrawCommand::DrawText { origin, run, color });
    }

    fn glyph_outline(&mut self, layout: TextLayoutHandle, origin: Point) -> Result<GeometryHandle> {
        if self.fail_glyph_outlines {
            return Err(TableError::Device("glyph outline extraction failed".to_string()));
        }
        let Some(run) = self.layouts.get(&layout.0).map(|l| l.place(origin)) else {
            return Err(TableError::Device(format!("unknown text layout {layout:?}")));
        };
        let id = self.next_handle();
        self.geometries.insert(id, GeometryState { origin, run });
        self.stats.geometries_created += 1;
        Ok(GeometryHandle(id))
    }

    fn stroke_geometry(
        &mut self,
        geometry: GeometryHandle,
        brush: BrushHandle,
        width: f32,
        style: StrokeStyle,
    ) {
        let (Some(color), Some(state)) = (self.brush_color(brush), self.geometry(geometry)) else {
            return;
        };
        self.record(DrawCommand::StrokeGlyphs {
            geometry,
            origin: state.origin,
            run: state.run,
            color,
            width,
            style,
        });
    }

    fn fill_geometry(&mut self, geometry: GeometryHandle, brush: BrushHandle) {
        let (Some(color), Some(state)) = (self.brush_color(brush), self.geometry(geometry)) else {
            return;
        };
        self.record(DrawCommand::FillGlyphs {
            geometry,
            origin: state.origin,
            run: state.run,
            color,
        });
    }

    fn release(&mut self, resource: Resource) {
        let removed = match resource {
            Resource::CommandList(h) => {
                if self.target == Some(h) {
                    self.target = None;
                }
                self.lists.remove(&h.0).is_some()
            }
            Resource::Brush(h) => self.brushes.remove(&h.0).is_some(),
            Resource::TextFormat(h) => self.formats.remove(&h.0).is_some(),
            Resource::TextLayout(h) => self.layouts.remove(&h.0).is_some(),
            Resource::Geometry(h) => self.geometries.remove(&h.0).is_some(),
        };
        if removed {
            self.released.insert(resource);
            self.stats.released += 1;
        } else if self.released.contains(&resource) {
            tracing::warn!(?resource, "resource released twice");
            self.stats.double_releases += 1;
        } else {
            self.stats.unknown_releases += 1;
        }
    }
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
    use crate::render::font::{FontStyle, FontWeight};

    fn spec() -> TextFormatSpec {
        TextFormatSpec {
            family: "Inter".to_string(),
            size: 10.0,
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
        }
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure("ab", 10.0), 10.0);
        assert_eq!(measure("表", 10.0), 10.0);
        assert_eq!(measure("a表", 20.0), 30.0);
    }

    #[test]
    fn test_wrap_at_spaces() {
        let lines = wrap_text("aaaa bbbb cc", 10.0, 30.0);
        let texts: Vec<&str> = lines.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["aaaa", "bbbb", "cc"]);
        assert_eq!(lines[0].1, 20.0);
    }

    #[test]
    fn test_wrap_long_word_anywhere() {
        let lines = wrap_text("表表表表", 10.0, 25.0);
        let texts: Vec<&str> = lines.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["表表", "表表"]);
    }

    #[test]
    fn test_wrap_leading_space_has_no_empty_line() {
        let lines = wrap_text(" aaaaaaaa", 10.0, 30.0);
        let texts: Vec<&str> = lines.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec![" aaaaa", "aaa"]);

        let lines = wrap_text("  aaaa bbbb", 10.0, 30.0);
        let texts: Vec<&str> = lines.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["  aaaa", "bbbb"]);
        assert!(lines.iter().all(|(t, _)| !t.is_empty()));
    }

    #[test]
    fn test_explicit_newlines() {
        let lines = wrap_text("a\n\nb", 10.0, 0.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].0, "");
    }

    #[test]
    fn test_drawing_outside_begin_draw_fails_at_end() {
        let mut device = RecordingDevice::new();
        let brush = device.create_solid_brush(Rgba::BLACK).unwrap();
        let list = device.create_command_list().unwrap();
        device.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), brush);
        device.begin_draw(list);
        assert!(device.end_draw().is_err());
        device.begin_draw(list);
        assert!(device.end_draw().is_ok());
    }

    #[test]
    fn test_unbalanced_clip_is_error() {
        let mut device = RecordingDevice::new();
        let list = device.create_command_list().unwrap();
        device.begin_draw(list);
        device.push_clip(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(device.end_draw(), Err(TableError::Device(_))));
    }

    #[test]
    fn test_closed_list_rejects_drawing() {
        let mut device = RecordingDevice::new();
        let list = device.create_command_list().unwrap();
        device.close_command_list(list);
        assert!(device.is_closed(list));
        device.begin_draw(list);
        assert!(device.end_draw().is_err());
    }

    #[test]
    fn test_release_accounting() {
        let mut device = RecordingDevice::new();
        let brush = device.create_solid_brush(Rgba::BLACK).unwrap();
        device.release(brush.into());
        device.release(brush.into());
        device.release(Resource::Brush(BrushHandle(999)));
        let stats = device.stats();
        assert_eq!(stats.released, 1);
        assert_eq!(stats.double_releases, 1);
        assert_eq!(stats.unknown_releases, 1);
        assert_eq!(device.live_resources(), 0);
    }

    #[test]
    fn test_layout_placement() {
        let mut device = RecordingDevice::new();
        let format = device.create_text_format(&spec()).unwrap();
        device.set_text_alignment(format, TextAlignment::Trailing, ParagraphAlignment::Far);
        let layout = device.create_text_layout("ab", format, 100.0, 50.0).unwrap();
        let metrics = device.layout_metrics(layout);
        assert_eq!(metrics.line_count, 1);
        assert_eq!(metrics.width, 10.0);
        assert!((metrics.height - 12.0).abs() < 1e-4);

        let brush = device.create_solid_brush(Rgba::BLACK).unwrap();
        let list = device.create_command_list().unwrap();
        device.begin_draw(list);
        device.draw_text_layout(layout, Point::new(5.0, 5.0), brush);
        device.end_draw().unwrap();
        let DrawCommand::DrawText { run, .. } = &device.commands(list).unwrap()[0] else {
            panic!("expected text");
        };
        assert_eq!(run.lines[0].x, 95.0);
        assert!((run.lines[0].baseline - 52.5).abs() < 1e-4);
    }

    #[test]
    fn test_uniform_spacing_changes_metrics() {
        let mut device = RecordingDevice::new();
        let format = device.create_text_format(&spec()).unwrap();
        let layout = device.create_text_layout("a\nb\nc", format, 100.0, 100.0).unwrap();
        device.set_line_spacing(
            layout,
            LineSpacing::Uniform {
                height: 20.0,
                baseline: 8.5,
            },
        );
        let metrics = device.layout_metrics(layout);
        assert_eq!(metrics.line_count, 3);
        assert_eq!(metrics.height, 60.0);
    }

    #[test]
    fn test_commands_serialize_tagged() {
        let command = DrawCommand::PopClip;
        assert_eq!(serde_json::to_string(&command).unwrap(), r#"{"op":"popClip"}"#);
    }
}
