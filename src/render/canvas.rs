//! Canvas 2D drawing device.
//!
//! Implements `DrawingDevice` with the HTML Canvas 2D API via web-sys.
//! Each command list is an offscreen canvas; `present` copies one onto the
//! visible canvas. Glyph outlines are emulated with `strokeText` and
//! `fillText` over the laid-out lines.

use std::collections::HashMap;
use std::fmt::Write as _;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use super::backend::{
    BrushHandle, CommandListHandle, DrawingDevice, GeometryHandle, LayoutMetrics, LineCap,
    LineJoin, LineSpacing, Point, Resource, StrokeStyle, TextFormatHandle, TextFormatSpec,
    TextLayoutHandle,
};
use super::font::FontStyle;
use super::recording::{TextBlock, TextRun};
use crate::color::Rgba;
use crate::error::{Result, TableError};
use crate::layout::Rect;
use crate::types::{ParagraphAlignment, TextAlignment};

struct OffscreenList {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    closed: bool,
}

struct CanvasFormat {
    spec: TextFormatSpec,
    css: String,
    horizontal: TextAlignment,
    vertical: ParagraphAlignment,
}

/// CSS font shorthand for `spec`.
pub fn css_font(spec: &TextFormatSpec) -> String {
    let mut css = String::with_capacity(spec.family.len() + 24);
    match spec.style {
        FontStyle::Normal => {}
        FontStyle::Italic => css.push_str("italic "),
        FontStyle::Oblique => css.push_str("oblique "),
    }
    let _ = write!(
        css,
        "{} {}px \"{}\"",
        spec.weight.value(),
        spec.size,
        spec.family.replace('"', "")
    );
    css
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    let ctx = canvas
        .get_context("2d")
        .map_err(|_| "Failed to get 2d context")?
        .ok_or("No 2d context available")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;
    Ok(ctx)
}

#[allow(clippy::cast_possible_truncation)]
fn as_f32(value: f64) -> f32 {
    value as f32
}

/// Canvas 2D device drawing into offscreen canvases.
pub struct CanvasDevice {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
    next_id: u32,
    lists: HashMap<u32, OffscreenList>,
    brushes: HashMap<u32, String>,
    formats: HashMap<u32, CanvasFormat>,
    layouts: HashMap<u32, (TextBlock, String)>,
    geometries: HashMap<u32, (TextRun, String)>,
    target: Option<CanvasRenderingContext2d>,
    clip_depth: usize,
    pending_error: Option<String>,
}

impl CanvasDevice {
    /// Create a device presenting onto `canvas`.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("No document available")?;
        let ctx = context_2d(&canvas)?;
        Ok(Self {
            document,
            width: canvas.width(),
            height: canvas.height(),
            canvas,
            ctx,
            next_id: 0,
            lists: HashMap::new(),
            brushes: HashMap::new(),
            formats: HashMap::new(),
            layouts: HashMap::new(),
            geometries: HashMap::new(),
            target: None,
            clip_depth: 0,
            pending_error: None,
        })
    }

    /// Size of the visible canvas and of command lists created from now on.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.width = width;
            self.height = height;
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copy a finished command list onto the visible canvas.
    pub fn present(&self, list: CommandListHandle) -> Result<()> {
        let offscreen = self
            .lists
            .get(&list.0)
            .ok_or_else(|| TableError::Device(format!("unknown command list {list:?}")))?;
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        );
        self.ctx
            .draw_image_with_html_canvas_element(&offscreen.canvas, 0.0, 0.0)
            .map_err(|_| TableError::Device("drawImage failed".to_string()))
    }

    fn next_handle(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn flag(&mut self, message: impl Into<String>) {
        if self.pending_error.is_none() {
            self.pending_error = Some(message.into());
        }
    }

    fn target(&mut self) -> Option<CanvasRenderingContext2d> {
        let target = self.target.clone();
        if target.is_none() {
            self.flag("drawing outside begin_draw/end_draw");
        }
        target
    }

    fn brush(&mut self, brush: BrushHandle) -> Option<String> {
        let css = self.brushes.get(&brush.0).cloned();
        if css.is_none() {
            self.flag(format!("unknown brush {brush:?}"));
        }
        css
    }

    fn fill_lines(&mut self, ctx: &CanvasRenderingContext2d, run: &TextRun) {
        for line in &run.lines {
            if ctx
                .fill_text(&line.text, f64::from(line.x), f64::from(line.baseline))
                .is_err()
            {
                self.flag("fillText failed");
            }
        }
    }
}

impl DrawingDevice for CanvasDevice {
    fn create_command_list(&mut self) -> Result<CommandListHandle> {
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(|_| "Failed to create canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "Failed to cast to HtmlCanvasElement")?;
        canvas.set_width(self.width);
        canvas.set_height(self.height);
        let ctx = context_2d(&canvas)?;
        let id = self.next_handle();
        self.lists.insert(
            id,
            OffscreenList {
                canvas,
                ctx,
                closed: false,
            },
        );
        Ok(CommandListHandle(id))
    }

    fn begin_draw(&mut self, target: CommandListHandle) {
        match self.lists.get(&target.0) {
            Some(list) if list.closed => self.flag(format!("{target:?} is closed")),
            Some(list) => {
                list.ctx.set_text_align("left");
                list.ctx.set_text_baseline("alphabetic");
                self.target = Some(list.ctx.clone());
            }
            None => self.flag(format!("unknown command list {target:?}")),
        }
        self.clip_depth = 0;
    }

    fn end_draw(&mut self) -> Result<()> {
        if let Some(ctx) = self.target.take() {
            for _ in 0..self.clip_depth {
                ctx.restore();
            }
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
        if let Some(state) = self.lists.get_mut(&list.0) {
            state.closed = true;
        }
    }

    fn clear(&mut self, color: Option<Rgba>) {
        let Some(ctx) = self.target() else {
            return;
        };
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        ctx.clear_rect(0.0, 0.0, w, h);
        if let Some(color) = color {
            ctx.set_fill_style_str(&color.to_css());
            ctx.fill_rect(0.0, 0.0, w, h);
        }
    }

    fn create_solid_brush(&mut self, color: Rgba) -> Result<BrushHandle> {
        let id = self.next_handle();
        self.brushes.insert(id, color.to_css());
        Ok(BrushHandle(id))
    }

    fn fill_rect(&mut self, rect: Rect, brush: BrushHandle) {
        let (Some(ctx), Some(css)) = (self.target(), self.brush(brush)) else {
            return;
        };
        ctx.set_fill_style_str(&css);
        ctx.fill_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
    }

    fn stroke_rect(&mut self, rect: Rect, brush: BrushHandle, width: f32) {
        let (Some(ctx), Some(css)) = (self.target(), self.brush(brush)) else {
            return;
        };
        ctx.set_stroke_style_str(&css);
        ctx.set_line_width(f64::from(width));
        ctx.set_line_join("miter");
        ctx.stroke_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
    }

    fn draw_line(&mut self, from: Point, to: Point, brush: BrushHandle, width: f32) {
        let (Some(ctx), Some(css)) = (self.target(), self.brush(brush)) else {
            return;
        };
        ctx.set_stroke_style_str(&css);
        ctx.set_line_width(f64::from(width));
        ctx.set_line_cap("butt");
        ctx.begin_path();
        ctx.move_to(f64::from(from.x), f64::from(from.y));
        ctx.line_to(f64::from(to.x), f64::from(to.y));
        ctx.stroke();
    }

    fn push_clip(&mut self, rect: Rect) {
        let Some(ctx) = self.target() else {
            return;
        };
        ctx.save();
        ctx.begin_path();
        ctx.rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
        ctx.clip();
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        let Some(ctx) = self.target() else {
            return;
        };
        if self.clip_depth == 0 {
            self.flag("pop_clip without push_clip");
            return;
        }
        ctx.restore();
        self.clip_depth -= 1;
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
            CanvasFormat {
                css: css_font(spec),
                spec: spec.clone(),
                horizontal: TextAlignment::Leading,
                vertical: ParagraphAlignment::Near,
            },
        );
        Ok(TextFormatHandle(id))
    }

    fn set_text_alignment(
        &mut self,
        format: TextFormatHandle,
        horizontal: TextAlignment,
        vertical: ParagraphAlignment,
    ) {
        if let Some(state) = self.formats.get_mut(&format.0) {
            state.horizontal = horizontal;
            state.vertical = vertical;
        }
    }

    fn create_text_layout(
        &mut self,
        text: &str,
        format: TextFormatHandle,
        max_width: f32,
        max_height: f32,
    ) -> Result<TextLayoutHandle> {
        let state = self
            .formats
            .get(&format.0)
            .ok_or_else(|| TableError::Device(format!("unknown text format {format:?}")))?;
        self.ctx.save();
        self.ctx.set_font(&state.css);
        let ctx = &self.ctx;
        let block = TextBlock::new(
            text,
            state.spec.clone(),
            (state.horizontal, state.vertical),
            max_width,
            max_height,
            |c| {
                let mut buf = [0u8; 4];
                ctx.measure_text(c.encode_utf8(&mut buf))
                    .map(|m| as_f32(m.width()))
                    .unwrap_or(0.0)
            },
        );
        self.ctx.restore();
        let css = state.css.clone();
        let id = self.next_handle();
        self.layouts.insert(id, (block, css));
        Ok(TextLayoutHandle(id))
    }

    fn layout_metrics(&self, layout: TextLayoutHandle) -> LayoutMetrics {
        self.layouts
            .get(&layout.0)
            .map(|(block, _)| block.metrics())
            .unwrap_or_default()
    }

    fn set_line_spacing(&mut self, layout: TextLayoutHandle, spacing: LineSpacing) {
        if let Some((block, _)) = self.layouts.get_mut(&layout.0) {
            block.set_spacing(spacing);
        }
    }

    fn draw_text_layout(&mut self, layout: TextLayoutHandle, origin: Point, brush: BrushHandle) {
        let (Some(ctx), Some(css)) = (self.target(), self.brush(brush)) else {
            return;
        };
        let Some((run, font)) = self
            .layouts
            .get(&layout.0)
            .map(|(block, font)| (block.place(origin), font.clone()))
        else {
            self.flag(format!("unknown text layout {layout:?}"));
            return;
        };
        ctx.set_font(&font);
        ctx.set_fill_style_str(&css);
        self.fill_lines(&ctx, &run);
    }

    fn glyph_outline(&mut self, layout: TextLayoutHandle, origin: Point) -> Result<GeometryHandle> {
        let (run, font) = self
            .layouts
            .get(&layout.0)
            .map(|(block, font)| (block.place(origin), font.clone()))
            .ok_or_else(|| TableError::Device(format!("unknown text layout {layout:?}")))?;
        let id = self.next_handle();
        self.geometries.insert(id, (run, font));
        Ok(GeometryHandle(id))
    }

    fn stroke_geometry(
        &mut self,
        geometry: GeometryHandle,
        brush: BrushHandle,
        width: f32,
        style: StrokeStyle,
    ) {
        let (Some(ctx), Some(css)) = (self.target(), self.brush(brush)) else {
            return;
        };
        let Some((run, font)) = self.geometries.get(&geometry.0).cloned() else {
            self.flag(format!("unknown geometry {geometry:?}"));
            return;
        };
        ctx.set_font(&font);
        ctx.set_stroke_style_str(&css);
        ctx.set_line_width(f64::from(width));
        ctx.set_line_join(match style.line_join {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
        });
        ctx.set_line_cap(match style.line_cap {
            LineCap::Square => "square",
            LineCap::Round => "round",
        });
        ctx.set_miter_limit(f64::from(style.miter_limit));
        for line in &run.lines {
            if ctx
                .stroke_text(&line.text, f64::from(line.x), f64::from(line.baseline))
                .is_err()
            {
                self.flag("strokeText failed");
            }
        }
    }

    fn fill_geometry(&mut self, geometry: GeometryHandle, brush: BrushHandle) {
        let (Some(ctx), Some(css)) = (self.target(), self.brush(brush)) else {
            return;
        };
        let Some((run, font)) = self.geometries.get(&geometry.0).cloned() else {
            self.flag(format!("unknown geometry {geometry:?}"));
            return;
        };
        ctx.set_font(&font);
        ctx.set_fill_style_str(&css);
        self.fill_lines(&ctx, &run);
    }

    fn release(&mut self, resource: Resource) {
        match resource {
            Resource::CommandList(h) => {
                self.lists.remove(&h.0);
            }
            Resource::Brush(h) => {
                self.brushes.remove(&h.0);
            }
            Resource::TextFormat(h) => {
                self.formats.remove(&h.0);
            }
            Resource::TextLayout(h) => {
                self.layouts.remove(&h.0);
            }
            Resource::Geometry(h) => {
                self.geometries.remove(&h.0);
            }
        }
    }
}
