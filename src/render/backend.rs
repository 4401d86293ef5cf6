//! Drawing device trait for pluggable rendering implementations.
//!
//! This module defines the `DrawingDevice` trait the compositor and text
//! renderer draw through, so the same pipeline can target the in-memory
//! recording device, the SVG exporter, or a Canvas 2D context.
//!
//! Devices hand out small `Copy` handles for everything they allocate.
//! Every handle is returned to the device exactly once through
//! [`DrawingDevice::release`].

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::Result;
use crate::layout::Rect;
use crate::render::font::{FontStyle, FontWeight};
use crate::types::{ParagraphAlignment, TextAlignment};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);
    };
}

handle!(
    /// A recorded sequence of drawing commands (the rendered image).
    CommandListHandle
);
handle!(
    /// Solid colour brush.
    BrushHandle
);
handle!(
    /// Font family, size, weight, style and alignment.
    TextFormatHandle
);
handle!(
    /// A text string laid out against a format and a box.
    TextLayoutHandle
);
handle!(
    /// Glyph outlines extracted from a layout.
    GeometryHandle
);

/// Any device-owned object, for disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Resource {
    CommandList(CommandListHandle),
    Brush(BrushHandle),
    TextFormat(TextFormatHandle),
    TextLayout(TextLayoutHandle),
    Geometry(GeometryHandle),
}

impl From<CommandListHandle> for Resource {
    fn from(h: CommandListHandle) -> Self {
        Self::CommandList(h)
    }
}

impl From<BrushHandle> for Resource {
    fn from(h: BrushHandle) -> Self {
        Self::Brush(h)
    }
}

impl From<TextFormatHandle> for Resource {
    fn from(h: TextFormatHandle) -> Self {
        Self::TextFormat(h)
    }
}

impl From<TextLayoutHandle> for Resource {
    fn from(h: TextLayoutHandle) -> Self {
        Self::TextLayout(h)
    }
}

impl From<GeometryHandle> for Resource {
    fn from(h: GeometryHandle) -> Self {
        Self::Geometry(h)
    }
}

/// Everything needed to create a text format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormatSpec {
    pub family: String,
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

/// Point in shape coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineCap {
    Square,
    Round,
}

/// Stroke properties for glyph outlines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeStyle {
    pub line_join: LineJoin,
    pub line_cap: LineCap,
    pub miter_limit: f32,
}

/// Miter limit used for sharp outline corners.
pub const OUTLINE_MITER_LIMIT: f32 = 10.0;

impl StrokeStyle {
    /// Sharp corners with square caps.
    pub const SHAPED: Self = Self {
        line_join: LineJoin::Miter,
        line_cap: LineCap::Square,
        miter_limit: OUTLINE_MITER_LIMIT,
    };

    /// Round joins and caps.
    pub const ROUNDED: Self = Self {
        line_join: LineJoin::Round,
        line_cap: LineCap::Round,
        miter_limit: OUTLINE_MITER_LIMIT,
    };
}

/// Line spacing applied to a text layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineSpacing {
    /// The font's natural line metrics.
    #[default]
    Default,
    /// Every line is `height` tall with the baseline `baseline` below its top.
    Uniform { height: f32, baseline: f32 },
}

/// Measured extent of a laid-out text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetrics {
    pub line_count: usize,
    pub width: f32,
    pub height: f32,
}

/// Retained-mode 2D drawing device.
///
/// Drawing calls between `begin_draw` and `end_draw` are recorded into the
/// current command list. Primitive calls are infallible; errors surface
/// from `end_draw`.
pub trait DrawingDevice {
    fn create_command_list(&mut self) -> Result<CommandListHandle>;

    /// Start recording into `target`.
    fn begin_draw(&mut self, target: CommandListHandle);

    /// Stop recording. Reports any failure of the recorded batch.
    fn end_draw(&mut self) -> Result<()>;

    /// Seal a command list; it can no longer be drawn into.
    fn close_command_list(&mut self, list: CommandListHandle);

    /// Clear the target; `None` clears to transparent.
    fn clear(&mut self, color: Option<Rgba>);

    fn create_solid_brush(&mut self, color: Rgba) -> Result<BrushHandle>;

    fn fill_rect(&mut self, rect: Rect, brush: BrushHandle);

    fn stroke_rect(&mut self, rect: Rect, brush: BrushHandle, width: f32);

    fn draw_line(&mut self, from: Point, to: Point, brush: BrushHandle, width: f32);

    fn push_clip(&mut self, rect: Rect);

    fn pop_clip(&mut self);

    fn create_text_format(&mut self, spec: &TextFormatSpec) -> Result<TextFormatHandle>;

    fn set_text_alignment(
        &mut self,
        format: TextFormatHandle,
        horizontal: TextAlignment,
        vertical: ParagraphAlignment,
    );

    fn create_text_layout(
        &mut self,
        text: &str,
        format: TextFormatHandle,
        max_width: f32,
        max_height: f32,
    ) -> Result<TextLayoutHandle>;

    fn layout_metrics(&self, layout: TextLayoutHandle) -> LayoutMetrics;

    fn set_line_spacing(&mut self, layout: TextLayoutHandle, spacing: LineSpacing);

    /// Draw a layout as filled text with its box's top-left at `origin`,
    /// honouring the format's alignment and the layout's line spacing.
    fn draw_text_layout(&mut self, layout: TextLayoutHandle, origin: Point, brush: BrushHandle);

    /// Glyph outlines of `layout`, translated so its top-left sits at `origin`.
    fn glyph_outline(&mut self, layout: TextLayoutHandle, origin: Point) -> Result<GeometryHandle>;

    fn stroke_geometry(
        &mut self,
        geometry: GeometryHandle,
        brush: BrushHandle,
        width: f32,
        style: StrokeStyle,
    );

    fn fill_geometry(&mut self, geometry: GeometryHandle, brush: BrushHandle);

    /// Free a device object. Releasing an unknown or already released
    /// handle is a no-op.
    fn release(&mut self, resource: Resource);
}
