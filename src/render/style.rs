//! Per-cell style cascade.
//!
//! A cell either inherits the whole table-wide cell style or overrides it
//! with its own. There is no per-field mixing.

use crate::animation::{Animatable, FrameTime};
use crate::color::Rgba;
use crate::types::{
    CellContentAlign, CellStyle, CellStylePriority, CellTextStyle, TableCell, DEFAULT_FONT_NAME,
    DEFAULT_FONT_SIZE,
};

/// Where a cell's style comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectiveStyle<'a> {
    Inherited(&'a CellStyle),
    Overridden(&'a CellStyle),
}

impl<'a> EffectiveStyle<'a> {
    pub fn style(&self) -> &'a CellStyle {
        match self {
            Self::Inherited(style) | Self::Overridden(style) => style,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Self::Overridden(_))
    }

    /// Evaluate every animated field at `time` and apply font defaults.
    pub fn resolve(&self, time: &FrameTime) -> ResolvedCellStyle {
        ResolvedCellStyle::from_style(self.style(), time)
    }
}

/// Pick the style for `cell`: its own when the priority is `Override`,
/// otherwise the table-wide `defaults`.
pub fn effective_style<'a>(cell: &'a TableCell, defaults: &'a CellStyle) -> EffectiveStyle<'a> {
    match cell.style_priority {
        CellStylePriority::Override => EffectiveStyle::Overridden(&cell.style),
        CellStylePriority::Inherit => EffectiveStyle::Inherited(defaults),
    }
}

/// A cell style with every value fixed for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCellStyle {
    /// Raw family string; suffix parsing happens in the font resolver.
    pub font_family: String,
    pub font_size: f32,
    pub font_color: Rgba,
    pub outline_color: Rgba,
    pub text_style: CellTextStyle,
    pub align: CellContentAlign,
    pub padding: f32,
    pub bold: bool,
    pub italic: bool,
    /// Percent of the font size.
    pub line_height_rate: f64,
    pub outline_width: f32,
}

#[allow(clippy::cast_possible_truncation)]
fn as_f32(value: f64) -> f32 {
    value as f32
}

impl ResolvedCellStyle {
    pub fn from_style(style: &CellStyle, time: &FrameTime) -> Self {
        let font_family = if style.font.trim().is_empty() {
            DEFAULT_FONT_NAME.to_string()
        } else {
            style.font.clone()
        };
        let size = as_f32(style.font_size.value_at(time));
        Self {
            font_family,
            font_size: if size > 0.0 { size } else { DEFAULT_FONT_SIZE },
            font_color: style.font_color,
            outline_color: style.outline_color,
            text_style: style.text_style,
            align: style.align,
            padding: as_f32(style.padding.value_at(time)).max(0.0),
            bold: style.bold,
            italic: style.italic,
            line_height_rate: style.line_height_rate.value_at(time),
            outline_width: as_f32(style.outline_width.value_at(time)).max(0.0),
        }
    }

    /// Uniform line pitch used for multi-line text.
    #[allow(clippy::cast_possible_truncation)]
    pub fn line_spacing(&self) -> f32 {
        (self.line_height_rate / 100.0) as f32 * self.font_size
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
    use crate::animation::Animation;

    fn custom_style() -> CellStyle {
        CellStyle {
            font: "Inter".to_string(),
            font_color: Rgba::rgb(255, 0, 0),
            text_style: CellTextStyle::RoundedBorder,
            bold: true,
            ..CellStyle::default()
        }
    }

    #[test]
    fn test_override_uses_cell_style() {
        let defaults = CellStyle::default();
        let cell = TableCell {
            style: custom_style(),
            style_priority: CellStylePriority::Override,
            ..TableCell::default()
        };
        let eff = effective_style(&cell, &defaults);
        assert!(eff.is_override());
        assert_eq!(eff.style().font, "Inter");
    }

    #[test]
    fn test_inherit_ignores_cell_style() {
        let defaults = CellStyle::default();
        let cell = TableCell {
            style: custom_style(),
            style_priority: CellStylePriority::Inherit,
            ..TableCell::default()
        };
        let resolved = effective_style(&cell, &defaults).resolve(&FrameTime::default());
        assert_eq!(resolved.font_family, DEFAULT_FONT_NAME);
        assert_eq!(resolved.font_color, Rgba::BLACK);
        assert_eq!(resolved.text_style, CellTextStyle::Normal);
        assert!(!resolved.bold);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let defaults = custom_style();
        let cell = TableCell::default();
        let time = FrameTime::new(3, 10, 30);
        let a = effective_style(&cell, &defaults).resolve(&time);
        let b = effective_style(&cell, &defaults).resolve(&time);
        assert_eq!(a, b);
    }

    #[test]
    fn test_font_defaults_applied() {
        let style = CellStyle {
            font: "  ".to_string(),
            font_size: Animation::new(0.0, 0.0, 10.0),
            ..CellStyle::default()
        };
        let resolved = ResolvedCellStyle::from_style(&style, &FrameTime::default());
        assert_eq!(resolved.font_family, DEFAULT_FONT_NAME);
        assert_eq!(resolved.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_animated_size_resolves_per_frame() {
        let style = CellStyle {
            font_size: Animation::keyframes(vec![10.0, 30.0], 1.0, 100.0),
            ..CellStyle::default()
        };
        let start = ResolvedCellStyle::from_style(&style, &FrameTime::new(0, 3, 30));
        let mid = ResolvedCellStyle::from_style(&style, &FrameTime::new(1, 3, 30));
        assert_eq!(start.font_size, 10.0);
        assert_eq!(mid.font_size, 20.0);
    }

    #[test]
    fn test_line_spacing() {
        let mut resolved = ResolvedCellStyle::from_style(&CellStyle::default(), &FrameTime::default());
        resolved.font_size = 20.0;
        resolved.line_height_rate = 150.0;
        assert_eq!(resolved.line_spacing(), 30.0);
    }
}
