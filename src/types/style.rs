use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::animation::Animation;
use crate::color::Rgba;

/// Family used when a cell style leaves the font empty.
pub const DEFAULT_FONT_NAME: &str = "Yu Gothic UI";

/// Size used when a cell's resolved font size is not positive.
pub const DEFAULT_FONT_SIZE: f32 = 34.0;

/// 9-way placement of text inside a cell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellContentAlign {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Horizontal anchor of a text format.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    #[default]
    Leading,
    Center,
    Trailing,
}

/// Vertical anchor of a text format.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParagraphAlignment {
    #[default]
    Near,
    Center,
    Far,
}

impl CellContentAlign {
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    pub fn horizontal(self) -> TextAlignment {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => TextAlignment::Leading,
            Self::TopCenter | Self::MiddleCenter | Self::BottomCenter => TextAlignment::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => TextAlignment::Trailing,
        }
    }

    pub fn vertical(self) -> ParagraphAlignment {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => ParagraphAlignment::Near,
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => ParagraphAlignment::Center,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => ParagraphAlignment::Far,
        }
    }
}

/// Whether a cell follows the table-wide cell style or its own.
///
/// Any value other than `Override` (including unknown strings in stored
/// configs) behaves as `Inherit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellStylePriority {
    #[default]
    Inherit,
    Override,
}

impl CellStylePriority {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inherit => "Inherit",
            Self::Override => "Override",
        }
    }
}

impl Serialize for CellStylePriority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CellStylePriority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(if s.eq_ignore_ascii_case("override") {
            Self::Override
        } else {
            Self::Inherit
        })
    }
}

/// Text decoration of a cell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellTextStyle {
    /// Filled glyphs only.
    #[default]
    Normal,
    /// Outlined glyphs with mitered corners.
    ShapedBorder,
    /// Outlined glyphs with round joins and caps.
    RoundedBorder,
}

impl CellTextStyle {
    pub fn is_outlined(self) -> bool {
        matches!(self, Self::ShapedBorder | Self::RoundedBorder)
    }
}

/// Which header band gets its own background colour.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShowHeader {
    #[default]
    None,
    /// First row.
    RowHeader,
    /// First column.
    ColumnHeader,
    BothHeader,
}

impl ShowHeader {
    pub fn row_header(self) -> bool {
        matches!(self, Self::RowHeader | Self::BothHeader)
    }

    pub fn column_header(self) -> bool {
        matches!(self, Self::ColumnHeader | Self::BothHeader)
    }
}

/// Text styling fields carried both table-wide and per cell.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    pub font: String,
    pub font_size: Animation,
    pub font_color: Rgba,
    pub outline_color: Rgba,
    pub text_style: CellTextStyle,
    pub align: CellContentAlign,
    pub padding: Animation,
    pub bold: bool,
    pub italic: bool,
    /// Line height as a percentage of the font size.
    pub line_height_rate: Animation,
    pub outline_width: Animation,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT_NAME.to_string(),
            font_size: Animation::new(f64::from(DEFAULT_FONT_SIZE), 1.0, 1000.0),
            font_color: Rgba::BLACK,
            outline_color: Rgba::WHITE,
            text_style: CellTextStyle::Normal,
            align: CellContentAlign::MiddleCenter,
            padding: Animation::new(0.0, 0.0, 1000.0),
            bold: false,
            italic: false,
            line_height_rate: Animation::new(100.0, 0.0, 1000.0),
            outline_width: Animation::new(2.0, 0.0, 100.0),
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
    use test_case::test_case;

    #[test_case(CellContentAlign::TopLeft, TextAlignment::Leading, ParagraphAlignment::Near)]
    #[test_case(CellContentAlign::TopCenter, TextAlignment::Center, ParagraphAlignment::Near)]
    #[test_case(CellContentAlign::TopRight, TextAlignment::Trailing, ParagraphAlignment::Near)]
    #[test_case(CellContentAlign::MiddleLeft, TextAlignment::Leading, ParagraphAlignment::Center)]
    #[test_case(CellContentAlign::MiddleCenter, TextAlignment::Center, ParagraphAlignment::Center)]
    #[test_case(CellContentAlign::MiddleRight, TextAlignment::Trailing, ParagraphAlignment::Center)]
    #[test_case(CellContentAlign::BottomLeft, TextAlignment::Leading, ParagraphAlignment::Far)]
    #[test_case(CellContentAlign::BottomCenter, TextAlignment::Center, ParagraphAlignment::Far)]
    #[test_case(CellContentAlign::BottomRight, TextAlignment::Trailing, ParagraphAlignment::Far)]
    fn test_alignment_mapping(
        align: CellContentAlign,
        h: TextAlignment,
        v: ParagraphAlignment,
    ) {
        assert_eq!(align.horizontal(), h);
        assert_eq!(align.vertical(), v);
    }

    #[test]
    fn test_unknown_priority_is_inherit() {
        let p: CellStylePriority = serde_json::from_str("\"Whatever\"").unwrap();
        assert_eq!(p, CellStylePriority::Inherit);
        let p: CellStylePriority = serde_json::from_str("\"Override\"").unwrap();
        assert_eq!(p, CellStylePriority::Override);
    }

    #[test]
    fn test_header_modes() {
        assert!(ShowHeader::BothHeader.row_header());
        assert!(ShowHeader::BothHeader.column_header());
        assert!(ShowHeader::RowHeader.row_header());
        assert!(!ShowHeader::RowHeader.column_header());
        assert!(!ShowHeader::None.row_header());
        assert!(!ShowHeader::None.column_header());
    }

    #[test]
    fn test_partial_style_json_uses_defaults() {
        let style: CellStyle = serde_json::from_str(r#"{"bold": true}"#).unwrap();
        assert!(style.bold);
        assert_eq!(style.font, DEFAULT_FONT_NAME);
        assert_eq!(style.align, CellContentAlign::MiddleCenter);
    }
}
