//! Colour values for table styling.
//!
//! Colours are plain `u8` RGBA quadruples so they can be compared by value
//! and used directly as cache keys. They serialize as `#AARRGGBB` hex
//! strings (alpha first, the same channel order the host's colour pickers
//! use) and convert to CSS strings for the canvas and SVG outputs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// RGBA colour with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    pub const WHITE_SMOKE: Self = Self::rgb(0xF5, 0xF5, 0xF5);
    pub const LIGHT_GRAY: Self = Self::rgb(0xD3, 0xD3, 0xD3);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a colour from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    /// Cache key tuple.
    pub const fn key(self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    /// Parse from a hex string (with or without #).
    ///
    /// Accepts `RRGGBB` (opaque) and `AARRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let channel = |range: std::ops::Range<usize>| -> Option<u8> {
            u8::from_str_radix(hex.get(range)?, 16).ok()
        };
        match hex.len() {
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::new(
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
                channel(0..2)?,
            )),
            _ => None,
        }
    }

    /// Convert to `#AARRGGBB`.
    pub fn to_hex(self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            self.a, self.r, self.g, self.b
        )
    }

    /// Convert to a CSS colour string (`#RRGGBB` when opaque, `rgba()` otherwise).
    pub fn to_css(self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.alpha()
            )
        }
    }

    /// Alpha as 0.0..=1.0.
    pub fn alpha(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Convert to `[f32; 4]` RGBA in 0.0..=1.0.
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgba {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour '{s}'")))
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

    #[test]
    fn test_parse_hex_6() {
        let color = Rgba::from_hex("#FF8040").unwrap();
        assert_eq!(color, Rgba::rgb(255, 128, 64));
    }

    #[test]
    fn test_parse_hex_8_alpha_first() {
        let color = Rgba::from_hex("#80FF0000").unwrap();
        assert_eq!(color, Rgba::new(255, 0, 0, 0x80));
    }

    #[test]
    fn test_parse_without_hash() {
        assert_eq!(Rgba::from_hex("F5F5F5"), Some(Rgba::WHITE_SMOKE));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_hex_roundtrip_keeps_alpha() {
        let color = Rgba::new(1, 2, 3, 4);
        assert_eq!(color.to_hex(), "#04010203");
        assert_eq!(Rgba::from_hex(&color.to_hex()), Some(color));
    }

    #[test]
    fn test_css_output() {
        assert_eq!(Rgba::LIGHT_GRAY.to_css(), "#D3D3D3");
        assert!(Rgba::new(255, 0, 0, 0x80).to_css().starts_with("rgba(255, 0, 0,"));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Rgba::BLACK).unwrap();
        assert_eq!(json, "\"#FF000000\"");
        let back: Rgba = serde_json::from_str("\"#FFFFFFFF\"").unwrap();
        assert_eq!(back, Rgba::WHITE);
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }
}
