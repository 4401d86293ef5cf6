//! Device resource caches.
//!
//! Brushes are cached by RGBA, text formats by their derived style tuple,
//! and the table-level brushes (border, outer border, background, headers)
//! sit in fixed slots that are rebuilt only when their colour changes.
//! Entries live until [`ResourceCache::clear`]; nothing expires on its own.
//!
//! Each newly created object is handed to the [`DisposeCollector`] exactly
//! once, at creation. Cache hits never collect again.

use std::collections::HashMap;

use super::backend::{BrushHandle, DrawingDevice, TextFormatHandle, TextFormatSpec};
use super::dispose::DisposeCollector;
use super::font::{FontStyle, FontWeight};
use crate::color::Rgba;
use crate::error::Result;

/// Cache key of a text format.
///
/// Floats are keyed by their bit patterns so the key is `Eq + Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextFormatKey {
    pub family: String,
    size_bits: u32,
    pub style: FontStyle,
    pub weight: FontWeight,
    line_rate_bits: u64,
}

impl TextFormatKey {
    pub fn new(spec: &TextFormatSpec, line_rate: f64) -> Self {
        Self {
            family: spec.family.clone(),
            size_bits: spec.size.to_bits(),
            style: spec.style,
            weight: spec.weight,
            line_rate_bits: line_rate.to_bits(),
        }
    }

    pub fn size(&self) -> f32 {
        f32::from_bits(self.size_bits)
    }

    pub fn line_rate(&self) -> f64 {
        f64::from_bits(self.line_rate_bits)
    }
}

/// Table-level brushes kept in fixed slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrushSlot {
    Border,
    OuterBorder,
    Background,
    HeaderRow,
    HeaderColumn,
}

impl BrushSlot {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Self::Border => 0,
            Self::OuterBorder => 1,
            Self::Background => 2,
            Self::HeaderRow => 3,
            Self::HeaderColumn => 4,
        }
    }
}

/// Hit/miss counters, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub brush_hits: usize,
    pub brush_misses: usize,
    pub format_hits: usize,
    pub format_misses: usize,
    pub slot_rebuilds: usize,
}

#[derive(Debug, Default)]
pub struct ResourceCache {
    brushes: HashMap<(u8, u8, u8, u8), BrushHandle>,
    formats: HashMap<TextFormatKey, TextFormatHandle>,
    slots: [Option<(Rgba, BrushHandle)>; BrushSlot::COUNT],
    stats: CacheStats,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    pub fn format_count(&self) -> usize {
        self.formats.len()
    }

    /// Solid brush for `color`, created on first use.
    pub fn brush<D: DrawingDevice + ?Sized>(
        &mut self,
        device: &mut D,
        disposer: &mut DisposeCollector,
        color: Rgba,
    ) -> Result<BrushHandle> {
        if let Some(&brush) = self.brushes.get(&color.key()) {
            self.stats.brush_hits += 1;
            return Ok(brush);
        }
        let brush = device.create_solid_brush(color)?;
        disposer.collect(brush);
        self.brushes.insert(color.key(), brush);
        self.stats.brush_misses += 1;
        Ok(brush)
    }

    /// Text format for `spec`, keyed together with the line-height rate.
    pub fn text_format<D: DrawingDevice + ?Sized>(
        &mut self,
        device: &mut D,
        disposer: &mut DisposeCollector,
        spec: &TextFormatSpec,
        line_rate: f64,
    ) -> Result<TextFormatHandle> {
        let key = TextFormatKey::new(spec, line_rate);
        if let Some(&format) = self.formats.get(&key) {
            self.stats.format_hits += 1;
            return Ok(format);
        }
        let format = device.create_text_format(spec)?;
        disposer.collect(format);
        tracing::trace!(family = %spec.family, size = spec.size, "created text format");
        self.formats.insert(key, format);
        self.stats.format_misses += 1;
        Ok(format)
    }

    /// Brush in `slot`, rebuilt when `color` differs from the stored one.
    /// The replaced brush is released immediately.
    pub fn slot_brush<D: DrawingDevice + ?Sized>(
        &mut self,
        device: &mut D,
        disposer: &mut DisposeCollector,
        slot: BrushSlot,
        color: Rgba,
    ) -> Result<BrushHandle> {
        let Some(entry) = self.slots.get_mut(slot.index()) else {
            return Err(format!("no brush slot {slot:?}").into());
        };
        if let Some((stored, brush)) = *entry {
            if stored == color {
                return Ok(brush);
            }
            disposer.remove_and_dispose(device, brush);
        }
        let brush = device.create_solid_brush(color)?;
        disposer.collect(brush);
        *entry = Some((color, brush));
        self.stats.slot_rebuilds += 1;
        Ok(brush)
    }

    /// Forget every handle. The disposer owns the objects themselves.
    pub fn clear(&mut self) {
        self.brushes.clear();
        self.formats.clear();
        self.slots = [None; BrushSlot::COUNT];
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
    use crate::render::recording::RecordingDevice;

    fn spec(size: f32) -> TextFormatSpec {
        TextFormatSpec {
            family: "Inter".to_string(),
            size,
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
        }
    }

    #[test]
    fn test_brush_reused_by_color() {
        let mut device = RecordingDevice::new();
        let mut disposer = DisposeCollector::new();
        let mut cache = ResourceCache::new();

        let a = cache.brush(&mut device, &mut disposer, Rgba::BLACK).unwrap();
        let b = cache.brush(&mut device, &mut disposer, Rgba::rgb(0, 0, 0)).unwrap();
        let c = cache.brush(&mut device, &mut disposer, Rgba::WHITE).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(disposer.len(), 2);
        assert_eq!(cache.stats().brush_hits, 1);
        assert_eq!(cache.stats().brush_misses, 2);
    }

    #[test]
    fn test_format_key_includes_line_rate() {
        let mut device = RecordingDevice::new();
        let mut disposer = DisposeCollector::new();
        let mut cache = ResourceCache::new();

        let a = cache.text_format(&mut device, &mut disposer, &spec(34.0), 100.0).unwrap();
        let b = cache.text_format(&mut device, &mut disposer, &spec(34.0), 100.0).unwrap();
        let c = cache.text_format(&mut device, &mut disposer, &spec(34.0), 150.0).unwrap();
        let d = cache.text_format(&mut device, &mut disposer, &spec(20.0), 100.0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(cache.format_count(), 3);
        assert_eq!(disposer.len(), 3);
    }

    #[test]
    fn test_slot_rebuilt_on_color_change() {
        let mut device = RecordingDevice::new();
        let mut disposer = DisposeCollector::new();
        let mut cache = ResourceCache::new();

        let a = cache
            .slot_brush(&mut device, &mut disposer, BrushSlot::Border, Rgba::BLACK)
            .unwrap();
        let b = cache
            .slot_brush(&mut device, &mut disposer, BrushSlot::Border, Rgba::BLACK)
            .unwrap();
        assert_eq!(a, b);

        let c = cache
            .slot_brush(&mut device, &mut disposer, BrushSlot::Border, Rgba::WHITE)
            .unwrap();
        assert_ne!(a, c);
        assert_eq!(device.stats().released, 1);
        assert_eq!(disposer.len(), 1);
        assert_eq!(cache.stats().slot_rebuilds, 2);
    }

    #[test]
    fn test_key_roundtrips_floats() {
        let key = TextFormatKey::new(&spec(12.5), 130.0);
        assert_eq!(key.size(), 12.5);
        assert_eq!(key.line_rate(), 130.0);
    }

    #[test]
    fn test_clear_forgets_handles() {
        let mut device = RecordingDevice::new();
        let mut disposer = DisposeCollector::new();
        let mut cache = ResourceCache::new();
        cache.brush(&mut device, &mut disposer, Rgba::BLACK).unwrap();
        cache.clear();
        assert_eq!(cache.brush_count(), 0);
        cache.brush(&mut device, &mut disposer, Rgba::BLACK).unwrap();
        assert_eq!(cache.stats().brush_misses, 2);
    }
}
