//! Rendering engine over a pluggable drawing device.
//!
//! This module provides:
//! - The `DrawingDevice` seam and its handle types
//! - Resource caches and the disposal ledger
//! - Font resolution, style cascade, border and text drawing
//! - An in-memory recording device with SVG export
//! - Canvas 2D device (wasm32 only)

pub mod backend;
pub mod borders;
pub mod cache;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod dispose;
pub mod font;
pub mod recording;
pub mod style;
pub mod svg;
#[cfg(feature = "system-fonts")]
pub mod system_fonts;
pub mod table;
pub mod text;

// Re-export commonly used types
pub use backend::{
    BrushHandle, CommandListHandle, DrawingDevice, GeometryHandle, LayoutMetrics, LineSpacing,
    Point, Resource, StrokeStyle, TextFormatHandle, TextFormatSpec, TextLayoutHandle,
};
pub use cache::{BrushSlot, CacheStats, ResourceCache, TextFormatKey};
pub use dispose::DisposeCollector;
pub use font::{
    FontCatalog, FontFace, FontResolver, FontStyle, FontWeight, MemoryFontCatalog, ResolvedFont,
};
pub use recording::{DeviceStats, DrawCommand, RecordingDevice};
pub use style::{effective_style, EffectiveStyle, ResolvedCellStyle};
pub use svg::to_svg;
pub use table::{draw_table, DrawSummary, TableFrame};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasDevice;
#[cfg(feature = "system-fonts")]
pub use system_fonts::SystemFontCatalog;

/// Everything a rendering session allocates or caches.
#[derive(Debug, Default)]
pub struct RenderResources {
    pub disposer: DisposeCollector,
    pub cache: ResourceCache,
    pub fonts: FontResolver,
}

impl RenderResources {
    pub fn new(catalog: Box<dyn FontCatalog>) -> Self {
        Self {
            disposer: DisposeCollector::new(),
            cache: ResourceCache::new(),
            fonts: FontResolver::new(catalog),
        }
    }

    /// Release every collected device object and drop all cached entries.
    /// Returns how many objects were released; a second call returns 0.
    pub fn dispose<D: DrawingDevice + ?Sized>(&mut self, device: &mut D) -> usize {
        self.cache.clear();
        self.fonts.clear();
        self.disposer.dispose_and_clear(device)
    }
}
