//! Per-frame orchestration of a table shape.
//!
//! This module handles:
//! - Capturing the render-affecting inputs of a frame as comparable snapshots
//! - Skipping the redraw when the snapshots match the previous frame
//! - Owning the command list and device resources of one shape

mod snapshot;
mod source;

pub use snapshot::{RenderSnapshot, ScalarSnapshot, SequenceSnapshot};
pub use source::{EditorHandle, TableShapeSource};
