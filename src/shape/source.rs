//! Frame orchestrator of one table shape.
//!
//! `update` resolves the parameters for the frame, reshapes the model when
//! the counts moved, and redraws into a fresh command list only when the
//! frame's snapshot differs from the last one drawn.

use super::snapshot::RenderSnapshot;
use crate::animation::{Animatable, FrameTime};
use crate::dispatch::{Dispatcher, TaskQueue};
use crate::error::{Result, TableError};
use crate::parameter::TableShapeParameter;
use crate::render::{
    draw_table, CommandListHandle, DrawingDevice, FontCatalog, RenderResources, TableFrame,
};

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::time::Instant;
    thread_local! {
        static START: Instant = Instant::now();
    }
    START.with(|s| s.elapsed().as_secs_f64() * 1000.0)
}

/// Edits the shape's parameters from any thread.
///
/// Every edit runs on the rendering thread the next time the source drains
/// its queue (at the start of `update`, or through `drain_pending`).
#[derive(Debug, Clone)]
pub struct EditorHandle {
    dispatcher: Dispatcher<TableShapeParameter>,
}

impl EditorHandle {
    /// Set constant row/column counts and resize the model; waits for the
    /// rendering thread. Returns whether the model's shape changed.
    pub fn resize_blocking(&self, rows: usize, cols: usize) -> Result<bool> {
        self.dispatcher
            .run_blocking(move |param| param.set_grid(rows, cols))
    }

    /// Run `edit` against the parameters and wait for its result.
    pub fn edit_blocking<R, F>(&self, edit: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut TableShapeParameter) -> R + Send + 'static,
    {
        self.dispatcher.run_blocking(edit)
    }

    /// Queue `edit` without waiting.
    pub fn post_edit<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut TableShapeParameter) + Send + 'static,
    {
        self.dispatcher.post(edit)
    }
}

pub struct TableShapeSource {
    param: TableShapeParameter,
    resources: RenderResources,
    output: Option<CommandListHandle>,
    last: Option<RenderSnapshot>,
    queue: TaskQueue<TableShapeParameter>,
    redraws: usize,
    disposed: bool,
}

impl std::fmt::Debug for TableShapeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableShapeSource")
            .field("output", &self.output)
            .field("redraws", &self.redraws)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl TableShapeSource {
    /// Create a source owned by the calling thread.
    pub fn new(param: TableShapeParameter, catalog: Box<dyn FontCatalog>) -> Self {
        Self {
            param,
            resources: RenderResources::new(catalog),
            output: None,
            last: None,
            queue: TaskQueue::new(),
            redraws: 0,
            disposed: false,
        }
    }

    pub fn parameter(&self) -> &TableShapeParameter {
        &self.param
    }

    /// Direct access for the owning thread. Changes are picked up by the
    /// next `update`.
    pub fn parameter_mut(&mut self) -> &mut TableShapeParameter {
        &mut self.param
    }

    pub fn set_parameter(&mut self, param: TableShapeParameter) {
        self.param = param;
    }

    pub fn editor_handle(&self) -> EditorHandle {
        EditorHandle {
            dispatcher: self.queue.dispatcher(),
        }
    }

    /// Run edits queued by editor handles. Returns how many ran.
    pub fn drain_pending(&mut self) -> usize {
        self.queue.drain(&mut self.param)
    }

    /// Number of times a command list has been rebuilt.
    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    pub fn resources(&self) -> &RenderResources {
        &self.resources
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The command list of the last successful redraw.
    pub fn output(&self) -> Result<CommandListHandle> {
        if self.disposed {
            return Err(TableError::Disposed);
        }
        self.output.ok_or(TableError::NotRendered)
    }

    /// Bring the output up to date for `time`. Returns true when the
    /// command list was rebuilt, false on a snapshot hit.
    pub fn update<D: DrawingDevice + ?Sized>(
        &mut self,
        device: &mut D,
        time: &FrameTime,
    ) -> Result<bool> {
        if self.disposed {
            return Err(TableError::Disposed);
        }
        self.drain_pending();

        let (rows, cols) = self.param.grid_at(time);
        if self.param.table_model.resize(rows, cols) {
            tracing::debug!(rows, cols, "resized table model");
        }
        let width = self.param.width.value_at(time);
        let height = self.param.height.value_at(time);
        self.param.table_model.sync_boundaries(width, height);

        let snapshot = RenderSnapshot::capture(&self.param, time);
        if self.output.is_some() && self.last.as_ref() == Some(&snapshot) {
            tracing::debug!(frame = time.frame, "table snapshot hit, skipping redraw");
            return Ok(false);
        }
        tracing::debug!(frame = time.frame, "table snapshot miss, redrawing");

        let start = now_ms();
        if let Some(old) = self.output.take() {
            self.resources.disposer.remove_and_dispose(device, old);
        }
        self.last = None;

        let list = device.create_command_list()?;
        self.resources.disposer.collect(list);
        let drawn = self.draw(device, list, &snapshot.scalar, time);
        if let Err(e) = drawn {
            self.resources.disposer.remove_and_dispose(device, list);
            return Err(e);
        }

        self.output = Some(list);
        self.last = Some(snapshot);
        self.redraws += 1;
        tracing::debug!(
            elapsed_ms = now_ms() - start,
            redraws = self.redraws,
            "table redrawn"
        );
        Ok(true)
    }

    fn draw<D: DrawingDevice + ?Sized>(
        &mut self,
        device: &mut D,
        list: CommandListHandle,
        frame: &TableFrame,
        time: &FrameTime,
    ) -> Result<()> {
        device.begin_draw(list);
        device.clear(None);
        let drawn = draw_table(
            device,
            &mut self.resources,
            frame,
            &self.param.table_model,
            &self.param.cell_style,
            time,
        );
        let ended = device.end_draw();
        device.close_command_list(list);
        let summary = drawn?;
        ended?;
        if summary.cells_skipped > 0 {
            tracing::debug!(skipped = summary.cells_skipped, "cells skipped during redraw");
        }
        Ok(())
    }

    /// Release the output and every cached device object. Safe to call
    /// more than once; later calls release nothing.
    pub fn dispose<D: DrawingDevice + ?Sized>(&mut self, device: &mut D) -> usize {
        if self.disposed {
            return 0;
        }
        self.disposed = true;
        self.output = None;
        self.last = None;
        let released = self.resources.dispose(device);
        tracing::debug!(released, "table shape disposed");
        released
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
    use crate::color::Rgba;
    use crate::render::{MemoryFontCatalog, RecordingDevice};
    use std::thread;
    use std::time::Duration;

    fn source(rows: usize, cols: usize) -> TableShapeSource {
        TableShapeSource::new(
            TableShapeParameter::with_grid(rows, cols),
            Box::new(MemoryFontCatalog::with_families(["Yu Gothic UI"])),
        )
    }

    #[test]
    fn test_output_before_update_is_error() {
        let s = source(1, 1);
        assert!(matches!(s.output(), Err(TableError::NotRendered)));
    }

    #[test]
    fn test_second_update_is_a_hit() {
        let mut device = RecordingDevice::new();
        let mut s = source(2, 2);
        let time = FrameTime::new(0, 30, 30);
        assert!(s.update(&mut device, &time).unwrap());
        let after_first = device.stats();
        assert!(!s.update(&mut device, &time).unwrap());
        assert_eq!(device.stats(), after_first);
        assert_eq!(s.redraw_count(), 1);
    }

    #[test]
    fn test_change_rebuilds_and_releases_old_list() {
        let mut device = RecordingDevice::new();
        let mut s = source(2, 2);
        let time = FrameTime::default();
        s.update(&mut device, &time).unwrap();
        let first = s.output().unwrap();

        s.parameter_mut().border_color = Rgba::rgb(255, 0, 0);
        assert!(s.update(&mut device, &time).unwrap());
        let second = s.output().unwrap();
        assert_ne!(first, second);
        assert!(device.commands(first).is_none());
        assert!(device.is_closed(second));
    }

    #[test]
    fn test_text_edit_triggers_redraw() {
        let mut device = RecordingDevice::new();
        let mut s = source(1, 1);
        let time = FrameTime::default();
        s.update(&mut device, &time).unwrap();
        s.parameter_mut().table_model.set_text(0, 0, "hello");
        assert!(s.update(&mut device, &time).unwrap());
    }

    #[test]
    fn test_count_change_resizes_model() {
        let mut device = RecordingDevice::new();
        let mut s = source(2, 2);
        s.parameter_mut().row_count.set_value(3.0);
        s.update(&mut device, &FrameTime::default()).unwrap();
        assert_eq!(s.parameter().table_model.rows(), 3);
        assert_eq!(s.parameter().table_model.row_boundaries().len(), 4);
    }

    #[test]
    fn test_dispose_releases_everything_once() {
        let mut device = RecordingDevice::new();
        let mut s = source(2, 2);
        s.parameter_mut().table_model.set_text(0, 0, "a");
        s.update(&mut device, &FrameTime::default()).unwrap();
        assert!(s.dispose(&mut device) > 0);
        assert_eq!(s.dispose(&mut device), 0);
        assert_eq!(device.live_resources(), 0);
        assert_eq!(device.stats().double_releases, 0);
        assert!(matches!(s.output(), Err(TableError::Disposed)));
        assert!(matches!(
            s.update(&mut device, &FrameTime::default()),
            Err(TableError::Disposed)
        ));
    }

    #[test]
    fn test_dispose_without_update() {
        let mut device = RecordingDevice::new();
        let mut s = source(1, 1);
        assert_eq!(s.dispose(&mut device), 0);
    }

    #[test]
    fn test_failed_draw_leaves_no_output() {
        let mut device = RecordingDevice::new();
        device.set_fail_glyph_outlines(true);
        let mut s = source(1, 1);
        let param = s.parameter_mut();
        param.cell_style.text_style = crate::types::CellTextStyle::ShapedBorder;
        param.table_model.set_text(0, 0, "x");
        assert!(s.update(&mut device, &FrameTime::default()).is_err());
        assert!(matches!(s.output(), Err(TableError::NotRendered)));
        s.dispose(&mut device);
        assert_eq!(device.live_resources(), 0);
    }

    #[test]
    fn test_resize_from_editor_thread() {
        let mut device = RecordingDevice::new();
        let mut s = source(2, 2);
        s.parameter_mut().table_model.set_text(1, 1, "kept");
        let editor = s.editor_handle();
        let worker = thread::spawn(move || editor.resize_blocking(3, 2));
        while !worker.is_finished() {
            s.drain_pending();
            thread::sleep(Duration::from_millis(1));
        }
        assert!(worker.join().unwrap().unwrap());
        s.update(&mut device, &FrameTime::default()).unwrap();
        let model = &s.parameter().table_model;
        assert_eq!(model.rows(), 3);
        assert_eq!(model.cell(1, 1).unwrap().text, "kept");
    }

    #[test]
    fn test_resize_blocking_on_owner_thread_fails() {
        let s = source(1, 1);
        assert!(matches!(
            s.editor_handle().resize_blocking(2, 2),
            Err(TableError::Dispatch(_))
        ));
    }
}
