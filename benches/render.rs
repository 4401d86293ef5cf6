//! Benchmarks for table redraw cost.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tableshape::{
    CellTextStyle, FrameTime, MemoryFontCatalog, RecordingDevice, TableShapeParameter,
    TableShapeSource,
};

fn filled(rows: usize, cols: usize) -> TableShapeParameter {
    let mut param = TableShapeParameter::with_grid(rows, cols);
    param.width.set_value(1920.0);
    param.height.set_value(1080.0);
    for r in 0..rows {
        for c in 0..cols {
            param.table_model.set_text(r, c, format!("R{r}C{c}"));
        }
    }
    param
}

fn source(param: TableShapeParameter) -> TableShapeSource {
    TableShapeSource::new(
        param,
        Box::new(MemoryFontCatalog::with_families(["Yu Gothic UI"])),
    )
}

/// Every iteration edits one cell, forcing a full redraw
fn bench_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_redraw");

    for size in [2usize, 8, 16] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut device = RecordingDevice::new();
            let mut s = source(filled(size, size));
            let time = FrameTime::new(0, 60, 30);
            let mut tick = 0u64;
            b.iter(|| {
                tick += 1;
                s.parameter_mut().table_model.set_text(0, 0, tick.to_string());
                black_box(s.update(&mut device, &time).expect("redraw failed"))
            });
        });
    }

    group.finish();
}

/// Outlined text goes through the glyph outline path
fn bench_outlined_redraw(c: &mut Criterion) {
    let mut param = filled(8, 8);
    param.cell_style.text_style = CellTextStyle::RoundedBorder;
    let mut device = RecordingDevice::new();
    let mut s = source(param);
    let time = FrameTime::new(0, 60, 30);
    let mut tick = 0u64;

    c.bench_function("outlined_redraw_8x8", |b| {
        b.iter(|| {
            tick += 1;
            s.parameter_mut().table_model.set_text(0, 0, tick.to_string());
            black_box(s.update(&mut device, &time).expect("redraw failed"))
        })
    });
}

/// Unchanged parameters: snapshot capture and compare only
fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_hit");

    for size in [2usize, 8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut device = RecordingDevice::new();
            let mut s = source(filled(size, size));
            let time = FrameTime::new(0, 60, 30);
            s.update(&mut device, &time).expect("first draw failed");
            b.iter(|| black_box(s.update(&mut device, &time).expect("update failed")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_full_redraw,
    bench_outlined_redraw,
    bench_cache_hit
);
criterion_main!(benches);
