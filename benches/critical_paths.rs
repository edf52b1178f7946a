//! Criterion benchmarks for sprite layer critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Scale: column map generation
//! - Render: full-frame compositing at identity and non-identity scales
//! - Parallel: band-parallel compositing against the sequential path
//! - Visibility: rebuild after scrolling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spritelayer::scale::{sample_map, Scale};
use spritelayer::{Bitmap, BlendMode, PixelFormat, RenderOptions, SpriteLayer, SpriteOptions};

// =============================================================================
// Test Data Generators
// =============================================================================

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// 256-entry palette with varied alpha
fn make_palette() -> Vec<u32> {
    (0..256u32).map(|i| ((255 - i / 4) << 24) | (i * 0x0001_0305 & 0x00FF_FFFF)).collect()
}

/// Indexed 8-bit bitmap with a diagonal pattern
fn make_bitmap(size: u32) -> Bitmap {
    let pixels: Vec<u8> = (0..size * size).map(|i| ((i % size + i / size) % 256) as u8).collect();
    Bitmap::new(size, size, PixelFormat::Indexed8, pixels).expect("valid bitmap")
}

/// A layer with `count` sprites scattered over the raster
fn make_layer(count: i32, size: u32, scale: i32) -> SpriteLayer {
    let mut layer = SpriteLayer::new(WIDTH, HEIGHT);
    let bitmap = make_bitmap(size);
    for p in 0..count {
        let opts = SpriteOptions::at((p * 37) % WIDTH as i32 - 16, (p * 53) % HEIGHT as i32 - 16)
            .with_scale(scale, scale)
            .with_blend(if p % 2 == 0 { BlendMode::Alpha } else { BlendMode::Keyed });
        layer.add_sprite_with(bitmap.clone(), p, opts).expect("unique priority");
    }
    layer
}

// =============================================================================
// Scale Benchmarks
// =============================================================================

fn bench_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale");
    let mut out = Vec::with_capacity(4096);

    for raw in [512, 1024, 1536, -2048].iter() {
        let scale = Scale::new(*raw).expect("non-zero");
        group.bench_with_input(BenchmarkId::new("sample_map_1024", raw), &scale, |b, scale| {
            b.iter(|| sample_map(black_box(1024), *scale, 100, 640, &mut out))
        });
    }

    group.finish();
}

// =============================================================================
// Render Benchmarks
// =============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let palette = make_palette();
    let mut frame = vec![0u32; (WIDTH * HEIGHT) as usize];
    group.throughput(Throughput::Elements(u64::from(WIDTH * HEIGHT)));

    let scales = [("identity", 1024), ("half", 512), ("double", 2048), ("mirrored", -1536)];
    for (name, scale) in scales {
        let layer = make_layer(64, 32, scale);
        group.bench_function(BenchmarkId::new("64_sprites", name), |b| {
            b.iter(|| layer.render(black_box(&mut frame), WIDTH as usize, &palette))
        });
    }

    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel");
    let palette = make_palette();
    let mut frame = vec![0u32; (WIDTH * HEIGHT) as usize];
    let mut layer = make_layer(256, 64, 1300);

    group.bench_function("sequential_256", |b| {
        b.iter(|| layer.render(black_box(&mut frame), WIDTH as usize, &palette))
    });

    for band_height in [16u32, 32, 64].iter() {
        layer.set_render_options(RenderOptions {
            parallel: true,
            band_height: *band_height,
            ..RenderOptions::default()
        });
        group.bench_with_input(BenchmarkId::new("bands_256", band_height), &layer, |b, layer| {
            b.iter(|| layer.render(black_box(&mut frame), WIDTH as usize, &palette))
        });
    }

    group.finish();
}

// =============================================================================
// Visibility Benchmarks
// =============================================================================

fn bench_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility");
    let mut layer = make_layer(1024, 16, 1024);
    let mut x = 0;

    group.bench_function("scroll_rebuild_1024", |b| {
        b.iter(|| {
            x = (x + 7) % 640;
            layer.scroll(black_box(x), 0);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_scale, bench_render, bench_parallel, bench_visibility);
criterion_main!(benches);
