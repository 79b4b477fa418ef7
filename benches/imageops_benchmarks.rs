//! Performance benchmarks for imageops-enhance
//!
//! Measures the resampler, the matte refiner, the enhance pipeline and the
//! codec path across typical photo sizes.

use criterion::*;
use imageops_enhance::{
    AlphaMatteExt, Backdrop, BlurExt, EnhanceExt, MatteSpec, PipelineSpec, PixelBuffer,
    ResampleSpec, ResizeExt, UnsharpParams,
};
use itertools::iproduct;
use std::hint::black_box;

/// Helper function to create a test RGB buffer with specific dimensions
fn create_rgb_buffer(width: u32, height: u32) -> PixelBuffer {
    let data = iproduct!(0..height, 0..width)
        .flat_map(|(y, x)| {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = ((x + y) * 255 / (width + height)) as u8;
            [r, g, b]
        })
        .collect();
    PixelBuffer::new(width, height, 3, data).unwrap()
}

/// Helper function to create an RGBA cutout with a soft circular edge
fn create_cutout(width: u32, height: u32) -> PixelBuffer {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = width.min(height) as f32 / 2.0;

    let data = iproduct!(0..height, 0..width)
        .flat_map(|(y, x)| {
            let distance = (x as f32 - center_x).hypot(y as f32 - center_y);
            let alpha = (255.0 * (1.0 - distance / radius).clamp(0.0, 1.0) * 4.0).min(255.0) as u8;
            [(x % 256) as u8, (y % 256) as u8, 128, alpha]
        })
        .collect();
    PixelBuffer::new(width, height, 4, data).unwrap()
}

/// Benchmark Lanczos resampling for common up- and downscale ratios
fn bench_resize(c: &mut Criterion) {
    let cases = vec![
        ((500, 500), (1000, 1000)),   // 2x upscale
        ((1920, 1080), (960, 540)),   // 2x downscale
        ((1920, 1080), (1280, 720)),  // HD to 720p
        ((4000, 3000), (1920, 1440)), // Photo to compress size
    ];

    let mut group = c.benchmark_group("resize");
    group.sample_size(10);

    for ((width, height), (target_width, target_height)) in cases {
        let pixels = target_width * target_height;
        group.throughput(Throughput::Elements(u64::from(pixels)));

        let buffer = create_rgb_buffer(width, height);
        let spec = ResampleSpec::new(target_width, target_height);
        let sharpened = spec.with_unsharp(UnsharpParams::RESIZER);
        let id = format!("{width}x{height}->{target_width}x{target_height}");

        group.bench_with_input(BenchmarkId::new("lanczos", &id), &buffer, |b, img| {
            b.iter(|| black_box(img.resized(&spec).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("lanczos_unsharp", &id), &buffer, |b, img| {
            b.iter(|| black_box(img.resized(&sharpened).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark Gaussian blur at the radii used by the denoise stage
fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur");
    group.sample_size(10);

    let buffer = create_rgb_buffer(1000, 1000);
    group.throughput(Throughput::Elements(1_000_000));

    for radius in [0.5f32, 1.0, 2.0] {
        group.bench_with_input(BenchmarkId::new("gaussian", radius), &buffer, |b, img| {
            b.iter(|| black_box(img.blurred(radius).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark alpha erosion and compositing
fn bench_matte(c: &mut Criterion) {
    let sizes = vec![(500, 500), (1000, 1000), (1920, 1080)];

    let mut group = c.benchmark_group("matte");
    group.sample_size(10);

    for (width, height) in sizes {
        group.throughput(Throughput::Elements(u64::from(width * height)));
        let cutout = create_cutout(width, height);
        let id = format!("{width}x{height}");

        for level in [1u32, 5, 10] {
            group.bench_with_input(
                BenchmarkId::new(format!("refine_alpha_level_{level}"), &id),
                &cutout,
                |b, img| b.iter(|| black_box(img.refine_alpha(level).unwrap())),
            );
        }

        let spec = MatteSpec::new(3, Backdrop::rgb(255, 255, 255));
        group.bench_with_input(BenchmarkId::new("apply_matte", &id), &cutout, |b, img| {
            b.iter(|| black_box(img.apply_matte(&spec).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the denoise, upscale and sharpen pipeline
fn bench_enhance(c: &mut Criterion) {
    let mut group = c.benchmark_group("enhance");
    group.sample_size(10);

    let buffer = create_rgb_buffer(480, 320);
    for (name, spec) in [
        ("plain_2x", PipelineSpec::new(2.0, 0.0, 0.0)),
        ("clarity_2x", PipelineSpec::new(2.0, 120.0, 0.0)),
        ("denoise_clarity_2x", PipelineSpec::new(2.0, 120.0, 50.0)),
        ("denoise_clarity_4x", PipelineSpec::new(4.0, 120.0, 50.0)),
    ] {
        let (width, height) = spec.target_dimensions(480, 320).unwrap();
        group.throughput(Throughput::Elements(u64::from(width * height)));
        group.bench_with_input(BenchmarkId::new(name, "480x320"), &buffer, |b, img| {
            b.iter(|| black_box(img.enhanced(&spec).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark encoding through the bundled codec
#[cfg(feature = "codec")]
fn bench_codec(c: &mut Criterion) {
    use imageops_enhance::{compress, CodecAdapter, EncodeOptions, ImageCodec, OutputFormat};

    let mut group = c.benchmark_group("codec");
    group.sample_size(10);

    let buffer = create_rgb_buffer(1920, 1080);
    for format in [OutputFormat::Jpeg, OutputFormat::Png] {
        group.bench_with_input(
            BenchmarkId::new("encode", format.extension()),
            &buffer,
            |b, img| {
                b.iter(|| {
                    black_box(
                        ImageCodec
                            .encode(img, &EncodeOptions::new(format, 90))
                            .unwrap(),
                    )
                })
            },
        );
    }

    let large = create_rgb_buffer(3000, 2000);
    group.bench_with_input(BenchmarkId::new("compress", "3000x2000"), &large, |b, img| {
        b.iter(|| black_box(compress(&ImageCodec, img, 80, OutputFormat::Jpeg).unwrap()))
    });

    group.finish();
}

#[cfg(not(feature = "codec"))]
fn bench_codec(_c: &mut Criterion) {}

criterion_group!(
    benches,
    bench_resize,
    bench_blur,
    bench_matte,
    bench_enhance,
    bench_codec
);
criterion_main!(benches);
