use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgb, RgbImage};
use socialfx::{
    box_blur, flat_fill, Color, LayerInputs, LayeredCompositor, Mask, MaskScaler,
    OutlineBandExtractor,
};

const SIZES: [u32; 3] = [256, 512, 1024];

/// Elliptical silhouette roughly where a portrait subject sits
fn subject_mask(size: u32) -> Mask {
    let (cx, cy) = (size as f32 / 2.0, size as f32 * 0.55);
    let (rx, ry) = (size as f32 * 0.25, size as f32 * 0.4);
    Mask::from_fn(size, size, |x, y| {
        let dx = (x as f32 - cx) / rx;
        let dy = (y as f32 - cy) / ry;
        dx * dx + dy * dy <= 1.0
    })
}

fn test_image(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
}

fn bench_mask_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_scaling");
    group.sample_size(20);

    for size in SIZES {
        let mask = subject_mask(size);
        group.bench_with_input(BenchmarkId::new("rotate_scale", size), &mask, |b, mask| {
            b.iter(|| MaskScaler::rotate_scale(black_box(mask), 1.03, 0.0));
        });
        group.bench_with_input(BenchmarkId::new("crop_resize", size), &mask, |b, mask| {
            b.iter(|| MaskScaler::crop_resize(black_box(mask), 1.03));
        });
    }

    group.finish();
}

fn bench_layered_compositing(c: &mut Criterion) {
    let mut group = c.benchmark_group("layered_compositing");

    for size in SIZES {
        let base = test_image(size);
        let background = flat_fill(size, size, Color::BLUE);
        let stroke = flat_fill(size, size, Color::YELLOW);
        let subject = subject_mask(size);
        let Ok(scaled) = MaskScaler::rotate_scale(&subject, 1.03, 0.0) else {
            continue;
        };
        let Ok(band) = OutlineBandExtractor::extract(&subject, &scaled) else {
            continue;
        };

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                LayeredCompositor::new().composite(black_box(&LayerInputs {
                    base: &base,
                    background: &background,
                    stroke: &stroke,
                    subject_mask: &subject,
                    scaled_mask: &scaled,
                    band_mask: &band,
                }))
            });
        });
    }

    group.finish();
}

fn bench_box_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_blur");
    group.sample_size(20);

    let image = test_image(512);
    for kernel in [5, 33] {
        group.bench_with_input(BenchmarkId::from_parameter(kernel), &kernel, |b, &kernel| {
            b.iter(|| box_blur(black_box(&image), kernel));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mask_scaling,
    bench_layered_compositing,
    bench_box_blur
);
criterion_main!(benches);
