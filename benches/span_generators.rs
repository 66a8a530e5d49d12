//! Throughput of the per-pixel hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use agg_span::color::{OrderRgba, Rgba8};
use agg_span::gradient_lut::GradientLut;
use agg_span::image_accessors::{ImageAccessorClone, ImageAccessorWrap, WrapModeRepeat};
use agg_span::image_filters::{ImageFilterLut, ImageFilterSinc};
use agg_span::rendering_buffer::RowAccessor;
use agg_span::span_allocator::SpanAllocator;
use agg_span::span_gradient::{GradientRadialFocus, SpanGradient};
use agg_span::span_image_filter_color::{
    SpanImageFilterBilinear, SpanImageFilterGen, SpanImageResampleAffineGen,
};
use agg_span::span_interpolator_linear::SpanInterpolatorLinear;
use agg_span::trans_affine::TransAffine;

// ============================================================================
// Fixtures
// ============================================================================

const IMG: u32 = 256;
const SPAN: u32 = 512;

fn checkerboard() -> Vec<u8> {
    let mut buf = vec![0u8; (IMG * IMG * 4) as usize];
    for (i, px) in buf.chunks_exact_mut(4).enumerate() {
        let (x, y) = (i as u32 % IMG, i as u32 / IMG);
        let v = if ((x / 8) + (y / 8)) % 2 == 0 { 255 } else { 32 };
        px.copy_from_slice(&[v, v / 2, 255 - v, 255]);
    }
    buf
}

fn rotated() -> TransAffine {
    let mut mtx = TransAffine::new_rotation(0.3);
    mtx.multiply(&TransAffine::new_scaling(1.7, 1.7));
    mtx.invert();
    mtx
}

// ============================================================================
// Image filters
// ============================================================================

fn bench_image_filters(c: &mut Criterion) {
    let data = checkerboard();
    let rbuf = RowAccessor::new(&data, IMG, IMG, (IMG * 4) as i32).expect("valid buffer");
    let lanczos = ImageFilterLut::new(&ImageFilterSinc::lanczos(3.0), true);

    let mut group = c.benchmark_group("image_filters");
    group.throughput(Throughput::Elements(SPAN as u64));

    group.bench_function("bilinear", |b| {
        let src = ImageAccessorWrap::<OrderRgba, WrapModeRepeat, WrapModeRepeat>::new(rbuf);
        let mut gen: SpanImageFilterBilinear<_, _, Rgba8> =
            SpanImageFilterBilinear::new(src, SpanInterpolatorLinear::new(rotated()));
        let mut alloc = SpanAllocator::new();
        b.iter(|| black_box(alloc.generate(&mut gen, 0, black_box(17), SPAN)[0]))
    });

    group.bench_function("lanczos3", |b| {
        let src = ImageAccessorClone::<OrderRgba>::new(rbuf);
        let mut gen: SpanImageFilterGen<_, _, Rgba8> =
            SpanImageFilterGen::new(src, SpanInterpolatorLinear::new(rotated()), Some(&lanczos));
        let mut alloc = SpanAllocator::new();
        b.iter(|| black_box(alloc.generate(&mut gen, 0, black_box(17), SPAN)[0]))
    });

    group.bench_function("resample_affine_minify", |b| {
        let src = ImageAccessorClone::<OrderRgba>::new(rbuf);
        let shrink = TransAffine::new_scaling(4.0, 4.0);
        let mut gen: SpanImageResampleAffineGen<_, _, Rgba8> =
            SpanImageResampleAffineGen::new(src, SpanInterpolatorLinear::new(shrink), None);
        let mut alloc = SpanAllocator::new();
        b.iter(|| black_box(alloc.generate(&mut gen, 0, black_box(9), SPAN / 8)[0]))
    });

    group.finish();
}

// ============================================================================
// Gradients
// ============================================================================

fn bench_gradients(c: &mut Criterion) {
    let mut lut = GradientLut::<Rgba8>::new_default();
    lut.add_color(0.0, Rgba8::new(255, 0, 0, 255));
    lut.add_color(0.5, Rgba8::new(0, 255, 0, 255));
    lut.add_color(1.0, Rgba8::new(0, 0, 255, 255));
    lut.build_lut();

    let mut group = c.benchmark_group("gradients");
    group.throughput(Throughput::Elements(SPAN as u64));

    group.bench_function("radial_focus", |b| {
        let mut gen = SpanGradient::new(
            SpanInterpolatorLinear::new(TransAffine::new_translation(-256.0, -256.0)),
            GradientRadialFocus::new(200.0, 60.0, 40.0),
            &lut,
            0.0,
            200.0,
        );
        let mut alloc = SpanAllocator::new();
        b.iter(|| black_box(alloc.generate(&mut gen, 0, black_box(300), SPAN)[0]))
    });

    group.finish();
}

criterion_group!(benches, bench_image_filters, bench_gradients);
criterion_main!(benches);
