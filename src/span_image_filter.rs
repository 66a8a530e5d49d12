//! State shared by the image span generators.
//!
//! [`SpanImageFilterBase`] owns the source, the interpolator and the
//! filter table, and applies the filter offset. The resampling states
//! decide how far the filter footprint is stretched when the transform
//! minifies.

use crate::basics::uround;
use crate::image_accessors::ImageSource;
use crate::image_filters::{
    default_bilinear_lut, ImageFilterLut, IMAGE_SUBPIXEL_SCALE, IMAGE_SUBPIXEL_SHIFT,
};
use crate::span_interpolator_linear::SpanInterpolator;
use crate::trans_affine::TransAffine;

/// Convert a value in `shift`-bit fixed point to image subpixel units.
#[inline]
pub(crate) fn to_image_subpixel(v: i32, shift: u32) -> i32 {
    if shift >= IMAGE_SUBPIXEL_SHIFT {
        v >> (shift - IMAGE_SUBPIXEL_SHIFT)
    } else {
        v << (IMAGE_SUBPIXEL_SHIFT - shift)
    }
}

// ============================================================================
// SpanImageFilterBase
// ============================================================================

/// Source, interpolator, filter table and filter offset of one generator.
///
/// A generator built without a table uses the shared bilinear one, so the
/// kernel-based variants never have to check for a missing filter.
pub struct SpanImageFilterBase<'a, S, I> {
    source: S,
    interpolator: I,
    filter: &'a ImageFilterLut,
    dx_dbl: f64,
    dy_dbl: f64,
    dx_int: i32,
    dy_int: i32,
}

impl<'a, S: ImageSource, I: SpanInterpolator> SpanImageFilterBase<'a, S, I> {
    /// Create with the default filter offset of half a pixel.
    pub fn new(source: S, interpolator: I, filter: Option<&'a ImageFilterLut>) -> Self {
        Self {
            source,
            interpolator,
            filter: filter.unwrap_or_else(|| default_bilinear_lut()),
            dx_dbl: 0.5,
            dy_dbl: 0.5,
            dx_int: IMAGE_SUBPIXEL_SCALE / 2,
            dy_int: IMAGE_SUBPIXEL_SCALE / 2,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Replace the source image.
    pub fn attach(&mut self, source: S) {
        self.source = source;
    }

    pub fn interpolator(&self) -> &I {
        &self.interpolator
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interpolator
    }

    pub fn filter(&self) -> &'a ImageFilterLut {
        self.filter
    }

    pub fn set_filter(&mut self, filter: &'a ImageFilterLut) {
        self.filter = filter;
    }

    pub fn filter_dx_int(&self) -> i32 {
        self.dx_int
    }

    pub fn filter_dy_int(&self) -> i32 {
        self.dy_int
    }

    pub fn filter_dx_dbl(&self) -> f64 {
        self.dx_dbl
    }

    pub fn filter_dy_dbl(&self) -> f64 {
        self.dy_dbl
    }

    /// Shift applied to destination pixels before interpolation.
    /// `(0.5, 0.5)` samples at pixel centers.
    pub fn set_filter_offset(&mut self, dx: f64, dy: f64) {
        self.dx_dbl = dx;
        self.dy_dbl = dy;
        self.dx_int = uround(dx * IMAGE_SUBPIXEL_SCALE as f64) as i32;
        self.dy_int = uround(dy * IMAGE_SUBPIXEL_SCALE as f64) as i32;
    }

    pub fn set_filter_offset_uniform(&mut self, d: f64) {
        self.set_filter_offset(d, d);
    }

    /// Seed the interpolator for a span at `(x, y)` plus the filter offset.
    #[inline]
    pub fn begin(&mut self, x: i32, y: i32, len: u32) {
        self.interpolator
            .begin(x as f64 + self.dx_dbl, y as f64 + self.dy_dbl, len);
    }

    /// Current source position in image subpixel units.
    #[inline]
    pub fn coordinates(&self) -> (i32, i32) {
        let (x, y) = self.interpolator.coordinates();
        (
            to_image_subpixel(x, I::SUBPIXEL_SHIFT),
            to_image_subpixel(y, I::SUBPIXEL_SHIFT),
        )
    }

    /// Current local scale in image subpixel units.
    #[inline]
    pub fn local_scale(&self) -> (i32, i32) {
        let (x, y) = self.interpolator.local_scale();
        (
            to_image_subpixel(x, I::SUBPIXEL_SHIFT),
            to_image_subpixel(y, I::SUBPIXEL_SHIFT),
        )
    }

    #[inline]
    pub fn next(&mut self) {
        self.interpolator.next();
    }
}

// ============================================================================
// SpanImageResampleAffine
// ============================================================================

/// Footprint of an affine resampler, fixed for a whole batch of spans.
///
/// `prepare` derives the scale from the matrix once; the generator then
/// uses the same `rx`/`ry` for every pixel.
#[derive(Debug, Clone, Copy)]
pub struct SpanImageResampleAffine {
    scale_limit: f64,
    blur_x: f64,
    blur_y: f64,
    rx: i32,
    ry: i32,
    rx_inv: i32,
    ry_inv: i32,
}

impl SpanImageResampleAffine {
    pub fn new() -> Self {
        Self {
            scale_limit: 200.0,
            blur_x: 1.0,
            blur_y: 1.0,
            rx: IMAGE_SUBPIXEL_SCALE,
            ry: IMAGE_SUBPIXEL_SCALE,
            rx_inv: IMAGE_SUBPIXEL_SCALE,
            ry_inv: IMAGE_SUBPIXEL_SCALE,
        }
    }

    pub fn scale_limit(&self) -> f64 {
        self.scale_limit
    }

    /// Upper bound on the footprint area, in source pixels.
    pub fn set_scale_limit(&mut self, v: f64) {
        self.scale_limit = v;
    }

    pub fn blur_x(&self) -> f64 {
        self.blur_x
    }

    pub fn blur_y(&self) -> f64 {
        self.blur_y
    }

    pub fn set_blur_x(&mut self, v: f64) {
        self.blur_x = v;
    }

    pub fn set_blur_y(&mut self, v: f64) {
        self.blur_y = v;
    }

    pub fn set_blur(&mut self, v: f64) {
        self.blur_x = v;
        self.blur_y = v;
    }

    pub fn rx(&self) -> i32 {
        self.rx
    }

    pub fn ry(&self) -> i32 {
        self.ry
    }

    pub fn rx_inv(&self) -> i32 {
        self.rx_inv
    }

    pub fn ry_inv(&self) -> i32 {
        self.ry_inv
    }

    /// Compute the footprint for the destination-to-source matrix `trans`.
    ///
    /// Magnification keeps the native radius; minification widens it by
    /// the scale factor, limited so `scale_x * scale_y` stays within
    /// `scale_limit`.
    pub fn prepare(&mut self, trans: &TransAffine) {
        let (mut scale_x, mut scale_y) = trans.scaling_abs();

        let scale_xy = scale_x * scale_y;
        if scale_xy > self.scale_limit {
            scale_x = scale_x * self.scale_limit / scale_xy;
            scale_y = scale_y * self.scale_limit / scale_xy;
        }

        let scale_x = (scale_x.clamp(1.0, self.scale_limit.max(1.0)) * self.blur_x).max(1.0);
        let scale_y = (scale_y.clamp(1.0, self.scale_limit.max(1.0)) * self.blur_y).max(1.0);

        let sub = IMAGE_SUBPIXEL_SCALE as f64;
        self.rx = uround(scale_x * sub) as i32;
        self.rx_inv = uround(sub / scale_x) as i32;
        self.ry = uround(scale_y * sub) as i32;
        self.ry_inv = uround(sub / scale_y) as i32;
        log::trace!(
            "affine resample footprint: rx {} ry {} (scale {:.3} x {:.3})",
            self.rx,
            self.ry,
            scale_x,
            scale_y
        );
    }
}

impl Default for SpanImageResampleAffine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SpanImageResample
// ============================================================================

/// Footprint limits of a resampler that reads the scale per pixel.
#[derive(Debug, Clone, Copy)]
pub struct SpanImageResample {
    scale_limit: i32,
    blur_x: i32,
    blur_y: i32,
}

impl SpanImageResample {
    pub fn new() -> Self {
        Self {
            scale_limit: 20,
            blur_x: IMAGE_SUBPIXEL_SCALE,
            blur_y: IMAGE_SUBPIXEL_SCALE,
        }
    }

    pub fn scale_limit(&self) -> i32 {
        self.scale_limit
    }

    /// Upper bound on the per-axis scale, in source pixels.
    pub fn set_scale_limit(&mut self, v: i32) {
        self.scale_limit = v.max(1);
    }

    pub fn blur_x(&self) -> f64 {
        self.blur_x as f64 / IMAGE_SUBPIXEL_SCALE as f64
    }

    pub fn blur_y(&self) -> f64 {
        self.blur_y as f64 / IMAGE_SUBPIXEL_SCALE as f64
    }

    pub fn set_blur_x(&mut self, v: f64) {
        self.blur_x = uround(v * IMAGE_SUBPIXEL_SCALE as f64) as i32;
    }

    pub fn set_blur_y(&mut self, v: f64) {
        self.blur_y = uround(v * IMAGE_SUBPIXEL_SCALE as f64) as i32;
    }

    pub fn set_blur(&mut self, v: f64) {
        self.set_blur_x(v);
        self.set_blur_y(v);
    }

    /// Clamp a local scale (image subpixel units) into
    /// `[1, scale_limit]` pixels and apply blur.
    #[inline]
    pub fn adjust_scale(&self, rx: i32, ry: i32) -> (i32, i32) {
        let lo = IMAGE_SUBPIXEL_SCALE;
        let hi = IMAGE_SUBPIXEL_SCALE * self.scale_limit;
        let rx = (rx.clamp(lo, hi) * self.blur_x) >> IMAGE_SUBPIXEL_SHIFT;
        let ry = (ry.clamp(lo, hi) * self.blur_y) >> IMAGE_SUBPIXEL_SHIFT;
        (rx.max(lo), ry.max(lo))
    }
}

impl Default for SpanImageResample {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
