//! Image span generators.
//!
//! Each generator reads a source image through an [`ImageSource`], maps
//! destination pixels into it with a [`SpanInterpolator`] and writes one
//! output color per pixel. The source's pixel order and the output color
//! format are independent type parameters, so a BGRA frame buffer can feed
//! an `Rgba8` span as easily as a gray one.
//!
//! Every filtered result is clamped into a legal premultiplied color: alpha
//! into `0..=255`, then each color channel into `0..=alpha`.

use core::borrow::Borrow;
use core::marker::PhantomData;

use crate::color::{clamp_premultiplied, ColorFormat, PixelOrder, Rgba8};
use crate::image_accessors::ImageSource;
use crate::image_filters::{
    ImageFilterLut, IMAGE_FILTER_SCALE, IMAGE_FILTER_SHIFT, IMAGE_SUBPIXEL_MASK,
    IMAGE_SUBPIXEL_SCALE, IMAGE_SUBPIXEL_SHIFT,
};
use crate::span_generator::SpanGenerator;
use crate::span_image_filter::{SpanImageFilterBase, SpanImageResample, SpanImageResampleAffine};
use crate::span_interpolator_linear::{SpanInterpolator, SpanInterpolatorLinear, Transformer};
use crate::trans_affine::TransAffine;

#[inline]
fn accumulate(fg: &mut [i32; 4], p: [i32; 4], weight: i32) {
    for (acc, v) in fg.iter_mut().zip(p) {
        *acc += weight * v;
    }
}

/// Rounded product of two table weights, back on the filter scale.
#[inline]
fn weight_product(a: i16, b: i16) -> i32 {
    (a as i32 * b as i32 + IMAGE_FILTER_SCALE / 2) >> IMAGE_FILTER_SHIFT
}

// ============================================================================
// SpanImageFilterNn: nearest neighbor
// ============================================================================

/// Copies the source pixel containing each sample point.
pub struct SpanImageFilterNn<'a, S, I, C = Rgba8> {
    base: SpanImageFilterBase<'a, S, I>,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I: SpanInterpolator, C> SpanImageFilterNn<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        Self {
            base: SpanImageFilterBase::new(source, interpolator, None),
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, S, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, S, I> {
        &mut self.base
    }
}

impl<S: ImageSource, I: SpanInterpolator, C: ColorFormat> SpanGenerator
    for SpanImageFilterNn<'_, S, I, C>
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.base.begin(x, y, len);
        for pixel in span.iter_mut().take(len as usize) {
            let (x_hr, y_hr) = self.base.coordinates();
            let p = S::Order::rgba(self.base.source_mut().span(
                x_hr >> IMAGE_SUBPIXEL_SHIFT,
                y_hr >> IMAGE_SUBPIXEL_SHIFT,
                1,
            ));
            *pixel = clamp_premultiplied(p);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterBilinear
// ============================================================================

/// Blends the 2x2 neighborhood by the subpixel fractions.
///
/// Boundary behavior comes from the accessor.
pub struct SpanImageFilterBilinear<'a, S, I, C = Rgba8> {
    base: SpanImageFilterBase<'a, S, I>,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I: SpanInterpolator, C> SpanImageFilterBilinear<'a, S, I, C> {
    pub fn new(source: S, interpolator: I) -> Self {
        Self {
            base: SpanImageFilterBase::new(source, interpolator, None),
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, S, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, S, I> {
        &mut self.base
    }
}

impl<S: ImageSource, I: SpanInterpolator, C: ColorFormat> SpanGenerator
    for SpanImageFilterBilinear<'_, S, I, C>
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.base.begin(x, y, len);
        let dx_int = self.base.filter_dx_int();
        let dy_int = self.base.filter_dy_int();
        let half = IMAGE_SUBPIXEL_SCALE * IMAGE_SUBPIXEL_SCALE / 2;
        let subpix = IMAGE_SUBPIXEL_SCALE;

        for pixel in span.iter_mut().take(len as usize) {
            let (mut x_hr, mut y_hr) = self.base.coordinates();
            x_hr -= dx_int;
            y_hr -= dy_int;

            let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
            let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;
            let x_frac = x_hr & IMAGE_SUBPIXEL_MASK;
            let y_frac = y_hr & IMAGE_SUBPIXEL_MASK;

            let mut fg = [half; 4];
            let src = self.base.source_mut();

            let p = S::Order::rgba(src.span(x_lr, y_lr, 2));
            accumulate(&mut fg, p, (subpix - x_frac) * (subpix - y_frac));

            let p = S::Order::rgba(src.next_x());
            accumulate(&mut fg, p, x_frac * (subpix - y_frac));

            let p = S::Order::rgba(src.next_y());
            accumulate(&mut fg, p, (subpix - x_frac) * y_frac);

            let p = S::Order::rgba(src.next_x());
            accumulate(&mut fg, p, x_frac * y_frac);

            *pixel = clamp_premultiplied(fg.map(|v| v >> (IMAGE_SUBPIXEL_SHIFT * 2)));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterBilinearClip: bilinear with a background color
// ============================================================================

/// Bilinear filter that substitutes a background color for every tap
/// outside the image.
///
/// Reads whole rows through `ImageSource::row_ptr`, so the accessor's own
/// boundary policy never applies. Pixels entirely outside come out as the
/// background exactly.
pub struct SpanImageFilterBilinearClip<'a, S, I, C = Rgba8> {
    base: SpanImageFilterBase<'a, S, I>,
    background: C,
}

impl<'a, S: ImageSource, I: SpanInterpolator, C: ColorFormat> SpanImageFilterBilinearClip<'a, S, I, C> {
    pub fn new(source: S, background: C, interpolator: I) -> Self {
        Self {
            base: SpanImageFilterBase::new(source, interpolator, None),
            background,
        }
    }

    pub fn background_color(&self) -> &C {
        &self.background
    }

    pub fn set_background_color(&mut self, v: C) {
        self.background = v;
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, S, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, S, I> {
        &mut self.base
    }

    #[inline]
    fn fetch(&self, x: i32, y: i32, back: [i32; 4]) -> [i32; 4] {
        let src = self.base.source();
        if x < 0 || y < 0 || x as u32 >= src.width() || y as u32 >= src.height() {
            return back;
        }
        let width = <S::Order as PixelOrder>::PIX_WIDTH;
        let off = x as usize * width;
        match src.row_ptr(y).get(off..off + width) {
            Some(p) => S::Order::rgba(p),
            None => back,
        }
    }
}

impl<S: ImageSource, I: SpanInterpolator, C: ColorFormat> SpanGenerator
    for SpanImageFilterBilinearClip<'_, S, I, C>
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.base.begin(x, y, len);
        let dx_int = self.base.filter_dx_int();
        let dy_int = self.base.filter_dy_int();
        let back = self.background.to_rgba8().map(i32::from);
        let maxx = self.base.source().width() as i32 - 1;
        let maxy = self.base.source().height() as i32 - 1;
        let half = IMAGE_SUBPIXEL_SCALE * IMAGE_SUBPIXEL_SCALE / 2;
        let subpix = IMAGE_SUBPIXEL_SCALE;

        for pixel in span.iter_mut().take(len as usize) {
            let (mut x_hr, mut y_hr) = self.base.coordinates();
            x_hr -= dx_int;
            y_hr -= dy_int;

            let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
            let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;

            if x_lr < -1 || y_lr < -1 || x_lr > maxx || y_lr > maxy {
                *pixel = self.background;
            } else {
                let x_frac = x_hr & IMAGE_SUBPIXEL_MASK;
                let y_frac = y_hr & IMAGE_SUBPIXEL_MASK;
                let mut fg = [half; 4];

                let p = self.fetch(x_lr, y_lr, back);
                accumulate(&mut fg, p, (subpix - x_frac) * (subpix - y_frac));
                let p = self.fetch(x_lr + 1, y_lr, back);
                accumulate(&mut fg, p, x_frac * (subpix - y_frac));
                let p = self.fetch(x_lr, y_lr + 1, back);
                accumulate(&mut fg, p, (subpix - x_frac) * y_frac);
                let p = self.fetch(x_lr + 1, y_lr + 1, back);
                accumulate(&mut fg, p, x_frac * y_frac);

                *pixel = clamp_premultiplied(fg.map(|v| v >> (IMAGE_SUBPIXEL_SHIFT * 2)));
            }
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilter2x2: 2x2 kernel from a filter table
// ============================================================================

/// 2x2 filter taking its weights from the center of a filter table.
///
/// Only the two central taps of wider kernels are used.
pub struct SpanImageFilter2x2<'a, S, I, C = Rgba8> {
    base: SpanImageFilterBase<'a, S, I>,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I: SpanInterpolator, C> SpanImageFilter2x2<'a, S, I, C> {
    /// Without a table the shared bilinear one is used.
    pub fn new(source: S, interpolator: I, filter: Option<&'a ImageFilterLut>) -> Self {
        Self {
            base: SpanImageFilterBase::new(source, interpolator, filter),
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, S, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, S, I> {
        &mut self.base
    }
}

impl<S: ImageSource, I: SpanInterpolator, C: ColorFormat> SpanGenerator
    for SpanImageFilter2x2<'_, S, I, C>
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.base.begin(x, y, len);
        let dx_int = self.base.filter_dx_int();
        let dy_int = self.base.filter_dy_int();
        let filter = self.base.filter();
        let wa = filter.weight_array();
        let offset = ((filter.diameter() / 2).saturating_sub(1) as usize) << IMAGE_SUBPIXEL_SHIFT;
        let subpix = IMAGE_SUBPIXEL_SCALE as usize;

        for pixel in span.iter_mut().take(len as usize) {
            let (mut x_hr, mut y_hr) = self.base.coordinates();
            x_hr -= dx_int;
            y_hr -= dy_int;

            let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
            let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;
            let x_frac = (x_hr & IMAGE_SUBPIXEL_MASK) as usize;
            let y_frac = (y_hr & IMAGE_SUBPIXEL_MASK) as usize;

            let left = wa[offset + x_frac + subpix];
            let right = wa[offset + x_frac];
            let top = wa[offset + y_frac + subpix];
            let bottom = wa[offset + y_frac];

            let mut fg = [IMAGE_FILTER_SCALE / 2; 4];
            let src = self.base.source_mut();

            let p = S::Order::rgba(src.span(x_lr, y_lr, 2));
            accumulate(&mut fg, p, weight_product(left, top));
            let p = S::Order::rgba(src.next_x());
            accumulate(&mut fg, p, weight_product(right, top));
            let p = S::Order::rgba(src.next_y());
            accumulate(&mut fg, p, weight_product(left, bottom));
            let p = S::Order::rgba(src.next_x());
            accumulate(&mut fg, p, weight_product(right, bottom));

            *pixel = clamp_premultiplied(fg.map(|v| v >> IMAGE_FILTER_SHIFT));
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageFilterGen: full N x N kernel
// ============================================================================

/// General filter walking the full `diameter x diameter` kernel.
///
/// Kernels with negative lobes can overshoot; the result is clamped.
pub struct SpanImageFilterGen<'a, S, I, C = Rgba8> {
    base: SpanImageFilterBase<'a, S, I>,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I: SpanInterpolator, C> SpanImageFilterGen<'a, S, I, C> {
    /// Without a table the shared bilinear one is used.
    pub fn new(source: S, interpolator: I, filter: Option<&'a ImageFilterLut>) -> Self {
        Self {
            base: SpanImageFilterBase::new(source, interpolator, filter),
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, S, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, S, I> {
        &mut self.base
    }
}

impl<S: ImageSource, I: SpanInterpolator, C: ColorFormat> SpanGenerator
    for SpanImageFilterGen<'_, S, I, C>
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.base.begin(x, y, len);
        let dx_int = self.base.filter_dx_int();
        let dy_int = self.base.filter_dy_int();
        let filter = self.base.filter();
        let diameter = filter.diameter();
        let start = filter.start();
        let wa = filter.weight_array();

        for pixel in span.iter_mut().take(len as usize) {
            let (mut cx, mut cy) = self.base.coordinates();
            cx -= dx_int;
            cy -= dy_int;

            let x_lr = cx >> IMAGE_SUBPIXEL_SHIFT;
            let y_lr = cy >> IMAGE_SUBPIXEL_SHIFT;
            let x_wa_start = (IMAGE_SUBPIXEL_MASK - (cx & IMAGE_SUBPIXEL_MASK)) as usize;
            let mut y_wa = (IMAGE_SUBPIXEL_MASK - (cy & IMAGE_SUBPIXEL_MASK)) as usize;

            let mut fg = [IMAGE_FILTER_SCALE / 2; 4];
            let src = self.base.source_mut();
            let mut p = S::Order::rgba(src.span(x_lr + start, y_lr + start, diameter));

            for row in 0..diameter {
                let weight_y = wa[y_wa];
                let mut x_wa = x_wa_start;
                for col in 0..diameter {
                    accumulate(&mut fg, p, weight_product(weight_y, wa[x_wa]));
                    if col + 1 < diameter {
                        x_wa += IMAGE_SUBPIXEL_SCALE as usize;
                        p = S::Order::rgba(src.next_x());
                    }
                }
                if row + 1 < diameter {
                    y_wa += IMAGE_SUBPIXEL_SCALE as usize;
                    p = S::Order::rgba(src.next_y());
                }
            }

            *pixel = clamp_premultiplied(fg.map(|v| v >> IMAGE_FILTER_SHIFT));
            self.base.next();
        }
    }
}

// ============================================================================
// Resampling kernel walk
// ============================================================================

/// Footprint of one resampled pixel, in image subpixel units.
#[derive(Debug, Clone, Copy)]
struct Footprint {
    rx: i32,
    ry: i32,
    rx_inv: i32,
    ry_inv: i32,
}

impl Footprint {
    #[inline]
    fn from_radii(rx: i32, ry: i32) -> Self {
        let sq = IMAGE_SUBPIXEL_SCALE * IMAGE_SUBPIXEL_SCALE;
        Self {
            rx,
            ry,
            rx_inv: sq / rx,
            ry_inv: sq / ry,
        }
    }
}

/// Weighted average of the kernel stretched over `fp`, centered on
/// `(cx, cy)` after the filter offset. Normalized by the total weight so
/// a uniform image comes out unchanged at any scale.
fn resample_pixel<S: ImageSource>(
    src: &mut S,
    filter: &ImageFilterLut,
    cx: i32,
    cy: i32,
    offset: (i32, i32),
    fp: Footprint,
) -> [i32; 4] {
    let diameter = filter.diameter() as i32;
    let filter_scale = diameter << IMAGE_SUBPIXEL_SHIFT;
    let wa = filter.weight_array();

    let radius_x = (diameter * fp.rx) >> 1;
    let radius_y = (diameter * fp.ry) >> 1;
    let len_x_lr = (diameter * fp.rx + IMAGE_SUBPIXEL_MASK) >> IMAGE_SUBPIXEL_SHIFT;

    let cx = cx + offset.0 - radius_x;
    let cy = cy + offset.1 - radius_y;

    let x_lr = cx >> IMAGE_SUBPIXEL_SHIFT;
    let y_lr = cy >> IMAGE_SUBPIXEL_SHIFT;
    let x_wa_start = ((IMAGE_SUBPIXEL_MASK - (cx & IMAGE_SUBPIXEL_MASK)) * fp.rx_inv)
        >> IMAGE_SUBPIXEL_SHIFT;
    let mut y_wa = ((IMAGE_SUBPIXEL_MASK - (cy & IMAGE_SUBPIXEL_MASK)) * fp.ry_inv)
        >> IMAGE_SUBPIXEL_SHIFT;

    let mut fg = [0i64; 4];
    let mut total_weight = 0i64;
    let mut p = S::Order::rgba(src.span(x_lr, y_lr, len_x_lr.max(1) as u32));

    loop {
        let weight_y = wa[y_wa as usize];
        let mut x_wa = x_wa_start;
        loop {
            let weight = weight_product(weight_y, wa[x_wa as usize]) as i64;
            for (acc, v) in fg.iter_mut().zip(p) {
                *acc += weight * v as i64;
            }
            total_weight += weight;

            x_wa += fp.rx_inv;
            if x_wa >= filter_scale {
                break;
            }
            p = S::Order::rgba(src.next_x());
        }
        y_wa += fp.ry_inv;
        if y_wa >= filter_scale {
            break;
        }
        p = S::Order::rgba(src.next_y());
    }

    if total_weight == 0 {
        return [0; 4];
    }
    fg.map(|v| (v / total_weight) as i32)
}

// ============================================================================
// SpanImageResampleAffineGen: resampling under an affine transform
// ============================================================================

/// Resampler whose footprint is fixed per batch by the affine matrix.
///
/// Call `prepare` after changing the transform; the footprint it computes
/// is reused for every pixel.
pub struct SpanImageResampleAffineGen<'a, S, T = TransAffine, C = Rgba8> {
    base: SpanImageFilterBase<'a, S, SpanInterpolatorLinear<T>>,
    resample: SpanImageResampleAffine,
    _color: PhantomData<C>,
}

impl<'a, S, T, C> SpanImageResampleAffineGen<'a, S, T, C>
where
    S: ImageSource,
    T: Transformer + Borrow<TransAffine>,
{
    /// Without a table the shared bilinear one is used.
    pub fn new(
        source: S,
        interpolator: SpanInterpolatorLinear<T>,
        filter: Option<&'a ImageFilterLut>,
    ) -> Self {
        Self {
            base: SpanImageFilterBase::new(source, interpolator, filter),
            resample: SpanImageResampleAffine::new(),
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, S, SpanInterpolatorLinear<T>> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, S, SpanInterpolatorLinear<T>> {
        &mut self.base
    }

    pub fn resample(&self) -> &SpanImageResampleAffine {
        &self.resample
    }

    pub fn resample_mut(&mut self) -> &mut SpanImageResampleAffine {
        &mut self.resample
    }
}

impl<S, T, C> SpanGenerator for SpanImageResampleAffineGen<'_, S, T, C>
where
    S: ImageSource,
    T: Transformer + Borrow<TransAffine>,
    C: ColorFormat,
{
    type Color = C;

    fn prepare(&mut self) {
        let trans = Borrow::<TransAffine>::borrow(self.base.interpolator().transformer());
        self.resample.prepare(trans);
    }

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.base.begin(x, y, len);
        let offset = (self.base.filter_dx_int(), self.base.filter_dy_int());
        let filter = self.base.filter();
        let fp = Footprint {
            rx: self.resample.rx(),
            ry: self.resample.ry(),
            rx_inv: self.resample.rx_inv(),
            ry_inv: self.resample.ry_inv(),
        };

        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let fg = resample_pixel(self.base.source_mut(), filter, cx, cy, offset, fp);
            *pixel = clamp_premultiplied(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// SpanImageResampleGen: resampling with a per-pixel scale
// ============================================================================

/// Resampler that sizes the footprint from the interpolator's local scale
/// at every pixel, for transforms whose scale varies across the span.
pub struct SpanImageResampleGen<'a, S, I, C = Rgba8> {
    base: SpanImageFilterBase<'a, S, I>,
    resample: SpanImageResample,
    _color: PhantomData<C>,
}

impl<'a, S: ImageSource, I: SpanInterpolator, C> SpanImageResampleGen<'a, S, I, C> {
    /// Without a table the shared bilinear one is used.
    pub fn new(source: S, interpolator: I, filter: Option<&'a ImageFilterLut>) -> Self {
        Self {
            base: SpanImageFilterBase::new(source, interpolator, filter),
            resample: SpanImageResample::new(),
            _color: PhantomData,
        }
    }

    pub fn base(&self) -> &SpanImageFilterBase<'a, S, I> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilterBase<'a, S, I> {
        &mut self.base
    }

    pub fn resample(&self) -> &SpanImageResample {
        &self.resample
    }

    pub fn resample_mut(&mut self) -> &mut SpanImageResample {
        &mut self.resample
    }
}

impl<S: ImageSource, I: SpanInterpolator, C: ColorFormat> SpanGenerator
    for SpanImageResampleGen<'_, S, I, C>
{
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        self.base.begin(x, y, len);
        let offset = (self.base.filter_dx_int(), self.base.filter_dy_int());
        let filter = self.base.filter();

        for pixel in span.iter_mut().take(len as usize) {
            let (cx, cy) = self.base.coordinates();
            let (sx, sy) = self.base.local_scale();
            let (rx, ry) = self.resample.adjust_scale(sx, sy);
            let fp = Footprint::from_radii(rx, ry);
            let fg = resample_pixel(self.base.source_mut(), filter, cx, cy, offset, fp);
            *pixel = clamp_premultiplied(fg);
            self.base.next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Gray8, OrderBgra, OrderRgb, OrderRgba};
    use crate::image_accessors::{
        ImageAccessor, ImageAccessorClone, ImageAccessorWrap, WrapModeRepeat,
    };
    use crate::image_filters::{
        ImageFilterBicubic, ImageFilterBilinear, ImageFilterHermite, ImageFilterSinc,
    };
    use crate::rendering_buffer::RowAccessor;

    fn uniform(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        px.iter().copied().cycle().take((w * h * 4) as usize).collect()
    }

    fn set_pixel(data: &mut [u8], width: u32, x: u32, y: u32, rgba: [u8; 4]) {
        let off = ((y * width + x) * 4) as usize;
        data[off..off + 4].copy_from_slice(&rgba);
    }

    /// Opaque columns alternating black (even) and white (odd).
    fn stripes(w: u32, h: u32) -> Vec<u8> {
        let mut data = vec![0u8; (w * h * 4) as usize];
        for y in 0..h {
            for x in 0..w {
                let v = if x % 2 == 1 { 255 } else { 0 };
                set_pixel(&mut data, w, x, y, [v, v, v, 255]);
            }
        }
        data
    }

    /// 8x8: transparent left half, opaque white right half, one red pixel
    /// next to the edge.
    fn hard_edge() -> Vec<u8> {
        let mut data = uniform(8, 8, [0, 0, 0, 0]);
        for y in 0..8 {
            for x in 4..8 {
                set_pixel(&mut data, 8, x, y, [255, 255, 255, 255]);
            }
        }
        set_pixel(&mut data, 8, 3, 3, [255, 0, 0, 255]);
        data
    }

    fn rbuf(data: &[u8], w: u32, h: u32) -> RowAccessor<'_> {
        RowAccessor::new(data, w, h, (w * 4) as i32).unwrap()
    }

    fn identity() -> SpanInterpolatorLinear {
        SpanInterpolatorLinear::new(TransAffine::new())
    }

    fn assert_premultiplied(span: &[Rgba8]) {
        for c in span {
            assert!(c.r <= c.a && c.g <= c.a && c.b <= c.a, "{:?}", c);
        }
    }

    // -- Nearest neighbor --

    #[test]
    fn test_nn_identity() {
        let mut data = uniform(4, 4, [0, 0, 0, 0]);
        set_pixel(&mut data, 4, 0, 0, [10, 20, 30, 40]);
        set_pixel(&mut data, 4, 1, 0, [50, 60, 70, 80]);
        set_pixel(&mut data, 4, 2, 0, [90, 100, 110, 120]);

        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 4, 4));
        let mut sg: SpanImageFilterNn<_, _> = SpanImageFilterNn::new(acc, identity());
        let mut span = [Rgba8::default(); 3];
        sg.prepare();
        sg.generate(&mut span, 0, 0, 3);
        assert_eq!(span[0], Rgba8::new(10, 20, 30, 40));
        assert_eq!(span[1].r, 50);
        assert_eq!(span[2].r, 90);
    }

    #[test]
    fn test_nn_with_translation() {
        let mut data = uniform(4, 4, [0, 0, 0, 0]);
        set_pixel(&mut data, 4, 2, 2, [77, 88, 99, 255]);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 4, 4));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_translation(2.0, 2.0));
        let mut sg: SpanImageFilterNn<_, _> = SpanImageFilterNn::new(acc, interp);
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(77, 88, 99, 255));
    }

    #[test]
    fn test_nn_outside_plain_accessor_is_transparent() {
        let data = uniform(2, 2, [200, 200, 200, 255]);
        let acc = ImageAccessor::<OrderRgba>::new(rbuf(&data, 2, 2));
        let mut sg: SpanImageFilterNn<_, _> = SpanImageFilterNn::new(acc, identity());
        let mut span = [Rgba8::new(1, 2, 3, 4); 2];
        sg.generate(&mut span, -5, 0, 2);
        assert_eq!(span[0], Rgba8::transparent());
        assert_eq!(span[1], Rgba8::transparent());
    }

    #[test]
    fn test_nn_decodes_source_order() {
        let data = uniform(2, 2, [30, 20, 10, 255]);
        let acc = ImageAccessorClone::<OrderBgra>::new(rbuf(&data, 2, 2));
        let mut sg: SpanImageFilterNn<_, _> = SpanImageFilterNn::new(acc, identity());
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(10, 20, 30, 255));
    }

    #[test]
    fn test_nn_rgb_source_into_gray_span() {
        let data = vec![90u8; 2 * 2 * 3];
        let rb = RowAccessor::new(&data, 2, 2, 6).unwrap();
        let acc = ImageAccessorClone::<OrderRgb>::new(rb);
        let mut sg: SpanImageFilterNn<_, _, Gray8> = SpanImageFilterNn::new(acc, identity());
        let mut span = [Gray8::default(); 2];
        sg.generate(&mut span, 0, 0, 2);
        assert_eq!(span[0], Gray8::new(90, 255));
    }

    #[test]
    fn test_nn_uniform_is_exact() {
        let data = uniform(4, 4, [40, 50, 60, 70]);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 4, 4));
        let mut mtx = TransAffine::new_rotation(0.7);
        mtx.multiply(&TransAffine::new_scaling(0.3, 2.5));
        let interp = SpanInterpolatorLinear::new(mtx);
        let mut sg: SpanImageFilterNn<_, _> = SpanImageFilterNn::new(acc, interp);
        let mut span = [Rgba8::default(); 9];
        for y in -3..3 {
            sg.generate(&mut span, -4, y, 9);
            assert!(span.iter().all(|&c| c == Rgba8::new(40, 50, 60, 70)));
        }
    }

    // -- Bilinear --

    #[test]
    fn test_bilinear_uniform_is_exact() {
        let data = uniform(4, 4, [100, 100, 100, 255]);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 4, 4));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_rotation(0.3));
        let mut sg: SpanImageFilterBilinear<_, _> = SpanImageFilterBilinear::new(acc, interp);
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 0, 1, 4);
        for c in span {
            assert_eq!(c, Rgba8::new(100, 100, 100, 255));
        }
    }

    #[test]
    fn test_bilinear_half_pixel_blend() {
        let mut data = uniform(2, 1, [0, 0, 0, 255]);
        set_pixel(&mut data, 2, 1, 0, [200, 200, 200, 255]);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 2, 1));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_translation(0.5, 0.0));
        let mut sg: SpanImageFilterBilinear<_, _> = SpanImageFilterBilinear::new(acc, interp);
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(100, 100, 100, 255));
    }

    // -- Bilinear clip --

    #[test]
    fn test_bilinear_clip_far_outside_is_background() {
        let data = uniform(4, 4, [255, 255, 255, 255]);
        let acc = ImageAccessor::<OrderRgba>::new(rbuf(&data, 4, 4));
        let bg = Rgba8::new(55, 66, 77, 88);
        let mut sg = SpanImageFilterBilinearClip::new(acc, bg, identity());
        let mut span = [Rgba8::default(); 2];
        sg.generate(&mut span, -10, -10, 2);
        assert_eq!(span, [bg, bg]);
    }

    #[test]
    fn test_bilinear_clip_edge_blends_with_background() {
        let data = uniform(1, 1, [255, 255, 255, 255]);
        let acc = ImageAccessor::<OrderRgba>::new(rbuf(&data, 1, 1));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_translation(-0.5, -0.5));
        let mut sg = SpanImageFilterBilinearClip::new(acc, Rgba8::transparent(), interp);
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(64, 64, 64, 64));

        let mut sg2 = SpanImageFilterBilinearClip::new(
            ImageAccessor::<OrderRgba>::new(rbuf(&data, 1, 1)),
            Rgba8::transparent(),
            identity(),
        );
        sg2.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Rgba8::new(255, 255, 255, 255));
    }

    #[test]
    fn test_bilinear_clip_background_setter() {
        let data = uniform(1, 1, [0, 0, 0, 0]);
        let acc = ImageAccessor::<OrderRgba>::new(rbuf(&data, 1, 1));
        let mut sg = SpanImageFilterBilinearClip::new(acc, Rgba8::transparent(), identity());
        sg.set_background_color(Rgba8::new(10, 20, 30, 40));
        assert_eq!(sg.background_color().r, 10);
    }

    // -- Table-driven filters --

    #[test]
    fn test_2x2_uniform() {
        let data = uniform(4, 4, [200, 200, 200, 255]);
        let lut = ImageFilterLut::new(&ImageFilterHermite, true);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 4, 4));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_translation(0.3, 0.7));
        let mut sg: SpanImageFilter2x2<_, _> = SpanImageFilter2x2::new(acc, interp, Some(&lut));
        let mut span = [Rgba8::default(); 3];
        sg.generate(&mut span, 1, 1, 3);
        for c in span {
            assert!((c.r as i32 - 200).abs() <= 1, "{:?}", c);
            assert!(c.a >= 254);
        }
    }

    #[test]
    fn test_gen_uniform() {
        let data = uniform(6, 6, [150, 120, 90, 255]);
        let lut = ImageFilterLut::new(&ImageFilterSinc::lanczos(3.0), true);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 6, 6));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_translation(0.25, 0.5));
        let mut sg: SpanImageFilterGen<_, _> = SpanImageFilterGen::new(acc, interp, Some(&lut));
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 1, 2, 4);
        for c in span {
            assert!((c.r as i32 - 150).abs() <= 1, "{:?}", c);
            assert!((c.b as i32 - 90).abs() <= 1, "{:?}", c);
        }
    }

    #[test]
    fn test_gen_missing_table_uses_bilinear() {
        let data = uniform(4, 4, [80, 80, 80, 255]);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 4, 4));
        let mut sg: SpanImageFilterGen<_, _> = SpanImageFilterGen::new(acc, identity(), None);
        assert_eq!(sg.base().filter().diameter(), 2);
        let mut span = [Rgba8::default(); 1];
        sg.generate(&mut span, 1, 1, 1);
        assert!((span[0].r as i32 - 80).abs() <= 1);
    }

    #[test]
    fn test_gen_sharp_kernel_stays_premultiplied() {
        let data = hard_edge();
        let lut = ImageFilterLut::new(&ImageFilterSinc::new(4.0), true);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 8, 8));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_translation(0.4, 0.1));
        let mut sg: SpanImageFilterGen<_, _> = SpanImageFilterGen::new(acc, interp, Some(&lut));
        let mut span = [Rgba8::default(); 8];
        for y in 0..8 {
            sg.generate(&mut span, 0, y, 8);
            assert_premultiplied(&span);
        }
    }

    // -- Resampling --

    #[test]
    fn test_resample_affine_uniform_under_minification() {
        let data = uniform(16, 16, [120, 130, 140, 255]);
        let lut = ImageFilterLut::new(&ImageFilterBilinear, true);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 16, 16));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(3.0, 3.0));
        let mut sg: SpanImageResampleAffineGen<_> =
            SpanImageResampleAffineGen::new(acc, interp, Some(&lut));
        sg.prepare();
        assert_eq!(sg.resample().rx(), 768);
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 0, 1, 4);
        for c in span {
            assert!((c.r as i32 - 120).abs() <= 1, "{:?}", c);
            assert!((c.b as i32 - 140).abs() <= 1, "{:?}", c);
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn test_resample_affine_widens_footprint() {
        let data = stripes(16, 4);
        let acc = ImageAccessorWrap::<OrderRgba, WrapModeRepeat, WrapModeRepeat>::new(rbuf(
            &data, 16, 4,
        ));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(2.0, 2.0));
        let mut sg: SpanImageResampleAffineGen<_> =
            SpanImageResampleAffineGen::new(acc, interp, None);
        sg.prepare();
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 1, 0, 4);
        for c in span {
            assert!((100..=155).contains(&c.r), "{:?}", c);
        }

        // Without widening, every sample lands on a single column.
        let acc = ImageAccessorWrap::<OrderRgba, WrapModeRepeat, WrapModeRepeat>::new(rbuf(
            &data, 16, 4,
        ));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(2.0, 2.0));
        let mut nn: SpanImageFilterNn<_, _> = SpanImageFilterNn::new(acc, interp);
        nn.generate(&mut span, 1, 0, 4);
        assert!(span.iter().all(|c| c.r == 255));
    }

    #[test]
    fn test_resample_gen_follows_local_scale() {
        let data = stripes(16, 4);
        let acc = ImageAccessorWrap::<OrderRgba, WrapModeRepeat, WrapModeRepeat>::new(rbuf(
            &data, 16, 4,
        ));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(2.0, 2.0));
        let mut sg: SpanImageResampleGen<_, _> = SpanImageResampleGen::new(acc, interp, None);
        sg.prepare();
        let mut span = [Rgba8::default(); 4];
        sg.generate(&mut span, 1, 0, 4);
        for c in span {
            assert!((100..=155).contains(&c.r), "{:?}", c);
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn test_resample_sharp_kernel_stays_premultiplied() {
        let data = hard_edge();
        let lut = ImageFilterLut::new(&ImageFilterSinc::lanczos(3.0), true);
        let mut span = [Rgba8::default(); 8];

        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 8, 8));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(1.5, 1.5));
        let mut affine: SpanImageResampleAffineGen<_> =
            SpanImageResampleAffineGen::new(acc, interp, Some(&lut));
        affine.prepare();
        for y in 0..6 {
            affine.generate(&mut span, 0, y, 8);
            assert_premultiplied(&span);
        }

        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 8, 8));
        let interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(0.8, 1.7));
        let mut general: SpanImageResampleGen<_, _> =
            SpanImageResampleGen::new(acc, interp, Some(&lut));
        general.prepare();
        for y in 0..6 {
            general.generate(&mut span, 0, y, 8);
            assert_premultiplied(&span);
        }
    }

    #[test]
    fn test_resample_gen_uniform_at_unit_scale() {
        let data = uniform(8, 8, [60, 70, 80, 200]);
        let lut = ImageFilterLut::new(&ImageFilterBicubic, true);
        let acc = ImageAccessorClone::<OrderRgba>::new(rbuf(&data, 8, 8));
        let mut sg: SpanImageResampleGen<_, _> =
            SpanImageResampleGen::new(acc, identity(), Some(&lut));
        let mut span = [Rgba8::default(); 3];
        sg.generate(&mut span, 2, 2, 3);
        for c in span {
            assert!((c.g as i32 - 70).abs() <= 1, "{:?}", c);
            assert!((c.a as i32 - 200).abs() <= 1, "{:?}", c);
        }
    }
}
