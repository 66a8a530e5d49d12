//! Linear span interpolator.
//!
//! Transforms only the ends of a span and walks the fixed-point source
//! coordinates between them with DDAs. Exact for affine transforms; a
//! linear approximation for anything else.

use crate::basics::iround;
use crate::dda_line::Dda2LineInterpolator;
use crate::trans_affine::TransAffine;

/// Default subpixel precision of every interpolator.
pub const SUBPIXEL_SHIFT: u32 = 8;
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;

/// Largest magnitude of a fixed-point coordinate an interpolator emits.
/// Leaves headroom for the offsets generators add before sampling.
pub const MAX_SUBPIXEL_COORD: i32 = 1 << 29;

/// Round a transformed coordinate into `scale` fixed point, saturating at
/// `MAX_SUBPIXEL_COORD`. NaN maps to 0.
#[inline]
pub(crate) fn to_fixed(v: f64, scale: i32) -> i32 {
    let lim = MAX_SUBPIXEL_COORD as f64;
    let v = v * scale as f64;
    if v.is_nan() {
        0
    } else {
        iround(v.clamp(-lim, lim))
    }
}

// ============================================================================
// Transformer trait
// ============================================================================

/// Forward mapping from destination space into source space.
pub trait Transformer {
    fn transform(&self, x: f64, y: f64) -> (f64, f64);
}

impl Transformer for TransAffine {
    #[inline]
    fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        TransAffine::transform(self, x, y)
    }
}

impl<T: Transformer + ?Sized> Transformer for &T {
    #[inline]
    fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        (**self).transform(x, y)
    }
}

/// Local scale of `trans` at `(x, y)`: the source-space length of the
/// destination unit vectors `(1, 0)` and `(0, 1)`, in units of `scale`.
///
/// Values above `scale` mean the transform minifies along that axis.
pub fn local_scale_at<T: Transformer + ?Sized>(trans: &T, x: f64, y: f64, scale: i32) -> (i32, i32) {
    let (x0, y0) = trans.transform(x, y);
    let (x1, y1) = trans.transform(x + 1.0, y);
    let (x2, y2) = trans.transform(x, y + 1.0);
    let sx = ((x1 - x0) * (x1 - x0) + (y1 - y0) * (y1 - y0)).sqrt();
    let sy = ((x2 - x0) * (x2 - x0) + (y2 - y0) * (y2 - y0)).sqrt();
    (to_fixed(sx, scale), to_fixed(sy, scale))
}

// ============================================================================
// SpanInterpolator trait
// ============================================================================

/// Maps destination pixels of one span to fixed-point source coordinates.
///
/// `begin` seeds a span, `next` advances one destination pixel and
/// `coordinates` reads the current position in subpixel units. The
/// interpolator never fails; downstream stages bounds-check what it
/// produces.
pub trait SpanInterpolator {
    const SUBPIXEL_SHIFT: u32;

    #[inline]
    fn subpixel_shift(&self) -> u32 {
        Self::SUBPIXEL_SHIFT
    }

    #[inline]
    fn subpixel_scale(&self) -> i32 {
        1 << Self::SUBPIXEL_SHIFT
    }

    fn begin(&mut self, x: f64, y: f64, len: u32);

    /// Re-seed so that `len` more `next` calls land on the transformed
    /// `(xe, ye)`.
    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32);

    fn next(&mut self);

    fn coordinates(&self) -> (i32, i32);

    /// Source pixels covered by one destination pixel along each axis,
    /// in subpixel units. Consumed by the general resampler.
    fn local_scale(&self) -> (i32, i32);
}

impl<I: SpanInterpolator + ?Sized> SpanInterpolator for &mut I {
    const SUBPIXEL_SHIFT: u32 = I::SUBPIXEL_SHIFT;

    fn begin(&mut self, x: f64, y: f64, len: u32) {
        (**self).begin(x, y, len)
    }
    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        (**self).resynchronize(xe, ye, len)
    }
    fn next(&mut self) {
        (**self).next()
    }
    fn coordinates(&self) -> (i32, i32) {
        (**self).coordinates()
    }
    fn local_scale(&self) -> (i32, i32) {
        (**self).local_scale()
    }
}

// ============================================================================
// SpanInterpolatorLinear
// ============================================================================

/// Linear span interpolator.
///
/// Position and local scale are both evaluated at the span ends and
/// stepped per pixel with `Dda2LineInterpolator`.
#[derive(Debug, Clone)]
pub struct SpanInterpolatorLinear<T = TransAffine, const SHIFT: u32 = SUBPIXEL_SHIFT> {
    trans: T,
    li_x: Dda2LineInterpolator,
    li_y: Dda2LineInterpolator,
    scale_x: Dda2LineInterpolator,
    scale_y: Dda2LineInterpolator,
}

impl<T: Transformer> SpanInterpolatorLinear<T> {
    /// Interpolator at the default precision of `SUBPIXEL_SHIFT` bits.
    pub fn new(trans: T) -> Self {
        Self::with_shift(trans)
    }

    pub fn new_begin(trans: T, x: f64, y: f64, len: u32) -> Self {
        Self::with_shift_begin(trans, x, y, len)
    }
}

impl<T: Transformer, const SHIFT: u32> SpanInterpolatorLinear<T, SHIFT> {
    const SCALE: i32 = 1 << SHIFT;

    /// Interpolator at `SHIFT` bits of precision, e.g.
    /// `SpanInterpolatorLinear::<_, 4>::with_shift(m)`.
    pub fn with_shift(trans: T) -> Self {
        let unit = Dda2LineInterpolator::new(Self::SCALE, Self::SCALE, 1);
        Self {
            trans,
            li_x: Dda2LineInterpolator::new(0, 0, 1),
            li_y: Dda2LineInterpolator::new(0, 0, 1),
            scale_x: unit,
            scale_y: unit,
        }
    }

    pub fn with_shift_begin(trans: T, x: f64, y: f64, len: u32) -> Self {
        let mut s = Self::with_shift(trans);
        s.begin(x, y, len);
        s
    }

    pub fn transformer(&self) -> &T {
        &self.trans
    }

    pub fn set_transformer(&mut self, trans: T) {
        self.trans = trans;
    }

    #[inline]
    fn to_subpixel(&self, x: f64, y: f64) -> (i32, i32) {
        let (tx, ty) = self.trans.transform(x, y);
        (to_fixed(tx, Self::SCALE), to_fixed(ty, Self::SCALE))
    }
}

impl<T: Transformer, const SHIFT: u32> SpanInterpolator for SpanInterpolatorLinear<T, SHIFT> {
    const SUBPIXEL_SHIFT: u32 = SHIFT;

    fn begin(&mut self, x: f64, y: f64, len: u32) {
        let (x1, y1) = self.to_subpixel(x, y);
        let (x2, y2) = self.to_subpixel(x + len as f64, y);
        self.li_x = Dda2LineInterpolator::new(x1, x2, len as i32);
        self.li_y = Dda2LineInterpolator::new(y1, y2, len as i32);

        let (sx1, sy1) = local_scale_at(&self.trans, x, y, Self::SCALE);
        let (sx2, sy2) = local_scale_at(&self.trans, x + len as f64, y, Self::SCALE);
        self.scale_x = Dda2LineInterpolator::new(sx1, sx2, len as i32);
        self.scale_y = Dda2LineInterpolator::new(sy1, sy2, len as i32);
    }

    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        let (x2, y2) = self.to_subpixel(xe, ye);
        self.li_x = Dda2LineInterpolator::new(self.li_x.y(), x2, len as i32);
        self.li_y = Dda2LineInterpolator::new(self.li_y.y(), y2, len as i32);

        let (sx2, sy2) = local_scale_at(&self.trans, xe, ye, Self::SCALE);
        self.scale_x = Dda2LineInterpolator::new(self.scale_x.y(), sx2, len as i32);
        self.scale_y = Dda2LineInterpolator::new(self.scale_y.y(), sy2, len as i32);
    }

    #[inline]
    fn next(&mut self) {
        self.li_x.inc();
        self.li_y.inc();
        self.scale_x.inc();
        self.scale_y.inc();
    }

    #[inline]
    fn coordinates(&self) -> (i32, i32) {
        (self.li_x.y(), self.li_y.y())
    }

    #[inline]
    fn local_scale(&self) -> (i32, i32) {
        (self.scale_x.y(), self.scale_y.y())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_start_is_scaled_input() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new());
        for &(x, y) in &[(0.0, 0.0), (10.0, 20.0), (-7.0, 3.0), (1000.0, 999.0)] {
            interp.begin(x, y, 16);
            assert_eq!(interp.coordinates(), ((x * 256.0) as i32, (y * 256.0) as i32));
        }
    }

    #[test]
    fn test_identity_steps_one_pixel() {
        let mut interp = SpanInterpolatorLinear::new_begin(TransAffine::new(), 5.0, 3.0, 10);
        for i in 0..10 {
            assert_eq!(interp.coordinates(), ((5 + i) * 256, 3 * 256));
            interp.next();
        }
        assert_eq!(interp.coordinates(), (15 * 256, 3 * 256));
    }

    #[test]
    fn test_scaling_transform() {
        let mut interp =
            SpanInterpolatorLinear::new_begin(TransAffine::new_scaling(2.0, 0.5), 1.0, 4.0, 4);
        assert_eq!(interp.coordinates(), (512, 512));
        interp.next();
        assert_eq!(interp.coordinates(), (1024, 512));
        assert_eq!(interp.local_scale(), (512, 128));
    }

    #[test]
    fn test_rotation_local_scale_is_unit() {
        let interp = SpanInterpolatorLinear::new_begin(
            TransAffine::new_rotation(0.3),
            0.0,
            0.0,
            8,
        );
        assert_eq!(interp.local_scale(), (256, 256));
    }

    #[test]
    fn test_resynchronize_reaches_new_end() {
        let mut interp = SpanInterpolatorLinear::new_begin(TransAffine::new(), 0.0, 0.0, 8);
        for _ in 0..4 {
            interp.next();
        }
        assert_eq!(interp.coordinates(), (4 * 256, 0));
        interp.resynchronize(12.0, 2.0, 4);
        for _ in 0..4 {
            interp.next();
        }
        assert_eq!(interp.coordinates(), (12 * 256, 2 * 256));
    }

    #[test]
    fn test_four_bit_variant() {
        let mut interp = SpanInterpolatorLinear::<_, 4>::with_shift(TransAffine::new());
        interp.begin(3.0, 2.0, 2);
        assert_eq!(interp.subpixel_shift(), 4);
        assert_eq!(interp.subpixel_scale(), 16);
        assert_eq!(interp.coordinates(), (48, 32));
    }

    #[test]
    fn test_far_out_span_saturates() {
        let mut interp = SpanInterpolatorLinear::new(TransAffine::new_scaling(1e4, 1.0));
        interp.begin(-1000.0, 0.0, 2000);
        assert_eq!(interp.coordinates().0, -MAX_SUBPIXEL_COORD);
        for _ in 0..2000 {
            interp.next();
        }
        assert_eq!(interp.coordinates().0, MAX_SUBPIXEL_COORD);

        interp.begin(f64::NAN, 0.0, 4);
        assert_eq!(interp.coordinates(), (0, 0));
    }

    #[test]
    fn test_borrowed_transformer() {
        let m = TransAffine::new_translation(0.5, 0.0);
        let mut interp = SpanInterpolatorLinear::new(&m);
        interp.begin(0.0, 0.0, 1);
        assert_eq!(interp.coordinates(), (128, 0));
    }
}
