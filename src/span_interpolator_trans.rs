//! Per-pixel transform span interpolator.
//!
//! Calls the transformer for every destination pixel instead of walking
//! between span ends, so perspective and other non-linear mappings stay
//! exact across the whole span.

use crate::span_interpolator_linear::{
    local_scale_at, to_fixed, SpanInterpolator, Transformer, SUBPIXEL_SHIFT,
};

// ============================================================================
// SpanInterpolatorTrans
// ============================================================================

/// Exact per-pixel interpolator.
///
/// Tracks the destination position in floating point and steps it by
/// `(dx, dy)` per pixel, `(1, 0)` after `begin`. `resynchronize` changes
/// the step so the span bends toward a new end point.
#[derive(Debug, Clone)]
pub struct SpanInterpolatorTrans<T, const SHIFT: u32 = SUBPIXEL_SHIFT> {
    trans: T,
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
    ix: i32,
    iy: i32,
    scale: (i32, i32),
}

impl<T: Transformer> SpanInterpolatorTrans<T> {
    pub fn new(trans: T) -> Self {
        Self::with_shift(trans)
    }

    pub fn new_begin(trans: T, x: f64, y: f64, len: u32) -> Self {
        Self::with_shift_begin(trans, x, y, len)
    }
}

impl<T: Transformer, const SHIFT: u32> SpanInterpolatorTrans<T, SHIFT> {
    const SCALE: i32 = 1 << SHIFT;

    pub fn with_shift(trans: T) -> Self {
        Self {
            trans,
            x: 0.0,
            y: 0.0,
            dx: 1.0,
            dy: 0.0,
            ix: 0,
            iy: 0,
            scale: (Self::SCALE, Self::SCALE),
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

    fn update(&mut self) {
        let (tx, ty) = self.trans.transform(self.x, self.y);
        self.ix = to_fixed(tx, Self::SCALE);
        self.iy = to_fixed(ty, Self::SCALE);
        self.scale = local_scale_at(&self.trans, self.x, self.y, Self::SCALE);
    }
}

impl<T: Transformer, const SHIFT: u32> SpanInterpolator for SpanInterpolatorTrans<T, SHIFT> {
    const SUBPIXEL_SHIFT: u32 = SHIFT;

    fn begin(&mut self, x: f64, y: f64, _len: u32) {
        self.x = x;
        self.y = y;
        self.dx = 1.0;
        self.dy = 0.0;
        self.update();
    }

    fn resynchronize(&mut self, xe: f64, ye: f64, len: u32) {
        let n = len.max(1) as f64;
        self.dx = (xe - self.x) / n;
        self.dy = (ye - self.y) / n;
    }

    #[inline]
    fn next(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
        self.update();
    }

    #[inline]
    fn coordinates(&self) -> (i32, i32) {
        (self.ix, self.iy)
    }

    #[inline]
    fn local_scale(&self) -> (i32, i32) {
        self.scale
    }
}

// ============================================================================
// Tests
// ============================================================================
