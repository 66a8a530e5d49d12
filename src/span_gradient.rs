//! Gradient shapes, wrap adaptors and the gradient span generator.
//!
//! A shape function turns a source-space offset (in gradient subpixels)
//! into a scalar distance. [`SpanGradient`] rescales that distance from
//! `[d1, d2]` onto the ramp indices of a [`ColorFunction`].

use crate::basics::{iround, isqrt_round, uround};
use crate::error::SpanError;
use crate::gradient_lut::ColorFunction;
use crate::span_generator::SpanGenerator;
use crate::span_interpolator_linear::SpanInterpolator;

// ============================================================================
// Constants
// ============================================================================

pub const GRADIENT_SUBPIXEL_SHIFT: u32 = 4;
pub const GRADIENT_SUBPIXEL_SCALE: i32 = 1 << GRADIENT_SUBPIXEL_SHIFT;
pub const GRADIENT_SUBPIXEL_MASK: i32 = GRADIENT_SUBPIXEL_SCALE - 1;

/// Convert an interpolator coordinate with `shift` fractional bits to
/// gradient subpixels.
#[inline]
fn to_gradient_subpixel(v: i32, shift: u32) -> i32 {
    if shift >= GRADIENT_SUBPIXEL_SHIFT {
        v >> (shift - GRADIENT_SUBPIXEL_SHIFT)
    } else {
        v << (GRADIENT_SUBPIXEL_SHIFT - shift)
    }
}

// ============================================================================
// GradientFunction trait
// ============================================================================

/// Maps an offset `(x, y)` to a scalar distance. `d` is the gradient
/// extent, used by shapes that scale with it (conic, XY) and by the wrap
/// adaptors.
pub trait GradientFunction {
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32;
}

impl<G: GradientFunction + ?Sized> GradientFunction for &G {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        (**self).calculate(x, y, d)
    }
}

impl<G: GradientFunction + ?Sized> GradientFunction for Box<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        (**self).calculate(x, y, d)
    }
}

// ============================================================================
// Stateless shapes
// ============================================================================

/// Linear along X.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientX;

impl GradientFunction for GradientX {
    #[inline]
    fn calculate(&self, x: i32, _y: i32, _d: i32) -> i32 {
        x
    }
}

/// Linear along Y.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientY;

impl GradientFunction for GradientY {
    #[inline]
    fn calculate(&self, _x: i32, y: i32, _d: i32) -> i32 {
        y
    }
}

/// Circle around the origin, integer square root rounded to nearest.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRadial;

impl GradientFunction for GradientRadial {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let (x, y) = (x as i64, y as i64);
        isqrt_round((x * x + y * y) as u64) as i32
    }
}

/// Circle around the origin, computed in floating point.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRadialD;

impl GradientFunction for GradientRadialD {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        uround((x as f64).hypot(y as f64)) as i32
    }
}

/// `max(|x|, |y|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientDiamond;

impl GradientFunction for GradientDiamond {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        x.abs().max(y.abs())
    }
}

/// `|x| * |y| / d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientXY;

impl GradientFunction for GradientXY {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        if d == 0 {
            return 0;
        }
        let v = (x as i64).abs() * (y as i64).abs() / d as i64;
        v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// `sqrt(|x| * |y|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientSqrtXY;

impl GradientFunction for GradientSqrtXY {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let v = isqrt_round((x as i64).unsigned_abs() * (y as i64).unsigned_abs());
        v.min(i32::MAX as u64) as i32
    }
}

/// Angle from the positive X axis, `|atan2(y, x)| * d / pi`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientConic;

impl GradientFunction for GradientConic {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        uround((y as f64).atan2(x as f64).abs() * d as f64 / std::f64::consts::PI) as i32
    }
}

// ============================================================================
// GradientRadialFocus
// ============================================================================

/// Circle of radius `r` seen from a focal point inside it.
///
/// The result is the distance from the focus to the point, scaled so the
/// focus maps to 0 and the circle boundary to `r` along every ray. A focus
/// on or outside the boundary is pulled back along its own direction to one
/// gradient subpixel inside it; results never go below 0.
#[derive(Debug, Clone, Copy)]
pub struct GradientRadialFocus {
    r: i32,
    fx: i32,
    fy: i32,
    r2: f64,
    mul: f64,
}

impl GradientRadialFocus {
    /// Radius and focus in pixels.
    pub fn new(r: f64, fx: f64, fy: f64) -> Self {
        let mut s = Self {
            r: 0,
            fx: 0,
            fy: 0,
            r2: 0.0,
            mul: 0.0,
        };
        s.init(r, fx, fy);
        s
    }

    pub fn init(&mut self, r: f64, fx: f64, fy: f64) {
        self.r = iround(r * GRADIENT_SUBPIXEL_SCALE as f64).max(1);
        self.fx = iround(fx * GRADIENT_SUBPIXEL_SCALE as f64);
        self.fy = iround(fy * GRADIENT_SUBPIXEL_SCALE as f64);
        self.update_values();
    }

    pub fn radius(&self) -> f64 {
        self.r as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus_x(&self) -> f64 {
        self.fx as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus_y(&self) -> f64 {
        self.fy as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    fn update_values(&mut self) {
        let r = self.r as f64;
        let dist = (self.fx as f64).hypot(self.fy as f64);
        if dist >= r {
            let k = (r - 1.0) / dist;
            let (fx, fy) = (self.fx, self.fy);
            self.fx = (self.fx as f64 * k).trunc() as i32;
            self.fy = (self.fy as f64 * k).trunc() as i32;
            log::warn!(
                "gradient focus ({}, {}) outside radius {}, clamped to ({}, {})",
                fx,
                fy,
                self.r,
                self.fx,
                self.fy
            );
        }
        self.r2 = r * r;
        let f2 = (self.fx as f64).powi(2) + (self.fy as f64).powi(2);
        self.mul = r / (self.r2 - f2);
    }
}

impl Default for GradientRadialFocus {
    fn default() -> Self {
        Self::new(100.0, 0.0, 0.0)
    }
}

impl GradientFunction for GradientRadialFocus {
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let fx = self.fx as f64;
        let fy = self.fy as f64;
        let dx = x as f64 - fx;
        let dy = y as f64 - fy;
        let d2 = dx * fy - dy * fx;
        let d3 = self.r2 * (dx * dx + dy * dy) - d2 * d2;
        iround((dx * fx + dy * fy + d3.abs().sqrt()) * self.mul).max(0)
    }
}

// ============================================================================
// Wrap adaptors
// ============================================================================

/// Wrap `i` into `[0, d)`. Returns 0 for `d <= 0`.
#[inline]
pub fn repeat_index(i: i32, d: i32) -> i32 {
    if d <= 0 {
        return 0;
    }
    ((i % d) + d) % d
}

/// Triangle wave of period `2d`: the value climbs from 0 to `d` and back.
#[inline]
pub fn reflect_index(i: i32, d: i32) -> i32 {
    if d <= 0 {
        return 0;
    }
    let d2 = d.saturating_mul(2);
    let r = ((i % d2) + d2) % d2;
    if r > d {
        d2 - r
    } else {
        r
    }
}

/// Repeats the wrapped shape every `d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRepeatAdaptor<G> {
    gradient: G,
}

impl<G: GradientFunction> GradientRepeatAdaptor<G> {
    pub fn new(gradient: G) -> Self {
        Self { gradient }
    }

    pub fn inner(&self) -> &G {
        &self.gradient
    }
}

impl<G: GradientFunction> GradientFunction for GradientRepeatAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        repeat_index(self.gradient.calculate(x, y, d), d)
    }
}

/// Mirrors the wrapped shape back and forth over `[0, d]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientReflectAdaptor<G> {
    gradient: G,
}

impl<G: GradientFunction> GradientReflectAdaptor<G> {
    pub fn new(gradient: G) -> Self {
        Self { gradient }
    }

    pub fn inner(&self) -> &G {
        &self.gradient
    }
}

impl<G: GradientFunction> GradientFunction for GradientReflectAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        reflect_index(self.gradient.calculate(x, y, d), d)
    }
}

// ============================================================================
// SpanGradient
// ============================================================================

/// Gradient span generator: interpolator, shape and color ramp.
///
/// Distances below `d1` take the first ramp color, distances at or past
/// `d2` the last one.
pub struct SpanGradient<'a, I, G, F> {
    interpolator: I,
    gradient_function: G,
    color_function: &'a F,
    d1: i32,
    d2: i32,
}

impl<'a, I: SpanInterpolator, G: GradientFunction, F: ColorFunction> SpanGradient<'a, I, G, F> {
    /// `d1` and `d2` are in pixels.
    pub fn new(
        interpolator: I,
        gradient_function: G,
        color_function: &'a F,
        d1: f64,
        d2: f64,
    ) -> Self {
        Self {
            interpolator,
            gradient_function,
            color_function,
            d1: iround(d1 * GRADIENT_SUBPIXEL_SCALE as f64),
            d2: iround(d2 * GRADIENT_SUBPIXEL_SCALE as f64),
        }
    }

    /// Like `new`, rejecting a range with `d2 <= d1`.
    pub fn try_new(
        interpolator: I,
        gradient_function: G,
        color_function: &'a F,
        d1: f64,
        d2: f64,
    ) -> Result<Self, SpanError> {
        if !(d1.is_finite() && d2.is_finite()) || d2 <= d1 {
            return Err(SpanError::InvalidDistanceRange { d1, d2 });
        }
        Ok(Self::new(interpolator, gradient_function, color_function, d1, d2))
    }

    pub fn interpolator(&self) -> &I {
        &self.interpolator
    }

    pub fn interpolator_mut(&mut self) -> &mut I {
        &mut self.interpolator
    }

    pub fn gradient_function(&self) -> &G {
        &self.gradient_function
    }

    pub fn set_gradient_function(&mut self, g: G) {
        self.gradient_function = g;
    }

    pub fn color_function(&self) -> &'a F {
        self.color_function
    }

    pub fn set_color_function(&mut self, f: &'a F) {
        self.color_function = f;
    }

    pub fn d1(&self) -> f64 {
        self.d1 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn d2(&self) -> f64 {
        self.d2 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn set_d1(&mut self, v: f64) {
        self.d1 = iround(v * GRADIENT_SUBPIXEL_SCALE as f64);
    }

    pub fn set_d2(&mut self, v: f64) {
        self.d2 = iround(v * GRADIENT_SUBPIXEL_SCALE as f64);
    }
}

impl<I, G, F> SpanGenerator for SpanGradient<'_, I, G, F>
where
    I: SpanInterpolator,
    G: GradientFunction,
    F: ColorFunction,
{
    type Color = F::Color;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [F::Color], x: i32, y: i32, len: u32) {
        let dd = (self.d2 as i64 - self.d1 as i64).max(1);
        let size = self.color_function.size().max(1) as i64;
        self.interpolator.begin(x as f64 + 0.5, y as f64 + 0.5, len);

        for pixel in span.iter_mut().take(len as usize) {
            let (ix, iy) = self.interpolator.coordinates();
            let d = self.gradient_function.calculate(
                to_gradient_subpixel(ix, I::SUBPIXEL_SHIFT),
                to_gradient_subpixel(iy, I::SUBPIXEL_SHIFT),
                self.d2,
            );
            let index = ((d as i64 - self.d1 as i64) * size / dd).clamp(0, size - 1);
            *pixel = self.color_function.color_at(index as usize);
            self.interpolator.next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
