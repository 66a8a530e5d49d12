//! Color values and component-order descriptors.
//!
//! Span generators never assume a channel layout. Source pixels are read
//! through a [`PixelOrder`] and written through a [`ColorFormat`], so one
//! filter implementation serves gray, RGB and RGBA data alike.
//!
//! - `Rgba`: f64 components in `[0, 1]`, premultiplied
//! - `Rgba8`: u8 components, premultiplied
//! - `Rgb8`: u8 components, no alpha channel
//! - `Gray8`: u8 value + alpha, premultiplied

use serde::{Deserialize, Serialize};

use crate::basics::uround;

pub const BASE_SHIFT: u32 = 8;
pub const BASE_SCALE: i32 = 1 << BASE_SHIFT;
pub const BASE_MASK: i32 = BASE_SCALE - 1;

// ============================================================================
// Component orders
// ============================================================================

/// Byte layout of one source pixel.
///
/// `A` is `None` for layouts without an alpha channel; such pixels decode
/// as opaque. Gray layouts map R, G and B onto the same byte.
pub trait PixelOrder {
    const PIX_WIDTH: usize;
    const R: usize;
    const G: usize;
    const B: usize;
    const A: Option<usize>;

    /// Decode one pixel into `[r, g, b, a]`.
    ///
    /// A slice shorter than `PIX_WIDTH` (an out-of-range fetch) decodes as
    /// transparent black.
    #[inline]
    fn rgba(p: &[u8]) -> [i32; 4] {
        if p.len() < Self::PIX_WIDTH {
            return [0; 4];
        }
        let a = match Self::A {
            Some(i) => p[i] as i32,
            None => BASE_MASK,
        };
        [p[Self::R] as i32, p[Self::G] as i32, p[Self::B] as i32, a]
    }

    /// Encode `[r, g, b, a]` into this layout. Only the first `PIX_WIDTH`
    /// bytes of the result are meaningful; gray layouts store luminance.
    fn encode(c: [u8; 4]) -> [u8; 4] {
        let mut out = [0u8; 4];
        if Self::R == Self::G && Self::G == Self::B {
            out[Self::R] = Gray8::luminance(c[0], c[1], c[2]);
        } else {
            out[Self::R] = c[0];
            out[Self::G] = c[1];
            out[Self::B] = c[2];
        }
        if let Some(a) = Self::A {
            out[a] = c[3];
        }
        out
    }
}

macro_rules! pixel_order {
    ($(#[$doc:meta])* $name:ident, $w:expr, $r:expr, $g:expr, $b:expr, $a:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl PixelOrder for $name {
            const PIX_WIDTH: usize = $w;
            const R: usize = $r;
            const G: usize = $g;
            const B: usize = $b;
            const A: Option<usize> = $a;
        }
    };
}

pixel_order!(/// R, G, B, A
    OrderRgba, 4, 0, 1, 2, Some(3));
pixel_order!(/// B, G, R, A
    OrderBgra, 4, 2, 1, 0, Some(3));
pixel_order!(/// A, R, G, B
    OrderArgb, 4, 1, 2, 3, Some(0));
pixel_order!(/// A, B, G, R
    OrderAbgr, 4, 3, 2, 1, Some(0));
pixel_order!(/// R, G, B without alpha
    OrderRgb, 3, 0, 1, 2, None);
pixel_order!(/// B, G, R without alpha
    OrderBgr, 3, 2, 1, 0, None);
pixel_order!(/// Single gray byte without alpha
    OrderGray, 1, 0, 0, 0, None);

// ============================================================================
// ColorFormat
// ============================================================================

/// The channel operations span stages need from an output color.
///
/// Implemented once per supported layout so converters pick their
/// behavior from the type, not from a runtime check.
pub trait ColorFormat: Copy + Default {
    /// `false` for layouts where alpha converters have nothing to act on.
    const HAS_ALPHA: bool;

    /// Color channels are stored multiplied by alpha, so each stays at or
    /// below it.
    const PREMULTIPLIED: bool;

    fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self;
    fn to_rgba8(&self) -> [u8; 4];

    /// Alpha on the 0..=255 scale; opaque for layouts without alpha.
    #[inline]
    fn alpha(&self) -> u8 {
        self.to_rgba8()[3]
    }

    /// No-op for layouts without alpha.
    fn set_alpha(&mut self, a: u8);

    /// `r + g + b`, in `0..=765`.
    #[inline]
    fn rgb_sum(&self) -> u32 {
        let [r, g, b, _] = self.to_rgba8();
        r as u32 + g as u32 + b as u32
    }

    /// Multiply alpha by `k` in `[0, 1]`. Premultiplied layouts scale their
    /// color channels by the same factor.
    fn scale_alpha(&mut self, k: f64) {
        let scale = |v: u8| (v as f64 * k + 0.5) as u8;
        let [r, g, b, a] = self.to_rgba8();
        if Self::PREMULTIPLIED {
            *self = Self::from_rgba8(scale(r), scale(g), scale(b), scale(a));
        } else {
            self.set_alpha(scale(a));
        }
    }

    /// Replace alpha. Premultiplied layouts clamp their color channels to
    /// the new value.
    fn replace_alpha(&mut self, a: u8) {
        if Self::PREMULTIPLIED {
            let [r, g, b, _] = self.to_rgba8();
            *self = Self::from_rgba8(r.min(a), g.min(a), b.min(a), a);
        } else {
            self.set_alpha(a);
        }
    }
}

/// Clamp accumulated channels into a legal premultiplied color.
///
/// Alpha is clamped to `0..=255` first, then each color channel to
/// `0..=alpha`.
#[inline]
pub fn clamp_premultiplied<C: ColorFormat>(v: [i32; 4]) -> C {
    let a = v[3].clamp(0, BASE_MASK);
    let r = v[0].clamp(0, a);
    let g = v[1].clamp(0, a);
    let b = v[2].clamp(0, a);
    C::from_rgba8(r as u8, g as u8, b as u8, a as u8)
}

// ============================================================================
// Rgba8 (8-bit per channel)
// ============================================================================

/// RGBA color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Channel-wise interpolation toward `c`; `k` in `[0, 1]`.
    pub fn gradient(&self, c: &Rgba8, k: f64) -> Rgba8 {
        let lerp = |p: u8, q: u8| -> u8 {
            let v = p as f64 + (q as f64 - p as f64) * k;
            uround(v.clamp(0.0, 255.0)) as u8
        };
        Rgba8::new(
            lerp(self.r, c.r),
            lerp(self.g, c.g),
            lerp(self.b, c.b),
            lerp(self.a, c.a),
        )
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(c: [u8; 4]) -> Self {
        Rgba8::new(c[0], c[1], c[2], c[3])
    }
}

impl ColorFormat for Rgba8 {
    const HAS_ALPHA: bool = true;
    const PREMULTIPLIED: bool = true;

    #[inline]
    fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba8::new(r, g, b, a)
    }

    #[inline]
    fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    fn alpha(&self) -> u8 {
        self.a
    }

    #[inline]
    fn set_alpha(&mut self, a: u8) {
        self.a = a;
    }
}

// ============================================================================
// Rgb8 (no alpha channel)
// ============================================================================

/// RGB color with u8 components and no alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl ColorFormat for Rgb8 {
    const HAS_ALPHA: bool = false;
    const PREMULTIPLIED: bool = false;

    #[inline]
    fn from_rgba8(r: u8, g: u8, b: u8, _a: u8) -> Self {
        Rgb8::new(r, g, b)
    }

    #[inline]
    fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    #[inline]
    fn set_alpha(&mut self, _a: u8) {}
}

// ============================================================================
// Gray8
// ============================================================================

/// Grayscale color with u8 value and alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Gray8 {
    pub v: u8,
    pub a: u8,
}

impl Gray8 {
    pub const fn new(v: u8, a: u8) -> Self {
        Self { v, a }
    }

    pub const fn new_opaque(v: u8) -> Self {
        Self::new(v, 255)
    }

    /// ITU-R BT.709 luminance with integer coefficients.
    #[inline]
    pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
        ((55u32 * r as u32 + 184u32 * g as u32 + 18u32 * b as u32) >> 8) as u8
    }
}

impl ColorFormat for Gray8 {
    const HAS_ALPHA: bool = true;
    const PREMULTIPLIED: bool = true;

    #[inline]
    fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        // Gray sources decode with r == g == b; keep their value untouched.
        let v = if r == g && g == b {
            r
        } else {
            Gray8::luminance(r, g, b)
        };
        Gray8::new(v, a)
    }

    #[inline]
    fn to_rgba8(&self) -> [u8; 4] {
        [self.v, self.v, self.v, self.a]
    }

    #[inline]
    fn alpha(&self) -> u8 {
        self.a
    }

    #[inline]
    fn set_alpha(&mut self, a: u8) {
        self.a = a;
    }

    #[inline]
    fn rgb_sum(&self) -> u32 {
        self.v as u32 * 3
    }
}

// ============================================================================
// Rgba (f64 precision color)
// ============================================================================

/// RGBA color with f64 components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    fn to_u8(v: f64) -> u8 {
        uround(v.clamp(0.0, 1.0) * BASE_MASK as f64) as u8
    }
}

impl ColorFormat for Rgba {
    const HAS_ALPHA: bool = true;
    const PREMULTIPLIED: bool = true;

    fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let m = BASE_MASK as f64;
        Rgba::new(r as f64 / m, g as f64 / m, b as f64 / m, a as f64 / m)
    }

    fn to_rgba8(&self) -> [u8; 4] {
        [
            Self::to_u8(self.r),
            Self::to_u8(self.g),
            Self::to_u8(self.b),
            Self::to_u8(self.a),
        ]
    }

    fn set_alpha(&mut self, a: u8) {
        self.a = a as f64 / BASE_MASK as f64;
    }

    fn scale_alpha(&mut self, k: f64) {
        self.r *= k;
        self.g *= k;
        self.b *= k;
        self.a *= k;
    }

    fn replace_alpha(&mut self, a: u8) {
        self.set_alpha(a);
        self.r = self.r.min(self.a);
        self.g = self.g.min(self.a);
        self.b = self.b.min(self.a);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_decode_channels() {
        let p = [10u8, 20, 30, 40];
        assert_eq!(OrderRgba::rgba(&p), [10, 20, 30, 40]);
        assert_eq!(OrderBgra::rgba(&p), [30, 20, 10, 40]);
        assert_eq!(OrderArgb::rgba(&p), [20, 30, 40, 10]);
        assert_eq!(OrderAbgr::rgba(&p), [40, 30, 20, 10]);
        assert_eq!(OrderRgb::rgba(&p[..3]), [10, 20, 30, 255]);
        assert_eq!(OrderBgr::rgba(&p[..3]), [30, 20, 10, 255]);
        assert_eq!(OrderGray::rgba(&p[..1]), [10, 10, 10, 255]);
    }

    #[test]
    fn test_encode_matches_decode() {
        let c = [10u8, 20, 30, 40];
        assert_eq!(OrderBgra::rgba(&OrderBgra::encode(c)), [10, 20, 30, 40]);
        assert_eq!(OrderArgb::encode(c), [40, 10, 20, 30]);
        assert_eq!(OrderRgb::rgba(&OrderRgb::encode(c)[..3]), [10, 20, 30, 255]);
        assert_eq!(OrderGray::encode([90, 90, 90, 255])[0], 90);
    }

    #[test]
    fn test_short_slice_is_transparent() {
        assert_eq!(OrderRgba::rgba(&[]), [0; 4]);
        assert_eq!(OrderRgba::rgba(&[1, 2, 3]), [0; 4]);
        assert_eq!(OrderGray::rgba(&[]), [0; 4]);
    }

    #[test]
    fn test_clamp_premultiplied() {
        let c: Rgba8 = clamp_premultiplied([300, -5, 120, 100]);
        assert_eq!(c, Rgba8::new(100, 0, 100, 100));
        let c: Rgba8 = clamp_premultiplied([10, 20, 30, 400]);
        assert_eq!(c, Rgba8::new(10, 20, 30, 255));
    }

    #[test]
    fn test_rgb8_ignores_alpha() {
        let mut c = Rgb8::from_rgba8(1, 2, 3, 4);
        c.set_alpha(0);
        assert_eq!(c.to_rgba8(), [1, 2, 3, 255]);
        assert!(!Rgb8::HAS_ALPHA);
    }

    #[test]
    fn test_gray8_keeps_gray_value() {
        let g = Gray8::from_rgba8(77, 77, 77, 200);
        assert_eq!(g, Gray8::new(77, 200));
        assert_eq!(g.rgb_sum(), 231);
        let g = Gray8::from_rgba8(255, 0, 0, 255);
        assert_eq!(g.v, Gray8::luminance(255, 0, 0));
    }

    #[test]
    fn test_rgba_f64_round_trips_alpha() {
        let mut c = Rgba::new(1.0, 0.5, 0.0, 1.0);
        c.set_alpha(51);
        assert!((c.a - 0.2).abs() < 1e-9);
        assert_eq!(c.to_rgba8(), [255, 128, 0, 51]);
    }

    #[test]
    fn test_alpha_edits_keep_premultiplied_invariant() {
        let mut c = Rgba8::new_opaque(255, 100, 0);
        c.scale_alpha(0.5);
        assert_eq!(c, Rgba8::new(128, 50, 0, 128));
        c.replace_alpha(60);
        assert_eq!(c, Rgba8::new(60, 50, 0, 60));

        let mut g = Gray8::new_opaque(200);
        g.replace_alpha(20);
        assert_eq!(g, Gray8::new(20, 20));

        let mut f = Rgba::new(1.0, 0.25, 0.0, 1.0);
        f.scale_alpha(0.5);
        assert_eq!(f, Rgba::new(0.5, 0.125, 0.0, 0.5));
        f.replace_alpha(51);
        assert!((f.r - 0.2).abs() < 1e-9 && f.g == 0.125);

        let mut rgb = Rgb8::new(9, 8, 7);
        rgb.scale_alpha(0.0);
        rgb.replace_alpha(0);
        assert_eq!(rgb, Rgb8::new(9, 8, 7));
    }

    #[test]
    fn test_rgba8_gradient_endpoints() {
        let black = Rgba8::new_opaque(0, 0, 0);
        let white = Rgba8::new_opaque(255, 255, 255);
        assert_eq!(black.gradient(&white, 0.0), black);
        assert_eq!(black.gradient(&white, 1.0), white);
        assert_eq!(black.gradient(&white, 0.5).r, 128);
    }
}
