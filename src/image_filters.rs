//! Filter kernels and their fixed-point weight table.
//!
//! A kernel is sampled once at `IMAGE_SUBPIXEL_SCALE` nodes per source
//! pixel and quantized to `IMAGE_FILTER_SHIFT` bits. Generators then read
//! weights by tap index and fractional offset without touching floating
//! point.

use std::f64::consts::PI;

use once_cell::sync::Lazy;

use crate::basics::{iround, uceil};
use crate::error::SpanError;

// ============================================================================
// Constants
// ============================================================================

pub const IMAGE_FILTER_SHIFT: u32 = 14;
pub const IMAGE_FILTER_SCALE: i32 = 1 << IMAGE_FILTER_SHIFT;
pub const IMAGE_FILTER_MASK: i32 = IMAGE_FILTER_SCALE - 1;

pub const IMAGE_SUBPIXEL_SHIFT: u32 = 8;
pub const IMAGE_SUBPIXEL_SCALE: i32 = 1 << IMAGE_SUBPIXEL_SHIFT;
pub const IMAGE_SUBPIXEL_MASK: i32 = IMAGE_SUBPIXEL_SCALE - 1;

/// Largest kernel radius a table will be built for.
pub const MAX_FILTER_RADIUS: f64 = 16.0;

// ============================================================================
// ImageFilterFunction trait
// ============================================================================

/// A symmetric reconstruction kernel.
pub trait ImageFilterFunction {
    /// Support radius in source pixels.
    fn radius(&self) -> f64;
    /// Weight at distance `x` (`0 <= x <= radius`) from the center.
    fn calc_weight(&self, x: f64) -> f64;
}

impl<F: ImageFilterFunction + ?Sized> ImageFilterFunction for Box<F> {
    fn radius(&self) -> f64 {
        (**self).radius()
    }
    fn calc_weight(&self, x: f64) -> f64 {
        (**self).calc_weight(x)
    }
}

// ============================================================================
// ImageFilterLut: weight lookup table
// ============================================================================

/// Fixed-point weights of one kernel.
///
/// Laid out as `diameter` blocks of `IMAGE_SUBPIXEL_SCALE` entries; see
/// [`ImageFilterLut::weight`] for the addressing used by generators.
/// Immutable once built, so one table can back any number of generators.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFilterLut {
    radius: f64,
    diameter: u32,
    start: i32,
    weight_array: Vec<i16>,
}

static DEFAULT_BILINEAR: Lazy<ImageFilterLut> = Lazy::new(|| {
    log::debug!("building shared bilinear filter table");
    ImageFilterLut::new(&ImageFilterBilinear, true)
});

/// Shared normalized bilinear table, used by kernel-based generators that
/// were constructed without a table of their own.
pub fn default_bilinear_lut() -> &'static ImageFilterLut {
    &DEFAULT_BILINEAR
}

impl ImageFilterLut {
    /// Build the table for `filter`. With `normalize`, each fractional
    /// offset's weights sum to exactly `IMAGE_FILTER_SCALE`.
    ///
    /// The radius is clamped into `(0, MAX_FILTER_RADIUS]`; use
    /// [`ImageFilterLut::try_new`] to reject bad radii instead.
    pub fn new<F: ImageFilterFunction + ?Sized>(filter: &F, normalize: bool) -> Self {
        let mut r = filter.radius();
        if !r.is_finite() || r <= 0.0 {
            r = 1.0;
        }
        let r = r.min(MAX_FILTER_RADIUS);
        let diameter = uceil(r) * 2;
        let mut lut = Self {
            radius: r,
            diameter,
            start: -((diameter / 2) as i32 - 1),
            weight_array: vec![0; (diameter as usize) << IMAGE_SUBPIXEL_SHIFT],
        };

        let pivot = lut.pivot();
        for i in 0..pivot {
            let x = i as f64 / IMAGE_SUBPIXEL_SCALE as f64;
            let w = iround(filter.calc_weight(x) * IMAGE_FILTER_SCALE as f64) as i16;
            lut.weight_array[pivot + i] = w;
            lut.weight_array[pivot - i] = w;
        }
        lut.weight_array[0] = lut.weight_array[lut.weight_array.len() - 1];
        if normalize {
            lut.normalize();
        }
        log::debug!(
            "filter table built: radius {}, diameter {}, normalized {}",
            lut.radius,
            lut.diameter,
            normalize
        );
        lut
    }

    /// Like [`ImageFilterLut::new`], but rejects radii outside
    /// `(0, MAX_FILTER_RADIUS]`.
    pub fn try_new<F: ImageFilterFunction + ?Sized>(
        filter: &F,
        normalize: bool,
    ) -> Result<Self, SpanError> {
        let radius = filter.radius();
        if !radius.is_finite() || radius <= 0.0 || radius > MAX_FILTER_RADIUS {
            return Err(SpanError::InvalidFilterRadius {
                radius,
                max: MAX_FILTER_RADIUS,
            });
        }
        Ok(Self::new(filter, normalize))
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of taps per axis: `ceil(radius) * 2`.
    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    /// Offset of the first tap relative to the sample's integer pixel.
    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn weight_array(&self) -> &[i16] {
        &self.weight_array
    }

    /// Weight of tap `tap` (counted from `start`) for a sample whose
    /// fractional offset is `frac` subpixels.
    #[inline]
    pub fn weight(&self, tap: u32, frac: i32) -> i16 {
        let idx = ((tap as i32) << IMAGE_SUBPIXEL_SHIFT) + IMAGE_SUBPIXEL_MASK - frac;
        self.weight_array[idx as usize]
    }

    #[inline]
    fn pivot(&self) -> usize {
        (self.diameter as usize) << (IMAGE_SUBPIXEL_SHIFT - 1)
    }

    /// Redistribute rounding error so that, for every fractional offset,
    /// the weights of all taps sum to `IMAGE_FILTER_SCALE`.
    pub fn normalize(&mut self) {
        let scale = IMAGE_SUBPIXEL_SCALE as usize;
        let diameter = self.diameter as usize;
        let mut flip = true;

        for i in 0..scale {
            loop {
                let sum: i32 = (0..diameter)
                    .map(|j| self.weight_array[j * scale + i] as i32)
                    .sum();
                if sum == IMAGE_FILTER_SCALE {
                    break;
                }

                let k = IMAGE_FILTER_SCALE as f64 / sum as f64;
                let mut sum = 0;
                for j in 0..diameter {
                    let w = &mut self.weight_array[j * scale + i];
                    *w = iround(*w as f64 * k) as i16;
                    sum += *w as i32;
                }

                sum -= IMAGE_FILTER_SCALE;
                let inc: i16 = if sum > 0 { -1 } else { 1 };

                // Spread the residue from the center outward, alternating sides.
                let mut j = 0;
                while j < diameter && sum != 0 {
                    flip = !flip;
                    let tap = if flip {
                        diameter / 2 + j / 2
                    } else {
                        diameter / 2 - j / 2
                    };
                    let w = &mut self.weight_array[tap * scale + i];
                    if (*w as i32) < IMAGE_FILTER_SCALE {
                        *w += inc;
                        sum += inc as i32;
                    }
                    j += 1;
                }
            }
        }

        self.mirror();

        // Mirroring pairs column `c` with the reversed column `256 - c`, so
        // both now hold the same sum. One tap in the lower half fixes both.
        let center = diameter / 2 - 1;
        for c in 1..=scale / 2 {
            let diff = IMAGE_FILTER_SCALE - self.column_sum(c);
            let step = if c == scale / 2 { diff / 2 } else { diff };
            self.weight_array[center * scale + c] += step as i16;
        }
        self.mirror();

        // Column 0 folds onto itself around the pivot.
        let pivot = self.pivot();
        let diff = IMAGE_FILTER_SCALE - self.column_sum(0);
        self.weight_array[pivot] += diff as i16;
    }

    /// Copy the lower half of the table onto the upper half.
    fn mirror(&mut self) {
        let pivot = self.pivot();
        for i in 0..pivot {
            self.weight_array[pivot + i] = self.weight_array[pivot - i];
        }
        self.weight_array[0] = self.weight_array[self.weight_array.len() - 1];
    }

    fn column_sum(&self, column: usize) -> i32 {
        let scale = IMAGE_SUBPIXEL_SCALE as usize;
        (0..self.diameter as usize)
            .map(|t| self.weight_array[t * scale + column] as i32)
            .sum()
    }
}

// ============================================================================
// Fixed-radius kernels
// ============================================================================

macro_rules! fixed_kernel {
    ($(#[$doc:meta])* $name:ident, $radius:expr, |$x:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl ImageFilterFunction for $name {
            fn radius(&self) -> f64 {
                $radius
            }
            fn calc_weight(&self, $x: f64) -> f64 {
                $body
            }
        }
    };
}

fixed_kernel!(
    /// Tent; weights equal plain bilinear interpolation.
    ImageFilterBilinear, 1.0, |x| 1.0 - x
);
fixed_kernel!(ImageFilterHanning, 1.0, |x| 0.5 + 0.5 * (PI * x).cos());
fixed_kernel!(ImageFilterHamming, 1.0, |x| 0.54 + 0.46 * (PI * x).cos());
fixed_kernel!(
    /// Smoothstep falloff; a common choice for the 2x2 generator.
    ImageFilterHermite, 1.0, |x| (2.0 * x - 3.0) * x * x + 1.0
);
fixed_kernel!(ImageFilterQuadric, 1.5, |x| {
    if x < 0.5 {
        0.75 - x * x
    } else if x < 1.5 {
        0.5 * (x - 1.5) * (x - 1.5)
    } else {
        0.0
    }
});
fixed_kernel!(
    /// Cubic B-spline.
    ImageFilterBicubic, 2.0, |x| {
        let p = |v: f64| if v <= 0.0 { 0.0 } else { v * v * v };
        (p(x + 2.0) - 4.0 * p(x + 1.0) + 6.0 * p(x) - 4.0 * p(x - 1.0)) / 6.0
    }
);
fixed_kernel!(ImageFilterCatrom, 2.0, |x| {
    if x < 1.0 {
        0.5 * (2.0 + x * x * (-5.0 + x * 3.0))
    } else if x < 2.0 {
        0.5 * (4.0 + x * (-8.0 + x * (5.0 - x)))
    } else {
        0.0
    }
});
fixed_kernel!(ImageFilterSpline16, 2.0, |x| {
    if x < 1.0 {
        ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
    } else {
        let t = x - 1.0;
        ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
    }
});
fixed_kernel!(ImageFilterSpline36, 3.0, |x| {
    if x < 1.0 {
        ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
    } else if x < 2.0 {
        let t = x - 1.0;
        ((-6.0 / 11.0 * t + 270.0 / 209.0) * t - 156.0 / 209.0) * t
    } else {
        let t = x - 2.0;
        ((1.0 / 11.0 * t - 45.0 / 209.0) * t + 26.0 / 209.0) * t
    }
});
fixed_kernel!(ImageFilterGaussian, 2.0, |x| (-2.0 * x * x).exp() * (2.0 / PI).sqrt());

// ============================================================================
// Parameterized kernels
// ============================================================================

/// Kaiser window, radius 1, shape parameter `b` (default 6.33).
#[derive(Debug, Clone, Copy)]
pub struct ImageFilterKaiser {
    a: f64,
    i0a: f64,
}

impl ImageFilterKaiser {
    const EPSILON: f64 = 1e-12;

    pub fn new(b: f64) -> Self {
        Self {
            a: b,
            i0a: 1.0 / Self::bessel_i0(b),
        }
    }

    /// Modified Bessel function of the first kind, order 0.
    fn bessel_i0(x: f64) -> f64 {
        let y = x * x / 4.0;
        let mut sum = 1.0;
        let mut t = y;
        let mut i = 2u32;
        while t > Self::EPSILON {
            sum += t;
            t *= y / (i * i) as f64;
            i += 1;
        }
        sum
    }
}

impl Default for ImageFilterKaiser {
    fn default() -> Self {
        Self::new(6.33)
    }
}

impl ImageFilterFunction for ImageFilterKaiser {
    fn radius(&self) -> f64 {
        1.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        Self::bessel_i0(self.a * (1.0 - x * x).max(0.0).sqrt()) * self.i0a
    }
}

/// Mitchell-Netravali cubic, radius 2. `b = c = 1/3` by default.
#[derive(Debug, Clone, Copy)]
pub struct ImageFilterMitchell {
    p: [f64; 3],
    q: [f64; 4],
}

impl ImageFilterMitchell {
    pub fn new(b: f64, c: f64) -> Self {
        Self {
            p: [
                (6.0 - 2.0 * b) / 6.0,
                (-18.0 + 12.0 * b + 6.0 * c) / 6.0,
                (12.0 - 9.0 * b - 6.0 * c) / 6.0,
            ],
            q: [
                (8.0 * b + 24.0 * c) / 6.0,
                (-12.0 * b - 48.0 * c) / 6.0,
                (6.0 * b + 30.0 * c) / 6.0,
                (-b - 6.0 * c) / 6.0,
            ],
        }
    }
}

impl Default for ImageFilterMitchell {
    fn default() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0)
    }
}

impl ImageFilterFunction for ImageFilterMitchell {
    fn radius(&self) -> f64 {
        2.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        let [p0, p2, p3] = self.p;
        let [q0, q1, q2, q3] = self.q;
        if x < 1.0 {
            p0 + x * x * (p2 + x * p3)
        } else if x < 2.0 {
            q0 + x * (q1 + x * (q2 + x * q3))
        } else {
            0.0
        }
    }
}

/// Windowed sinc family; the radius is at least 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SincWindow {
    /// Plain truncated sinc.
    None,
    Lanczos,
    Blackman,
}

/// Sinc kernel with a selectable window and radius.
#[derive(Debug, Clone, Copy)]
pub struct ImageFilterSinc {
    radius: f64,
    window: SincWindow,
}

impl ImageFilterSinc {
    pub fn new(radius: f64) -> Self {
        Self::with_window(radius, SincWindow::None)
    }

    pub fn lanczos(radius: f64) -> Self {
        Self::with_window(radius, SincWindow::Lanczos)
    }

    pub fn blackman(radius: f64) -> Self {
        Self::with_window(radius, SincWindow::Blackman)
    }

    pub fn with_window(radius: f64, window: SincWindow) -> Self {
        Self {
            radius: radius.max(2.0),
            window,
        }
    }
}

impl ImageFilterFunction for ImageFilterSinc {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn calc_weight(&self, x: f64) -> f64 {
        if x == 0.0 {
            return 1.0;
        }
        if self.window != SincWindow::None && x > self.radius {
            return 0.0;
        }
        let px = x * PI;
        let sinc = px.sin() / px;
        let xr = px / self.radius;
        match self.window {
            SincWindow::None => sinc,
            SincWindow::Lanczos => sinc * (xr.sin() / xr),
            SincWindow::Blackman => sinc * (0.42 + 0.5 * xr.cos() + 0.08 * (2.0 * xr).cos()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
