//! Gradient color ramps.
//!
//! A color function maps a ramp index to a color. [`GradientLut`] builds
//! its table once from color stops; [`GradientLinearColor`] interpolates
//! two colors on the fly.

use crate::basics::uround;
use crate::color::{ColorFormat, Rgba8};
use crate::error::SpanError;

// ============================================================================
// ColorFunction trait
// ============================================================================

/// Indexed access to a color ramp of known size.
pub trait ColorFunction {
    type Color;

    fn size(&self) -> usize;

    /// Color at `index`, which callers keep below `size()`.
    fn color_at(&self, index: usize) -> Self::Color;
}

impl<F: ColorFunction + ?Sized> ColorFunction for &F {
    type Color = F::Color;

    fn size(&self) -> usize {
        (**self).size()
    }

    fn color_at(&self, index: usize) -> Self::Color {
        (**self).color_at(index)
    }
}

/// Channel-wise linear interpolation, `k` in `[0, 1]`.
#[inline]
fn lerp_color<C: ColorFormat>(c1: &C, c2: &C, k: f64) -> C {
    let a = c1.to_rgba8();
    let b = c2.to_rgba8();
    let ch = |i: usize| {
        let v = a[i] as f64 + (b[i] as f64 - a[i] as f64) * k;
        uround(v.clamp(0.0, 255.0)) as u8
    };
    C::from_rgba8(ch(0), ch(1), ch(2), ch(3))
}

// ============================================================================
// GradientLut
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct ColorPoint<C> {
    offset: f64,
    color: C,
}

/// Default number of ramp entries.
pub const DEFAULT_LUT_SIZE: usize = 256;

/// Color ramp precomputed from stops at offsets in `[0, 1]`.
///
/// Entry `i` of an `N`-entry table samples offset `i / (N - 1)`, so the
/// first and last entries are exactly the first and last stop colors.
/// Offsets before the first stop take its color, likewise after the last.
#[derive(Debug, Clone)]
pub struct GradientLut<C = Rgba8> {
    color_profile: Vec<ColorPoint<C>>,
    color_lut: Vec<C>,
}

impl<C: ColorFormat> GradientLut<C> {
    pub fn new(lut_size: usize) -> Self {
        Self {
            color_profile: Vec::new(),
            color_lut: vec![C::default(); lut_size.max(1)],
        }
    }

    pub fn new_default() -> Self {
        Self::new(DEFAULT_LUT_SIZE)
    }

    pub fn remove_all(&mut self) {
        self.color_profile.clear();
    }

    /// Add a stop; `offset` is clamped into `[0, 1]`.
    pub fn add_color(&mut self, offset: f64, color: C) {
        self.color_profile.push(ColorPoint {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
    }

    /// Rebuild the table from the current stops.
    ///
    /// Stops are sorted by offset; of several stops at one offset the first
    /// added wins. Fewer than two stops leave the table unchanged.
    pub fn build_lut(&mut self) {
        self.color_profile
            .sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.color_profile
            .dedup_by(|a, b| (a.offset - b.offset).abs() < 1e-10);

        if self.color_profile.len() < 2 {
            log::warn!(
                "gradient ramp needs at least two stops, have {}",
                self.color_profile.len()
            );
            return;
        }
        self.color_lut = Self::sample(&self.color_profile, self.color_lut.len());
        log::debug!(
            "gradient ramp rebuilt: {} entries from {} stops",
            self.color_lut.len(),
            self.color_profile.len()
        );
    }

    /// Replace the stops and the table size in one step.
    ///
    /// The new table is built aside and swapped in, so on error the ramp
    /// keeps its previous contents.
    pub fn set_colors(&mut self, size: usize, stops: &[(f64, C)]) -> Result<(), SpanError> {
        if size < 2 {
            return Err(SpanError::InvalidRampSize(size));
        }
        if stops.len() < 2 {
            return Err(SpanError::TooFewStops(stops.len()));
        }
        if let Some(&(offset, _)) = stops
            .iter()
            .find(|(offset, _)| !(0.0..=1.0).contains(offset))
        {
            return Err(SpanError::InvalidStopOffset(offset));
        }

        let mut profile: Vec<ColorPoint<C>> = stops
            .iter()
            .map(|&(offset, color)| ColorPoint { offset, color })
            .collect();
        profile.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        profile.dedup_by(|a, b| (a.offset - b.offset).abs() < 1e-10);
        if profile.len() < 2 {
            return Err(SpanError::TooFewStops(profile.len()));
        }

        self.color_lut = Self::sample(&profile, size);
        self.color_profile = profile;
        log::debug!("gradient ramp replaced: {} entries from {} stops", size, stops.len());
        Ok(())
    }

    fn sample(profile: &[ColorPoint<C>], size: usize) -> Vec<C> {
        let first = profile[0];
        let last = profile[profile.len() - 1];
        let denom = (size.max(2) - 1) as f64;
        let mut seg = 0;

        (0..size)
            .map(|i| {
                let t = i as f64 / denom;
                if t <= first.offset {
                    return first.color;
                }
                if t >= last.offset {
                    return last.color;
                }
                while seg + 2 < profile.len() && t > profile[seg + 1].offset {
                    seg += 1;
                }
                let p0 = profile[seg];
                let p1 = profile[seg + 1];
                let k = (t - p0.offset) / (p1.offset - p0.offset);
                lerp_color(&p0.color, &p1.color, k)
            })
            .collect()
    }

    /// Number of stops currently held.
    pub fn stop_count(&self) -> usize {
        self.color_profile.len()
    }
}

impl<C: ColorFormat> ColorFunction for GradientLut<C> {
    type Color = C;

    fn size(&self) -> usize {
        self.color_lut.len()
    }

    #[inline]
    fn color_at(&self, index: usize) -> C {
        self.color_lut
            .get(index)
            .or(self.color_lut.last())
            .copied()
            .unwrap_or_default()
    }
}

// ============================================================================
// GradientLinearColor
// ============================================================================

/// Two-color ramp of `size` entries, interpolated per lookup.
#[derive(Debug, Clone, Copy)]
pub struct GradientLinearColor<C = Rgba8> {
    c1: C,
    c2: C,
    size: usize,
}

impl<C: ColorFormat> GradientLinearColor<C> {
    pub fn new(c1: C, c2: C, size: usize) -> Self {
        Self {
            c1,
            c2,
            size: size.max(1),
        }
    }

    pub fn colors(&mut self, c1: C, c2: C) {
        self.c1 = c1;
        self.c2 = c2;
    }
}

impl<C: ColorFormat> ColorFunction for GradientLinearColor<C> {
    type Color = C;

    fn size(&self) -> usize {
        self.size
    }

    fn color_at(&self, index: usize) -> C {
        lerp_color(
            &self.c1,
            &self.c2,
            index as f64 / (self.size - 1).max(1) as f64,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
