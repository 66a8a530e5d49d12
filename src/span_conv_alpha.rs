//! Alpha converters: run after a generator to rewrite the alpha channel.

use core::marker::PhantomData;

use crate::color::ColorFormat;
use crate::span_converter::SpanConverterFunction;

// ============================================================================
// SpanConvAlphaScale
// ============================================================================

/// Multiplies every pixel's alpha by a constant factor in `[0, 1]`.
///
/// Premultiplied layouts scale their color channels by the same factor.
/// Layouts without alpha pass through.
#[derive(Debug, Clone, Copy)]
pub struct SpanConvAlphaScale<C> {
    factor: f64,
    phantom: PhantomData<C>,
}

impl<C: ColorFormat> SpanConvAlphaScale<C> {
    pub fn new(factor: f64) -> Self {
        let mut c = Self {
            factor: 1.0,
            phantom: PhantomData,
        };
        c.set_factor(factor);
        c
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Out-of-range factors are clamped; NaN is treated as zero.
    pub fn set_factor(&mut self, factor: f64) {
        self.factor = if factor.is_nan() {
            log::warn!("alpha scale factor is NaN, using 0");
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
    }
}

impl<C: ColorFormat> SpanConverterFunction for SpanConvAlphaScale<C> {
    type Color = C;

    fn convert(&mut self, span: &mut [C], _x: i32, _y: i32, len: u32) {
        if !C::HAS_ALPHA {
            return;
        }
        for c in span.iter_mut().take(len as usize) {
            c.scale_alpha(self.factor);
        }
    }
}

// ============================================================================
// SpanConvBrightnessAlpha
// ============================================================================

/// Number of entries in a brightness table: one per possible `r + g + b`.
pub const BRIGHTNESS_TABLE_SIZE: usize = 768;

/// Replaces alpha with a table lookup on the pixel's brightness `r + g + b`,
/// rescaled from `0..=765` onto the table's `0..=767`.
///
/// The default table is a linear ramp, so black becomes transparent and
/// white opaque. Color channels of premultiplied layouts are clamped to the
/// new alpha.
#[derive(Clone)]
pub struct SpanConvBrightnessAlpha<C> {
    table: Box<[u8; BRIGHTNESS_TABLE_SIZE]>,
    phantom: PhantomData<C>,
}

fn linear_brightness_table() -> Box<[u8; BRIGHTNESS_TABLE_SIZE]> {
    let mut t = Box::new([0u8; BRIGHTNESS_TABLE_SIZE]);
    for (i, v) in t.iter_mut().enumerate() {
        *v = ((i * 255 + 383) / 767) as u8;
    }
    t
}

impl<C: ColorFormat> SpanConvBrightnessAlpha<C> {
    pub fn new() -> Self {
        Self {
            table: linear_brightness_table(),
            phantom: PhantomData,
        }
    }

    /// Build from a caller supplied table.
    ///
    /// A table of the wrong length is rejected with a warning and the linear
    /// ramp is used instead.
    pub fn with_table(table: &[u8]) -> Self {
        let mut c = Self::new();
        c.set_table(table);
        c
    }

    pub fn set_table(&mut self, table: &[u8]) {
        match <&[u8; BRIGHTNESS_TABLE_SIZE]>::try_from(table) {
            Ok(t) => *self.table = *t,
            Err(_) => {
                log::warn!(
                    "brightness table has {} entries, expected {}; keeping linear ramp",
                    table.len(),
                    BRIGHTNESS_TABLE_SIZE
                );
                self.table = linear_brightness_table();
            }
        }
    }

    /// Fill the table from a function of normalized brightness in `[0, 1]`.
    pub fn from_fn<F: Fn(f64) -> f64>(f: F) -> Self {
        let mut c = Self::new();
        for (i, v) in c.table.iter_mut().enumerate() {
            let a = f(i as f64 / (BRIGHTNESS_TABLE_SIZE - 1) as f64);
            *v = (a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        }
        c
    }

    pub fn table(&self) -> &[u8] {
        &self.table[..]
    }
}

impl<C: ColorFormat> Default for SpanConvBrightnessAlpha<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ColorFormat> SpanConverterFunction for SpanConvBrightnessAlpha<C> {
    type Color = C;

    fn convert(&mut self, span: &mut [C], _x: i32, _y: i32, len: u32) {
        if !C::HAS_ALPHA {
            return;
        }
        for c in span.iter_mut().take(len as usize) {
            let idx = (c.rgb_sum() as usize * (BRIGHTNESS_TABLE_SIZE - 1) + 382) / 765;
            c.replace_alpha(self.table[idx.min(BRIGHTNESS_TABLE_SIZE - 1)]);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
