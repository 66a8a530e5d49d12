//! Deserializable descriptions of filter, resampling and gradient setups.
//!
//! These are plain data: `build` turns a description into the table or
//! function the generators consume, and `validate` reports what would be
//! rejected without building anything. Missing fields take their defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{ColorFormat, Rgba8};
use crate::error::SpanError;
use crate::gradient_lut::{GradientLut, DEFAULT_LUT_SIZE};
use crate::image_filters::{
    ImageFilterBicubic, ImageFilterBilinear, ImageFilterCatrom, ImageFilterFunction,
    ImageFilterGaussian, ImageFilterHamming, ImageFilterHanning, ImageFilterHermite,
    ImageFilterKaiser, ImageFilterLut, ImageFilterMitchell, ImageFilterQuadric, ImageFilterSinc,
    ImageFilterSpline16, ImageFilterSpline36, MAX_FILTER_RADIUS,
};
use crate::span_gradient::{
    GradientConic, GradientDiamond, GradientFunction, GradientRadial, GradientRadialD,
    GradientRadialFocus, GradientReflectAdaptor, GradientRepeatAdaptor, GradientSqrtXY,
    GradientX, GradientXY, GradientY, SpanGradient,
};
use crate::span_image_filter::{SpanImageResample, SpanImageResampleAffine};
use crate::span_interpolator_linear::SpanInterpolator;

// ============================================================================
// SpanConfig
// ============================================================================

/// Root of a serialized rendering setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanConfig {
    pub filter: FilterConfig,
    pub resample: ResampleConfig,
    pub gradient: GradientConfig,
}

impl SpanConfig {
    pub fn validate(&self) -> Result<(), SpanError> {
        self.filter.validate()?;
        self.resample.validate()?;
        self.gradient.validate()
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Named reconstruction kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Bilinear,
    Hanning,
    Hamming,
    Hermite,
    Quadric,
    Bicubic,
    Catrom,
    Spline16,
    Spline36,
    Gaussian,
    Kaiser,
    Mitchell,
    Sinc,
    Lanczos,
    Blackman,
}

impl FilterKind {
    pub const ALL: [FilterKind; 15] = [
        FilterKind::Bilinear,
        FilterKind::Hanning,
        FilterKind::Hamming,
        FilterKind::Hermite,
        FilterKind::Quadric,
        FilterKind::Bicubic,
        FilterKind::Catrom,
        FilterKind::Spline16,
        FilterKind::Spline36,
        FilterKind::Gaussian,
        FilterKind::Kaiser,
        FilterKind::Mitchell,
        FilterKind::Sinc,
        FilterKind::Lanczos,
        FilterKind::Blackman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Bilinear => "bilinear",
            FilterKind::Hanning => "hanning",
            FilterKind::Hamming => "hamming",
            FilterKind::Hermite => "hermite",
            FilterKind::Quadric => "quadric",
            FilterKind::Bicubic => "bicubic",
            FilterKind::Catrom => "catrom",
            FilterKind::Spline16 => "spline16",
            FilterKind::Spline36 => "spline36",
            FilterKind::Gaussian => "gaussian",
            FilterKind::Kaiser => "kaiser",
            FilterKind::Mitchell => "mitchell",
            FilterKind::Sinc => "sinc",
            FilterKind::Lanczos => "lanczos",
            FilterKind::Blackman => "blackman",
        }
    }

    /// Whether the kernel takes a radius.
    pub fn has_radius(self) -> bool {
        matches!(
            self,
            FilterKind::Sinc | FilterKind::Lanczos | FilterKind::Blackman
        )
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = SpanError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FilterKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SpanError::UnknownFilter(s.to_string()))
    }
}

/// Kernel choice plus table options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub kind: FilterKind,
    /// Only read by the sinc family; 4 when absent.
    pub radius: Option<f64>,
    pub normalize: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            kind: FilterKind::Bilinear,
            radius: None,
            normalize: true,
        }
    }
}

impl FilterConfig {
    pub fn new(kind: FilterKind) -> Self {
        FilterConfig {
            kind,
            ..Default::default()
        }
    }

    /// The kernel as a boxed function.
    pub fn function(&self) -> Box<dyn ImageFilterFunction> {
        let r = self.radius.unwrap_or(4.0);
        match self.kind {
            FilterKind::Bilinear => Box::new(ImageFilterBilinear),
            FilterKind::Hanning => Box::new(ImageFilterHanning),
            FilterKind::Hamming => Box::new(ImageFilterHamming),
            FilterKind::Hermite => Box::new(ImageFilterHermite),
            FilterKind::Quadric => Box::new(ImageFilterQuadric),
            FilterKind::Bicubic => Box::new(ImageFilterBicubic),
            FilterKind::Catrom => Box::new(ImageFilterCatrom),
            FilterKind::Spline16 => Box::new(ImageFilterSpline16),
            FilterKind::Spline36 => Box::new(ImageFilterSpline36),
            FilterKind::Gaussian => Box::new(ImageFilterGaussian),
            FilterKind::Kaiser => Box::new(ImageFilterKaiser::default()),
            FilterKind::Mitchell => Box::new(ImageFilterMitchell::default()),
            FilterKind::Sinc => Box::new(ImageFilterSinc::new(r)),
            FilterKind::Lanczos => Box::new(ImageFilterSinc::lanczos(r)),
            FilterKind::Blackman => Box::new(ImageFilterSinc::blackman(r)),
        }
    }

    pub fn validate(&self) -> Result<(), SpanError> {
        match self.radius {
            Some(radius)
                if self.kind.has_radius()
                    && (!radius.is_finite() || radius <= 0.0 || radius > MAX_FILTER_RADIUS) =>
            {
                Err(SpanError::InvalidFilterRadius {
                    radius,
                    max: MAX_FILTER_RADIUS,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Result<ImageFilterLut, SpanError> {
        self.validate()?;
        if self.radius.is_some() && !self.kind.has_radius() {
            log::warn!("{} filter has a fixed radius, ignoring configured one", self.kind);
        }
        log::debug!("building {} filter table", self.kind);
        ImageFilterLut::try_new(&*self.function(), self.normalize)
    }
}

// ============================================================================
// Resampling
// ============================================================================

/// Footprint limits for the resampling generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Keeps each resampler's own default when absent.
    pub scale_limit: Option<f64>,
    pub blur_x: f64,
    pub blur_y: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        ResampleConfig {
            scale_limit: None,
            blur_x: 1.0,
            blur_y: 1.0,
        }
    }
}

impl ResampleConfig {
    pub fn validate(&self) -> Result<(), SpanError> {
        if let Some(limit) = self.scale_limit {
            if !limit.is_finite() || limit < 1.0 {
                return Err(SpanError::InvalidScaleLimit(limit));
            }
        }
        for blur in [self.blur_x, self.blur_y] {
            if !blur.is_finite() || blur < 1.0 {
                return Err(SpanError::InvalidBlur(blur));
            }
        }
        Ok(())
    }

    pub fn apply_affine(&self, r: &mut SpanImageResampleAffine) -> Result<(), SpanError> {
        self.validate()?;
        if let Some(limit) = self.scale_limit {
            r.set_scale_limit(limit);
        }
        r.set_blur_x(self.blur_x);
        r.set_blur_y(self.blur_y);
        Ok(())
    }

    /// The general resampler keeps whole-pixel limits; fractions round down.
    pub fn apply(&self, r: &mut SpanImageResample) -> Result<(), SpanError> {
        self.validate()?;
        if let Some(limit) = self.scale_limit {
            r.set_scale_limit(limit.min(i32::MAX as f64) as i32);
        }
        r.set_blur_x(self.blur_x);
        r.set_blur_y(self.blur_y);
        Ok(())
    }
}

// ============================================================================
// Gradients
// ============================================================================

/// Gradient shape chosen by name.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradientShape {
    #[default]
    X,
    Y,
    Radial,
    RadialD,
    Diamond,
    #[serde(rename = "xy")]
    XY,
    #[serde(rename = "sqrt_xy")]
    SqrtXY,
    Conic,
    RadialFocus {
        radius: f64,
        #[serde(default)]
        focus_x: f64,
        #[serde(default)]
        focus_y: f64,
    },
}

/// What happens to distances outside `[d1, d2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spread {
    /// Clamp to the end colors.
    #[default]
    Pad,
    Repeat,
    Reflect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba8,
}

impl ColorStop {
    pub fn new(offset: f64, color: Rgba8) -> Self {
        ColorStop { offset, color }
    }
}

/// A complete gradient: shape, spread, distance range and color ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    pub shape: GradientShape,
    pub spread: Spread,
    pub d1: f64,
    pub d2: f64,
    pub lut_size: usize,
    pub stops: Vec<ColorStop>,
}

impl Default for GradientConfig {
    fn default() -> Self {
        GradientConfig {
            shape: GradientShape::X,
            spread: Spread::Pad,
            d1: 0.0,
            d2: 100.0,
            lut_size: DEFAULT_LUT_SIZE,
            stops: vec![
                ColorStop::new(0.0, Rgba8::new(0, 0, 0, 255)),
                ColorStop::new(1.0, Rgba8::new(255, 255, 255, 255)),
            ],
        }
    }
}

impl GradientConfig {
    pub fn validate(&self) -> Result<(), SpanError> {
        if !(self.d1.is_finite() && self.d2.is_finite()) || self.d2 <= self.d1 {
            return Err(SpanError::InvalidDistanceRange {
                d1: self.d1,
                d2: self.d2,
            });
        }
        if self.lut_size < 2 {
            return Err(SpanError::InvalidRampSize(self.lut_size));
        }
        if self.stops.len() < 2 {
            return Err(SpanError::TooFewStops(self.stops.len()));
        }
        if let Some(s) = self
            .stops
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.offset))
        {
            return Err(SpanError::InvalidStopOffset(s.offset));
        }
        Ok(())
    }

    /// The shape with its spread adaptor applied.
    pub fn function(&self) -> Box<dyn GradientFunction> {
        let shape: Box<dyn GradientFunction> = match self.shape {
            GradientShape::X => Box::new(GradientX),
            GradientShape::Y => Box::new(GradientY),
            GradientShape::Radial => Box::new(GradientRadial),
            GradientShape::RadialD => Box::new(GradientRadialD),
            GradientShape::Diamond => Box::new(GradientDiamond),
            GradientShape::XY => Box::new(GradientXY),
            GradientShape::SqrtXY => Box::new(GradientSqrtXY),
            GradientShape::Conic => Box::new(GradientConic),
            GradientShape::RadialFocus {
                radius,
                focus_x,
                focus_y,
            } => Box::new(GradientRadialFocus::new(radius, focus_x, focus_y)),
        };
        match self.spread {
            Spread::Pad => shape,
            Spread::Repeat => Box::new(GradientRepeatAdaptor::new(shape)),
            Spread::Reflect => Box::new(GradientReflectAdaptor::new(shape)),
        }
    }

    pub fn build_lut<C: ColorFormat>(&self) -> Result<GradientLut<C>, SpanError> {
        self.validate()?;
        let stops: Vec<(f64, C)> = self
            .stops
            .iter()
            .map(|s| {
                let c = s.color;
                (s.offset, C::from_rgba8(c.r, c.g, c.b, c.a))
            })
            .collect();
        let mut lut = GradientLut::new(self.lut_size);
        lut.set_colors(self.lut_size, &stops)?;
        Ok(lut)
    }

    /// Assemble a generator over a ramp built by [`GradientConfig::build_lut`].
    pub fn build<'a, I, C>(
        &self,
        interpolator: I,
        lut: &'a GradientLut<C>,
    ) -> Result<SpanGradient<'a, I, Box<dyn GradientFunction>, GradientLut<C>>, SpanError>
    where
        I: SpanInterpolator,
        C: ColorFormat,
    {
        self.validate()?;
        SpanGradient::try_new(interpolator, self.function(), lut, self.d1, self.d2)
    }
}

// ============================================================================
// Tests
// ============================================================================
