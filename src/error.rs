//! Configuration errors.
//!
//! Span generation itself never fails; only building the things it
//! consumes (buffers, filter tables, gradient ramps) can be rejected.

/// Error returned when a span stage cannot be configured as requested.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SpanError {
    #[error("buffer of {len} bytes is too small for {height} rows of stride {stride}")]
    BufferTooSmall { len: usize, height: u32, stride: i32 },
    #[error("a zero stride cannot address {height} rows")]
    ZeroStride { height: u32 },
    #[error("a gradient needs at least two color stops, got {0}")]
    TooFewStops(usize),
    #[error("color stop offset {0} is outside [0, 1]")]
    InvalidStopOffset(f64),
    #[error("gradient ramp size must be at least 2, got {0}")]
    InvalidRampSize(usize),
    #[error("filter radius must be finite and in (0, {max}], got {radius}")]
    InvalidFilterRadius { radius: f64, max: f64 },
    #[error("unknown image filter `{0}`")]
    UnknownFilter(String),
    #[error("gradient distance range is empty: d1 = {d1}, d2 = {d2}")]
    InvalidDistanceRange { d1: f64, d2: f64 },
    #[error("resample scale limit must be at least 1, got {0}")]
    InvalidScaleLimit(f64),
    #[error("resample blur must be at least 1, got {0}")]
    InvalidBlur(f64),
}
