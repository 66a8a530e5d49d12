//! # agg-span
//!
//! Per-pixel color generation for Anti-Grain Geometry style rasterizers.
//!
//! A rasterizer decides *which* pixels a shape covers; the generators here
//! decide *what color* each of those pixels gets. Every generator fills a
//! horizontal run ("span") of colors for a destination row:
//!
//! - Image filters: nearest neighbor, bilinear, 2x2 and N-tap kernels,
//!   and area-averaging resamplers for minification
//! - Gradients: linear, radial, diamond, conic and focal shapes with pad,
//!   repeat and reflect spreads over a precomputed color ramp
//! - Patterns: tiled images through wrapping accessors
//! - Converters: post-processing stages chained after a generator
//!
//! ## Architecture
//!
//! 1. **Interpolator** maps destination pixels to fixed-point source coordinates
//! 2. **Accessor** reads source pixels, handling out-of-bounds coordinates
//! 3. **Generator** combines samples (or gradient distances) into colors
//! 4. **Converter** rewrites the finished span in place

// Foundation types and math
pub mod basics;
pub mod color;
pub mod error;

// Geometry
pub mod dda_line;
pub mod trans_affine;

// Pixel sources
pub mod image_accessors;
pub mod rendering_buffer;

// Interpolators
pub mod span_interpolator_linear;
pub mod span_interpolator_trans;

// Generators
pub mod gradient_lut;
pub mod image_filters;
pub mod span_generator;
pub mod span_gradient;
pub mod span_image_filter;
pub mod span_image_filter_color;
pub mod span_pattern;
pub mod span_solid;

// Pipeline
pub mod span_allocator;
pub mod span_conv_alpha;
pub mod span_converter;

// Configuration
pub mod config;

pub use error::SpanError;
