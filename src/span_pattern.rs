//! Pattern span generators.
//!
//! Fill spans from a source image, usually a wrapping accessor so the image
//! tiles the plane. The offsets shift where the tiling starts.

use core::marker::PhantomData;

use crate::color::{ColorFormat, Gray8, PixelOrder, Rgba8};
use crate::image_accessors::ImageSource;
use crate::span_generator::SpanGenerator;

/// Copy `len` source pixels starting at `(sx, sy)`. With `alpha` set, it
/// replaces whatever alpha the source carries.
fn fill_pattern<S: ImageSource, C: ColorFormat>(
    src: &mut S,
    span: &mut [C],
    sx: i32,
    sy: i32,
    len: u32,
    alpha: Option<u8>,
) {
    let len = (len as usize).min(span.len());
    if len == 0 {
        return;
    }
    let convert = |p: &[u8]| {
        let [r, g, b, a] = S::Order::rgba(p);
        C::from_rgba8(r as u8, g as u8, b as u8, alpha.unwrap_or(a as u8))
    };
    span[0] = convert(src.span(sx, sy, len as u32));
    for pixel in span[1..len].iter_mut() {
        *pixel = convert(src.next_x());
    }
}

macro_rules! pattern_common {
    () => {
        pub fn source(&self) -> &S {
            &self.src
        }

        pub fn source_mut(&mut self) -> &mut S {
            &mut self.src
        }

        /// Replace the source; offsets and alpha are kept.
        pub fn attach(&mut self, src: S) {
            self.src = src;
        }

        pub fn offset_x(&self) -> u32 {
            self.offset_x
        }

        pub fn set_offset_x(&mut self, v: u32) {
            self.offset_x = v;
        }

        pub fn offset_y(&self) -> u32 {
            self.offset_y
        }

        pub fn set_offset_y(&mut self, v: u32) {
            self.offset_y = v;
        }
    };
}

// ============================================================================
// SpanPatternRgba
// ============================================================================

/// Pattern that copies source alpha verbatim.
pub struct SpanPatternRgba<S, C = Rgba8> {
    src: S,
    offset_x: u32,
    offset_y: u32,
    _color: PhantomData<C>,
}

impl<S: ImageSource, C: ColorFormat> SpanPatternRgba<S, C> {
    pub fn new(src: S, offset_x: u32, offset_y: u32) -> Self {
        Self {
            src,
            offset_x,
            offset_y,
            _color: PhantomData,
        }
    }

    pattern_common!();
}

impl<S: ImageSource, C: ColorFormat> SpanGenerator for SpanPatternRgba<S, C> {
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        let sx = x.wrapping_add(self.offset_x as i32);
        let sy = y.wrapping_add(self.offset_y as i32);
        fill_pattern(&mut self.src, span, sx, sy, len, None);
    }
}

// ============================================================================
// SpanPatternRgb / SpanPatternGray
// ============================================================================

macro_rules! global_alpha_pattern {
    ($(#[$doc:meta])* $name:ident, $default:ty) => {
        $(#[$doc])*
        pub struct $name<S, C = $default> {
            src: S,
            offset_x: u32,
            offset_y: u32,
            alpha: u8,
            _color: PhantomData<C>,
        }

        impl<S: ImageSource, C: ColorFormat> $name<S, C> {
            /// Starts fully opaque.
            pub fn new(src: S, offset_x: u32, offset_y: u32) -> Self {
                Self {
                    src,
                    offset_x,
                    offset_y,
                    alpha: 255,
                    _color: PhantomData,
                }
            }

            pattern_common!();

            pub fn alpha(&self) -> u8 {
                self.alpha
            }

            pub fn set_alpha(&mut self, v: u8) {
                self.alpha = v;
            }
        }

        impl<S: ImageSource, C: ColorFormat> SpanGenerator for $name<S, C> {
            type Color = C;

            fn prepare(&mut self) {}

            fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
                let sx = x.wrapping_add(self.offset_x as i32);
                let sy = y.wrapping_add(self.offset_y as i32);
                fill_pattern(&mut self.src, span, sx, sy, len, Some(self.alpha));
            }
        }
    };
}

global_alpha_pattern!(
    /// Pattern over an RGB source; every pixel gets the global alpha.
    SpanPatternRgb,
    Rgba8
);

global_alpha_pattern!(
    /// Pattern over a gray source; every pixel gets the global alpha.
    SpanPatternGray,
    Gray8
);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{OrderGray, OrderRgb, OrderRgba};
    use crate::image_accessors::{ImageAccessorWrap, WrapModeReflect, WrapModeRepeat};
    use crate::rendering_buffer::RowAccessor;

    /// Returns one fixed pixel everywhere.
    struct ConstantSource {
        pixel: [u8; 4],
    }

    impl ImageSource for ConstantSource {
        type Order = OrderRgba;

        fn width(&self) -> u32 {
            1
        }
        fn height(&self) -> u32 {
            1
        }
        fn span(&mut self, _x: i32, _y: i32, _len: u32) -> &[u8] {
            &self.pixel
        }
        fn next_x(&mut self) -> &[u8] {
            &self.pixel
        }
        fn next_y(&mut self) -> &[u8] {
            &self.pixel
        }
        fn row_ptr(&self, _y: i32) -> &[u8] {
            &self.pixel
        }
    }

    #[test]
    fn test_constant_pattern() {
        let src = ConstantSource {
            pixel: [255, 0, 0, 128],
        };
        let mut pattern: SpanPatternRgba<_> = SpanPatternRgba::new(src, 0, 0);
        pattern.prepare();
        let mut span = [Rgba8::default(); 5];
        pattern.generate(&mut span, 0, 0, 5);
        assert!(span.iter().all(|&c| c == Rgba8::new(255, 0, 0, 128)));
    }

    #[test]
    fn test_rgba_pattern_tiles_with_offset() {
        let data: Vec<u8> = (0..3u8).flat_map(|i| [i * 10, 0, 0, 255]).collect();
        let rb = RowAccessor::new(&data, 3, 1, 12).unwrap();
        let src = ImageAccessorWrap::<OrderRgba, WrapModeRepeat, WrapModeRepeat>::new(rb);
        let mut pattern: SpanPatternRgba<_> = SpanPatternRgba::new(src, 1, 0);
        let mut span = [Rgba8::default(); 5];
        pattern.generate(&mut span, 0, 7, 5);
        let reds: Vec<u8> = span.iter().map(|c| c.r).collect();
        assert_eq!(reds, [10, 20, 0, 10, 20]);

        pattern.set_offset_x(0);
        pattern.generate(&mut span, -1, 0, 2);
        assert_eq!(span[0].r, 20);
        assert_eq!(span[1].r, 0);
    }

    #[test]
    fn test_rgb_pattern_zero_alpha_keeps_color() {
        let data = [40u8, 50, 60, 70, 80, 90];
        let rb = RowAccessor::new(&data, 2, 1, 6).unwrap();
        let src = ImageAccessorWrap::<OrderRgb, WrapModeRepeat, WrapModeRepeat>::new(rb);
        let mut pattern: SpanPatternRgb<_> = SpanPatternRgb::new(src, 0, 0);
        assert_eq!(pattern.alpha(), 255);
        pattern.set_alpha(0);
        let mut span = [Rgba8::default(); 2];
        pattern.generate(&mut span, 0, 0, 2);
        assert_eq!(span[0], Rgba8::new(40, 50, 60, 0));
        assert_eq!(span[1], Rgba8::new(70, 80, 90, 0));
    }

    #[test]
    fn test_gray_pattern_global_alpha_and_attach() {
        let data = [10u8, 20, 30];
        let rb = RowAccessor::new(&data, 3, 1, 3).unwrap();
        let src = ImageAccessorWrap::<OrderGray, WrapModeReflect, WrapModeRepeat>::new(rb);
        let mut pattern: SpanPatternGray<_> = SpanPatternGray::new(src, 0, 0);
        pattern.set_alpha(77);
        let mut span = [Gray8::default(); 3];
        pattern.generate(&mut span, 0, 0, 3);
        assert_eq!(span, [Gray8::new(10, 77), Gray8::new(20, 77), Gray8::new(30, 77)]);

        let other = [99u8, 99, 99];
        let rb = RowAccessor::new(&other, 3, 1, 3).unwrap();
        pattern.set_offset_y(4);
        pattern.attach(ImageAccessorWrap::new(rb));
        pattern.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0], Gray8::new(99, 77));
        assert_eq!(pattern.alpha(), 77);
        assert_eq!(pattern.offset_y(), 4);
    }

    #[test]
    fn test_len_longer_than_span_is_truncated() {
        let src = ConstantSource {
            pixel: [1, 2, 3, 4],
        };
        let mut pattern: SpanPatternRgba<_> = SpanPatternRgba::new(src, 0, 0);
        let mut span = [Rgba8::default(); 2];
        pattern.generate(&mut span, 0, 0, 10);
        assert_eq!(span[1], Rgba8::new(1, 2, 3, 4));
    }
}
