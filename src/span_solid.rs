//! Solid color span generator.

use crate::span_generator::SpanGenerator;

// ============================================================================
// SpanSolid
// ============================================================================

/// Fills every pixel of a span with one color.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanSolid<C> {
    color: C,
}

impl<C: Copy> SpanSolid<C> {
    pub fn new(color: C) -> Self {
        Self { color }
    }

    pub fn set_color(&mut self, c: C) {
        self.color = c;
    }

    pub fn color(&self) -> C {
        self.color
    }
}

impl<C: Copy> SpanGenerator for SpanSolid<C> {
    type Color = C;

    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [C], _x: i32, _y: i32, len: u32) {
        for c in span.iter_mut().take(len as usize) {
            *c = self.color;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Gray8, Rgba8};

    #[test]
    fn test_default_is_transparent() {
        let gen = SpanSolid::<Rgba8>::default();
        assert_eq!(gen.color(), Rgba8::transparent());
    }

    #[test]
    fn test_generate_fills_only_len() {
        let mut gen = SpanSolid::new(Rgba8::new(100, 150, 200, 255));
        let mut span = [Rgba8::default(); 5];
        gen.generate(&mut span, 10, 20, 3);
        assert!(span[..3].iter().all(|&c| c == Rgba8::new(100, 150, 200, 255)));
        assert_eq!(span[3], Rgba8::default());
    }

    #[test]
    fn test_set_color_gray() {
        let mut gen = SpanSolid::new(Gray8::new(0, 0));
        gen.set_color(Gray8::new_opaque(42));
        let mut span = [Gray8::default(); 2];
        gen.generate(&mut span, 0, 0, 2);
        assert_eq!(span, [Gray8::new_opaque(42); 2]);
    }
}
