//! Reusable span color buffer.

use crate::span_generator::SpanGenerator;

// ============================================================================
// SpanAllocator
// ============================================================================

/// Color buffer shared by consecutive spans.
///
/// Grows in steps of 256 entries and never shrinks, so steady-state span
/// generation does not allocate.
#[derive(Debug, Clone, Default)]
pub struct SpanAllocator<C> {
    span: Vec<C>,
}

impl<C: Default + Clone> SpanAllocator<C> {
    pub fn new() -> Self {
        Self { span: Vec::new() }
    }

    /// Buffer of exactly `span_len` entries; contents are whatever the
    /// previous span left behind.
    pub fn allocate(&mut self, span_len: usize) -> &mut [C] {
        if span_len > self.span.len() {
            let new_size = ((span_len + 255) >> 8) << 8;
            self.span.resize(new_size, C::default());
        }
        &mut self.span[..span_len]
    }

    /// Run `gen` for the span at `(x, y)` into the buffer.
    pub fn generate<G>(&mut self, gen: &mut G, x: i32, y: i32, len: u32) -> &[C]
    where
        G: SpanGenerator<Color = C> + ?Sized,
    {
        let span = self.allocate(len as usize);
        gen.generate(span, x, y, len);
        span
    }

    pub fn max_span_len(&self) -> usize {
        self.span.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::span_solid::SpanSolid;

    #[test]
    fn test_new_empty() {
        let alloc = SpanAllocator::<Rgba8>::new();
        assert_eq!(alloc.max_span_len(), 0);
    }

    #[test]
    fn test_allocate_grows_in_blocks() {
        let mut alloc = SpanAllocator::<Rgba8>::new();
        assert_eq!(alloc.allocate(10).len(), 10);
        assert_eq!(alloc.max_span_len(), 256);
        alloc.allocate(257);
        assert_eq!(alloc.max_span_len(), 512);
    }

    #[test]
    fn test_allocate_reuses() {
        let mut alloc = SpanAllocator::<Rgba8>::new();
        alloc.allocate(100);
        assert_eq!(alloc.allocate(50).len(), 50);
        assert_eq!(alloc.max_span_len(), 256);
    }

    #[test]
    fn test_generate_into_buffer() {
        let mut alloc = SpanAllocator::new();
        let mut gen = SpanSolid::new(Rgba8::new(1, 2, 3, 4));
        let span = alloc.generate(&mut gen, 0, 0, 3);
        assert_eq!(span, &[Rgba8::new(1, 2, 3, 4); 3]);
    }
}
