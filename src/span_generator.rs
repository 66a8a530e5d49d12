//! The generator side of the span pipeline.

/// Produces the colors of one horizontal span.
///
/// `prepare` runs once before a batch of spans; `generate` fills
/// `span[..len]` for the pixels starting at `(x, y)`.
pub trait SpanGenerator {
    type Color;

    fn prepare(&mut self);

    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32);
}

impl<G: SpanGenerator + ?Sized> SpanGenerator for &mut G {
    type Color = G::Color;

    fn prepare(&mut self) {
        (**self).prepare()
    }

    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32) {
        (**self).generate(span, x, y, len)
    }
}

impl<G: SpanGenerator + ?Sized> SpanGenerator for Box<G> {
    type Color = G::Color;

    fn prepare(&mut self) {
        (**self).prepare()
    }

    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32) {
        (**self).generate(span, x, y, len)
    }
}
