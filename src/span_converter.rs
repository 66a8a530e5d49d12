//! Generator plus converter chains.
//!
//! A converter post-processes a span in place after the generator has
//! filled it. [`SpanConverter`] is the static pair; [`SpanPipeline`] holds
//! an optional boxed generator and any number of boxed converters, run in
//! the order they were added.

use core::marker::PhantomData;

use crate::span_generator::SpanGenerator;

// ============================================================================
// SpanConverterFunction trait
// ============================================================================

/// Transforms an already generated span in place.
pub trait SpanConverterFunction {
    type Color;

    fn prepare(&mut self) {}

    fn convert(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32);
}

impl<F: SpanConverterFunction + ?Sized> SpanConverterFunction for &mut F {
    type Color = F::Color;

    fn prepare(&mut self) {
        (**self).prepare()
    }

    fn convert(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32) {
        (**self).convert(span, x, y, len)
    }
}

impl<F: SpanConverterFunction + ?Sized> SpanConverterFunction for Box<F> {
    type Color = F::Color;

    fn prepare(&mut self) {
        (**self).prepare()
    }

    fn convert(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32) {
        (**self).convert(span, x, y, len)
    }
}

/// The empty converter stage: leaves every span untouched.
#[derive(Debug, Clone, Copy)]
pub struct NoConverter<C>(PhantomData<C>);

impl<C> NoConverter<C> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for NoConverter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SpanConverterFunction for NoConverter<C> {
    type Color = C;

    #[inline]
    fn convert(&mut self, _span: &mut [C], _x: i32, _y: i32, _len: u32) {}
}

// ============================================================================
// SpanConverter
// ============================================================================

/// One generator followed by one converter.
pub struct SpanConverter<G, Cv> {
    span_gen: G,
    span_cnv: Cv,
}

impl<G, Cv> SpanConverter<G, Cv>
where
    G: SpanGenerator,
    Cv: SpanConverterFunction<Color = G::Color>,
{
    pub fn new(span_gen: G, span_cnv: Cv) -> Self {
        Self { span_gen, span_cnv }
    }

    pub fn generator(&self) -> &G {
        &self.span_gen
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.span_gen
    }

    pub fn converter(&self) -> &Cv {
        &self.span_cnv
    }

    pub fn converter_mut(&mut self) -> &mut Cv {
        &mut self.span_cnv
    }

    pub fn into_inner(self) -> (G, Cv) {
        (self.span_gen, self.span_cnv)
    }
}

impl<G, Cv> SpanGenerator for SpanConverter<G, Cv>
where
    G: SpanGenerator,
    Cv: SpanConverterFunction<Color = G::Color>,
{
    type Color = G::Color;

    fn prepare(&mut self) {
        self.span_gen.prepare();
        self.span_cnv.prepare();
    }

    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32, len: u32) {
        self.span_gen.generate(span, x, y, len);
        self.span_cnv.convert(span, x, y, len);
    }
}

// ============================================================================
// SpanPipeline
// ============================================================================

/// Dynamically assembled generator and converter chain.
///
/// Without a generator the buffer is left as the caller passed it and only
/// the converters run.
pub struct SpanPipeline<'a, C> {
    generator: Option<Box<dyn SpanGenerator<Color = C> + 'a>>,
    converters: Vec<Box<dyn SpanConverterFunction<Color = C> + 'a>>,
}

impl<'a, C> SpanPipeline<'a, C> {
    pub fn new() -> Self {
        Self {
            generator: None,
            converters: Vec::new(),
        }
    }

    pub fn with_generator<G>(generator: G) -> Self
    where
        G: SpanGenerator<Color = C> + 'a,
    {
        let mut p = Self::new();
        p.set_generator(generator);
        p
    }

    pub fn set_generator<G>(&mut self, generator: G)
    where
        G: SpanGenerator<Color = C> + 'a,
    {
        self.generator = Some(Box::new(generator));
    }

    /// Detach the generator, returning it.
    pub fn take_generator(&mut self) -> Option<Box<dyn SpanGenerator<Color = C> + 'a>> {
        self.generator.take()
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Append a converter; it runs after every converter added before it.
    pub fn add_converter<F>(&mut self, converter: F) -> &mut Self
    where
        F: SpanConverterFunction<Color = C> + 'a,
    {
        self.converters.push(Box::new(converter));
        self
    }

    pub fn converter_count(&self) -> usize {
        self.converters.len()
    }

    pub fn clear_converters(&mut self) {
        self.converters.clear();
    }
}

impl<C> Default for SpanPipeline<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SpanGenerator for SpanPipeline<'_, C> {
    type Color = C;

    fn prepare(&mut self) {
        if let Some(g) = self.generator.as_mut() {
            g.prepare();
        }
        for c in &mut self.converters {
            c.prepare();
        }
        log::debug!(
            "span pipeline prepared: generator {}, {} converters",
            if self.generator.is_some() { "attached" } else { "absent" },
            self.converters.len()
        );
    }

    fn generate(&mut self, span: &mut [C], x: i32, y: i32, len: u32) {
        if let Some(g) = self.generator.as_mut() {
            g.generate(span, x, y, len);
        }
        for c in &mut self.converters {
            c.convert(span, x, y, len);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
