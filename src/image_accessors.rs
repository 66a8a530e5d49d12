//! Source image access with boundary handling.
//!
//! Every image-consuming span generator reads pixels through
//! [`ImageSource`]: fetch the first pixel of a run with `span`, then walk
//! with `next_x` / `next_y`. What happens outside the image is the
//! accessor's policy:
//!
//! - [`ImageAccessor`]: empty slice (decoded as transparent black)
//! - [`ImageAccessorClip`]: a settable background color
//! - [`ImageAccessorClone`]: the nearest edge pixel
//! - [`ImageAccessorWrap`]: tiling through a [`WrapMode`] per axis

use core::marker::PhantomData;

use crate::color::{PixelOrder, Rgba8};
use crate::rendering_buffer::RowAccessor;

// ============================================================================
// ImageSource trait
// ============================================================================

/// Raw pixel access in a declared component order.
///
/// Returned slices hold one pixel (`Order::PIX_WIDTH` bytes) or are empty;
/// callers decode them with `Order::rgba`, which maps a short slice to
/// transparent black. Implementations must never panic on out-of-range
/// coordinates.
pub trait ImageSource {
    type Order: PixelOrder;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// First pixel of a run of `len` pixels starting at `(x, y)`.
    fn span(&mut self, x: i32, y: i32, len: u32) -> &[u8];

    /// Next pixel to the right of the previous one.
    fn next_x(&mut self) -> &[u8];

    /// Pixel one row down, back at the run's starting column.
    fn next_y(&mut self) -> &[u8];

    /// Whole row `y`; empty when out of range.
    fn row_ptr(&self, y: i32) -> &[u8];
}

impl<S: ImageSource + ?Sized> ImageSource for &mut S {
    type Order = S::Order;

    fn width(&self) -> u32 {
        (**self).width()
    }
    fn height(&self) -> u32 {
        (**self).height()
    }
    fn span(&mut self, x: i32, y: i32, len: u32) -> &[u8] {
        (**self).span(x, y, len)
    }
    fn next_x(&mut self) -> &[u8] {
        (**self).next_x()
    }
    fn next_y(&mut self) -> &[u8] {
        (**self).next_y()
    }
    fn row_ptr(&self, y: i32) -> &[u8] {
        (**self).row_ptr(y)
    }
}

#[inline]
fn pixel_at<O: PixelOrder>(row: &[u8], x: i32) -> &[u8] {
    if x < 0 {
        return &[];
    }
    let off = x as usize * O::PIX_WIDTH;
    row.get(off..off + O::PIX_WIDTH).unwrap_or(&[])
}

#[inline]
fn in_bounds(rbuf: &RowAccessor<'_>, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < rbuf.width() && (y as u32) < rbuf.height()
}

// ============================================================================
// WrapMode
// ============================================================================

/// Coordinate wrapping for one axis of a tiled image.
pub trait WrapMode {
    fn new(size: u32) -> Self;

    /// Map `v` into `0..size`, remembering it for `inc`.
    fn func(&mut self, v: i32) -> u32;

    /// Mapped value of the coordinate after the last one.
    fn inc(&mut self) -> u32;
}

/// Modulo wrapping.
#[derive(Debug, Clone, Copy)]
pub struct WrapModeRepeat {
    size: i32,
    value: i32,
}

impl WrapMode for WrapModeRepeat {
    fn new(size: u32) -> Self {
        Self {
            size: size.max(1) as i32,
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = v.rem_euclid(self.size);
        self.value as u32
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.size {
            self.value = 0;
        }
        self.value as u32
    }
}

/// Mirror wrapping with period `2 * size`; the edge pixel is repeated at
/// each fold.
#[derive(Debug, Clone, Copy)]
pub struct WrapModeReflect {
    size: i32,
    value: i32,
}

impl WrapModeReflect {
    #[inline]
    fn fold(&self) -> u32 {
        if self.value >= self.size {
            (2 * self.size - self.value - 1) as u32
        } else {
            self.value as u32
        }
    }
}

impl WrapMode for WrapModeReflect {
    fn new(size: u32) -> Self {
        Self {
            size: size.max(1) as i32,
            value: 0,
        }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        self.value = v.rem_euclid(2 * self.size);
        self.fold()
    }

    #[inline]
    fn inc(&mut self) -> u32 {
        self.value += 1;
        if self.value >= 2 * self.size {
            self.value = 0;
        }
        self.fold()
    }
}

// ============================================================================
// ImageAccessor: empty result out of bounds
// ============================================================================

/// Bounds-checked access; anything outside the image reads as empty.
#[derive(Debug, Clone, Copy)]
pub struct ImageAccessor<'a, O> {
    rbuf: RowAccessor<'a>,
    x: i32,
    x0: i32,
    y: i32,
    order: PhantomData<O>,
}

impl<'a, O: PixelOrder> ImageAccessor<'a, O> {
    pub fn new(rbuf: RowAccessor<'a>) -> Self {
        Self {
            rbuf,
            x: 0,
            x0: 0,
            y: 0,
            order: PhantomData,
        }
    }

    #[inline]
    fn pixel(&self) -> &'a [u8] {
        pixel_at::<O>(self.rbuf.row_slice(self.y), self.x)
    }
}

impl<'a, O: PixelOrder> ImageSource for ImageAccessor<'a, O> {
    type Order = O;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }
    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn span(&mut self, x: i32, y: i32, _len: u32) -> &[u8] {
        self.x = x;
        self.x0 = x;
        self.y = y;
        self.pixel()
    }

    fn next_x(&mut self) -> &[u8] {
        self.x += 1;
        self.pixel()
    }

    fn next_y(&mut self) -> &[u8] {
        self.y += 1;
        self.x = self.x0;
        self.pixel()
    }

    fn row_ptr(&self, y: i32) -> &[u8] {
        self.rbuf.row_slice(y)
    }
}

// ============================================================================
// ImageAccessorClip: background color out of bounds
// ============================================================================

/// Returns a background color for every pixel outside the image.
#[derive(Debug, Clone, Copy)]
pub struct ImageAccessorClip<'a, O> {
    rbuf: RowAccessor<'a>,
    bk_buf: [u8; 4],
    x: i32,
    x0: i32,
    y: i32,
    order: PhantomData<O>,
}

impl<'a, O: PixelOrder> ImageAccessorClip<'a, O> {
    pub fn new(rbuf: RowAccessor<'a>, bk_color: Rgba8) -> Self {
        let mut acc = Self {
            rbuf,
            bk_buf: [0; 4],
            x: 0,
            x0: 0,
            y: 0,
            order: PhantomData,
        };
        acc.set_background(bk_color);
        acc
    }

    pub fn set_background(&mut self, bk_color: Rgba8) {
        self.bk_buf = O::encode([bk_color.r, bk_color.g, bk_color.b, bk_color.a]);
    }

    #[inline]
    fn pixel(&self) -> &[u8] {
        if in_bounds(&self.rbuf, self.x, self.y) {
            pixel_at::<O>(self.rbuf.row_slice(self.y), self.x)
        } else {
            &self.bk_buf[..O::PIX_WIDTH]
        }
    }
}

impl<'a, O: PixelOrder> ImageSource for ImageAccessorClip<'a, O> {
    type Order = O;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }
    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn span(&mut self, x: i32, y: i32, _len: u32) -> &[u8] {
        self.x = x;
        self.x0 = x;
        self.y = y;
        self.pixel()
    }

    fn next_x(&mut self) -> &[u8] {
        self.x += 1;
        self.pixel()
    }

    fn next_y(&mut self) -> &[u8] {
        self.y += 1;
        self.x = self.x0;
        self.pixel()
    }

    fn row_ptr(&self, y: i32) -> &[u8] {
        self.rbuf.row_slice(y)
    }
}

// ============================================================================
// ImageAccessorClone: clamp to edge pixels
// ============================================================================

/// Out-of-range coordinates snap to the nearest edge pixel.
#[derive(Debug, Clone, Copy)]
pub struct ImageAccessorClone<'a, O> {
    rbuf: RowAccessor<'a>,
    x: i32,
    x0: i32,
    y: i32,
    order: PhantomData<O>,
}

impl<'a, O: PixelOrder> ImageAccessorClone<'a, O> {
    pub fn new(rbuf: RowAccessor<'a>) -> Self {
        Self {
            rbuf,
            x: 0,
            x0: 0,
            y: 0,
            order: PhantomData,
        }
    }

    #[inline]
    fn pixel(&self) -> &'a [u8] {
        let cx = self.x.clamp(0, (self.rbuf.width() as i32 - 1).max(0));
        let cy = self.y.clamp(0, (self.rbuf.height() as i32 - 1).max(0));
        pixel_at::<O>(self.rbuf.row_slice(cy), cx)
    }
}

impl<'a, O: PixelOrder> ImageSource for ImageAccessorClone<'a, O> {
    type Order = O;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }
    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn span(&mut self, x: i32, y: i32, _len: u32) -> &[u8] {
        self.x = x;
        self.x0 = x;
        self.y = y;
        self.pixel()
    }

    fn next_x(&mut self) -> &[u8] {
        self.x += 1;
        self.pixel()
    }

    fn next_y(&mut self) -> &[u8] {
        self.y += 1;
        self.x = self.x0;
        self.pixel()
    }

    fn row_ptr(&self, y: i32) -> &[u8] {
        self.rbuf.row_slice(y)
    }
}

// ============================================================================
// ImageAccessorWrap: tiling modes
// ============================================================================

/// Tiles the image over the whole plane.
#[derive(Debug, Clone, Copy)]
pub struct ImageAccessorWrap<'a, O, WX, WY> {
    rbuf: RowAccessor<'a>,
    x: i32,
    wrap_x: WX,
    wrap_y: WY,
    row_y: u32,
    order: PhantomData<O>,
}

impl<'a, O: PixelOrder, WX: WrapMode, WY: WrapMode> ImageAccessorWrap<'a, O, WX, WY> {
    pub fn new(rbuf: RowAccessor<'a>) -> Self {
        Self {
            rbuf,
            x: 0,
            wrap_x: WX::new(rbuf.width()),
            wrap_y: WY::new(rbuf.height()),
            row_y: 0,
            order: PhantomData,
        }
    }

    #[inline]
    fn pixel(&self, wx: u32) -> &'a [u8] {
        pixel_at::<O>(self.rbuf.row_slice(self.row_y as i32), wx as i32)
    }
}

impl<'a, O: PixelOrder, WX: WrapMode, WY: WrapMode> ImageSource
    for ImageAccessorWrap<'a, O, WX, WY>
{
    type Order = O;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }
    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn span(&mut self, x: i32, y: i32, _len: u32) -> &[u8] {
        self.x = x;
        self.row_y = self.wrap_y.func(y);
        let wx = self.wrap_x.func(x);
        self.pixel(wx)
    }

    fn next_x(&mut self) -> &[u8] {
        let wx = self.wrap_x.inc();
        self.pixel(wx)
    }

    fn next_y(&mut self) -> &[u8] {
        self.row_y = self.wrap_y.inc();
        let wx = self.wrap_x.func(self.x);
        self.pixel(wx)
    }

    fn row_ptr(&self, y: i32) -> &[u8] {
        self.rbuf.row_slice(y)
    }
}

// ============================================================================
// Tests
// ============================================================================
