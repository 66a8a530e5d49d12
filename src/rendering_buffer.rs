//! Rendering buffer: row-oriented, read-only access to source pixels.
//!
//! Supports positive strides (top-down) and negative strides (bottom-up,
//! e.g. BMP data), like the frame buffers it is usually read from.

use crate::error::SpanError;

// ============================================================================
// RowAccessor
// ============================================================================

/// Borrowed view of a rectangular pixel buffer.
///
/// Row `y` starts at `y * stride` for positive strides and at
/// `(height - 1 - y) * |stride|` for negative ones.
#[derive(Debug, Clone, Copy)]
pub struct RowAccessor<'a> {
    buf: &'a [u8],
    width: u32,
    height: u32,
    stride: i32,
}

impl<'a> RowAccessor<'a> {
    /// Attach to `buf`. `width` is in pixels, `stride` in bytes.
    pub fn new(buf: &'a [u8], width: u32, height: u32, stride: i32) -> Result<Self, SpanError> {
        if stride == 0 && height > 1 {
            return Err(SpanError::ZeroStride { height });
        }
        let needed = stride.unsigned_abs() as usize * height as usize;
        if buf.len() < needed {
            return Err(SpanError::BufferTooSmall {
                len: buf.len(),
                height,
                stride,
            });
        }
        Ok(Self {
            buf,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> i32 {
        self.stride
    }

    pub fn stride_abs(&self) -> usize {
        self.stride.unsigned_abs() as usize
    }

    /// Bytes of row `y`, or an empty slice when `y` is outside the image.
    #[inline]
    pub fn row_slice(&self, y: i32) -> &'a [u8] {
        if y < 0 || y as u32 >= self.height {
            return &[];
        }
        let row = if self.stride < 0 {
            self.height - 1 - y as u32
        } else {
            y as u32
        };
        let start = row as usize * self.stride_abs();
        &self.buf[start..start + self.stride_abs()]
    }
}
