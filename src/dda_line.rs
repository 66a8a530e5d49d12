//! Integer DDA used to step fixed-point values across a span.
//!
//! The interpolators transform only a span's endpoints and walk the
//! values in between with this, so it must land exactly on the end value
//! after `count` steps.

// ============================================================================
// DDA2 line interpolator (Bresenham-style integer)
// ============================================================================

/// Integer DDA distributing the rounding remainder evenly across steps.
///
/// Works in 64 bits so any pair of `i32` end points is accepted.
#[derive(Debug, Clone, Copy)]
pub struct Dda2LineInterpolator {
    cnt: i64,
    lft: i64,
    rem: i64,
    mod_val: i64,
    y: i64,
}

impl Dda2LineInterpolator {
    /// Walk from `y1` to `y2` in `count` steps. A non-positive count is
    /// treated as one step.
    pub fn new(y1: i32, y2: i32, count: i32) -> Self {
        let cnt = count.max(1) as i64;
        let delta = y2 as i64 - y1 as i64;
        let mut lft = delta / cnt;
        let mut rem = delta % cnt;
        let mut mod_val = rem;

        if mod_val <= 0 {
            mod_val += cnt;
            rem += cnt;
            lft -= 1;
        }
        mod_val -= cnt;

        Self {
            cnt,
            lft,
            rem,
            mod_val,
            y: y1 as i64,
        }
    }

    /// Step forward one unit.
    #[inline]
    pub fn inc(&mut self) {
        self.mod_val += self.rem;
        self.y += self.lft;
        if self.mod_val > 0 {
            self.mod_val -= self.cnt;
            self.y += 1;
        }
    }

    /// Current value. Stepping past the end point saturates at the `i32`
    /// range.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}
