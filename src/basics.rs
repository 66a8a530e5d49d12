//! Rounding helpers and integer math shared by every span stage.
//!
//! All fixed-point stages round the same way, so the helpers live here
//! rather than next to each consumer.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round a double to the nearest unsigned integer (round half up).
/// Negative input saturates to zero.
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

/// Floor toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Ceiling as an unsigned integer.
#[inline]
pub fn uceil(v: f64) -> u32 {
    v.ceil() as u32
}

// ============================================================================
// Integer square root
// ============================================================================

/// Floor of the square root of `v`.
///
/// Starts from the floating-point estimate and corrects it, so the
/// result is exact over the whole `u64` range.
pub fn isqrt(v: u64) -> u64 {
    if v < 2 {
        return v;
    }
    let mut r = (v as f64).sqrt() as u64;
    while r.checked_mul(r).map_or(true, |sq| sq > v) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).map_or(false, |sq| sq <= v) {
        r += 1;
    }
    r
}

/// `round(sqrt(v))` without going through floating point for the result.
///
/// `(r + 0.5)^2 = r^2 + r + 0.25`, so the root rounds up exactly when
/// `v > r^2 + r`.
#[inline]
pub fn isqrt_round(v: u64) -> u64 {
    let r = isqrt(v);
    if v - r * r > r {
        r + 1
    } else {
        r
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(0.49), 0);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(-1.5), -2);
        assert_eq!(iround(0.0), 0);
    }

    #[test]
    fn test_uround() {
        assert_eq!(uround(0.5), 1);
        assert_eq!(uround(1.49), 1);
        assert_eq!(uround(-3.0), 0);
    }

    #[test]
    fn test_ifloor() {
        assert_eq!(ifloor(1.7), 1);
        assert_eq!(ifloor(-1.7), -2);
        assert_eq!(ifloor(-1.0), -1);
    }

    #[test]
    fn test_uceil() {
        assert_eq!(uceil(1.1), 2);
        assert_eq!(uceil(2.0), 2);
    }

    #[test]
    fn test_isqrt_exact_squares() {
        for r in 0u64..2000 {
            assert_eq!(isqrt(r * r), r);
            if r > 0 {
                assert_eq!(isqrt(r * r - 1), r - 1);
            }
        }
        assert_eq!(isqrt(u64::MAX), u32::MAX as u64);
    }

    #[test]
    fn test_isqrt_round_matches_float() {
        for dx in -40i64..=40 {
            for dy in -40i64..=40 {
                let s = (dx * dx + dy * dy) as u64;
                let expected = ((s as f64).sqrt()).round() as u64;
                assert_eq!(isqrt_round(s), expected, "dx={dx} dy={dy}");
            }
        }
        assert_eq!(isqrt_round(25), 5);
        assert_eq!(isqrt_round(0), 0);
    }
}
