//! Interpolation helpers:
//! - lerp_f32 (scalar blend)
//! - bezier_ease_t (CSS-style timing curve; x solved by Newton, bisection as fallback)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One axis of a timing curve with endpoints pinned at 0 and 1.
#[inline]
fn curve(a1: f32, a2: f32, s: f32) -> f32 {
    let r = 1.0 - s;
    3.0 * r * r * s * a1 + 3.0 * r * s * s * a2 + s * s * s
}

#[inline]
fn curve_slope(a1: f32, a2: f32, s: f32) -> f32 {
    let r = 1.0 - s;
    3.0 * r * r * a1 + 6.0 * r * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
}

/// Eased progress for linear progress `t` under control points
/// `(x1, y1)`, `(x2, y2)`. x1 and x2 must lie in [0, 1].
pub fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    // Control points on the diagonal give the identity curve.
    if (x1 == y1 && x2 == y2) || t == 0.0 || t == 1.0 {
        return t;
    }
    let mut s = t;
    for _ in 0..8 {
        let err = curve(x1, x2, s) - t;
        if err.abs() < 1e-6 {
            return curve(y1, y2, s);
        }
        let slope = curve_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - err / slope).clamp(0.0, 1.0);
    }
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    s = t;
    for _ in 0..32 {
        let x = curve(x1, x2, s);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = 0.5 * (lo + hi);
    }
    curve(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_control_points_are_identity() {
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert_eq!(bezier_ease_t(t, 0.0, 0.0, 1.0, 1.0), t);
            assert_eq!(bezier_ease_t(t, 0.3, 0.3, 0.6, 0.6), t);
        }
    }

    #[test]
    fn ease_in_out_is_symmetric_and_pinned() {
        let at = |t| bezier_ease_t(t, 0.42, 0.0, 0.58, 1.0);
        assert_eq!(at(0.0), 0.0);
        assert_eq!(at(1.0), 1.0);
        assert!((at(0.5) - 0.5).abs() < 1e-3);
        assert!((at(0.2) + at(0.8) - 1.0).abs() < 1e-3);
        assert!(at(0.2) < 0.2);
    }

    #[test]
    fn flat_start_falls_back_to_bisection() {
        // x'(0) = 0 for x1 = 0, so Newton can stall near t = 0.
        let y = bezier_ease_t(1e-4, 0.0, 0.0, 0.58, 1.0);
        assert!(y.is_finite() && (0.0..=1.0).contains(&y));
        let mut last = 0.0;
        for i in 1..=100 {
            let v = bezier_ease_t(i as f32 / 100.0, 0.0, 0.0, 0.58, 1.0);
            assert!(v >= last - 1e-5);
            last = v;
        }
    }
}
