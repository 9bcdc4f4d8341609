//! Keyframe sampling.
//!
//! Model:
//! - A property path is an ordered list of values with normalized stamps in
//!   [0,1] (explicit `times`, or evenly spaced).
//! - Each segment [Pi -> P(i+1)] is eased independently, then blended linearly.
//!
//! API:
//! - sample_keyframes(values, times, ease, u) where u is normalized progress.

use crate::interp::functions::lerp_f32;
use crate::interp::Ease;

/// Find the segment [i, i+1] that contains normalized time u, and return (i, i+1, local_t).
/// - If u <= first stamp, returns (0, 0, 0).
/// - If u >= last stamp, returns (last, last, 0).
fn find_segment(stamps: &[f32], u: f32) -> (usize, usize, f32) {
    let n = stamps.len();
    if n <= 1 || u <= stamps[0] {
        return (0, 0, 0.0);
    }
    if u >= stamps[n - 1] {
        return (n - 1, n - 1, 0.0);
    }
    for i in 0..(n - 1) {
        let t0 = stamps[i];
        let t1 = stamps[i + 1];
        if u >= t0 && u <= t1 {
            let denom = (t1 - t0).max(f32::EPSILON);
            return (i, i + 1, ((u - t0) / denom).clamp(0.0, 1.0));
        }
    }
    (n - 1, n - 1, 0.0)
}

fn even_stamps(n: usize) -> Vec<f32> {
    if n <= 1 {
        return vec![0.0; n];
    }
    let last = (n - 1) as f32;
    (0..n).map(|i| i as f32 / last).collect()
}

/// Sample a keyframe path at normalized progress `u`.
///
/// `times` is only honoured when it has one stamp per value.
pub fn sample_keyframes(values: &[f32], times: Option<&[f32]>, ease: Ease, u: f32) -> f32 {
    match values.len() {
        // Fail-soft: nothing to sample.
        0 => 0.0,
        1 => values[0],
        n => {
            let owned;
            let stamps = match times {
                Some(t) if t.len() == n => t,
                _ => {
                    owned = even_stamps(n);
                    &owned
                }
            };
            let (i0, i1, lt) = find_segment(stamps, u.clamp(0.0, 1.0));
            if i0 == i1 {
                return values[i0];
            }
            lerp_f32(values[i0], values[i1], ease.evaluate(lt))
        }
    }
}
