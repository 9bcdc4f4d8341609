//! Easing curves and interpolation helpers.
//!
//! Named eases map onto the standard CSS cubic-bezier control points so a
//! variant sheet authored for the web reads the same here.

pub mod functions;

use serde::{Deserialize, Serialize};

use self::functions::bezier_ease_t;

/// Timing curve applied to each keyframe segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ease {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    /// Control points (x1, y1, x2, y2); x values must lie in [0, 1].
    CubicBezier([f32; 4]),
}

impl Ease {
    pub fn control_points(self) -> [f32; 4] {
        match self {
            Ease::Linear => [0.0, 0.0, 1.0, 1.0],
            Ease::EaseIn => [0.42, 0.0, 1.0, 1.0],
            Ease::EaseOut => [0.0, 0.0, 0.58, 1.0],
            Ease::EaseInOut => [0.42, 0.0, 0.58, 1.0],
            Ease::CubicBezier(ctrl) => ctrl,
        }
    }

    /// Map linear progress `t` in [0, 1] to eased progress.
    #[inline]
    pub fn evaluate(self, t: f32) -> f32 {
        let [x1, y1, x2, y2] = self.control_points();
        bezier_ease_t(t, x1, y1, x2, y2)
    }

    pub(crate) fn is_valid(self) -> bool {
        let [x1, y1, x2, y2] = self.control_points();
        [x1, y1, x2, y2].iter().all(|v| v.is_finite())
            && (0.0..=1.0).contains(&x1)
            && (0.0..=1.0).contains(&x2)
    }
}
