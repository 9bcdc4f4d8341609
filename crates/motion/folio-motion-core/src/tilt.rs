//! Pointer tilt: element-local pointer position -> rotateX/rotateY spring targets.
//!
//! Pointer coordinates are normalized to `[-0.5, 0.5]` on both axes, origin
//! at the element centre. Moving right turns the element around Y; moving
//! down tips it back around X.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::SpringConfig;
use crate::error::{MotionError, Result};
use crate::ids::NodeId;
use crate::inputs::PointerInput;

pub const ROTATE_X: &str = "rotateX";
pub const ROTATE_Y: &str = "rotateY";

pub const DEFAULT_TILT_DEGREES: f32 = 17.5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TiltConfig {
    /// Rotation at the element edge, in degrees.
    pub max_degrees: f32,
    /// Spring override; `Config::spring` when absent.
    pub spring: Option<SpringConfig>,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_degrees: DEFAULT_TILT_DEGREES,
            spring: None,
        }
    }
}

impl TiltConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.max_degrees.is_finite() {
            return Err(MotionError::InvalidConfig {
                field: "tilt maxDegrees".into(),
                reason: format!("must be finite, got {}", self.max_degrees),
            });
        }
        match &self.spring {
            Some(spring) => spring.validate(),
            None => Ok(()),
        }
    }
}

/// `(rotateX, rotateY)` targets in degrees for a pointer at `(x, y)`.
pub fn tilt_targets(x: f32, y: f32, max_degrees: f32) -> Result<(f32, f32)> {
    for (axis, v) in [("pointer x", x), ("pointer y", y)] {
        if !v.is_finite() {
            return Err(MotionError::InvalidValue {
                property: axis.into(),
                value: v,
            });
        }
    }
    let x = x.clamp(-0.5, 0.5);
    let y = y.clamp(-0.5, 0.5);
    Ok((-y * 2.0 * max_degrees, x * 2.0 * max_degrees))
}

/// Keeps only the most recent pointer input per node until drained.
#[derive(Debug, Default)]
pub(crate) struct PointerCoalescer {
    latest: IndexMap<NodeId, PointerInput>,
}

impl PointerCoalescer {
    pub(crate) fn push(&mut self, input: PointerInput) {
        self.latest.insert(input.node(), input);
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = PointerInput> + '_ {
        self.latest.drain(..).map(|(_, input)| input)
    }
}
