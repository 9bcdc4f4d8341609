//! Spring interpolation toward a moving target.
//!
//! Semi-implicit Euler on a damped harmonic oscillator:
//!
//! ```text
//! velocity' = velocity + (stiffness * (target - value) - damping * velocity) * dt
//! value'    = value + velocity' * dt
//! ```
//!
//! A spring goes idle once it is within `rest_delta` of its target and slower
//! than `rest_speed`; idle springs cost nothing per tick until retargeted.

use crate::config::SpringConfig;
use crate::error::{MotionError, Result};
use crate::ids::ValueId;
use crate::value::MotionValues;

#[derive(Clone, Debug, PartialEq)]
pub struct Spring {
    pub target: f32,
    pub value: f32,
    pub velocity: f32,
    cfg: SpringConfig,
    idle: bool,
}

impl Spring {
    /// A spring resting at `value`.
    pub fn new(value: f32, cfg: SpringConfig) -> Self {
        Self {
            target: value,
            value,
            velocity: 0.0,
            cfg,
            idle: true,
        }
    }

    #[inline]
    pub fn config(&self) -> &SpringConfig {
        &self.cfg
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Move the target. Value and velocity carry over so the motion stays continuous.
    pub fn set_target(&mut self, target: f32) -> Result<()> {
        if !target.is_finite() {
            return Err(MotionError::InvalidValue {
                property: "spring target".into(),
                value: target,
            });
        }
        if target != self.target {
            self.target = target;
            self.idle = false;
        }
        Ok(())
    }

    /// Integrate by `dt` seconds. Returns the new value, or None while idle.
    ///
    /// Sub-steps never exceed `1 / (damping + sqrt(stiffness))`, which keeps
    /// stiff or heavily damped springs from overshooting numerically. At most
    /// [`MAX_SUBSTEPS`] are taken per call; any remainder of `dt` is dropped.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        if self.idle || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        let h_max = stable_step(&self.cfg).unwrap_or(dt);
        let wanted = (dt / h_max).ceil().max(1.0);
        let (steps, h) = if wanted > MAX_SUBSTEPS as f32 {
            log::trace!(
                "spring step of {dt}s capped at {MAX_SUBSTEPS} x {h_max}s; {}s dropped",
                dt - MAX_SUBSTEPS as f32 * h_max
            );
            (MAX_SUBSTEPS, h_max)
        } else {
            let steps = wanted as u32;
            (steps, dt / steps as f32)
        };
        for _ in 0..steps {
            let force =
                self.cfg.stiffness * (self.target - self.value) - self.cfg.damping * self.velocity;
            self.velocity += force * h;
            self.value += self.velocity * h;
        }
        if !self.value.is_finite() || !self.velocity.is_finite() {
            log::warn!("spring diverged with {:?}; snapping to {}", self.cfg, self.target);
            self.value = self.target;
            self.velocity = 0.0;
            self.idle = true;
            return Some(self.value);
        }
        if (self.target - self.value).abs() < self.cfg.rest_delta
            && self.velocity.abs() < self.cfg.rest_speed
        {
            log::trace!("spring settled at {}", self.target);
            self.value = self.target;
            self.velocity = 0.0;
            self.idle = true;
        }
        Some(self.value)
    }
}

/// Upper bound on integration sub-steps per tick.
pub const MAX_SUBSTEPS: u32 = 256;

/// Largest sub-step for `cfg`, or None when the parameters give no usable bound.
fn stable_step(cfg: &SpringConfig) -> Option<f32> {
    let stiff = 1.0 / (cfg.damping.max(0.0) + cfg.stiffness.max(0.0).sqrt());
    let h = match (cfg.max_step.is_finite() && cfg.max_step > 0.0, stiff.is_finite()) {
        (true, true) => cfg.max_step.min(stiff),
        (true, false) => cfg.max_step,
        (false, true) => stiff,
        (false, false) => return None,
    };
    (h > 0.0).then_some(h)
}

/// A spring that writes into a motion value.
#[derive(Clone, Debug)]
pub struct BoundSpring {
    pub value: ValueId,
    pub spring: Spring,
}

impl BoundSpring {
    pub fn new(value: ValueId, spring: Spring) -> Self {
        Self { value, spring }
    }

    /// Step the spring and push its output. Returns false if it was idle.
    pub fn tick(&mut self, dt: f32, values: &mut MotionValues) -> bool {
        match self.spring.tick(dt) {
            Some(v) => {
                // A rejected write is already logged by the store.
                let _ = values.set(self.value, v);
                true
            }
            None => false,
        }
    }
}
