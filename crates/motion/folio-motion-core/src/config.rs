//! Core configuration for folio-motion-core.

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};

/// How configuration errors (unknown variants) are surfaced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Unknown variants are returned as errors from `request`/`update`.
    Development,
    /// Unknown variants are logged and the node falls back to identity.
    Production,
}

impl Default for BuildMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }
}

/// Damped spring parameters plus the thresholds used to decide it has settled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    /// Distance to target under which the spring may settle.
    pub rest_delta: f32,
    /// Speed under which the spring may settle.
    pub rest_speed: f32,
    /// Largest integration step; longer frames are split into sub-steps.
    pub max_step: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 150.0,
            damping: 15.0,
            rest_delta: 0.001,
            rest_speed: 0.01,
            max_step: 1.0 / 120.0,
        }
    }
}

impl SpringConfig {
    /// Stiffness and step must be positive; damping and rest thresholds
    /// non-negative; everything finite.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("stiffness", self.stiffness, true),
            ("maxStep", self.max_step, true),
            ("damping", self.damping, false),
            ("restDelta", self.rest_delta, false),
            ("restSpeed", self.rest_speed, false),
        ];
        for (field, v, strictly_positive) in checks {
            let ok = v.is_finite() && if strictly_positive { v > 0.0 } else { v >= 0.0 };
            if !ok {
                let bound = if strictly_positive { "> 0" } else { ">= 0" };
                return Err(MotionError::InvalidConfig {
                    field: format!("spring {field}"),
                    reason: format!("must be finite and {bound}, got {v}"),
                });
            }
        }
        Ok(())
    }
}

/// Configuration for engine behaviour. Keep this minimal; expand as needed
/// without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub mode: BuildMode,
    /// Default spring for pointer tilt when a node doesn't bring its own.
    pub spring: SpringConfig,
    /// Frame gaps longer than this (seconds) are clamped, e.g. after a tab was hidden.
    pub max_dt: f32,
    /// Maximum events to retain per tick; the rest are dropped with a warning.
    pub max_events_per_tick: usize,
    /// Label requested when a viewport trigger enters.
    pub visible_label: String,
    /// Label requested when a repeatable viewport trigger exits.
    pub hidden_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: BuildMode::default(),
            spring: SpringConfig::default(),
            max_dt: 0.25,
            max_events_per_tick: 1024,
            visible_label: "visible".into(),
            hidden_label: "hidden".into(),
        }
    }
}
