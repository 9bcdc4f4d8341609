//! Declarative animation data: variants, keyframes and transitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::interp::Ease;

/// Shortest accepted period (seconds) for an infinitely repeating variant.
pub const MIN_LOOP_PERIOD: f32 = 0.001;

/// Target for one property: a single value, or a path through several.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keyframes {
    Single(f32),
    Sequence(Vec<f32>),
}

impl Keyframes {
    pub fn values(&self) -> &[f32] {
        match self {
            Keyframes::Single(v) => std::slice::from_ref(v),
            Keyframes::Sequence(seq) => seq,
        }
    }

    /// The resting value once the animation has played through.
    pub fn last(&self) -> Option<f32> {
        self.values().last().copied()
    }
}

impl From<f32> for Keyframes {
    fn from(v: f32) -> Self {
        Keyframes::Single(v)
    }
}

impl From<Vec<f32>> for Keyframes {
    fn from(v: Vec<f32>) -> Self {
        Keyframes::Sequence(v)
    }
}

/// Number of extra iterations after the first one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Repeat {
    Count(u32),
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepeatMode {
    /// Restart from the first keyframe.
    #[default]
    Loop,
    /// Alternate direction every iteration.
    PingPong,
}

/// Timing for a variant. Durations and delays are in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transition {
    pub duration: f32,
    pub delay: f32,
    pub repeat: Repeat,
    pub repeat_mode: RepeatMode,
    pub repeat_delay: f32,
    pub ease: Ease,
    /// Normalized stamps for keyframe sequences; evenly spaced when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<f32>>,
    /// Per-child delay offset when this variant fans out to children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stagger_children: Option<f32>,
    /// Delay before the first child is dispatched.
    pub delay_children: f32,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration: 0.3,
            delay: 0.0,
            repeat: Repeat::default(),
            repeat_mode: RepeatMode::default(),
            repeat_delay: 0.0,
            ease: Ease::default(),
            times: None,
            stagger_children: None,
            delay_children: 0.0,
        }
    }
}

impl Transition {
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat, mode: RepeatMode) -> Self {
        self.repeat = repeat;
        self.repeat_mode = mode;
        self
    }

    pub fn with_stagger(mut self, per_child: f32, delay_children: f32) -> Self {
        self.stagger_children = Some(per_child);
        self.delay_children = delay_children;
        self
    }
}

/// A named, reusable animation definition. Immutable once registered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub keyframes: IndexMap<String, Keyframes>,
    #[serde(default)]
    pub transition: Transition,
}

impl Variant {
    pub fn new() -> Self {
        Self::default()
    }

    /// No keyframes and zero duration: settles on the tick it starts.
    pub fn identity() -> Self {
        Self {
            keyframes: IndexMap::new(),
            transition: Transition::default().with_duration(0.0),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn with(mut self, property: impl Into<String>, target: f32) -> Self {
        self.keyframes
            .insert(property.into(), Keyframes::Single(target));
        self
    }

    pub fn with_sequence(mut self, property: impl Into<String>, frames: &[f32]) -> Self {
        self.keyframes
            .insert(property.into(), Keyframes::Sequence(frames.to_vec()));
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    /// Validate once at registration so playback can trust the data.
    pub fn validate(&self, name: &str) -> Result<()> {
        let fail = |reason: String| {
            Err(MotionError::InvalidVariant {
                name: name.to_string(),
                reason,
            })
        };
        let t = &self.transition;
        for (field, v) in [
            ("duration", t.duration),
            ("delay", t.delay),
            ("repeatDelay", t.repeat_delay),
            ("delayChildren", t.delay_children),
            ("staggerChildren", t.stagger_children.unwrap_or(0.0)),
        ] {
            if !v.is_finite() || v < 0.0 {
                return fail(format!("{field} must be finite and >= 0, got {v}"));
            }
        }
        if t.repeat == Repeat::Infinite && t.duration + t.repeat_delay < MIN_LOOP_PERIOD {
            return fail(format!(
                "infinite repeat needs duration + repeatDelay >= {MIN_LOOP_PERIOD}s"
            ));
        }
        if !t.ease.is_valid() {
            return fail("cubic-bezier x control points must lie in [0,1]".into());
        }
        if let Some(times) = &t.times {
            let mut last = f32::NEG_INFINITY;
            for &stamp in times {
                if !stamp.is_finite() || !(0.0..=1.0).contains(&stamp) {
                    return fail("times must be finite and in [0,1]".into());
                }
                if stamp < last {
                    return fail("times must be non-decreasing".into());
                }
                last = stamp;
            }
        }
        for (property, frames) in &self.keyframes {
            let values = frames.values();
            if values.is_empty() {
                return fail(format!("'{property}' has an empty keyframe list"));
            }
            if values.iter().any(|v| !v.is_finite()) {
                return fail(format!("'{property}' has a non-finite keyframe"));
            }
            if let (Keyframes::Sequence(seq), Some(times)) = (frames, &t.times) {
                if seq.len() != times.len() {
                    return fail(format!(
                        "'{property}' has {} keyframes but {} times",
                        seq.len(),
                        times.len()
                    ));
                }
            }
        }
        Ok(())
    }
}
