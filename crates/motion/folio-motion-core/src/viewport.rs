//! Viewport triggers: turn discrete visibility crossings into variant requests.
//!
//! The host owns the actual observation (an intersection observer, a layout
//! pass, a scroll callback) and reports [`IntersectionEntry`](crate::inputs::IntersectionEntry)
//! values. Nothing here polls; a trigger only reacts to the entries it is handed.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Axis-aligned box in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        Rect::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }
}

/// Fraction of `element` that lies inside `viewport`, in [0, 1].
pub fn intersection_ratio(element: &Rect, viewport: &Rect) -> f32 {
    let area = element.area();
    if area.is_nan() || area <= 0.0 {
        return 0.0;
    }
    (element.intersect(viewport).area() / area).clamp(0.0, 1.0)
}

/// Per-node viewport binding supplied at mount time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InViewConfig {
    /// Label requested on enter; falls back to `Config::visible_label`.
    pub visible: Option<String>,
    /// Label requested on exit; falls back to `Config::hidden_label`.
    pub hidden: Option<String>,
    /// Fire once and stop observing.
    pub once: bool,
    /// Visible fraction needed to count as "in view".
    pub amount: f32,
}

impl InViewConfig {
    pub fn once() -> Self {
        Self {
            once: true,
            ..Self::default()
        }
    }
}

/// What a trigger decided for one reported entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Crossing {
    /// Became visible; request `label`. `release` means stop observing now.
    Enter { label: String, release: bool },
    /// Became hidden; request `label`.
    Exit { label: String },
}

#[derive(Clone, Debug)]
pub struct ViewportTrigger {
    pub target: NodeId,
    pub threshold: f32,
    pub once: bool,
    has_fired: bool,
    observing: bool,
    visible: bool,
    visible_label: String,
    hidden_label: String,
}

impl ViewportTrigger {
    pub fn new(
        target: NodeId,
        cfg: &InViewConfig,
        default_visible: &str,
        default_hidden: &str,
    ) -> Self {
        let threshold = if cfg.amount.is_finite() {
            cfg.amount.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            target,
            threshold,
            once: cfg.once,
            has_fired: false,
            observing: true,
            visible: false,
            visible_label: cfg
                .visible
                .clone()
                .unwrap_or_else(|| default_visible.to_string()),
            hidden_label: cfg
                .hidden
                .clone()
                .unwrap_or_else(|| default_hidden.to_string()),
        }
    }

    #[inline]
    pub fn has_fired(&self) -> bool {
        self.has_fired
    }

    #[inline]
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn counts_as_visible(&self, ratio: f32) -> bool {
        ratio.is_finite() && ratio > 0.0 && ratio >= self.threshold
    }

    /// Feed the latest visible ratio. Returns a crossing only when the
    /// visibility state actually changes.
    pub fn observe(&mut self, ratio: f32) -> Option<Crossing> {
        if !self.observing {
            return None;
        }
        let now_visible = self.counts_as_visible(ratio);
        if now_visible == self.visible {
            return None;
        }
        self.visible = now_visible;
        if now_visible {
            if self.once && self.has_fired {
                return None;
            }
            if self.once {
                self.has_fired = true;
                self.observing = false;
            }
            Some(Crossing::Enter {
                label: self.visible_label.clone(),
                release: self.once,
            })
        } else if self.once {
            None
        } else {
            Some(Crossing::Exit {
                label: self.hidden_label.clone(),
            })
        }
    }

    /// Stop observing for good (node unmounted).
    pub fn release(&mut self) {
        self.observing = false;
    }
}
