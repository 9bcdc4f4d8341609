//! Input contracts for the core engine.
//!
//! Hosts collect everything that happened since the last frame into one
//! [`Inputs`] value and pass it to `MotionEngine::update()` each tick.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::viewport::{intersection_ratio, Rect};

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Explicit variant requests, applied in order.
    #[serde(default)]
    pub requests: Vec<VariantRequest>,
    /// Hover/tap transitions, applied in order.
    #[serde(default)]
    pub gestures: Vec<GestureEvent>,
    /// Visibility reports; only the last one per node counts.
    #[serde(default)]
    pub intersections: Vec<IntersectionEntry>,
    /// Pointer samples; only the last one per node counts.
    #[serde(default)]
    pub pointer: Vec<PointerInput>,
}

impl Inputs {
    pub fn request(mut self, node: NodeId, variant: &str) -> Self {
        self.requests.push(VariantRequest {
            node,
            variant: variant.to_string(),
        });
        self
    }

    pub fn gesture(mut self, node: NodeId, kind: GestureKind) -> Self {
        self.gestures.push(GestureEvent { node, kind });
        self
    }

    pub fn intersection(mut self, node: NodeId, ratio: f32) -> Self {
        self.intersections.push(IntersectionEntry { node, ratio });
        self
    }

    pub fn pointer_move(mut self, node: NodeId, x: f32, y: f32) -> Self {
        self.pointer.push(PointerInput::Move { node, x, y });
        self
    }

    pub fn pointer_leave(mut self, node: NodeId) -> Self {
        self.pointer.push(PointerInput::Leave { node });
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantRequest {
    pub node: NodeId,
    pub variant: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureKind {
    HoverStart,
    HoverEnd,
    TapStart,
    TapEnd,
    TapCancel,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub node: NodeId,
    pub kind: GestureKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub node: NodeId,
    /// Visible fraction of the element, in [0, 1].
    pub ratio: f32,
}

impl IntersectionEntry {
    pub fn from_bounds(node: NodeId, element: &Rect, viewport: &Rect) -> Self {
        Self {
            node,
            ratio: intersection_ratio(element, viewport),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerInput {
    /// Element-local position, each axis in [-0.5, 0.5].
    Move { node: NodeId, x: f32, y: f32 },
    Leave { node: NodeId },
}

impl PointerInput {
    #[inline]
    pub fn node(&self) -> NodeId {
        match *self {
            PointerInput::Move { node, .. } | PointerInput::Leave { node } => node,
        }
    }
}
