//! Output contracts from the core engine.
//!
//! Outputs carry only the property values that changed this tick, keyed by
//! node and property name, plus a separate list of semantic events.
//! The rendering collaborator applies changes as transforms/opacities.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::node::Layer;

/// One changed property value this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub node: NodeId,
    pub property: String,
    pub value: f32,
}

/// Discrete semantic signals emitted during stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    AnimationStarted {
        node: NodeId,
        variant: String,
    },
    AnimationRepeated {
        node: NodeId,
        variant: String,
        iteration: u32,
    },
    AnimationCompleted {
        node: NodeId,
        variant: String,
    },
    /// A parent's label change reached `child`. `variant` is None when
    /// the parent cleared a gesture layer.
    ChildDispatched {
        parent: NodeId,
        child: NodeId,
        layer: Layer,
        variant: Option<String>,
    },
    ViewportEntered {
        node: NodeId,
    },
    ViewportExited {
        node: NodeId,
    },
    /// The host may disconnect whatever observes this node.
    ViewportReleased {
        node: NodeId,
    },
    Error {
        message: String,
    },
}

/// Outputs returned by MotionEngine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Value written for `node.property` this tick, if any.
    pub fn change_for(&self, node: NodeId, property: &str) -> Option<f32> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.node == node && c.property == property)
            .map(|c| c.value)
    }
}
