//! Error taxonomy for the motion core.
//!
//! Every variant is recovered locally by the engine; callers only see an
//! error where the build mode asks for it (see [`crate::config::BuildMode`]).

use thiserror::Error;

use crate::ids::NodeId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// Non-finite input to a motion value or spring target. The update is dropped.
    #[error("invalid value {value} for '{property}'")]
    InvalidValue { property: String, value: f32 },

    /// Lookup miss in the variant registry.
    #[error("unknown variant '{0}'")]
    UnknownVariant(String),

    /// A variant failed validation at registration time.
    #[error("invalid variant '{name}': {reason}")]
    InvalidVariant { name: String, reason: String },

    #[error("variant '{0}' is already registered")]
    DuplicateVariant(String),

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// No spring is bound to `property` on `node`.
    #[error("no spring bound to '{property}' on {node:?}")]
    Unbound { node: NodeId, property: String },

    /// Something outlived the node that owned it.
    #[error("resource leak after unmounting {node:?}: {detail}")]
    ResourceLeak { node: NodeId, detail: String },

    /// A spring or tilt setting that would make integration blow up.
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("variant sheet parse error: {0}")]
    Parse(String),
}

pub type Result<T, E = MotionError> = std::result::Result<T, E>;
