//! Folio Motion Core (renderer-agnostic)
//!
//! Declarative, variant-driven animation orchestration for a tree of
//! animated elements. Hosts register named variants, mount nodes, and call
//! [`MotionEngine::update`] once per frame with the gestures, visibility
//! reports and pointer samples gathered since the previous frame. The
//! engine answers with the property values that changed.
//!
//! Rendering, layout and event capture live outside this crate.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod node;
pub mod outputs;
pub mod registry;
pub mod sampling;
pub mod spring;
pub mod stagger;
pub mod stored_variants;
pub mod tilt;
pub mod value;
pub mod viewport;

// Re-exports for consumers (adapters)
pub use config::{BuildMode, Config, SpringConfig};
pub use data::{Keyframes, Repeat, RepeatMode, Transition, Variant, MIN_LOOP_PERIOD};
pub use engine::{MotionEngine, SubscriptionHandle};
pub use error::{MotionError, Result};
pub use ids::{NodeId, SubscriptionId, ValueId};
pub use inputs::{GestureEvent, GestureKind, Inputs, IntersectionEntry, PointerInput, VariantRequest};
pub use interp::Ease;
pub use node::{AnimationNode, Layer, NodeConfig, NodeState};
pub use outputs::{Change, CoreEvent, Outputs};
pub use registry::{scoped_name, VariantRegistry};
pub use sampling::sample_keyframes;
pub use spring::{Spring, MAX_SUBSTEPS};
pub use stagger::{StaggerJob, StaggerScheduler};
pub use stored_variants::{load_variant_sheet_json, parse_variant_sheet_json};
pub use tilt::{tilt_targets, TiltConfig, DEFAULT_TILT_DEGREES, ROTATE_X, ROTATE_Y};
pub use value::{MotionValue, MotionValues, Subscriber};
pub use viewport::{intersection_ratio, InViewConfig, Rect, ViewportTrigger};
