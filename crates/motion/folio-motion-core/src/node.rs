//! Animation nodes: one per animated element.
//!
//! A node owns its motion values and its in-flight property tracks. Tree
//! links are plain ids into the engine's arena: `children` is the owning,
//! ordered relation; `parent` is a lookup-only back reference.
//!
//! Labels live in three layers, `Base < Hover < Tap`. Each property follows
//! the highest active layer whose variant defines it. A property no active
//! layer defines eases back to its base target: the initial pose, or the
//! resting value it had when first bound.
//!
//! States: `Initial -> Animating -> Settled`, with `Animating -> Animating`
//! whenever a layer changes before the previous tracks settle. Repeating
//! tracks jump straight to the iteration containing the current clock.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::{Keyframes, Repeat, RepeatMode, Transition, Variant};
use crate::ids::{NodeId, ValueId};
use crate::sampling::sample_keyframes;
use crate::tilt::TiltConfig;
use crate::value::{default_value, MotionValues};
use crate::viewport::InViewConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Posed by the initial label; no trigger has fired yet.
    Initial,
    Animating,
    Settled,
}

/// Trigger bindings and variant scope for one element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeConfig {
    /// Debug label for logs.
    pub name: Option<String>,
    /// Variant set this node resolves labels in. `None` makes the node a
    /// pass-through that only forwards labels to its children.
    pub scope: Option<String>,
    /// Pose applied instantly on mount. Inherited from the parent when unset.
    pub initial: Option<String>,
    /// Requested on the first tick after mount.
    pub animate: Option<String>,
    pub in_view: Option<InViewConfig>,
    pub hover: Option<String>,
    pub tap: Option<String>,
    /// Follow labels fanned out by the parent. Defaults to true unless the
    /// node drives itself through `animate` or `in_view`.
    pub inherit: Option<bool>,
    pub tilt: Option<TiltConfig>,
}

impl NodeConfig {
    pub fn scoped(scope: &str) -> Self {
        Self {
            scope: Some(scope.to_string()),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn initial(mut self, label: &str) -> Self {
        self.initial = Some(label.to_string());
        self
    }

    pub fn animate(mut self, label: &str) -> Self {
        self.animate = Some(label.to_string());
        self
    }

    pub fn in_view(mut self, cfg: InViewConfig) -> Self {
        self.in_view = Some(cfg);
        self
    }

    pub fn hover(mut self, label: &str) -> Self {
        self.hover = Some(label.to_string());
        self
    }

    pub fn tap(mut self, label: &str) -> Self {
        self.tap = Some(label.to_string());
        self
    }

    pub fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = Some(inherit);
        self
    }

    pub fn tilt(mut self, tilt: TiltConfig) -> Self {
        self.tilt = Some(tilt);
        self
    }

    pub(crate) fn inherits_by_default(&self) -> bool {
        self.inherit
            .unwrap_or(self.animate.is_none() && self.in_view.is_none())
    }
}

/// Where a label came from. Only direct requests complain about a label
/// missing from the node's scope; inherited and gesture labels pass
/// through as identity so they still reach the children.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RequestSource {
    Direct,
    Inherited,
    Gesture,
}

/// Label layers in ascending priority.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// `initial`, `animate`, viewport and explicit requests.
    Base,
    Hover,
    Tap,
}

impl Layer {
    const BY_PRIORITY: [Layer; 3] = [Layer::Tap, Layer::Hover, Layer::Base];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug)]
struct ActiveLabel {
    label: String,
    variant: Arc<Variant>,
}

/// Which layer's variant currently drives a property.
#[derive(Clone, Debug)]
struct Driver {
    layer: Layer,
    variant: Arc<Variant>,
}

impl Driver {
    fn same(&self, other: &Driver) -> bool {
        self.layer == other.layer && Arc::ptr_eq(&self.variant, &other.variant)
    }
}

/// Outcome of advancing one track.
enum Step {
    Running,
    Repeated(u32),
    Done,
}

#[derive(Debug)]
struct PropertyTrack {
    property: String,
    value: ValueId,
    path: Vec<f32>,
    transition: Transition,
    /// Clock time the current iteration (including its delay) began.
    iteration_start: f64,
    iteration: u32,
    reversed: bool,
}

impl PropertyTrack {
    fn new(property: &str, value: ValueId, path: Vec<f32>, transition: Transition, now: f64) -> Self {
        Self {
            property: property.to_string(),
            value,
            path,
            transition,
            iteration_start: now,
            iteration: 0,
            reversed: false,
        }
    }

    fn write(&self, u: f32, values: &mut MotionValues) {
        let t = &self.transition;
        let u = if self.reversed { 1.0 - u } else { u };
        let v = sample_keyframes(&self.path, t.times.as_deref(), t.ease, u);
        // Keyframes were validated at registration; a rejection is logged by the store.
        let _ = values.set(self.value, v);
    }

    /// Sample at clock time `now`. Whole iterations that fit between the
    /// last sample and `now` are skipped arithmetically.
    fn advance(&mut self, now: f64, values: &mut MotionValues) -> Step {
        let t = &self.transition;
        let duration = t.duration as f64;
        let delay = if self.iteration == 0 { t.delay as f64 } else { 0.0 };
        let active_start = self.iteration_start + delay;
        let local = now - active_start;
        if local < 0.0 {
            return Step::Running;
        }
        if local < duration {
            self.write((local / duration) as f32, values);
            return Step::Running;
        }
        let period = duration + t.repeat_delay as f64;
        let left = match t.repeat {
            Repeat::Count(n) => n.saturating_sub(self.iteration),
            Repeat::Infinite if period > 0.0 => u32::MAX,
            Repeat::Infinite => 0,
        };
        let skip = if period > 0.0 {
            (local / period).floor()
        } else {
            f64::INFINITY
        };
        let ping_pong = t.repeat_mode == RepeatMode::PingPong;
        if left == 0 || skip > left as f64 {
            // Every remaining iteration has already ended.
            if ping_pong && left % 2 == 1 {
                self.reversed = !self.reversed;
            }
            self.iteration = self.iteration.saturating_add(left);
            self.write(1.0, values);
            return Step::Done;
        }
        if skip < 1.0 {
            // Between iterations, holding the end value.
            self.write(1.0, values);
            return Step::Running;
        }
        let n = skip as u32;
        if ping_pong && n % 2 == 1 {
            self.reversed = !self.reversed;
        }
        self.iteration = self.iteration.saturating_add(n);
        self.iteration_start = active_start + skip * period;
        let local = now - self.iteration_start;
        let u = if local < duration { (local / duration) as f32 } else { 1.0 };
        self.write(u, values);
        Step::Repeated(self.iteration)
    }
}

#[derive(Debug)]
struct Playback {
    label: String,
    tracks: Vec<PropertyTrack>,
}

/// Result of advancing a node's playback to the current clock.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Progress {
    Idle,
    Running,
    Repeated(u32),
    Completed(String),
}

#[derive(Debug)]
pub struct AnimationNode {
    id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    config: NodeConfig,
    inherit: bool,
    state: NodeState,
    pub(crate) initial_label: Option<String>,
    layers: [Option<ActiveLabel>; 3],
    values: IndexMap<String, ValueId>,
    /// Value a property returns to when no active layer defines it.
    base_targets: IndexMap<String, f32>,
    drivers: IndexMap<String, Driver>,
    playback: Option<Playback>,
}

impl AnimationNode {
    pub(crate) fn new(
        id: NodeId,
        parent: Option<NodeId>,
        config: NodeConfig,
        inherit: bool,
        initial_label: Option<String>,
    ) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            config,
            inherit,
            state: NodeState::Initial,
            initial_label,
            layers: [None, None, None],
            values: IndexMap::new(),
            base_targets: IndexMap::new(),
            drivers: IndexMap::new(),
            playback: None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    #[inline]
    pub fn scope(&self) -> Option<&str> {
        self.config.scope.as_deref()
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    pub fn inherits(&self) -> bool {
        self.inherit
    }

    fn top(&self) -> Option<&ActiveLabel> {
        Layer::BY_PRIORITY
            .iter()
            .find_map(|l| self.layers[l.index()].as_ref())
    }

    /// Label on the highest active layer.
    pub fn requested_variant(&self) -> Option<&str> {
        self.top().map(|a| a.label.as_str())
    }

    pub fn resolved_variant(&self) -> Option<&Arc<Variant>> {
        self.top().map(|a| &a.variant)
    }

    /// Label held on `layer`, if any.
    pub fn layer_label(&self, layer: Layer) -> Option<&str> {
        self.layers[layer.index()].as_ref().map(|a| a.label.as_str())
    }

    /// Property names bound on this node, in binding order.
    pub fn values(&self) -> impl Iterator<Item = (&str, ValueId)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn value_id(&self, property: &str) -> Option<ValueId> {
        self.values.get(property).copied()
    }

    /// True while any track (including a pending delay) is in flight.
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    pub fn is_hovered(&self) -> bool {
        self.layers[Layer::Hover.index()].is_some()
    }

    pub fn is_pressed(&self) -> bool {
        self.layers[Layer::Tap.index()].is_some()
    }

    /// Bind `property` to a motion value, creating it at its resting value.
    pub(crate) fn bind_value(&mut self, property: &str, values: &mut MotionValues) -> ValueId {
        if let Some(id) = self.values.get(property) {
            return *id;
        }
        let rest = default_value(property);
        let id = values.create(self.id, property, rest);
        self.values.insert(property.to_string(), id);
        self.base_targets.entry(property.to_string()).or_insert(rest);
        id
    }

    /// Snap every property to the variant's final keyframe without animating.
    /// The posed values become the properties' base targets.
    pub(crate) fn apply_pose(&mut self, label: &str, variant: Arc<Variant>, values: &mut MotionValues) {
        for (property, frames) in &variant.keyframes {
            let id = self.bind_value(property, values);
            if let Some(v) = frames.last() {
                let _ = values.set(id, v);
                self.base_targets.insert(property.clone(), v);
            }
            self.drivers.insert(
                property.clone(),
                Driver {
                    layer: Layer::Base,
                    variant: variant.clone(),
                },
            );
        }
        self.layers[Layer::Base.index()] = Some(ActiveLabel {
            label: label.to_string(),
            variant,
        });
        self.state = NodeState::Initial;
    }

    /// Put `active` on `layer` (or clear it) and retarget every property
    /// whose driving layer changed. Single targets start from the current
    /// value so nothing snaps.
    pub(crate) fn set_layer(
        &mut self,
        layer: Layer,
        active: Option<(&str, Arc<Variant>)>,
        now: f64,
        values: &mut MotionValues,
    ) {
        // Properties that fall back to their base target move with the
        // timing of whichever variant caused the change.
        let fallback = match (&active, &self.layers[layer.index()]) {
            (Some((_, v)), _) => settle_transition(&v.transition),
            (None, Some(old)) => settle_transition(&old.variant.transition),
            (None, None) => Transition::default(),
        };
        self.layers[layer.index()] = active.map(|(label, variant)| ActiveLabel {
            label: label.to_string(),
            variant,
        });

        let mut properties: Vec<String> = self.values.keys().cloned().collect();
        for held in self.layers.iter().flatten() {
            for property in held.variant.keyframes.keys() {
                if !properties.contains(property) {
                    properties.push(property.clone());
                }
            }
        }

        let mut tracks = self.playback.take().map(|pb| pb.tracks).unwrap_or_default();
        for property in properties {
            let winner = Layer::BY_PRIORITY.iter().find_map(|&l| {
                let held = self.layers[l.index()].as_ref()?;
                held.variant.keyframes.contains_key(&property).then(|| Driver {
                    layer: l,
                    variant: held.variant.clone(),
                })
            });
            let unchanged = match (&winner, self.drivers.get(&property)) {
                (Some(new), Some(old)) => new.same(old),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                continue;
            }
            tracks.retain(|t| t.property != property);
            let value = self.bind_value(&property, values);
            let from = values
                .current(value)
                .unwrap_or_else(|| default_value(&property));
            let (path, transition) = match &winner {
                Some(driver) => match driver.variant.keyframes.get(&property) {
                    Some(Keyframes::Sequence(seq)) => (seq.clone(), driver.variant.transition.clone()),
                    Some(Keyframes::Single(target)) => (vec![from, *target], driver.variant.transition.clone()),
                    None => continue,
                },
                None => {
                    let rest = self
                        .base_targets
                        .get(&property)
                        .copied()
                        .unwrap_or_else(|| default_value(&property));
                    log::trace!("{:?} '{property}' returns to {rest}", self.id);
                    (vec![from, rest], fallback.clone())
                }
            };
            tracks.push(PropertyTrack::new(&property, value, path, transition, now));
            match winner {
                Some(driver) => {
                    self.drivers.insert(property, driver);
                }
                None => {
                    self.drivers.shift_remove(&property);
                }
            }
        }

        self.state = NodeState::Animating;
        self.playback = Some(Playback {
            label: self.requested_variant().unwrap_or_default().to_string(),
            tracks,
        });
    }

    /// Sample every track at clock time `now`. The node settles once the
    /// last track finishes.
    pub(crate) fn advance(&mut self, now: f64, values: &mut MotionValues) -> Progress {
        let Some(pb) = self.playback.as_mut() else {
            return Progress::Idle;
        };
        let mut repeated: Option<u32> = None;
        pb.tracks.retain_mut(|track| match track.advance(now, values) {
            Step::Running => true,
            Step::Repeated(i) => {
                repeated = Some(repeated.map_or(i, |r| r.max(i)));
                true
            }
            Step::Done => false,
        });
        if !pb.tracks.is_empty() {
            return repeated.map_or(Progress::Running, Progress::Repeated);
        }
        let label = std::mem::take(&mut pb.label);
        self.playback = None;
        self.state = NodeState::Settled;
        Progress::Completed(label)
    }

    /// Drop playback and destroy every motion value. Returns subscribers cleared.
    pub(crate) fn teardown(&mut self, values: &mut MotionValues) -> usize {
        self.playback = None;
        self.drivers.clear();
        self.base_targets.clear();
        self.values
            .drain(..)
            .map(|(_, id)| values.destroy(id).unwrap_or(0))
            .sum()
    }
}

/// One pass with no repeats and no keyframe times.
fn settle_transition(t: &Transition) -> Transition {
    Transition {
        repeat: Repeat::Count(0),
        times: None,
        ..t.clone()
    }
}
