//! Engine: node arena, variant resolution and the per-frame tick.
//!
//! Methods:
//! - new, registry/registry_mut, mount, unmount, request, subscribe, bind_spring, update
//!
//! `update` runs one tick in a fixed order: queued mount requests, explicit
//! requests, gestures, viewport entries, pointer samples, springs, due stagger
//! dispatches, keyframe playback, then change collection.

use std::sync::Arc;

use hashbrown::HashSet;
use indexmap::IndexMap;

use crate::config::{BuildMode, Config, SpringConfig};
use crate::data::Variant;
use crate::error::{MotionError, Result};
use crate::ids::{IdAllocator, NodeId, SubscriptionId, ValueId};
use crate::inputs::{GestureEvent, GestureKind, Inputs, IntersectionEntry, PointerInput};
use crate::node::{AnimationNode, Layer, NodeConfig, NodeState, Progress, RequestSource};
use crate::outputs::{Change, CoreEvent, Outputs};
use crate::registry::{scoped_name, VariantRegistry};
use crate::spring::{BoundSpring, Spring};
use crate::stagger::{StaggerJob, StaggerScheduler};
use crate::tilt::{tilt_targets, PointerCoalescer, ROTATE_X, ROTATE_Y};
use crate::value::{default_value, MotionValues, Subscriber};
use crate::viewport::{Crossing, ViewportTrigger};

/// Returned by [`MotionEngine::subscribe`]; pass back to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub value: ValueId,
    pub id: SubscriptionId,
}

#[derive(Debug)]
pub struct MotionEngine {
    cfg: Config,
    ids: IdAllocator,
    registry: VariantRegistry,
    identity: Arc<Variant>,
    values: MotionValues,
    nodes: IndexMap<NodeId, AnimationNode>,
    roots: Vec<NodeId>,
    stagger: StaggerScheduler,
    triggers: IndexMap<NodeId, ViewportTrigger>,
    springs: IndexMap<(NodeId, String), BoundSpring>,
    /// Max tilt degrees per pointer-tilt node.
    tilts: IndexMap<NodeId, f32>,
    /// Requests recorded at mount; applied at the start of the next tick.
    queued: Vec<(NodeId, String, RequestSource)>,
    time: f64,
    epoch: u64,
    events: Vec<CoreEvent>,
    outputs: Outputs,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl MotionEngine {
    pub fn new(cfg: Config) -> Self {
        Self::with_registry(cfg, VariantRegistry::new())
    }

    pub fn with_registry(cfg: Config, registry: VariantRegistry) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            registry,
            identity: Arc::new(Variant::identity()),
            values: MotionValues::new(),
            nodes: IndexMap::new(),
            roots: Vec::new(),
            stagger: StaggerScheduler::new(),
            triggers: IndexMap::new(),
            springs: IndexMap::new(),
            tilts: IndexMap::new(),
            queued: Vec::new(),
            time: 0.0,
            epoch: 0,
            events: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut VariantRegistry {
        &mut self.registry
    }

    /// Clock time in seconds, advanced by `update`.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed ticks.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // ---------- tree ----------

    /// Attach a node under `parent` (or as a root).
    ///
    /// The initial pose is applied immediately. An `animate` label, or the
    /// parent's live label for an inheriting child, is requested on the next
    /// tick so subscribers attached right after mounting see the transition.
    pub fn mount(&mut self, parent: Option<NodeId>, cfg: NodeConfig) -> Result<NodeId> {
        if let Some(tilt) = &cfg.tilt {
            tilt.validate()?;
            tilt.spring.unwrap_or(self.cfg.spring).validate()?;
        }
        let (parent_initial, parent_live) = match parent {
            Some(p) => {
                let pn = self.nodes.get(&p).ok_or(MotionError::UnknownNode(p))?;
                let live = match pn.state() {
                    NodeState::Initial => None,
                    _ => pn.layer_label(Layer::Base).map(str::to_string),
                };
                (pn.initial_label.clone(), live)
            }
            None => (None, None),
        };
        let inherit = parent.is_some() && cfg.inherits_by_default();
        let (initial, initial_source) = match (&cfg.initial, inherit) {
            (Some(label), _) => (Some(label.clone()), RequestSource::Direct),
            (None, true) => (parent_initial, RequestSource::Inherited),
            (None, false) => (None, RequestSource::Direct),
        };

        let id = self.ids.alloc_node();
        let mut node = AnimationNode::new(id, parent, cfg, inherit, initial.clone());
        if let Some(label) = initial.as_deref() {
            let (variant, err) = self.resolve(node.scope(), label, initial_source);
            if let Some(err) = err {
                if self.cfg.mode == BuildMode::Development {
                    return Err(err);
                }
            }
            node.apply_pose(label, variant, &mut self.values);
        }

        if let Some(label) = node.config().animate.clone() {
            self.queued.push((id, label, RequestSource::Direct));
        } else if let (true, Some(label)) = (inherit, parent_live) {
            self.queued.push((id, label, RequestSource::Inherited));
        }
        if let Some(view) = &node.config().in_view {
            let trigger = ViewportTrigger::new(
                id,
                view,
                &self.cfg.visible_label,
                &self.cfg.hidden_label,
            );
            self.triggers.insert(id, trigger);
        }
        if let Some(tilt) = node.config().tilt {
            let spring_cfg = tilt.spring.unwrap_or(self.cfg.spring);
            for property in [ROTATE_X, ROTATE_Y] {
                let value = node.bind_value(property, &mut self.values);
                let start = self.values.current(value).unwrap_or(0.0);
                self.springs.insert(
                    (id, property.to_string()),
                    BoundSpring::new(value, Spring::new(start, spring_cfg)),
                );
            }
            self.tilts.insert(id, tilt.max_degrees);
        }

        match parent {
            Some(p) => {
                if let Some(pn) = self.nodes.get_mut(&p) {
                    pn.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        log::debug!(
            "mounted {id:?} ({}) under {parent:?}",
            node.config().name.as_deref().unwrap_or("unnamed")
        );
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Detach `id` and its whole subtree, releasing every resource they hold:
    /// pending stagger dispatches, viewport triggers, springs, motion values
    /// and their subscribers. Remaining siblings keep their dispatch times.
    pub fn unmount(&mut self, id: NodeId) -> Result<()> {
        let parent = self
            .nodes
            .get(&id)
            .ok_or(MotionError::UnknownNode(id))?
            .parent();
        let subtree = self.subtree(id);
        let doomed: HashSet<NodeId> = subtree.iter().copied().collect();

        match parent {
            Some(p) => {
                if let Some(pn) = self.nodes.get_mut(&p) {
                    pn.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        let cancelled = self.stagger.cancel_nodes(&doomed);
        self.queued.retain(|(n, _, _)| !doomed.contains(n));
        self.springs.retain(|(n, _), _| !doomed.contains(n));

        let mut cleared = 0;
        for n in &subtree {
            self.tilts.shift_remove(n);
            if let Some(mut trigger) = self.triggers.shift_remove(n) {
                if trigger.is_observing() {
                    trigger.release();
                    self.events.push(CoreEvent::ViewportReleased { node: *n });
                }
            }
            if let Some(mut node) = self.nodes.shift_remove(n) {
                cleared += node.teardown(&mut self.values);
            }
        }
        log::debug!(
            "unmounted {id:?}: {} nodes, {cancelled} pending dispatches, {cleared} subscribers",
            subtree.len()
        );
        self.audit(id, &doomed);
        Ok(())
    }

    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            out.push(n);
            if let Some(node) = self.nodes.get(&n) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Anything still referencing a removed node is a leak. Reported, never fatal.
    fn audit(&mut self, root: NodeId, doomed: &HashSet<NodeId>) {
        let mut leaks = Vec::new();
        if self.stagger.touches_any(doomed) {
            leaks.push("pending stagger dispatch".to_string());
        }
        if doomed.iter().any(|n| self.triggers.contains_key(n)) {
            leaks.push("viewport trigger".to_string());
        }
        if self.springs.keys().any(|(n, _)| doomed.contains(n)) {
            leaks.push("spring".to_string());
        }
        let orphaned: usize = doomed.iter().map(|n| self.values.owned_by(*n)).sum();
        if orphaned > 0 {
            leaks.push(format!("{orphaned} motion values"));
        }
        if self
            .nodes
            .values()
            .any(|n| n.children.iter().any(|c| doomed.contains(c)))
        {
            leaks.push("child link".to_string());
        }
        for detail in leaks {
            let err = MotionError::ResourceLeak { node: root, detail };
            log::error!("{err}");
            self.events.push(CoreEvent::Error {
                message: err.to_string(),
            });
        }
    }

    // ---------- requests ----------

    /// Ask `node` to transition to `label` outside of a tick.
    ///
    /// In development mode an unknown label returns `UnknownVariant` after
    /// the node has fallen back to identity; production only logs.
    pub fn request(&mut self, node: NodeId, label: &str) -> Result<()> {
        if !self.nodes.contains_key(&node) {
            return Err(MotionError::UnknownNode(node));
        }
        self.request_base(node, label, RequestSource::Direct)
    }

    fn request_base(&mut self, id: NodeId, label: &str, source: RequestSource) -> Result<()> {
        self.set_layer(id, Layer::Base, Some(label), source)
    }

    /// Lookup for `scope.label`. Misses fall back to identity; only direct
    /// requests report the miss.
    fn resolve(
        &self,
        scope: Option<&str>,
        label: &str,
        source: RequestSource,
    ) -> (Arc<Variant>, Option<MotionError>) {
        let Some(scope) = scope else {
            return (self.identity.clone(), None);
        };
        match self.registry.resolve(&scoped_name(scope, label)) {
            Ok(variant) => (variant, None),
            Err(_) if source != RequestSource::Direct => (self.identity.clone(), None),
            Err(err) => {
                match self.cfg.mode {
                    BuildMode::Development => log::error!("{err}; using identity"),
                    BuildMode::Production => log::warn!("{err}; using identity"),
                }
                (self.identity.clone(), Some(err))
            }
        }
    }

    /// Put `label` on `layer` of `id` (or clear the layer) and fan the
    /// change out to inheriting children. Re-sending the label a layer
    /// already holds is a no-op.
    fn set_layer(
        &mut self,
        id: NodeId,
        layer: Layer,
        label: Option<&str>,
        source: RequestSource,
    ) -> Result<()> {
        let Some(node) = self.nodes.get(&id) else {
            return Ok(());
        };
        if node.layer_label(layer) == label {
            return Ok(());
        }
        let (active, err) = match label {
            Some(label) => {
                let (variant, err) = self.resolve(node.scope(), label, source);
                (Some((label, variant)), err)
            }
            None => (None, None),
        };
        let (per_child, base_delay) = active.as_ref().map_or((0.0, 0.0), |(_, v)| {
            (v.transition.stagger_children.unwrap_or(0.0), v.transition.delay_children)
        });
        let now = self.time;
        let Some(node) = self.nodes.get_mut(&id) else {
            return Ok(());
        };
        self.stagger.cancel_parent(id, layer);
        node.set_layer(layer, active, now, &mut self.values);
        let kids = node.children.clone();
        log::debug!("{id:?} {layer:?} -> {label:?}");
        if let Some(top) = node.requested_variant() {
            self.events.push(CoreEvent::AnimationStarted {
                node: id,
                variant: top.to_string(),
            });
        }

        let inheriting: Vec<NodeId> = kids
            .into_iter()
            .filter(|c| self.nodes.get(c).is_some_and(AnimationNode::inherits))
            .collect();
        if !inheriting.is_empty() {
            self.stagger.spawn(StaggerJob::new(
                id,
                layer,
                label.map(str::to_string),
                &inheriting,
                per_child,
                base_delay,
                now,
            ));
        }
        match err {
            Some(err) if self.cfg.mode == BuildMode::Development => Err(err),
            _ => Ok(()),
        }
    }

    /// Gesture labels sit on their own layer above the base label. A node
    /// whose scope lacks the label still forwards it to its children.
    fn apply_gesture(&mut self, ev: GestureEvent) -> Result<()> {
        let Some(node) = self.nodes.get(&ev.node) else {
            log::debug!("gesture for unknown {:?} dropped", ev.node);
            return Ok(());
        };
        let cfg = node.config();
        let (layer, label) = match ev.kind {
            GestureKind::HoverStart => (Layer::Hover, cfg.hover.clone()),
            GestureKind::HoverEnd => (Layer::Hover, None),
            GestureKind::TapStart => (Layer::Tap, cfg.tap.clone()),
            GestureKind::TapEnd | GestureKind::TapCancel => (Layer::Tap, None),
        };
        if label.is_none() && matches!(ev.kind, GestureKind::HoverStart | GestureKind::TapStart) {
            return Ok(());
        }
        self.set_layer(ev.node, layer, label.as_deref(), RequestSource::Gesture)
    }

    fn apply_intersections(&mut self, entries: Vec<IntersectionEntry>, errors: &mut Option<MotionError>) {
        let mut latest: IndexMap<NodeId, f32> = IndexMap::new();
        for e in entries {
            latest.insert(e.node, e.ratio);
        }
        for (node, ratio) in latest {
            let Some(trigger) = self.triggers.get_mut(&node) else {
                continue;
            };
            let label = match trigger.observe(ratio) {
                Some(Crossing::Enter { label, release }) => {
                    self.events.push(CoreEvent::ViewportEntered { node });
                    if release {
                        self.events.push(CoreEvent::ViewportReleased { node });
                    }
                    label
                }
                Some(Crossing::Exit { label }) => {
                    self.events.push(CoreEvent::ViewportExited { node });
                    label
                }
                None => continue,
            };
            note(errors, self.request_base(node, &label, RequestSource::Direct));
        }
    }

    fn apply_pointer(&mut self, samples: Vec<PointerInput>) {
        let mut coalescer = PointerCoalescer::default();
        for sample in samples {
            coalescer.push(sample);
        }
        for input in coalescer.drain() {
            let node = input.node();
            let Some(&max) = self.tilts.get(&node) else {
                continue;
            };
            let (rx, ry) = match input {
                PointerInput::Move { x, y, .. } => match tilt_targets(x, y, max) {
                    Ok(targets) => targets,
                    Err(err) => {
                        log::warn!("pointer sample for {node:?} dropped: {err}");
                        continue;
                    }
                },
                PointerInput::Leave { .. } => (0.0, 0.0),
            };
            for (property, target) in [(ROTATE_X, rx), (ROTATE_Y, ry)] {
                if let Some(bound) = self.springs.get_mut(&(node, property.to_string())) {
                    let _ = bound.spring.set_target(target);
                }
            }
        }
    }

    fn sanitize_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring invalid frame delta {dt}");
            return 0.0;
        }
        if dt > self.cfg.max_dt {
            log::trace!("clamping frame delta {dt} to {}", self.cfg.max_dt);
            return self.cfg.max_dt;
        }
        dt
    }

    /// Step the engine by `dt` seconds, applying `inputs` first.
    ///
    /// Outputs hold only values changed during this tick. In development
    /// mode the first unknown-variant error of the tick is returned instead,
    /// after the whole tick has run.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> Result<&Outputs> {
        self.outputs.clear();
        let dt = self.sanitize_dt(dt);
        self.time += dt as f64;
        let mut first_err = None;

        for (node, label, source) in std::mem::take(&mut self.queued) {
            note(&mut first_err, self.request_base(node, &label, source));
        }
        for req in inputs.requests {
            if !self.nodes.contains_key(&req.node) {
                log::debug!("request for unknown {:?} dropped", req.node);
                continue;
            }
            note(
                &mut first_err,
                self.request_base(req.node, &req.variant, RequestSource::Direct),
            );
        }
        for ev in inputs.gestures {
            note(&mut first_err, self.apply_gesture(ev));
        }
        self.apply_intersections(inputs.intersections, &mut first_err);
        self.apply_pointer(inputs.pointer);

        for bound in self.springs.values_mut() {
            bound.tick(dt, &mut self.values);
        }

        loop {
            let due = self.stagger.take_due(self.time);
            if due.is_empty() {
                break;
            }
            for d in due {
                if !self.nodes.contains_key(&d.child) {
                    log::debug!("dispatch to removed {:?} skipped", d.child);
                    continue;
                }
                self.events.push(CoreEvent::ChildDispatched {
                    parent: d.parent,
                    child: d.child,
                    layer: d.layer,
                    variant: d.variant.clone(),
                });
                note(
                    &mut first_err,
                    self.set_layer(d.child, d.layer, d.variant.as_deref(), RequestSource::Inherited),
                );
            }
        }

        let now = self.time;
        for (id, node) in self.nodes.iter_mut() {
            match node.advance(now, &mut self.values) {
                Progress::Repeated(iteration) => self.events.push(CoreEvent::AnimationRepeated {
                    node: *id,
                    variant: node.requested_variant().unwrap_or_default().to_string(),
                    iteration,
                }),
                Progress::Completed(variant) => {
                    self.events.push(CoreEvent::AnimationCompleted { node: *id, variant })
                }
                Progress::Idle | Progress::Running => {}
            }
        }

        for (id, node) in &self.nodes {
            for (property, value) in node.values() {
                if self.values.take_dirty(value) {
                    if let Some(v) = self.values.current(value) {
                        self.outputs.push_change(Change {
                            node: *id,
                            property: property.to_string(),
                            value: v,
                        });
                    }
                }
            }
        }
        let mut events = std::mem::take(&mut self.events);
        if events.len() > self.cfg.max_events_per_tick {
            log::warn!(
                "dropping {} events over the per-tick cap",
                events.len() - self.cfg.max_events_per_tick
            );
            events.truncate(self.cfg.max_events_per_tick);
        }
        self.outputs.events = events;
        self.epoch += 1;

        match first_err {
            Some(err) => Err(err),
            None => Ok(&self.outputs),
        }
    }

    /// Outputs from the most recent tick.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    // ---------- values ----------

    pub fn node(&self, id: NodeId) -> Option<&AnimationNode> {
        self.nodes.get(&id)
    }

    pub fn node_state(&self, id: NodeId) -> Option<NodeState> {
        self.nodes.get(&id).map(AnimationNode::state)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(&id).map(AnimationNode::children)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Current value of `property` on `node`, if bound.
    pub fn value(&self, node: NodeId, property: &str) -> Option<f32> {
        let id = self.nodes.get(&node)?.value_id(property)?;
        self.values.current(id)
    }

    /// Every bound property on `node` with its current value, in binding order.
    pub fn resolved_values(&self, node: NodeId) -> Vec<(String, f32)> {
        let Some(n) = self.nodes.get(&node) else {
            return Vec::new();
        };
        n.values()
            .filter_map(|(p, id)| self.values.current(id).map(|v| (p.to_string(), v)))
            .collect()
    }

    /// Write `property` directly, binding it first if needed.
    pub fn set_value(&mut self, node: NodeId, property: &str, value: f32) -> Result<()> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(MotionError::UnknownNode(node))?;
        let id = n.bind_value(property, &mut self.values);
        self.values.set(id, value)
    }

    /// Observe every write to `property` on `node`. The callback runs
    /// synchronously inside the write, after earlier subscribers.
    pub fn subscribe(
        &mut self,
        node: NodeId,
        property: &str,
        callback: Subscriber,
    ) -> Result<SubscriptionHandle> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(MotionError::UnknownNode(node))?;
        let value = n.bind_value(property, &mut self.values);
        let mv = self
            .values
            .get_mut(value)
            .ok_or(MotionError::UnknownNode(node))?;
        Ok(SubscriptionHandle {
            value,
            id: mv.subscribe(callback),
        })
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.values
            .get_mut(handle.value)
            .is_some_and(|mv| mv.unsubscribe(handle.id))
    }

    pub fn subscriber_count(&self, node: NodeId, property: &str) -> Option<usize> {
        let id = self.nodes.get(&node)?.value_id(property)?;
        self.values.get(id).map(|mv| mv.subscriber_count())
    }

    pub fn total_subscribers(&self) -> usize {
        self.values.total_subscribers()
    }

    pub fn live_values(&self) -> usize {
        self.values.len()
    }

    // ---------- springs ----------

    /// Drive `property` on `node` with a spring starting at its current value.
    pub fn bind_spring(&mut self, node: NodeId, property: &str, cfg: SpringConfig) -> Result<ValueId> {
        cfg.validate()?;
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(MotionError::UnknownNode(node))?;
        let value = n.bind_value(property, &mut self.values);
        let start = self
            .values
            .current(value)
            .unwrap_or_else(|| default_value(property));
        self.springs
            .entry((node, property.to_string()))
            .or_insert_with(|| BoundSpring::new(value, Spring::new(start, cfg)));
        Ok(value)
    }

    pub fn set_spring_target(&mut self, node: NodeId, property: &str, target: f32) -> Result<()> {
        let bound = self
            .springs
            .get_mut(&(node, property.to_string()))
            .ok_or_else(|| MotionError::Unbound {
                node,
                property: property.to_string(),
            })?;
        bound.spring.set_target(target)
    }

    pub fn spring(&self, node: NodeId, property: &str) -> Option<&Spring> {
        self.springs
            .get(&(node, property.to_string()))
            .map(|b| &b.spring)
    }

    /// Springs that will move on the next tick.
    pub fn active_springs(&self) -> usize {
        self.springs.values().filter(|b| !b.spring.is_idle()).count()
    }

    // ---------- scheduling ----------

    /// Stagger dispatches not yet delivered.
    pub fn pending_dispatches(&self) -> usize {
        self.stagger.pending()
    }

    pub fn trigger(&self, node: NodeId) -> Option<&ViewportTrigger> {
        self.triggers.get(&node)
    }

    /// True while a viewport trigger on `node` still wants entries.
    pub fn is_observing(&self, node: NodeId) -> bool {
        self.triggers.get(&node).is_some_and(ViewportTrigger::is_observing)
    }
}

/// Keep the first error of a tick.
fn note(slot: &mut Option<MotionError>, res: Result<()>) {
    if let Err(err) = res {
        slot.get_or_insert(err);
    }
}
