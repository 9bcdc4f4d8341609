//! Stagger scheduling: delay-offset fan-out of a parent's variant to its children.
//!
//! Child *i* (insertion order) is due at `start + delay_children + i * stagger`.
//! Dispatch does not wait for earlier siblings to finish. Entries addressed
//! to nodes that went away are dropped without error. Each job targets one
//! label layer; a `None` label clears that layer on the children.

use hashbrown::HashSet;

use crate::ids::NodeId;
use crate::node::Layer;

/// Small slack so float accumulation of frame times can't push a due child a tick late.
const DUE_EPS: f64 = 1e-6;

/// One pending fan-out from `parent`.
#[derive(Clone, Debug)]
pub struct StaggerJob {
    pub parent: NodeId,
    pub layer: Layer,
    pub variant: Option<String>,
    pub per_child_delay: f32,
    pub base_delay: f32,
    pub started_at: f64,
    /// (child, delay) in dispatch order; delays are non-decreasing.
    entries: Vec<(NodeId, f32)>,
    next: usize,
}

impl StaggerJob {
    pub fn new(
        parent: NodeId,
        layer: Layer,
        variant: Option<String>,
        child_order: &[NodeId],
        per_child_delay: f32,
        base_delay: f32,
        started_at: f64,
    ) -> Self {
        let entries = child_order
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, base_delay + i as f32 * per_child_delay))
            .collect();
        Self {
            parent,
            layer,
            variant,
            per_child_delay,
            base_delay,
            started_at,
            entries,
            next: 0,
        }
    }

    /// Children still waiting for dispatch, in order.
    fn waiting(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries[self.next..].iter().map(|(c, _)| *c)
    }

    /// Offset (seconds after `started_at`) at which `child` is due.
    pub fn delay_for(&self, child: NodeId) -> Option<f32> {
        self.entries
            .iter()
            .find_map(|(c, d)| (*c == child).then_some(*d))
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.next
    }

    fn is_done(&self) -> bool {
        self.next >= self.entries.len()
    }
}

/// A child whose dispatch time has arrived.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub parent: NodeId,
    pub child: NodeId,
    pub layer: Layer,
    pub variant: Option<String>,
}

#[derive(Debug, Default)]
pub struct StaggerScheduler {
    jobs: Vec<StaggerJob>,
}

impl StaggerScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, job: StaggerJob) {
        if job.remaining() == 0 {
            return;
        }
        log::debug!(
            "stagger {:?} {:?} -> {:?} over {} children",
            job.parent,
            job.layer,
            job.variant,
            job.remaining()
        );
        self.jobs.push(job);
    }

    /// Pop every entry due at `now`, oldest job first, children in order.
    pub fn take_due(&mut self, now: f64) -> Vec<Dispatch> {
        let mut due = Vec::new();
        for job in &mut self.jobs {
            while let Some(&(child, delay)) = job.entries.get(job.next) {
                if job.started_at + delay as f64 > now + DUE_EPS {
                    break;
                }
                due.push(Dispatch {
                    parent: job.parent,
                    child,
                    layer: job.layer,
                    variant: job.variant.clone(),
                });
                job.next += 1;
            }
        }
        self.jobs.retain(|j| !j.is_done());
        due
    }

    /// Drop `parent`'s jobs on `layer` (that layer's label changed).
    /// Returns entries dropped.
    pub fn cancel_parent(&mut self, parent: NodeId, layer: Layer) -> usize {
        let mut dropped = 0;
        self.jobs.retain(|j| {
            if j.parent == parent && j.layer == layer {
                dropped += j.remaining();
                false
            } else {
                true
            }
        });
        dropped
    }

    /// Drop jobs owned by, and entries addressed to, any of `nodes`.
    pub fn cancel_nodes(&mut self, nodes: &HashSet<NodeId>) -> usize {
        let mut dropped = 0;
        self.jobs.retain_mut(|j| {
            if nodes.contains(&j.parent) {
                dropped += j.remaining();
                return false;
            }
            let next = j.next;
            let before = j.entries.len();
            let mut idx = 0;
            j.entries.retain(|(c, _)| {
                let keep = idx < next || !nodes.contains(c);
                idx += 1;
                keep
            });
            dropped += before - j.entries.len();
            !j.is_done()
        });
        dropped
    }

    /// Total entries still waiting.
    pub fn pending(&self) -> usize {
        self.jobs.iter().map(StaggerJob::remaining).sum()
    }

    /// True if any waiting entry or job involves one of `nodes`.
    pub fn touches_any(&self, nodes: &HashSet<NodeId>) -> bool {
        self.jobs
            .iter()
            .any(|j| nodes.contains(&j.parent) || j.waiting().any(|c| nodes.contains(&c)))
    }
}
