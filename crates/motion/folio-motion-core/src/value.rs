//! Motion values: named scalars with synchronous subscribers.
//!
//! A [`MotionValue`] is the atomic unit every animation writes into. The
//! [`MotionValues`] store owns all of them by [`ValueId`] and remembers which
//! ones changed since the last time the engine collected outputs.

use std::fmt;

use hashbrown::HashMap;

use crate::error::{MotionError, Result};
use crate::ids::{IdAllocator, NodeId, SubscriptionId, ValueId};

/// Callback invoked with the new value on every accepted `set`.
pub type Subscriber = Box<dyn FnMut(f32)>;

/// Resting value for a freshly bound property (identity transform).
pub fn default_value(property: &str) -> f32 {
    match property {
        "opacity" | "scale" | "scaleX" | "scaleY" => 1.0,
        _ => 0.0,
    }
}

pub struct MotionValue {
    id: ValueId,
    owner: NodeId,
    name: String,
    current: f32,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u32,
    dirty: bool,
}

impl fmt::Debug for MotionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionValue")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl MotionValue {
    pub fn new(id: ValueId, owner: NodeId, name: impl Into<String>, initial: f32) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
            current: initial,
            subscribers: Vec::new(),
            next_subscription: 0,
            dirty: false,
        }
    }

    #[inline]
    pub fn id(&self) -> ValueId {
        self.id
    }

    #[inline]
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Store `value` and notify every subscriber once, in subscription order.
    ///
    /// NaN and infinities are rejected: the previous value is kept and no
    /// subscriber runs.
    pub fn set(&mut self, value: f32) -> Result<()> {
        if !value.is_finite() {
            log::warn!(
                "dropping non-finite update {value} for motion value '{}' ({:?})",
                self.name,
                self.id
            );
            return Err(MotionError::InvalidValue {
                property: self.name.clone(),
                value,
            });
        }
        self.current = value;
        self.dirty = true;
        for (_, callback) in self.subscribers.iter_mut() {
            callback(value);
        }
        Ok(())
    }

    pub fn subscribe(&mut self, callback: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscribers.push((id, callback));
        id
    }

    /// Returns false if the handle was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn clear_subscribers(&mut self) -> usize {
        let n = self.subscribers.len();
        self.subscribers.clear();
        n
    }

    #[inline]
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Owning store for all motion values.
#[derive(Debug, Default)]
pub struct MotionValues {
    ids: IdAllocator,
    values: HashMap<ValueId, MotionValue>,
}

impl MotionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, owner: NodeId, name: &str, initial: f32) -> ValueId {
        let id = self.ids.alloc_value();
        self.values
            .insert(id, MotionValue::new(id, owner, name, initial));
        id
    }

    #[inline]
    pub fn get(&self, id: ValueId) -> Option<&MotionValue> {
        self.values.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ValueId) -> Option<&mut MotionValue> {
        self.values.get_mut(&id)
    }

    /// Current value, if the id is live.
    #[inline]
    pub fn current(&self, id: ValueId) -> Option<f32> {
        self.values.get(&id).map(MotionValue::get)
    }

    /// Set a live value. Writes to destroyed values are ignored.
    pub fn set(&mut self, id: ValueId, value: f32) -> Result<()> {
        match self.values.get_mut(&id) {
            Some(mv) => mv.set(value),
            None => Ok(()),
        }
    }

    /// Remove a value, clearing its subscribers. Returns how many were cleared.
    pub fn destroy(&mut self, id: ValueId) -> Option<usize> {
        self.values
            .remove(&id)
            .map(|mut mv| mv.clear_subscribers())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total_subscribers(&self) -> usize {
        self.values.values().map(MotionValue::subscriber_count).sum()
    }

    pub(crate) fn owned_by(&self, owner: NodeId) -> usize {
        self.values.values().filter(|v| v.owner == owner).count()
    }

    #[inline]
    pub(crate) fn take_dirty(&mut self, id: ValueId) -> bool {
        self.values.get_mut(&id).is_some_and(MotionValue::take_dirty)
    }
}
