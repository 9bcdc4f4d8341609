//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Handle of a mounted [`AnimationNode`](crate::node::AnimationNode).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Handle of a [`MotionValue`](crate::value::MotionValue) in the value store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ValueId(pub u32);

/// Handle returned by `subscribe`; only meaningful for the value it came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// Monotonic allocator for NodeId and ValueId.
/// Ids are never reused, so a stale handle can't alias a newer node.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_node: u32,
    next_value: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node = self.next_node.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value = self.next_value.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_node(), NodeId(0));
        assert_eq!(alloc.alloc_node(), NodeId(1));
        assert_eq!(alloc.alloc_value(), ValueId(0));
        assert_eq!(alloc.alloc_value(), ValueId(1));
        assert_eq!(alloc.alloc_node(), NodeId(2));
    }
}
