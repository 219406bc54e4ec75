//! Arena-backed circular lists with per-ring sentinels.
//!
//! Stores nodes in a slab (`Vec<Slot<T>>` plus a free list) and links them
//! by index, so several rings can share one arena and a node can migrate
//! between rings in O(1) without reallocation. Each ring is closed by a
//! sentinel slot that carries no value; an empty ring is a sentinel linked
//! to itself.
//!
//! ## Architecture
//!
//! ```text
//!   slots: Vec<Slot<T>>
//!
//!   index: 0(S)     1        2        3        4
//!          [ ]◄──►[ A ]◄──►[ B ]    [   ]    [ C ]  (detached)
//!            ▲______________▲         ^
//!            ring 0 closes here    free_list = [3]
//!
//!   head = sentinel.next  (LRU end)
//!   tail = sentinel.prev  (MRU end)
//! ```
//!
//! ## Operations
//! - `push_tail` / `push_head`: allocate and link at the MRU / LRU end
//! - `move_to_tail(ring, id)`: unlink + relink at tail
//! - `unlink(id)`: detach but keep the slot live (for ring migration)
//! - `link_tail` / `link_head`: reattach a detached node
//! - `remove(id)`: detach + free the slot
//!
//! All of the above are O(1). `iter_ring` and `ring_len` walk the chain.
//!
//! Detached nodes have both links set to `NIL`; linked nodes have both
//! non-`NIL`. Sentinels are never freed and are addressed by `RingId`
//! rather than `NodeId`, so they cannot be unlinked or removed through the
//! public surface.
//!
//! `debug_validate_invariants()` is available in debug/test builds.

/// Marker index for an absent link.
const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Stable handle to a value node in a `RingArena`.
///
/// `NodeId` values remain valid until the node is removed; after removal,
/// the numeric index may be reused by a later insertion.
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the underlying slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Handle to a ring's sentinel slot.
pub struct RingId(pub(crate) usize);

#[derive(Debug)]
struct Slot<T> {
    /// `None` for sentinels and freed slots.
    value: Option<T>,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
/// Arena of ring nodes; rings are circular index chains closed by sentinels.
pub struct RingArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    sentinels: Vec<usize>,
    len: usize,
}

impl<T> RingArena<T> {
    /// Creates an empty arena with no rings.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            sentinels: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty arena with reserved slot capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            sentinels: Vec::new(),
            len: 0,
        }
    }

    /// Allocates a new empty ring and returns its handle.
    pub fn new_ring(&mut self) -> RingId {
        let idx = self.slots.len();
        self.slots.push(Slot {
            value: None,
            prev: idx,
            next: idx,
        });
        self.sentinels.push(idx);
        RingId(idx)
    }

    /// Returns the number of live value nodes across all rings.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no value nodes are live.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `ring` holds no nodes.
    pub fn is_ring_empty(&self, ring: RingId) -> bool {
        self.slots[ring.0].next == ring.0
    }

    /// Returns the node at the ring's head (LRU end), if any.
    pub fn head(&self, ring: RingId) -> Option<NodeId> {
        let next = self.slots[ring.0].next;
        (next != ring.0).then_some(NodeId(next))
    }

    /// Returns the node at the ring's tail (MRU end), if any.
    pub fn tail(&self, ring: RingId) -> Option<NodeId> {
        let prev = self.slots[ring.0].prev;
        (prev != ring.0).then_some(NodeId(prev))
    }

    /// Inserts a value at the ring's tail (MRU end) and returns its id.
    pub fn push_tail(&mut self, ring: RingId, value: T) -> NodeId {
        let idx = self.alloc(value);
        self.link_before(ring.0, idx);
        NodeId(idx)
    }

    /// Inserts a value at the ring's head (LRU end) and returns its id.
    pub fn push_head(&mut self, ring: RingId, value: T) -> NodeId {
        let idx = self.alloc(value);
        self.link_after(ring.0, idx);
        NodeId(idx)
    }

    /// Detaches a node from its ring, keeping the slot live.
    ///
    /// Returns `false` if `id` is not a linked value node. Both links are
    /// cleared; reattach with [`link_tail`](Self::link_tail) or
    /// [`link_head`](Self::link_head).
    pub fn unlink(&mut self, id: NodeId) -> bool {
        let (prev, next) = match self.slots.get(id.0) {
            Some(slot) if slot.value.is_some() && slot.prev != NIL => (slot.prev, slot.next),
            _ => return false,
        };
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
        let slot = &mut self.slots[id.0];
        slot.prev = NIL;
        slot.next = NIL;
        true
    }

    /// Attaches a detached node at the ring's tail (MRU end).
    pub fn link_tail(&mut self, ring: RingId, id: NodeId) {
        debug_assert!(!self.is_linked(id), "node must be detached before relink");
        self.link_before(ring.0, id.0);
    }

    /// Attaches a detached node at the ring's head (LRU end).
    pub fn link_head(&mut self, ring: RingId, id: NodeId) {
        debug_assert!(!self.is_linked(id), "node must be detached before relink");
        self.link_after(ring.0, id.0);
    }

    /// Moves a linked node to the ring's tail: unlink, then append.
    pub fn move_to_tail(&mut self, ring: RingId, id: NodeId) -> bool {
        if !self.unlink(id) {
            return false;
        }
        self.link_before(ring.0, id.0);
        true
    }

    /// Removes a node entirely, returning its value and freeing the slot.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.unlink(id);
        let slot = self.slots.get_mut(id.0)?;
        let value = slot.value.take()?;
        slot.prev = NIL;
        slot.next = NIL;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    /// Returns a shared reference to the value at `id`, if live.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.value.as_ref())
    }

    /// Returns a mutable reference to the value at `id`, if live.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.value.as_mut())
    }

    /// Returns `true` if `id` refers to a live value node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.value.is_some())
            .unwrap_or(false)
    }

    /// Returns `true` if `id` is live and currently linked into a ring.
    pub fn is_linked(&self, id: NodeId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.value.is_some() && slot.prev != NIL)
            .unwrap_or(false)
    }

    /// Walks `ring` from head (LRU) to tail (MRU).
    pub fn iter_ring(&self, ring: RingId) -> RingIter<'_, T> {
        RingIter {
            arena: self,
            sentinel: ring.0,
            current: self.slots[ring.0].next,
        }
    }

    /// Counts the nodes in `ring`. O(n) walk; intended for audits.
    pub fn ring_len(&self, ring: RingId) -> usize {
        self.iter_ring(ring).count()
    }

    fn alloc(&mut self, value: T) -> usize {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx].value = Some(value);
            idx
        } else {
            self.slots.push(Slot {
                value: Some(value),
                prev: NIL,
                next: NIL,
            });
            self.slots.len() - 1
        };
        self.len += 1;
        idx
    }

    /// Splices `idx` in directly before `anchor` (at the tail when the
    /// anchor is the sentinel).
    fn link_before(&mut self, anchor: usize, idx: usize) {
        let prev = self.slots[anchor].prev;
        self.slots[idx].prev = prev;
        self.slots[idx].next = anchor;
        self.slots[prev].next = idx;
        self.slots[anchor].prev = idx;
    }

    /// Splices `idx` in directly after `anchor` (at the head when the
    /// anchor is the sentinel).
    fn link_after(&mut self, anchor: usize, idx: usize) {
        let next = self.slots[anchor].next;
        self.slots[idx].next = next;
        self.slots[idx].prev = anchor;
        self.slots[next].prev = idx;
        self.slots[anchor].next = idx;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut reachable = std::collections::HashSet::new();

        for &sentinel in &self.sentinels {
            let mut prev = sentinel;
            let mut current = self.slots[sentinel].next;
            let mut walked = 0usize;
            while current != sentinel {
                let slot = &self.slots[current];
                assert!(slot.value.is_some(), "sentinel-linked slot without value");
                assert_eq!(slot.prev, prev, "broken back-link");
                assert!(reachable.insert(current), "node reachable from two rings");
                prev = current;
                current = slot.next;
                walked += 1;
                assert!(walked <= self.len, "ring walk exceeded live node count");
            }
            assert_eq!(self.slots[sentinel].prev, prev, "sentinel back-link broken");
        }

        let mut detached = 0usize;
        for (idx, slot) in self.slots.iter().enumerate() {
            if slot.value.is_some() && slot.prev == NIL {
                assert_eq!(slot.next, NIL, "half-detached node");
                assert!(!reachable.contains(&idx));
                detached += 1;
            }
        }

        assert_eq!(reachable.len() + detached, self.len, "live count mismatch");

        let mut seen_free = std::collections::HashSet::new();
        for &idx in &self.free_list {
            assert!(idx < self.slots.len());
            assert!(self.slots[idx].value.is_none(), "free slot holds a value");
            assert!(seen_free.insert(idx), "slot freed twice");
        }
        assert_eq!(
            self.slots.len(),
            self.free_list.len() + self.len + self.sentinels.len()
        );
    }
}

impl<T> Default for RingArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over one ring, head (LRU) to tail (MRU).
pub struct RingIter<'a, T> {
    arena: &'a RingArena<T>,
    sentinel: usize,
    current: usize,
}

impl<'a, T> Iterator for RingIter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.sentinel {
            return None;
        }
        let idx = self.current;
        let slot = &self.arena.slots[idx];
        let value = slot
            .value
            .as_ref()
            .expect("ring chain reached a slot without a value");
        self.current = slot.next;
        Some((NodeId(idx), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(arena: &RingArena<u64>, ring: RingId) -> Vec<u64> {
        arena.iter_ring(ring).map(|(_, k)| *k).collect()
    }

    #[test]
    fn empty_ring_is_self_closed() {
        let mut arena: RingArena<u64> = RingArena::new();
        let ring = arena.new_ring();
        assert!(arena.is_ring_empty(ring));
        assert_eq!(arena.head(ring), None);
        assert_eq!(arena.tail(ring), None);
        assert_eq!(arena.ring_len(ring), 0);
        arena.debug_validate_invariants();
    }

    #[test]
    fn push_tail_orders_head_to_tail() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        let a = arena.push_tail(ring, 1u64);
        arena.push_tail(ring, 2);
        let c = arena.push_tail(ring, 3);

        assert_eq!(keys(&arena, ring), vec![1, 2, 3]);
        assert_eq!(arena.head(ring), Some(a));
        assert_eq!(arena.tail(ring), Some(c));
        assert_eq!(arena.len(), 3);
        arena.debug_validate_invariants();
    }

    #[test]
    fn push_head_lands_at_lru_end() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        arena.push_tail(ring, 1u64);
        arena.push_tail(ring, 2);
        let front = arena.push_head(ring, 9);

        assert_eq!(keys(&arena, ring), vec![9, 1, 2]);
        assert_eq!(arena.head(ring), Some(front));
    }

    #[test]
    fn move_to_tail_reorders() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        let a = arena.push_tail(ring, 1u64);
        arena.push_tail(ring, 2);
        arena.push_tail(ring, 3);

        assert!(arena.move_to_tail(ring, a));
        assert_eq!(keys(&arena, ring), vec![2, 3, 1]);
        assert_eq!(arena.tail(ring), Some(a));
        arena.debug_validate_invariants();
    }

    #[test]
    fn unlink_then_relink_into_other_ring() {
        let mut arena = RingArena::new();
        let window = arena.new_ring();
        let probation = arena.new_ring();
        let a = arena.push_tail(window, 1u64);
        arena.push_tail(window, 2);

        assert!(arena.unlink(a));
        assert!(!arena.is_linked(a));
        assert!(arena.contains(a));
        assert_eq!(keys(&arena, window), vec![2]);

        arena.link_tail(probation, a);
        assert!(arena.is_linked(a));
        assert_eq!(keys(&arena, probation), vec![1]);
        assert_eq!(arena.len(), 2);
        arena.debug_validate_invariants();
    }

    #[test]
    fn link_head_reattaches_at_lru_end() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        arena.push_tail(ring, 1u64);
        let b = arena.push_tail(ring, 2);

        arena.unlink(b);
        arena.link_head(ring, b);
        assert_eq!(keys(&arena, ring), vec![2, 1]);
    }

    #[test]
    fn unlink_twice_is_rejected() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        let a = arena.push_tail(ring, 1u64);

        assert!(arena.unlink(a));
        assert!(!arena.unlink(a));
    }

    #[test]
    fn remove_frees_and_reuses_slot() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        let a = arena.push_tail(ring, 1u64);
        arena.push_tail(ring, 2);

        assert_eq!(arena.remove(a), Some(1));
        assert!(!arena.contains(a));
        assert_eq!(arena.len(), 1);
        assert_eq!(keys(&arena, ring), vec![2]);

        // freed slot index gets reused
        let c = arena.push_tail(ring, 3);
        assert_eq!(c.index(), a.index());
        arena.debug_validate_invariants();
    }

    #[test]
    fn remove_detached_node() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        let a = arena.push_tail(ring, 7u64);
        arena.unlink(a);
        assert_eq!(arena.remove(a), Some(7));
        assert_eq!(arena.len(), 0);
        assert!(arena.is_ring_empty(ring));
        arena.debug_validate_invariants();
    }

    #[test]
    fn get_mut_updates_value() {
        let mut arena = RingArena::new();
        let ring = arena.new_ring();
        let a = arena.push_tail(ring, 10u64);
        if let Some(v) = arena.get_mut(a) {
            *v = 20;
        }
        assert_eq!(arena.get(a), Some(&20));
    }

    #[test]
    fn rings_share_one_arena() {
        let mut arena = RingArena::new();
        let r1 = arena.new_ring();
        let r2 = arena.new_ring();
        let r3 = arena.new_ring();

        for i in 0..4u64 {
            arena.push_tail(r1, i);
        }
        let moved = arena.head(r1).unwrap();
        arena.unlink(moved);
        arena.link_tail(r2, moved);

        assert_eq!(arena.ring_len(r1), 3);
        assert_eq!(arena.ring_len(r2), 1);
        assert_eq!(arena.ring_len(r3), 0);
        assert_eq!(arena.len(), 4);
        arena.debug_validate_invariants();
    }

    #[test]
    fn churn_keeps_invariants() {
        let mut arena = RingArena::new();
        let a = arena.new_ring();
        let b = arena.new_ring();
        let mut ids = Vec::new();

        for i in 0..64u64 {
            ids.push(arena.push_tail(a, i));
        }
        for (i, &id) in ids.iter().enumerate() {
            match i % 4 {
                0 => {
                    arena.unlink(id);
                    arena.link_head(b, id);
                },
                1 => {
                    arena.move_to_tail(a, id);
                },
                2 => {
                    arena.remove(id);
                },
                _ => {},
            }
            arena.debug_validate_invariants();
        }
        assert_eq!(arena.len(), arena.ring_len(a) + arena.ring_len(b));
    }
}
