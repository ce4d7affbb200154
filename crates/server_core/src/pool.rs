//! Bounded per-kind pools for spawned enemies.
//!
//! A slot tracks allocated handles in recency order, a free list, and the
//! number of in-flight creations. The pool does bookkeeping only: callers
//! apply the side effects (begin a creation, re-initialize a reused record,
//! run the release hook) for the outcome it reports, which keeps every
//! branch unit-testable without a spawn service.
//!
//! Invariant: `allocated + free + pending <= limit` at all times.

use std::collections::VecDeque;

use crate::actor::{ActorId, SlimeKind};

/// Ticket identifying one in-flight creation at the spawn-service boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpawnTicket(pub u64);

/// What the caller must do to satisfy an allocation request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Allocation {
    /// Capacity remains: begin an asynchronous creation, then report it via
    /// `complete_creation` / `creation_failed`.
    Create,
    /// A parked handle was taken from the free list; re-initialize it.
    Reuse(ActorId),
    /// Forced circular reuse: the least-recently-allocated handle was
    /// recycled in place. Run its release hook, then re-initialize.
    Evict(ActorId),
    /// Everything is still pending creation; skip this spawn.
    Skip,
}

#[derive(Debug, Default)]
pub struct PoolSlot {
    limit: usize,
    /// Front = least recently allocated; eviction order.
    allocated: VecDeque<ActorId>,
    free: Vec<ActorId>,
    pending: usize,
}

impl PoolSlot {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            allocated: VecDeque::new(),
            free: Vec::new(),
            pending: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn population(&self) -> usize {
        self.allocated.len() + self.free.len() + self.pending
    }

    #[must_use]
    pub fn allocated_len(&self) -> usize {
        self.allocated.len()
    }
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Allocation policy, in priority order: create under the limit, reuse
    /// a free handle, evict the oldest allocated handle, else skip.
    pub fn try_allocate(&mut self) -> Allocation {
        if self.population() < self.limit {
            self.pending += 1;
            return Allocation::Create;
        }
        if let Some(id) = self.free.pop() {
            self.allocated.push_back(id);
            return Allocation::Reuse(id);
        }
        if let Some(id) = self.allocated.pop_front() {
            // Refresh recency so repeated eviction cycles through the set.
            self.allocated.push_back(id);
            return Allocation::Evict(id);
        }
        Allocation::Skip
    }

    /// A creation finished: the new handle joins the allocated set.
    pub fn complete_creation(&mut self, id: ActorId) {
        debug_assert!(self.pending > 0, "completion without a pending creation");
        self.pending = self.pending.saturating_sub(1);
        self.allocated.push_back(id);
    }

    /// A creation failed: capacity is returned, nothing else changes.
    pub fn creation_failed(&mut self) {
        debug_assert!(self.pending > 0, "failure without a pending creation");
        self.pending = self.pending.saturating_sub(1);
    }

    /// Move a handle to the free list. No-op (false) when not allocated.
    pub fn release(&mut self, id: ActorId) -> bool {
        let Some(idx) = self.allocated.iter().position(|a| *a == id) else {
            return false;
        };
        let _ = self.allocated.remove(idx);
        self.free.push(id);
        true
    }

    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        self.population() <= self.limit
    }
}

/// One slot per enemy kind.
#[derive(Debug)]
pub struct EntityPool {
    slots: [PoolSlot; SlimeKind::COUNT],
}

impl EntityPool {
    #[must_use]
    pub fn new(limits: [usize; SlimeKind::COUNT]) -> Self {
        Self {
            slots: limits.map(PoolSlot::new),
        }
    }

    #[must_use]
    pub fn slot(&self, kind: SlimeKind) -> &PoolSlot {
        &self.slots[kind.index()]
    }

    pub fn slot_mut(&mut self, kind: SlimeKind) -> &mut PoolSlot {
        &mut self.slots[kind.index()]
    }

    pub fn try_allocate(&mut self, kind: SlimeKind) -> Allocation {
        self.slot_mut(kind).try_allocate()
    }

    pub fn complete_creation(&mut self, kind: SlimeKind, id: ActorId) {
        self.slot_mut(kind).complete_creation(id);
    }

    pub fn creation_failed(&mut self, kind: SlimeKind) {
        self.slot_mut(kind).creation_failed();
    }

    pub fn release(&mut self, kind: SlimeKind, id: ActorId) -> bool {
        self.slot_mut(kind).release(id)
    }

    #[must_use]
    pub fn total_pending(&self) -> usize {
        self.slots.iter().map(PoolSlot::pending).sum()
    }

    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        self.slots.iter().all(PoolSlot::invariant_holds)
    }
}
