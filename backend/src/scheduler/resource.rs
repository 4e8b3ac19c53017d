//! Finite-capacity resource with a FIFO wait queue
//!
//! A `Resource` never suspends anything itself. It records who holds a
//! slot and who is waiting. The scheduler turns a grant into a wake-up of
//! the waiting process.

use super::ProcessId;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Handle to a resource registered with a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub(crate) usize);

impl ResourceId {
    /// Index of the resource within its scheduler
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Mutual-exclusion primitive with fixed capacity
///
/// # Invariants
///
/// 1. `holders.len() <= capacity` at all times
/// 2. Waiters are granted strictly in the order they requested
/// 3. Only a current holder can release
///
/// # Example
///
/// ```rust
/// use hand_pathway_sim::scheduler::{ProcessId, Resource};
///
/// let mut theatre = Resource::new("theatre", 1);
/// assert!(theatre.request(ProcessId::new(1)));   // granted at once
/// assert!(!theatre.request(ProcessId::new(2)));  // queued
///
/// let next = theatre.release(ProcessId::new(1)).unwrap();
/// assert_eq!(next, Some(ProcessId::new(2)));
/// assert_eq!(theatre.in_use(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    capacity: usize,
    holders: Vec<ProcessId>,
    waiters: VecDeque<ProcessId>,
    total_grants: u64,
}

impl Resource {
    /// Create a resource with `capacity` slots
    ///
    /// # Panics
    /// Panics if `capacity` is zero. Configuration validation rejects
    /// zero capacities long before a resource is built.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        assert!(capacity > 0, "resource capacity must be positive");
        Self {
            name: name.into(),
            capacity,
            holders: Vec::with_capacity(capacity),
            waiters: VecDeque::new(),
            total_grants: 0,
        }
    }

    /// Ask for a slot on behalf of `pid`
    ///
    /// Returns `true` if the slot was granted immediately. Otherwise the
    /// requester joins the back of the wait queue and `false` is returned.
    /// A free slot is never granted past earlier waiters.
    pub fn request(&mut self, pid: ProcessId) -> bool {
        if self.holders.len() < self.capacity && self.waiters.is_empty() {
            self.holders.push(pid);
            self.total_grants += 1;
            true
        } else {
            self.waiters.push_back(pid);
            false
        }
    }

    /// Return the slot held by `pid`
    ///
    /// Returns the waiter that inherits the slot, if any. The slot passes
    /// directly to that waiter, so the in-use count does not dip in between.
    pub fn release(&mut self, pid: ProcessId) -> Result<Option<ProcessId>, SimulationError> {
        let position = self
            .holders
            .iter()
            .position(|holder| *holder == pid)
            .ok_or_else(|| SimulationError::ReleaseWithoutHold {
                resource: self.name.clone(),
                process: pid.index(),
            })?;
        self.holders.swap_remove(position);

        match self.waiters.pop_front() {
            Some(next) => {
                self.holders.push(next);
                self.total_grants += 1;
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }

    /// Resource name (used in logs and events)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum concurrent holders
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held
    pub fn in_use(&self) -> usize {
        self.holders.len()
    }

    /// Requesters still waiting for a slot
    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }

    /// Whether `pid` currently holds a slot
    pub fn is_held_by(&self, pid: ProcessId) -> bool {
        self.holders.contains(&pid)
    }

    /// Number of grants issued since creation
    pub fn total_grants(&self) -> u64 {
        self.total_grants
    }
}
