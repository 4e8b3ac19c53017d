//! Time management for the simulation
//!
//! The simulation runs on a continuous clock measured in days. The clock
//! only moves forward; the scheduler advances it to the timestamp of each
//! event it pops.

use serde::{Deserialize, Serialize};

/// Simulated time, in days since the start of a run.
pub type Days = f64;

/// Day index (0-based) that a simulated instant falls into.
///
/// # Example
/// ```
/// use hand_pathway_sim::core::time::day_index;
///
/// assert_eq!(day_index(0.0), 0);
/// assert_eq!(day_index(0.99), 0);
/// assert_eq!(day_index(3.2), 3);
/// ```
pub fn day_index(t: Days) -> u64 {
    if t <= 0.0 {
        0
    } else {
        t.floor() as u64
    }
}

/// Monotonic simulation clock
///
/// # Example
/// ```
/// use hand_pathway_sim::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(2.5);
/// assert_eq!(clock.now(), 2.5);
/// assert_eq!(clock.current_day(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    /// Current simulated time (days)
    now: Days,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    /// Move the clock forward to `t`
    ///
    /// # Panics
    /// Panics if `t` is earlier than the current time. The event queue
    /// pops in time order, so this only fires on a scheduler bug.
    pub fn advance_to(&mut self, t: Days) {
        assert!(
            t >= self.now,
            "clock cannot move backwards (now={}, requested={})",
            self.now,
            t
        );
        self.now = t;
    }

    /// Current simulated time
    pub fn now(&self) -> Days {
        self.now
    }

    /// Current day index (0-based)
    pub fn current_day(&self) -> u64 {
        day_index(self.now)
    }

    /// Whether the clock has reached `horizon`
    pub fn reached(&self, horizon: Days) -> bool {
        self.now >= horizon
    }
}
