//! Discrete-event scheduler
//!
//! Single-threaded, cooperative event loop. Every process is an explicit
//! state machine implementing [`Process`]. The loop resumes a process when
//! its wake-up reaches the head of the agenda. The process then runs until
//! it yields a [`Step`]:
//!
//! ```text
//! Step::Timeout(d)   → wake again at now + d
//! Step::Acquire(r)   → wake when resource r grants a slot
//! Step::Finish       → drop the process
//! ```
//!
//! # Ordering
//!
//! The agenda is a min-heap keyed by `(time, sequence)`. The sequence is a
//! monotonically increasing submission counter, so wake-ups at the same
//! instant run in the order they were scheduled.
//!
//! # Example
//!
//! ```rust
//! use hand_pathway_sim::scheduler::{Context, Process, Scheduler, Step};
//! use hand_pathway_sim::SimulationError;
//!
//! struct Ticker { ticks: u32 }
//!
//! impl Process<u32> for Ticker {
//!     fn name(&self) -> &'static str { "ticker" }
//!
//!     fn resume(&mut self, ctx: &mut Context<'_, u32>) -> Result<Step, SimulationError> {
//!         *ctx.state_mut() += 1;
//!         self.ticks += 1;
//!         if self.ticks == 3 {
//!             ctx.stop();
//!             return Ok(Step::Finish);
//!         }
//!         Ok(Step::Timeout(1.0))
//!     }
//! }
//!
//! let mut scheduler = Scheduler::new(0u32);
//! scheduler.schedule(Box::new(Ticker { ticks: 0 }));
//! let end = scheduler.run_until_stopped(100.0).unwrap();
//! assert_eq!(end, 2.0);
//! assert_eq!(*scheduler.state(), 3);
//! ```

mod resource;

pub use resource::{Resource, ResourceId};

use crate::core::time::{Days, SimClock};
use crate::orchestrator::SimulationError;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

/// Handle to a process registered with a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(usize);

impl ProcessId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a process wants next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Suspend for a duration (days)
    Timeout(Days),
    /// Suspend until the resource grants a slot
    Acquire(ResourceId),
    /// Process is done and can be dropped
    Finish,
}

/// A schedulable entity
///
/// `resume` runs atomically between suspension points: nothing else in
/// the simulation moves while it executes.
pub trait Process<S> {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// Advance the state machine to its next suspension point
    fn resume(&mut self, ctx: &mut Context<'_, S>) -> Result<Step, SimulationError>;
}

/// A pending wake-up on the agenda
#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at: Days,
    seq: u64,
    pid: ProcessId,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so BinaryHeap pops the earliest (time, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Event scheduler owning the clock, the agenda, every live process and
/// every resource, plus the user state `S` that processes mutate.
pub struct Scheduler<S> {
    clock: SimClock,
    agenda: BinaryHeap<Scheduled>,
    next_seq: u64,
    processes: Vec<Option<Box<dyn Process<S>>>>,
    resources: Vec<Resource>,
    stop_requested: bool,
    events_processed: u64,
    state: S,
}

impl<S> Scheduler<S> {
    /// Create an empty scheduler at time zero
    pub fn new(state: S) -> Self {
        Self {
            clock: SimClock::new(),
            agenda: BinaryHeap::new(),
            next_seq: 0,
            processes: Vec::new(),
            resources: Vec::new(),
            stop_requested: false,
            events_processed: 0,
            state,
        }
    }

    /// Register a resource and return its handle
    pub fn add_resource(&mut self, name: impl Into<String>, capacity: usize) -> ResourceId {
        self.resources.push(Resource::new(name, capacity));
        ResourceId(self.resources.len() - 1)
    }

    /// Register a process; it first runs at the current instant
    ///
    /// Scheduling does not advance time.
    pub fn schedule(&mut self, process: Box<dyn Process<S>>) -> ProcessId {
        let pid = ProcessId(self.processes.len());
        self.processes.push(Some(process));
        self.wake_at(pid, self.clock.now());
        pid
    }

    /// Current simulated time
    pub fn now(&self) -> Days {
        self.clock.now()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Consume the scheduler, keeping only the user state
    pub fn into_state(self) -> S {
        self.state
    }

    /// Look up a resource
    pub fn resource(&self, id: ResourceId) -> Result<&Resource, SimulationError> {
        self.resources
            .get(id.0)
            .ok_or(SimulationError::UnknownResource(id.0))
    }

    /// Whether a terminal signal has been raised
    pub fn is_stopped(&self) -> bool {
        self.stop_requested
    }

    /// Number of wake-ups dispatched so far
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Number of wake-ups still on the agenda
    pub fn pending_events(&self) -> usize {
        self.agenda.len()
    }

    /// Time of the next pending wake-up, if any
    pub fn peek_next_time(&self) -> Option<Days> {
        self.agenda.peek().map(|s| s.at)
    }

    /// Dispatch every wake-up due at or before `t`, then move the clock to `t`
    ///
    /// Stops early, leaving the clock at the last dispatched event, if a
    /// process raises the terminal signal.
    pub fn advance_to(&mut self, t: Days) -> Result<(), SimulationError> {
        while !self.stop_requested {
            match self.agenda.peek() {
                Some(next) if next.at <= t => self.step()?,
                _ => break,
            }
        }
        if !self.stop_requested && t > self.clock.now() {
            self.clock.advance_to(t);
        }
        Ok(())
    }

    /// Drive the loop until a process raises the terminal signal
    ///
    /// `limit` guards against runs that never converge. If the next
    /// wake-up lies beyond it, the loop gives up with
    /// [`SimulationError::DidNotTerminate`]. Returns the simulated time at
    /// which the stop fired.
    pub fn run_until_stopped(&mut self, limit: Days) -> Result<Days, SimulationError> {
        while !self.stop_requested {
            let next_at = match self.agenda.peek() {
                Some(next) => next.at,
                None => {
                    return Err(SimulationError::EventQueueExhausted {
                        now: self.clock.now(),
                    })
                }
            };
            if next_at > limit {
                return Err(SimulationError::DidNotTerminate {
                    now: self.clock.now(),
                    limit,
                });
            }
            self.step()?;
        }
        Ok(self.clock.now())
    }

    /// Pop and dispatch exactly one wake-up
    ///
    /// Returns without doing anything if the agenda is empty.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let Some(next) = self.agenda.pop() else {
            return Ok(());
        };
        self.clock.advance_to(next.at);
        self.events_processed += 1;
        self.dispatch(next.pid)
    }

    fn dispatch(&mut self, pid: ProcessId) -> Result<(), SimulationError> {
        let mut process = self
            .processes
            .get_mut(pid.0)
            .and_then(Option::take)
            .ok_or(SimulationError::UnknownProcess(pid.0))?;

        let step = {
            let mut ctx = Context {
                scheduler: self,
                current: pid,
            };
            process.resume(&mut ctx)?
        };

        match step {
            Step::Timeout(delay) => {
                if !(delay.is_finite() && delay >= 0.0) {
                    return Err(SimulationError::InvalidDelay {
                        process: process.name(),
                        delay,
                    });
                }
                self.processes[pid.0] = Some(process);
                self.wake_at(pid, self.clock.now() + delay);
            }
            Step::Acquire(resource_id) => {
                self.processes[pid.0] = Some(process);
                let resource = self
                    .resources
                    .get_mut(resource_id.0)
                    .ok_or(SimulationError::UnknownResource(resource_id.0))?;
                if resource.request(pid) {
                    self.wake_at(pid, self.clock.now());
                }
            }
            Step::Finish => {
                trace!(process = process.name(), pid = pid.0, now = self.clock.now(), "process finished");
            }
        }
        Ok(())
    }

    fn wake_at(&mut self, pid: ProcessId, at: Days) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.agenda.push(Scheduled { at, seq, pid });
    }
}

/// View of the scheduler handed to a process while it runs
pub struct Context<'a, S> {
    scheduler: &'a mut Scheduler<S>,
    current: ProcessId,
}

impl<'a, S> Context<'a, S> {
    /// Current simulated time
    pub fn now(&self) -> Days {
        self.scheduler.clock.now()
    }

    /// Handle of the running process
    pub fn current(&self) -> ProcessId {
        self.current
    }

    pub fn state(&self) -> &S {
        &self.scheduler.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.scheduler.state
    }

    /// Launch another process; it first runs at the current instant,
    /// after everything already scheduled for this instant
    pub fn spawn(&mut self, process: Box<dyn Process<S>>) -> ProcessId {
        self.scheduler.schedule(process)
    }

    /// Release a slot held by the running process
    ///
    /// If a waiter inherits the slot, it is woken at the current instant.
    pub fn release(&mut self, resource_id: ResourceId) -> Result<(), SimulationError> {
        let current = self.current;
        let resource = self
            .scheduler
            .resources
            .get_mut(resource_id.0)
            .ok_or(SimulationError::UnknownResource(resource_id.0))?;
        if let Some(next) = resource.release(current)? {
            let now = self.scheduler.clock.now();
            self.scheduler.wake_at(next, now);
        }
        Ok(())
    }

    /// Look up a resource
    pub fn resource(&self, resource_id: ResourceId) -> Result<&Resource, SimulationError> {
        self.scheduler.resource(resource_id)
    }

    /// Raise the terminal signal; the loop halts after this dispatch
    pub fn stop(&mut self) {
        self.scheduler.stop_requested = true;
    }
}
