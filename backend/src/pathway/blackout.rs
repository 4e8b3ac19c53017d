//! Session blackouts
//!
//! A blackout models the gap between sessions by taking a place in the
//! resource's FIFO queue and holding the slot. Whoever is already in
//! session finishes before the blackout starts.

use crate::core::time::Days;
use crate::models::{Event, RunState};
use crate::orchestrator::{BlackoutMode, SimulationError};
use crate::scheduler::{Context, Process, ResourceId, Step};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlackoutPhase {
    NotStarted,
    SessionOpen,
    AwaitingSlot,
    BlackedOut,
}

/// Holds a resource for the gap between sessions
///
/// In [`BlackoutMode::OneShot`] the blackout happens once and the process
/// ends. In [`BlackoutMode::Recurring`] the open/closed cycle repeats until
/// the scheduler stops.
pub struct SessionBlackout {
    resource: ResourceId,
    label: &'static str,
    open_for: Days,
    closed_for: Days,
    mode: BlackoutMode,
    phase: BlackoutPhase,
    cycles: u32,
}

impl SessionBlackout {
    pub fn new(
        resource: ResourceId,
        label: &'static str,
        open_for: Days,
        closed_for: Days,
        mode: BlackoutMode,
    ) -> Self {
        Self {
            resource,
            label,
            open_for,
            closed_for,
            mode,
            phase: BlackoutPhase::NotStarted,
            cycles: 0,
        }
    }
}

impl Process<RunState> for SessionBlackout {
    fn name(&self) -> &'static str {
        "session_blackout"
    }

    fn resume(&mut self, ctx: &mut Context<'_, RunState>) -> Result<Step, SimulationError> {
        let now = ctx.now();
        match self.phase {
            BlackoutPhase::NotStarted => {
                self.phase = BlackoutPhase::SessionOpen;
                Ok(Step::Timeout(self.open_for))
            }
            BlackoutPhase::SessionOpen => {
                self.phase = BlackoutPhase::AwaitingSlot;
                Ok(Step::Acquire(self.resource))
            }
            BlackoutPhase::AwaitingSlot => {
                let until = now + self.closed_for;
                debug!(resource = self.label, now, until, "blackout started");
                ctx.state_mut().log(Event::BlackoutStarted {
                    time: now,
                    resource: self.label.to_string(),
                    until,
                });
                self.phase = BlackoutPhase::BlackedOut;
                Ok(Step::Timeout(self.closed_for))
            }
            BlackoutPhase::BlackedOut => {
                ctx.release(self.resource)?;
                self.cycles += 1;
                debug!(resource = self.label, now, cycles = self.cycles, "blackout ended");
                ctx.state_mut().log(Event::BlackoutEnded {
                    time: now,
                    resource: self.label.to_string(),
                });
                match self.mode {
                    BlackoutMode::Recurring => {
                        self.phase = BlackoutPhase::SessionOpen;
                        Ok(Step::Timeout(self.open_for))
                    }
                    BlackoutMode::OneShot | BlackoutMode::Disabled => Ok(Step::Finish),
                }
            }
        }
    }
}
