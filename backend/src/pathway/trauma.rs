//! Trauma lists
//!
//! Emergency cases share the elective theatre. A trauma list queues for the
//! theatre like any patient and, once granted, keeps it for the whole list.

use crate::models::{Event, RunState};
use crate::orchestrator::{SimulationError, TraumaLoad};
use crate::scheduler::{Context, Process, ResourceId, Step};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraumaPhase {
    NotStarted,
    ListDue,
    AwaitingTheatre,
    Operating,
}

/// Recurring emergency list that displaces elective theatre time
///
/// The next list falls due `interval` days after the previous one ends.
pub struct TraumaList {
    theatre: ResourceId,
    load: TraumaLoad,
    phase: TraumaPhase,
}

impl TraumaList {
    pub fn new(theatre: ResourceId, load: TraumaLoad) -> Self {
        Self {
            theatre,
            load,
            phase: TraumaPhase::NotStarted,
        }
    }
}

impl Process<RunState> for TraumaList {
    fn name(&self) -> &'static str {
        "trauma_list"
    }

    fn resume(&mut self, ctx: &mut Context<'_, RunState>) -> Result<Step, SimulationError> {
        let now = ctx.now();
        match self.phase {
            TraumaPhase::NotStarted => {
                self.phase = TraumaPhase::ListDue;
                Ok(Step::Timeout(self.load.interval))
            }
            TraumaPhase::ListDue => {
                self.phase = TraumaPhase::AwaitingTheatre;
                Ok(Step::Acquire(self.theatre))
            }
            TraumaPhase::AwaitingTheatre => {
                debug!(now, extra = self.load.extra_patients, "trauma list started");
                ctx.state_mut().log(Event::TraumaListStarted {
                    time: now,
                    extra_patients: self.load.extra_patients,
                    duration: self.load.duration,
                });
                self.phase = TraumaPhase::Operating;
                Ok(Step::Timeout(self.load.duration))
            }
            TraumaPhase::Operating => {
                ctx.release(self.theatre)?;
                self.phase = TraumaPhase::ListDue;
                Ok(Step::Timeout(self.load.interval))
            }
        }
    }
}
