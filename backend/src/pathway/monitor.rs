//! Termination monitor

use crate::models::{Event, RunState};
use crate::orchestrator::SimulationError;
use crate::scheduler::{Context, Process, Step};
use tracing::debug;

/// Daily check for the end of a run
///
/// A run is over once the horizon has passed and every patient referred
/// before it has been through theatre. The first check falls one interval
/// after the run starts.
pub struct TerminationMonitor {
    started: bool,
}

impl TerminationMonitor {
    pub fn new() -> Self {
        Self { started: false }
    }
}

impl Default for TerminationMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Process<RunState> for TerminationMonitor {
    fn name(&self) -> &'static str {
        "termination_monitor"
    }

    fn resume(&mut self, ctx: &mut Context<'_, RunState>) -> Result<Step, SimulationError> {
        let interval = ctx.state().timings().monitor_interval;
        if !self.started {
            self.started = true;
            return Ok(Step::Timeout(interval));
        }

        let now = ctx.now();
        let horizon = ctx.state().timings().horizon;
        let active = ctx.state().active_entities();
        if now >= horizon && active <= 0 {
            debug!(now, active, "termination condition met");
            ctx.state_mut().log(Event::SimulationStopped {
                time: now,
                active_entities: active,
            });
            ctx.stop();
            return Ok(Step::Finish);
        }
        Ok(Step::Timeout(interval))
    }
}
