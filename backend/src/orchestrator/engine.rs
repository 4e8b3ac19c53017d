//! Run controller
//!
//! A [`PathwayRun`] is one replication: it builds a scheduler with a clinic
//! and a theatre resource, loads the backlog, launches every process and
//! drives the loop until the termination monitor fires.
//!
//! # Process launch order
//!
//! ```text
//! 1. pre-fill (clinic, imaging, therapy, theatre batches)
//! 2. referral generator
//! 3. clinic blackout, theatre blackout   (unless blackouts are disabled)
//! 4. trauma list                         (only with extra trauma load)
//! 5. termination monitor
//! ```
//!
//! Everything starts at time zero, so this order is also the order in
//! which the processes first run.
//!
//! # Example
//!
//! ```rust
//! use hand_pathway_sim::{PathwayConfig, PathwayRun, PrefillConfig};
//!
//! let config = PathwayConfig {
//!     horizon_days: 14.0,
//!     prefill: PrefillConfig { clinic: 3, ..PrefillConfig::empty() },
//!     ..Default::default()
//! };
//!
//! let output = PathwayRun::new(0, config, 7).unwrap().run().unwrap();
//! assert!(output.end_time >= 14.0);
//! assert_eq!(output.active_entities_at_end, 0);
//! ```

use super::config::{BlackoutMode, ConfigError, PathwayConfig, PathwayTimings};
use super::config_hash::compute_config_hash;
use crate::arrivals::{prefill_queues, ReferralGenerator};
use crate::core::time::Days;
use crate::models::{EventLog, QueueSnapshot, RunState, Stage, WaitRecord};
use crate::pathway::{PathwayResources, SessionBlackout, TerminationMonitor, TraumaList};
use crate::rng::RngManager;
use crate::scheduler::Scheduler;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Faults raised while building or running a replication
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("process {process} released resource '{resource}' without holding it")]
    ReleaseWithoutHold { resource: String, process: usize },

    #[error("unknown resource id {0}")]
    UnknownResource(usize),

    #[error("unknown process id {0}")]
    UnknownProcess(usize),

    #[error("process '{process}' asked for invalid delay {delay}")]
    InvalidDelay { process: &'static str, delay: f64 },

    #[error("{stage} queue counter would go below zero")]
    QueueUnderflow { stage: Stage },

    #[error("run did not terminate by day {limit} (stopped at day {now})")]
    DidNotTerminate { now: f64, limit: f64 },

    #[error("event queue exhausted at day {now} before the terminal signal")]
    EventQueueExhausted { now: f64 },

    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Everything one replication hands back
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub run_index: usize,
    pub seed: u64,
    pub config_hash: String,
    /// Simulated time at which the terminal signal fired
    pub end_time: Days,
    /// Wait records in theatre-grant order
    pub wait_records: Vec<WaitRecord>,
    pub final_queues: QueueSnapshot,
    pub peak_queues: QueueSnapshot,
    pub queue_entries: QueueSnapshot,
    pub active_entities_at_end: i64,
    pub patients_created: u64,
    pub events_processed: u64,
    pub event_log: EventLog,
}

/// One replication of the pathway
#[derive(Debug, Clone)]
pub struct PathwayRun {
    run_index: usize,
    seed: u64,
    config: PathwayConfig,
    timings: PathwayTimings,
    config_hash: String,
}

impl PathwayRun {
    /// Validate `config` and prepare a run driven by `seed`
    pub fn new(run_index: usize, config: PathwayConfig, seed: u64) -> Result<Self, SimulationError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;
        let timings = config.timings();
        Ok(Self {
            run_index,
            seed,
            config,
            timings,
            config_hash,
        })
    }

    pub fn run_index(&self) -> usize {
        self.run_index
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Drive the replication to its terminal signal
    pub fn run(self) -> Result<RunOutput, SimulationError> {
        let timings = self.timings;
        let state = RunState::new(
            timings,
            self.config.prefill.total() as u64,
            RngManager::new(self.seed),
        );
        let mut scheduler = Scheduler::new(state);
        let resources = PathwayResources {
            clinic: scheduler.add_resource("clinic", 1),
            theatre: scheduler.add_resource("theatre", 1),
        };

        let prefilled = prefill_queues(&mut scheduler, &self.config.prefill, resources);
        scheduler.schedule(Box::new(ReferralGenerator::new(resources)));

        if timings.blackout_mode != BlackoutMode::Disabled {
            scheduler.schedule(Box::new(SessionBlackout::new(
                resources.clinic,
                "clinic",
                timings.blackout_initial_delay,
                timings.clinic_interval,
                timings.blackout_mode,
            )));
            scheduler.schedule(Box::new(SessionBlackout::new(
                resources.theatre,
                "theatre",
                timings.blackout_initial_delay,
                timings.theatre_interval,
                timings.blackout_mode,
            )));
        }
        if let Some(load) = timings.trauma {
            debug!(interval = load.interval, duration = load.duration, "trauma lists enabled");
            scheduler.schedule(Box::new(TraumaList::new(resources.theatre, load)));
        }
        scheduler.schedule(Box::new(TerminationMonitor::new()));

        info!(
            run = self.run_index,
            seed = self.seed,
            prefilled,
            horizon = timings.horizon,
            "run started"
        );

        let end_time = scheduler.run_until_stopped(self.config.run_guard_days)?;
        let events_processed = scheduler.events_processed();

        let state = scheduler.into_state();
        let active_entities_at_end = state.active_entities();
        let patients_created = state.patient_counter();
        let (wait_records, queues, event_log) = state.into_parts();

        info!(
            run = self.run_index,
            end_time,
            patients_created,
            recorded = wait_records.len(),
            events_processed,
            "run finished"
        );

        Ok(RunOutput {
            run_index: self.run_index,
            seed: self.seed,
            config_hash: self.config_hash,
            end_time,
            wait_records,
            final_queues: queues.snapshot(),
            peak_queues: queues.peak(),
            queue_entries: queues.entries(),
            active_entities_at_end,
            patients_created,
            events_processed,
            event_log,
        })
    }
}
