//! Trial harness
//!
//! A trial runs the same configuration N times, each replication with its
//! own RNG stream derived from the base seed, then aggregates:
//!
//! - every run's wait records, concatenated in run order
//! - every run's final queue snapshot, keyed by run index
//! - the mean after-queue per stage against the pre-fill ("before") counts
//! - the mean wait of patients referred on day 0 and on the final day
//!
//! Sequential and parallel execution produce identical results, because
//! each run depends only on its index.
//!
//! # Example
//!
//! ```rust
//! use hand_pathway_sim::{PathwayConfig, PrefillConfig, Trial};
//!
//! let config = PathwayConfig {
//!     number_of_runs: 3,
//!     horizon_days: 10.0,
//!     prefill: PrefillConfig { clinic: 4, ..PrefillConfig::empty() },
//!     ..Default::default()
//! };
//!
//! let results = Trial::new(config).unwrap().run().unwrap();
//! let summary = results.summary();
//! assert_eq!(summary.runs, 3);
//! assert_eq!(summary.before.clinic, 4);
//! ```

use crate::core::time::{day_index, Days};
use crate::models::{QueueSnapshot, WaitRecord};
use crate::orchestrator::{
    compute_config_hash, ConfigError, PathwayConfig, PathwayRun, RunOutput, SimulationError,
};
use crate::rng::derive_seed;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Trial-level failures
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("invalid trial config: {0}")]
    Config(#[from] ConfigError),

    #[error("run {run} failed")]
    RunFailed {
        run: usize,
        #[source]
        source: SimulationError,
    },

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Final queue lengths of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunQueueRecord {
    pub run: usize,
    pub queues: QueueSnapshot,
}

/// Per-run figures kept after the run's event log is dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run: usize,
    pub seed: u64,
    pub end_time: Days,
    pub patients_created: u64,
    pub recorded_patients: usize,
    pub peak_queues: QueueSnapshot,
    pub queue_entries: QueueSnapshot,
    pub events_processed: u64,
}

/// Mean of a per-stage quantity across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageMeans {
    pub clinic: f64,
    pub imaging: f64,
    pub therapy: f64,
    pub theatre: f64,
}

impl StageMeans {
    pub fn total(&self) -> f64 {
        self.clinic + self.imaging + self.therapy + self.theatre
    }
}

/// Headline numbers of a trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub runs: usize,
    pub before: QueueSnapshot,
    pub mean_after: StageMeans,
    pub total_before: usize,
    pub total_after: f64,
    /// `None` when nobody qualifying was referred on day 0
    pub mean_wait_first_day: Option<f64>,
    /// `None` when nobody qualifying was referred on the final day
    pub mean_wait_final_day: Option<f64>,
    pub final_day: u64,
    pub qualifying_patients: usize,
    pub config_hash: String,
}

/// Concatenated output of every run in a trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResults {
    pub config: PathwayConfig,
    pub config_hash: String,
    pub queue_records: Vec<RunQueueRecord>,
    pub wait_records: Vec<WaitRecord>,
    pub runs: Vec<RunSummary>,
}

impl TrialResults {
    fn from_outputs(config: PathwayConfig, config_hash: String, outputs: Vec<RunOutput>) -> Self {
        let queue_records = outputs
            .iter()
            .map(|o| RunQueueRecord {
                run: o.run_index,
                queues: o.final_queues,
            })
            .collect();
        let runs = outputs
            .iter()
            .map(|o| RunSummary {
                run: o.run_index,
                seed: o.seed,
                end_time: o.end_time,
                patients_created: o.patients_created,
                recorded_patients: o.wait_records.len(),
                peak_queues: o.peak_queues,
                queue_entries: o.queue_entries,
                events_processed: o.events_processed,
            })
            .collect();
        let wait_records = concatenate_wait_records(outputs.into_iter().map(|o| o.wait_records));

        Self {
            config,
            config_hash,
            queue_records,
            wait_records,
            runs,
        }
    }

    /// Aggregate statistics over all runs
    pub fn summary(&self) -> TrialSummary {
        let before = self.config.before_snapshot();
        let mean_after = mean_queues(&self.queue_records);
        let final_day = final_referral_day(self.config.horizon_days);

        TrialSummary {
            runs: self.queue_records.len(),
            before,
            mean_after,
            total_before: before.total(),
            total_after: mean_after.total(),
            mean_wait_first_day: mean_wait(&filter_by_day(&self.wait_records, 0)),
            mean_wait_final_day: mean_wait(&filter_by_day(&self.wait_records, final_day)),
            final_day,
            qualifying_patients: self.wait_records.len(),
            config_hash: self.config_hash.clone(),
        }
    }
}

/// Repeated independent replications of one configuration
#[derive(Debug, Clone)]
pub struct Trial {
    config: PathwayConfig,
    config_hash: String,
}

impl Trial {
    pub fn new(config: PathwayConfig) -> Result<Self, TrialError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;
        Ok(Self {
            config,
            config_hash,
        })
    }

    pub fn config(&self) -> &PathwayConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Seed of the RNG stream for run `run`
    pub fn run_seed(&self, run: usize) -> u64 {
        derive_seed(self.config.rng_seed, run as u64)
    }

    /// Execute a single replication
    pub fn run_one(&self, run: usize) -> Result<RunOutput, TrialError> {
        PathwayRun::new(run, self.config.clone(), self.run_seed(run))
            .and_then(PathwayRun::run)
            .map_err(|source| TrialError::RunFailed { run, source })
    }

    /// Run every replication in order on the current thread
    pub fn run(&self) -> Result<TrialResults, TrialError> {
        info!(runs = self.config.number_of_runs, hash = %self.config_hash, "trial started");
        let outputs = (0..self.config.number_of_runs)
            .map(|run| self.run_one(run))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.finish(outputs))
    }

    /// Run replications across the rayon thread pool
    pub fn run_parallel(&self) -> Result<TrialResults, TrialError> {
        info!(
            runs = self.config.number_of_runs,
            threads = rayon::current_num_threads(),
            hash = %self.config_hash,
            "parallel trial started"
        );
        let outputs = (0..self.config.number_of_runs)
            .into_par_iter()
            .map(|run| self.run_one(run))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.finish(outputs))
    }

    fn finish(&self, outputs: Vec<RunOutput>) -> TrialResults {
        let results = TrialResults::from_outputs(self.config.clone(), self.config_hash.clone(), outputs);
        info!(
            runs = results.runs.len(),
            qualifying = results.wait_records.len(),
            "trial finished"
        );
        results
    }
}

/// Concatenate per-run wait records in the order given
pub fn concatenate_wait_records<I>(runs: I) -> Vec<WaitRecord>
where
    I: IntoIterator<Item = Vec<WaitRecord>>,
{
    runs.into_iter().flatten().collect()
}

/// Records whose referral fell on simulated day `day`
pub fn filter_by_day(records: &[WaitRecord], day: u64) -> Vec<WaitRecord> {
    records
        .iter()
        .filter(|r| day_index(r.referral_day) == day)
        .copied()
        .collect()
}

/// Mean total wait, or `None` for an empty set
pub fn mean_wait(records: &[WaitRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(|r| r.total_wait).sum();
    Some(sum / records.len() as f64)
}

/// Last whole day on which a referral can still count
pub fn final_referral_day(horizon: Days) -> u64 {
    (horizon.ceil() as u64).saturating_sub(1)
}

/// Mean final queue length per stage
pub fn mean_queues(records: &[RunQueueRecord]) -> StageMeans {
    if records.is_empty() {
        return StageMeans::default();
    }
    let n = records.len() as f64;
    let mut sums = StageMeans::default();
    for r in records {
        sums.clinic += r.queues.clinic as f64;
        sums.imaging += r.queues.imaging as f64;
        sums.therapy += r.queues.therapy as f64;
        sums.theatre += r.queues.theatre as f64;
    }
    StageMeans {
        clinic: sums.clinic / n,
        imaging: sums.imaging / n,
        therapy: sums.therapy / n,
        theatre: sums.theatre / n,
    }
}
