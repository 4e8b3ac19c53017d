//! Per-run simulation state
//!
//! Everything a replication mutates while it runs lives here: waiting-list
//! counters, the active-entity tally, the patient id counter, the wait-time
//! records, the event log and the run's private RNG. One `RunState` belongs
//! to exactly one scheduler; nothing in it is global.
//!
//! # Critical Invariants
//!
//! 1. **Paired counters**: every `join` on a stage is matched by exactly one
//!    `leave`, so no counter ever goes below zero
//! 2. **Monotonic ids**: patient ids increase by one in creation order
//! 3. **Append-only records**: wait records are only ever pushed

use crate::core::time::Days;
use crate::models::event::{Event, EventLog};
use crate::models::patient::Stage;
use crate::orchestrator::{PathwayTimings, SimulationError};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// One value per waiting list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub clinic: usize,
    pub imaging: usize,
    pub therapy: usize,
    pub theatre: usize,
}

impl QueueSnapshot {
    pub fn new(clinic: usize, imaging: usize, therapy: usize, theatre: usize) -> Self {
        Self {
            clinic,
            imaging,
            therapy,
            theatre,
        }
    }

    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Clinic => self.clinic,
            Stage::Imaging => self.imaging,
            Stage::Therapy => self.therapy,
            Stage::Theatre => self.theatre,
        }
    }

    fn get_mut(&mut self, stage: Stage) -> &mut usize {
        match stage {
            Stage::Clinic => &mut self.clinic,
            Stage::Imaging => &mut self.imaging,
            Stage::Therapy => &mut self.therapy,
            Stage::Theatre => &mut self.theatre,
        }
    }

    /// Sum across all four lists
    pub fn total(&self) -> usize {
        self.clinic + self.imaging + self.therapy + self.theatre
    }
}

/// Waiting-list counters with peak and throughput tracking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounters {
    current: QueueSnapshot,
    peak: QueueSnapshot,
    entries: QueueSnapshot,
}

impl QueueCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patient joins the list for `stage`
    pub fn join(&mut self, stage: Stage) {
        let current = self.current.get_mut(stage);
        *current += 1;
        let now = *current;
        *self.entries.get_mut(stage) += 1;
        let peak = self.peak.get_mut(stage);
        if now > *peak {
            *peak = now;
        }
    }

    /// Patient leaves the list for `stage`
    pub fn leave(&mut self, stage: Stage) -> Result<(), SimulationError> {
        let current = self.current.get_mut(stage);
        *current = current
            .checked_sub(1)
            .ok_or(SimulationError::QueueUnderflow { stage })?;
        Ok(())
    }

    /// Lengths right now
    pub fn snapshot(&self) -> QueueSnapshot {
        self.current
    }

    /// Longest each list has been
    pub fn peak(&self) -> QueueSnapshot {
        self.peak
    }

    /// How many patients ever joined each list
    pub fn entries(&self) -> QueueSnapshot {
        self.entries
    }
}

/// One qualifying patient's total wait
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaitRecord {
    /// Simulated time the patient entered the pathway (referral day)
    pub referral_day: Days,
    /// Time from pathway entry to theatre grant
    pub total_wait: Days,
}

/// Mutable state of one replication
#[derive(Debug, Clone)]
pub struct RunState {
    timings: PathwayTimings,
    prefill_total: u64,
    patient_counter: u64,
    active_entities: i64,
    queues: QueueCounters,
    wait_records: Vec<WaitRecord>,
    event_log: EventLog,
    rng: RngManager,
}

impl RunState {
    pub fn new(timings: PathwayTimings, prefill_total: u64, rng: RngManager) -> Self {
        Self {
            timings,
            prefill_total,
            patient_counter: 0,
            active_entities: 0,
            queues: QueueCounters::new(),
            wait_records: Vec::new(),
            event_log: EventLog::new(),
            rng,
        }
    }

    pub fn timings(&self) -> &PathwayTimings {
        &self.timings
    }

    /// Patients with an id at or below this were pre-filled
    pub fn prefill_total(&self) -> u64 {
        self.prefill_total
    }

    /// Allocate the next patient id (1-based)
    pub fn next_patient_id(&mut self) -> u64 {
        self.patient_counter += 1;
        self.patient_counter
    }

    pub fn patient_counter(&self) -> u64 {
        self.patient_counter
    }

    pub fn active_entities(&self) -> i64 {
        self.active_entities
    }

    pub fn add_active(&mut self) {
        self.active_entities += 1;
    }

    pub fn remove_active(&mut self) {
        self.active_entities -= 1;
    }

    pub fn queues(&self) -> &QueueCounters {
        &self.queues
    }

    pub fn queues_mut(&mut self) -> &mut QueueCounters {
        &mut self.queues
    }

    pub fn record_wait(&mut self, record: WaitRecord) {
        self.wait_records.push(record);
    }

    pub fn wait_records(&self) -> &[WaitRecord] {
        &self.wait_records
    }

    pub fn log(&mut self, event: Event) {
        self.event_log.log(event);
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn rng_mut(&mut self) -> &mut RngManager {
        &mut self.rng
    }

    /// Split into the pieces a finished run hands back
    pub fn into_parts(self) -> (Vec<WaitRecord>, QueueCounters, EventLog) {
        (self.wait_records, self.queues, self.event_log)
    }
}
