//! Patient model
//!
//! A patient is pure data. Its routing flags are fixed when it is created
//! and its timing fields are filled in as the journey passes each
//! checkpoint. The journey process that owns the record is the only thing
//! that ever touches it.

use crate::core::time::Days;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pathway stage with a waiting list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Clinic,
    Imaging,
    Therapy,
    Theatre,
}

impl Stage {
    /// All stages in pathway order
    pub const ALL: [Stage; 4] = [Stage::Clinic, Stage::Imaging, Stage::Therapy, Stage::Theatre];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Clinic => "clinic",
            Stage::Imaging => "imaging",
            Stage::Therapy => "therapy",
            Stage::Theatre => "theatre",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A patient referred into (or pre-loaded onto) the pathway
///
/// # Example
///
/// ```rust
/// use hand_pathway_sim::models::{Patient, Stage};
///
/// let referred = Patient::referral(7, true, false, true);
/// assert!(!referred.already_seen_clinic());
///
/// let backlog = Patient::prefilled(1, Stage::Therapy, false, true);
/// assert!(backlog.already_seen_clinic());
/// assert!(backlog.already_seen_imaging());
/// assert!(backlog.needs_therapy());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    id: u64,

    needs_imaging: bool,
    needs_therapy: bool,

    already_seen_clinic: bool,
    already_seen_imaging: bool,
    already_seen_therapy: bool,

    /// False if referred at or after the horizon
    before_end_sim: bool,

    time_entered_pathway: Days,
    clinic_q_time: Days,
    theatre_q_time: Days,
    overall_q_time: Days,
}

impl Patient {
    /// Patient created by the referral generator
    pub fn referral(id: u64, needs_imaging: bool, needs_therapy: bool, before_end_sim: bool) -> Self {
        Self {
            id,
            needs_imaging,
            needs_therapy,
            already_seen_clinic: false,
            already_seen_imaging: false,
            already_seen_therapy: false,
            before_end_sim,
            time_entered_pathway: 0.0,
            clinic_q_time: 0.0,
            theatre_q_time: 0.0,
            overall_q_time: 0.0,
        }
    }

    /// Patient injected directly into the waiting list for `entry`
    ///
    /// Every stage upstream of `entry` is marked as already seen. A patient
    /// injected at imaging always needs imaging, and one injected at therapy
    /// always needs therapy, whatever the caller passes.
    pub fn prefilled(id: u64, entry: Stage, needs_imaging: bool, needs_therapy: bool) -> Self {
        let (seen_clinic, seen_imaging, seen_therapy) = match entry {
            Stage::Clinic => (false, false, false),
            Stage::Imaging => (true, false, false),
            Stage::Therapy => (true, true, false),
            Stage::Theatre => (true, true, true),
        };
        Self {
            id,
            needs_imaging: needs_imaging || entry == Stage::Imaging,
            needs_therapy: needs_therapy || entry == Stage::Therapy,
            already_seen_clinic: seen_clinic,
            already_seen_imaging: seen_imaging,
            already_seen_therapy: seen_therapy,
            before_end_sim: true,
            time_entered_pathway: 0.0,
            clinic_q_time: 0.0,
            theatre_q_time: 0.0,
            overall_q_time: 0.0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn needs_imaging(&self) -> bool {
        self.needs_imaging
    }

    pub fn needs_therapy(&self) -> bool {
        self.needs_therapy
    }

    pub fn already_seen_clinic(&self) -> bool {
        self.already_seen_clinic
    }

    pub fn already_seen_imaging(&self) -> bool {
        self.already_seen_imaging
    }

    pub fn already_seen_therapy(&self) -> bool {
        self.already_seen_therapy
    }

    pub fn before_end_sim(&self) -> bool {
        self.before_end_sim
    }

    /// Whether the journey includes an imaging leg
    pub fn visits_imaging(&self) -> bool {
        self.needs_imaging && !self.already_seen_imaging
    }

    /// Whether the journey includes a therapy leg
    pub fn visits_therapy(&self) -> bool {
        self.needs_therapy && !self.already_seen_therapy
    }

    pub fn time_entered_pathway(&self) -> Days {
        self.time_entered_pathway
    }

    pub fn clinic_q_time(&self) -> Days {
        self.clinic_q_time
    }

    pub fn theatre_q_time(&self) -> Days {
        self.theatre_q_time
    }

    pub fn overall_q_time(&self) -> Days {
        self.overall_q_time
    }

    /// Anchor the overall wait at `t`
    pub fn mark_entered_pathway(&mut self, t: Days) {
        self.time_entered_pathway = t;
    }

    pub fn record_clinic_wait(&mut self, waited: Days) {
        self.clinic_q_time = waited;
    }

    /// Store the theatre wait and derive the overall wait from the
    /// pathway entry anchor
    pub fn record_theatre_grant(&mut self, granted_at: Days, queued_at: Days) {
        self.theatre_q_time = granted_at - queued_at;
        self.overall_q_time = granted_at - self.time_entered_pathway;
    }
}
