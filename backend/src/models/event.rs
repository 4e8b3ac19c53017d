//! Event logging for replay and debugging.
//!
//! Every significant state change in a run is recorded as an [`Event`]
//! stamped with its simulated time. The log is append-only and ordered by
//! dispatch, so two events at the same instant appear in the order the
//! scheduler ran them.
//!
//! # Example
//!
//! ```rust
//! use hand_pathway_sim::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::TheatreGranted {
//!     time: 4.2,
//!     patient_id: 17,
//!     waited: 1.0,
//!     overall_wait: 3.5,
//! });
//!
//! assert_eq!(log.events_of_type("TheatreGranted").len(), 1);
//! assert_eq!(log.events_for_patient(17)[0].time(), 4.2);
//! ```

use crate::core::time::Days;
use crate::models::patient::Stage;
use serde::{Deserialize, Serialize};

/// How a patient entered the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientSource {
    /// Created by the referral generator
    Referral,
    /// Injected at time zero into the waiting list for `stage`
    Prefill { stage: Stage },
}

/// Simulation event capturing a state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PatientCreated {
        time: Days,
        patient_id: u64,
        source: PatientSource,
        needs_imaging: bool,
        needs_therapy: bool,
        before_end_sim: bool,
    },

    /// Patient joined a waiting list
    QueueJoined {
        time: Days,
        patient_id: u64,
        stage: Stage,
    },

    /// Patient left a waiting list (grant for clinic/theatre, turnaround
    /// complete for imaging/therapy)
    QueueLeft {
        time: Days,
        patient_id: u64,
        stage: Stage,
    },

    ClinicGranted {
        time: Days,
        patient_id: u64,
        waited: Days,
    },

    TheatreGranted {
        time: Days,
        patient_id: u64,
        waited: Days,
        overall_wait: Days,
    },

    /// Patient finished theatre and left the pathway
    PatientDischarged {
        time: Days,
        patient_id: u64,
        wait_recorded: bool,
    },

    BlackoutStarted {
        time: Days,
        resource: String,
        until: Days,
    },

    BlackoutEnded {
        time: Days,
        resource: String,
    },

    /// Emergency list took the theatre
    TraumaListStarted {
        time: Days,
        extra_patients: u32,
        duration: Days,
    },

    /// Terminal signal fired
    SimulationStopped {
        time: Days,
        active_entities: i64,
    },
}

impl Event {
    /// Simulated time of the event
    pub fn time(&self) -> Days {
        match self {
            Event::PatientCreated { time, .. }
            | Event::QueueJoined { time, .. }
            | Event::QueueLeft { time, .. }
            | Event::ClinicGranted { time, .. }
            | Event::TheatreGranted { time, .. }
            | Event::PatientDischarged { time, .. }
            | Event::BlackoutStarted { time, .. }
            | Event::BlackoutEnded { time, .. }
            | Event::TraumaListStarted { time, .. }
            | Event::SimulationStopped { time, .. } => *time,
        }
    }

    /// Short name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::PatientCreated { .. } => "PatientCreated",
            Event::QueueJoined { .. } => "QueueJoined",
            Event::QueueLeft { .. } => "QueueLeft",
            Event::ClinicGranted { .. } => "ClinicGranted",
            Event::TheatreGranted { .. } => "TheatreGranted",
            Event::PatientDischarged { .. } => "PatientDischarged",
            Event::BlackoutStarted { .. } => "BlackoutStarted",
            Event::BlackoutEnded { .. } => "BlackoutEnded",
            Event::TraumaListStarted { .. } => "TraumaListStarted",
            Event::SimulationStopped { .. } => "SimulationStopped",
        }
    }

    pub fn patient_id(&self) -> Option<u64> {
        match self {
            Event::PatientCreated { patient_id, .. }
            | Event::QueueJoined { patient_id, .. }
            | Event::QueueLeft { patient_id, .. }
            | Event::ClinicGranted { patient_id, .. }
            | Event::TheatreGranted { patient_id, .. }
            | Event::PatientDischarged { patient_id, .. } => Some(*patient_id),
            _ => None,
        }
    }
}

/// Append-only log of events for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_patient(&self, patient_id: u64) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.patient_id() == Some(patient_id))
            .collect()
    }

    /// Patient ids in the order theatre was granted to them
    pub fn theatre_grant_order(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::TheatreGranted { patient_id, .. } => Some(*patient_id),
                _ => None,
            })
            .collect()
    }

    /// Number of times patients joined the waiting list for `stage`
    pub fn queue_joins(&self, stage: Stage) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::QueueJoined { stage: s, .. } if *s == stage))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time_and_type() {
        let event = Event::BlackoutStarted {
            time: 1.0,
            resource: "clinic".to_string(),
            until: 4.5,
        };
        assert_eq!(event.time(), 1.0);
        assert_eq!(event.event_type(), "BlackoutStarted");
        assert_eq!(event.patient_id(), None);
    }

    #[test]
    fn test_queue_joins_filters_by_stage() {
        let mut log = EventLog::new();
        log.log(Event::QueueJoined { time: 0.0, patient_id: 1, stage: Stage::Clinic });
        log.log(Event::QueueJoined { time: 0.0, patient_id: 2, stage: Stage::Theatre });
        log.log(Event::QueueJoined { time: 0.5, patient_id: 1, stage: Stage::Theatre });

        assert_eq!(log.queue_joins(Stage::Clinic), 1);
        assert_eq!(log.queue_joins(Stage::Theatre), 2);
        assert_eq!(log.queue_joins(Stage::Therapy), 0);
    }

    #[test]
    fn test_theatre_grant_order() {
        let mut log = EventLog::new();
        for id in [3, 1, 2] {
            log.log(Event::TheatreGranted { time: 0.0, patient_id: id, waited: 0.0, overall_wait: 0.0 });
        }
        assert_eq!(log.theatre_grant_order(), vec![3, 1, 2]);
    }
}
