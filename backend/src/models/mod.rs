//! Domain models for the pathway simulator

pub mod event;
pub mod patient;
pub mod state;

// Re-exports
pub use event::{Event, EventLog, PatientSource};
pub use patient::{Patient, Stage};
pub use state::{QueueCounters, QueueSnapshot, RunState, WaitRecord};
