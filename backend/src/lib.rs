//! Hand Pathway Simulator - Rust Engine
//!
//! Stochastic discrete-event simulation of an elective hand-surgery
//! pathway: GP referral, surgical clinic, optional imaging and hand
//! therapy, then theatre. Used to ask whether a backlog shrinks or grows
//! under a given capacity.
//!
//! # Architecture
//!
//! - **core**: Simulated time
//! - **rng**: Deterministic random number generation
//! - **scheduler**: Event loop and FIFO resources
//! - **models**: Domain types (Patient, Event, RunState)
//! - **arrivals**: Referral generator and queue pre-fill
//! - **pathway**: Patient journey, blackouts, trauma lists, termination
//! - **orchestrator**: Configuration and the per-run controller
//! - **trial**: Multi-run harness and aggregation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG per run)
//! 2. Resource grants are strictly FIFO
//! 3. Queue counters never go below zero

// Module declarations
pub mod arrivals;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod pathway;
pub mod rng;
pub mod scheduler;
pub mod trial;

// Re-exports for convenience
pub use core::time::SimClock;
pub use models::{
    event::{Event, EventLog, PatientSource},
    patient::{Patient, Stage},
    state::{QueueCounters, QueueSnapshot, RunState, WaitRecord},
};
pub use orchestrator::{
    compute_config_hash, ArrivalProcess, BlackoutMode, ConfigError, PathwayConfig, PathwayRun,
    PrefillConfig, RunOutput, SimulationError,
};
pub use rng::RngManager;
pub use trial::{StageMeans, Trial, TrialError, TrialResults, TrialSummary};
