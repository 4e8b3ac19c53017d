//! Orchestrator - configuration and the per-replication run controller
//!
//! See `engine.rs` for the run loop and `config.rs` for the parameter set.

pub mod config;
pub mod config_hash;
pub mod engine;

pub use config::{
    ArrivalProcess, BlackoutMode, ConfigError, PathwayConfig, PathwayTimings, PrefillConfig,
    TraumaLoad, DAYS_PER_WEEK, MONITOR_INTERVAL_DAYS,
};
pub use config_hash::compute_config_hash;
pub use engine::{PathwayRun, RunOutput, SimulationError};
