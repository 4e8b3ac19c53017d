//! Pathway configuration
//!
//! `PathwayConfig` is the flat parameter set a caller supplies. Its
//! `Default` impl is the static default table. Because the struct is
//! `#[serde(default)]`, a JSON document can override any subset of fields.
//!
//! All weekly rates are turned into day-based durations once, in
//! [`PathwayConfig::timings`], after validation. Nothing downstream divides
//! by a configured value.

use crate::core::time::Days;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Days in a week; every weekly rate is converted through this
pub const DAYS_PER_WEEK: f64 = 7.0;

/// How often the termination monitor checks its condition
pub const MONITOR_INTERVAL_DAYS: Days = 1.0;

/// How session blackouts behave over a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackoutMode {
    /// No blackout processes at all
    Disabled,
    /// Each resource is blacked out exactly once per run
    #[default]
    OneShot,
    /// Open for the initial delay, then blacked out for the inter-session
    /// interval, repeated for the whole run
    Recurring,
}

/// Inter-arrival distribution of the referral generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalProcess {
    /// Exponential gaps (Poisson arrivals)
    #[default]
    Poisson,
    /// Constant gap equal to the mean interval
    Fixed,
}

/// Number of patients injected into each waiting list at time zero
///
/// Each count defaults independently, so `{"clinic": 5}` keeps the
/// default backlog on the other three lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefillConfig {
    pub clinic: usize,
    pub imaging: usize,
    pub therapy: usize,
    pub theatre: usize,
}

impl Default for PrefillConfig {
    fn default() -> Self {
        Self {
            clinic: 600,
            imaging: 300,
            therapy: 300,
            theatre: 600,
        }
    }
}

impl PrefillConfig {
    /// No backlog on any list
    pub fn empty() -> Self {
        Self {
            clinic: 0,
            imaging: 0,
            therapy: 0,
            theatre: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.clinic + self.imaging + self.therapy + self.theatre
    }
}

/// Complete parameter set for a run or a trial
///
/// # Example
///
/// ```rust
/// use hand_pathway_sim::PathwayConfig;
///
/// let config: PathwayConfig =
///     serde_json::from_str(r#"{ "referrals_per_week": 14.0, "horizon_days": 30.0 }"#).unwrap();
///
/// assert_eq!(config.referrals_per_week, 14.0);
/// assert_eq!(config.clinics_per_week, 2.0); // untouched fields keep defaults
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathwayConfig {
    /// GP referrals per week (0 disables the referral generator)
    pub referrals_per_week: f64,

    /// Surgical clinics per week
    pub clinics_per_week: f64,

    /// Appointments per clinic
    pub appointments_per_clinic: u32,

    /// Turnaround for imaging (days)
    pub imaging_wait_days: f64,

    /// Turnaround for hand therapy (days)
    pub therapy_wait_days: f64,

    /// Elective theatre lists per week
    pub theatre_lists_per_week: f64,

    /// Cases per theatre list
    pub cases_per_theatre_list: u32,

    /// Trauma lists per week
    pub trauma_lists_per_week: f64,

    /// Emergency cases each trauma list takes from the elective theatre
    pub trauma_extra_patients: u32,

    pub prob_needs_imaging: f64,

    pub prob_needs_therapy: f64,

    /// Referrals arriving at or after this day are not tracked
    pub horizon_days: f64,

    /// Backlog injected at time zero
    pub prefill: PrefillConfig,

    /// Replications in a trial
    pub number_of_runs: usize,

    /// Base seed; each run derives its own stream from it
    pub rng_seed: u64,

    /// Simulated-time cap after which a run counts as non-terminating
    pub run_guard_days: f64,

    pub blackout_mode: BlackoutMode,

    /// Open period before a blackout begins (days)
    pub blackout_initial_delay_days: f64,

    pub arrival_process: ArrivalProcess,
}

impl Default for PathwayConfig {
    fn default() -> Self {
        Self {
            referrals_per_week: 10.0,
            clinics_per_week: 2.0,
            appointments_per_clinic: 6,
            imaging_wait_days: 14.0,
            therapy_wait_days: 30.0,
            theatre_lists_per_week: 2.0,
            cases_per_theatre_list: 5,
            trauma_lists_per_week: 2.0,
            trauma_extra_patients: 0,
            prob_needs_imaging: 0.25,
            prob_needs_therapy: 0.25,
            horizon_days: 100.0,
            prefill: PrefillConfig::default(),
            number_of_runs: 5,
            rng_seed: 42,
            run_guard_days: 36_500.0,
            blackout_mode: BlackoutMode::OneShot,
            blackout_initial_delay_days: 1.0,
            arrival_process: ArrivalProcess::Poisson,
        }
    }
}

/// Configuration validation failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive and finite (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative and finite (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a probability in [0, 1] (got {value})")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("run guard ({guard} days) must lie beyond the horizon ({horizon} days)")]
    GuardBeforeHorizon { guard: f64, horizon: f64 },

    #[error("{field} is too small: the interval between events would not be finite (got {value})")]
    IntervalOverflow { field: &'static str, value: f64 },
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

/// Weekly rate whose derived interval `7 / rate` must be finite
fn weekly_rate(field: &'static str, rate: f64) -> Result<(), ConfigError> {
    if (DAYS_PER_WEEK / rate).is_finite() {
        Ok(())
    } else {
        Err(ConfigError::IntervalOverflow { field, value: rate })
    }
}

fn at_least_one(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::ZeroCount { field })
    }
}

impl PathwayConfig {
    /// Reject any parameter that would produce a division by zero, a
    /// negative or infinite duration, or an impossible probability
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("referrals_per_week", self.referrals_per_week)?;
        if self.referrals_per_week > 0.0 {
            weekly_rate("referrals_per_week", self.referrals_per_week)?;
        }
        positive("clinics_per_week", self.clinics_per_week)?;
        weekly_rate("clinics_per_week", self.clinics_per_week)?;
        at_least_one("appointments_per_clinic", self.appointments_per_clinic as u64)?;
        non_negative("imaging_wait_days", self.imaging_wait_days)?;
        non_negative("therapy_wait_days", self.therapy_wait_days)?;
        positive("theatre_lists_per_week", self.theatre_lists_per_week)?;
        weekly_rate("theatre_lists_per_week", self.theatre_lists_per_week)?;
        at_least_one("cases_per_theatre_list", self.cases_per_theatre_list as u64)?;
        if self.trauma_extra_patients > 0 {
            positive("trauma_lists_per_week", self.trauma_lists_per_week)?;
            weekly_rate("trauma_lists_per_week", self.trauma_lists_per_week)?;
        } else {
            non_negative("trauma_lists_per_week", self.trauma_lists_per_week)?;
        }
        probability("prob_needs_imaging", self.prob_needs_imaging)?;
        probability("prob_needs_therapy", self.prob_needs_therapy)?;
        positive("horizon_days", self.horizon_days)?;
        at_least_one("number_of_runs", self.number_of_runs as u64)?;
        positive("run_guard_days", self.run_guard_days)?;
        if self.run_guard_days <= self.horizon_days {
            return Err(ConfigError::GuardBeforeHorizon {
                guard: self.run_guard_days,
                horizon: self.horizon_days,
            });
        }
        positive("blackout_initial_delay_days", self.blackout_initial_delay_days)?;
        Ok(())
    }

    /// Derive day-based durations
    ///
    /// Call only on a validated config.
    pub fn timings(&self) -> PathwayTimings {
        let referral_interval = if self.referrals_per_week > 0.0 {
            Some(DAYS_PER_WEEK / self.referrals_per_week)
        } else {
            None
        };
        let theatre_case = 1.0 / self.cases_per_theatre_list as f64;
        let trauma = if self.trauma_extra_patients > 0 {
            Some(TraumaLoad {
                interval: DAYS_PER_WEEK / self.trauma_lists_per_week,
                duration: self.trauma_extra_patients as f64 * theatre_case,
                extra_patients: self.trauma_extra_patients,
            })
        } else {
            None
        };

        PathwayTimings {
            horizon: self.horizon_days,
            referral_interval,
            arrival_process: self.arrival_process,
            clinic_appointment: 1.0 / self.appointments_per_clinic as f64,
            clinic_interval: DAYS_PER_WEEK / self.clinics_per_week,
            imaging_turnaround: self.imaging_wait_days,
            therapy_turnaround: self.therapy_wait_days,
            theatre_case,
            theatre_interval: DAYS_PER_WEEK / self.theatre_lists_per_week,
            trauma,
            blackout_mode: self.blackout_mode,
            blackout_initial_delay: self.blackout_initial_delay_days,
            prob_needs_imaging: self.prob_needs_imaging,
            prob_needs_therapy: self.prob_needs_therapy,
            monitor_interval: MONITOR_INTERVAL_DAYS,
        }
    }

    /// Queue lengths at time zero
    pub fn before_snapshot(&self) -> crate::models::QueueSnapshot {
        crate::models::QueueSnapshot::new(
            self.prefill.clinic,
            self.prefill.imaging,
            self.prefill.therapy,
            self.prefill.theatre,
        )
    }
}

/// Emergency load on the theatre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraumaLoad {
    /// Days between trauma lists
    pub interval: Days,
    /// Theatre time taken per list
    pub duration: Days,
    pub extra_patients: u32,
}

/// Day-based durations derived from a validated [`PathwayConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathwayTimings {
    pub horizon: Days,
    /// Mean gap between referrals; `None` when referrals are disabled
    pub referral_interval: Option<Days>,
    pub arrival_process: ArrivalProcess,
    pub clinic_appointment: Days,
    pub clinic_interval: Days,
    pub imaging_turnaround: Days,
    pub therapy_turnaround: Days,
    pub theatre_case: Days,
    pub theatre_interval: Days,
    pub trauma: Option<TraumaLoad>,
    pub blackout_mode: BlackoutMode,
    pub blackout_initial_delay: Days,
    pub prob_needs_imaging: f64,
    pub prob_needs_therapy: f64,
    pub monitor_interval: Days,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PathwayConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_timings() {
        let t = PathwayConfig::default().timings();
        assert_eq!(t.referral_interval, Some(0.7));
        assert!((t.clinic_appointment - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(t.clinic_interval, 3.5);
        assert_eq!(t.theatre_case, 0.2);
        assert_eq!(t.theatre_interval, 3.5);
        assert!(t.trauma.is_none());
    }

    #[test]
    fn test_zero_referrals_disables_generator() {
        let config = PathwayConfig {
            referrals_per_week: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.timings().referral_interval, None);
    }

    #[test]
    fn test_trauma_load_derivation() {
        let config = PathwayConfig {
            trauma_extra_patients: 3,
            trauma_lists_per_week: 1.0,
            ..Default::default()
        };
        let trauma = config.timings().trauma.unwrap();
        assert_eq!(trauma.interval, 7.0);
        assert!((trauma.duration - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_override() {
        let config: PathwayConfig =
            serde_json::from_str(r#"{ "prefill": { "clinic": 5 }, "blackout_mode": "recurring" }"#)
                .unwrap();
        assert_eq!(config.prefill.clinic, 5);
        assert_eq!(config.prefill.imaging, 300);
        assert_eq!(config.prefill.therapy, 300);
        assert_eq!(config.prefill.theatre, 600);
        assert_eq!(config.blackout_mode, BlackoutMode::Recurring);
    }

    #[test]
    fn test_empty_prefill() {
        assert_eq!(PrefillConfig::empty().total(), 0);
        assert_eq!(PrefillConfig::default().total(), 1800);
    }
}
