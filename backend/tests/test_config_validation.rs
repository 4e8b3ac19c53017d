//! Configuration validation and JSON overrides

use hand_pathway_sim::{
    ArrivalProcess, BlackoutMode, ConfigError, PathwayConfig, PathwayRun, SimulationError, Trial,
    TrialError,
};

#[test]
fn test_defaults_are_valid() {
    assert_eq!(PathwayConfig::default().validate(), Ok(()));
}

#[test]
fn test_zero_sessions_rejected() {
    let config = PathwayConfig {
        theatre_lists_per_week: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NonPositive { field: "theatre_lists_per_week", .. })
    ));
}

#[test]
fn test_zero_capacity_rejected() {
    let config = PathwayConfig {
        appointments_per_clinic: 0,
        ..Default::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::ZeroCount { field: "appointments_per_clinic" })
    );
}

#[test]
fn test_negative_referral_rate_rejected() {
    let config = PathwayConfig {
        referrals_per_week: -1.0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Negative { field: "referrals_per_week", .. })
    ));
}

#[test]
fn test_probabilities_must_be_in_unit_interval() {
    for bad in [-0.1, 1.5, f64::NAN] {
        let config = PathwayConfig {
            prob_needs_therapy: bad,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { field: "prob_needs_therapy", .. })
        ));
    }
}

#[test]
fn test_non_finite_horizon_rejected() {
    let config = PathwayConfig {
        horizon_days: f64::INFINITY,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NonPositive { field: "horizon_days", .. })
    ));
}

#[test]
fn test_subnormal_rates_rejected_before_running() {
    let config = PathwayConfig {
        referrals_per_week: 1e-310,
        ..Default::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::IntervalOverflow {
            field: "referrals_per_week",
            value: 1e-310,
        })
    );
    assert!(matches!(
        PathwayRun::new(0, config, 1),
        Err(SimulationError::InvalidConfig(ConfigError::IntervalOverflow { .. }))
    ));

    let config = PathwayConfig {
        theatre_lists_per_week: 1e-310,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::IntervalOverflow { field: "theatre_lists_per_week", .. })
    ));
}

#[test]
fn test_guard_must_lie_beyond_horizon() {
    let config = PathwayConfig {
        horizon_days: 100.0,
        run_guard_days: 100.0,
        ..Default::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::GuardBeforeHorizon { guard: 100.0, horizon: 100.0 })
    );
}

#[test]
fn test_trauma_load_needs_lists() {
    let config = PathwayConfig {
        trauma_extra_patients: 2,
        trauma_lists_per_week: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NonPositive { field: "trauma_lists_per_week", .. })
    ));

    // Without extra patients the list rate is irrelevant
    let idle = PathwayConfig {
        trauma_lists_per_week: 0.0,
        ..Default::default()
    };
    assert_eq!(idle.validate(), Ok(()));
}

#[test]
fn test_run_and_trial_reject_invalid_config() {
    let config = PathwayConfig {
        clinics_per_week: -2.0,
        ..Default::default()
    };
    assert!(matches!(
        PathwayRun::new(0, config.clone(), 1),
        Err(SimulationError::InvalidConfig(ConfigError::NonPositive { .. }))
    ));
    assert!(matches!(Trial::new(config), Err(TrialError::Config(_))));
}

#[test]
fn test_json_overrides_subset_of_fields() {
    let json = r#"{
        "referrals_per_week": 0,
        "number_of_runs": 2,
        "prefill": { "theatre": 12 },
        "blackout_mode": "disabled",
        "arrival_process": "fixed"
    }"#;
    let config: PathwayConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.referrals_per_week, 0.0);
    assert_eq!(config.number_of_runs, 2);
    assert_eq!(config.prefill.theatre, 12);
    // Lists not named in the override keep their default backlog
    let defaults = PathwayConfig::default().prefill;
    assert_eq!(config.prefill.clinic, defaults.clinic);
    assert_eq!(config.prefill.imaging, defaults.imaging);
    assert_eq!(config.prefill.therapy, defaults.therapy);
    assert_eq!(config.blackout_mode, BlackoutMode::Disabled);
    assert_eq!(config.arrival_process, ArrivalProcess::Fixed);
    assert_eq!(config.imaging_wait_days, 14.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_single_prefill_override_keeps_other_defaults() {
    let config: PathwayConfig = serde_json::from_str(r#"{"prefill":{"clinic":5}}"#).unwrap();
    let defaults = PathwayConfig::default().prefill;

    assert_eq!(config.prefill.clinic, 5);
    assert_eq!(config.prefill.imaging, defaults.imaging);
    assert_eq!(config.prefill.therapy, defaults.therapy);
    assert_eq!(config.prefill.theatre, defaults.theatre);
}

#[test]
fn test_config_round_trips_through_json() {
    let config = PathwayConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: PathwayConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, back);
}

#[test]
fn test_error_messages_name_the_field() {
    let err = ConfigError::NonPositive {
        field: "clinics_per_week",
        value: 0.0,
    };
    assert!(err.to_string().contains("clinics_per_week"));
}
