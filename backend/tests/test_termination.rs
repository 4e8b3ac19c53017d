//! Run termination: the monitor, the horizon and the run guard

use hand_pathway_sim::{
    BlackoutMode, Event, PathwayConfig, PathwayRun, PrefillConfig, SimulationError,
};
use proptest::prelude::*;

fn empty_run(horizon: f64) -> PathwayConfig {
    PathwayConfig {
        referrals_per_week: 0.0,
        prefill: PrefillConfig::empty(),
        blackout_mode: BlackoutMode::Disabled,
        horizon_days: horizon,
        ..Default::default()
    }
}

#[test]
fn test_monitor_fires_on_first_daily_check_past_horizon() {
    let output = PathwayRun::new(0, empty_run(5.5), 1).unwrap().run().unwrap();
    assert_eq!(output.end_time, 6.0);
}

#[test]
fn test_stop_event_logged_once_at_end_time() {
    let output = PathwayRun::new(0, empty_run(4.0), 1).unwrap().run().unwrap();
    let stops = output.event_log.events_of_type("SimulationStopped");
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0].time(), output.end_time);
    assert!(matches!(stops[0], Event::SimulationStopped { active_entities: 0, .. }));
}

#[test]
fn test_run_waits_for_backlog_past_horizon() {
    let config = PathwayConfig {
        referrals_per_week: 0.0,
        prob_needs_therapy: 1.0,
        prefill: PrefillConfig {
            clinic: 2,
            ..PrefillConfig::empty()
        },
        horizon_days: 3.0,
        ..Default::default()
    };
    let therapy = config.therapy_wait_days;
    let output = PathwayRun::new(0, config, 1).unwrap().run().unwrap();

    assert!(output.end_time > therapy);
    assert_eq!(output.active_entities_at_end, 0);
    assert_eq!(output.event_log.events_of_type("PatientDischarged").len(), 2);
}

#[test]
fn test_overloaded_pathway_hits_run_guard() {
    let config = PathwayConfig {
        referrals_per_week: 70.0,
        cases_per_theatre_list: 1,
        prefill: PrefillConfig::empty(),
        horizon_days: 5.0,
        run_guard_days: 20.0,
        ..Default::default()
    };
    let err = PathwayRun::new(0, config, 1).unwrap().run().unwrap_err();
    match err {
        SimulationError::DidNotTerminate { now, limit } => {
            assert_eq!(limit, 20.0);
            assert!(now <= 20.0);
        }
        other => panic!("expected DidNotTerminate, got {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// With nobody in the pathway the run ends on the first whole day at
    /// or past the horizon, and never before day 1
    #[test]
    fn prop_empty_run_ends_on_first_check_past_horizon(horizon in 0.1f64..40.0) {
        let output = PathwayRun::new(0, empty_run(horizon), 1).unwrap().run().unwrap();
        let expected = horizon.ceil().max(1.0);
        prop_assert_eq!(output.end_time, expected);
        prop_assert!(output.end_time >= horizon);
    }

    /// Small random pathways always drain: counters end at zero and every
    /// patient referred before the horizon was discharged
    #[test]
    fn prop_small_runs_drain_cleanly(
        clinic in 0usize..6,
        imaging in 0usize..6,
        therapy in 0usize..6,
        theatre in 0usize..6,
        referrals in 0.0f64..14.0,
        horizon in 1.0f64..15.0,
        p_img in 0.0f64..=1.0,
        p_ther in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let config = PathwayConfig {
            referrals_per_week: referrals,
            prob_needs_imaging: p_img,
            prob_needs_therapy: p_ther,
            prefill: PrefillConfig { clinic, imaging, therapy, theatre },
            horizon_days: horizon,
            ..Default::default()
        };
        let output = PathwayRun::new(0, config, seed).unwrap().run().unwrap();

        prop_assert_eq!(output.active_entities_at_end, 0);
        prop_assert!(output.end_time >= horizon);
        let e = output.queue_entries;
        let f = output.final_queues;
        prop_assert!(f.clinic <= e.clinic && f.imaging <= e.imaging);
        prop_assert!(f.therapy <= e.therapy && f.theatre <= e.theatre);
        for record in &output.wait_records {
            prop_assert!(record.total_wait >= 0.0);
            prop_assert!(record.referral_day < horizon);
        }
    }
}
