//! Trial harness: seeding, parallel equivalence and aggregation

use hand_pathway_sim::trial::{
    concatenate_wait_records, filter_by_day, final_referral_day, mean_wait, RunQueueRecord,
};
use hand_pathway_sim::{PathwayConfig, PrefillConfig, QueueSnapshot, Trial, WaitRecord};
use proptest::prelude::*;

fn small_trial() -> PathwayConfig {
    PathwayConfig {
        number_of_runs: 4,
        rng_seed: 2024,
        horizon_days: 20.0,
        prefill: PrefillConfig {
            clinic: 10,
            imaging: 2,
            therapy: 2,
            theatre: 10,
        },
        ..Default::default()
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let trial = Trial::new(small_trial()).unwrap();
    let sequential = trial.run().unwrap();
    let parallel = trial.run_parallel().unwrap();

    assert_eq!(sequential.wait_records, parallel.wait_records);
    assert_eq!(sequential.queue_records, parallel.queue_records);
    assert_eq!(sequential.runs, parallel.runs);
    assert_eq!(sequential.summary(), parallel.summary());
}

#[test]
fn test_one_queue_record_per_run_in_order() {
    let results = Trial::new(small_trial()).unwrap().run().unwrap();
    let runs: Vec<usize> = results.queue_records.iter().map(|r| r.run).collect();
    assert_eq!(runs, vec![0, 1, 2, 3]);

    let seeds: Vec<u64> = results.runs.iter().map(|r| r.seed).collect();
    for (i, a) in seeds.iter().enumerate() {
        for b in &seeds[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_wait_records_are_run_concatenation() {
    let trial = Trial::new(small_trial()).unwrap();
    let results = trial.run().unwrap();

    let mut expected = Vec::new();
    for run in 0..4 {
        expected.extend(trial.run_one(run).unwrap().wait_records);
    }
    assert_eq!(results.wait_records, expected);

    let recorded: usize = results.runs.iter().map(|r| r.recorded_patients).sum();
    assert_eq!(recorded, results.wait_records.len());
}

#[test]
fn test_summary_before_and_after() {
    let results = Trial::new(small_trial()).unwrap().run().unwrap();
    let summary = results.summary();

    assert_eq!(summary.runs, 4);
    assert_eq!(summary.before, QueueSnapshot::new(10, 2, 2, 10));
    assert_eq!(summary.total_before, 24);
    assert!((summary.total_after - summary.mean_after.total()).abs() < 1e-12);
    assert_eq!(summary.final_day, 19);
    assert_eq!(summary.qualifying_patients, results.wait_records.len());
    assert_eq!(summary.config_hash, results.config_hash);

    let day0 = filter_by_day(&results.wait_records, 0);
    assert_eq!(summary.mean_wait_first_day, mean_wait(&day0));
}

#[test]
fn test_summary_without_referrals_has_no_day_means() {
    let config = PathwayConfig {
        referrals_per_week: 0.0,
        number_of_runs: 2,
        horizon_days: 5.0,
        prefill: PrefillConfig {
            theatre: 3,
            ..PrefillConfig::empty()
        },
        ..Default::default()
    };
    let summary = Trial::new(config).unwrap().run().unwrap().summary();

    assert_eq!(summary.mean_wait_first_day, None);
    assert_eq!(summary.mean_wait_final_day, None);
    assert_eq!(summary.qualifying_patients, 0);
    assert_eq!(summary.total_after, 0.0);
}

#[test]
fn test_results_serialize_to_json() {
    let results = Trial::new(PathwayConfig {
        number_of_runs: 1,
        ..small_trial()
    })
    .unwrap()
    .run()
    .unwrap();
    let json = serde_json::to_value(&results.summary()).unwrap();
    assert_eq!(json["runs"], 1);
    assert!(json["mean_after"]["clinic"].is_number());
}

#[test]
fn test_final_referral_day_edges() {
    assert_eq!(final_referral_day(1.0), 0);
    assert_eq!(final_referral_day(7.25), 7);
    assert_eq!(final_referral_day(365.0), 364);
}

fn records() -> impl Strategy<Value = Vec<WaitRecord>> {
    prop::collection::vec(
        (0.0f64..10.0, 0.0f64..200.0).prop_map(|(referral_day, total_wait)| WaitRecord {
            referral_day,
            total_wait,
        }),
        0..40,
    )
}

fn sorted_waits(records: &[WaitRecord]) -> Vec<f64> {
    let mut waits: Vec<f64> = records.iter().map(|r| r.total_wait).collect();
    waits.sort_by(f64::total_cmp);
    waits
}

proptest! {
    /// Filtering the pooled records equals pooling each run's filtered records
    #[test]
    fn prop_filter_commutes_with_concatenation(a in records(), b in records(), day in 0u64..10) {
        let pooled_then_filtered =
            filter_by_day(&concatenate_wait_records(vec![a.clone(), b.clone()]), day);
        let filtered_then_pooled =
            concatenate_wait_records(vec![filter_by_day(&a, day), filter_by_day(&b, day)]);
        prop_assert_eq!(pooled_then_filtered, filtered_then_pooled);
    }

    /// Filtering a concatenation gives the same records whatever the run order
    #[test]
    fn prop_filter_ignores_run_order(a in records(), b in records(), day in 0u64..10) {
        let ab = concatenate_wait_records(vec![a.clone(), b.clone()]);
        let ba = concatenate_wait_records(vec![b, a]);

        prop_assert_eq!(ab.len(), ba.len());
        let fab = filter_by_day(&ab, day);
        let fba = filter_by_day(&ba, day);
        prop_assert_eq!(sorted_waits(&fab), sorted_waits(&fba));

        match (mean_wait(&fab), mean_wait(&fba)) {
            (Some(x), Some(y)) => prop_assert!((x - y).abs() < 1e-9),
            (None, None) => {}
            other => prop_assert!(false, "mismatched means {:?}", other),
        }
    }

    /// The mean after-queue does not depend on the order of run records
    #[test]
    fn prop_mean_queues_order_independent(
        snapshots in prop::collection::vec((0usize..50, 0usize..50, 0usize..50, 0usize..50), 1..10)
    ) {
        let forward: Vec<RunQueueRecord> = snapshots
            .iter()
            .enumerate()
            .map(|(run, &(c, i, t, th))| RunQueueRecord { run, queues: QueueSnapshot::new(c, i, t, th) })
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = hand_pathway_sim::trial::mean_queues(&forward);
        let b = hand_pathway_sim::trial::mean_queues(&reversed);
        prop_assert!((a.clinic - b.clinic).abs() < 1e-9);
        prop_assert!((a.theatre - b.theatre).abs() < 1e-9);
        prop_assert!((a.total() - b.total()).abs() < 1e-9);
    }
}
