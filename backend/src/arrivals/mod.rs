//! Patient arrivals
//!
//! Two ways a patient enters a run:
//!
//! 1. **Pre-fill**: a backlog injected at time zero, straight into the
//!    waiting list for each stage, before any other process runs
//! 2. **Referrals**: an unbounded generator with Poisson (or fixed-gap)
//!    arrivals, abandoned when the scheduler stops
//!
//! # Key Principles
//!
//! 1. **Determinism**: every draw comes from the run's own [`RngManager`]
//!    in a fixed order (imaging first, then therapy)
//! 2. **Monotonic ids**: pre-filled patients take ids `1..=N`, referrals
//!    follow on
//! 3. **Horizon tagging**: referrals at or after the horizon are still
//!    simulated but never counted as active or recorded
//!
//! [`RngManager`]: crate::rng::RngManager

use crate::core::time::Days;
use crate::models::{Event, Patient, PatientSource, RunState, Stage};
use crate::orchestrator::{ArrivalProcess, PrefillConfig, SimulationError};
use crate::pathway::{PathwayResources, PatientJourney};
use crate::scheduler::{Context, Process, Scheduler, Step};
use tracing::{debug, trace};

/// Inject the configured backlog into each waiting list
///
/// Patients are scheduled in stage order (clinic, imaging, therapy,
/// theatre) so they queue for their resource in that order at time zero.
/// Returns the number of patients created.
pub fn prefill_queues(
    scheduler: &mut Scheduler<RunState>,
    prefill: &PrefillConfig,
    resources: PathwayResources,
) -> u64 {
    let batches = [
        (Stage::Clinic, prefill.clinic),
        (Stage::Imaging, prefill.imaging),
        (Stage::Therapy, prefill.therapy),
        (Stage::Theatre, prefill.theatre),
    ];

    let mut created = 0;
    for (stage, count) in batches {
        for _ in 0..count {
            let state = scheduler.state_mut();
            let timings = *state.timings();
            let id = state.next_patient_id();
            let (needs_imaging, needs_therapy) = match stage {
                Stage::Clinic => {
                    let imaging = state.rng_mut().bernoulli(timings.prob_needs_imaging);
                    let therapy = state.rng_mut().bernoulli(timings.prob_needs_therapy);
                    (imaging, therapy)
                }
                Stage::Imaging => (true, state.rng_mut().bernoulli(timings.prob_needs_therapy)),
                Stage::Therapy => (false, true),
                Stage::Theatre => (false, false),
            };
            let patient = Patient::prefilled(id, stage, needs_imaging, needs_therapy);
            state.add_active();
            state.log(Event::PatientCreated {
                time: 0.0,
                patient_id: id,
                source: PatientSource::Prefill { stage },
                needs_imaging: patient.needs_imaging(),
                needs_therapy: patient.needs_therapy(),
                before_end_sim: true,
            });
            scheduler.schedule(Box::new(PatientJourney::new(patient, resources)));
            created += 1;
        }
        debug!(stage = %stage, count, "queue pre-filled");
    }
    created
}

/// Unbounded referral process
///
/// Creates one patient per cycle and sleeps for the next inter-arrival
/// gap. With referrals disabled it finishes on its first resume.
pub struct ReferralGenerator {
    resources: PathwayResources,
}

impl ReferralGenerator {
    pub fn new(resources: PathwayResources) -> Self {
        Self { resources }
    }

    fn next_gap(state: &mut RunState, mean: Days) -> Days {
        match state.timings().arrival_process {
            ArrivalProcess::Poisson => state.rng_mut().exponential(mean),
            ArrivalProcess::Fixed => mean,
        }
    }
}

impl Process<RunState> for ReferralGenerator {
    fn name(&self) -> &'static str {
        "referral_generator"
    }

    fn resume(&mut self, ctx: &mut Context<'_, RunState>) -> Result<Step, SimulationError> {
        let now = ctx.now();
        let state = ctx.state_mut();
        let timings = *state.timings();
        let Some(mean_gap) = timings.referral_interval else {
            debug!("referrals disabled");
            return Ok(Step::Finish);
        };

        let id = state.next_patient_id();
        let needs_imaging = state.rng_mut().bernoulli(timings.prob_needs_imaging);
        let needs_therapy = state.rng_mut().bernoulli(timings.prob_needs_therapy);
        let before_end_sim = now < timings.horizon;
        if before_end_sim {
            state.add_active();
        }
        state.log(Event::PatientCreated {
            time: now,
            patient_id: id,
            source: PatientSource::Referral,
            needs_imaging,
            needs_therapy,
            before_end_sim,
        });
        trace!(patient = id, now, needs_imaging, needs_therapy, before_end_sim, "referral");

        let gap = Self::next_gap(state, mean_gap);
        let patient = Patient::referral(id, needs_imaging, needs_therapy, before_end_sim);
        ctx.spawn(Box::new(PatientJourney::new(patient, self.resources)));
        Ok(Step::Timeout(gap))
    }
}
