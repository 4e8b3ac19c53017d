//! Patient journey through the pathway
//!
//! One `PatientJourney` per patient. The journey is a state machine whose
//! `leg` names what the process is waiting for when it is next resumed:
//!
//! ```text
//! Start ─┬─► AwaitingClinic ─► InClinic ─┐
//!        └───────────────────────────────┴─► CheckImaging ─► (InImaging) ─►
//!   CheckTherapy ─► (InTherapy) ─► QueueForTheatre ─► AwaitingTheatre ─►
//!   InTheatre ─► Done
//! ```
//!
//! Counter updates sit between suspension points, so a `join` and its
//! matching `leave` can never interleave with another process.

use super::PathwayResources;
use crate::models::{Event, Patient, RunState, Stage, WaitRecord};
use crate::orchestrator::SimulationError;
use crate::scheduler::{Context, Process, Step};
use crate::core::time::Days;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Leg {
    Start,
    AwaitingClinic { queued_at: Days },
    InClinic,
    CheckImaging,
    InImaging,
    CheckTherapy,
    InTherapy,
    QueueForTheatre,
    AwaitingTheatre { queued_at: Days },
    InTheatre,
    Done,
}

/// Process that walks one patient from referral to theatre
pub struct PatientJourney {
    patient: Patient,
    resources: PathwayResources,
    leg: Leg,
}

impl PatientJourney {
    pub fn new(patient: Patient, resources: PathwayResources) -> Self {
        Self {
            patient,
            resources,
            leg: Leg::Start,
        }
    }

    pub fn patient(&self) -> &Patient {
        &self.patient
    }
}

impl Process<RunState> for PatientJourney {
    fn name(&self) -> &'static str {
        "patient_journey"
    }

    fn resume(&mut self, ctx: &mut Context<'_, RunState>) -> Result<Step, SimulationError> {
        let now = ctx.now();
        let timings = *ctx.state().timings();
        let id = self.patient.id();

        loop {
            match self.leg {
                Leg::Start => {
                    self.patient.mark_entered_pathway(now);
                    if self.patient.already_seen_clinic() {
                        self.leg = Leg::CheckImaging;
                        continue;
                    }
                    let state = ctx.state_mut();
                    state.queues_mut().join(Stage::Clinic);
                    state.log(Event::QueueJoined { time: now, patient_id: id, stage: Stage::Clinic });
                    self.leg = Leg::AwaitingClinic { queued_at: now };
                    return Ok(Step::Acquire(self.resources.clinic));
                }

                Leg::AwaitingClinic { queued_at } => {
                    let waited = now - queued_at;
                    self.patient.record_clinic_wait(waited);
                    let state = ctx.state_mut();
                    state.queues_mut().leave(Stage::Clinic)?;
                    state.log(Event::QueueLeft { time: now, patient_id: id, stage: Stage::Clinic });
                    state.log(Event::ClinicGranted { time: now, patient_id: id, waited });
                    trace!(patient = id, now, waited, "clinic granted");
                    self.leg = Leg::InClinic;
                    return Ok(Step::Timeout(timings.clinic_appointment));
                }

                Leg::InClinic => {
                    ctx.release(self.resources.clinic)?;
                    self.leg = Leg::CheckImaging;
                }

                Leg::CheckImaging => {
                    if !self.patient.visits_imaging() {
                        self.leg = Leg::CheckTherapy;
                        continue;
                    }
                    let state = ctx.state_mut();
                    state.queues_mut().join(Stage::Imaging);
                    state.log(Event::QueueJoined { time: now, patient_id: id, stage: Stage::Imaging });
                    self.leg = Leg::InImaging;
                    return Ok(Step::Timeout(timings.imaging_turnaround));
                }

                Leg::InImaging => {
                    let state = ctx.state_mut();
                    state.queues_mut().leave(Stage::Imaging)?;
                    state.log(Event::QueueLeft { time: now, patient_id: id, stage: Stage::Imaging });
                    self.leg = Leg::CheckTherapy;
                }

                Leg::CheckTherapy => {
                    if !self.patient.visits_therapy() {
                        self.leg = Leg::QueueForTheatre;
                        continue;
                    }
                    let state = ctx.state_mut();
                    state.queues_mut().join(Stage::Therapy);
                    state.log(Event::QueueJoined { time: now, patient_id: id, stage: Stage::Therapy });
                    self.leg = Leg::InTherapy;
                    return Ok(Step::Timeout(timings.therapy_turnaround));
                }

                Leg::InTherapy => {
                    let state = ctx.state_mut();
                    state.queues_mut().leave(Stage::Therapy)?;
                    state.log(Event::QueueLeft { time: now, patient_id: id, stage: Stage::Therapy });
                    self.leg = Leg::QueueForTheatre;
                }

                Leg::QueueForTheatre => {
                    let state = ctx.state_mut();
                    state.queues_mut().join(Stage::Theatre);
                    state.log(Event::QueueJoined { time: now, patient_id: id, stage: Stage::Theatre });
                    self.leg = Leg::AwaitingTheatre { queued_at: now };
                    return Ok(Step::Acquire(self.resources.theatre));
                }

                Leg::AwaitingTheatre { queued_at } => {
                    self.patient.record_theatre_grant(now, queued_at);
                    let state = ctx.state_mut();
                    state.queues_mut().leave(Stage::Theatre)?;
                    state.log(Event::QueueLeft { time: now, patient_id: id, stage: Stage::Theatre });
                    state.log(Event::TheatreGranted {
                        time: now,
                        patient_id: id,
                        waited: self.patient.theatre_q_time(),
                        overall_wait: self.patient.overall_q_time(),
                    });
                    trace!(patient = id, now, overall = self.patient.overall_q_time(), "theatre granted");
                    self.leg = Leg::InTheatre;
                    return Ok(Step::Timeout(timings.theatre_case));
                }

                Leg::InTheatre => {
                    ctx.release(self.resources.theatre)?;
                    let state = ctx.state_mut();
                    if self.patient.before_end_sim() {
                        state.remove_active();
                    }
                    let wait_recorded = id > state.prefill_total() && self.patient.before_end_sim();
                    if wait_recorded {
                        state.record_wait(WaitRecord {
                            referral_day: self.patient.time_entered_pathway(),
                            total_wait: self.patient.overall_q_time(),
                        });
                    }
                    state.log(Event::PatientDischarged { time: now, patient_id: id, wait_recorded });
                    self.leg = Leg::Done;
                    return Ok(Step::Finish);
                }

                Leg::Done => return Ok(Step::Finish),
            }
        }
    }
}
