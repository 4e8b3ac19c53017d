//! FIFO behaviour of resources, directly and through the scheduler

use hand_pathway_sim::scheduler::{Context, Process, ProcessId, Resource, ResourceId, Scheduler, Step};
use hand_pathway_sim::SimulationError;
use proptest::prelude::*;

#[test]
fn test_grant_when_free() {
    let mut clinic = Resource::new("clinic", 1);
    assert!(clinic.request(ProcessId::new(0)));
    assert_eq!(clinic.in_use(), 1);
    assert_eq!(clinic.queue_len(), 0);
    assert!(clinic.is_held_by(ProcessId::new(0)));
}

#[test]
fn test_release_hands_slot_to_oldest_waiter() {
    let mut theatre = Resource::new("theatre", 1);
    assert!(theatre.request(ProcessId::new(0)));
    assert!(!theatre.request(ProcessId::new(1)));
    assert!(!theatre.request(ProcessId::new(2)));

    let next = theatre.release(ProcessId::new(0)).unwrap();
    assert_eq!(next, Some(ProcessId::new(1)));
    assert!(theatre.is_held_by(ProcessId::new(1)));
    assert_eq!(theatre.in_use(), 1);
    assert_eq!(theatre.queue_len(), 1);

    assert_eq!(theatre.release(ProcessId::new(1)).unwrap(), Some(ProcessId::new(2)));
    assert_eq!(theatre.release(ProcessId::new(2)).unwrap(), None);
    assert_eq!(theatre.in_use(), 0);
    assert_eq!(theatre.total_grants(), 3);
}

#[test]
fn test_release_without_hold_is_an_error() {
    let mut clinic = Resource::new("clinic", 1);
    clinic.request(ProcessId::new(0));
    let err = clinic.release(ProcessId::new(5)).unwrap_err();
    assert_eq!(
        err,
        SimulationError::ReleaseWithoutHold {
            resource: "clinic".to_string(),
            process: 5,
        }
    );
}

#[test]
fn test_free_slot_not_granted_past_waiters() {
    let mut room = Resource::new("room", 2);
    assert!(room.request(ProcessId::new(0)));
    assert!(room.request(ProcessId::new(1)));
    assert!(!room.request(ProcessId::new(2)));

    // The freed slot goes straight to the waiter, so a newcomer still queues
    room.release(ProcessId::new(0)).unwrap();
    assert!(!room.request(ProcessId::new(3)));
    assert!(room.is_held_by(ProcessId::new(2)));
}

#[test]
#[should_panic(expected = "resource capacity must be positive")]
fn test_zero_capacity_panics() {
    let _ = Resource::new("none", 0);
}

/// Arrives after `arrive`, takes the resource, holds it for `hold`.
struct Client {
    id: usize,
    arrive: f64,
    hold: f64,
    resource: ResourceId,
    phase: u8,
}

impl Process<Vec<(usize, f64)>> for Client {
    fn name(&self) -> &'static str {
        "client"
    }

    fn resume(&mut self, ctx: &mut Context<'_, Vec<(usize, f64)>>) -> Result<Step, SimulationError> {
        self.phase += 1;
        match self.phase {
            1 => Ok(Step::Timeout(self.arrive)),
            2 => Ok(Step::Acquire(self.resource)),
            3 => {
                let now = ctx.now();
                ctx.state_mut().push((self.id, now));
                Ok(Step::Timeout(self.hold))
            }
            _ => {
                ctx.release(self.resource)?;
                Ok(Step::Finish)
            }
        }
    }
}

fn run_clients(arrivals: &[(u8, u8)]) -> Vec<(usize, f64)> {
    let mut scheduler = Scheduler::new(Vec::new());
    let resource = scheduler.add_resource("shared", 1);
    for (id, (arrive, hold)) in arrivals.iter().enumerate() {
        scheduler.schedule(Box::new(Client {
            id,
            arrive: *arrive as f64,
            hold: *hold as f64,
            resource,
            phase: 0,
        }));
    }
    scheduler.advance_to(1.0e6).unwrap();
    scheduler.into_state()
}

#[test]
fn test_simultaneous_requests_granted_in_call_order() {
    let grants = run_clients(&[(0, 2), (0, 2), (0, 2)]);
    assert_eq!(grants, vec![(0, 0.0), (1, 2.0), (2, 4.0)]);
}

proptest! {
    /// Grants follow request order: arrival time first, then submission order
    #[test]
    fn prop_grants_follow_request_order(arrivals in prop::collection::vec((0u8..20, 0u8..5), 1..30)) {
        let grants = run_clients(&arrivals);

        let mut expected: Vec<usize> = (0..arrivals.len()).collect();
        expected.sort_by_key(|&i| arrivals[i].0);
        let order: Vec<usize> = grants.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(order, expected);

        // Nobody is granted before they arrive, and grant times never go back
        for (id, at) in &grants {
            prop_assert!(*at >= arrivals[*id].0 as f64);
        }
        for pair in grants.windows(2) {
            prop_assert!(pair[1].1 >= pair[0].1);
        }
    }
}
