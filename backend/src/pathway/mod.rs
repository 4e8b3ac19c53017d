//! Scheduled processes that make up the hand-surgery pathway
//!
//! - [`PatientJourney`]: one per patient, clinic through theatre
//! - [`SessionBlackout`]: closes clinic or theatre between sessions
//! - [`TraumaList`]: emergency lists taking elective theatre time
//! - [`TerminationMonitor`]: raises the terminal signal

mod blackout;
mod journey;
mod monitor;
mod trauma;

pub use blackout::SessionBlackout;
pub use journey::PatientJourney;
pub use monitor::TerminationMonitor;
pub use trauma::TraumaList;

use crate::scheduler::ResourceId;

/// The two capacity-limited resources of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathwayResources {
    pub clinic: ResourceId,
    pub theatre: ResourceId,
}
