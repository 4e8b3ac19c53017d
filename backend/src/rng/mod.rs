//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic sampling.
//! CRITICAL: All randomness in the simulator MUST go through this module,
//! one `RngManager` per replication.

mod xorshift;

pub use xorshift::{derive_seed, RngManager};
