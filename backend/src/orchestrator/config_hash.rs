//! Configuration fingerprint
//!
//! Every run and trial output carries the SHA-256 of the configuration that
//! produced it, so a results file can be matched back to its parameters.
//!
//! The JSON fed to the digest is stable without any extra canonical pass:
//! struct fields serialize in declaration order, and `serde_json::Map` is
//! ordered by key because the crate is built without `preserve_order`.

use super::SimulationError;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the JSON encoding of `config`
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    let bytes = serde_json::to_vec(config).map_err(|e| {
        SimulationError::SerializationError(format!("cannot fingerprint config: {e}"))
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
