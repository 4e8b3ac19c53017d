//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG with 64-bit state. It passes TestU01's BigCrush,
//! which is more than enough for arrival and routing draws.
//!
//! # Determinism
//!
//! Same seed → same sequence of draws → same event ordering. Each
//! replication owns its own generator, seeded through [`derive_seed`], so
//! replications never share a stream.

use serde::{Deserialize, Serialize};

/// Derive the seed for replication `index` from a trial's base seed.
///
/// Uses the splitmix64 finalizer so neighbouring indices land on unrelated
/// xorshift states.
///
/// # Example
/// ```
/// use hand_pathway_sim::rng::derive_seed;
///
/// assert_eq!(derive_seed(42, 3), derive_seed(42, 3));
/// assert_ne!(derive_seed(42, 0), derive_seed(42, 1));
/// ```
pub fn derive_seed(base_seed: u64, index: u64) -> u64 {
    let mut z = base_seed
        .wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use hand_pathway_sim::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let gap = rng.exponential(0.7);       // days until next referral
/// let needs_imaging = rng.bernoulli(0.25);
/// assert!(gap >= 0.0);
/// # let _ = needs_imaging;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift cannot leave the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (for replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli trial: `true` with probability `p`
    ///
    /// `p <= 0` never succeeds and `p >= 1` always does.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample an exponential variate with the given mean
    ///
    /// Inverse-CDF sampling. `1 - u` lies in (0, 1], so the logarithm is
    /// always finite.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        let u = self.next_f64();
        -mean * (1.0 - u).ln()
    }
}
