//! Generator scoping for bootstrap resampling.
//!
//! Every estimator call owns its generators. Nothing here is process-wide.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// How bootstrap generators are seeded across grid points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// One generator per call, advanced through grid points in order.
    /// Each row depends on the rows evaluated before it.
    #[default]
    Shared,
    /// One generator per grid point, seeded from the call seed and the
    /// point's grid index. Rows can be evaluated in any order.
    PerPoint,
}

/// Generator for a whole call.
pub fn call_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Generator for grid point `index` under [`SeedStrategy::PerPoint`].
pub fn point_rng(seed: u64, index: usize) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(mix(seed, index as u64))
}

/// splitmix64 finalizer over the seed and index.
fn mix(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
