//! Deterministic seed derivation for independent random streams.
//!
//! Every (site, member) unit gets its own `StdRng` seeded from the scenario
//! seed and its indices, so results do not depend on thread scheduling.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// SplitMix64 finaliser.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Folds a base seed and stream indices into one well-mixed seed.
pub fn mix_seed(base: u64, streams: &[u64]) -> u64 {
    streams
        .iter()
        .fold(splitmix64(base), |acc, &s| splitmix64(acc ^ splitmix64(s)))
}

/// RNG for one (site, member) unit of work.
pub(crate) fn unit_rng(scenario_seed: u64, site: usize, member: usize) -> StdRng {
    StdRng::seed_from_u64(mix_seed(scenario_seed, &[site as u64, member as u64]))
}

/// Scenario seed from configuration, or a fresh one from the OS.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    use rand::Rng;
    match seed {
        Some(s) => s,
        None => StdRng::from_os_rng().random(),
    }
}
