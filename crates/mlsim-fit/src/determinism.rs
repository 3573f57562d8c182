use mlsim_core::derive_substream_seed;

/// Substream tag mixed into prediction seeds so they never collide with chains.
const PREDICT_TAG: u64 = 0xA5A5_A5A5_A5A5_A5A5;

/// Derives the deterministic seed used for a specific chain.
pub fn chain_seed(master_seed: u64, chain_index: usize) -> u64 {
    derive_substream_seed(master_seed, chain_index as u64)
}

/// Derives the seed for the `call`-th posterior prediction against a fit.
pub fn predict_seed(master_seed: u64, call: u64) -> u64 {
    derive_substream_seed(master_seed ^ PREDICT_TAG, call)
}
