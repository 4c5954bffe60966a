use vspace_core::derive_substream_seed;

/// Seed of the `call_index`-th `sample` call of a session.
pub fn call_seed(master_seed: u64, call_index: u64) -> u64 {
    derive_substream_seed(master_seed, call_index)
}

/// Seed of one independent chain within a call.
///
/// Depends only on the call seed and the chain index, so chains produce the
/// same points whichever worker runs them.
pub fn chain_seed(call_seed: u64, chain_index: usize) -> u64 {
    derive_substream_seed(call_seed ^ 0xC4A1_0000_C4A1_0000, chain_index as u64)
}
