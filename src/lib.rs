// src/lib.rs
//
// Brute-force recovery of Gen-V boot seeds. The game derives its initial RNG
// seed from a SHA-1 over a 64-byte message of ROM constants, hardware
// calibration values (Timer0/VCount), the adapter MAC, held buttons and the
// RTC datetime. Given target seeds and constraint ranges, this crate
// enumerates the cross-product on a pool of worker threads and streams back
// every combination that reproduces one of the targets.

pub mod chunker;
pub mod coordinator;
pub mod data_types;
pub mod datetime_codes;
mod driver;
pub mod endian;
pub mod errors;
pub mod message;
pub mod rom_profiles;
pub mod seed;
pub mod sha1;
pub mod target_set;

pub use coordinator::{SearchCallbacks, SearchEngine, SearchHandle, SearchState};
pub use data_types::{
    AggregatedProgress, Hardware, InitialSeedResult, KeyInput, MacAddress, ProgressSnapshot,
    ResultConditions, SearchConditions, WorkerChunk, WorkerStatus,
};
pub use errors::{AssembleError, SearchError};
pub use rom_profiles::{RomProfile, RomRegion, RomVersion, VcountOverride};
pub use seed::{SeedCalculator, SeedComputation};
pub use target_set::{MAX_TARGET_SEEDS, TargetSeedSet};

/// Worker count to use when the caller has no opinion.
pub fn default_parallelism() -> usize {
    num_cpus::get().max(1)
}

/// One-shot entry point: run a search on a fresh engine with the requested
/// parallelism. Long-lived front-ends that reconfigure between searches hold
/// a [`SearchEngine`] instead.
pub fn start_search(
    conditions: SearchConditions,
    target_seeds: &[u32],
    parallelism: usize,
    callbacks: SearchCallbacks,
) -> Result<SearchHandle, SearchError> {
    let mut engine = SearchEngine::new();
    engine.set_parallelism(parallelism)?;
    engine.start_search(conditions, target_seeds, callbacks)
}
