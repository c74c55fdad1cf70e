//! Run configuration and tuning constants for the descent engine.
//!
//! Policy
//! - Constants that only shape performance live here as `pub(crate) const`.
//! - Everything a caller may want to toggle goes through `DescentCfg`.

use super::types::FaceMode;

/// Upper bound on the number of faces expanded in one parallel block.
pub(crate) const MAX_BLOCK_SIZE: usize = 1_000_000;
/// Faces with more than `SUBSET_FACTOR * d` generators first try random
/// subsets (of doubling size) to find a full-rank basis cheaply.
pub(crate) const SUBSET_FACTOR: usize = 3;

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescentCfg {
    /// Orbit seeding (generator mode) plus per-level isomorphism merging.
    /// Requires a canonical-form oracle.
    pub exploit_automorphisms: bool,
    /// Merge on the full canonical coordinate matrix instead of its hash.
    pub strict_type_check: bool,
    pub max_block_size: usize,
    /// Overrides the facet/generator choice made from the input counts.
    pub face_mode: Option<FaceMode>,
    /// Keep a snapshot of every frontier (diagnostics and tests).
    pub record_levels: bool,
    /// Summary at `info` level instead of `debug`.
    pub verbose: bool,
}

impl Default for DescentCfg {
    fn default() -> Self {
        Self {
            exploit_automorphisms: false,
            strict_type_check: false,
            max_block_size: MAX_BLOCK_SIZE,
            face_mode: None,
            record_levels: false,
            verbose: false,
        }
    }
}
