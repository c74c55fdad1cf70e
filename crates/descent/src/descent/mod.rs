//! Multiplicity of a rational cone by descent in its face lattice.
//!
//! Purpose
//! - `DescentSystem` owns a pointed cone (extreme rays, support hyperplanes,
//!   grading) and computes its multiplicity: the normalized volume of the
//!   cross-section polytope `{x in C : deg(x) = 1}` in the saturated lattice
//!   of the cone's span.
//! - Every face of dimension `d` is replaced by pyramids over its facets that
//!   avoid a pivot generator; faces with `d` generators are simplices and
//!   finish with one determinant.
//!
//! Why this design (short)
//! - Faces are keyed by `Signature` bitsets; the same face reached from many
//!   parents is expanded once, with the coefficients summed.
//! - Optional automorphism use (orbit seeding, isomorphism merging) goes
//!   through the `CanonicalFormOracle` seam in `crate::oracle`.
//!
//! Submodules
//! - `cfg`: run configuration and tuning constants.
//! - `signature`: face keys.
//! - `face`: single-face expansion.
//! - `iso`: per-level isomorphism classification.
//! - `system`: orchestration and results.
//! - `progress`: progress events.

mod cfg;
mod face;
mod iso;
mod progress;
mod signature;
mod system;
mod types;

pub use cfg::DescentCfg;
pub use face::DescentFace;
pub use iso::merge_by_iso_type;
pub use progress::{ProgressEvent, ProgressSink, TracingProgress};
pub use signature::Signature;
pub use system::DescentSystem;
pub use types::{DescentStats, FaceExpansion, FaceMode, IsoType, LevelSnapshot, OppositeFacet};

#[cfg(test)]
mod tests;
