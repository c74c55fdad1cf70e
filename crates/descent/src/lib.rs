//! Exact multiplicities of rational polyhedral cones by face-lattice descent.
//!
//! Layout
//! - `num`: pluggable exact integer type (`i64` or `BigInt`).
//! - `lattice`: integer matrices, echelon forms, saturations, face frames.
//! - `oracle`: canonical-form oracle contract and a built-in refinement oracle.
//! - `descent`: the engine (`DescentSystem`, `DescentFace`, isomorphism merging).
//! - `special`, `random`: polytope families with known multiplicity.
//! - `api`: `i64` entry points with a `BigInt` retry on overflow.
//!
//! API Policy
//! - Breaking changes are fine when they make the engine clearer; the CLI is
//!   the only in-tree consumer besides tests and benches.

pub mod api;
pub mod descent;
pub mod error;
pub mod lattice;
pub mod num;
pub mod oracle;
pub mod random;
pub mod special;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use descent::{DescentCfg, DescentFace, DescentSystem, FaceMode, Signature};
pub use error::{DescentError, Result};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::api::{multiplicity, multiplicity_with, Job, MultiplicityReport};
    pub use crate::descent::{
        DescentCfg, DescentFace, DescentStats, DescentSystem, FaceMode, ProgressEvent,
        ProgressSink, Signature,
    };
    pub use crate::error::{DescentError, Result};
    pub use crate::num::LatticeInt;
    pub use crate::oracle::{CanonicalFormOracle, RefinementOracle};
    pub use num_bigint::BigInt;
    pub use num_rational::BigRational;
}
