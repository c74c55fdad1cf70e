//! Failure taxonomy of the descent engine.
//!
//! Every variant surfaces unchanged from `DescentSystem::compute`; the engine
//! never retries internally. Only `Overflow` is recoverable, by re-running the
//! same input with `BigInt` (see `api::multiplicity`).

/// Errors surfaced by the descent engine and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescentError {
    /// Fixed-width exact arithmetic overflowed.
    ///
    /// Resolution: rerun with `num_bigint::BigInt` as the integer type.
    #[error("arithmetic overflow in fixed-width integer type")]
    Overflow,

    /// A requested feature needs a collaborator that is not available
    /// (e.g. automorphism exploitation without a canonical-form oracle).
    #[error("not computable: {0}")]
    NotComputable(String),

    /// The cooperative interrupt flag was tripped. No partial result.
    #[error("computation interrupted")]
    Interrupted,

    /// Malformed input or a violated engine invariant.
    #[error("computation failed: {0}")]
    ComputationFailed(String),
}

impl DescentError {
    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self::ComputationFailed(reason.into())
    }

    pub(crate) fn not_computable(reason: impl Into<String>) -> Self {
        Self::NotComputable(reason.into())
    }

    /// True iff the caller can expect success by retrying with `BigInt`.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Overflow)
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DescentError>;
