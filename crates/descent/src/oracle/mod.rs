//! Canonical forms and automorphism groups of point / linear-form data.
//!
//! Purpose
//! - The descent engine needs two things from symmetry: the automorphism group
//!   of the whole cone (to seed the frontier by facet orbits) and a canonical
//!   ordering of a face's generators (to build an exact isomorphism key).
//! - `CanonicalFormOracle` is the narrow contract; `RefinementOracle` is the
//!   in-tree implementation.
//!
//! Why this design (short)
//! - Input is a complete bipartite graph: generators on one side, linear forms
//!   on the other, edge weight `<g, l>`. Special elements are individually
//!   distinguished so isomorphic inputs give identical canonical output
//!   regardless of the input order of the ordinary elements.
//! - The engine treats the oracle as not reentrant: every call goes through an
//!   `OracleGuard` held only for the duration of the call.

mod refine;

use std::sync::{Mutex, PoisonError};

use num_bigint::{BigInt, BigUint};

use crate::error::{DescentError, Result};

pub use refine::RefinementOracle;

/// Which values the automorphisms must preserve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutomQuality {
    /// Ordinary generator / ordinary form pairs only keep `value == 0` vs
    /// `value != 0`; pairs involving a special element keep exact values.
    Combinatorial,
    /// All values are preserved exactly.
    Integral,
}

/// Oracle request. Special elements are the last rows of each list.
#[derive(Clone, Copy, Debug)]
pub struct OracleInput<'a> {
    pub gens: &'a [Vec<BigInt>],
    pub nr_special_gens: usize,
    pub lin_forms: &'a [Vec<BigInt>],
    pub nr_special_lin_forms: usize,
    pub quality: AutomQuality,
}

impl OracleInput<'_> {
    pub fn validate(&self) -> Result<()> {
        if self.nr_special_gens > self.gens.len()
            || self.nr_special_lin_forms > self.lin_forms.len()
        {
            return Err(DescentError::failed("more special elements than elements"));
        }
        let dim = self
            .gens
            .first()
            .or_else(|| self.lin_forms.first())
            .map_or(0, Vec::len);
        if self
            .gens
            .iter()
            .chain(self.lin_forms)
            .any(|r| r.len() != dim)
        {
            return Err(DescentError::failed("oracle input rows differ in length"));
        }
        Ok(())
    }

    #[inline]
    pub fn nr_ordinary_gens(&self) -> usize {
        self.gens.len() - self.nr_special_gens
    }

    #[inline]
    pub fn nr_ordinary_lin_forms(&self) -> usize {
        self.lin_forms.len() - self.nr_special_lin_forms
    }
}

/// Oracle answer.
///
/// Invariants:
/// - Permutations map index `i` to `perm[i]` and fix every special element.
/// - Orbits are sorted, and listed by their smallest element.
/// - `canonical_gens[p]` is the input index placed at canonical position `p`
///   (same for linear forms); `canonical_form[p][q]` is the (quality-reduced)
///   value of canonical generator `p` on canonical form `q`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleOutput {
    pub order: BigUint,
    pub gen_perms: Vec<Vec<usize>>,
    pub lin_form_perms: Vec<Vec<usize>>,
    pub gen_orbits: Vec<Vec<usize>>,
    pub lin_form_orbits: Vec<Vec<usize>>,
    pub canonical_gens: Vec<usize>,
    pub canonical_lin_forms: Vec<usize>,
    pub canonical_form: Option<Vec<Vec<BigInt>>>,
}

/// Canonical forms and automorphism groups.
pub trait CanonicalFormOracle: Send + Sync {
    fn compute(&self, input: &OracleInput<'_>) -> Result<OracleOutput>;
}

/// Mutual-exclusion capability for oracle calls.
#[derive(Debug, Default)]
pub struct OracleGuard {
    lock: Mutex<()>,
}

impl OracleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access; the lock is released when `f` returns.
    pub fn call<T>(&self, f: impl FnOnce() -> T) -> T {
        let _held = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
