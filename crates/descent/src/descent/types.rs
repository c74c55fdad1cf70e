//! Plain data carried between the descent components.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_rational::BigRational;

use super::face::DescentFace;
use super::signature::Signature;
use crate::lattice::QVec;
use crate::num::LatticeInt;

/// How faces are keyed in the frontier maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceMode {
    /// Signature = support hyperplanes containing the face.
    Facet,
    /// Signature = generators contained in the face.
    Generator,
}

impl FaceMode {
    /// Generator mode iff there are at most as many generators as hyperplanes.
    #[inline]
    pub fn choose(nr_gens: usize, nr_supp_hyps: usize) -> Self {
        if nr_gens <= nr_supp_hyps {
            Self::Generator
        } else {
            Self::Facet
        }
    }
}

/// A facet of an expanded face that does not contain the pivot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OppositeFacet<N: LatticeInt> {
    /// First ambient support hyperplane cutting out the facet.
    pub hyperplane: usize,
    /// Generators of the facet.
    pub gens: Signature,
    /// Lattice height of the pivot over the facet, in the face lattice.
    pub height: N,
    pub simplicial: bool,
}

/// Result of expanding one face.
#[derive(Clone, Debug)]
pub struct FaceExpansion<N: LatticeInt> {
    /// Generators of the face (global indices, increasing).
    pub mother_key: Vec<usize>,
    pub pivot: usize,
    pub opposite: Vec<OppositeFacet<N>>,
    /// Non-simplicial opposite facets, keyed by their signature.
    pub children: Vec<(Signature, DescentFace)>,
    /// Base-case volume already folded into the multiplicity.
    pub contribution: BigRational,
}

/// Exact isomorphism invariant of a face.
///
/// Two faces with equal `canonical`, `degrees` and `index` have equal
/// multiplicity: the canonical coordinates define a linear bijection of the
/// generator lattices that preserves the grading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IsoType {
    /// Rational coordinates of the generators, in canonical order, in the
    /// lexicographically first basis chosen among them.
    pub canonical: Vec<QVec>,
    pub degrees: Vec<BigInt>,
    /// Content hash of `canonical` and `degrees`.
    pub hash: u64,
    /// Index of the generator lattice in its saturation.
    pub index: BigInt,
}

impl IsoType {
    pub fn new(canonical: Vec<QVec>, degrees: Vec<BigInt>, index: BigInt) -> Self {
        let mut h = DefaultHasher::new();
        canonical.hash(&mut h);
        degrees.hash(&mut h);
        Self {
            hash: h.finish(),
            canonical,
            degrees,
            index,
        }
    }

    pub(crate) fn key(&self, strict: bool) -> IsoKey<'_> {
        if strict {
            IsoKey::Strict(&self.canonical, &self.degrees, &self.index)
        } else {
            IsoKey::Relaxed(self.hash, &self.index)
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) enum IsoKey<'a> {
    Strict(&'a [QVec], &'a [BigInt], &'a BigInt),
    Relaxed(u64, &'a BigInt),
}

/// Frontier at the start of one level.
#[derive(Clone, Debug)]
pub struct LevelSnapshot {
    pub dim: usize,
    pub faces: Vec<(Signature, BigRational)>,
    /// Base-case volume accumulated before this level.
    pub multiplicity_before: BigRational,
}

/// Diagnostic counters of one computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DescentStats {
    pub descent_steps: u64,
    pub nr_simplicial: u64,
    /// Sum of tree sizes of expanded faces; wraps on overflow.
    pub tree_size: u64,
    /// Sum of frontier sizes over all levels.
    pub system_size: u64,
}
