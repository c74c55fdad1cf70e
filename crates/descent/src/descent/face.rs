//! One face of the descent: facet discovery, pivot choice, expansion.
//!
//! Purpose
//! - Replace a face `F` of dimension `d` by the pyramids `conv(v, G)` over its
//!   facets `G` not containing the pivot `v`:
//!   `mult(F) = sum_G ht(v, G) / deg(v) * mult(G)`.
//! - Simplicial facets are finished on the spot with one determinant; the
//!   others become children on level `d - 1`.
//!
//! Why this design (short)
//! - Heights and determinants are taken in a frame of the face's own
//!   saturated lattice, so multiplicities never depend on the ambient lattice.
//! - Every choice (pivot, random frame subsets) is a function of the face
//!   signature alone, which keeps the result independent of scheduling.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::Ordering;

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use super::cfg::SUBSET_FACTOR;
use super::signature::Signature;
use super::system::{Accumulators, DescentSystem};
use super::types::{FaceExpansion, FaceMode, OppositeFacet};
use crate::error::{DescentError, Result};
use crate::lattice::{row, row_echelon, submatrix, volume, Frame, Matrix};
use crate::num::{to_rational, LatticeInt};

/// A face waiting in a frontier map; the key of the map is its signature.
#[derive(Clone, Debug, PartialEq)]
pub struct DescentFace {
    /// Multiplier with which `mult(face)` enters the total.
    pub coeff: BigRational,
    /// Number of (merged) faces this entry stands for.
    pub tree_size: u64,
    /// Absorbed by an isomorphic face; skipped on expansion.
    pub dead: bool,
    /// Hyperplanes cutting out facets, if already known from classification.
    pub facets_of_face: Option<Signature>,
    /// Fingerprint of the facet structure (0 if not computed).
    pub erc_hash: u64,
}

impl DescentFace {
    pub fn new(coeff: BigRational) -> Self {
        Self {
            coeff,
            tree_size: 1,
            dead: false,
            facets_of_face: None,
            erc_hash: 0,
        }
    }

    /// The whole cone with coefficient 1.
    pub fn top() -> Self {
        Self::new(BigRational::one())
    }

    /// Fold `other` into `self`: coefficients add, tree sizes add (wrapping).
    pub fn absorb(&mut self, other: &DescentFace) {
        self.coeff += &other.coeff;
        self.tree_size = self.tree_size.wrapping_add(other.tree_size);
    }

    /// Expand this face without touching the counters of `sys`.
    ///
    /// The pivot tie-break uses no history here, so the pivot may differ from
    /// the one `DescentSystem::compute` picks; the decomposition is valid
    /// either way.
    pub fn compute<N: LatticeInt>(
        &self,
        sys: &DescentSystem<N>,
        d: usize,
        sig: &Signature,
    ) -> Result<FaceExpansion<N>> {
        self.expand(sys, d, sig, &[], &Accumulators::new())
    }

    pub(crate) fn expand<N: LatticeInt>(
        &self,
        sys: &DescentSystem<N>,
        d: usize,
        sig: &Signature,
        old_counts: &[u64],
        acc: &Accumulators,
    ) -> Result<FaceExpansion<N>> {
        let gens = sys.face_gens(sig);
        let mother_key: Vec<usize> = gens.ones().collect();
        if mother_key.len() < d {
            return Err(DescentError::failed(format!(
                "face of dimension {d} has only {} generators",
                mother_key.len()
            )));
        }
        let facets = match &self.facets_of_face {
            Some(cut) => discover_facets(sys, d, &gens, cut.ones()),
            None => discover_facets(sys, d, &gens, sys.candidate_hyps(sig, &gens)),
        };
        let frame = face_frame(sys, sig, &mother_key, d)?;
        let pivot = choose_pivot(&mother_key, &facets, old_counts);

        let pivot_row = row(sys.gens(), pivot);
        let pivot_deg = &sys.degrees()[pivot];
        if !pivot_deg.is_positive() {
            return Err(DescentError::failed(format!(
                "pivot generator {pivot} has degree {pivot_deg}"
            )));
        }
        let pivot_deg = to_rational(pivot_deg);

        let mut opposite = Vec::new();
        let mut children = Vec::new();
        let mut simplicial = Vec::new();
        for (key, hyps) in &facets {
            if key.get(pivot) {
                continue;
            }
            let h = hyps[0];
            let height = frame.height(&pivot_row, &row(sys.supp_hyps(), h))?;
            if !height.is_positive() {
                return Err(DescentError::failed(format!(
                    "pivot {pivot} has height {height} over hyperplane {h}"
                )));
            }
            let is_simplicial = key.count() + 1 == d;
            if is_simplicial {
                simplicial.push(key);
            } else {
                let child_sig = match sys.mode() {
                    FaceMode::Generator => key.clone(),
                    FaceMode::Facet => {
                        let mut s = sig.clone();
                        for &hh in hyps {
                            s.set(hh);
                        }
                        s
                    }
                };
                let coeff = &self.coeff * to_rational(&height) / &pivot_deg;
                let mut child = DescentFace::new(coeff);
                child.tree_size = self.tree_size;
                children.push((child_sig, child));
            }
            opposite.push(OppositeFacet {
                hyperplane: h,
                gens: key.clone(),
                height,
                simplicial: is_simplicial,
            });
        }

        let volume_sum = simplicial
            .par_iter()
            .map(|key| simplex_volume(sys, &frame, key, pivot, &pivot_row))
            .try_reduce(BigRational::zero, |a, b| Ok(a + b))?;
        let contribution = &self.coeff * volume_sum;
        if !contribution.is_zero() {
            acc.add_multiplicity(&contribution);
        }

        acc.descent_steps.fetch_add(1, Ordering::Relaxed);
        acc.nr_simplicial
            .fetch_add(simplicial.len() as u64, Ordering::Relaxed);
        acc.tree_size.fetch_add(self.tree_size, Ordering::Relaxed);

        Ok(FaceExpansion {
            mother_key,
            pivot,
            opposite,
            children,
            contribution,
        })
    }
}

/// Normalized volume of `conv(pivot, facet)` divided by the generator degrees.
fn simplex_volume<N: LatticeInt>(
    sys: &DescentSystem<N>,
    frame: &Frame<N>,
    key: &Signature,
    pivot: usize,
    pivot_row: &[N],
) -> Result<BigRational> {
    let mut coords = Vec::with_capacity(frame.rank());
    let mut denom = to_rational(&sys.degrees()[pivot]);
    for g in key.ones() {
        coords.push(frame.coordinates(&row(sys.gens(), g))?);
        denom *= to_rational(&sys.degrees()[g]);
    }
    coords.push(frame.coordinates(pivot_row)?);
    let d = coords.len();
    let m = Matrix::from_fn(d, d, |i, j| coords[i][j].clone());
    Ok(to_rational(&volume(&m)?) / denom)
}

/// Facets of the face with generator set `gens`, found among `candidates`.
///
/// Returns facet generator sets mapped to the hyperplanes cutting them out.
/// Candidates meeting the face in fewer than `d - 1` generators are skipped;
/// non-maximal intersections are removed unless the polytope is simple and
/// the face is proper, where every such intersection is already a facet.
pub(crate) fn discover_facets<N: LatticeInt>(
    sys: &DescentSystem<N>,
    d: usize,
    gens: &Signature,
    candidates: impl IntoIterator<Item = usize>,
) -> BTreeMap<Signature, Vec<usize>> {
    let mut map: BTreeMap<Signature, Vec<usize>> = BTreeMap::new();
    for h in candidates {
        let key = gens.and(sys.supp_hyp_ind(h));
        if key.count() + 1 < d || key == *gens {
            continue;
        }
        map.entry(key).or_default().push(h);
    }
    if sys.is_simple() && d < sys.dim() {
        return map;
    }
    let keys: Vec<&Signature> = map.keys().collect();
    let dominated: Vec<Signature> = keys
        .iter()
        .filter(|k| keys.iter().any(|o| o != *k && k.is_subset_of(o)))
        .map(|k| (*k).clone())
        .collect();
    for k in dominated {
        map.remove(&k);
    }
    map
}

/// The generator contained in the most facets; ties go to the generator that
/// occurred in fewer faces of the previous level, then to the lower index.
fn choose_pivot(
    mother_key: &[usize],
    facets: &BTreeMap<Signature, Vec<usize>>,
    old_counts: &[u64],
) -> usize {
    let mut in_facets = vec![0usize; mother_key.len()];
    for key in facets.keys() {
        for (pos, &g) in mother_key.iter().enumerate() {
            if key.get(g) {
                in_facets[pos] += 1;
            }
        }
    }
    let best = (0..mother_key.len()).min_by_key(|&pos| {
        let g = mother_key[pos];
        (
            std::cmp::Reverse(in_facets[pos]),
            old_counts.get(g).copied().unwrap_or(0),
            g,
        )
    });
    mother_key[best.unwrap_or(0)]
}

pub(crate) fn signature_seed(sig: &Signature) -> u64 {
    let mut h = DefaultHasher::new();
    sig.hash(&mut h);
    h.finish()
}

/// Frame of the face lattice.
///
/// Large faces first try random generator subsets of doubling size, seeded
/// from the signature; the full generator set is the fallback.
pub(crate) fn face_frame<N: LatticeInt>(
    sys: &DescentSystem<N>,
    sig: &Signature,
    mother_key: &[usize],
    d: usize,
) -> Result<Frame<N>> {
    if mother_key.len() > SUBSET_FACTOR * d {
        let mut rng = StdRng::seed_from_u64(signature_seed(sig));
        let mut size = d.max(1);
        while size < mother_key.len() {
            let pick: Vec<usize> = mother_key
                .choose_multiple(&mut rng, size)
                .copied()
                .collect();
            let e = row_echelon(&submatrix(sys.gens(), &pick))?;
            if e.rank() == d {
                return Frame::from_echelon(e);
            }
            size *= 2;
        }
    }
    let e = row_echelon(&submatrix(sys.gens(), mother_key))?;
    if e.rank() != d {
        return Err(DescentError::failed(format!(
            "face of dimension {d} has generator rank {}",
            e.rank()
        )));
    }
    Frame::from_echelon(e)
}

