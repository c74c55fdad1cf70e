//! Merging of isomorphic faces within one level.
//!
//! Purpose
//! - Faces related by a grading-preserving lattice isomorphism have equal
//!   multiplicity, so one representative can carry the summed coefficient.
//!
//! Why this design (short)
//! - A cheap fingerprint of the facet structure (histogram of facet sizes)
//!   partitions the level; only groups of two or more faces pay for an
//!   oracle call.
//! - Reduction runs single-threaded in signature order, so the surviving
//!   representative never depends on scheduling.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use rayon::prelude::*;

use super::face::{discover_facets, DescentFace};
use super::signature::Signature;
use super::system::DescentSystem;
use super::types::IsoType;
use crate::error::{DescentError, Result};
use crate::lattice::{greedy_basis, lattice_index, solve_coordinates, submatrix, QVec};
use crate::num::LatticeInt;
use crate::oracle::{AutomQuality, CanonicalFormOracle, OracleInput};

/// Outcome of one classification pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct IsoReport {
    pub live_before: usize,
    pub merged: usize,
    pub oracle_calls: usize,
}

/// Fingerprint, then type and merge the faces of one level.
pub(crate) fn classify<N: LatticeInt>(
    sys: &DescentSystem<N>,
    oracle: &dyn CanonicalFormOracle,
    d: usize,
    frontier: &mut BTreeMap<Signature, DescentFace>,
) -> Result<IsoReport> {
    frontier
        .par_iter_mut()
        .filter(|(_, face)| !face.dead)
        .try_for_each(|(sig, face)| -> Result<()> {
            sys.check_interrupt()?;
            let gens = sys.face_gens(sig);
            let facets = discover_facets(sys, d, &gens, sys.candidate_hyps(sig, &gens));
            let mut sizes: BTreeMap<usize, usize> = BTreeMap::new();
            let mut cut = Signature::new(sys.nr_supp_hyps());
            for (key, hyps) in &facets {
                *sizes.entry(key.count()).or_default() += 1;
                for &h in hyps {
                    cut.set(h);
                }
            }
            let mut hasher = DefaultHasher::new();
            sizes.hash(&mut hasher);
            face.erc_hash = hasher.finish();
            face.facets_of_face = Some(cut);
            Ok(())
        })?;

    let mut groups: BTreeMap<u64, Vec<&Signature>> = BTreeMap::new();
    let mut live_before = 0;
    for (sig, face) in frontier.iter().filter(|(_, f)| !f.dead) {
        live_before += 1;
        groups.entry(face.erc_hash).or_default().push(sig);
    }
    let candidates: Vec<&Signature> = groups
        .into_values()
        .filter(|g| g.len() >= 2)
        .flatten()
        .collect();
    let oracle_calls = candidates.len();

    let types = candidates
        .par_iter()
        .map(|sig| -> Result<(Signature, IsoType)> {
            sys.check_interrupt()?;
            let face = &frontier[*sig];
            Ok(((*sig).clone(), iso_type(sys, oracle, d, sig, face)?))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    let merged = merge_by_iso_type(frontier, &types, sys.cfg().strict_type_check);
    Ok(IsoReport {
        live_before,
        merged,
        oracle_calls,
    })
}

/// Isomorphism type of the face with signature `sig`.
///
/// The oracle sees the face generators, the hyperplanes cutting out its
/// facets and the grading (special), and reports only the canonical
/// generator order; the invariant itself is recomputed exactly from that order.
pub(crate) fn iso_type<N: LatticeInt>(
    sys: &DescentSystem<N>,
    oracle: &dyn CanonicalFormOracle,
    d: usize,
    sig: &Signature,
    face: &DescentFace,
) -> Result<IsoType> {
    let face_gens = sys.face_gens(sig);
    let idx: Vec<usize> = face_gens.ones().collect();
    let gens: Vec<Vec<BigInt>> = idx.iter().map(|&g| sys.gen_big(g)).collect();
    let cut = match &face.facets_of_face {
        Some(cut) => cut.clone(),
        None => {
            let facets = discover_facets(sys, d, &face_gens, sys.candidate_hyps(sig, &face_gens));
            let mut cut = Signature::new(sys.nr_supp_hyps());
            for &h in facets.values().flatten() {
                cut.set(h);
            }
            cut
        }
    };
    let mut forms: Vec<Vec<BigInt>> = cut.ones().map(|h| sys.supp_hyp_big(h)).collect();
    forms.push(sys.grading_big());

    let input = OracleInput {
        gens: &gens,
        nr_special_gens: 0,
        lin_forms: &forms,
        nr_special_lin_forms: 1,
        quality: AutomQuality::Combinatorial,
    };
    let out = sys.oracle_guard().call(|| oracle.compute(&input))?;
    if out.canonical_gens.len() != gens.len() {
        return Err(DescentError::failed(format!(
            "oracle returned {} canonical generators for {}",
            out.canonical_gens.len(),
            gens.len()
        )));
    }

    let ordered: Vec<QVec> = out
        .canonical_gens
        .iter()
        .map(|&p| gens[p].iter().map(|x| BigRational::from_integer(x.clone())).collect())
        .collect();
    let basis: Vec<QVec> = greedy_basis(&ordered)
        .into_iter()
        .map(|i| ordered[i].clone())
        .collect();
    let canonical = solve_coordinates(&basis, &ordered).ok_or_else(|| {
        DescentError::failed("face generators are not spanned by their own basis")
    })?;
    let degrees = out
        .canonical_gens
        .iter()
        .map(|&p| sys.degrees()[idx[p]].to_big())
        .collect();
    let index = lattice_index(&submatrix(sys.gens(), &idx))?.to_big();
    Ok(IsoType::new(canonical, degrees, index))
}

/// Fold every face into the first face (in signature order) of equal type.
///
/// Members lose their coefficient and are marked dead; representatives gain
/// the coefficients and tree sizes. Faces without a type and dead faces are
/// left alone. Returns the number of merged faces.
pub fn merge_by_iso_type(
    frontier: &mut BTreeMap<Signature, DescentFace>,
    types: &BTreeMap<Signature, IsoType>,
    strict: bool,
) -> usize {
    let mut reps = HashMap::new();
    let mut transfers: Vec<(&Signature, &Signature)> = Vec::new();
    for (sig, t) in types {
        if frontier.get(sig).map_or(true, |f| f.dead) {
            continue;
        }
        match reps.entry(t.key(strict)) {
            Entry::Occupied(e) => transfers.push((sig, *e.get())),
            Entry::Vacant(e) => {
                e.insert(sig);
            }
        }
    }
    for &(member, rep) in &transfers {
        let Some(m) = frontier.get_mut(member) else {
            continue;
        };
        let coeff = std::mem::replace(&mut m.coeff, BigRational::zero());
        let tree_size = m.tree_size;
        m.dead = true;
        if let Some(r) = frontier.get_mut(rep) {
            r.coeff += coeff;
            r.tree_size = r.tree_size.wrapping_add(tree_size);
        }
    }
    transfers.len()
}
