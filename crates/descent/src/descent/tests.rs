use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use proptest::prelude::*;

use super::*;
use crate::error::DescentError;
use crate::oracle::RefinementOracle;
use crate::random::{random_simplex_product, SimplexGenerator, SimplexParams};
use crate::special::{
    cross_polytope, cube, dilation, product, pyramid, unit_simplex, LatticePolytope,
};

fn int(v: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(v))
}

fn big(v: &BigInt) -> BigRational {
    BigRational::from_integer(v.clone())
}

fn run(p: &LatticePolytope, cfg: DescentCfg) -> BigRational {
    let mut sys = p.to_system::<i64>().unwrap();
    sys.set_cfg(cfg);
    if sys.cfg().exploit_automorphisms {
        sys.set_oracle(Arc::new(RefinementOracle));
    }
    sys.compute().unwrap();
    sys.multiplicity().clone()
}

fn plain(p: &LatticePolytope) -> BigRational {
    run(p, DescentCfg::default())
}

fn exploit() -> DescentCfg {
    DescentCfg {
        exploit_automorphisms: true,
        ..DescentCfg::default()
    }
}

#[test]
fn closed_forms_of_basic_families() {
    for n in 1..=5 {
        assert_eq!(plain(&unit_simplex(n)), BigRational::one(), "simplex {n}");
    }
    for n in 1..=4 {
        let c = cube(n);
        assert_eq!(plain(&c), big(&c.expected), "cube {n}");
        let x = cross_polytope(n);
        assert_eq!(plain(&x), big(&x.expected), "cross {n}");
    }
}

#[test]
fn closed_forms_of_constructions() {
    let cases = [
        product(&unit_simplex(2), &unit_simplex(1)),
        product(&cube(2), &unit_simplex(2)),
        dilation(&unit_simplex(3), 2),
        dilation(&cube(2), 3),
        pyramid(&cube(2)),
        pyramid(&cross_polytope(2)),
    ];
    for p in &cases {
        assert_eq!(plain(p), big(&p.expected), "{p:?}");
    }
    assert_eq!(plain(&dilation(&unit_simplex(3), 2)), int(8));
}

#[test]
fn non_saturated_generators_use_the_saturation() {
    // segment [0, 2] on the line x_0 = 1
    let mut sys =
        DescentSystem::<i64>::from_rows(&[vec![1, 0], vec![1, 2]], &[vec![0, 1], vec![2, -1]], vec![1, 0])
            .unwrap();
    sys.compute().unwrap();
    assert_eq!(sys.multiplicity(), &int(2));
}

#[test]
fn rank_one_cone() {
    let none: Vec<Vec<i64>> = Vec::new();
    let mut sys = DescentSystem::<i64>::from_rows(&[vec![2, 4]], &none, vec![1, 1]).unwrap();
    sys.compute().unwrap();
    // primitive generator (1, 2) has degree 3
    assert_eq!(sys.multiplicity(), &BigRational::new(BigInt::from(1), BigInt::from(3)));
}

#[test]
fn rank_zero_fails() {
    let none: Vec<Vec<i64>> = Vec::new();
    let mut sys = DescentSystem::<i64>::from_rows(&none, &none, vec![1, 0]).unwrap();
    assert!(matches!(sys.compute(), Err(DescentError::ComputationFailed(_))));
    assert!(!sys.is_computed());
}

#[test]
fn degenerate_grading_is_rejected() {
    let p = cube(2);
    let res = DescentSystem::<i64>::from_rows(&p.gens, &p.supp_hyps, vec![0, 1, 0]);
    assert!(matches!(res, Err(DescentError::ComputationFailed(_))));

    let p = unit_simplex(2);
    let res = DescentSystem::<i64>::from_rows(&p.gens, &p.supp_hyps, vec![-1, 0, 0]);
    assert!(matches!(res, Err(DescentError::ComputationFailed(_))));
}

#[test]
fn generator_outside_hyperplane_is_rejected() {
    let p = cube(2);
    let mut hyps = p.supp_hyps.clone();
    hyps.push(vec![0, -1, 0]);
    let res = DescentSystem::<i64>::from_rows(&p.gens, &hyps, p.grading.clone());
    assert!(matches!(res, Err(DescentError::ComputationFailed(_))));
}

#[test]
fn shape_mismatch_is_rejected() {
    let res = DescentSystem::<i64>::from_rows(&[vec![1, 0, 0]], &[vec![0, 1]], vec![1, 0, 0]);
    assert!(matches!(res, Err(DescentError::ComputationFailed(_))));
}

#[test]
fn face_modes_agree() {
    for p in [cube(3), cross_polytope(3), pyramid(&cube(2)), dilation(&cube(2), 2)] {
        let facet = run(
            &p,
            DescentCfg {
                face_mode: Some(FaceMode::Facet),
                ..DescentCfg::default()
            },
        );
        let generator = run(
            &p,
            DescentCfg {
                face_mode: Some(FaceMode::Generator),
                ..DescentCfg::default()
            },
        );
        assert_eq!(facet, generator);
        assert_eq!(facet, big(&p.expected));
    }
}

#[test]
fn automorphism_use_agrees_with_plain_descent() {
    for p in [
        cube(3),
        cube(4),
        cross_polytope(3),
        cross_polytope(4),
        product(&unit_simplex(2), &unit_simplex(2)),
        pyramid(&cube(3)),
    ] {
        assert_eq!(run(&p, exploit()), big(&p.expected), "{p:?}");
        let strict = DescentCfg {
            strict_type_check: true,
            ..exploit()
        };
        assert_eq!(run(&p, strict), big(&p.expected), "{p:?}");
    }
}

#[test]
fn orbit_seeding_in_generator_mode() {
    // cube in generator mode: one orbit of six facets, coefficient 3 each square
    let p = cube(3);
    let cfg = DescentCfg {
        face_mode: Some(FaceMode::Generator),
        record_levels: true,
        ..exploit()
    };
    let mut sys = p.to_system::<i64>().unwrap();
    sys.set_cfg(cfg);
    sys.set_oracle(Arc::new(RefinementOracle));
    sys.compute().unwrap();
    assert_eq!(sys.multiplicity(), &int(6));
    let first = &sys.levels()[0];
    assert_eq!(first.dim, 3);
    assert_eq!(first.faces.len(), 1);
    assert_eq!(first.faces[0].1, int(3));
}

#[test]
fn lattice_correction_for_cross_polytope() {
    // generators (1, ±e_i) span a sublattice of index 2
    let p = cross_polytope(3);
    let mut sys = p.to_system::<i64>().unwrap();
    sys.set_cfg(exploit());
    sys.set_oracle(Arc::new(RefinementOracle));
    sys.compute().unwrap();
    assert_eq!(sys.multiplicity(), &int(8));
}

#[test]
fn exploit_without_oracle_is_not_computable() {
    let mut sys = cube(3).to_system::<i64>().unwrap();
    sys.set_exploit_automs(true);
    assert!(matches!(sys.compute(), Err(DescentError::NotComputable(_))));
    assert!(sys.multiplicity().is_zero());
}

#[test]
fn automorphism_use_does_not_add_work() {
    let p = cube(4);
    let mut a = p.to_system::<i64>().unwrap();
    a.compute().unwrap();
    let mut b = p.to_system::<i64>().unwrap();
    b.set_cfg(exploit());
    b.set_oracle(Arc::new(RefinementOracle));
    b.compute().unwrap();
    assert_eq!(a.multiplicity(), b.multiplicity());
    assert!(b.stats().descent_steps <= a.stats().descent_steps);
}

/// Total = accumulated base cases + sum over the frontier of coeff * mult(face).
fn check_mass_conservation(p: &LatticePolytope) {
    let mut sys = p.to_system::<i64>().unwrap();
    sys.set_cfg(DescentCfg {
        record_levels: true,
        ..DescentCfg::default()
    });
    sys.compute().unwrap();
    let total = sys.multiplicity().clone();
    assert!(!sys.levels().is_empty());
    for level in sys.levels() {
        let mut mass = level.multiplicity_before.clone();
        for (sig, coeff) in &level.faces {
            let mut face = sys.face_system(sig).unwrap();
            assert_eq!(face.dim(), level.dim);
            face.compute().unwrap();
            mass += coeff * face.multiplicity();
        }
        assert_eq!(mass, total, "level {}", level.dim);
    }
}

#[test]
fn mass_is_conserved_across_levels() {
    check_mass_conservation(&cube(3));
    check_mass_conservation(&unit_simplex(3));
    check_mass_conservation(&cross_polytope(3));
    check_mass_conservation(&pyramid(&cube(2)));
    check_mass_conservation(&dilation(&product(&unit_simplex(1), &unit_simplex(2)), 2));
}

#[test]
fn result_is_independent_of_thread_count() {
    let p = cross_polytope(4);
    let in_pool = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        pool.install(|| {
            let mut sys = p.to_system::<i64>().unwrap();
            sys.compute().unwrap();
            (sys.multiplicity().clone(), sys.stats())
        })
    };
    let (m1, s1) = in_pool(1);
    let (m4, s4) = in_pool(4);
    assert_eq!(m1, m4);
    assert_eq!(s1, s4);
    assert_eq!(m1, int(16));
}

#[test]
fn block_size_does_not_change_result() {
    let p = cube(4);
    let small = run(
        &p,
        DescentCfg {
            max_block_size: 1,
            ..DescentCfg::default()
        },
    );
    assert_eq!(small, int(24));
}

#[test]
fn bigint_and_i64_agree() {
    let p = product(&cube(2), &unit_simplex(2));
    let mut a = p.to_system::<i64>().unwrap();
    let mut b = p.to_system::<BigInt>().unwrap();
    a.compute().unwrap();
    b.compute().unwrap();
    assert_eq!(a.multiplicity(), b.multiplicity());
    assert_eq!(a.stats(), b.stats());
}

struct TripAtLevel {
    flag: Arc<AtomicBool>,
    dim: usize,
}

impl ProgressSink for TripAtLevel {
    fn report(&self, event: &ProgressEvent) {
        if let ProgressEvent::LevelStarted { dim, .. } = event {
            if *dim == self.dim {
                self.flag.store(true, Ordering::SeqCst);
            }
        }
    }
}

#[test]
fn interrupt_from_progress_event() {
    let mut sys = cross_polytope(4).to_system::<i64>().unwrap();
    let flag = sys.interrupt_flag();
    let dim = sys.dim();
    sys.set_progress(Arc::new(TripAtLevel { flag, dim }));
    assert_eq!(sys.compute(), Err(DescentError::Interrupted));
    assert!(!sys.is_computed());
    assert!(sys.multiplicity().is_zero());
}

#[test]
fn pre_tripped_flag_interrupts() {
    let mut sys = cube(3).to_system::<i64>().unwrap();
    let flag = Arc::new(AtomicBool::new(true));
    sys.set_interrupt(Arc::clone(&flag));
    assert_eq!(sys.compute(), Err(DescentError::Interrupted));
    flag.store(false, Ordering::SeqCst);
    sys.compute().unwrap();
    assert_eq!(sys.multiplicity(), &int(6));
}

#[test]
fn top_face_expansion_of_square() {
    let sys = cube(2).to_system::<i64>().unwrap();
    let exp = DescentFace::top()
        .compute(&sys, sys.dim(), &sys.top_signature())
        .unwrap();
    assert_eq!(exp.mother_key, vec![0, 1, 2, 3]);
    assert_eq!(exp.pivot, 0);
    assert_eq!(exp.opposite.len(), 2);
    assert!(exp.opposite.iter().all(|f| f.simplicial && f.height == 1));
    assert!(exp.children.is_empty());
    assert_eq!(exp.contribution, int(2));
}

#[test]
fn top_face_expansion_of_cube_has_three_children() {
    let sys = cube(3).to_system::<i64>().unwrap();
    assert_eq!(sys.mode(), FaceMode::Facet);
    let exp = DescentFace::top()
        .compute(&sys, sys.dim(), &sys.top_signature())
        .unwrap();
    assert_eq!(exp.children.len(), 3);
    assert!(exp.contribution.is_zero());
    for (sig, child) in &exp.children {
        assert_eq!(sig.count(), 1);
        assert_eq!(child.coeff, BigRational::one());
        assert_eq!(sys.face_gens(sig).count(), 4);
    }
}

fn face(coeff: i64) -> DescentFace {
    DescentFace::new(int(coeff))
}

fn iso(rows: &[&[i64]], index: i64, hash: u64) -> IsoType {
    IsoType {
        canonical: rows.iter().map(|r| r.iter().map(|&x| int(x)).collect()).collect(),
        degrees: vec![BigInt::one(); rows.len()],
        hash,
        index: BigInt::from(index),
    }
}

#[test]
fn merge_folds_into_first_signature() {
    let s: Vec<Signature> = (0..3).map(|i| Signature::from_indices(3, [i])).collect();
    let mut frontier: BTreeMap<Signature, DescentFace> =
        s.iter().cloned().zip([face(1), face(2), face(3)]).collect();
    let t = iso(&[&[1, 0], &[0, 1]], 1, 7);
    let types: BTreeMap<Signature, IsoType> = s.iter().cloned().map(|k| (k, t.clone())).collect();
    assert_eq!(merge_by_iso_type(&mut frontier, &types, true), 2);
    assert_eq!(frontier[&s[0]].coeff, int(6));
    assert_eq!(frontier[&s[0]].tree_size, 3);
    assert!(!frontier[&s[0]].dead);
    for k in &s[1..] {
        assert!(frontier[k].dead);
        assert!(frontier[k].coeff.is_zero());
    }
    let total: BigRational = frontier.values().map(|f| f.coeff.clone()).sum();
    assert_eq!(total, int(6));
}

#[test]
fn colliding_hashes_do_not_merge_under_strict_check() {
    let s: Vec<Signature> = (0..2).map(|i| Signature::from_indices(2, [i])).collect();
    let mut frontier: BTreeMap<Signature, DescentFace> =
        s.iter().cloned().zip([face(1), face(2)]).collect();
    let mut types = BTreeMap::new();
    types.insert(s[0].clone(), iso(&[&[1, 0], &[0, 1]], 1, 99));
    types.insert(s[1].clone(), iso(&[&[1, 0], &[0, 1], &[1, 1]], 1, 99));
    assert_eq!(merge_by_iso_type(&mut frontier, &types, true), 0);
    assert!(frontier.values().all(|f| !f.dead));
}

#[test]
fn different_index_never_merges() {
    let s: Vec<Signature> = (0..2).map(|i| Signature::from_indices(2, [i])).collect();
    let mut frontier: BTreeMap<Signature, DescentFace> =
        s.iter().cloned().zip([face(1), face(2)]).collect();
    let mut types = BTreeMap::new();
    types.insert(s[0].clone(), iso(&[&[1, 0], &[0, 1]], 1, 5));
    types.insert(s[1].clone(), iso(&[&[1, 0], &[0, 1]], 2, 5));
    assert_eq!(merge_by_iso_type(&mut frontier.clone(), &types, true), 0);
    assert_eq!(merge_by_iso_type(&mut frontier, &types, false), 0);
}

#[test]
fn dead_faces_are_not_merged_again() {
    let s: Vec<Signature> = (0..2).map(|i| Signature::from_indices(2, [i])).collect();
    let mut frontier: BTreeMap<Signature, DescentFace> =
        s.iter().cloned().zip([face(1), face(2)]).collect();
    if let Some(f) = frontier.get_mut(&s[1]) {
        f.dead = true;
    }
    let t = iso(&[&[1]], 1, 1);
    let types: BTreeMap<Signature, IsoType> = s.iter().cloned().map(|k| (k, t.clone())).collect();
    assert_eq!(merge_by_iso_type(&mut frontier, &types, false), 0);
    assert_eq!(frontier[&s[0]].coeff, int(1));
}

#[test]
fn random_simplex_products() {
    for seed in 0..4 {
        let p = random_simplex_product(2, 1, 2, seed).unwrap();
        assert_eq!(plain(&p), big(&p.expected), "seed {seed}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 24, .. ProptestConfig::default() })]

    #[test]
    fn random_simplex_multiplicity_is_det(seed in any::<u64>(), dim in 2usize..=4) {
        let params = SimplexParams { dim, bound: 3, ..SimplexParams::default() };
        let Ok(p) = SimplexGenerator::generate_single(&params, seed) else {
            return Ok(());
        };
        prop_assert_eq!(plain(&p), big(&p.expected));
    }
}
