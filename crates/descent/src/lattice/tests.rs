use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;

use super::*;
use crate::error::DescentError;

fn m(rows: &[&[i64]]) -> Matrix<i64> {
    let rows: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
    let ncols = rows.first().map_or(0, Vec::len);
    from_rows(&rows, ncols).unwrap()
}

fn q(v: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(v))
}

#[test]
fn echelon_keeps_lattice_and_rank() {
    let a = m(&[&[2, 4, 6], &[1, 2, 3], &[0, 3, 3]]);
    let e = row_echelon(&a).unwrap();
    assert_eq!(e.rank(), 2);
    assert_eq!(e.pivots, vec![0, 1]);
    // (1,2,3) and (0,3,3) span the same lattice as the input rows
    assert_eq!(row(&e.rows, 0), vec![1, 2, 3]);
    assert_eq!(row(&e.rows, 1), vec![0, 3, 3]);
    assert!(!e.is_unimodular());
    assert_eq!(rank(&a).unwrap(), 2);
    assert_eq!(lattice_index(&a).unwrap(), 3);
}

#[test]
fn echelon_detects_non_unit_pivots() {
    let a = m(&[&[2, 0], &[0, 1]]);
    let e = row_echelon(&a).unwrap();
    assert_eq!(e.rank(), 2);
    assert!(!e.is_unimodular());
}

#[test]
fn determinant_small_cases() {
    assert_eq!(determinant(&m(&[&[3]])).unwrap(), 3);
    assert_eq!(determinant(&m(&[&[0, 1], &[1, 0]])).unwrap(), -1);
    assert_eq!(determinant(&m(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 10]])).unwrap(), -3);
    assert_eq!(determinant(&m(&[&[1, 2], &[2, 4]])).unwrap(), 0);
    assert_eq!(volume(&m(&[&[0, 2], &[3, 0]])).unwrap(), 6);
}

#[test]
fn determinant_overflow_on_i64_succeeds_on_bigint() {
    let big = 1i64 << 40;
    let a = m(&[&[big, 1], &[1, big]]);
    assert_eq!(determinant(&a), Err(DescentError::Overflow));
    let b: Matrix<BigInt> = a.map(BigInt::from);
    let expected = BigInt::from(big) * BigInt::from(big) - BigInt::from(1);
    assert_eq!(determinant(&b).unwrap(), expected);
}

#[test]
fn primitive_vectors() {
    let mut v = vec![4i64, -6, 10];
    assert_eq!(make_primitive(&mut v).unwrap(), 2);
    assert_eq!(v, vec![2, -3, 5]);
    let mut z = vec![0i64, 0];
    assert_eq!(make_primitive(&mut z).unwrap(), 0);
}

#[test]
fn saturation_of_a_non_saturated_plane() {
    // span{(2,0,0),(0,2,0)} has saturation Z^2 x {0}; index 4
    let a = m(&[&[2, 0, 0], &[0, 2, 0]]);
    let s = Sublattice::saturation(&a).unwrap();
    assert_eq!(s.rank(), 2);
    assert_eq!(s.ambient_dim(), 3);
    let c = s.to_sublattice(&[1, 1, 0]).unwrap();
    assert_eq!(s.from_sublattice(&c).unwrap(), vec![1, 1, 0]);
    assert!(s.to_sublattice(&[0, 0, 1]).is_err());
    assert_eq!(lattice_index(&a).unwrap(), 4);
}

#[test]
fn saturation_basis_spans_expected_lattice() {
    let a = m(&[&[1, 1, 1], &[1, -1, 3]]);
    let s = Sublattice::saturation(&a).unwrap();
    let b = s.basis();
    assert_eq!(b.nrows(), 2);
    // every input row has integral coordinates in the basis
    for i in 0..a.nrows() {
        let r = row(&a, i);
        let c = s.to_sublattice(&r).unwrap();
        assert_eq!(s.from_sublattice(&c).unwrap(), r);
    }
    // (1,0,2) = ((1,1,1)+(1,-1,3))/2 is in the saturation but not in the span lattice
    assert!(s.to_sublattice(&[1, 0, 2]).is_ok());
    assert_eq!(lattice_index(&a).unwrap(), 2);
}

#[test]
fn dual_restriction_is_primitive() {
    let a = m(&[&[1, 0, 0], &[0, 1, 0]]);
    let s = Sublattice::saturation(&a).unwrap();
    let d = s.to_sublattice_dual(&[4, 6, 5]).unwrap();
    assert_eq!(d.len(), 2);
    let g = d.iter().fold(0i64, |acc, x| num_integer::gcd(acc, *x));
    assert_eq!(g, 1);
}

#[test]
fn frame_paths_agree_on_heights_and_volumes() {
    // Face spanned by (1,0,0),(1,2,0),(1,0,2): index 4, echelon pivots not all 1.
    let gens = m(&[&[1, 0, 0], &[1, 2, 0], &[1, 0, 2], &[1, 2, 2]]);
    let fast = Frame::new(&gens).unwrap();
    let slow = Frame::saturated(&gens).unwrap();
    assert_eq!(fast.rank(), 3);
    let h = [0i64, 1, 0];
    for i in 0..gens.nrows() {
        let v = row(&gens, i);
        assert_eq!(fast.height(&v, &h).unwrap(), slow.height(&v, &h).unwrap());
    }
    let unimodular = m(&[&[1, 0, 0], &[1, 1, 0], &[1, 0, 1]]);
    let fast = Frame::new(&unimodular).unwrap();
    let slow = Frame::saturated(&unimodular).unwrap();
    assert!(fast.is_unimodular());
    let h = [2i64, -2, -2];
    let v = [1i64, 0, 0];
    assert_eq!(fast.height(&v, &h).unwrap(), slow.height(&v, &h).unwrap());
    let cf: Vec<Vec<i64>> = (0..3).map(|i| fast.coordinates(&row(&unimodular, i)).unwrap()).collect();
    let cs: Vec<Vec<i64>> = (0..3).map(|i| slow.coordinates(&row(&unimodular, i)).unwrap()).collect();
    let vf = volume(&from_rows(&cf, 3).unwrap()).unwrap();
    let vs = volume(&from_rows(&cs, 3).unwrap()).unwrap();
    assert_eq!(vf, vs);
    assert_eq!(vf, 1);
}

#[test]
fn greedy_basis_and_coordinates() {
    let rows = vec![
        vec![q(1), q(0)],
        vec![q(2), q(0)],
        vec![q(1), q(1)],
        vec![q(3), q(2)],
    ];
    let basis_idx = greedy_basis(&rows);
    assert_eq!(basis_idx, vec![0, 2]);
    let basis: Vec<QVec> = basis_idx.iter().map(|&i| rows[i].clone()).collect();
    let coords = solve_coordinates(&basis, &rows).unwrap();
    assert_eq!(coords[1], vec![q(2), q(0)]);
    assert_eq!(coords[3], vec![q(1), q(2)]);
    // outside the span
    let line = vec![vec![q(1), q(0)]];
    assert!(solve_coordinates(&line, &[vec![q(0), q(1)]]).is_none());
}

proptest! {
    #[test]
    fn unimodular_transform_preserves_volume(
        a in -5i64..=5, b in -5i64..=5, c in -5i64..=5,
        d0 in 1i64..=4, d1 in 1i64..=4, d2 in 1i64..=4,
    ) {
        // upper triangular with diagonal (d0, d1, d2)
        let base = m(&[&[d0, a, b], &[0, d1, c], &[0, 0, d2]]);
        prop_assert_eq!(volume(&base).unwrap(), d0 * d1 * d2);
        let e = row_echelon(&base).unwrap();
        prop_assert_eq!(volume(&e.rows).unwrap(), d0 * d1 * d2);
        prop_assert_eq!(lattice_index(&base).unwrap(), d0 * d1 * d2);
    }
}
