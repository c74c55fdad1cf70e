//! Rational elimination: greedy bases and coordinates over Q.
//!
//! Used where the answer is inherently rational (coordinates of generators in
//! a basis chosen among them), e.g. for isomorphism keys and for checking that
//! a permutation of generators is induced by a linear map.

use num_rational::BigRational;
use num_traits::{One, Zero};

use super::matrix::Matrix;
use crate::num::{to_rational, LatticeInt};

pub type QVec = Vec<BigRational>;

pub fn to_rational_rows<N: LatticeInt>(m: &Matrix<N>) -> Vec<QVec> {
    (0..m.nrows())
        .map(|i| (0..m.ncols()).map(|j| to_rational(&m[(i, j)])).collect())
        .collect()
}

/// `v += f * w`.
fn axpy(v: &mut [BigRational], f: &BigRational, w: &[BigRational]) {
    for (x, y) in v.iter_mut().zip(w) {
        if !y.is_zero() {
            *x += f * y;
        }
    }
}

/// Indices of the lexicographically first maximal independent subset of `rows`.
pub fn greedy_basis(rows: &[QVec]) -> Vec<usize> {
    let mut reduced: Vec<(usize, QVec)> = Vec::new();
    let mut chosen = Vec::new();
    for (idx, r) in rows.iter().enumerate() {
        let mut v = r.clone();
        for (p, b) in &reduced {
            if !v[*p].is_zero() {
                let f = -v[*p].clone();
                axpy(&mut v, &f, b);
            }
        }
        if let Some(p) = v.iter().position(|x| !x.is_zero()) {
            let inv = v[p].recip();
            for x in v.iter_mut() {
                *x *= &inv;
            }
            reduced.push((p, v));
            chosen.push(idx);
        }
    }
    chosen
}

/// Coordinates `x` with `x * basis == t` for every target row `t`.
///
/// Returns `None` if the basis rows are dependent or some target lies outside
/// their span.
pub fn solve_coordinates(basis: &[QVec], targets: &[QVec]) -> Option<Vec<QVec>> {
    let r = basis.len();
    let n = basis.first().map_or(0, Vec::len);
    // Gauss-Jordan on [B | I]; afterwards R = U B with R in reduced echelon form.
    let mut aug: Vec<QVec> = basis
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let mut row = b.clone();
            row.extend((0..r).map(|j| {
                if i == j {
                    BigRational::one()
                } else {
                    BigRational::zero()
                }
            }));
            row
        })
        .collect();
    let mut pivots = Vec::with_capacity(r);
    let mut top = 0;
    for c in 0..n {
        if top == r {
            break;
        }
        let Some(p) = (top..r).find(|&i| !aug[i][c].is_zero()) else {
            continue;
        };
        aug.swap(top, p);
        let inv = aug[top][c].recip();
        for x in aug[top].iter_mut() {
            *x *= &inv;
        }
        let pivot_row = aug[top].clone();
        for (i, row) in aug.iter_mut().enumerate() {
            if i != top && !row[c].is_zero() {
                let f = -row[c].clone();
                axpy(row, &f, &pivot_row);
            }
        }
        pivots.push(c);
        top += 1;
    }
    if top < r {
        return None;
    }
    let mut out = Vec::with_capacity(targets.len());
    for t in targets {
        if t.len() != n {
            return None;
        }
        let coeffs: QVec = pivots.iter().map(|&p| t[p].clone()).collect();
        let mut check = vec![BigRational::zero(); n];
        let mut x = vec![BigRational::zero(); r];
        for (k, ck) in coeffs.iter().enumerate() {
            if ck.is_zero() {
                continue;
            }
            axpy(&mut check, ck, &aug[k][..n]);
            axpy(&mut x, ck, &aug[k][n..]);
        }
        if check != *t {
            return None;
        }
        out.push(x);
    }
    Some(out)
}
