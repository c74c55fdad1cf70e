//! Saturation of a sublattice with coordinate maps in both directions.

use num_traits::Zero;

use super::matrix::{identity, make_primitive, row_echelon, volume, Matrix};
use crate::error::{DescentError, Result};
use crate::num::{self, LatticeInt};

/// The saturation `span(B) ∩ Z^n` of the lattice spanned by rows `B`.
///
/// Invariants:
/// - `v` is unimodular and `w = v^{-1}`; `B v` is zero outside its first
///   `rank` columns.
/// - The first `rank` rows of `w` form a basis of the saturation.
#[derive(Clone, Debug)]
pub struct Sublattice<N: LatticeInt> {
    rank: usize,
    v: Matrix<N>,
    w: Matrix<N>,
}

impl<N: LatticeInt> Sublattice<N> {
    /// Column-style reduction of `gens`; inverse operations are mirrored on `w`.
    pub fn saturation(gens: &Matrix<N>) -> Result<Self> {
        let n = gens.ncols();
        let mut m = gens.clone();
        let mut v = identity::<N>(n);
        let mut w = identity::<N>(n);
        let mut p = 0;
        for i in 0..m.nrows() {
            if p == n {
                break;
            }
            loop {
                let mut best: Option<(usize, N)> = None;
                for j in p..n {
                    if m[(i, j)].is_zero() {
                        continue;
                    }
                    let ax = num::abs(&m[(i, j)])?;
                    if best.as_ref().map_or(true, |(_, b)| ax < *b) {
                        best = Some((j, ax));
                    }
                }
                let Some((j, _)) = best else { break };
                if j != p {
                    m.swap_columns(p, j);
                    v.swap_columns(p, j);
                    w.swap_rows(p, j);
                }
                let mut cleared = true;
                for j in p + 1..n {
                    if m[(i, j)].is_zero() {
                        continue;
                    }
                    let q = num::div_floor(&m[(i, j)], &m[(i, p)])?;
                    sub_col_multiple(&mut m, j, p, &q)?;
                    sub_col_multiple(&mut v, j, p, &q)?;
                    add_row_multiple(&mut w, p, j, &q)?;
                    if !m[(i, j)].is_zero() {
                        cleared = false;
                    }
                }
                if cleared {
                    break;
                }
            }
            if m[(i, p)].is_zero() {
                continue;
            }
            if m[(i, p)].is_negative() {
                negate_col(&mut m, p)?;
                negate_col(&mut v, p)?;
                for k in 0..n {
                    w[(p, k)] = num::neg(&w[(p, k)])?;
                }
            }
            p += 1;
        }
        Ok(Self { rank: p, v, w })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn ambient_dim(&self) -> usize {
        self.v.nrows()
    }

    /// Basis rows of the saturation in ambient coordinates.
    pub fn basis(&self) -> Matrix<N> {
        Matrix::from_fn(self.rank, self.ambient_dim(), |i, j| self.w[(i, j)].clone())
    }

    /// Coordinates of `x` in the saturation basis; fails if `x` is outside it.
    pub fn to_sublattice(&self, x: &[N]) -> Result<Vec<N>> {
        let n = self.ambient_dim();
        debug_assert_eq!(x.len(), n);
        let mut y = Vec::with_capacity(self.rank);
        for j in 0..n {
            let mut acc = N::zero();
            for (i, xi) in x.iter().enumerate() {
                if xi.is_zero() || self.v[(i, j)].is_zero() {
                    continue;
                }
                acc = num::add(&acc, &num::mul(xi, &self.v[(i, j)])?)?;
            }
            if j < self.rank {
                y.push(acc);
            } else if !acc.is_zero() {
                return Err(DescentError::failed("vector lies outside the sublattice"));
            }
        }
        Ok(y)
    }

    /// Restriction of the linear form `h` to the saturation, made primitive.
    pub fn to_sublattice_dual(&self, h: &[N]) -> Result<Vec<N>> {
        let n = self.ambient_dim();
        debug_assert_eq!(h.len(), n);
        let mut out = Vec::with_capacity(self.rank);
        for k in 0..self.rank {
            let mut acc = N::zero();
            for (j, hj) in h.iter().enumerate() {
                if hj.is_zero() || self.w[(k, j)].is_zero() {
                    continue;
                }
                acc = num::add(&acc, &num::mul(&self.w[(k, j)], hj)?)?;
            }
            out.push(acc);
        }
        make_primitive(&mut out)?;
        Ok(out)
    }

    /// Ambient vector with sublattice coordinates `c`.
    pub fn from_sublattice(&self, c: &[N]) -> Result<Vec<N>> {
        debug_assert_eq!(c.len(), self.rank);
        let n = self.ambient_dim();
        let mut out = vec![N::zero(); n];
        for (k, ck) in c.iter().enumerate() {
            if ck.is_zero() {
                continue;
            }
            for (j, o) in out.iter_mut().enumerate() {
                let t = num::mul(ck, &self.w[(k, j)])?;
                *o = num::add(o, &t)?;
            }
        }
        Ok(out)
    }
}

fn sub_col_multiple<N: LatticeInt>(a: &mut Matrix<N>, dst: usize, src: usize, q: &N) -> Result<()> {
    for i in 0..a.nrows() {
        if a[(i, src)].is_zero() {
            continue;
        }
        let t = num::mul(q, &a[(i, src)])?;
        a[(i, dst)] = num::sub(&a[(i, dst)], &t)?;
    }
    Ok(())
}

fn add_row_multiple<N: LatticeInt>(a: &mut Matrix<N>, dst: usize, src: usize, q: &N) -> Result<()> {
    for j in 0..a.ncols() {
        if a[(src, j)].is_zero() {
            continue;
        }
        let t = num::mul(q, &a[(src, j)])?;
        a[(dst, j)] = num::add(&a[(dst, j)], &t)?;
    }
    Ok(())
}

fn negate_col<N: LatticeInt>(a: &mut Matrix<N>, j: usize) -> Result<()> {
    for i in 0..a.nrows() {
        a[(i, j)] = num::neg(&a[(i, j)])?;
    }
    Ok(())
}

/// Index of the lattice spanned by `rows` in its saturation.
///
/// Returns 0 for a rank-0 input.
pub fn lattice_index<N: LatticeInt>(rows: &Matrix<N>) -> Result<N> {
    let e = row_echelon(rows)?;
    if e.rank() == 0 {
        return Ok(N::zero());
    }
    if e.is_unimodular() {
        return Ok(N::one());
    }
    let sat = Sublattice::saturation(&e.rows)?;
    let mut coords = Vec::with_capacity(e.rank());
    for k in 0..e.rank() {
        let r: Vec<N> = (0..e.rows.ncols()).map(|j| e.rows[(k, j)].clone()).collect();
        coords.push(sat.to_sublattice(&r)?);
    }
    let m = Matrix::from_fn(e.rank(), e.rank(), |i, j| coords[i][j].clone());
    volume(&m)
}
