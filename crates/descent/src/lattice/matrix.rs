//! Integer matrices: construction, scalar products, row echelon, determinant.

use nalgebra::DMatrix;
use num_traits::{One, Zero};

use crate::error::{DescentError, Result};
use crate::num::{self, LatticeInt};

/// Row-major view: every row is one vector (generator or linear form).
pub type Matrix<N> = DMatrix<N>;

/// Build a matrix from rows of equal length `ncols`.
pub fn from_rows<N: LatticeInt>(rows: &[Vec<N>], ncols: usize) -> Result<Matrix<N>> {
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(DescentError::failed(format!(
            "row {bad} has length {} (expected {ncols})",
            rows[bad].len()
        )));
    }
    Ok(Matrix::from_fn(rows.len(), ncols, |i, j| rows[i][j].clone()))
}

#[inline]
pub fn row<N: LatticeInt>(m: &Matrix<N>, i: usize) -> Vec<N> {
    (0..m.ncols()).map(|j| m[(i, j)].clone()).collect()
}

pub fn to_rows<N: LatticeInt>(m: &Matrix<N>) -> Vec<Vec<N>> {
    (0..m.nrows()).map(|i| row(m, i)).collect()
}

#[inline]
pub fn identity<N: LatticeInt>(n: usize) -> Matrix<N> {
    Matrix::from_fn(n, n, |i, j| if i == j { N::one() } else { N::zero() })
}

/// Rows of `m` selected by `idx`, in the given order.
pub fn submatrix<N: LatticeInt>(m: &Matrix<N>, idx: &[usize]) -> Matrix<N> {
    Matrix::from_fn(idx.len(), m.ncols(), |i, j| m[(idx[i], j)].clone())
}

pub fn scalar_product<N: LatticeInt>(a: &[N], b: &[N]) -> Result<N> {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = N::zero();
    for (x, y) in a.iter().zip(b) {
        if x.is_zero() || y.is_zero() {
            continue;
        }
        acc = num::add(&acc, &num::mul(x, y)?)?;
    }
    Ok(acc)
}

/// `<m[i], v>` without materializing the row.
pub fn row_scalar_product<N: LatticeInt>(m: &Matrix<N>, i: usize, v: &[N]) -> Result<N> {
    debug_assert_eq!(m.ncols(), v.len());
    let mut acc = N::zero();
    for (j, y) in v.iter().enumerate() {
        let x = &m[(i, j)];
        if x.is_zero() || y.is_zero() {
            continue;
        }
        acc = num::add(&acc, &num::mul(x, y)?)?;
    }
    Ok(acc)
}

/// Divide `v` by the gcd of its entries; returns the gcd (0 for the zero vector).
pub fn make_primitive<N: LatticeInt>(v: &mut [N]) -> Result<N> {
    let mut g = N::zero();
    for x in v.iter() {
        g = num::gcd(&g, x)?;
        if g.is_one() {
            return Ok(g);
        }
    }
    if g.is_zero() || g.is_one() {
        return Ok(g);
    }
    for x in v.iter_mut() {
        *x = num::div_exact(x, &g)?;
    }
    Ok(g)
}

/// Hermite-style row echelon form computed with unimodular row operations.
///
/// Invariants:
/// - `rows` spans the same lattice as the input rows.
/// - Row `k` is zero left of `pivots[k]`; the pivot entry is positive and the
///   entries above it are reduced into `[0, pivot)`.
#[derive(Clone, Debug)]
pub struct Echelon<N: LatticeInt> {
    pub rows: Matrix<N>,
    pub pivots: Vec<usize>,
}

impl<N: LatticeInt> Echelon<N> {
    #[inline]
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    /// All pivots are 1, so the rows span a saturated lattice.
    pub fn is_unimodular(&self) -> bool {
        self.pivots
            .iter()
            .enumerate()
            .all(|(k, &p)| self.rows[(k, p)].is_one())
    }

    /// Integral coordinates of `v` in the lattice spanned by `rows`.
    ///
    /// Forward substitution along the pivots; fails if `v` is not an integral
    /// combination of the rows.
    pub fn coordinates(&self, v: &[N]) -> Result<Vec<N>> {
        debug_assert_eq!(self.rows.ncols(), v.len());
        let mut rest = v.to_vec();
        let mut c = Vec::with_capacity(self.rank());
        for (k, &p) in self.pivots.iter().enumerate() {
            let pivot = &self.rows[(k, p)];
            let ck = if rest[p].is_zero() || pivot.is_one() {
                rest[p].clone()
            } else {
                let q = num::div_floor(&rest[p], pivot)?;
                if num::mul(&q, pivot)? != rest[p] {
                    return Err(DescentError::failed("vector lies outside the row lattice"));
                }
                q
            };
            if !ck.is_zero() {
                sub_row_from(&mut rest, &self.rows, k, &ck, p)?;
            }
            c.push(ck);
        }
        if rest.iter().any(|x| !x.is_zero()) {
            return Err(DescentError::failed("vector lies outside the row lattice"));
        }
        Ok(c)
    }
}

/// `v -= q * m[k]`, touching columns `from..`.
fn sub_row_from<N: LatticeInt>(v: &mut [N], m: &Matrix<N>, k: usize, q: &N, from: usize) -> Result<()> {
    for j in from..m.ncols() {
        let s = &m[(k, j)];
        if s.is_zero() {
            continue;
        }
        v[j] = num::sub(&v[j], &num::mul(q, s)?)?;
    }
    Ok(())
}

/// `row[dst] -= q * row[src]`, touching columns `from..`.
fn sub_row_multiple<N: LatticeInt>(
    a: &mut Matrix<N>,
    dst: usize,
    src: usize,
    q: &N,
    from: usize,
) -> Result<()> {
    for j in from..a.ncols() {
        let s = &a[(src, j)];
        if s.is_zero() {
            continue;
        }
        let t = num::mul(q, s)?;
        a[(dst, j)] = num::sub(&a[(dst, j)], &t)?;
    }
    Ok(())
}

fn negate_row<N: LatticeInt>(a: &mut Matrix<N>, i: usize) -> Result<()> {
    for j in 0..a.ncols() {
        a[(i, j)] = num::neg(&a[(i, j)])?;
    }
    Ok(())
}

/// Reduce `m` to row echelon form; zero rows are dropped.
///
/// Each column is cleared below the pivot by repeated Euclidean steps, so all
/// operations are unimodular and the result stays integral.
pub fn row_echelon<N: LatticeInt>(m: &Matrix<N>) -> Result<Echelon<N>> {
    let mut a = m.clone();
    let (nr, nc) = a.shape();
    let mut pivots = Vec::new();
    let mut r = 0;
    for c in 0..nc {
        if r == nr {
            break;
        }
        loop {
            let mut best: Option<(usize, N)> = None;
            for i in r..nr {
                if a[(i, c)].is_zero() {
                    continue;
                }
                let ax = num::abs(&a[(i, c)])?;
                if best.as_ref().map_or(true, |(_, b)| ax < *b) {
                    best = Some((i, ax));
                }
            }
            let Some((p, _)) = best else { break };
            if p != r {
                a.swap_rows(r, p);
            }
            let mut cleared = true;
            for i in r + 1..nr {
                if a[(i, c)].is_zero() {
                    continue;
                }
                let q = num::div_floor(&a[(i, c)], &a[(r, c)])?;
                sub_row_multiple(&mut a, i, r, &q, c)?;
                if !a[(i, c)].is_zero() {
                    cleared = false;
                }
            }
            if cleared {
                break;
            }
        }
        if a[(r, c)].is_zero() {
            continue;
        }
        if a[(r, c)].is_negative() {
            negate_row(&mut a, r)?;
        }
        for i in 0..r {
            if a[(i, c)].is_zero() {
                continue;
            }
            let q = num::div_floor(&a[(i, c)], &a[(r, c)])?;
            sub_row_multiple(&mut a, i, r, &q, c)?;
        }
        pivots.push(c);
        r += 1;
    }
    let rows = Matrix::from_fn(r, nc, |i, j| a[(i, j)].clone());
    Ok(Echelon { rows, pivots })
}

pub fn rank<N: LatticeInt>(m: &Matrix<N>) -> Result<usize> {
    Ok(row_echelon(m)?.rank())
}

/// Exact determinant by fraction-free (Bareiss) elimination.
pub fn determinant<N: LatticeInt>(m: &Matrix<N>) -> Result<N> {
    let n = m.nrows();
    if n != m.ncols() {
        return Err(DescentError::failed(format!(
            "determinant of a non-square {}x{} matrix",
            n,
            m.ncols()
        )));
    }
    if n == 0 {
        return Ok(N::one());
    }
    let mut a = m.clone();
    let mut negative = false;
    let mut prev = N::one();
    for k in 0..n - 1 {
        if a[(k, k)].is_zero() {
            match (k + 1..n).find(|&i| !a[(i, k)].is_zero()) {
                Some(i) => {
                    a.swap_rows(k, i);
                    negative = !negative;
                }
                None => return Ok(N::zero()),
            }
        }
        for i in k + 1..n {
            for j in k + 1..n {
                let t = num::sub(
                    &num::mul(&a[(i, j)], &a[(k, k)])?,
                    &num::mul(&a[(i, k)], &a[(k, j)])?,
                )?;
                a[(i, j)] = num::div_exact(&t, &prev)?;
            }
        }
        prev = a[(k, k)].clone();
    }
    let det = a[(n - 1, n - 1)].clone();
    if negative {
        num::neg(&det)
    } else {
        Ok(det)
    }
}

/// `|det|`, the normalized volume of the parallelotope spanned by the rows.
#[inline]
pub fn volume<N: LatticeInt>(m: &Matrix<N>) -> Result<N> {
    num::abs(&determinant(m)?)
}
