//! Coordinate frame of a face lattice.
//!
//! A face of dimension `d` lives in the saturation of the span of its
//! generators. If the echelon basis of (a full-rank subset of) those generators
//! has unit pivots, that basis already spans the saturation and coordinates
//! follow from forward substitution; heights are `<v,H> / gcd(E H)`. Otherwise
//! the saturation is computed once and reused for every query on the face.

use num_traits::{One, Zero};

use super::matrix::{row_scalar_product, row_echelon, scalar_product, Echelon, Matrix};
use super::sublattice::Sublattice;
use crate::error::{DescentError, Result};
use crate::num::{self, LatticeInt};

#[derive(Clone, Debug)]
pub enum Frame<N: LatticeInt> {
    Unimodular(Echelon<N>),
    Saturated(Sublattice<N>),
}

impl<N: LatticeInt> Frame<N> {
    /// Frame for the lattice spanned by the rows of `basis`.
    pub fn new(basis: &Matrix<N>) -> Result<Self> {
        Self::from_echelon(row_echelon(basis)?)
    }

    pub fn from_echelon(e: Echelon<N>) -> Result<Self> {
        if e.is_unimodular() {
            Ok(Self::Unimodular(e))
        } else {
            Ok(Self::Saturated(Sublattice::saturation(&e.rows)?))
        }
    }

    /// Always go through the saturation (used to cross-check both paths).
    pub fn saturated(basis: &Matrix<N>) -> Result<Self> {
        Ok(Self::Saturated(Sublattice::saturation(basis)?))
    }

    pub fn rank(&self) -> usize {
        match self {
            Self::Unimodular(e) => e.rank(),
            Self::Saturated(s) => s.rank(),
        }
    }

    #[inline]
    pub fn is_unimodular(&self) -> bool {
        matches!(self, Self::Unimodular(_))
    }

    /// Integral coordinates of `v` in the frame basis.
    pub fn coordinates(&self, v: &[N]) -> Result<Vec<N>> {
        match self {
            Self::Unimodular(e) => e.coordinates(v),
            Self::Saturated(s) => s.to_sublattice(v),
        }
    }

    /// Primitive restriction of the linear form `h`, in frame coordinates.
    pub fn dual(&self, h: &[N]) -> Result<Vec<N>> {
        match self {
            Self::Unimodular(e) => {
                let mut out = (0..e.rank())
                    .map(|k| row_scalar_product(&e.rows, k, h))
                    .collect::<Result<Vec<_>>>()?;
                super::matrix::make_primitive(&mut out)?;
                Ok(out)
            }
            Self::Saturated(s) => s.to_sublattice_dual(h),
        }
    }

    /// Lattice height of `v` over the hyperplane `h` within this frame.
    pub fn height(&self, v: &[N], h: &[N]) -> Result<N> {
        match self {
            Self::Unimodular(e) => {
                let mut g = N::zero();
                for k in 0..e.rank() {
                    g = num::gcd(&g, &row_scalar_product(&e.rows, k, h)?)?;
                    if g.is_one() {
                        break;
                    }
                }
                let val = scalar_product(v, h)?;
                if g.is_zero() {
                    return if val.is_zero() {
                        Ok(val)
                    } else {
                        Err(DescentError::failed("vector lies outside the face lattice"))
                    };
                }
                num::div_exact(&val, &g)
            }
            Self::Saturated(s) => scalar_product(&s.to_sublattice(v)?, &s.to_sublattice_dual(h)?),
        }
    }
}
