//! Exact lattice linear algebra for the descent engine.
//!
//! Purpose
//! - Rank, submatrices, row echelon, determinants, saturation and lattice
//!   index on integer matrices; rational coordinates where the answer is
//!   rational.
//!
//! Why this design (short)
//! - Matrices are `nalgebra::DMatrix<N>` over the pluggable integer `N`; every
//!   ring operation goes through `crate::num` so `i64` overflow surfaces as
//!   `DescentError::Overflow` instead of wrapping.
//! - Only unimodular row/column operations are used on integer data, so the
//!   lattices involved never change silently.
//!
//! Conventions
//! - Vectors are rows. Linear forms are rows too; `<v, h>` is the plain
//!   scalar product.

mod frame;
mod matrix;
mod rational;
mod sublattice;

pub use frame::Frame;
pub use matrix::{
    determinant, from_rows, identity, make_primitive, rank, row, row_echelon, row_scalar_product,
    scalar_product, submatrix, to_rows, volume, Echelon, Matrix,
};
pub use rational::{greedy_basis, solve_coordinates, to_rational_rows, QVec};
pub use sublattice::{lattice_index, Sublattice};

#[cfg(test)]
mod tests;
