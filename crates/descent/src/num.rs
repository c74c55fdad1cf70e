//! Pluggable exact integer type and overflow-checked helpers.
//!
//! The engine is generic over `LatticeInt`: `i64` runs fast but may raise
//! `DescentError::Overflow`; `BigInt` never overflows. Coefficients and the
//! multiplicity are always `BigRational`, independent of `N`.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, One, Signed, ToPrimitive, Zero};

use crate::error::{DescentError, Result};

/// Exact integer usable for lattice computations.
pub trait LatticeInt:
    Integer
    + Signed
    + CheckedAdd
    + CheckedSub
    + CheckedMul
    + CheckedDiv
    + Clone
    + Hash
    + Debug
    + Display
    + Send
    + Sync
    + 'static
{
    fn to_big(&self) -> BigInt;
    /// Narrowing conversion; fails with `Overflow` if `v` does not fit.
    fn from_big(v: &BigInt) -> Result<Self>;
    fn from_i64(v: i64) -> Self;
}

impl LatticeInt for i64 {
    #[inline]
    fn to_big(&self) -> BigInt {
        BigInt::from(*self)
    }
    #[inline]
    fn from_big(v: &BigInt) -> Result<Self> {
        v.to_i64().ok_or(DescentError::Overflow)
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        v
    }
}

impl LatticeInt for BigInt {
    #[inline]
    fn to_big(&self) -> BigInt {
        self.clone()
    }
    #[inline]
    fn from_big(v: &BigInt) -> Result<Self> {
        Ok(v.clone())
    }
    #[inline]
    fn from_i64(v: i64) -> Self {
        BigInt::from(v)
    }
}

#[inline]
pub fn add<N: LatticeInt>(a: &N, b: &N) -> Result<N> {
    a.checked_add(b).ok_or(DescentError::Overflow)
}

#[inline]
pub fn sub<N: LatticeInt>(a: &N, b: &N) -> Result<N> {
    a.checked_sub(b).ok_or(DescentError::Overflow)
}

#[inline]
pub fn mul<N: LatticeInt>(a: &N, b: &N) -> Result<N> {
    a.checked_mul(b).ok_or(DescentError::Overflow)
}

#[inline]
pub fn neg<N: LatticeInt>(a: &N) -> Result<N> {
    N::zero().checked_sub(a).ok_or(DescentError::Overflow)
}

#[inline]
pub fn abs<N: LatticeInt>(a: &N) -> Result<N> {
    if a.is_negative() {
        neg(a)
    } else {
        Ok(a.clone())
    }
}

/// Exact quotient `a / b`; `b` must divide `a`.
pub fn div_exact<N: LatticeInt>(a: &N, b: &N) -> Result<N> {
    if b.is_zero() {
        return Err(DescentError::failed("division by zero"));
    }
    let q = a.checked_div(b).ok_or(DescentError::Overflow)?;
    debug_assert!(a.mod_floor(b).is_zero(), "inexact division {a} / {b}");
    Ok(q)
}

/// Floor division that reports the `MIN / -1` case as overflow.
pub fn div_floor<N: LatticeInt>(a: &N, b: &N) -> Result<N> {
    if b.is_zero() {
        return Err(DescentError::failed("division by zero"));
    }
    if *b == neg(&N::one())? {
        return neg(a);
    }
    Ok(a.div_floor(b))
}

/// Non-negative gcd; `gcd(0, 0) == 0`.
pub fn gcd<N: LatticeInt>(a: &N, b: &N) -> Result<N> {
    let mut x = abs(a)?;
    let mut y = abs(b)?;
    while !y.is_zero() {
        let r = x.mod_floor(&y);
        x = y;
        y = r;
    }
    Ok(x)
}

#[inline]
pub fn is_unit<N: LatticeInt>(a: &N) -> bool {
    a.is_one() || (a.is_negative() && a.abs().is_one())
}

/// `BigRational` view of an exact integer.
#[inline]
pub fn to_rational<N: LatticeInt>(a: &N) -> BigRational {
    BigRational::from_integer(a.to_big())
}
