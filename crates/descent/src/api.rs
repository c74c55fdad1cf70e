//! Convenience entry points on `i64` input.
//!
//! `multiplicity` runs the engine with `i64` arithmetic and, if that
//! overflows, once more with `BigInt`. The engine itself never retries.

use std::sync::Arc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use tracing::warn;

use crate::descent::{DescentCfg, DescentStats, DescentSystem};
use crate::error::{DescentError, Result};
use crate::num::LatticeInt;
use crate::oracle::CanonicalFormOracle;

/// Result of one multiplicity computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiplicityReport {
    pub multiplicity: BigRational,
    /// `multiplicity / (dim - 1)!`: Euclidean volume of the degree-1
    /// cross-section, measured in its own lattice.
    pub euclidean_volume: BigRational,
    /// Rank of the cone.
    pub dim: usize,
    pub stats: DescentStats,
    pub used_bigint: bool,
}

/// Input plus collaborators for one run.
#[derive(Clone, Default)]
pub struct Job<'a> {
    pub gens: &'a [Vec<i64>],
    pub supp_hyps: &'a [Vec<i64>],
    pub grading: &'a [i64],
    pub cfg: DescentCfg,
    pub oracle: Option<Arc<dyn CanonicalFormOracle>>,
}

/// Compute with `i64`, falling back to `BigInt` on overflow.
pub fn multiplicity(job: &Job<'_>) -> Result<MultiplicityReport> {
    match multiplicity_with::<i64>(job) {
        Err(DescentError::Overflow) => {
            warn!("i64 arithmetic overflowed; retrying with BigInt");
            multiplicity_with::<BigInt>(job)
        }
        other => other,
    }
}

/// Compute with a fixed integer type.
pub fn multiplicity_with<N: LatticeInt>(job: &Job<'_>) -> Result<MultiplicityReport> {
    let conv = |rows: &[Vec<i64>]| -> Vec<Vec<N>> {
        rows.iter()
            .map(|r| r.iter().map(|&x| N::from_i64(x)).collect())
            .collect()
    };
    let mut sys = DescentSystem::<N>::from_rows(
        &conv(job.gens),
        &conv(job.supp_hyps),
        job.grading.iter().map(|&x| N::from_i64(x)).collect(),
    )?;
    sys.set_cfg(job.cfg.clone());
    if let Some(oracle) = &job.oracle {
        sys.set_oracle(Arc::clone(oracle));
    }
    sys.compute()?;
    Ok(MultiplicityReport {
        multiplicity: sys.multiplicity().clone(),
        euclidean_volume: euclidean_volume(sys.multiplicity(), sys.dim()),
        dim: sys.dim(),
        stats: sys.stats(),
        used_bigint: std::any::TypeId::of::<N>() == std::any::TypeId::of::<BigInt>(),
    })
}

/// `mult / (dim - 1)!` for a cone of rank `dim >= 1`.
pub fn euclidean_volume(mult: &BigRational, dim: usize) -> BigRational {
    let fact = (1..dim).fold(BigInt::one(), |acc, k| acc * BigInt::from(k));
    mult / BigRational::from_integer(fact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::cube;

    #[test]
    fn cube_volume_is_one() {
        let p = cube(3);
        let report = multiplicity(&Job {
            gens: &p.gens,
            supp_hyps: &p.supp_hyps,
            grading: &p.grading,
            ..Job::default()
        })
        .unwrap();
        assert_eq!(report.multiplicity, BigRational::from_integer(BigInt::from(6)));
        assert_eq!(report.euclidean_volume, BigRational::one());
        assert!(!report.used_bigint);
    }

    #[test]
    fn overflow_falls_back_to_bigint() {
        // simplex conv(0, K e_1, K e_2) with K near 2^40: det K^2 overflows i64 products
        let k: i64 = 1 << 40;
        let gens = vec![vec![1, 0, 0], vec![1, k, 0], vec![1, 0, k]];
        let supp_hyps = vec![vec![0, 1, 0], vec![0, 0, 1], vec![k, -1, -1]];
        let grading = vec![1, 0, 0];
        let job = Job {
            gens: &gens,
            supp_hyps: &supp_hyps,
            grading: &grading,
            ..Job::default()
        };
        assert_eq!(multiplicity_with::<i64>(&job).unwrap_err(), DescentError::Overflow);
        let report = multiplicity(&job).unwrap();
        assert!(report.used_bigint);
        let expected = BigInt::from(k) * BigInt::from(k);
        assert_eq!(report.multiplicity, BigRational::from_integer(expected));
    }

    #[test]
    fn euclidean_volume_divides_by_factorial() {
        let m = BigRational::from_integer(BigInt::from(24));
        assert_eq!(euclidean_volume(&m, 5), BigRational::one());
    }
}
