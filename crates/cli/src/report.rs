//! JSON input and output of the CLI.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use descent::api::MultiplicityReport;
use descent::prelude::{BigInt, BigRational};
use descent::special::LatticePolytope;

/// Cone given by extreme rays, support hyperplanes and grading.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConeInput {
    pub generators: Vec<Vec<i64>>,
    pub support_hyperplanes: Vec<Vec<i64>>,
    pub grading: Vec<i64>,
    /// Known multiplicity, if any (built-in families).
    #[serde(skip)]
    pub expected: Option<BigInt>,
}

impl ConeInput {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }
}

impl From<LatticePolytope> for ConeInput {
    fn from(p: LatticePolytope) -> Self {
        Self {
            generators: p.gens,
            support_hyperplanes: p.supp_hyps,
            grading: p.grading,
            expected: Some(p.expected),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// Exact value, `p` or `p/q`.
    pub multiplicity: String,
    pub multiplicity_f64: Option<f64>,
    pub euclidean_volume: String,
    pub euclidean_volume_f64: Option<f64>,
    pub dim: usize,
    pub descent_steps: u64,
    pub nr_simplicial: u64,
    pub tree_size: u64,
    pub system_size: u64,
    pub used_bigint: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches_expected: Option<bool>,
}

impl Report {
    pub fn new(r: &MultiplicityReport, expected: Option<&BigInt>) -> Self {
        Self {
            multiplicity: r.multiplicity.to_string(),
            multiplicity_f64: r.multiplicity.to_f64(),
            euclidean_volume: r.euclidean_volume.to_string(),
            euclidean_volume_f64: r.euclidean_volume.to_f64(),
            dim: r.dim,
            descent_steps: r.stats.descent_steps,
            nr_simplicial: r.stats.nr_simplicial,
            tree_size: r.stats.tree_size,
            system_size: r.stats.system_size,
            used_bigint: r.used_bigint,
            matches_expected: expected
                .map(|e| BigRational::from_integer(e.clone()) == r.multiplicity),
        }
    }
}
