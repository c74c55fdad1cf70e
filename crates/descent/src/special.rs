//! Lattice polytopes with known multiplicity, used in tests, benches and the CLI.
//!
//! Purpose
//! - Build cones over lattice polytopes `P ⊂ R^n`: generators `(1, v)` for the
//!   vertices, support hyperplanes `(b, -a)` for facets `a·x ≤ b`, grading
//!   `e_0`. The multiplicity is then the normalized volume `n! vol(P)`.
//! - Keep constructors small and explicit so tests can rely on them.
//!
//! References
//! - Closed forms (normalized volume `m`):
//!   - Unit simplex `conv(0, e_1, .., e_n)`: m = 1 (vol = 1/n!).
//!   - Unit cube `[0,1]^n`: m = n!.
//!   - Cross polytope `{‖x‖₁ ≤ 1}`: m = 2^n.
//!   - Product `P × Q` (dims p, q): m = binom(p+q, p) m(P) m(Q).
//!   - Pyramid of height 1 over `P`: m = m(P).
//!   - Dilation `k P` (dim n): m = k^n m(P).

use num_bigint::BigInt;
use num_traits::{pow, One};

use crate::descent::DescentSystem;
use crate::error::Result;
use crate::num::LatticeInt;

/// A lattice polytope as a graded cone, plus its known multiplicity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatticePolytope {
    pub gens: Vec<Vec<i64>>,
    pub supp_hyps: Vec<Vec<i64>>,
    pub grading: Vec<i64>,
    pub expected: BigInt,
}

impl LatticePolytope {
    /// Dimension of the polytope (one less than the cone).
    #[inline]
    pub fn dim(&self) -> usize {
        self.grading.len() - 1
    }

    pub fn to_system<N: LatticeInt>(&self) -> Result<DescentSystem<N>> {
        let conv = |rows: &[Vec<i64>]| -> Vec<Vec<N>> {
            rows.iter()
                .map(|r| r.iter().map(|&x| N::from_i64(x)).collect())
                .collect()
        };
        DescentSystem::from_rows(
            &conv(&self.gens),
            &conv(&self.supp_hyps),
            self.grading.iter().map(|&x| N::from_i64(x)).collect(),
        )
    }
}

fn lift(v: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(v.len() + 1);
    out.push(1);
    out.extend_from_slice(v);
    out
}

/// Hyperplane `(b, -a)` for the inequality `a·x ≤ b`.
fn inequality(a: &[i64], b: i64) -> Vec<i64> {
    let mut out = Vec::with_capacity(a.len() + 1);
    out.push(b);
    out.extend(a.iter().map(|x| -x));
    out
}

fn grading(n: usize) -> Vec<i64> {
    let mut g = vec![0; n + 1];
    g[0] = 1;
    g
}

fn unit(n: usize, i: usize, s: i64) -> Vec<i64> {
    let mut v = vec![0; n];
    v[i] = s;
    v
}

fn factorial(n: usize) -> BigInt {
    (1..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k))
}

fn binomial(n: usize, k: usize) -> BigInt {
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// `conv(0, e_1, .., e_n)`.
pub fn unit_simplex(n: usize) -> LatticePolytope {
    let mut gens = vec![lift(&vec![0; n])];
    gens.extend((0..n).map(|i| lift(&unit(n, i, 1))));
    let mut supp_hyps: Vec<Vec<i64>> = (0..n).map(|i| inequality(&unit(n, i, -1), 0)).collect();
    supp_hyps.push(inequality(&vec![1; n], 1));
    LatticePolytope {
        gens,
        supp_hyps,
        grading: grading(n),
        expected: BigInt::one(),
    }
}

/// `[0,1]^n`.
pub fn cube(n: usize) -> LatticePolytope {
    let gens = (0..1usize << n)
        .map(|mask| {
            let v: Vec<i64> = (0..n).map(|i| ((mask >> i) & 1) as i64).collect();
            lift(&v)
        })
        .collect();
    let mut supp_hyps = Vec::with_capacity(2 * n);
    for i in 0..n {
        supp_hyps.push(inequality(&unit(n, i, -1), 0));
        supp_hyps.push(inequality(&unit(n, i, 1), 1));
    }
    LatticePolytope {
        gens,
        supp_hyps,
        grading: grading(n),
        expected: factorial(n),
    }
}

/// `{x : |x_1| + .. + |x_n| ≤ 1}`.
pub fn cross_polytope(n: usize) -> LatticePolytope {
    let mut gens = Vec::with_capacity(2 * n);
    for i in 0..n {
        gens.push(lift(&unit(n, i, 1)));
        gens.push(lift(&unit(n, i, -1)));
    }
    let supp_hyps = (0..1usize << n)
        .map(|mask| {
            let s: Vec<i64> = (0..n)
                .map(|i| if (mask >> i) & 1 == 1 { -1 } else { 1 })
                .collect();
            inequality(&s, 1)
        })
        .collect();
    LatticePolytope {
        gens,
        supp_hyps,
        grading: grading(n),
        expected: pow(BigInt::from(2), n),
    }
}

/// `P × Q`.
pub fn product(p: &LatticePolytope, q: &LatticePolytope) -> LatticePolytope {
    let (dp, dq) = (p.dim(), q.dim());
    let mut gens = Vec::with_capacity(p.gens.len() * q.gens.len());
    for a in &p.gens {
        for b in &q.gens {
            let mut g = a.clone();
            g.extend_from_slice(&b[1..]);
            gens.push(g);
        }
    }
    let mut supp_hyps = Vec::with_capacity(p.supp_hyps.len() + q.supp_hyps.len());
    for h in &p.supp_hyps {
        let mut r = h.clone();
        r.extend(std::iter::repeat(0).take(dq));
        supp_hyps.push(r);
    }
    for h in &q.supp_hyps {
        let mut r = vec![h[0]];
        r.extend(std::iter::repeat(0).take(dp));
        r.extend_from_slice(&h[1..]);
        supp_hyps.push(r);
    }
    LatticePolytope {
        gens,
        supp_hyps,
        grading: grading(dp + dq),
        expected: binomial(dp + dq, dp) * &p.expected * &q.expected,
    }
}

/// Pyramid of height 1 over `P`, apex `e_{n+1}`.
pub fn pyramid(p: &LatticePolytope) -> LatticePolytope {
    let n = p.dim();
    let mut gens: Vec<Vec<i64>> = p
        .gens
        .iter()
        .map(|g| {
            let mut r = g.clone();
            r.push(0);
            r
        })
        .collect();
    gens.push(lift(&unit(n + 1, n, 1)));
    // facet a·x ≤ b of P becomes a·x + b x_{n+1} ≤ b
    let mut supp_hyps: Vec<Vec<i64>> = p
        .supp_hyps
        .iter()
        .map(|h| {
            let mut r = h.clone();
            r.push(-h[0]);
            r
        })
        .collect();
    supp_hyps.push(inequality(&unit(n + 1, n, -1), 0));
    LatticePolytope {
        gens,
        supp_hyps,
        grading: grading(n + 1),
        expected: p.expected.clone(),
    }
}

/// `k P` for `k ≥ 1`.
pub fn dilation(p: &LatticePolytope, k: i64) -> LatticePolytope {
    let gens = p
        .gens
        .iter()
        .map(|g| {
            let mut r = g.clone();
            for x in &mut r[1..] {
                *x *= k;
            }
            r
        })
        .collect();
    let supp_hyps = p
        .supp_hyps
        .iter()
        .map(|h| {
            let mut r = h.clone();
            r[0] *= k;
            r
        })
        .collect();
    LatticePolytope {
        gens,
        supp_hyps,
        grading: p.grading.clone(),
        expected: pow(BigInt::from(k), p.dim()) * &p.expected,
    }
}

/// Built-in family by name (`simplex`, `cube`, `cross`), as used by the CLI.
pub fn family(name: &str, n: usize) -> Option<LatticePolytope> {
    match name {
        "simplex" => Some(unit_simplex(n)),
        "cube" => Some(cube(n)),
        "cross" => Some(cross_polytope(n)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_feasible(p: &LatticePolytope) {
        for g in &p.gens {
            for h in &p.supp_hyps {
                let v: i64 = g.iter().zip(h).map(|(a, b)| a * b).sum();
                assert!(v >= 0, "generator {g:?} violates {h:?}");
            }
        }
    }

    #[test]
    fn families_are_consistent() {
        for n in 1..=4 {
            check_feasible(&unit_simplex(n));
            check_feasible(&cube(n));
            check_feasible(&cross_polytope(n));
        }
        check_feasible(&product(&unit_simplex(2), &cube(1)));
        check_feasible(&pyramid(&cube(2)));
        check_feasible(&dilation(&unit_simplex(3), 3));
    }

    #[test]
    fn expected_values() {
        assert_eq!(cube(4).expected, BigInt::from(24));
        assert_eq!(cross_polytope(3).expected, BigInt::from(8));
        // triangular prism: binom(3,2) * 1 * 1
        assert_eq!(product(&unit_simplex(2), &unit_simplex(1)).expected, BigInt::from(3));
        assert_eq!(dilation(&cube(2), 3).expected, BigInt::from(18));
        assert_eq!(pyramid(&cube(2)).expected, BigInt::from(2));
    }

    #[test]
    fn unknown_family() {
        assert!(family("dodecahedron", 3).is_none());
        assert_eq!(family("cube", 2), Some(cube(2)));
    }
}
