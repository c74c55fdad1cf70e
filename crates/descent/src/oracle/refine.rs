//! Individualization-refinement on the weighted generator / form graph.
//!
//! Algorithm
//! - Colors start as: ordinary generators, ordinary forms, then one color per
//!   special element. Refinement replaces a color by the rank of
//!   `(color, sorted multiset of (weight, neighbour color))` until stable.
//! - A non-discrete coloring is split by individualizing each vertex of the
//!   first non-singleton cell. Leaves are discrete colorings; the canonical
//!   leaf minimizes `(trace, certificate)` where the trace records cell sizes
//!   along the path and the certificate is the weight matrix in leaf order.
//! - A leaf equal to the first leaf yields an automorphism. Automorphisms
//!   prune children in the same orbit at first-path nodes and abort the rest
//!   of the subtree they were found in. The group order is the product of the
//!   first-path orbit sizes.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use super::{AutomQuality, CanonicalFormOracle, OracleInput, OracleOutput};
use crate::error::Result;

/// Pure Rust canonical-form oracle.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefinementOracle;

impl CanonicalFormOracle for RefinementOracle {
    fn compute(&self, input: &OracleInput<'_>) -> Result<OracleOutput> {
        input.validate()?;
        let graph = Graph::build(input);
        let mut search = Search::new(&graph);
        let mut colors = graph.initial.clone();
        let t = graph.refine(&mut colors);
        search.visit(colors, vec![t], true);
        Ok(search.finish())
    }
}

struct Graph {
    nr_gens: usize,
    nr_forms: usize,
    /// `weights[g * nr_forms + f]`: rank of the value among distinct values.
    weights: Vec<u32>,
    values: Vec<BigInt>,
    initial: Vec<u32>,
}

impl Graph {
    fn build(input: &OracleInput<'_>) -> Self {
        let nr_gens = input.gens.len();
        let nr_forms = input.lin_forms.len();
        let ord_gens = input.nr_ordinary_gens();
        let ord_forms = input.nr_ordinary_lin_forms();
        let mut raw = Vec::with_capacity(nr_gens * nr_forms);
        for (i, g) in input.gens.iter().enumerate() {
            for (j, l) in input.lin_forms.iter().enumerate() {
                let v: BigInt = g.iter().zip(l).map(|(a, b)| a * b).sum();
                let reduce = input.quality == AutomQuality::Combinatorial
                    && i < ord_gens
                    && j < ord_forms;
                raw.push(if reduce && !v.is_zero() {
                    BigInt::one()
                } else {
                    v
                });
            }
        }
        let mut values = raw.clone();
        values.sort();
        values.dedup();
        let weights = raw
            .iter()
            .map(|v| values.binary_search(v).unwrap_or_else(|i| i) as u32)
            .collect();
        let mut initial = Vec::with_capacity(nr_gens + nr_forms);
        initial.extend(std::iter::repeat(0).take(ord_gens));
        let mut next = 2u32;
        let mut specials_g = Vec::new();
        for _ in ord_gens..nr_gens {
            specials_g.push(next);
            next += 1;
        }
        initial.extend(specials_g);
        initial.extend(std::iter::repeat(1).take(ord_forms));
        for _ in ord_forms..nr_forms {
            initial.push(next);
            next += 1;
        }
        Self {
            nr_gens,
            nr_forms,
            weights,
            values,
            initial,
        }
    }

    #[inline]
    fn nv(&self) -> usize {
        self.nr_gens + self.nr_forms
    }

    #[inline]
    fn weight(&self, u: usize, v: usize) -> u32 {
        if u < self.nr_gens {
            self.weights[u * self.nr_forms + (v - self.nr_gens)]
        } else {
            self.weights[v * self.nr_forms + (u - self.nr_gens)]
        }
    }

    /// Refine to the coarsest stable coloring; returns the node invariant.
    fn refine(&self, colors: &mut [u32]) -> u64 {
        let nv = self.nv();
        let mut nr_colors = count_colors(colors);
        loop {
            let sigs: Vec<(u32, Vec<(u32, u32)>)> = (0..nv)
                .map(|v| {
                    let others = if v < self.nr_gens {
                        self.nr_gens..nv
                    } else {
                        0..self.nr_gens
                    };
                    let mut nb: Vec<(u32, u32)> =
                        others.map(|u| (self.weight(v, u), colors[u])).collect();
                    nb.sort_unstable();
                    (colors[v], nb)
                })
                .collect();
            let mut ranked: Vec<&(u32, Vec<(u32, u32)>)> = sigs.iter().collect();
            ranked.sort();
            ranked.dedup();
            for (v, s) in sigs.iter().enumerate() {
                colors[v] = ranked.binary_search(&s).unwrap_or_else(|i| i) as u32;
            }
            if ranked.len() == nr_colors {
                break;
            }
            nr_colors = ranked.len();
        }
        let mut sizes = vec![0u32; nr_colors];
        for &c in colors.iter() {
            sizes[c as usize] += 1;
        }
        let mut h = DefaultHasher::new();
        sizes.hash(&mut h);
        h.finish()
    }

    /// Certificate of a discrete coloring: weights in leaf order.
    fn certificate(&self, order: &[usize]) -> Vec<u32> {
        let gens: Vec<usize> = order.iter().copied().filter(|&v| v < self.nr_gens).collect();
        let forms: Vec<usize> = order.iter().copied().filter(|&v| v >= self.nr_gens).collect();
        let mut cert = Vec::with_capacity(gens.len() * forms.len());
        for &g in &gens {
            for &f in &forms {
                cert.push(self.weight(g, f));
            }
        }
        cert
    }
}

fn count_colors(colors: &[u32]) -> usize {
    let mut c = colors.to_vec();
    c.sort_unstable();
    c.dedup();
    c.len()
}

/// Vertices of the first non-singleton cell, or `None` if discrete.
fn target_cell(colors: &[u32]) -> Option<Vec<usize>> {
    let mut sizes = vec![0usize; colors.len()];
    for &c in colors {
        sizes[c as usize] += 1;
    }
    let target = sizes.iter().position(|&s| s > 1)? as u32;
    Some(
        colors
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == target)
            .map(|(v, _)| v)
            .collect(),
    )
}

fn individualize(colors: &[u32], v: usize) -> Vec<u32> {
    let c = colors[v];
    colors
        .iter()
        .enumerate()
        .map(|(u, &cu)| if cu > c || (cu == c && u != v) { cu + 1 } else { cu })
        .collect()
}

#[derive(Clone)]
struct Leaf {
    /// `order[p]` is the vertex with color `p`.
    order: Vec<usize>,
    trace: Vec<u64>,
    cert: Vec<u32>,
}

impl Leaf {
    fn cmp_key(&self, other: &Leaf) -> Ordering {
        self.trace
            .cmp(&other.trace)
            .then_with(|| self.cert.cmp(&other.cert))
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

struct Search<'g> {
    g: &'g Graph,
    first: Option<Leaf>,
    best: Option<Leaf>,
    automs: Vec<Vec<usize>>,
    orbits: UnionFind,
    order: BigUint,
}

impl<'g> Search<'g> {
    fn new(g: &'g Graph) -> Self {
        Self {
            g,
            first: None,
            best: None,
            automs: Vec::new(),
            orbits: UnionFind::new(g.nv()),
            order: BigUint::one(),
        }
    }

    /// Returns true if an automorphism was found in this subtree, which lets
    /// callers off the first path abandon the rest of their subtree.
    fn visit(&mut self, colors: Vec<u32>, trace: Vec<u64>, first_path: bool) -> bool {
        if !first_path && self.prunable(&trace) {
            return false;
        }
        let Some(cell) = target_cell(&colors) else {
            return self.leaf(&colors, trace);
        };
        let mut explored: Vec<usize> = Vec::with_capacity(cell.len());
        for (i, &v) in cell.iter().enumerate() {
            if first_path && i > 0 {
                let rv = self.orbits.find(v);
                if explored.iter().any(|&u| self.orbits.find(u) == rv) {
                    continue;
                }
            }
            let mut child = individualize(&colors, v);
            let t = self.g.refine(&mut child);
            let mut child_trace = trace.clone();
            child_trace.push(t);
            let found = self.visit(child, child_trace, first_path && i == 0);
            explored.push(v);
            if found && !first_path {
                return true;
            }
        }
        if first_path {
            let root = self.orbits.find(cell[0]);
            let size = (0..self.g.nv())
                .filter(|&u| self.orbits.find(u) == root)
                .count();
            self.order *= BigUint::from(size);
        }
        false
    }

    fn prunable(&self, trace: &[u64]) -> bool {
        let (Some(first), Some(best)) = (&self.first, &self.best) else {
            return false;
        };
        let l = trace.len();
        if first.trace.len() >= l && first.trace[..l] == *trace {
            return false;
        }
        trace > &best.trace[..best.trace.len().min(l)]
    }

    fn leaf(&mut self, colors: &[u32], trace: Vec<u64>) -> bool {
        let mut order = vec![0usize; colors.len()];
        for (v, &c) in colors.iter().enumerate() {
            order[c as usize] = v;
        }
        let cert = self.g.certificate(&order);
        let leaf = Leaf { order, trace, cert };
        let perm = match &self.first {
            None => None,
            Some(first) if leaf.cmp_key(first) == Ordering::Equal => {
                let mut perm = vec![0usize; leaf.order.len()];
                for (p, &v) in first.order.iter().enumerate() {
                    perm[v] = leaf.order[p];
                }
                Some(perm)
            }
            Some(_) => {
                let better = self
                    .best
                    .as_ref()
                    .map_or(true, |best| leaf.cmp_key(best) == Ordering::Less);
                if better {
                    self.best = Some(leaf);
                }
                return false;
            }
        };
        let Some(perm) = perm else {
            self.best = Some(leaf.clone());
            self.first = Some(leaf);
            return false;
        };
        for (u, &w) in perm.iter().enumerate() {
            self.orbits.union(u, w);
        }
        if perm.iter().enumerate().any(|(u, &w)| u != w) {
            self.automs.push(perm);
        }
        true
    }

    fn finish(mut self) -> OracleOutput {
        let m = self.g.nr_gens;
        let nv = self.g.nv();
        let gen_perms = self.automs.iter().map(|p| p[..m].to_vec()).collect();
        let lin_form_perms = self
            .automs
            .iter()
            .map(|p| p[m..].iter().map(|&w| w - m).collect())
            .collect();
        let mut classes: Vec<Vec<usize>> = vec![Vec::new(); nv];
        for v in 0..nv {
            let r = self.orbits.find(v);
            classes[r].push(v);
        }
        let mut gen_orbits = Vec::new();
        let mut lin_form_orbits = Vec::new();
        for class in classes.into_iter().filter(|c| !c.is_empty()) {
            if class[0] < m {
                gen_orbits.push(class);
            } else {
                lin_form_orbits.push(class.into_iter().map(|w| w - m).collect());
            }
        }
        let (canonical_gens, canonical_lin_forms, canonical_form) = match &self.best {
            Some(best) => {
                let gens: Vec<usize> = best.order.iter().copied().filter(|&v| v < m).collect();
                let forms: Vec<usize> = best
                    .order
                    .iter()
                    .copied()
                    .filter(|&v| v >= m)
                    .map(|w| w - m)
                    .collect();
                let values = gens
                    .iter()
                    .map(|&g| {
                        forms
                            .iter()
                            .map(|&f| self.g.values[self.g.weight(g, f + m) as usize].clone())
                            .collect()
                    })
                    .collect();
                (gens, forms, Some(values))
            }
            None => (Vec::new(), Vec::new(), None),
        };
        OracleOutput {
            order: self.order,
            gen_perms,
            lin_form_perms,
            gen_orbits,
            lin_form_orbits,
            canonical_gens,
            canonical_lin_forms,
            canonical_form,
        }
    }
}
