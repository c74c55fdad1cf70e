//! `DescentSystem`: validated input, level-by-level orchestration, results.
//!
//! Purpose
//! - Own the cone data (generators, support hyperplanes, grading), the
//!   incidence of generators on hyperplanes and the run configuration.
//! - Drive the descent from the top face (or from orbit seeds) down to the
//!   last non-simplicial level and accumulate the multiplicity exactly.
//!
//! Why this design (short)
//! - Frontiers are `BTreeMap`s keyed by signature: identical faces reached
//!   from different parents merge on insertion and iteration order is fixed.
//! - Each level is expanded in blocks; inside a block faces are independent
//!   and processed with rayon, children merge through `try_fold`/`try_reduce`.
//! - All exact rational sums are commutative, so the result does not depend
//!   on the number of worker threads.
//!
//! References
//! - Bruns, Ichim, Söger: "Computing the multiplicity of a rational cone by
//!   descent in the face lattice".

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::cfg::DescentCfg;
use super::face::{face_frame, DescentFace};
use super::iso;
use super::progress::{ProgressEvent, ProgressSink, TracingProgress};
use super::signature::Signature;
use super::types::{DescentStats, FaceMode, LevelSnapshot};
use crate::error::{DescentError, Result};
use crate::lattice::{
    from_rows, greedy_basis, lattice_index, make_primitive, rank, row, row_echelon,
    row_scalar_product, scalar_product, solve_coordinates, submatrix, to_rational_rows, Frame,
    Matrix, QVec,
};
use crate::num::{self, to_rational, LatticeInt};
use crate::oracle::{AutomQuality, CanonicalFormOracle, OracleGuard, OracleInput};

type Frontier = BTreeMap<Signature, DescentFace>;

/// Shared counters of one run; updated from worker threads.
pub(crate) struct Accumulators {
    pub descent_steps: AtomicU64,
    pub nr_simplicial: AtomicU64,
    pub tree_size: AtomicU64,
    pub system_size: AtomicU64,
    multiplicity: Mutex<BigRational>,
}

impl Accumulators {
    pub(crate) fn new() -> Self {
        Self {
            descent_steps: AtomicU64::new(0),
            nr_simplicial: AtomicU64::new(0),
            tree_size: AtomicU64::new(0),
            system_size: AtomicU64::new(0),
            multiplicity: Mutex::new(BigRational::zero()),
        }
    }

    pub(crate) fn add_multiplicity(&self, q: &BigRational) {
        let mut m = self.multiplicity.lock().unwrap_or_else(PoisonError::into_inner);
        *m += q;
    }

    fn multiplicity(&self) -> BigRational {
        self.multiplicity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn stats(&self) -> DescentStats {
        DescentStats {
            descent_steps: self.descent_steps.load(Ordering::Relaxed),
            nr_simplicial: self.nr_simplicial.load(Ordering::Relaxed),
            tree_size: self.tree_size.load(Ordering::Relaxed),
            system_size: self.system_size.load(Ordering::Relaxed),
        }
    }
}

/// A pointed cone with grading, prepared for multiplicity computation.
pub struct DescentSystem<N: LatticeInt> {
    gens: Matrix<N>,
    supp_hyps: Matrix<N>,
    grading: Vec<N>,
    degrees: Vec<N>,
    dim: usize,
    /// `supp_hyp_ind[h]` = generators on hyperplane `h`.
    supp_hyp_ind: Vec<Signature>,
    auto_mode: FaceMode,
    simple: bool,
    cfg: DescentCfg,
    oracle: Option<Arc<dyn CanonicalFormOracle>>,
    guard: Arc<OracleGuard>,
    interrupt: Arc<AtomicBool>,
    progress: Arc<dyn ProgressSink>,
    multiplicity: BigRational,
    stats: DescentStats,
    levels: Vec<LevelSnapshot>,
    computed: bool,
}

impl<N: LatticeInt> std::fmt::Debug for DescentSystem<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescentSystem")
            .field("nr_gens", &self.nr_gens())
            .field("nr_supp_hyps", &self.nr_supp_hyps())
            .field("dim", &self.dim)
            .field("mode", &self.mode())
            .field("simple", &self.simple)
            .field("computed", &self.computed)
            .finish()
    }
}

impl<N: LatticeInt> DescentSystem<N> {
    /// Validate the input and precompute degrees and incidences.
    ///
    /// Support hyperplanes are made primitive. Fails with `ComputationFailed`
    /// on shape mismatch, a generator of non-positive degree, or a generator
    /// on the negative side of a hyperplane.
    pub fn new(gens: Matrix<N>, mut supp_hyps: Matrix<N>, grading: Vec<N>) -> Result<Self> {
        let n = grading.len();
        if gens.ncols() != n || supp_hyps.ncols() != n {
            return Err(DescentError::failed(format!(
                "dimension mismatch: generators {}, support hyperplanes {}, grading {n}",
                gens.ncols(),
                supp_hyps.ncols()
            )));
        }
        for h in 0..supp_hyps.nrows() {
            let mut r = row(&supp_hyps, h);
            let g = make_primitive(&mut r)?;
            if !g.is_zero() && !g.is_one() {
                for (j, x) in r.into_iter().enumerate() {
                    supp_hyps[(h, j)] = x;
                }
            }
        }

        let degrees = (0..gens.nrows())
            .map(|i| row_scalar_product(&gens, i, &grading))
            .collect::<Result<Vec<N>>>()?;
        if let Some(bad) = degrees.iter().position(|d| !d.is_positive()) {
            return Err(DescentError::failed(format!(
                "generator {bad} has non-positive degree {}",
                degrees[bad]
            )));
        }

        let nr_gens = gens.nrows();
        let mut supp_hyp_ind = Vec::with_capacity(supp_hyps.nrows());
        for h in 0..supp_hyps.nrows() {
            let hyp = row(&supp_hyps, h);
            let mut ind = Signature::new(nr_gens);
            for i in 0..nr_gens {
                let v = row_scalar_product(&gens, i, &hyp)?;
                if v.is_negative() {
                    return Err(DescentError::failed(format!(
                        "generator {i} violates support hyperplane {h}"
                    )));
                }
                if v.is_zero() {
                    ind.set(i);
                }
            }
            supp_hyp_ind.push(ind);
        }

        let dim = rank(&gens)?;
        let simple = is_simple(&supp_hyp_ind, nr_gens, dim);
        let auto_mode = FaceMode::choose(nr_gens, supp_hyps.nrows());
        debug!(nr_gens, nr_supp_hyps = supp_hyps.nrows(), dim, simple, ?auto_mode, "descent system");

        Ok(Self {
            gens,
            supp_hyps,
            grading,
            degrees,
            dim,
            supp_hyp_ind,
            auto_mode,
            simple,
            cfg: DescentCfg::default(),
            oracle: None,
            guard: Arc::new(OracleGuard::new()),
            interrupt: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(TracingProgress),
            multiplicity: BigRational::zero(),
            stats: DescentStats::default(),
            levels: Vec::new(),
            computed: false,
        })
    }

    /// Convenience constructor from row vectors.
    pub fn from_rows(gens: &[Vec<N>], supp_hyps: &[Vec<N>], grading: Vec<N>) -> Result<Self> {
        let n = grading.len();
        Self::new(from_rows(gens, n)?, from_rows(supp_hyps, n)?, grading)
    }

    // ---- configuration ----

    pub fn set_exploit_automs(&mut self, on: bool) {
        self.cfg.exploit_automorphisms = on;
    }

    pub fn set_strict_iso_type_check(&mut self, on: bool) {
        self.cfg.strict_type_check = on;
    }

    pub fn set_verbose(&mut self, on: bool) {
        self.cfg.verbose = on;
    }

    pub fn set_face_mode(&mut self, mode: Option<FaceMode>) {
        self.cfg.face_mode = mode;
    }

    pub fn set_cfg(&mut self, cfg: DescentCfg) {
        self.cfg = cfg;
    }

    /// Install a canonical-form oracle; calls into it are serialized by a
    /// guard shared with every subsystem derived from `self`.
    pub fn set_oracle(&mut self, oracle: Arc<dyn CanonicalFormOracle>) {
        self.oracle = Some(oracle);
    }

    pub fn clear_oracle(&mut self) {
        self.oracle = None;
    }

    /// Share an external guard, e.g. across several systems using one oracle.
    pub fn set_oracle_guard(&mut self, guard: Arc<OracleGuard>) {
        self.guard = guard;
    }

    /// Cooperative cancellation flag, polled at level, block and face
    /// boundaries.
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = flag;
    }

    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn set_progress(&mut self, sink: Arc<dyn ProgressSink>) {
        self.progress = sink;
    }

    // ---- accessors ----

    pub fn cfg(&self) -> &DescentCfg {
        &self.cfg
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn ambient_dim(&self) -> usize {
        self.grading.len()
    }

    #[inline]
    pub fn nr_gens(&self) -> usize {
        self.gens.nrows()
    }

    #[inline]
    pub fn nr_supp_hyps(&self) -> usize {
        self.supp_hyps.nrows()
    }

    #[inline]
    pub fn gens(&self) -> &Matrix<N> {
        &self.gens
    }

    #[inline]
    pub fn supp_hyps(&self) -> &Matrix<N> {
        &self.supp_hyps
    }

    #[inline]
    pub fn grading(&self) -> &[N] {
        &self.grading
    }

    #[inline]
    pub fn degrees(&self) -> &[N] {
        &self.degrees
    }

    /// Generators lying on hyperplane `h`.
    #[inline]
    pub fn supp_hyp_ind(&self, h: usize) -> &Signature {
        &self.supp_hyp_ind[h]
    }

    /// Face mode in effect: the configured override or the automatic choice.
    #[inline]
    pub fn mode(&self) -> FaceMode {
        self.cfg.face_mode.unwrap_or(self.auto_mode)
    }

    /// Every vertex of the cross-section polytope lies on exactly `dim - 1`
    /// facets.
    #[inline]
    pub fn is_simple(&self) -> bool {
        self.simple
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// The multiplicity; zero until `compute` succeeded.
    pub fn multiplicity(&self) -> &BigRational {
        &self.multiplicity
    }

    pub fn stats(&self) -> DescentStats {
        self.stats
    }

    /// Frontier snapshots, if `record_levels` was set.
    pub fn levels(&self) -> &[LevelSnapshot] {
        &self.levels
    }

    // ---- face bookkeeping ----

    /// Signature of the whole cone.
    pub fn top_signature(&self) -> Signature {
        match self.mode() {
            FaceMode::Generator => Signature::full(self.nr_gens()),
            FaceMode::Facet => {
                let all = Signature::full(self.nr_gens());
                Signature::from_indices(
                    self.nr_supp_hyps(),
                    (0..self.nr_supp_hyps()).filter(|&h| all.is_subset_of(&self.supp_hyp_ind[h])),
                )
            }
        }
    }

    /// Generators of the face with signature `sig`.
    pub fn face_gens(&self, sig: &Signature) -> Signature {
        match self.mode() {
            FaceMode::Generator => sig.clone(),
            FaceMode::Facet => {
                let mut g = Signature::full(self.nr_gens());
                for h in sig.ones() {
                    g.and_assign(&self.supp_hyp_ind[h]);
                }
                g
            }
        }
    }

    /// Hyperplanes that may cut out a facet of the face.
    pub(crate) fn candidate_hyps(&self, sig: &Signature, face_gens: &Signature) -> Vec<usize> {
        match self.mode() {
            FaceMode::Facet => (0..self.nr_supp_hyps()).filter(|&h| !sig.get(h)).collect(),
            FaceMode::Generator => (0..self.nr_supp_hyps())
                .filter(|&h| !face_gens.is_subset_of(&self.supp_hyp_ind[h]))
                .collect(),
        }
    }

    /// Standalone system for the face with signature `sig` (default
    /// configuration, shared interrupt flag).
    pub fn face_system(&self, sig: &Signature) -> Result<DescentSystem<N>> {
        let idx: Vec<usize> = self.face_gens(sig).ones().collect();
        let mut sub = DescentSystem::new(
            submatrix(&self.gens, &idx),
            self.supp_hyps.clone(),
            self.grading.clone(),
        )?;
        sub.interrupt = Arc::clone(&self.interrupt);
        Ok(sub)
    }

    pub(crate) fn gen_big(&self, g: usize) -> Vec<BigInt> {
        row(&self.gens, g).iter().map(LatticeInt::to_big).collect()
    }

    pub(crate) fn supp_hyp_big(&self, h: usize) -> Vec<BigInt> {
        row(&self.supp_hyps, h).iter().map(LatticeInt::to_big).collect()
    }

    pub(crate) fn grading_big(&self) -> Vec<BigInt> {
        self.grading.iter().map(LatticeInt::to_big).collect()
    }

    pub(crate) fn oracle_guard(&self) -> &OracleGuard {
        &self.guard
    }

    #[inline]
    pub(crate) fn check_interrupt(&self) -> Result<()> {
        if self.interrupt.load(Ordering::Relaxed) {
            Err(DescentError::Interrupted)
        } else {
            Ok(())
        }
    }

    // ---- computation ----

    /// Compute the multiplicity. On error no result is stored.
    pub fn compute(&mut self) -> Result<()> {
        self.multiplicity = BigRational::zero();
        self.stats = DescentStats::default();
        self.levels.clear();
        self.computed = false;
        self.check_interrupt()?;

        if self.cfg.exploit_automorphisms && self.oracle.is_none() {
            return Err(DescentError::not_computable(
                "exploiting automorphisms requires a canonical-form oracle",
            ));
        }
        match self.dim {
            0 => return Err(DescentError::failed("cone of rank 0 has no multiplicity")),
            1 => {
                self.multiplicity = self.rank_one_multiplicity()?;
                self.finish();
                return Ok(());
            }
            _ => {}
        }

        if self.cfg.exploit_automorphisms && self.mode() == FaceMode::Generator {
            let index = lattice_index(&self.gens)?;
            if self.dim < self.ambient_dim() || !index.is_one() {
                debug!(dim = self.dim, ambient = self.ambient_dim(), %index, "passing to generator lattice");
                let mut sub = self.generator_lattice_system()?;
                sub.compute()?;
                self.multiplicity = sub.multiplicity * to_rational(&index);
                self.stats = sub.stats;
                self.levels = sub.levels;
                self.finish();
                return Ok(());
            }
        }

        let acc = Accumulators::new();
        let (frontier, d) = self.initial_frontier()?;
        self.descend(frontier, d, &acc)?;
        self.multiplicity = acc.multiplicity();
        self.stats = acc.stats();
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        self.computed = true;
        self.progress.report(&ProgressEvent::Finished {
            descent_steps: self.stats.descent_steps,
            nr_simplicial: self.stats.nr_simplicial,
        });
        if self.cfg.verbose {
            info!(
                multiplicity = %self.multiplicity,
                descent_steps = self.stats.descent_steps,
                nr_simplicial = self.stats.nr_simplicial,
                tree_size = self.stats.tree_size,
                system_size = self.stats.system_size,
                "multiplicity computed"
            );
        } else {
            debug!(multiplicity = %self.multiplicity, "multiplicity computed");
        }
    }

    /// All generators are positive multiples of one primitive vector `u`;
    /// the multiplicity is `1 / deg(u)`.
    fn rank_one_multiplicity(&self) -> Result<BigRational> {
        let frame = Frame::new(&self.gens)?;
        let c = frame.coordinates(&row(&self.gens, 0))?;
        let c0 = num::abs(&c[0])?;
        Ok(to_rational(&c0) / to_rational(&self.degrees[0]))
    }

    fn initial_frontier(&self) -> Result<(Frontier, usize)> {
        if self.cfg.exploit_automorphisms && self.mode() == FaceMode::Generator {
            if let Some(seeds) = self.orbit_seeds()? {
                return Ok((seeds, self.dim - 1));
            }
        }
        let mut f = Frontier::new();
        f.insert(self.top_signature(), DescentFace::top());
        Ok((f, self.dim))
    }

    fn descend(&mut self, mut frontier: Frontier, mut d: usize, acc: &Accumulators) -> Result<()> {
        let mut old_counts = vec![0u64; self.nr_gens()];
        while !frontier.is_empty() {
            self.check_interrupt()?;
            let nr_faces = frontier.len();
            acc.system_size.fetch_add(nr_faces as u64, Ordering::Relaxed);
            if self.cfg.record_levels {
                self.levels.push(LevelSnapshot {
                    dim: d,
                    faces: frontier
                        .iter()
                        .map(|(s, f)| (s.clone(), f.coeff.clone()))
                        .collect(),
                    multiplicity_before: acc.multiplicity(),
                });
            }
            self.progress
                .report(&ProgressEvent::LevelStarted { dim: d, nr_faces });
            self.check_interrupt()?;

            if self.cfg.exploit_automorphisms && nr_faces >= 2 {
                if let Some(oracle) = self.oracle.clone() {
                    let r = iso::classify(self, oracle.as_ref(), d, &mut frontier)?;
                    self.progress.report(&ProgressEvent::IsoReduced {
                        dim: d,
                        live_before: r.live_before,
                        merged: r.merged,
                        oracle_calls: r.oracle_calls,
                    });
                }
            }

            let mut next = Frontier::new();
            let mut block = 0;
            while !frontier.is_empty() {
                self.check_interrupt()?;
                let rest = split_block(&mut frontier, self.cfg.max_block_size.max(1));
                let current = std::mem::replace(&mut frontier, rest);
                let children = self.expand_block(d, &current, &old_counts, acc)?;
                let nr_children = children.len();
                for (sig, face) in children {
                    merge_face(&mut next, sig, face);
                }
                self.progress.report(&ProgressEvent::BlockDone {
                    dim: d,
                    block,
                    nr_faces: current.len(),
                    nr_children,
                });
                block += 1;
            }

            old_counts = self.containment_counts(&next);
            frontier = next;
            if !frontier.is_empty() && d <= 2 {
                return Err(DescentError::failed(format!(
                    "non-simplicial faces below dimension {d}"
                )));
            }
            d -= 1;
        }
        Ok(())
    }

    fn expand_block(
        &self,
        d: usize,
        block: &Frontier,
        old_counts: &[u64],
        acc: &Accumulators,
    ) -> Result<Frontier> {
        block
            .par_iter()
            .filter(|(_, face)| !face.dead)
            .map(|(sig, face)| -> Result<Vec<(Signature, DescentFace)>> {
                self.check_interrupt()?;
                face.expand(self, d, sig, old_counts, acc)
                    .map(|e| e.children)
            })
            .try_fold(Frontier::new, |mut out, children| -> Result<Frontier> {
                for (sig, face) in children? {
                    merge_face(&mut out, sig, face);
                }
                Ok(out)
            })
            .try_reduce(Frontier::new, |mut a, b| -> Result<Frontier> {
                for (sig, face) in b {
                    merge_face(&mut a, sig, face);
                }
                Ok(a)
            })
    }

    /// Number of faces of `level` containing each generator.
    fn containment_counts(&self, level: &Frontier) -> Vec<u64> {
        let n = self.nr_gens();
        level
            .par_iter()
            .map(|(sig, _)| self.face_gens(sig))
            .fold(
                || vec![0u64; n],
                |mut c, gens| {
                    for g in gens.ones() {
                        c[g] += 1;
                    }
                    c
                },
            )
            .reduce(
                || vec![0u64; n],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b) {
                        *x += y;
                    }
                    a
                },
            )
    }

    /// Seed the descent with one facet per orbit of the automorphism group.
    ///
    /// With `c` the sum of the smallest generator orbit (a fixed point of the
    /// group), `mult(C) = sum_G ht(c, G) / deg(c) * mult(G)` over all facets,
    /// and facets in one orbit contribute equally. Returns `None` if the
    /// oracle's generator permutations are not all linear.
    fn orbit_seeds(&self) -> Result<Option<Frontier>> {
        let Some(oracle) = &self.oracle else {
            return Err(DescentError::not_computable(
                "orbit seeding requires a canonical-form oracle",
            ));
        };
        let gens: Vec<Vec<BigInt>> = (0..self.nr_gens()).map(|g| self.gen_big(g)).collect();
        let mut forms: Vec<Vec<BigInt>> =
            (0..self.nr_supp_hyps()).map(|h| self.supp_hyp_big(h)).collect();
        forms.push(self.grading_big());
        let input = OracleInput {
            gens: &gens,
            nr_special_gens: 0,
            lin_forms: &forms,
            nr_special_lin_forms: 1,
            quality: AutomQuality::Integral,
        };
        let out = self.guard.call(|| oracle.compute(&input))?;
        if !permutations_are_linear(&to_rational_rows(&self.gens), &out.gen_perms) {
            debug!("automorphisms are not linear; descending from the top face");
            return Ok(None);
        }
        let Some(orbit) = out.gen_orbits.iter().min_by_key(|o| o.len()) else {
            return Ok(None);
        };

        let mut c = vec![N::zero(); self.ambient_dim()];
        for &g in orbit {
            for (j, x) in c.iter_mut().enumerate() {
                *x = num::add(x, &self.gens[(g, j)])?;
            }
        }
        let deg_c = to_rational(&scalar_product(&c, &self.grading)?);
        let frame = face_frame(self, &self.top_signature(), &self.top_key(), self.dim)?;

        let mut seeds = Frontier::new();
        for o in &out.lin_form_orbits {
            let rep = o[0];
            if rep >= self.nr_supp_hyps() {
                continue;
            }
            let ht = frame.height(&c, &row(&self.supp_hyps, rep))?;
            if ht.is_zero() {
                continue;
            }
            let facet = self.supp_hyp_ind[rep].clone();
            let idx: Vec<usize> = facet.ones().collect();
            if rank(&submatrix(&self.gens, &idx))? + 1 != self.dim {
                return Err(DescentError::failed(format!(
                    "support hyperplane {rep} does not cut out a facet"
                )));
            }
            let coeff = to_rational(&ht) * BigRational::from_integer(BigInt::from(o.len())) / &deg_c;
            merge_face(&mut seeds, facet, DescentFace::new(coeff));
        }
        debug!(order = %out.order, nr_seeds = seeds.len(), "orbit seeding");
        Ok(Some(seeds))
    }

    fn top_key(&self) -> Vec<usize> {
        (0..self.nr_gens()).collect()
    }

    /// The same cone written in a basis of the generator lattice; its
    /// multiplicity times the lattice index is the multiplicity of `self`.
    fn generator_lattice_system(&self) -> Result<DescentSystem<N>> {
        let e = row_echelon(&self.gens)?;
        let gens = (0..self.nr_gens())
            .map(|g| e.coordinates(&row(&self.gens, g)))
            .collect::<Result<Vec<_>>>()?;
        let grading = (0..e.rank())
            .map(|k| row_scalar_product(&e.rows, k, &self.grading))
            .collect::<Result<Vec<_>>>()?;
        let mut hyps = Vec::with_capacity(self.nr_supp_hyps());
        for h in 0..self.nr_supp_hyps() {
            let hyp = row(&self.supp_hyps, h);
            hyps.push(
                (0..e.rank())
                    .map(|k| row_scalar_product(&e.rows, k, &hyp))
                    .collect::<Result<Vec<_>>>()?,
            );
        }
        let r = e.rank();
        let mut sub = DescentSystem::new(from_rows(&gens, r)?, from_rows(&hyps, r)?, grading)?;
        sub.cfg = self.cfg.clone();
        sub.oracle = self.oracle.clone();
        sub.guard = Arc::clone(&self.guard);
        sub.interrupt = Arc::clone(&self.interrupt);
        sub.progress = Arc::clone(&self.progress);
        Ok(sub)
    }
}

/// Insert `face` under `sig`, adding to an existing entry.
fn merge_face(map: &mut Frontier, sig: Signature, face: DescentFace) {
    match map.get_mut(&sig) {
        Some(existing) => existing.absorb(&face),
        None => {
            map.insert(sig, face);
        }
    }
}

/// Keep the first `max` entries in `map`, return the rest.
fn split_block(map: &mut Frontier, max: usize) -> Frontier {
    match map.keys().nth(max).cloned() {
        Some(k) => map.split_off(&k),
        None => Frontier::new(),
    }
}

fn is_simple(supp_hyp_ind: &[Signature], nr_gens: usize, dim: usize) -> bool {
    let all = Signature::full(nr_gens);
    let mut count = vec![0usize; nr_gens];
    for ind in supp_hyp_ind {
        if all.is_subset_of(ind) {
            continue;
        }
        for g in ind.ones() {
            count[g] += 1;
        }
    }
    count.iter().all(|&c| c < dim)
}

/// Every permutation maps a basis chosen among the generators so that all
/// generators follow with the same coordinates.
fn permutations_are_linear(rows: &[QVec], perms: &[Vec<usize>]) -> bool {
    let basis_idx = greedy_basis(&rows);
    let basis: Vec<_> = basis_idx.iter().map(|&i| rows[i].clone()).collect();
    let Some(coords) = solve_coordinates(&basis, &rows) else {
        return false;
    };
    perms.iter().all(|p| {
        let image_basis: Vec<_> = basis_idx.iter().map(|&i| rows[p[i]].clone()).collect();
        let image: Vec<_> = p.iter().map(|&i| rows[i].clone()).collect();
        match solve_coordinates(&image_basis, &image) {
            Some(c) => c == coords,
            None => {
                warn!("automorphism maps a generator basis to a dependent set");
                false
            }
        }
    })
}
