//! Pattern counting: drive the sweep, the per-decomposition dynamic
//! program, and the combiners

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::decompose::{SweepKind, SweepParams, SweepVisitor};
use crate::error::{Error, Result};
use crate::graph::{Color, Coloring, Graph, TdDecomposition, Vertex};

pub mod bv_color_table;
pub mod bv_kpattern;
pub mod catalog;
pub mod color_table;
pub mod combine;
pub mod kpattern;
pub mod table;

pub use combine::{Combiner, CombinerKind, CountValue, TableMode};
pub use kpattern::{KPattern, KPatternRep, MotifContext};

use bv_color_table::BvColorDpTable;
use bv_kpattern::BvKPattern;
use catalog::PatternCatalog;
use color_table::ColorDpTable;
use table::{evaluate, DpTable, ForwardDpTable};

/// A set of host colors, the key of all color-tracking bookkeeping.
pub type ColorSet = BTreeSet<Color>;

/// Occurrence counts per color subset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap(HashMap<ColorSet, u64>);

impl ColorMap {
    pub fn add(&mut self, colors: ColorSet, count: u64) {
        *self.0.entry(colors).or_insert(0) += count;
    }

    pub fn get(&self, colors: &ColorSet) -> u64 {
        self.0.get(colors).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColorSet, &u64)> {
        self.0.iter()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge_add(&mut self, other: &ColorMap) {
        for (colors, &count) in other.iter() {
            self.add(colors.clone(), count);
        }
    }

    /// Per-key maximum; adopting a freshly seen subset count without ever
    /// adding two observations of the same subset together.
    pub fn merge_max(&mut self, other: &ColorMap) {
        for (colors, &count) in other.iter() {
            let slot = self.0.entry(colors.clone()).or_insert(0);
            *slot = (*slot).max(count);
        }
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

/// k-pattern representation selection, as named in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Dict,
    Bv,
    MemoizedDict,
    MemoizedBv,
}

impl PatternKind {
    fn bit_vector(self) -> bool {
        matches!(self, PatternKind::Bv | PatternKind::MemoizedBv)
    }

    fn memoize(self) -> bool {
        matches!(self, PatternKind::MemoizedDict | PatternKind::MemoizedBv)
    }
}

/// Tuning knobs for the DP tables; a table flavour may ignore the ones that
/// do not apply to it.
#[derive(Debug, Clone, Copy)]
pub struct TableHints {
    pub forward: bool,
    pub reuse: bool,
}

impl Default for TableHints {
    fn default() -> Self {
        TableHints {
            forward: false,
            reuse: true,
        }
    }
}

/// Artifacts collected for the execution-data archive.
#[derive(Debug, Default)]
pub struct ExecCapture {
    pub largest: Option<LargestComponent>,
    pub colorset_counts: Vec<(ColorSet, u64)>,
}

#[derive(Debug)]
pub struct LargestComponent {
    pub size: usize,
    pub edges: Vec<(Vertex, Vertex)>,
    pub tdd_lines: Vec<(Vertex, Vertex)>,
    pub table_dump: String,
}

/// One motif's counting state: its combiner plus lazily built pattern
/// catalogs per decomposition depth. Catalog lifetime is the job's, so
/// nothing leaks between motifs or runs.
struct MotifJob {
    motif: Graph,
    automorphisms: u64,
    combiner: Combiner,
    dict_catalogs: HashMap<usize, (MotifContext, PatternCatalog<KPattern>)>,
    bv_catalogs: HashMap<usize, (MotifContext, PatternCatalog<BvKPattern>)>,
}

impl MotifJob {
    /// Run the DP on one decomposition, in the table flavour the combiner
    /// asked for. Optionally renders the scalar table for the archive.
    fn count_tdd(
        &mut self,
        tdd: &TdDecomposition,
        kind: PatternKind,
        hints: TableHints,
        colors: &ColorSet,
        p: usize,
        want_dump: bool,
    ) -> (CountValue, Option<String>) {
        let k = tdd.depth();
        let mode = self.combiner.table_mode();
        let memoize = kind.memoize();

        if kind.bit_vector() {
            let motif = &self.motif;
            let (ctx, cat) = self
                .bv_catalogs
                .entry(k)
                .or_insert_with(|| {
                    let ctx = MotifContext::new(motif, k);
                    let cat = PatternCatalog::new(&ctx, memoize);
                    (ctx, cat)
                });
            run_tables(tdd, ctx, cat, mode, hints, colors, p, want_dump)
        } else {
            let motif = &self.motif;
            let (ctx, cat) = self
                .dict_catalogs
                .entry(k)
                .or_insert_with(|| {
                    let ctx = MotifContext::new(motif, k);
                    let cat = PatternCatalog::new(&ctx, memoize);
                    (ctx, cat)
                });
            run_tables(tdd, ctx, cat, mode, hints, colors, p, want_dump)
        }
    }
}

fn run_tables<P: KPatternRep>(
    tdd: &TdDecomposition,
    ctx: &MotifContext,
    catalog: &PatternCatalog<P>,
    mode: TableMode,
    hints: TableHints,
    colors: &ColorSet,
    p: usize,
    want_dump: bool,
) -> (CountValue, Option<String>) {
    match mode {
        TableMode::Scalar => {
            if hints.forward {
                let mut table = ForwardDpTable::new(tdd, ctx, catalog);
                evaluate(tdd, catalog, &mut table);
                (CountValue::Scalar(table.final_count()), None)
            } else {
                let mut table = DpTable::new(tdd, ctx, catalog);
                evaluate(tdd, catalog, &mut table);
                let dump = if want_dump { Some(table.dump()) } else { None };
                (CountValue::Scalar(table.final_count()), dump)
            }
        }
        TableMode::ColorTracking => {
            let mut table = ColorDpTable::new(tdd, ctx, catalog, hints.reuse);
            evaluate(tdd, catalog, &mut table);
            (CountValue::ByColorSet(table.final_count()), None)
        }
        TableMode::BvColorTracking => {
            let mut table = BvColorDpTable::new(tdd, ctx, catalog, colors, p, hints.reuse);
            evaluate(tdd, catalog, &mut table);
            (CountValue::ByColorSet(table.final_count()), None)
        }
    }
}

/// Runs the decompose, count and combine parts of the pipeline.
pub struct PatternCounter<'a> {
    g: &'a Graph,
    coloring: &'a Coloring,
    pattern_kind: PatternKind,
    hints: TableHints,
    sweep: SweepKind,
    p: usize,
    jobs: Vec<MotifJob>,
    capture: Option<ExecCapture>,
}

impl<'a> PatternCounter<'a> {
    /// `motifs` pairs each pattern graph with its treedepth lower bound.
    pub fn new(
        g: &'a Graph,
        coloring: &'a Coloring,
        motifs: Vec<(Graph, usize)>,
        pattern_kind: PatternKind,
        hints: TableHints,
        sweep: SweepKind,
        combiner_kind: CombinerKind,
    ) -> Result<Self> {
        if motifs.is_empty() {
            return Err(Error::UnknownPattern("no pattern given".into()));
        }
        let p = motifs.iter().map(|(h, _)| h.len()).max().unwrap_or(0);
        if p == 0 {
            return Err(Error::UnknownPattern("empty pattern graph".into()));
        }

        // scalar counts live in 64-bit words; make sure n^p fits
        let n = g.len().max(1);
        let bits = (n as f64 + 1.0).log2() * p as f64;
        if bits > 63.0 {
            return Err(Error::Config(format!(
                "counting {}-vertex patterns in a {}-vertex host overflows 64-bit counts",
                p, n
            )));
        }
        if pattern_kind.bit_vector() && p > 25 {
            return Err(Error::Config(format!(
                "bit-vector patterns support at most 25 vertices, the pattern has {}",
                p
            )));
        }
        if p > crate::color::MAX_TREE_DEPTH {
            return Err(Error::Config(format!(
                "patterns larger than {} vertices exceed the union-find word width",
                crate::color::MAX_TREE_DEPTH
            )));
        }

        let jobs = motifs
            .into_iter()
            .map(|(motif, td_lower)| {
                let combiner = Combiner::new(combiner_kind, motif.len(), coloring, td_lower);
                MotifJob {
                    automorphisms: count_automorphisms(&motif),
                    motif,
                    combiner,
                    dict_catalogs: HashMap::new(),
                    bv_catalogs: HashMap::new(),
                }
            })
            .collect();

        Ok(PatternCounter {
            g,
            coloring,
            pattern_kind,
            hints,
            sweep,
            p,
            jobs,
            capture: None,
        })
    }

    /// Capture per-stage artifacts for the execution-data archive. Only
    /// single-pattern inclusion-exclusion runs support capture.
    pub fn enable_execdata(&mut self) -> Result<()> {
        if self.jobs.len() != 1 {
            return Err(Error::ExecData(
                "execution data cannot be combined with multi-pattern runs".into(),
            ));
        }
        if !self.jobs[0].combiner.record_colorset_counts() {
            return Err(Error::ExecData(
                "execution data requires the InclusionExclusion combiner".into(),
            ));
        }
        if self.hints.forward {
            return Err(Error::ExecData(
                "execution data requires the backward table".into(),
            ));
        }
        self.capture = Some(ExecCapture::default());
        Ok(())
    }

    /// Count occurrences of every motif; one count per motif, in input
    /// order. Counts are of unordered vertex subsets, so the labeled totals
    /// are divided by each motif's automorphism count.
    pub fn count_patterns(&mut self) -> Result<Vec<u64>> {
        let td_h = self
            .jobs
            .iter()
            .map(|job| job.combiner.tree_depth())
            .min()
            .unwrap_or(1);
        let min_size = self.jobs.iter().map(|job| job.motif.len()).min().unwrap_or(1);
        let params = SweepParams {
            p: self.p,
            td_h: td_h.min(self.p).max(1),
            min_size,
        };
        debug!(p = params.p, td_h = params.td_h, "sweeping color sets");

        let mut driver = CountDriver {
            jobs: &mut self.jobs,
            pattern_kind: self.pattern_kind,
            hints: self.hints,
            p: self.p,
            capture: self.capture.as_mut(),
        };
        self.sweep.run(self.g, self.coloring, params, &mut driver)?;

        if let Some(capture) = self.capture.as_mut() {
            capture.colorset_counts = self.jobs[0].combiner.take_colorset_counts();
        }

        self.jobs
            .iter()
            .map(|job| {
                let labeled = job.combiner.get_count();
                if labeled < 0 || labeled > u64::MAX as i128 {
                    return Err(Error::Internal(format!(
                        "combined count {} is outside the 64-bit range",
                        labeled
                    )));
                }
                let labeled = labeled as u64;
                if labeled % job.automorphisms != 0 {
                    return Err(Error::Internal(format!(
                        "labeled count {} is not divisible by the {} automorphisms",
                        labeled, job.automorphisms
                    )));
                }
                Ok(labeled / job.automorphisms)
            })
            .collect()
    }

    pub fn take_execdata(&mut self) -> Option<ExecCapture> {
        self.capture.take()
    }
}

struct CountDriver<'a> {
    jobs: &'a mut Vec<MotifJob>,
    pattern_kind: PatternKind,
    hints: TableHints,
    p: usize,
    capture: Option<&'a mut ExecCapture>,
}

impl<'a> SweepVisitor for CountDriver<'a> {
    fn begin_color_set(&mut self, colors: &ColorSet) {
        for job in self.jobs.iter_mut() {
            job.combiner.before_color_set(colors);
        }
    }

    fn decomposition(&mut self, tdd: TdDecomposition) -> Result<()> {
        for job in self.jobs.iter_mut() {
            let want_dump = match self.capture.as_deref() {
                Some(capture) => {
                    let current = capture.largest.as_ref().map(|l| l.size).unwrap_or(0);
                    tdd.len() > current
                }
                None => false,
            };
            let (count, dump) = job.count_tdd(
                &tdd,
                self.pattern_kind,
                self.hints,
                &tdd_colors(&tdd),
                self.p,
                want_dump,
            );
            job.combiner.combine_count(count);
            if let (Some(capture), Some(table_dump)) = (self.capture.as_deref_mut(), dump) {
                capture.largest = Some(LargestComponent {
                    size: tdd.len(),
                    edges: tdd.graph().edges().collect(),
                    tdd_lines: tdd
                        .vertices()
                        .filter_map(|v| tdd.parent(v).map(|parent| (v, parent)))
                        .collect(),
                    table_dump,
                });
            }
        }
        Ok(())
    }

    fn end_color_set(&mut self, colors: &ColorSet) {
        for job in self.jobs.iter_mut() {
            job.combiner.after_color_set(colors);
        }
    }
}

fn tdd_colors(tdd: &TdDecomposition) -> ColorSet {
    tdd.vertices().filter_map(|v| tdd.color_of(v)).collect()
}

/// Count the automorphisms of a pattern graph by backtracking over
/// degree-compatible bijections.
pub fn count_automorphisms(h: &Graph) -> u64 {
    let vertices: Vec<Vertex> = h.vertices().collect();
    let mut image: HashMap<Vertex, Vertex> = HashMap::new();
    let mut used: BTreeSet<Vertex> = BTreeSet::new();
    count_rec(h, &vertices, 0, &mut image, &mut used)
}

fn count_rec(
    h: &Graph,
    vertices: &[Vertex],
    next: usize,
    image: &mut HashMap<Vertex, Vertex>,
    used: &mut BTreeSet<Vertex>,
) -> u64 {
    if next == vertices.len() {
        return 1;
    }
    let v = vertices[next];
    let mut total = 0;
    for &candidate in vertices {
        if used.contains(&candidate) || h.degree(candidate) != h.degree(v) {
            continue;
        }
        // adjacency to already-placed vertices must be preserved both ways
        let consistent = image.iter().all(|(&placed, &placed_image)| {
            h.adjacent(v, placed) == h.adjacent(candidate, placed_image)
        });
        if !consistent {
            continue;
        }
        image.insert(v, candidate);
        used.insert(candidate);
        total += count_rec(h, vertices, next + 1, image, used);
        image.remove(&v);
        used.remove(&candidate);
    }
    total
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::patterns;

    #[test]
    fn automorphism_counts_of_known_graphs() {
        assert_eq!(count_automorphisms(&patterns::path(2)), 2);
        assert_eq!(count_automorphisms(&patterns::path(3)), 2);
        assert_eq!(count_automorphisms(&patterns::clique(3)), 6);
        assert_eq!(count_automorphisms(&patterns::clique(4)), 24);
        assert_eq!(count_automorphisms(&patterns::cycle(4)), 8);
        assert_eq!(count_automorphisms(&patterns::star(4)), 6);
        assert_eq!(count_automorphisms(&patterns::biclique(3, 3)), 72);
    }

    #[test]
    fn color_map_merges() {
        let mut a = ColorMap::default();
        a.add([0].iter().copied().collect(), 2);
        let mut b = ColorMap::default();
        b.add([0].iter().copied().collect(), 5);
        b.add([1].iter().copied().collect(), 1);

        let mut added = a.clone();
        added.merge_add(&b);
        assert_eq!(added.get(&[0].iter().copied().collect()), 7);
        assert_eq!(added.total(), 8);

        let mut maxed = a.clone();
        maxed.merge_max(&b);
        assert_eq!(maxed.get(&[0].iter().copied().collect()), 5);
        assert_eq!(maxed.get(&[1].iter().copied().collect()), 1);
    }
}
