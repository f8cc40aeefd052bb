//! Count combiners: how per-color-set counts become one total
//!
//! Inclusion-exclusion corrects for embeddings that use fewer than p colors
//! with precomputed coefficients; the color-tracking combiners instead keep
//! per-color-subset evidence and only ever sweep maximal color sets; the
//! hybrid runs color tracking on a small covering family and the cheap
//! scalar program elsewhere.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use itertools::Itertools;
use num_integer::binomial;

use crate::count::{ColorMap, ColorSet};
use crate::graph::{Color, Coloring};

/// Which DP table the combiner needs for the current color set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Scalar,
    ColorTracking,
    BvColorTracking,
}

/// Count of one decomposition, in the shape the active table produced.
#[derive(Debug, Clone)]
pub enum CountValue {
    Scalar(u64),
    ByColorSet(ColorMap),
}

/// Combiner selection, as named in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinerKind {
    InclusionExclusion,
    ColorCount,
    HybridCount,
    BvColorCount,
    BvHybridCount,
}

impl CombinerKind {
    pub fn is_bit_vector(self) -> bool {
        matches!(self, CombinerKind::BvColorCount | CombinerKind::BvHybridCount)
    }
}

pub enum Combiner {
    InclusionExclusion(InclusionExclusion),
    Color(ColorCount),
    Hybrid(HybridCount),
}

impl Combiner {
    /// Build the combiner for one motif: `p` is the motif size, `td` the
    /// motif's treedepth lower bound.
    pub fn new(kind: CombinerKind, p: usize, coloring: &Coloring, td: usize) -> Self {
        let chi = coloring.num_colors();
        let min_p = p.min(chi);
        match kind {
            CombinerKind::InclusionExclusion => {
                Combiner::InclusionExclusion(InclusionExclusion::new(min_p, chi, td))
            }
            CombinerKind::ColorCount | CombinerKind::BvColorCount => {
                Combiner::Color(ColorCount::new(min_p, kind.is_bit_vector()))
            }
            CombinerKind::HybridCount | CombinerKind::BvHybridCount => Combiner::Hybrid(
                HybridCount::new(min_p, coloring.colors(), kind.is_bit_vector()),
            ),
        }
    }

    /// Smallest color-set size the sweep must visit for this combiner.
    pub fn tree_depth(&self) -> usize {
        match self {
            Combiner::InclusionExclusion(c) => c.td.min(c.min_p),
            Combiner::Color(c) => c.min_p,
            Combiner::Hybrid(c) => c.min_p,
        }
    }

    /// The table flavour to run on the current color set; valid only after
    /// `before_color_set`.
    pub fn table_mode(&self) -> TableMode {
        match self {
            Combiner::InclusionExclusion(_) => TableMode::Scalar,
            Combiner::Color(c) => color_mode(c.bit_vector),
            Combiner::Hybrid(c) => {
                if c.use_color_dp {
                    color_mode(c.bit_vector)
                } else {
                    TableMode::Scalar
                }
            }
        }
    }

    pub fn before_color_set(&mut self, colors: &ColorSet) {
        match self {
            Combiner::InclusionExclusion(c) => c.before_color_set(colors),
            Combiner::Color(c) => c.before_color_set(colors),
            Combiner::Hybrid(c) => c.before_color_set(colors),
        }
    }

    pub fn combine_count(&mut self, count: CountValue) {
        match self {
            Combiner::InclusionExclusion(c) => c.combine_count(count),
            Combiner::Color(c) => c.combine_count(count),
            Combiner::Hybrid(c) => c.combine_count(count),
        }
    }

    pub fn after_color_set(&mut self, colors: &ColorSet) {
        match self {
            Combiner::InclusionExclusion(c) => c.after_color_set(colors),
            Combiner::Color(c) => c.after_color_set(colors),
            Combiner::Hybrid(c) => c.after_color_set(colors),
        }
    }

    /// The combined total; correct only once every color set was processed.
    pub fn get_count(&self) -> i128 {
        match self {
            Combiner::InclusionExclusion(c) => c.pattern_count,
            Combiner::Color(c) => c.totals.total() as i128,
            Combiner::Hybrid(c) => c.get_count(),
        }
    }

    /// Record per-color-set totals for the execution-data archive; only the
    /// inclusion-exclusion combiner supports capture.
    pub fn record_colorset_counts(&mut self) -> bool {
        match self {
            Combiner::InclusionExclusion(c) => {
                c.colorset_counts = Some(Vec::new());
                true
            }
            _ => false,
        }
    }

    pub fn take_colorset_counts(&mut self) -> Vec<(ColorSet, u64)> {
        match self {
            Combiner::InclusionExclusion(c) => c.colorset_counts.take().unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

fn color_mode(bit_vector: bool) -> TableMode {
    if bit_vector {
        TableMode::BvColorTracking
    } else {
        TableMode::ColorTracking
    }
}

/// Möbius-style coefficients over color-set sizes.
pub struct InclusionExclusion {
    min_p: usize,
    td: usize,
    in_ex: Vec<i128>,
    n_colors: Option<usize>,
    pattern_count: i128,
    current_set_count: u64,
    colorset_counts: Option<Vec<(ColorSet, u64)>>,
}

impl InclusionExclusion {
    fn new(min_p: usize, chi: usize, td: usize) -> Self {
        let lo = td.min(min_p);
        let mut in_ex: Vec<i128> = Vec::new();
        for n_colors in (lo..=min_p).rev() {
            let discrepancy = min_p - n_colors;
            let remaining = chi - n_colors;
            // how often a set of this size was already counted inside the
            // larger sets, so the new coefficient cancels the overlap
            let overlap: i128 = in_ex
                .iter()
                .enumerate()
                .map(|(i, &m)| binomial(remaining as i128, (discrepancy - i) as i128) * m)
                .sum();
            in_ex.push(1 - overlap);
        }
        InclusionExclusion {
            min_p,
            td,
            in_ex,
            n_colors: None,
            pattern_count: 0,
            current_set_count: 0,
            colorset_counts: None,
        }
    }

    fn before_color_set(&mut self, colors: &ColorSet) {
        self.n_colors = Some(colors.len());
        self.current_set_count = 0;
    }

    fn combine_count(&mut self, count: CountValue) {
        let count = match count {
            CountValue::Scalar(c) => c,
            CountValue::ByColorSet(map) => map.total(),
        };
        let n = self.n_colors.expect("combine_count before before_color_set");
        if self.td <= n && n <= self.min_p {
            self.pattern_count += self.in_ex[self.min_p - n] * count as i128;
            self.current_set_count += count;
        }
    }

    fn after_color_set(&mut self, colors: &ColorSet) {
        if let Some(record) = self.colorset_counts.as_mut() {
            record.push((colors.clone(), self.current_set_count));
        }
    }
}

/// Keep per-color-subset counts; a subset's count is identical in every
/// maximal color set containing it, so totals take the first non-zero value.
pub struct ColorCount {
    min_p: usize,
    bit_vector: bool,
    totals: ColorMap,
    raw: ColorMap,
    n_colors: Option<usize>,
}

impl ColorCount {
    fn new(min_p: usize, bit_vector: bool) -> Self {
        ColorCount {
            min_p,
            bit_vector,
            totals: ColorMap::default(),
            raw: ColorMap::default(),
            n_colors: None,
        }
    }

    fn before_color_set(&mut self, colors: &ColorSet) {
        self.n_colors = Some(colors.len());
        self.raw.clear();
    }

    fn combine_count(&mut self, count: CountValue) {
        let map = match count {
            CountValue::ByColorSet(map) => map,
            CountValue::Scalar(_) => unreachable!("color combiner fed a scalar count"),
        };
        let n = self.n_colors.expect("combine_count before before_color_set");
        if n == self.min_p {
            self.raw.merge_add(&map);
        }
    }

    fn after_color_set(&mut self, _colors: &ColorSet) {
        self.totals.merge_max(&self.raw);
    }
}

/// Color tracking on a covering family of maximal sets, inclusion-exclusion
/// style scalar counting elsewhere.
pub struct HybridCount {
    min_p: usize,
    bit_vector: bool,
    color_dp_list: HashSet<ColorSet>,
    totals: ColorMap,
    raw: ColorMap,
    overcount: BTreeMap<ColorSet, i128>,
    use_color_dp: bool,
    colors: ColorSet,
}

impl HybridCount {
    fn new(min_p: usize, colors: &BTreeSet<Color>, bit_vector: bool) -> Self {
        HybridCount {
            min_p,
            bit_vector,
            color_dp_list: covering_family(colors, min_p),
            totals: ColorMap::default(),
            raw: ColorMap::default(),
            overcount: BTreeMap::new(),
            use_color_dp: false,
            colors: ColorSet::new(),
        }
    }

    fn before_color_set(&mut self, colors: &ColorSet) {
        self.use_color_dp = self.color_dp_list.contains(colors);
        if self.use_color_dp {
            self.raw.clear();
        }
        self.colors = colors.clone();
    }

    fn combine_count(&mut self, count: CountValue) {
        if self.colors.len() != self.min_p {
            return;
        }
        match (self.use_color_dp, count) {
            (true, CountValue::ByColorSet(map)) => self.raw.merge_add(&map),
            (false, CountValue::Scalar(c)) => {
                *self.overcount.entry(self.colors.clone()).or_insert(0) += c as i128;
            }
            _ => unreachable!("hybrid combiner fed the wrong count shape"),
        }
    }

    fn after_color_set(&mut self, _colors: &ColorSet) {
        if self.use_color_dp {
            self.totals.merge_max(&self.raw);
        }
    }

    fn get_count(&self) -> i128 {
        let mut total = self.totals.total() as i128;
        for (oc_set, &oc) in &self.overcount {
            // subtract everything already counted in the covered subsets
            let counted: i128 = oc_set
                .iter()
                .copied()
                .powerset()
                .map(|subset| self.totals.get(&subset.into_iter().collect()) as i128)
                .sum();
            total += oc - counted;
        }
        total
    }
}

/// A deterministic covering family: every size-(p-1) color subset is
/// contained in at least one chosen size-p set. Subsets are walked in
/// lexicographic color order; `j` relaxes how many already-covered subsets a
/// new set may repeat, so the loop always completes.
fn covering_family(colors: &BTreeSet<Color>, min_p: usize) -> HashSet<ColorSet> {
    let mut family: HashSet<ColorSet> = HashSet::new();
    if min_p == 0 {
        return family;
    }
    let color_list: Vec<Color> = colors.iter().copied().collect();
    let keys: Vec<ColorSet> = color_list
        .iter()
        .copied()
        .combinations(min_p - 1)
        .map(|c| c.into_iter().collect())
        .collect();
    let mut covered: BTreeMap<ColorSet, bool> =
        keys.iter().cloned().map(|k| (k, false)).collect();

    let mut relax = 0;
    while covered.values().any(|&done| !done) {
        relax += 1;
        for key in &keys {
            if covered[key] {
                continue;
            }
            for &color in &color_list {
                if key.contains(&color) {
                    continue;
                }
                let mut candidate = key.clone();
                candidate.insert(color);

                let mut budget = relax;
                for sub in candidate.iter().copied().combinations(min_p - 1) {
                    let sub: ColorSet = sub.into_iter().collect();
                    if covered[&sub] {
                        budget -= 1;
                        if budget == 0 {
                            break;
                        }
                    }
                }
                if budget > 0 {
                    for sub in candidate.iter().copied().combinations(min_p - 1) {
                        let sub: ColorSet = sub.into_iter().collect();
                        covered.insert(sub, true);
                    }
                    family.insert(candidate);
                }
            }
        }
    }
    family
}
