//! Bit-vector color-tracking DP table
//!
//! One big packed integer per entry: `1 << |S|` fields, one per subset of
//! the current color set, each wide enough for `n^p` occurrences. Merging
//! two entries is a single addition instead of a map walk.

use std::collections::{BTreeMap, HashMap};

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

use crate::count::catalog::PatternCatalog;
use crate::count::kpattern::{KPatternRep, MotifContext};
use crate::count::table::{isomorphism_colors, DynamicTable, VertexTuple};
use crate::count::{ColorMap, ColorSet};
use crate::graph::{Color, TdDecomposition, Vertex};

pub struct BvColorDpTable<'a, P: KPatternRep> {
    tdd: &'a TdDecomposition,
    ctx: &'a MotifContext,
    catalog: &'a PatternCatalog<P>,
    reuse: bool,
    /// Field width in bits; enough for `n^p` occurrences.
    field_width: usize,
    field_mask: BigUint,
    /// Sorted colors of the current color set, mapped to subset-index bits.
    color_bits: BTreeMap<Color, usize>,
    table: HashMap<VertexTuple, HashMap<P, BigUint>>,
}

impl<'a, P: KPatternRep> BvColorDpTable<'a, P> {
    pub fn new(
        tdd: &'a TdDecomposition,
        ctx: &'a MotifContext,
        catalog: &'a PatternCatalog<P>,
        colors: &ColorSet,
        p: usize,
        reuse: bool,
    ) -> Self {
        // a field must hold n^p occurrences without carrying into the next
        let n = tdd.len().max(1) as u128;
        let occupancy = (0..p).fold(1u128, |acc, _| acc.saturating_mul(n));
        let mut field_width = 1;
        while (1u128 << field_width) <= occupancy {
            field_width += 1;
        }
        let field_mask = (BigUint::one() << field_width) - BigUint::one();
        let color_bits = colors
            .iter()
            .enumerate()
            .map(|(bit, &c)| (c, bit))
            .collect();
        BvColorDpTable {
            tdd,
            ctx,
            catalog,
            reuse,
            field_width,
            field_mask,
            color_bits,
            table: HashMap::new(),
        }
    }

    /// The subset index of a color set: one bit per member color.
    fn subset_index(&self, colors: &ColorSet) -> usize {
        colors
            .iter()
            .filter_map(|c| self.color_bits.get(c))
            .fold(0, |acc, &bit| acc | (1 << bit))
    }

    fn insert(&mut self, vs: VertexTuple, pattern: P, counts: BigUint) {
        self.table
            .entry(vs)
            .or_insert_with(HashMap::new)
            .insert(pattern, counts);
    }

    fn take(&mut self, vs: &[Vertex], pattern: &P) -> Option<BigUint> {
        if self.reuse {
            self.table.get_mut(vs).and_then(|entry| entry.remove(pattern))
        } else {
            self.table
                .get(vs)
                .and_then(|entry| entry.get(pattern))
                .cloned()
        }
    }

    /// Unpack the packed fields of the root entry into an ordinary
    /// color-set map.
    pub fn final_count(&self) -> ColorMap {
        let packed = match self.tdd.root() {
            Some(root) => self
                .table
                .get(&vec![root])
                .and_then(|entry| entry.get(&P::trivial(self.ctx)))
                .cloned()
                .unwrap_or_else(BigUint::zero),
            None => BigUint::zero(),
        };
        self.unpack(&packed)
    }

    fn unpack(&self, packed: &BigUint) -> ColorMap {
        let mut res = ColorMap::default();
        let mut rest = packed.clone();
        let num_subsets = 1usize << self.color_bits.len();
        for index in 0..num_subsets {
            if rest.is_zero() {
                break;
            }
            let value = &rest & &self.field_mask;
            rest = rest >> self.field_width;
            if value.is_zero() {
                continue;
            }
            let colors: ColorSet = self
                .color_bits
                .iter()
                .filter(|(_, &bit)| index & (1 << bit) != 0)
                .map(|(&c, _)| c)
                .collect();
            let count = value.to_u64().unwrap_or(u64::MAX);
            res.add(colors, count);
        }
        res
    }
}

impl<'a, P: KPatternRep> DynamicTable<P> for BvColorDpTable<'a, P> {
    fn compute_leaf(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        let mut pattern_sum = BigUint::zero();
        for candidate in self.catalog.inverse_forget(self.ctx, pattern, depth) {
            if let Some(colors) = isomorphism_colors(self.tdd, self.ctx, v, &candidate) {
                let index = self.subset_index(&colors);
                pattern_sum += BigUint::one() << (self.field_width * index);
            }
        }
        self.insert(vec![v], pattern.clone(), pattern_sum);
    }

    fn compute_inner_vertex(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        let children: VertexTuple = self.tdd.children(v).to_vec();
        let mut pattern_sum = BigUint::zero();
        for candidate in self.catalog.inverse_forget(self.ctx, pattern, depth) {
            if let Some(entry) = self.take(&children, &candidate) {
                pattern_sum += entry;
            }
        }
        self.insert(vec![v], pattern.clone(), pattern_sum);
    }

    fn compute_inner_vertex_set(&mut self, vs: &[Vertex], pattern: &P) {
        let (front, last) = vs.split_at(vs.len() - 1);
        let num_subsets = 1usize << self.color_bits.len();
        let mut pattern_sum = BigUint::zero();

        for (left, right) in self.catalog.inverse_join(self.ctx, pattern) {
            let left_entry = match self.table.get(front).and_then(|e| e.get(&left)) {
                Some(entry) => entry.clone(),
                None => continue,
            };
            let mut e1 = left_entry;
            for cs1 in 0..num_subsets {
                if e1.is_zero() {
                    break;
                }
                let val1 = &e1 & &self.field_mask;
                e1 = e1 >> self.field_width;
                if val1.is_zero() {
                    continue;
                }
                let right_entry = match self.table.get(last).and_then(|e| e.get(&right)) {
                    Some(entry) => entry.clone(),
                    None => continue,
                };
                let mut e2 = right_entry;
                for cs2 in 0..num_subsets {
                    if e2.is_zero() {
                        break;
                    }
                    let val2 = &e2 & &self.field_mask;
                    e2 = e2 >> self.field_width;
                    if val2.is_zero() {
                        continue;
                    }
                    pattern_sum += (&val1 * &val2) << (self.field_width * (cs1 | cs2));
                }
            }
        }
        self.insert(vs.to_vec(), pattern.clone(), pattern_sum);
    }

    fn cleanup(&mut self, vs: &[Vertex]) {
        if self.reuse {
            let (front, last) = vs.split_at(vs.len() - 1);
            self.table.remove(front);
            self.table.remove(last);
        }
    }
}
