//! Color-tracking DP table
//!
//! Entries remember, per pattern, how many partial embeddings used each set
//! of host colors. The combiners that skip small color sets read everything
//! they need out of the size-p sweeps through these maps.

use std::collections::HashMap;

use crate::count::catalog::PatternCatalog;
use crate::count::kpattern::{KPatternRep, MotifContext};
use crate::count::table::{isomorphism_colors, DynamicTable, VertexTuple};
use crate::count::ColorMap;
use crate::graph::{TdDecomposition, Vertex};

pub struct ColorDpTable<'a, P: KPatternRep> {
    tdd: &'a TdDecomposition,
    ctx: &'a MotifContext,
    catalog: &'a PatternCatalog<P>,
    reuse: bool,
    table: HashMap<VertexTuple, HashMap<P, ColorMap>>,
}

impl<'a, P: KPatternRep> ColorDpTable<'a, P> {
    pub fn new(
        tdd: &'a TdDecomposition,
        ctx: &'a MotifContext,
        catalog: &'a PatternCatalog<P>,
        reuse: bool,
    ) -> Self {
        ColorDpTable {
            tdd,
            ctx,
            catalog,
            reuse,
            table: HashMap::new(),
        }
    }

    fn insert(&mut self, vs: VertexTuple, pattern: P, counts: ColorMap) {
        self.table
            .entry(vs)
            .or_insert_with(HashMap::new)
            .insert(pattern, counts);
    }

    /// Consume (or copy, when reuse is off) a child entry.
    fn take(&mut self, vs: &[Vertex], pattern: &P) -> Option<ColorMap> {
        if self.reuse {
            self.table.get_mut(vs).and_then(|entry| entry.remove(pattern))
        } else {
            self.table
                .get(vs)
                .and_then(|entry| entry.get(pattern))
                .cloned()
        }
    }

    pub fn final_count(&self) -> ColorMap {
        match self.tdd.root() {
            Some(root) => self
                .table
                .get(&vec![root])
                .and_then(|entry| entry.get(&P::trivial(self.ctx)))
                .cloned()
                .unwrap_or_default(),
            None => ColorMap::default(),
        }
    }
}

impl<'a, P: KPatternRep> DynamicTable<P> for ColorDpTable<'a, P> {
    fn compute_leaf(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        let mut pattern_sum = ColorMap::default();
        for candidate in self.catalog.inverse_forget(self.ctx, pattern, depth) {
            if let Some(colors) = isomorphism_colors(self.tdd, self.ctx, v, &candidate) {
                pattern_sum.add(colors, 1);
            }
        }
        self.insert(vec![v], pattern.clone(), pattern_sum);
    }

    fn compute_inner_vertex(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        let children: VertexTuple = self.tdd.children(v).to_vec();
        let mut pattern_sum = ColorMap::default();
        for candidate in self.catalog.inverse_forget(self.ctx, pattern, depth) {
            if let Some(entry) = self.take(&children, &candidate) {
                pattern_sum.merge_add(&entry);
            }
        }
        self.insert(vec![v], pattern.clone(), pattern_sum);
    }

    fn compute_inner_vertex_set(&mut self, vs: &[Vertex], pattern: &P) {
        let (front, last) = vs.split_at(vs.len() - 1);
        let mut pattern_sum = ColorMap::default();
        for (left, right) in self.catalog.inverse_join(self.ctx, pattern) {
            let left_entry = self.table.get(front).and_then(|e| e.get(&left));
            let right_entry = self.table.get(last).and_then(|e| e.get(&right));
            if let (Some(left_entry), Some(right_entry)) = (left_entry, right_entry) {
                for (cs1, n1) in left_entry.iter() {
                    for (cs2, n2) in right_entry.iter() {
                        let union = cs1.union(cs2).copied().collect();
                        pattern_sum.add(union, n1 * n2);
                    }
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::count::kpattern::KPattern;
    use crate::count::table::{evaluate, DpTable};
    use crate::graph::{patterns, Coloring, Graph};
    use std::collections::BTreeSet;

    fn two_colored_path() -> TdDecomposition {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let mut col = Coloring::new();
        col.set(0, 0);
        col.set(1, 1);
        col.set(2, 0);
        let vertices: BTreeSet<_> = g.vertices().collect();
        let mut tdd = TdDecomposition::from_subgraph(&g, &vertices, &col);
        tdd.update_parent_child(1, None);
        tdd.update_parent_child(0, Some(1));
        tdd.update_parent_child(2, Some(1));
        tdd
    }

    #[test]
    fn tracks_the_colors_of_each_embedding() {
        let motif = patterns::path(2);
        let tdd = two_colored_path();
        let ctx = MotifContext::new(&motif, tdd.depth());
        let catalog = PatternCatalog::<KPattern>::new(&ctx, false);
        let mut table = ColorDpTable::new(&tdd, &ctx, &catalog, true);
        evaluate(&tdd, &catalog, &mut table);
        let counts = table.final_count();
        // each of the two edges uses colors {0, 1}, two labelings each
        let key: BTreeSet<_> = [0, 1].iter().copied().collect();
        assert_eq!(counts.get(&key), 4);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn totals_match_the_scalar_table() {
        for reuse in &[true, false] {
            let motif = patterns::path(3);
            let tdd = two_colored_path();
            let ctx = MotifContext::new(&motif, tdd.depth());
            let catalog = PatternCatalog::<KPattern>::new(&ctx, false);

            let mut color_table = ColorDpTable::new(&tdd, &ctx, &catalog, *reuse);
            evaluate(&tdd, &catalog, &mut color_table);
            let mut scalar = DpTable::new(&tdd, &ctx, &catalog);
            evaluate(&tdd, &catalog, &mut scalar);

            assert_eq!(color_table.final_count().total(), scalar.final_count());
        }
    }
}
