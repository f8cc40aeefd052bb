//! Scalar dynamic-programming tables over a treedepth decomposition
//!
//! Entries are keyed by a vertex tuple (a single vertex or a prefix of some
//! vertex's children) and a k-pattern. Child entries exist before their
//! parents consume them; the backward table pulls through `inverseForget` /
//! `inverseJoin`, the forward table pushes through `forget` / `join`.

use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;

use crate::count::catalog::PatternCatalog;
use crate::count::kpattern::{KPatternRep, MotifContext};
use crate::graph::{Color, TdDecomposition, Vertex};

pub type VertexTuple = Vec<Vertex>;

/// Common surface of all DP table flavours, driven by `evaluate`.
pub trait DynamicTable<P: KPatternRep> {
    fn compute_leaf(&mut self, v: Vertex, pattern: &P);
    fn compute_inner_vertex(&mut self, v: Vertex, pattern: &P);
    fn compute_inner_vertex_set(&mut self, vs: &[Vertex], pattern: &P);
    fn cleanup(&mut self, _vs: &[Vertex]) {}
}

/// Post-order DP evaluation: leaves first, then child prefixes, then the
/// vertex itself, for every pattern in the catalog.
pub fn evaluate<P, T>(tdd: &TdDecomposition, catalog: &PatternCatalog<P>, table: &mut T)
where
    P: KPatternRep,
    T: DynamicTable<P>,
{
    for v in post_order(tdd) {
        if tdd.is_leaf(v) {
            for pattern in catalog.all() {
                table.compute_leaf(v, pattern);
            }
        } else {
            let children: Vec<Vertex> = tdd.children(v).to_vec();
            for prefix_len in 2..=children.len() {
                let prefix = &children[..prefix_len];
                for pattern in catalog.all() {
                    table.compute_inner_vertex_set(prefix, pattern);
                }
                table.cleanup(prefix);
            }
            for pattern in catalog.all() {
                table.compute_inner_vertex(v, pattern);
            }
        }
    }
}

fn post_order(tdd: &TdDecomposition) -> Vec<Vertex> {
    let root = match tdd.root() {
        Some(root) => root,
        None => return Vec::new(),
    };
    let mut ordering = Vec::with_capacity(tdd.len());
    let mut queue = vec![root];
    while let Some(curr) = queue.pop() {
        ordering.push(curr);
        if !tdd.is_leaf(curr) {
            queue.extend(tdd.children(curr).iter().rev().copied());
        }
    }
    ordering.reverse();
    ordering
}

/// Map the pattern's boundary onto the root path of `v` and check that motif
/// adjacency matches host adjacency exactly inside the image. Returns the
/// image vertices on success.
pub fn embed_boundary<P: KPatternRep>(
    tdd: &TdDecomposition,
    ctx: &MotifContext,
    v: Vertex,
    pattern: &P,
) -> Option<Vec<Vertex>> {
    let path = tdd.root_path(v);
    let pairs = pattern.boundary_pairs(ctx);

    let mut image_of: HashMap<Vertex, Vertex> = HashMap::with_capacity(pairs.len());
    for &(u, idx) in &pairs {
        if idx >= path.len() {
            return None;
        }
        image_of.insert(u, path[idx]);
    }
    let image: HashSet<Vertex> = image_of.values().copied().collect();

    for &(u, _) in &pairs {
        let u_image = image_of[&u];
        let mapped_neighbours: HashSet<Vertex> = ctx
            .motif()
            .neighbours(u)
            .iter()
            .filter_map(|x| image_of.get(x).copied())
            .collect();
        let host_neighbours: HashSet<Vertex> = tdd
            .graph()
            .neighbours(u_image)
            .iter()
            .copied()
            .filter(|w| image.contains(w))
            .collect();
        if mapped_neighbours != host_neighbours {
            return None;
        }
    }
    Some(image_of.values().copied().collect())
}

/// Scalar indicator: does the root path of `v` realize the pattern?
pub fn is_isomorphism<P: KPatternRep>(
    tdd: &TdDecomposition,
    ctx: &MotifContext,
    v: Vertex,
    pattern: &P,
) -> bool {
    if !pattern.vertices_are_boundary() || pattern.num_vertices() > tdd.vertex_depth(v) + 1 {
        return false;
    }
    if pattern.num_vertices() <= 1 {
        return true;
    }
    embed_boundary(tdd, ctx, v, pattern).is_some()
}

/// Color-tracking indicator: the colors of the image when the root path of
/// `v` realizes the pattern.
pub fn isomorphism_colors<P: KPatternRep>(
    tdd: &TdDecomposition,
    ctx: &MotifContext,
    v: Vertex,
    pattern: &P,
) -> Option<BTreeSet<Color>> {
    if !pattern.vertices_are_boundary() || pattern.num_vertices() > tdd.vertex_depth(v) + 1 {
        return None;
    }
    let image = embed_boundary(tdd, ctx, v, pattern)?;
    Some(image.into_iter().filter_map(|u| tdd.color_of(u)).collect())
}

/// Backward scalar table: entries are plain occurrence counts.
pub struct DpTable<'a, P: KPatternRep> {
    tdd: &'a TdDecomposition,
    ctx: &'a MotifContext,
    catalog: &'a PatternCatalog<P>,
    table: HashMap<VertexTuple, HashMap<P, u64>>,
}

impl<'a, P: KPatternRep> DpTable<'a, P> {
    pub fn new(tdd: &'a TdDecomposition, ctx: &'a MotifContext, catalog: &'a PatternCatalog<P>) -> Self {
        DpTable {
            tdd,
            ctx,
            catalog,
            table: HashMap::new(),
        }
    }

    pub fn lookup(&self, vs: &[Vertex], pattern: &P) -> u64 {
        self.table
            .get(vs)
            .and_then(|entry| entry.get(pattern))
            .copied()
            .unwrap_or(0)
    }

    fn insert(&mut self, vs: VertexTuple, pattern: P, count: u64) {
        self.table
            .entry(vs)
            .or_insert_with(HashMap::new)
            .insert(pattern, count);
    }

    /// The count this decomposition contributes: the trivial pattern at the
    /// root.
    pub fn final_count(&self) -> u64 {
        match self.tdd.root() {
            Some(root) => self.lookup(&[root], &P::trivial(self.ctx)),
            None => 0,
        }
    }

    /// Render all non-zero entries, sorted, for the execution-data dump.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for vs in self.table.keys().sorted() {
            out.push_str(&format!("Vertex set: {:?}\n", vs));
            let entry = &self.table[vs];
            for (pattern, count) in entry
                .iter()
                .map(|(p, c)| (p.render(self.ctx), c))
                .sorted()
            {
                if *count > 0 {
                    out.push_str(&format!("\t{} at pattern {}\n", count, pattern));
                }
            }
        }
        out
    }
}

impl<'a, P: KPatternRep> DynamicTable<P> for DpTable<'a, P> {
    fn compute_leaf(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        let mut pattern_sum = 0;
        for candidate in self.catalog.inverse_forget(self.ctx, pattern, depth) {
            if is_isomorphism(self.tdd, self.ctx, v, &candidate) {
                pattern_sum += 1;
            }
        }
        self.insert(vec![v], pattern.clone(), pattern_sum);
    }

    fn compute_inner_vertex(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        let children: VertexTuple = self.tdd.children(v).to_vec();
        let mut pattern_sum = 0;
        for candidate in self.catalog.inverse_forget(self.ctx, pattern, depth) {
            pattern_sum += self.lookup(&children, &candidate);
        }
        self.insert(vec![v], pattern.clone(), pattern_sum);
    }

    fn compute_inner_vertex_set(&mut self, vs: &[Vertex], pattern: &P) {
        let (front, last) = vs.split_at(vs.len() - 1);
        let mut pattern_sum = 0;
        for (left, right) in self.catalog.inverse_join(self.ctx, pattern) {
            pattern_sum += self.lookup(front, &left) * self.lookup(last, &right);
        }
        self.insert(vs.to_vec(), pattern.clone(), pattern_sum);
    }
}

/// Forward scalar table: contributions are pushed into forgotten/joined
/// patterns instead of pulled from inverse images.
pub struct ForwardDpTable<'a, P: KPatternRep> {
    tdd: &'a TdDecomposition,
    ctx: &'a MotifContext,
    table: HashMap<VertexTuple, HashMap<P, u64>>,
}

impl<'a, P: KPatternRep> ForwardDpTable<'a, P> {
    pub fn new(
        tdd: &'a TdDecomposition,
        ctx: &'a MotifContext,
        _catalog: &'a PatternCatalog<P>,
    ) -> Self {
        ForwardDpTable {
            tdd,
            ctx,
            table: HashMap::new(),
        }
    }

    pub fn lookup(&self, vs: &[Vertex], pattern: &P) -> u64 {
        self.table
            .get(vs)
            .and_then(|entry| entry.get(pattern))
            .copied()
            .unwrap_or(0)
    }

    fn add(&mut self, vs: VertexTuple, pattern: P, count: u64) {
        *self
            .table
            .entry(vs)
            .or_insert_with(HashMap::new)
            .entry(pattern)
            .or_insert(0) += count;
    }

    pub fn final_count(&self) -> u64 {
        match self.tdd.root() {
            Some(root) => self.lookup(&[root], &P::trivial(self.ctx)),
            None => 0,
        }
    }
}

impl<'a, P: KPatternRep> DynamicTable<P> for ForwardDpTable<'a, P> {
    fn compute_leaf(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        if let Some(forgotten) = pattern.forget(self.ctx, depth) {
            if is_isomorphism(self.tdd, self.ctx, v, pattern) {
                self.add(vec![v], forgotten, 1);
            }
        }
    }

    fn compute_inner_vertex(&mut self, v: Vertex, pattern: &P) {
        let depth = self.tdd.vertex_depth(v);
        if let Some(forgotten) = pattern.forget(self.ctx, depth) {
            let children: VertexTuple = self.tdd.children(v).to_vec();
            let count = self.lookup(&children, pattern);
            self.add(vec![v], forgotten, count);
        }
    }

    fn compute_inner_vertex_set(&mut self, vs: &[Vertex], pattern: &P) {
        let (front, last) = vs.split_at(vs.len() - 1);
        let left = self.lookup(front, pattern);
        if left == 0 {
            return;
        }
        for other in pattern.all_compatible(self.ctx) {
            if let Some(joined) = pattern.join(self.ctx, &other) {
                let right = self.lookup(last, &other);
                if right > 0 {
                    self.add(vs.to_vec(), joined, left * right);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::count::kpattern::KPattern;
    use crate::graph::{patterns, Coloring, Graph};
    use std::collections::BTreeSet;

    /// Chain decomposition of a host path 0-1-...-(n-1), rooted at 0.
    fn chain_tdd(n: usize) -> TdDecomposition {
        let mut g = Graph::new();
        for i in 0..n - 1 {
            g.add_edge(i, i + 1);
        }
        let mut col = Coloring::new();
        for v in 0..n {
            col.set(v, v);
        }
        let vertices: BTreeSet<_> = g.vertices().collect();
        let mut tdd = TdDecomposition::from_subgraph(&g, &vertices, &col);
        tdd.update_parent_child(0, None);
        for v in 1..n {
            tdd.update_parent_child(v, Some(v - 1));
        }
        tdd
    }

    #[test]
    fn edge_motif_in_edge_host() {
        // one edge hosts two labeled embeddings of the one-edge motif
        let motif = patterns::path(2);
        let tdd = chain_tdd(2);
        let ctx = MotifContext::new(&motif, tdd.depth());
        let catalog = PatternCatalog::<KPattern>::new(&ctx, false);
        let mut table = DpTable::new(&tdd, &ctx, &catalog);
        evaluate(&tdd, &catalog, &mut table);
        assert_eq!(table.final_count(), 2);
    }

    #[test]
    fn path3_in_path3() {
        let motif = patterns::path(3);
        let tdd = chain_tdd(3);
        let ctx = MotifContext::new(&motif, tdd.depth());
        let catalog = PatternCatalog::<KPattern>::new(&ctx, false);
        let mut table = DpTable::new(&tdd, &ctx, &catalog);
        evaluate(&tdd, &catalog, &mut table);
        // two labeled embeddings (the path read in both directions)
        assert_eq!(table.final_count(), 2);
    }

    #[test]
    fn forward_and_backward_tables_agree() {
        let motif = patterns::path(2);
        for n in 2..5 {
            let tdd = chain_tdd(n);
            let ctx = MotifContext::new(&motif, tdd.depth());
            let catalog = PatternCatalog::<KPattern>::new(&ctx, false);

            let mut backward = DpTable::new(&tdd, &ctx, &catalog);
            evaluate(&tdd, &catalog, &mut backward);
            let mut forward = ForwardDpTable::new(&tdd, &ctx, &catalog);
            evaluate(&tdd, &catalog, &mut forward);

            assert_eq!(backward.final_count(), forward.final_count());
        }
    }

    #[test]
    fn star_decomposition_uses_joins() {
        // host star with hub 0: decomposition roots at the hub, and the
        // join case combines the leaf children
        let mut g = Graph::new();
        for v in 1..4 {
            g.add_edge(0, v);
        }
        let mut col = Coloring::new();
        col.set(0, 0);
        for v in 1..4 {
            col.set(v, 1);
        }
        let vertices: BTreeSet<_> = g.vertices().collect();
        let mut tdd = TdDecomposition::from_subgraph(&g, &vertices, &col);
        tdd.update_parent_child(0, None);
        for v in 1..4 {
            tdd.update_parent_child(v, Some(0));
        }

        let motif = patterns::path(2);
        let ctx = MotifContext::new(&motif, tdd.depth());
        let catalog = PatternCatalog::<KPattern>::new(&ctx, false);
        let mut table = DpTable::new(&tdd, &ctx, &catalog);
        evaluate(&tdd, &catalog, &mut table);
        // three edges, two labelings each
        assert_eq!(table.final_count(), 6);
    }
}
