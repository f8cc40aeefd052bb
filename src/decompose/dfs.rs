//! Incremental DFS sweep over the subset lattice of colors
//!
//! Colors are pushed and popped on a stack; each level carries a union-find
//! (same packed-word layout as the center check, but with a component-size
//! counter instead of a histogram) plus a component dictionary, so adding a
//! color only merges the newly introduced vertices with their in-set
//! neighbours. Every subset with size in range is visited exactly once.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use crate::decompose::{build_tdd, SweepParams, SweepVisitor};
use crate::error::Result;
use crate::graph::{Color, Coloring, Graph, Vertex};

type Word = usize;

const TYPE_MASK: Word = 0b11;
const TYPE_ROOT: Word = 0b01;
const TYPE_CHILD: Word = 0b10;

pub struct DfsSweep<'a> {
    g: &'a Graph,
    coloring: &'a Coloring,
    params: SweepParams,
    color_nodes: HashMap<Color, BTreeSet<Vertex>>,
    colors_in_combi: BTreeSet<Color>,
    union_find: Vec<Vec<Word>>,
    component_store: Vec<BTreeMap<Vertex, BTreeSet<Vertex>>>,
    n: usize,
}

impl<'a> DfsSweep<'a> {
    pub fn new(g: &'a Graph, coloring: &'a Coloring, params: SweepParams) -> Self {
        let mut color_nodes: HashMap<Color, BTreeSet<Vertex>> = HashMap::new();
        for v in g.vertices() {
            if let Some(c) = coloring.get(v) {
                color_nodes.entry(c).or_insert_with(BTreeSet::new).insert(v);
            }
        }
        let n = g.max_id().map(|m| m + 1).unwrap_or(0);
        DfsSweep {
            g,
            coloring,
            params,
            color_nodes,
            colors_in_combi: BTreeSet::new(),
            union_find: Vec::new(),
            component_store: Vec::new(),
            n,
        }
    }

    pub fn run(&mut self, visitor: &mut dyn SweepVisitor) -> Result<()> {
        let colors: Vec<Color> = self.coloring.colors().iter().copied().collect();
        self.walk(&colors, 0, visitor)
    }

    fn walk(
        &mut self,
        colors: &[Color],
        next_index: usize,
        visitor: &mut dyn SweepVisitor,
    ) -> Result<()> {
        if self.colors_in_combi.len() + 1 == self.params.p {
            // the next color completes a maximal set: no recursion below
            for index in next_index..colors.len() {
                self.add(colors[index]);
                self.visit(visitor)?;
                self.remove(colors[index]);
            }
            return Ok(());
        }

        for index in next_index..colors.len() {
            self.add(colors[index]);
            if self.colors_in_combi.len() >= self.params.td_h {
                self.visit(visitor)?;
            }
            self.walk(colors, index + 1, visitor)?;
            self.remove(colors[index]);
        }
        Ok(())
    }

    fn visit(&mut self, visitor: &mut dyn SweepVisitor) -> Result<()> {
        trace!(colors = ?self.colors_in_combi, "color set");
        visitor.begin_color_set(&self.colors_in_combi);

        let comps = self.component_store.last().cloned().unwrap_or_default();
        for component in comps.values() {
            if component.len() < self.params.min_size {
                continue;
            }
            let classes = self.g.color_classes(component, self.coloring);
            let tdd = build_tdd(self.g, component, &classes, self.coloring)?;
            visitor.decomposition(tdd)?;
        }

        visitor.end_color_set(&self.colors_in_combi);
        Ok(())
    }

    /// Push one color: introduce its vertices as singleton components, then
    /// union them with their in-set neighbours.
    fn add(&mut self, color: Color) {
        self.colors_in_combi.insert(color);
        let depth = self.union_find.len();
        let fresh: BTreeSet<Vertex> = self
            .color_nodes
            .get(&color)
            .cloned()
            .unwrap_or_default();

        let (mut ufs, mut comps) = if depth == 0 {
            (vec![0; self.n], BTreeMap::new())
        } else {
            (
                self.union_find[depth - 1].clone(),
                self.component_store[depth - 1].clone(),
            )
        };

        for &v in &fresh {
            ufs[v] = (1 << 2) | TYPE_ROOT;
            comps.insert(v, {
                let mut single = BTreeSet::new();
                single.insert(v);
                single
            });
        }

        if depth > 0 {
            for &v in &fresh {
                for &u in self.g.neighbours(v) {
                    let in_set = self
                        .coloring
                        .get(u)
                        .map(|c| self.colors_in_combi.contains(&c))
                        .unwrap_or(false);
                    if !in_set {
                        continue;
                    }
                    let root1 = find(&mut ufs, v);
                    let root2 = find(&mut ufs, u);
                    if root1 == root2 {
                        continue;
                    }
                    let size1 = ufs[root1] >> 2;
                    let size2 = ufs[root2] >> 2;
                    // union by size: append the smaller component
                    let (a, d) = if size1 > size2 {
                        (root1, root2)
                    } else {
                        (root2, root1)
                    };
                    ufs[a] = ((size1 + size2) << 2) | TYPE_ROOT;
                    ufs[d] = TYPE_CHILD | (a << 2);
                    if let Some(moved) = comps.remove(&d) {
                        comps.get_mut(&a).unwrap().extend(moved);
                    }
                }
            }
        }

        self.union_find.push(ufs);
        self.component_store.push(comps);
    }

    /// Pop one color: drop a level of the union-find and component stacks.
    fn remove(&mut self, color: Color) {
        self.component_store.pop();
        self.union_find.pop();
        self.colors_in_combi.remove(&color);
    }
}

fn find(ufs: &mut [Word], node: Vertex) -> Vertex {
    let start = node;
    let mut node = node;
    let mut hops = 0;
    while ufs[node] & TYPE_MASK == TYPE_CHILD {
        node = ufs[node] >> 2;
        hops += 1;
    }
    if ufs[start] & TYPE_MASK == TYPE_CHILD && hops > 1 {
        ufs[start] = TYPE_CHILD | (node << 2);
    }
    node
}
