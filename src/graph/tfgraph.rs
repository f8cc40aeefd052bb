//! Oriented graphs for the augmentation stage

use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;

use crate::graph::{Graph, Vertex};

/// Augmentation weights; the weight of an arc is the step at which it was
/// introduced.
pub type Weight = usize;

/// Oriented graph with weighted arcs and a per-weight in-neighbour index.
///
/// Holds at most one arc per ordered vertex pair; the node set is fixed at
/// construction and always equals the host graph's vertices. The index makes
/// `in_neighbours_weight` a direct lookup, which the truncated augmentation
/// leans on to enumerate exactly the depth-i triples.
#[derive(Debug, Clone)]
pub struct TfGraph {
    nodes: BTreeSet<Vertex>,
    inarcs: Vec<HashMap<Vertex, Weight>>,
    inarcs_weight: Vec<BTreeMap<Weight, BTreeSet<Vertex>>>,
}

impl TfGraph {
    pub fn new(nodes: BTreeSet<Vertex>) -> Self {
        let size = nodes.iter().next_back().map(|&m| m + 1).unwrap_or(0);
        TfGraph {
            nodes,
            inarcs: vec![HashMap::new(); size],
            inarcs_weight: vec![BTreeMap::new(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, u: Vertex) -> bool {
        self.nodes.contains(&u)
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.nodes.iter().copied()
    }

    /// Add the arc `u -> v`.
    pub fn add_arc(&mut self, u: Vertex, v: Vertex, weight: Weight) {
        self.inarcs[v].insert(u, weight);
        self.inarcs_weight[v]
            .entry(weight)
            .or_insert_with(BTreeSet::new)
            .insert(u);
    }

    /// Remove the arc `u -> v` if present.
    pub fn remove_arc(&mut self, u: Vertex, v: Vertex) {
        if let Some(weight) = self.inarcs[v].remove(&u) {
            if let Some(set) = self.inarcs_weight[v].get_mut(&weight) {
                set.remove(&u);
            }
        }
    }

    /// Whether the arc `u -> v` exists.
    pub fn adjacent(&self, u: Vertex, v: Vertex) -> bool {
        self.inarcs[v].contains_key(&u)
    }

    pub fn weight(&self, u: Vertex, v: Vertex) -> Option<Weight> {
        self.inarcs[v].get(&u).copied()
    }

    /// Iterate all arcs as `(source, target, weight)`.
    pub fn arcs(&self) -> impl Iterator<Item = (Vertex, Vertex, Weight)> + '_ {
        self.vertices()
            .flat_map(move |u| self.inarcs[u].iter().map(move |(&v, &w)| (v, u, w)))
    }

    pub fn in_neighbours(&self, u: Vertex) -> impl Iterator<Item = (Vertex, Weight)> + '_ {
        self.inarcs[u].iter().map(|(&v, &w)| (v, w))
    }

    pub fn in_neighbours_weight(&self, u: Vertex, weight: Weight) -> impl Iterator<Item = Vertex> + '_ {
        self.inarcs_weight[u]
            .get(&weight)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn in_degree(&self, u: Vertex) -> usize {
        self.inarcs[u].len()
    }

    /// Undirected projection, keeping degree-0 vertices.
    pub fn undirected(&self) -> Graph {
        let mut res = Graph::new();
        for v in self.vertices() {
            res.add_node(v);
        }
        for (u, v, _) in self.arcs() {
            res.add_edge(u, v);
        }
        res
    }

    /// Transitive triples through `u`: pairs with arcs `x -> y` and `y -> u`
    /// but no arc `x -> u`, yielded as `(x, u, weightsum)`.
    pub fn trans_trips(&self, u: Vertex) -> Vec<(Vertex, Vertex, Weight)> {
        let mut res = Vec::new();
        for (y, wy) in self.in_neighbours(u) {
            for (x, wx) in self.in_neighbours(y) {
                if !self.adjacent(x, u) {
                    res.push((x, u, wx + wy));
                }
            }
        }
        res
    }

    /// Transitive triples through `u` whose weight sum is exactly `weight`.
    pub fn trans_trips_weight(&self, u: Vertex, weight: Weight) -> Vec<(Vertex, Vertex, Weight)> {
        let mut res = Vec::new();
        for wy in 1..weight {
            let wx = weight - wy;
            for y in self.in_neighbours_weight(u, wy).collect::<Vec<_>>() {
                for x in self.in_neighbours_weight(y, wx) {
                    if !self.adjacent(x, u) {
                        res.push((x, u, weight));
                    }
                }
            }
        }
        res
    }

    /// Fraternal triples at `u`: in-neighbour pairs `{x, y}` with no arc
    /// between them in either direction.
    pub fn frat_trips(&self, u: Vertex) -> Vec<(Vertex, Vertex, Weight)> {
        let inbs: Vec<(Vertex, Weight)> = self.in_neighbours(u).collect();
        inbs.iter()
            .tuple_combinations()
            .filter(|&(&(x, _), &(y, _))| !(self.adjacent(x, y) || self.adjacent(y, x)))
            .map(|(&(x, wx), &(y, wy))| (x, y, wx + wy))
            .collect()
    }

    /// Fraternal triples at `u` whose weight sum is exactly `weight`.
    ///
    /// The two in-neighbours are drawn from in-arc sets of different weights,
    /// which are disjoint; only even weights need the `(weight/2, weight/2)`
    /// pairing inside a single set.
    pub fn frat_trips_weight(&self, u: Vertex, weight: Weight) -> Vec<(Vertex, Vertex, Weight)> {
        let mut res = Vec::new();
        let wh = (weight + 1) / 2;
        for wx in 1..wh {
            let wy = weight - wx;
            for x in self.in_neighbours_weight(u, wx) {
                for y in self.in_neighbours_weight(u, wy) {
                    if !(self.adjacent(x, y) || self.adjacent(y, x)) {
                        res.push((x, y, weight));
                    }
                }
            }
        }

        if weight % 2 == 0 {
            let inbs: Vec<Vertex> = self.in_neighbours_weight(u, wh).collect();
            for (&x, &y) in inbs.iter().tuple_combinations() {
                if !(self.adjacent(x, y) || self.adjacent(y, x)) {
                    res.push((x, y, weight));
                }
            }
        }
        res
    }
}
