//! Contains all things related to graphs

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{self, Display};
use std::str::FromStr;

pub mod coloring;
pub mod formats;
pub mod patterns;
pub mod tdd;
pub mod tfgraph;

pub use coloring::Coloring;
pub use tdd::TdDecomposition;
pub use tfgraph::TfGraph;

/// Vertices are dense non-negative integers.
pub type Vertex = usize;

/// A color class identifier.
pub type Color = usize;

/// Simple undirected graph.
///
/// Stored as an adjacency container indexed by vertex id; the counting kernel
/// expects ids to be normalized to `0..n-1` before it runs, but loaders may
/// produce gaps which `normalize` closes. The neighbour relation is kept
/// symmetric at all times and self-loops are stripped by `remove_loops`
/// before a graph enters the kernel.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adj: Vec<HashSet<Vertex>>,
    nodes: BTreeSet<Vertex>,
}

impl Graph {
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, u: Vertex) -> bool {
        self.nodes.contains(&u)
    }

    /// Iterate the vertices in increasing id order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.nodes.iter().copied()
    }

    pub fn max_id(&self) -> Option<Vertex> {
        self.nodes.iter().next_back().copied()
    }

    /// Iterate the edges as `(u, v)` pairs with `u <= v`.
    pub fn edges(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.vertices().flat_map(move |u| {
            self.adj[u]
                .iter()
                .copied()
                .filter(move |&v| u <= v)
                .map(move |v| (u, v))
        })
    }

    pub fn num_edges(&self) -> usize {
        self.edges().count()
    }

    pub fn add_node(&mut self, u: Vertex) {
        self.reserve(u);
        self.nodes.insert(u);
    }

    pub fn add_nodes_from<I: IntoIterator<Item = Vertex>>(&mut self, nodes: I) {
        for u in nodes {
            self.add_node(u);
        }
    }

    fn reserve(&mut self, u: Vertex) {
        if u >= self.adj.len() {
            self.adj.resize_with(u + 1, HashSet::new);
        }
    }

    pub fn add_edge(&mut self, u: Vertex, v: Vertex) {
        self.add_node(u);
        self.add_node(v);
        self.adj[u].insert(v);
        self.adj[v].insert(u);
    }

    pub fn remove_edge(&mut self, u: Vertex, v: Vertex) {
        if u < self.adj.len() {
            self.adj[u].remove(&v);
        }
        if v < self.adj.len() {
            self.adj[v].remove(&u);
        }
    }

    /// Strip self-loops; the counting kernel assumes they are gone.
    pub fn remove_loops(&mut self) {
        let nodes: Vec<Vertex> = self.vertices().collect();
        for u in nodes {
            self.adj[u].remove(&u);
        }
    }

    pub fn adjacent(&self, u: Vertex, v: Vertex) -> bool {
        self.adj.get(u).map(|nbs| nbs.contains(&v)).unwrap_or(false)
    }

    pub fn neighbours(&self, u: Vertex) -> &HashSet<Vertex> {
        &self.adj[u]
    }

    /// All neighbours of a set of vertices, minus the set itself.
    pub fn neighbours_set(&self, centers: &BTreeSet<Vertex>) -> BTreeSet<Vertex> {
        let mut res = BTreeSet::new();
        for &v in centers {
            res.extend(self.adj[v].iter().copied());
        }
        for v in centers {
            res.remove(v);
        }
        res
    }

    pub fn degree(&self, u: Vertex) -> usize {
        self.adj[u].len()
    }

    /// Degeneracy via bucketed min-degree peeling.
    ///
    /// Runtime: `O(n + m)`
    pub fn degeneracy(&self) -> usize {
        let n = self.len();
        if n == 0 {
            return 0;
        }
        let max_id = self.max_id().unwrap_or(0);
        let mut degrees = vec![0usize; max_id + 1];
        let mut buckets: Vec<BTreeSet<Vertex>> = Vec::new();
        let mut mindeg = n;
        for v in self.vertices() {
            let d = self.degree(v);
            mindeg = mindeg.min(d);
            if d >= buckets.len() {
                buckets.resize_with(d + 1, BTreeSet::new);
            }
            buckets[d].insert(v);
            degrees[v] = d;
        }

        let mut removed: HashSet<Vertex> = HashSet::new();
        let mut degen = 0;
        while removed.len() < n {
            while buckets[mindeg].is_empty() {
                mindeg += 1;
            }
            let v = *buckets[mindeg].iter().next().unwrap();
            buckets[mindeg].remove(&v);
            removed.insert(v);
            degen = degen.max(mindeg);

            for &w in &self.adj[v] {
                if removed.contains(&w) {
                    continue;
                }
                let d = degrees[w];
                buckets[d].remove(&w);
                buckets[d - 1].insert(w);
                degrees[w] = d - 1;
                mindeg = mindeg.min(d - 1);
            }
        }
        degen
    }

    /// The subgraph induced on the given vertices.
    pub fn subgraph(&self, vertices: &BTreeSet<Vertex>) -> Graph {
        let mut res = Graph::new();
        for &v in vertices {
            if self.contains(v) {
                res.add_node(v);
            }
        }
        for (u, v) in self.edges() {
            if vertices.contains(&u) && vertices.contains(&v) {
                res.add_edge(u, v);
            }
        }
        res
    }

    /// Relabel the vertices to `0..n-1`.
    ///
    /// Returns the renamed graph together with the back-mapping from new ids
    /// to the original ones.
    pub fn normalize(&self) -> (Graph, Vec<Vertex>) {
        let backmapping: Vec<Vertex> = self.vertices().collect();
        let mapping: HashMap<Vertex, Vertex> = backmapping
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new))
            .collect();

        let mut res = Graph::new();
        for v in self.vertices() {
            res.add_node(mapping[&v]);
        }
        for (u, v) in self.edges() {
            res.add_edge(mapping[&u], mapping[&v]);
        }
        (res, backmapping)
    }

    /// Connected components of the subgraph induced on `vertices`.
    pub fn components(&self, vertices: &BTreeSet<Vertex>) -> Vec<BTreeSet<Vertex>> {
        let mut remaining = vertices.clone();
        let mut res = Vec::new();
        while let Some(&start) = remaining.iter().next() {
            let mut comp: BTreeSet<Vertex> = BTreeSet::new();
            comp.insert(start);
            loop {
                let exp: BTreeSet<Vertex> = self
                    .neighbours_set(&comp)
                    .intersection(&remaining)
                    .copied()
                    .collect();
                if exp.is_empty() {
                    break;
                }
                comp.extend(exp);
                for v in &comp {
                    remaining.remove(v);
                }
            }
            for v in &comp {
                remaining.remove(v);
            }
            res.push(comp);
        }
        res
    }

    /// Group `vertices` into color classes under `coloring`.
    pub fn color_classes(
        &self,
        vertices: &BTreeSet<Vertex>,
        coloring: &Coloring,
    ) -> HashMap<Color, BTreeSet<Vertex>> {
        let mut classes: HashMap<Color, BTreeSet<Vertex>> = HashMap::new();
        for &v in vertices {
            if let Some(c) = coloring.get(v) {
                classes.entry(c).or_insert_with(BTreeSet::new).insert(v);
            }
        }
        classes
    }
}

impl FromStr for Graph {
    type Err = std::num::ParseIntError;

    /// Parse an adjacency-list description of the form `v: n1,n2,...`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut graph = Graph::new();
        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut split = line.splitn(2, ':');
            let vertex: Vertex = split.next().unwrap_or("").trim().parse()?;
            graph.add_node(vertex);
            if let Some(rest) = split.next() {
                for nb in rest.split(',') {
                    let nb = nb.trim();
                    if nb.is_empty() {
                        continue;
                    }
                    graph.add_edge(vertex, nb.parse()?);
                }
            }
        }
        Ok(graph)
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use itertools::Itertools;
        for v in self.vertices() {
            let nbs = self.adj[v].iter().sorted().join(",");
            writeln!(f, "{}: {}", v, nbs)?;
        }
        Ok(())
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        if self.nodes != other.nodes {
            return false;
        }
        self.vertices().all(|v| self.adj[v] == other.adj[v])
    }
}

impl Eq for Graph {}
