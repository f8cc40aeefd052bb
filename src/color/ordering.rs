//! Vertex orderings and color choosers for the coloring heuristics

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use priority_queue::PriorityQueue;

use crate::graph::{Color, Coloring, Graph, Vertex};

/// Vertex orderings that feed the common color-by-ordering driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingKind {
    /// Any fixed order; vertices are taken by increasing id.
    Greedy,
    /// Highest residual degree first.
    MaxDeg,
    /// Most distinct neighbour colors first, ties by degree.
    Dsatur,
}

/// How a vertex picks its color among the admissible ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChooser {
    NextFree,
    LeastUsed,
    MostUsed,
}

impl ColorChooser {
    fn choose(self, neigh_cols: &BTreeMap<Color, usize>, used_cols: &BTreeMap<Color, usize>) -> Color {
        match self {
            ColorChooser::NextFree => next_free_color(neigh_cols),
            ColorChooser::LeastUsed => {
                let candidate = used_cols
                    .iter()
                    .filter(|(c, _)| !neigh_cols.contains_key(c))
                    .min_by_key(|&(&c, &n)| (n, c))
                    .map(|(&c, _)| c);
                candidate.unwrap_or_else(|| next_free_color(neigh_cols))
            }
            ColorChooser::MostUsed => {
                let candidate = used_cols
                    .iter()
                    .filter(|(c, _)| !neigh_cols.contains_key(c))
                    .max_by_key(|&(&c, &n)| (n, Reverse(c)))
                    .map(|(&c, _)| c);
                candidate.unwrap_or_else(|| next_free_color(neigh_cols))
            }
        }
    }
}

fn next_free_color(neigh_cols: &BTreeMap<Color, usize>) -> Color {
    (0..=neigh_cols.len()).find(|c| !neigh_cols.contains_key(c)).unwrap()
}

/// Color every vertex of `graph` in the order produced by `ordering`, with
/// `chooser` picking each vertex's color among those its neighbours avoid.
pub fn color_by_ordering(graph: &Graph, ordering: OrderingKind, chooser: ColorChooser) -> Coloring {
    let mut order: Box<dyn VertexOrder> = match ordering {
        OrderingKind::Greedy => Box::new(IdOrder::new(graph)),
        OrderingKind::MaxDeg => Box::new(MaxDegOrder::new(graph)),
        OrderingKind::Dsatur => Box::new(DsaturOrder::new(graph)),
    };

    let mut cols = Coloring::new();
    let mut used_cols: BTreeMap<Color, usize> = BTreeMap::new();
    let mut remaining = graph.len();

    while remaining > 0 {
        let v = order.next_vertex(&cols, graph);
        let mut neighbour_cols: BTreeMap<Color, usize> = BTreeMap::new();
        for &w in graph.neighbours(v) {
            if let Some(c) = cols.get(w) {
                *neighbour_cols.entry(c).or_insert(0) += 1;
            }
        }
        let c = chooser.choose(&neighbour_cols, &used_cols);
        cols.set(v, c);
        *used_cols.entry(c).or_insert(0) += 1;
        order.colored(v, c, &cols, graph);
        remaining -= 1;
    }
    cols
}

trait VertexOrder {
    fn next_vertex(&mut self, coloring: &Coloring, graph: &Graph) -> Vertex;
    fn colored(&mut self, _v: Vertex, _c: Color, _coloring: &Coloring, _graph: &Graph) {}
}

struct IdOrder {
    pending: std::vec::IntoIter<Vertex>,
}

impl IdOrder {
    fn new(graph: &Graph) -> Self {
        let order: Vec<Vertex> = graph.vertices().collect();
        IdOrder {
            pending: order.into_iter(),
        }
    }
}

impl VertexOrder for IdOrder {
    fn next_vertex(&mut self, _coloring: &Coloring, _graph: &Graph) -> Vertex {
        self.pending.next().unwrap()
    }
}

/// Buckets keyed by residual degree, popped from the top.
struct MaxDegOrder {
    buckets: Vec<BTreeSet<Vertex>>,
    degrees: HashMap<Vertex, usize>,
    maxdeg: usize,
}

impl MaxDegOrder {
    fn new(graph: &Graph) -> Self {
        let mut buckets: Vec<BTreeSet<Vertex>> = Vec::new();
        let mut degrees = HashMap::new();
        let mut maxdeg = 0;
        for v in graph.vertices() {
            let d = graph.degree(v);
            if d >= buckets.len() {
                buckets.resize_with(d + 1, BTreeSet::new);
            }
            buckets[d].insert(v);
            degrees.insert(v, d);
            maxdeg = maxdeg.max(d);
        }
        MaxDegOrder {
            buckets,
            degrees,
            maxdeg,
        }
    }
}

impl VertexOrder for MaxDegOrder {
    fn next_vertex(&mut self, _coloring: &Coloring, graph: &Graph) -> Vertex {
        let mut d = self.maxdeg;
        while self.buckets[d].is_empty() {
            d -= 1;
        }
        let v = *self.buckets[d].iter().next().unwrap();
        self.buckets[d].remove(&v);
        self.maxdeg = d;

        for &w in graph.neighbours(v) {
            if let Some(&dw) = self.degrees.get(&w) {
                if w == v {
                    continue;
                }
                self.buckets[dw].remove(&w);
                self.buckets[dw.saturating_sub(1)].insert(w);
                self.degrees.insert(w, dw.saturating_sub(1));
            }
        }
        self.degrees.remove(&v);
        v
    }
}

/// Saturation-degree ordering; the queue tracks how many distinct colors
/// each uncolored vertex sees, with degree breaking ties.
struct DsaturOrder {
    queue: PriorityQueue<Vertex, (usize, usize)>,
    seen_cols: HashMap<Vertex, HashSet<Color>>,
}

impl DsaturOrder {
    fn new(graph: &Graph) -> Self {
        let mut queue = PriorityQueue::new();
        let mut seen_cols = HashMap::new();
        for v in graph.vertices() {
            queue.push(v, (0, graph.degree(v)));
            seen_cols.insert(v, HashSet::new());
        }
        DsaturOrder { queue, seen_cols }
    }
}

impl VertexOrder for DsaturOrder {
    fn next_vertex(&mut self, _coloring: &Coloring, _graph: &Graph) -> Vertex {
        let (v, _) = self.queue.pop().unwrap();
        self.seen_cols.remove(&v);
        v
    }

    fn colored(&mut self, v: Vertex, c: Color, _coloring: &Coloring, graph: &Graph) {
        for &w in graph.neighbours(v) {
            if let Some(seen) = self.seen_cols.get_mut(&w) {
                if seen.insert(c) {
                    let sat = seen.len();
                    self.queue
                        .change_priority_by(&w, |prio| prio.0 = sat.max(prio.0));
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check_proper(graph: &Graph, ordering: OrderingKind, chooser: ColorChooser) -> usize {
        let cols = color_by_ordering(graph, ordering, chooser);
        assert!(cols.is_proper(graph).unwrap());
        cols.num_colors()
    }

    fn wheel6() -> Graph {
        let mut g = Graph::new();
        for v in 0..5 {
            g.add_edge(v, (v + 1) % 5);
            g.add_edge(v, 5);
        }
        g
    }

    #[test]
    fn all_orderings_produce_proper_colorings() {
        let g = wheel6();
        for &ordering in &[OrderingKind::Greedy, OrderingKind::MaxDeg, OrderingKind::Dsatur] {
            for &chooser in &[
                ColorChooser::NextFree,
                ColorChooser::LeastUsed,
                ColorChooser::MostUsed,
            ] {
                let used = check_proper(&g, ordering, chooser);
                assert!(used >= 4, "wheel needs at least 4 colors, used {}", used);
            }
        }
    }

    #[test]
    fn dsatur_two_colors_a_path() {
        let mut g = Graph::new();
        for i in 0..5 {
            g.add_edge(i, i + 1);
        }
        let used = check_proper(&g, OrderingKind::Dsatur, ColorChooser::NextFree);
        assert_eq!(used, 2);
    }

    #[test]
    fn greedy_colors_empty_graph() {
        let cols = color_by_ordering(&Graph::new(), OrderingKind::Greedy, ColorChooser::NextFree);
        assert!(cols.is_empty());
    }
}
