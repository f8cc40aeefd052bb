//! Vertex colorings and the operations the kernel needs on them

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::graph::{Color, Graph, Vertex};

/// Partial map from vertices to colors, plus the set of colors in use.
///
/// A coloring produced by the coloring stage is proper and p-centered; the
/// type itself enforces neither, the checks live in `is_proper` and
/// `color::center_check`.
#[derive(Debug, Clone, Default)]
pub struct Coloring {
    color: HashMap<Vertex, Color>,
    used: BTreeSet<Color>,
}

impl Coloring {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, v: Vertex) -> Option<Color> {
        self.color.get(&v).copied()
    }

    pub fn set(&mut self, v: Vertex, c: Color) {
        self.used.insert(c);
        self.color.insert(v, c);
    }

    pub fn contains(&self, v: Vertex) -> bool {
        self.color.contains_key(&v)
    }

    /// Number of colors actually used.
    pub fn num_colors(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    /// The set of colors in use.
    pub fn colors(&self) -> &BTreeSet<Color> {
        &self.used
    }

    /// Iterate the colored vertices in increasing id order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        let mut vs: Vec<Vertex> = self.color.keys().copied().collect();
        vs.sort_unstable();
        vs.into_iter()
    }

    /// All vertices wearing one of the given colors.
    pub fn select(&self, colors: &BTreeSet<Color>) -> BTreeSet<Vertex> {
        self.color
            .iter()
            .filter(|(_, c)| colors.contains(c))
            .map(|(&v, _)| v)
            .collect()
    }

    /// Frequency histogram of the colors on `vertices`, or on every colored
    /// vertex when `vertices` is `None`.
    pub fn frequencies(&self, vertices: Option<&BTreeSet<Vertex>>) -> BTreeMap<Color, usize> {
        let mut freqs = BTreeMap::new();
        match vertices {
            Some(vs) => {
                for &v in vs {
                    if let Some(c) = self.get(v) {
                        *freqs.entry(c).or_insert(0) += 1;
                    }
                }
            }
            None => {
                for c in self.color.values() {
                    *freqs.entry(*c).or_insert(0) += 1;
                }
            }
        }
        freqs
    }

    /// Check that every vertex of `graph` is colored and no edge joins two
    /// same-colored vertices.
    pub fn is_proper(&self, graph: &Graph) -> Result<bool> {
        for v in graph.vertices() {
            if !self.contains(v) {
                return Err(Error::InvalidColoring(format!(
                    "missing color for vertex {}",
                    v
                )));
            }
        }
        for (s, t) in graph.edges() {
            if s != t && self.color[&s] == self.color[&t] {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Relabel colors by descending frequency, most common color first.
    pub fn normalize(&self) -> Coloring {
        let freq = self.frequencies(None);
        let mut order: Vec<(Color, usize)> = freq.into_iter().collect();
        // stable on color id so equal frequencies normalize deterministically
        order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let indices: HashMap<Color, Color> = order
            .into_iter()
            .enumerate()
            .map(|(i, (c, _))| (c, i))
            .collect();

        let mut res = Coloring::new();
        for (&v, c) in &self.color {
            res.set(v, indices[c]);
        }
        res
    }
}

impl PartialEq for Coloring {
    fn eq(&self, other: &Self) -> bool {
        self.used == other.used && self.color == other.color
    }
}

impl Eq for Coloring {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn frequencies_and_select() {
        let mut col = Coloring::new();
        col.set(0, 0);
        col.set(1, 1);
        col.set(2, 0);
        assert_eq!(col.num_colors(), 2);
        let freqs = col.frequencies(None);
        assert_eq!(freqs[&0], 2);
        assert_eq!(freqs[&1], 1);

        let mut want = BTreeSet::new();
        want.insert(0);
        let selected = col.select(&want);
        assert!(selected.contains(&0) && selected.contains(&2) && !selected.contains(&1));
    }

    #[test]
    fn proper_detects_conflicts() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        let mut col = Coloring::new();
        col.set(0, 0);
        col.set(1, 0);
        assert!(!col.is_proper(&g).unwrap());
        col.set(1, 1);
        assert!(col.is_proper(&g).unwrap());
    }

    #[test]
    fn proper_requires_total_coloring() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        let mut col = Coloring::new();
        col.set(0, 0);
        assert!(col.is_proper(&g).is_err());
    }

    #[test]
    fn normalize_orders_by_frequency() {
        let mut col = Coloring::new();
        col.set(0, 5);
        col.set(1, 5);
        col.set(2, 5);
        col.set(3, 9);
        let norm = col.normalize();
        assert_eq!(norm.get(0), Some(0));
        assert_eq!(norm.get(3), Some(1));
        assert_eq!(norm.num_colors(), 2);
    }
}
