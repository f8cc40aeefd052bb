//! Degree-trimming preprocessors
//!
//! Heuristic: vertices of extreme degree are pulled out before the coloring
//! stage and re-colored afterwards, shrinking the graph the expensive center
//! checks run on. Zero-degree vertices can reuse any color; pendant and
//! high-degree vertices each get fresh classes on restore.

use std::collections::BTreeSet;

use crate::graph::{Coloring, Graph, Vertex};

/// Which preprocessor the coloring stage applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessKind {
    TrimHighDegree,
    TrimLowAndHighDegree,
}

/// Re-coloring step that undoes a trim.
#[derive(Debug, Clone)]
pub struct TrimRestore {
    zero_degree: Vec<Vertex>,
    one_degree: Vec<Vertex>,
    high_degree: Vec<Vertex>,
}

impl PreprocessKind {
    /// Split off the trimmed subgraph plus the restore step.
    pub fn trim(self, g: &Graph) -> (Graph, TrimRestore) {
        match self {
            PreprocessKind::TrimHighDegree => trim_high_degree(g),
            PreprocessKind::TrimLowAndHighDegree => trim_low_and_high_degree(g),
        }
    }
}

fn threshold(n: usize) -> usize {
    ((n as f64).sqrt().sqrt() + 0.5) as usize * 4
}

fn trim_high_degree(g: &Graph) -> (Graph, TrimRestore) {
    let thres = threshold(g.len());

    let mut zero_degree = Vec::new();
    let mut small_degree = BTreeSet::new();
    let mut high_degree = Vec::new();
    for v in g.vertices() {
        let deg = g.degree(v);
        if deg == 0 {
            zero_degree.push(v);
        } else if deg < thres {
            small_degree.insert(v);
        } else {
            high_degree.push(v);
        }
    }

    (
        g.subgraph(&small_degree),
        TrimRestore {
            zero_degree,
            one_degree: Vec::new(),
            high_degree,
        },
    )
}

fn trim_low_and_high_degree(g: &Graph) -> (Graph, TrimRestore) {
    let thres = threshold(g.len());

    let mut zero_degree = Vec::new();
    let mut one_degree = Vec::new();
    let mut small_degree = BTreeSet::new();
    let mut high_degree = Vec::new();
    for v in g.vertices() {
        let deg = g.degree(v);
        if deg == 0 {
            zero_degree.push(v);
        } else if deg == 1 {
            // keep isolated edges: trimming both ends would orphan them
            let u = *g.neighbours(v).iter().next().unwrap();
            if g.degree(u) > 1 {
                one_degree.push(v);
            } else {
                small_degree.insert(v);
            }
        } else if deg < thres {
            small_degree.insert(v);
        } else {
            high_degree.push(v);
        }
    }

    (
        g.subgraph(&small_degree),
        TrimRestore {
            zero_degree,
            one_degree,
            high_degree,
        },
    )
}

impl TrimRestore {
    /// Color the trimmed vertices back in and renormalize.
    pub fn restore(&self, mut coloring: Coloring) -> Coloring {
        for &v in &self.zero_degree {
            coloring.set(v, 0);
        }
        if !self.one_degree.is_empty() {
            let one_color = coloring.num_colors();
            for &v in &self.one_degree {
                coloring.set(v, one_color);
            }
        }
        for &v in &self.high_degree {
            // each high-degree vertex becomes its own class
            let fresh = coloring.num_colors();
            coloring.set(v, fresh);
        }
        coloring.normalize()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trim_keeps_small_degrees_and_restores_the_rest() {
        // hub 0 attached to everyone, pendant 9 attached to 1, isolated 10
        let mut g = Graph::new();
        for v in 1..9 {
            g.add_edge(0, v);
        }
        for v in 1..8 {
            g.add_edge(v, v + 1);
        }
        g.add_edge(1, 9);
        g.add_node(10);

        let (trimmed, restore) = PreprocessKind::TrimLowAndHighDegree.trim(&g);
        assert!(!trimmed.contains(0), "hub should be trimmed");
        assert!(!trimmed.contains(9), "pendant should be trimmed");
        assert!(!trimmed.contains(10));

        let mut col = Coloring::new();
        for v in trimmed.vertices() {
            col.set(v, v % 3);
        }
        let restored = restore.restore(col);
        for v in g.vertices() {
            assert!(restored.contains(v), "vertex {} lost its color", v);
        }
        // the hub sits in a class of its own
        let hub_color = restored.get(0).unwrap();
        for v in g.vertices().filter(|&v| v != 0) {
            assert_ne!(restored.get(v), Some(hub_color));
        }
    }

    #[test]
    fn isolated_edges_survive_the_low_trim() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        let (trimmed, _) = PreprocessKind::TrimLowAndHighDegree.trim(&g);
        assert_eq!(trimmed.len(), 2);
    }
}
