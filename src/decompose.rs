//! Color-set sweeps feeding treedepth decompositions to the counter

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::graph::{Color, Coloring, Graph, TdDecomposition, Vertex};

pub mod combinations;
pub mod dfs;

pub use combinations::CombinationsSweep;
pub use dfs::DfsSweep;

/// Which sweep strategy enumerates the color sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    Combinations,
    Dfs,
}

/// Shared sweep parameters.
#[derive(Debug, Clone, Copy)]
pub struct SweepParams {
    /// Upper bound on the color-set size (the pattern size).
    pub p: usize,
    /// Lower bound on the color-set size (treedepth bound of the pattern).
    pub td_h: usize,
    /// Components smaller than this cannot hold the pattern and are pruned.
    pub min_size: usize,
}

/// Callbacks a sweep drives while walking color space.
///
/// For every color set the sweep brackets the decompositions of that set's
/// components between `begin_color_set` and `end_color_set`.
pub trait SweepVisitor {
    fn begin_color_set(&mut self, colors: &BTreeSet<Color>);
    fn decomposition(&mut self, tdd: TdDecomposition) -> Result<()>;
    fn end_color_set(&mut self, colors: &BTreeSet<Color>);
}

impl SweepKind {
    /// Walk all color sets of size `td_h ..= p`, building a treedepth
    /// decomposition for every large-enough component.
    pub fn run(
        self,
        g: &Graph,
        coloring: &Coloring,
        params: SweepParams,
        visitor: &mut dyn SweepVisitor,
    ) -> Result<()> {
        match self {
            SweepKind::Combinations => CombinationsSweep::new(g, coloring, params).run(visitor),
            SweepKind::Dfs => DfsSweep::new(g, coloring, params).run(visitor),
        }
    }
}

/// Build the rooted forest for one component, guided by the coloring.
///
/// In a connected subgraph on at most p color classes of a p-centered
/// coloring some color occurs exactly once; that vertex roots the subtree
/// and the recursion continues on the components left after removing it.
/// Failing to find a center here means the coloring or the sweep is broken,
/// not the input.
pub fn build_tdd(
    g: &Graph,
    component: &BTreeSet<Vertex>,
    color_classes: &HashMap<Color, BTreeSet<Vertex>>,
    coloring: &Coloring,
) -> Result<TdDecomposition> {
    let mut decomp = TdDecomposition::from_subgraph(g, component, coloring);
    let mut vertices = component.clone();
    build_subtree(g, &mut decomp, &mut vertices, color_classes, coloring, None)?;
    Ok(decomp)
}

fn build_subtree(
    g: &Graph,
    decomp: &mut TdDecomposition,
    vertices: &mut BTreeSet<Vertex>,
    color_classes: &HashMap<Color, BTreeSet<Vertex>>,
    coloring: &Coloring,
    parent: Option<Vertex>,
) -> Result<()> {
    let freqs = coloring.frequencies(Some(vertices));

    if freqs.len() == 2 {
        // two colors left: the singleton color names the root directly and
        // everything else hangs below it in one batch
        let some_vertex = *vertices.iter().next().unwrap();
        let some_color = coloring.get(some_vertex).unwrap();
        let root = if freqs[&some_color] == 1 {
            some_vertex
        } else {
            let center_color = *freqs.keys().find(|&&c| c != some_color).unwrap();
            if freqs[&center_color] != 1 {
                return Err(Error::Internal(
                    "no center found while building a treedepth decomposition".into(),
                ));
            }
            *color_classes[&center_color]
                .intersection(vertices)
                .next()
                .ok_or_else(|| Error::Internal("color class lost its vertices".into()))?
        };
        decomp.update_parent_child(root, parent);
        vertices.remove(&root);
        decomp.update_parent_children(vertices, root);
        return Ok(());
    }

    // find the color occurring exactly once; its vertex is the center
    let mut colors: Vec<Color> = color_classes.keys().copied().collect();
    colors.sort_unstable();
    for color in colors {
        let v_set = &color_classes[&color];
        let mut remaining = v_set.intersection(vertices);
        let candidate = match remaining.next() {
            Some(&v) => v,
            None => continue,
        };
        if remaining.next().is_some() {
            continue;
        }

        decomp.update_parent_child(candidate, parent);
        vertices.remove(&candidate);
        let rest = std::mem::take(vertices);
        for comp in g.components(&rest) {
            let mut comp_vertices = comp;
            build_subtree(
                g,
                decomp,
                &mut comp_vertices,
                color_classes,
                coloring,
                Some(candidate),
            )?;
        }
        return Ok(());
    }

    Err(Error::Internal(
        "no center found while building a treedepth decomposition".into(),
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    fn coloring_of(pairs: &[(Vertex, Color)]) -> Coloring {
        let mut col = Coloring::new();
        for &(v, c) in pairs {
            col.set(v, c);
        }
        col
    }

    /// Every edge of the component must join an ancestor-descendant pair.
    fn assert_tdd_valid(tdd: &TdDecomposition) {
        tdd.check_consistency().unwrap();
        for (u, v) in tdd.graph().edges() {
            let pu = tdd.root_path(u);
            let pv = tdd.root_path(v);
            assert!(
                pu.contains(&v) || pv.contains(&u),
                "edge ({}, {}) is not ancestor-descendant",
                u,
                v
            );
        }
    }

    #[test]
    fn builds_a_path_decomposition() {
        // path 0-1-2 with center color on 1
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let col = coloring_of(&[(0, 0), (1, 1), (2, 0)]);
        let component: BTreeSet<_> = g.vertices().collect();
        let classes = g.color_classes(&component, &col);
        let tdd = build_tdd(&g, &component, &classes, &col).unwrap();
        assert_eq!(tdd.root(), Some(1));
        assert_eq!(tdd.depth(), 2);
        assert_tdd_valid(&tdd);
    }

    #[test]
    fn two_color_fast_path_roots_the_singleton() {
        // star with a unique hub color
        let mut g = Graph::new();
        for v in 1..5 {
            g.add_edge(0, v);
        }
        let col = coloring_of(&[(0, 1), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let component: BTreeSet<_> = g.vertices().collect();
        let classes = g.color_classes(&component, &col);
        let tdd = build_tdd(&g, &component, &classes, &col).unwrap();
        assert_eq!(tdd.root(), Some(0));
        assert_eq!(tdd.depth(), 2);
        assert_tdd_valid(&tdd);
    }

    #[test]
    fn deeper_recursion_splits_components() {
        // path of five vertices, centered coloring 0-1-2-1-0
        let mut g = Graph::new();
        for i in 0..4 {
            g.add_edge(i, i + 1);
        }
        let col = coloring_of(&[(0, 0), (1, 1), (2, 2), (3, 1), (4, 0)]);
        let component: BTreeSet<_> = g.vertices().collect();
        let classes = g.color_classes(&component, &col);
        let tdd = build_tdd(&g, &component, &classes, &col).unwrap();
        assert_eq!(tdd.root(), Some(2));
        assert_eq!(tdd.depth(), 3);
        assert_tdd_valid(&tdd);
    }

    #[test]
    fn missing_center_is_an_internal_error() {
        // alternating path has no center on two colors
        let mut g = Graph::new();
        for i in 0..3 {
            g.add_edge(i, i + 1);
        }
        let col = coloring_of(&[(0, 0), (1, 1), (2, 0), (3, 1)]);
        let component: BTreeSet<_> = g.vertices().collect();
        let classes = g.color_classes(&component, &col);
        assert!(build_tdd(&g, &component, &classes, &col).is_err());
    }
}
