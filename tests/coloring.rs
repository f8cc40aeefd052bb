//! Coloring-stage invariants checked against the definitions directly

use std::collections::BTreeSet;

use itertools::Itertools;

use concuss::color::{CcAlgorithm, ColorChooser, OrderingKind, OrientationKind, StepKind};
use concuss::graph::{Coloring, Graph};

/// Direct definition of a centered coloring: every connected component
/// induced by up to `p` color classes has a color appearing exactly once.
fn is_centered_by_definition(g: &Graph, coloring: &Coloring, p: usize) -> bool {
    let colors: Vec<_> = coloring.colors().iter().copied().collect();
    for size in 1..=p.min(colors.len()) {
        for combo in colors.iter().copied().combinations(size) {
            let color_set: BTreeSet<_> = combo.into_iter().collect();
            let vertices = coloring.select(&color_set);
            for component in g.components(&vertices) {
                let freqs = coloring.frequencies(Some(&component));
                if !freqs.values().any(|&count| count == 1) {
                    return false;
                }
            }
        }
    }
    true
}

fn petersen() -> Graph {
    let mut g = Graph::new();
    let outer = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
    let inner = [(5, 7), (7, 9), (9, 6), (6, 8), (8, 5)];
    for &(u, v) in outer.iter().chain(inner.iter()) {
        g.add_edge(u, v);
    }
    for i in 0..5 {
        g.add_edge(i, i + 5);
    }
    g
}

fn grid(rows: usize, cols: usize) -> Graph {
    let mut g = Graph::new();
    let id = |r: usize, c: usize| r * cols + c;
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                g.add_edge(id(r, c), id(r, c + 1));
            }
            if r + 1 < rows {
                g.add_edge(id(r, c), id(r + 1, c));
            }
        }
    }
    g
}

#[test]
fn petersen_coloring_is_proper_and_centered() {
    let g = petersen();
    for p in 2..=4 {
        let coloring = CcAlgorithm::default().start(&g, p).unwrap();
        assert!(coloring.is_proper(&g).unwrap());
        assert!(
            is_centered_by_definition(&g, &coloring, p),
            "coloring not {}-centered",
            p
        );
    }
}

#[test]
fn grid_coloring_is_proper_and_centered() {
    let g = grid(4, 4);
    let coloring = CcAlgorithm::default().start(&g, 3).unwrap();
    assert!(coloring.is_proper(&g).unwrap());
    assert!(is_centered_by_definition(&g, &coloring, 3));
}

#[test]
fn alternative_stages_stay_centered() {
    let g = grid(3, 4);
    let algo = CcAlgorithm {
        orientation: OrientationKind::Sandpile,
        step: StepKind::TruncatedTf,
        ordering: OrderingKind::Dsatur,
        chooser: ColorChooser::LeastUsed,
        optimize: true,
        preprocess: None,
    };
    let coloring = algo.start(&g, 3).unwrap();
    assert!(coloring.is_proper(&g).unwrap());
    assert!(is_centered_by_definition(&g, &coloring, 3));
}

#[test]
fn disconnected_hosts_are_fine() {
    let mut g = petersen();
    g.add_edge(20, 21);
    g.add_node(25);
    let coloring = CcAlgorithm::default().start(&g, 3).unwrap();
    assert!(coloring.is_proper(&g).unwrap());
    assert!(is_centered_by_definition(&g, &coloring, 3));
}
