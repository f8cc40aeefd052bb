//! End-to-end counting scenarios checked against a brute-force oracle

use itertools::Itertools;

use concuss::color::CcAlgorithm;
use concuss::count::{count_automorphisms, CombinerKind, PatternCounter, PatternKind, TableHints};
use concuss::decompose::SweepKind;
use concuss::graph::{patterns, Graph, Vertex};

/// Count vertex subsets of `g` inducing a graph isomorphic to `h`.
fn brute_force_count(g: &Graph, h: &Graph) -> u64 {
    let hn = h.len();
    let h_vertices: Vec<Vertex> = h.vertices().collect();
    let g_vertices: Vec<Vertex> = g.vertices().collect();

    g_vertices
        .iter()
        .copied()
        .combinations(hn)
        .filter(|subset| {
            subset.iter().copied().permutations(hn).any(|perm| {
                h_vertices.iter().enumerate().all(|(i, &hu)| {
                    h_vertices.iter().enumerate().skip(i + 1).all(|(j, &hv)| {
                        h.adjacent(hu, hv) == g.adjacent(perm[i], perm[j])
                    })
                })
            })
        })
        .count() as u64
}

fn count_with(
    g: &Graph,
    h: &Graph,
    td: usize,
    pattern_kind: PatternKind,
    sweep: SweepKind,
    combiner: CombinerKind,
    hints: TableHints,
) -> u64 {
    let coloring = CcAlgorithm::default()
        .start(g, h.len())
        .expect("coloring failed");
    let mut counter = PatternCounter::new(
        g,
        &coloring,
        vec![(h.clone(), td)],
        pattern_kind,
        hints,
        sweep,
        combiner,
    )
    .expect("counter setup failed");
    counter.count_patterns().expect("counting failed")[0]
}

fn count_default(g: &Graph, h: &Graph, td: usize) -> u64 {
    count_with(
        g,
        h,
        td,
        PatternKind::MemoizedBv,
        SweepKind::Dfs,
        CombinerKind::InclusionExclusion,
        TableHints::default(),
    )
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

fn two_triangles() -> Graph {
    let mut g = Graph::new();
    for &(u, v) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
        g.add_edge(u, v);
    }
    g
}

#[test]
fn triangles_in_k4() {
    let g = patterns::clique(4);
    let h = patterns::clique(3);
    assert_eq!(brute_force_count(&g, &h), 4);
    assert_eq!(count_default(&g, &h, 3), 4);
}

#[test]
fn paths_in_a_path() {
    let g = patterns::path(5);
    let h = patterns::path(3);
    assert_eq!(brute_force_count(&g, &h), 3);
    assert_eq!(count_default(&g, &h, 2), 3);
}

#[test]
fn paths_in_a_cycle() {
    let g = patterns::cycle(6);
    let h = patterns::path(3);
    assert_eq!(brute_force_count(&g, &h), 6);
    assert_eq!(count_default(&g, &h, 2), 6);
}

#[test]
fn paths_in_the_petersen_graph() {
    let g = petersen();
    let h = patterns::path(4);
    let expected = brute_force_count(&g, &h);
    assert_eq!(expected, 60);
    assert_eq!(count_default(&g, &h, 3), expected);
}

#[test]
fn petersen_p4_at_depth_four_counts_120_labeled_paths() {
    // The four-vertex path in the Petersen graph, with a coloring computed
    // for p = 4: there are 120 labeled embeddings and, P4 having exactly
    // two automorphisms, 60 vertex subsets carrying one.
    let g = petersen();
    let h = patterns::path(4);
    let p = h.len();
    assert_eq!(p, 4);

    let coloring = CcAlgorithm::default().start(&g, p).expect("coloring failed");
    let mut counter = PatternCounter::new(
        &g,
        &coloring,
        vec![(h.clone(), 3)],
        PatternKind::MemoizedBv,
        TableHints::default(),
        SweepKind::Dfs,
        CombinerKind::InclusionExclusion,
    )
    .expect("counter setup failed");
    let subsets = counter.count_patterns().expect("counting failed")[0];

    let automorphisms = count_automorphisms(&h);
    assert_eq!(automorphisms, 2);
    assert_eq!(subsets * automorphisms, 120);
    assert_eq!(subsets, 60);
    assert_eq!(subsets, brute_force_count(&g, &h));
}

#[test]
fn squares_in_k33() {
    let g = patterns::biclique(3, 3);
    let h = patterns::cycle(4);
    assert_eq!(brute_force_count(&g, &h), 9);
    assert_eq!(count_default(&g, &h, 3), 9);
}

#[test]
fn triangles_in_two_components() {
    let g = two_triangles();
    let h = patterns::clique(3);
    assert_eq!(brute_force_count(&g, &h), 2);
    assert_eq!(count_default(&g, &h, 3), 2);
}

#[test]
fn every_combiner_agrees() {
    let cases = vec![
        (patterns::cycle(6), patterns::path(3), 2),
        (patterns::biclique(3, 3), patterns::cycle(4), 3),
        (two_triangles(), patterns::clique(3), 3),
    ];
    let combiners = [
        CombinerKind::InclusionExclusion,
        CombinerKind::ColorCount,
        CombinerKind::HybridCount,
        CombinerKind::BvColorCount,
        CombinerKind::BvHybridCount,
    ];
    for (g, h, td) in cases {
        let expected = brute_force_count(&g, &h);
        for &combiner in &combiners {
            let got = count_with(
                &g,
                &h,
                td,
                PatternKind::MemoizedBv,
                SweepKind::Dfs,
                combiner,
                TableHints::default(),
            );
            assert_eq!(got, expected, "{:?} disagrees on {:?}", combiner, h);
        }
    }
}

#[test]
fn every_pattern_representation_agrees() {
    let g = patterns::cycle(6);
    let h = patterns::path(3);
    let expected = brute_force_count(&g, &h);
    for &kind in &[
        PatternKind::Dict,
        PatternKind::Bv,
        PatternKind::MemoizedDict,
        PatternKind::MemoizedBv,
    ] {
        let got = count_with(
            &g,
            &h,
            2,
            kind,
            SweepKind::Dfs,
            CombinerKind::InclusionExclusion,
            TableHints::default(),
        );
        assert_eq!(got, expected, "{:?} disagrees", kind);
    }
}

#[test]
fn both_sweeps_agree() {
    let g = petersen();
    let h = patterns::path(3);
    let expected = brute_force_count(&g, &h);
    for &sweep in &[SweepKind::Combinations, SweepKind::Dfs] {
        let got = count_with(
            &g,
            &h,
            2,
            PatternKind::MemoizedBv,
            sweep,
            CombinerKind::InclusionExclusion,
            TableHints::default(),
        );
        assert_eq!(got, expected, "{:?} disagrees", sweep);
    }
}

#[test]
fn forward_table_agrees() {
    let g = patterns::cycle(6);
    let h = patterns::path(3);
    let expected = brute_force_count(&g, &h);
    for &forward in &[false, true] {
        for &reuse in &[false, true] {
            let got = count_with(
                &g,
                &h,
                2,
                PatternKind::MemoizedBv,
                SweepKind::Dfs,
                CombinerKind::InclusionExclusion,
                TableHints { forward, reuse },
            );
            assert_eq!(got, expected, "forward={} reuse={}", forward, reuse);
        }
    }
}

#[test]
fn pipeline_is_idempotent() {
    let g = petersen();
    let h = patterns::path(3);
    let first = count_default(&g, &h, 2);
    let second = count_default(&g, &h, 2);
    assert_eq!(first, second);
}

#[test]
fn multi_pattern_runs_count_each_motif() {
    let g = petersen();
    let motifs = vec![
        (patterns::path(3), 2),
        (patterns::path(4), 3),
        (patterns::clique(3), 3),
    ];
    let coloring = CcAlgorithm::default().start(&g, 4).unwrap();
    let mut counter = PatternCounter::new(
        &g,
        &coloring,
        motifs.clone(),
        PatternKind::MemoizedBv,
        TableHints::default(),
        SweepKind::Dfs,
        CombinerKind::InclusionExclusion,
    )
    .unwrap();
    let counts = counter.count_patterns().unwrap();
    for ((h, _), count) in motifs.iter().zip(&counts) {
        assert_eq!(*count, brute_force_count(&g, h), "multi count for {:?}", h);
    }
    // the Petersen graph is triangle-free
    assert_eq!(counts[2], 0);
}

#[test]
fn stars_in_a_wheel() {
    let g = patterns::wheel(6);
    let h = patterns::star(4);
    let expected = brute_force_count(&g, &h);
    assert_eq!(count_default(&g, &h, 2), expected);
}

#[test]
fn small_bicliques_in_a_bigger_one() {
    let g = patterns::biclique(3, 4);
    let h = patterns::biclique(2, 2);
    let expected = brute_force_count(&g, &h);
    // one square per pair of vertices from each side
    assert_eq!(expected, 18);
    assert_eq!(count_default(&g, &h, 3), expected);
}
