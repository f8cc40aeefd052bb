//! Greedy color-class merging postprocess

use std::collections::BTreeSet;

use tracing::debug;

use crate::color::center_check::{check_tree_depth, CheckResult};
use crate::error::Result;
use crate::graph::{Coloring, Graph, Vertex};

fn recolor(cols: &mut Coloring, vertices: &BTreeSet<Vertex>, c: usize) {
    for &v in vertices {
        cols.set(v, c);
    }
}

fn independent_colors(g: &Graph, c1: &BTreeSet<Vertex>, c2: &BTreeSet<Vertex>) -> bool {
    c1.iter()
        .all(|&v| g.neighbours(v).iter().all(|u| !c2.contains(u)))
}

/// Merge color classes greedily: for every pair of classes that are mutually
/// independent in `graph`, relabel the rarer class into the more frequent one
/// and keep the merge when the coloring stays centered at depth `p`.
pub fn merge_colors(graph: &Graph, cols: &Coloring, p: usize) -> Result<Coloring> {
    let mut ordered = cols.normalize();

    let num_colors = ordered.num_colors();
    let mut color_sets: Vec<BTreeSet<Vertex>> = vec![BTreeSet::new(); num_colors];
    for v in graph.vertices() {
        if let Some(c) = ordered.get(v) {
            color_sets[c].insert(v);
        }
    }

    for c1 in 0..num_colors {
        if color_sets[c1].is_empty() {
            continue;
        }
        for c2 in c1 + 1..num_colors {
            if color_sets[c2].is_empty() {
                continue;
            }
            if !independent_colors(graph, &color_sets[c1], &color_sets[c2]) {
                continue;
            }
            // tentatively pull c2 into c1, then verify
            recolor(&mut ordered, &color_sets[c2], c1);
            let centered =
                matches!(check_tree_depth(graph, &ordered, p, None)?, CheckResult::Centered);
            if centered {
                debug!(from = c2, into = c1, "merged color classes");
                let moved = std::mem::take(&mut color_sets[c2]);
                color_sets[c1].extend(moved);
            } else {
                recolor(&mut ordered, &color_sets[c2], c2);
            }
        }
    }

    // compact away the now-unused color ids
    let mut final_coloring = Coloring::new();
    let mut next = 0;
    for v_set in &color_sets {
        if !v_set.is_empty() {
            recolor(&mut final_coloring, v_set, next);
            next += 1;
        }
    }
    Ok(final_coloring)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn merges_independent_classes_of_a_path() {
        // 0-1-2-3 colored with four distinct colors: the two end classes can
        // fold together, and more merges may follow
        let mut g = Graph::new();
        for i in 0..3 {
            g.add_edge(i, i + 1);
        }
        let mut cols = Coloring::new();
        for v in 0..4 {
            cols.set(v, v);
        }
        let merged = merge_colors(&g, &cols, 3).unwrap();
        assert!(merged.num_colors() < 4);
        assert!(merged.is_proper(&g).unwrap());
        assert!(check_tree_depth(&g, &merged, 3, None)
            .unwrap()
            .is_centered());
    }

    #[test]
    fn never_merges_adjacent_classes() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        let mut cols = Coloring::new();
        cols.set(0, 0);
        cols.set(1, 1);
        let merged = merge_colors(&g, &cols, 2).unwrap();
        assert_eq!(merged.num_colors(), 2);
    }
}
