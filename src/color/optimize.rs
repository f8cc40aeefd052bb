//! Randomized edge-reinsertion refiner for the coloring stage

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::color::augmentation::AugmentationState;
use crate::error::Result;
use crate::graph::tfgraph::Weight;
use crate::graph::{Coloring, Graph, TfGraph, Vertex};

const MAX_ATTEMPTS: usize = 2;

/// Try to shrink the coloring by removing the arcs of the final augmentation
/// step and re-adding random halves of them: each round re-colors and
/// re-checks, keeping the smallest coloring that stays centered. The number
/// of arcs re-added halves until it reaches zero.
pub fn optimization_interval(
    g: &mut TfGraph,
    state: &mut AugmentationState,
    col: &Coloring,
    step: Weight,
    color_fn: &mut dyn FnMut(&TfGraph) -> Coloring,
    check_fn: &mut dyn FnMut(&Coloring) -> Result<bool>,
) -> Result<Coloring> {
    // pull the last step's arcs out of the graph
    let mut edges: BTreeMap<(Vertex, Vertex), (bool, Weight)> = BTreeMap::new();
    for (&(s, t), &w) in state.trans.iter() {
        if w == step {
            edges.insert((s, t), (true, w));
        }
    }
    for (&(s, t), &w) in state.frat.iter() {
        if w == step {
            edges.insert((s, t), (false, w));
        }
    }
    for (&(s, t), &(is_trans, _)) in edges.iter() {
        g.remove_arc(s, t);
        if is_trans {
            state.trans.remove(&(s, t));
        } else {
            state.frat.remove(&(s, t));
        }
    }

    let mut optcols = col.clone();
    let mut rng = rand::thread_rng();
    let mut numb_add = edges.len() / 2;
    let mut attempts = 0;

    loop {
        // draw `numb_add` random arcs and put them back
        let mut added: Vec<((Vertex, Vertex), bool)> = Vec::new();
        {
            let mut modulus = edges.len();
            let mut ra = numb_add;
            let keys: Vec<(Vertex, Vertex)> = edges.keys().copied().collect();
            for (s, t) in keys {
                if ra == 0 {
                    break;
                }
                let (is_trans, value) = edges[&(s, t)];
                if rng.gen_range(0..modulus) < ra {
                    g.add_arc(s, t, 0);
                    if is_trans {
                        state.trans.insert((s, t), value);
                    } else {
                        state.frat.insert((s, t), value);
                    }
                    added.push(((s, t), is_trans));
                    edges.remove(&(s, t));
                    ra -= 1;
                }
                modulus -= 1;
            }
        }

        let newcol = color_fn(g);
        let correct = check_fn(&newcol)?;
        if correct && newcol.num_colors() < optcols.num_colors() {
            debug!(colors = newcol.num_colors(), "refiner found a smaller coloring");
            optcols = newcol;
        }

        attempts += 1;

        if correct || attempts < MAX_ATTEMPTS {
            // undo this round's insertions
            for &((s, t), is_trans) in &added {
                let value = if is_trans {
                    state.trans.remove(&(s, t)).unwrap_or(step)
                } else {
                    state.frat.remove(&(s, t)).unwrap_or(step)
                };
                edges.insert((s, t), (is_trans, value));
                g.remove_arc(s, t);
            }
        }
        if correct || attempts == MAX_ATTEMPTS {
            attempts = 0;
            numb_add /= 2;
        }
        if numb_add == 0 {
            break;
        }
    }

    Ok(optcols)
}
