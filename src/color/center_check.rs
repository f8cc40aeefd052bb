//! p-centered verification via a bit-packed union-find
//!
//! Walks every combination of at most `tree_depth` color classes in DFS
//! order over the subset lattice, maintaining one union-find per stack level
//! so that backtracking is a pop. Each union-find word packs the vertex's
//! role and, for roots, a 2-bit saturating frequency histogram with one slot
//! per combination level.

use std::collections::{BTreeMap, BTreeSet};

use num_integer::binomial;

use crate::error::{Error, Result};
use crate::graph::{Color, Coloring, Graph, Vertex};

/// One machine word per vertex.
///
/// Low two bits give the role: `00` not in the current combination, `01`
/// root, `10` child. Roots keep the histogram in the remaining bits, two
/// bits per combination level saturating at two (`01` once, `10` more);
/// children keep their parent's index there instead.
type Word = usize;

const TYPE_MASK: Word = 0b11;
const TYPE_ROOT: Word = 0b01;
const TYPE_CHILD: Word = 0b10;

const WORD_BITS: usize = std::mem::size_of::<Word>() * 8;

/// Hard cap on the combination size: the histogram needs two bits per level
/// on top of the two role bits.
pub const MAX_TREE_DEPTH: usize = (WORD_BITS - 2) / 2;

/// Mask of the low histogram bits of every slot (`0x5555..54` on 64 bits).
const fn low_mask() -> Word {
    let mut mask: Word = 0;
    let mut slot = 1;
    while slot <= MAX_TREE_DEPTH {
        mask |= 1 << (2 * slot);
        slot += 1;
    }
    mask
}

const LOW: Word = low_mask();
const HIGH: Word = LOW << 1;

/// Outcome of the center check.
#[derive(Debug, Clone)]
pub enum CheckResult {
    /// The coloring is centered for the requested depth.
    Centered,
    /// Witness against centeredness: a color combination together with the
    /// connected component in which no color occurs exactly once.
    Failure {
        combination: BTreeSet<Color>,
        responsible: BTreeSet<Vertex>,
    },
}

impl CheckResult {
    pub fn is_centered(&self) -> bool {
        matches!(self, CheckResult::Centered)
    }
}

/// Per-color bookkeeping for the walk.
struct ColorInfo {
    in_set: bool,
    nodes: BTreeSet<Vertex>,
}

struct CheckState<'a> {
    graph: &'a Graph,
    /// Normalized color per vertex, indexed by vertex id.
    vertex_color: Vec<Color>,
    color: Vec<ColorInfo>,
    current_depth: usize,
    last_color: Color,
    combi: BTreeSet<Color>,
    union_find: Vec<Vec<Word>>,
}

/// Verify that `coloring` is centered for combinations of up to `tree_depth`
/// colors, reporting a witness combination and component on failure.
///
/// Colors of frequency one are centers of anything they touch and are
/// dropped up front; the rest are walked in DFS order with incremental
/// union-find merges. `progress` is called with (combinations done, total).
pub fn check_tree_depth(
    graph: &Graph,
    coloring: &Coloring,
    tree_depth: usize,
    mut progress: Option<&mut dyn FnMut(u64, u64)>,
) -> Result<CheckResult> {
    if tree_depth > MAX_TREE_DEPTH {
        return Err(Error::Config(format!(
            "tree depth {} exceeds the union-find capacity of {}",
            tree_depth, MAX_TREE_DEPTH
        )));
    }
    if tree_depth == 0 {
        // there are no non-empty combinations to falsify
        return Ok(CheckResult::Centered);
    }

    let normalized = coloring.normalize();
    let num_all_colors = normalized.num_colors();

    let n = graph.max_id().map(|m| m + 1).unwrap_or(0);
    let mut vertex_color = vec![0; n];
    let mut color: Vec<ColorInfo> = (0..num_all_colors)
        .map(|_| ColorInfo {
            in_set: false,
            nodes: BTreeSet::new(),
        })
        .collect();
    for v in graph.vertices() {
        let c = normalized.get(v).ok_or_else(|| {
            Error::InvalidColoring(format!("missing color for vertex {}", v))
        })?;
        vertex_color[v] = c;
        color[c].nodes.insert(v);
    }

    // frequency-one colors are sorted to the end by normalization; skipping
    // them shrinks the walk without changing the outcome
    let singles = normalized
        .frequencies(None)
        .values()
        .filter(|&&freq| freq == 1)
        .count();
    let num_colors = num_all_colors - singles;

    if num_colors == 0 {
        return Ok(CheckResult::Centered);
    }

    // map normalized color ids back to the caller's ids for the witness
    let mut denormalize: BTreeMap<Color, Color> = BTreeMap::new();
    for v in graph.vertices() {
        if let (Some(norm), Some(orig)) = (normalized.get(v), coloring.get(v)) {
            denormalize.insert(norm, orig);
        }
    }

    let mut state = CheckState {
        graph,
        vertex_color,
        color,
        current_depth: 0,
        last_color: 0,
        combi: BTreeSet::new(),
        union_find: Vec::new(),
    };

    let total = number_of_combinations(num_colors, tree_depth);
    let mut walked: u64 = 0;

    // DFS over the subset lattice: push the next higher color until the
    // combination is maximal, then pop back to the next branch
    let mut last: Option<Color> = None;
    loop {
        let next = last.map(|c| c + 1).unwrap_or(0);
        state.last_color = next;
        state.color[next].in_set = true;
        state.current_depth += 1;
        last = Some(next);

        walked += 1;
        if let Some(cb) = progress.as_mut() {
            if walked % 100 == 0 {
                cb(walked, total);
            }
        }

        if let Some(responsible) = merge_last_color(&mut state) {
            let mut combination: BTreeSet<Color> = state
                .combi
                .iter()
                .map(|c| denormalize[c])
                .collect();
            combination.insert(denormalize[&state.last_color]);
            return Ok(CheckResult::Failure {
                combination,
                responsible,
            });
        }

        if state.last_color == num_colors - 1 || state.current_depth == tree_depth {
            loop {
                state.union_find.pop();
                let lc = last.unwrap();
                state.combi.remove(&lc);
                state.color[lc].in_set = false;
                state.current_depth -= 1;

                if lc == num_colors - 1 {
                    match state.combi.iter().next_back().copied() {
                        // the combination was just the maximal color: done
                        None => return Ok(CheckResult::Centered),
                        Some(max) => last = Some(max),
                    }
                } else {
                    break;
                }
            }
        }
    }
}

/// Add the walk's latest color to the top union-find, merging components and
/// histograms. Returns the responsible vertices when a merged component
/// loses its last center.
fn merge_last_color(state: &mut CheckState<'_>) -> Option<BTreeSet<Vertex>> {
    let n = state.vertex_color.len();
    let depth = state.current_depth;
    let fresh_root = TYPE_ROOT | (1 << (2 * depth));

    let mut ufs = if depth == 1 {
        vec![0; n]
    } else {
        state.union_find[depth - 2].clone()
    };

    for &v in &state.color[state.last_color].nodes {
        ufs[v] = fresh_root;
    }

    if depth > 1 {
        for &v in &state.color[state.last_color].nodes {
            for &u in state.graph.neighbours(v) {
                if !state.color[state.vertex_color[u]].in_set {
                    continue;
                }
                let a = find(&mut ufs, v);
                let b = find(&mut ufs, u);
                if a == b {
                    continue;
                }
                let ca = ufs[a];
                let cb = ufs[b];

                // slot-wise saturating add of the two histograms:
                //   00+00=00, 00+01=01, 01+01=10, anything+10=10
                let mut nc = ((ca & LOW) + (cb & LOW)) | (ca & HIGH) | (cb & HIGH);
                nc = (nc & HIGH) | (nc & !((nc & HIGH) >> 1));

                if nc & LOW == 0 {
                    // every color in the combination occurs at least twice:
                    // the merged component has no center
                    ufs[a] = TYPE_CHILD | (b << 2);
                    ufs[b] = (ufs[b] & TYPE_MASK) | nc;
                    let mut responsible = BTreeSet::new();
                    for i in 0..n {
                        if find(&mut ufs, i) == b && ufs[i] != 0 {
                            responsible.insert(i);
                        }
                    }
                    return Some(responsible);
                }

                ufs[a] = TYPE_CHILD | (b << 2);
                ufs[b] = (ufs[b] & TYPE_MASK) | nc;
            }
        }
    }

    state.combi.insert(state.last_color);
    state.union_find.push(ufs);
    None
}

fn find(ufs: &mut [Word], node: Vertex) -> Vertex {
    let start = node;
    let mut node = node;
    while ufs[node] & TYPE_MASK == TYPE_CHILD {
        node = ufs[node] >> 2;
    }
    if ufs[start] & TYPE_MASK == TYPE_CHILD {
        ufs[start] = TYPE_CHILD | (node << 2);
    }
    node
}

/// `sum(i=1..t, C(c, i))`, the number of combinations the walk visits.
fn number_of_combinations(c: usize, t: usize) -> u64 {
    (1..=t.min(c))
        .map(|i| binomial(c as u64, i as u64))
        .sum()
}
