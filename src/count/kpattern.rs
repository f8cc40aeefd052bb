//! k-patterns: partial rooted embeddings of the motif
//!
//! A k-pattern is a triple `(V, B, phi)` with `V` a subset of the motif's
//! vertices, `B = V ∩ dom(phi)` a separator of `V` inside the motif, and
//! `phi` an injection of `B` into the boundary indices `0..k-1`. The dynamic
//! program walks patterns through `forget`/`join` and their inverses.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;

use crate::graph::{Graph, Vertex};

/// Shared context for all patterns of one motif at one boundary width `k`:
/// the motif itself, the position<->vertex mappings of the bit-vector form,
/// and the packed-field geometry.
#[derive(Debug)]
pub struct MotifContext {
    motif: Graph,
    k: usize,
    nv: usize,
    id_bits: usize,
    null_mask: u128,
    int_mapping: Vec<Vertex>,
    vertex_position: HashMap<Vertex, usize>,
    adj_masks: Vec<u64>,
}

impl MotifContext {
    pub fn new(motif: &Graph, k: usize) -> Self {
        let int_mapping: Vec<Vertex> = motif.vertices().collect();
        let nv = int_mapping.len();
        // the counter rejects bit-vector runs whose boundary layout would
        // not fit the packed word
        debug_assert!(nv <= 64);
        let vertex_position: HashMap<Vertex, usize> = int_mapping
            .iter()
            .enumerate()
            .map(|(pos, &v)| (v, pos))
            .collect();

        // enough bits per boundary slot for any position plus a null value
        let mut id_bits = 1;
        while (1usize << id_bits) < nv + 1 {
            id_bits += 1;
        }
        let null_mask = (1u128 << id_bits) - 1;

        let adj_masks = int_mapping
            .iter()
            .map(|&v| {
                motif
                    .neighbours(v)
                    .iter()
                    .map(|u| 1u64 << vertex_position[u])
                    .fold(0, |acc, bit| acc | bit)
            })
            .collect();

        MotifContext {
            motif: motif.clone(),
            k,
            nv,
            id_bits,
            null_mask,
            int_mapping,
            vertex_position,
            adj_masks,
        }
    }

    pub fn motif(&self) -> &Graph {
        &self.motif
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_vertices(&self) -> usize {
        self.nv
    }

    pub(crate) fn id_bits(&self) -> usize {
        self.id_bits
    }

    pub(crate) fn null_mask(&self) -> u128 {
        self.null_mask
    }

    pub(crate) fn position(&self, v: Vertex) -> usize {
        self.vertex_position[&v]
    }

    pub(crate) fn vertex_at(&self, position: usize) -> Vertex {
        self.int_mapping[position]
    }

    pub(crate) fn adjacency_mask(&self, position: usize) -> u64 {
        self.adj_masks[position]
    }

    pub(crate) fn full_vertex_mask(&self) -> u64 {
        if self.nv == 64 {
            u64::MAX
        } else {
            (1u64 << self.nv) - 1
        }
    }

    pub(crate) fn all_null_boundary(&self) -> u128 {
        let mut boundary = 0u128;
        for i in 0..self.k.max(1) {
            boundary |= self.null_mask << (i * self.id_bits);
        }
        boundary
    }
}

/// The operations the dynamic program needs from a k-pattern representation.
///
/// Implementations must agree on semantics: the dictionary form is the
/// readable oracle, the bit-vector form the hot-path twin.
pub trait KPatternRep: Clone + Eq + Hash + Debug {
    /// Every separator pattern of the motif with boundary width `ctx.k`.
    fn all_patterns(ctx: &MotifContext) -> Vec<Self>;

    /// The whole motif with an empty boundary; the root table entry that
    /// holds the final count.
    fn trivial(ctx: &MotifContext) -> Self;

    fn is_separator(&self, ctx: &MotifContext) -> bool;

    fn num_vertices(&self) -> usize;

    /// Whether every pattern vertex is on the boundary.
    fn vertices_are_boundary(&self) -> bool;

    /// The motif vertex mapped to boundary index `i`, if any.
    fn boundary_index_lookup(&self, ctx: &MotifContext, i: usize) -> Option<Vertex>;

    /// `(motif vertex, boundary index)` pairs of the boundary injection.
    fn boundary_pairs(&self, ctx: &MotifContext) -> Vec<(Vertex, usize)>;

    /// Drop boundary slot `i`; `None` when the result is no separator.
    fn forget(&self, ctx: &MotifContext, i: usize) -> Option<Self>;

    /// All patterns that collapse to `self` when slot `i` is forgotten:
    /// `self` (if the slot is free) plus every promotion of a non-boundary
    /// vertex into the slot.
    fn inverse_forget(&self, ctx: &MotifContext, i: usize) -> Vec<Self>;

    /// Union with a boundary-compatible pattern; `None` when the vertex sets
    /// overlap beyond the boundary or the union is no separator.
    fn join(&self, ctx: &MotifContext, other: &Self) -> Option<Self>;

    /// All unordered pattern pairs whose join gives `self`, enumerated by
    /// splitting the non-boundary vertices into two sides.
    fn inverse_join(&self, ctx: &MotifContext) -> Vec<(Self, Self)>;

    /// All patterns this one can be joined with.
    fn all_compatible(&self, ctx: &MotifContext) -> Vec<Self>;

    /// Human-readable form for table dumps.
    fn render(&self, ctx: &MotifContext) -> String;
}

/// Dictionary-backed k-pattern; general but allocation-heavy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KPattern {
    vertices: BTreeSet<Vertex>,
    boundary: BTreeMap<Vertex, usize>,
}

impl KPattern {
    pub fn new(vertices: BTreeSet<Vertex>, boundary: BTreeMap<Vertex, usize>) -> Self {
        debug_assert!(boundary.keys().all(|v| vertices.contains(v)));
        KPattern { vertices, boundary }
    }

    fn boundary_vertices(&self) -> BTreeSet<Vertex> {
        self.boundary.keys().copied().collect()
    }

    fn non_boundary_vertices(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .copied()
            .filter(|v| !self.boundary.contains_key(v))
            .collect()
    }
}

impl KPatternRep for KPattern {
    fn all_patterns(ctx: &MotifContext) -> Vec<Self> {
        let vertex_set: Vec<Vertex> = ctx.motif.vertices().collect();
        let mut patterns = Vec::new();
        for v_list in vertex_set.iter().copied().powerset() {
            let v_set: BTreeSet<Vertex> = v_list.iter().copied().collect();
            for boundary_size in 0..=ctx.k.min(v_set.len()) {
                for boundary in v_list.iter().copied().combinations(boundary_size) {
                    for mapping in (0..ctx.k).permutations(boundary_size) {
                        let b: BTreeMap<Vertex, usize> =
                            boundary.iter().copied().zip(mapping).collect();
                        let kp = KPattern::new(v_set.clone(), b);
                        if kp.is_separator(ctx) {
                            patterns.push(kp);
                        }
                    }
                }
            }
        }
        patterns
    }

    fn trivial(ctx: &MotifContext) -> Self {
        KPattern::new(ctx.motif.vertices().collect(), BTreeMap::new())
    }

    fn is_separator(&self, ctx: &MotifContext) -> bool {
        self.vertices
            .iter()
            .filter(|v| !self.boundary.contains_key(v))
            .all(|&v| {
                ctx.motif
                    .neighbours(v)
                    .iter()
                    .all(|u| self.vertices.contains(u))
            })
    }

    fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    fn vertices_are_boundary(&self) -> bool {
        self.vertices.len() == self.boundary.len()
    }

    fn boundary_index_lookup(&self, _ctx: &MotifContext, i: usize) -> Option<Vertex> {
        self.boundary
            .iter()
            .find(|(_, &idx)| idx == i)
            .map(|(&v, _)| v)
    }

    fn boundary_pairs(&self, _ctx: &MotifContext) -> Vec<(Vertex, usize)> {
        self.boundary.iter().map(|(&v, &i)| (v, i)).collect()
    }

    fn forget(&self, ctx: &MotifContext, i: usize) -> Option<Self> {
        let mut b = self.boundary.clone();
        if let Some(v) = self.boundary_index_lookup(ctx, i) {
            b.remove(&v);
        }
        let forgotten = KPattern::new(self.vertices.clone(), b);
        if forgotten.is_separator(ctx) {
            Some(forgotten)
        } else {
            None
        }
    }

    fn inverse_forget(&self, ctx: &MotifContext, i: usize) -> Vec<Self> {
        if self.boundary_index_lookup(ctx, i).is_some() {
            return Vec::new();
        }
        let mut res = vec![self.clone()];
        for v in self.non_boundary_vertices() {
            let mut b = self.boundary.clone();
            b.insert(v, i);
            res.push(KPattern::new(self.vertices.clone(), b));
        }
        res
    }

    fn join(&self, ctx: &MotifContext, other: &Self) -> Option<Self> {
        if self.boundary != other.boundary {
            return None;
        }
        let intersection: BTreeSet<Vertex> = self
            .vertices
            .intersection(&other.vertices)
            .copied()
            .collect();
        if intersection != self.boundary_vertices() {
            return None;
        }
        let joined = KPattern::new(
            self.vertices.union(&other.vertices).copied().collect(),
            self.boundary.clone(),
        );
        if joined.is_separator(ctx) {
            Some(joined)
        } else {
            None
        }
    }

    fn inverse_join(&self, ctx: &MotifContext) -> Vec<(Self, Self)> {
        let non_boundary = self.non_boundary_vertices();
        let boundary_vertices = self.boundary_vertices();
        let mut res = Vec::new();
        for v_list in non_boundary.iter().copied().powerset() {
            let v_set: BTreeSet<Vertex> = v_list.into_iter().collect();
            let left = KPattern::new(
                v_set.union(&boundary_vertices).copied().collect(),
                self.boundary.clone(),
            );
            let right = KPattern::new(
                self.vertices.difference(&v_set).copied().collect(),
                self.boundary.clone(),
            );
            if left.is_separator(ctx) && right.is_separator(ctx) {
                res.push((left, right));
            }
        }
        res
    }

    fn all_compatible(&self, ctx: &MotifContext) -> Vec<Self> {
        let complement: Vec<Vertex> = ctx
            .motif
            .vertices()
            .filter(|v| !self.vertices.contains(v))
            .collect();
        let boundary_vertices = self.boundary_vertices();
        let mut res = Vec::new();
        for other in complement.iter().copied().powerset() {
            let mut v_set: BTreeSet<Vertex> = other.into_iter().collect();
            v_set.extend(boundary_vertices.iter().copied());
            let pattern = KPattern::new(v_set, self.boundary.clone());
            if pattern.is_separator(ctx) {
                res.push(pattern);
            }
        }
        res
    }

    fn render(&self, _ctx: &MotifContext) -> String {
        let bound = self
            .boundary
            .iter()
            .map(|(v, i)| format!("{} -> {}", v, i))
            .join(", ");
        let verts = self.vertices.iter().join(", ");
        format!("Boundary: [{}]; Vertices: [{}]", bound, verts)
    }
}
