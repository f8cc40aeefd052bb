//! Bit-vector k-patterns for the hot path
//!
//! Vertices and boundary membership are bitmasks over motif positions; the
//! boundary injection is packed into one integer with `id_bits` bits per
//! boundary slot, all-ones meaning "unassigned". Pattern operations become
//! mask arithmetic and submask enumeration.

use crate::count::kpattern::{KPatternRep, MotifContext};
use crate::graph::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BvKPattern {
    vertices: u64,
    boundary: u128,
    boundary_vertices: u64,
}

impl BvKPattern {
    fn from_parts(ctx: &MotifContext, vertices: u64, boundary: u128) -> Self {
        let mut boundary_vertices = 0u64;
        for i in 0..ctx.k() {
            if let Some(pos) = slot(ctx, boundary, i) {
                boundary_vertices |= 1 << pos;
            }
        }
        BvKPattern {
            vertices,
            boundary,
            boundary_vertices,
        }
    }

    fn non_boundary(&self) -> u64 {
        self.vertices & !self.boundary_vertices
    }
}

fn slot(ctx: &MotifContext, boundary: u128, i: usize) -> Option<usize> {
    let entry = (boundary >> (i * ctx.id_bits())) & ctx.null_mask();
    if entry == ctx.null_mask() {
        None
    } else {
        Some(entry as usize)
    }
}

fn set_slot(ctx: &MotifContext, boundary: u128, i: usize, position: usize) -> u128 {
    let shift = i * ctx.id_bits();
    (boundary & !(ctx.null_mask() << shift)) | ((position as u128) << shift)
}

fn clear_slot(ctx: &MotifContext, boundary: u128, i: usize) -> u128 {
    boundary | (ctx.null_mask() << (i * ctx.id_bits()))
}

/// Iterate the positions of the set bits of `mask`.
fn positions(mask: u64) -> impl Iterator<Item = usize> {
    (0..64).filter(move |i| mask & (1 << i) != 0)
}

/// Every submask of `mask`, the empty mask included.
fn submasks(mask: u64) -> Vec<u64> {
    let mut res = Vec::new();
    let mut sub = mask;
    loop {
        res.push(sub);
        if sub == 0 {
            break;
        }
        sub = (sub - 1) & mask;
    }
    res
}

impl KPatternRep for BvKPattern {
    fn all_patterns(ctx: &MotifContext) -> Vec<Self> {
        // dense enumeration over vertex masks instead of powersets
        let mut patterns = Vec::new();
        let full = ctx.full_vertex_mask();
        for vertices in submasks(full) {
            for boundary_mask in submasks(vertices) {
                let boundary_size = boundary_mask.count_ones() as usize;
                if boundary_size > ctx.k() {
                    continue;
                }
                let candidate = BvKPattern {
                    vertices,
                    boundary: ctx.all_null_boundary(),
                    boundary_vertices: boundary_mask,
                };
                if !separator_masks(ctx, vertices, boundary_mask) {
                    continue;
                }
                let slots: Vec<usize> = positions(boundary_mask).collect();
                push_injections(ctx, &candidate, &slots, 0, ctx.all_null_boundary(), &mut patterns);
            }
        }
        patterns
    }

    fn trivial(ctx: &MotifContext) -> Self {
        BvKPattern {
            vertices: ctx.full_vertex_mask(),
            boundary: ctx.all_null_boundary(),
            boundary_vertices: 0,
        }
    }

    fn is_separator(&self, ctx: &MotifContext) -> bool {
        separator_masks(ctx, self.vertices, self.boundary_vertices)
    }

    fn num_vertices(&self) -> usize {
        self.vertices.count_ones() as usize
    }

    fn vertices_are_boundary(&self) -> bool {
        self.vertices == self.boundary_vertices
    }

    fn boundary_index_lookup(&self, ctx: &MotifContext, i: usize) -> Option<Vertex> {
        slot(ctx, self.boundary, i).map(|pos| ctx.vertex_at(pos))
    }

    fn boundary_pairs(&self, ctx: &MotifContext) -> Vec<(Vertex, usize)> {
        (0..ctx.k())
            .filter_map(|i| slot(ctx, self.boundary, i).map(|pos| (ctx.vertex_at(pos), i)))
            .collect()
    }

    fn forget(&self, ctx: &MotifContext, i: usize) -> Option<Self> {
        let boundary = clear_slot(ctx, self.boundary, i);
        let forgotten = BvKPattern::from_parts(ctx, self.vertices, boundary);
        if forgotten.is_separator(ctx) {
            Some(forgotten)
        } else {
            None
        }
    }

    fn inverse_forget(&self, ctx: &MotifContext, i: usize) -> Vec<Self> {
        if slot(ctx, self.boundary, i).is_some() {
            return Vec::new();
        }
        let mut res = vec![*self];
        for promotee in positions(self.non_boundary()) {
            let boundary = set_slot(ctx, self.boundary, i, promotee);
            res.push(BvKPattern {
                vertices: self.vertices,
                boundary,
                boundary_vertices: self.boundary_vertices | (1 << promotee),
            });
        }
        res
    }

    fn join(&self, ctx: &MotifContext, other: &Self) -> Option<Self> {
        if self.boundary != other.boundary {
            return None;
        }
        if self.vertices & other.vertices != self.boundary_vertices {
            return None;
        }
        let joined = BvKPattern {
            vertices: self.vertices | other.vertices,
            boundary: self.boundary,
            boundary_vertices: self.boundary_vertices,
        };
        if joined.is_separator(ctx) {
            Some(joined)
        } else {
            None
        }
    }

    fn inverse_join(&self, ctx: &MotifContext) -> Vec<(Self, Self)> {
        let mut res = Vec::new();
        for sub in submasks(self.non_boundary()) {
            let left = BvKPattern {
                vertices: sub | self.boundary_vertices,
                boundary: self.boundary,
                boundary_vertices: self.boundary_vertices,
            };
            let right = BvKPattern {
                vertices: self.vertices & !sub,
                boundary: self.boundary,
                boundary_vertices: self.boundary_vertices,
            };
            if left.is_separator(ctx) && right.is_separator(ctx) {
                res.push((left, right));
            }
        }
        res
    }

    fn all_compatible(&self, ctx: &MotifContext) -> Vec<Self> {
        let complement = ctx.full_vertex_mask() & !self.vertices;
        let mut res = Vec::new();
        for sub in submasks(complement) {
            let pattern = BvKPattern {
                vertices: sub | self.boundary_vertices,
                boundary: self.boundary,
                boundary_vertices: self.boundary_vertices,
            };
            if pattern.is_separator(ctx) {
                res.push(pattern);
            }
        }
        res
    }

    fn render(&self, ctx: &MotifContext) -> String {
        use itertools::Itertools;
        let mut pairs = self.boundary_pairs(ctx);
        pairs.sort_unstable();
        let bound = pairs
            .into_iter()
            .map(|(v, i)| format!("{} -> {}", v, i))
            .join(", ");
        let verts = positions(self.vertices)
            .map(|pos| ctx.vertex_at(pos).to_string())
            .join(", ");
        format!("Boundary: [{}]; Vertices: [{}]", bound, verts)
    }
}

fn separator_masks(ctx: &MotifContext, vertices: u64, boundary_vertices: u64) -> bool {
    positions(vertices & !boundary_vertices)
        .all(|pos| ctx.adjacency_mask(pos) & !vertices == 0)
}

/// Recursively assign boundary slots to the positions of `slots`, pushing
/// one pattern per injection into `0..k`.
fn push_injections(
    ctx: &MotifContext,
    base: &BvKPattern,
    slots: &[usize],
    next: usize,
    boundary: u128,
    out: &mut Vec<BvKPattern>,
) {
    if next == slots.len() {
        out.push(BvKPattern {
            vertices: base.vertices,
            boundary,
            boundary_vertices: base.boundary_vertices,
        });
        return;
    }
    let position = slots[next];
    for i in 0..ctx.k() {
        if slot(ctx, boundary, i).is_none() {
            push_injections(
                ctx,
                base,
                slots,
                next + 1,
                set_slot(ctx, boundary, i, position),
                out,
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::count::kpattern::KPattern;
    use crate::graph::patterns;
    use std::collections::BTreeSet;

    /// Compare the bit-vector catalog against the dictionary oracle by
    /// rendering both to canonical strings.
    fn canonical<P: KPatternRep>(ctx: &MotifContext) -> BTreeSet<String> {
        P::all_patterns(ctx)
            .iter()
            .map(|p| p.render(ctx))
            .collect()
    }

    #[test]
    fn catalog_matches_dictionary_oracle() {
        for (motif, k) in &[
            (patterns::path(3), 2),
            (patterns::path(3), 3),
            (patterns::clique(3), 3),
            (patterns::star(4), 2),
        ] {
            let ctx = MotifContext::new(motif, *k);
            let bv = canonical::<BvKPattern>(&ctx);
            let dict = canonical::<KPattern>(&ctx);
            assert_eq!(bv, dict, "catalogs differ for k={}", k);
        }
    }

    #[test]
    fn forget_clears_the_slot() {
        let motif = patterns::path(3);
        let ctx = MotifContext::new(&motif, 2);
        let trivial = BvKPattern::trivial(&ctx);
        // promote vertex 1 (the path's middle) to slot 0, then forget it
        let promoted = trivial
            .inverse_forget(&ctx, 0)
            .into_iter()
            .find(|p| p.boundary_index_lookup(&ctx, 0) == Some(1))
            .unwrap();
        let back = promoted.forget(&ctx, 0).unwrap();
        assert_eq!(back, trivial);
    }

    #[test]
    fn inverse_join_round_trips() {
        let motif = patterns::path(4);
        let ctx = MotifContext::new(&motif, 3);
        for pattern in BvKPattern::all_patterns(&ctx) {
            for (left, right) in pattern.inverse_join(&ctx) {
                assert_eq!(left.join(&ctx, &right), Some(pattern));
            }
        }
    }

    #[test]
    fn submask_enumeration_is_complete() {
        let subs = submasks(0b101);
        assert_eq!(subs.len(), 4);
        assert!(subs.contains(&0b101) && subs.contains(&0b100));
        assert!(subs.contains(&0b001) && subs.contains(&0b000));
    }
}
