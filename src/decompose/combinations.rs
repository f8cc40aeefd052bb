//! Sweep over explicit color-set combinations

use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::trace;

use crate::decompose::{build_tdd, SweepParams, SweepVisitor};
use crate::error::Result;
use crate::graph::{Color, Coloring, Graph, Vertex};

/// Walks every size-k color set, largest k first, and rebuilds the induced
/// vertex set for each from scratch. Simple and memoryless; the DFS sweep is
/// the incremental alternative.
pub struct CombinationsSweep<'a> {
    g: &'a Graph,
    coloring: &'a Coloring,
    params: SweepParams,
}

impl<'a> CombinationsSweep<'a> {
    pub fn new(g: &'a Graph, coloring: &'a Coloring, params: SweepParams) -> Self {
        CombinationsSweep { g, coloring, params }
    }

    pub fn run(&self, visitor: &mut dyn SweepVisitor) -> Result<()> {
        let colors: Vec<Color> = self.coloring.colors().iter().copied().collect();
        let lo = self.params.td_h.min(self.params.p);

        for num_colors in (lo..=self.params.p).rev() {
            for combo in colors.iter().copied().combinations(num_colors) {
                let color_set: BTreeSet<Color> = combo.into_iter().collect();
                let colored_vertices: BTreeSet<Vertex> = self.coloring.select(&color_set);
                trace!(?color_set, "color set");

                visitor.begin_color_set(&color_set);
                let classes = self.g.color_classes(&colored_vertices, self.coloring);
                for component in self.g.components(&colored_vertices) {
                    if component.len() < self.params.min_size {
                        continue;
                    }
                    let tdd = build_tdd(self.g, &component, &classes, self.coloring)?;
                    visitor.decomposition(tdd)?;
                }
                visitor.end_color_set(&color_set);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::TdDecomposition;

    struct Recorder {
        sets: Vec<BTreeSet<Color>>,
        tdds: usize,
        open: bool,
    }

    impl SweepVisitor for Recorder {
        fn begin_color_set(&mut self, colors: &BTreeSet<Color>) {
            assert!(!self.open);
            self.open = true;
            self.sets.push(colors.clone());
        }

        fn decomposition(&mut self, tdd: TdDecomposition) -> Result<()> {
            assert!(self.open);
            tdd.check_consistency().unwrap();
            self.tdds += 1;
            Ok(())
        }

        fn end_color_set(&mut self, colors: &BTreeSet<Color>) {
            assert!(self.open);
            assert_eq!(self.sets.last(), Some(colors));
            self.open = false;
        }
    }

    #[test]
    fn visits_every_set_size_in_range() {
        // triangle colored with three distinct colors
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(0, 2);
        let mut col = Coloring::new();
        for v in 0..3 {
            col.set(v, v);
        }

        let mut rec = Recorder {
            sets: Vec::new(),
            tdds: 0,
            open: false,
        };
        let params = SweepParams {
            p: 3,
            td_h: 2,
            min_size: 1,
        };
        CombinationsSweep::new(&g, &col, params).run(&mut rec).unwrap();

        // C(3,3) + C(3,2) color sets, larger sets first
        assert_eq!(rec.sets.len(), 1 + 3);
        assert_eq!(rec.sets[0].len(), 3);
        assert!(rec.sets[1..].iter().all(|s| s.len() == 2));
        assert!(rec.tdds >= 4);
    }

    #[test]
    fn prunes_small_components() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        g.add_node(2);
        let mut col = Coloring::new();
        col.set(0, 0);
        col.set(1, 1);
        col.set(2, 0);

        let mut rec = Recorder {
            sets: Vec::new(),
            tdds: 0,
            open: false,
        };
        let params = SweepParams {
            p: 2,
            td_h: 2,
            min_size: 2,
        };
        CombinationsSweep::new(&g, &col, params).run(&mut rec).unwrap();
        // only the component {0, 1} is large enough
        assert_eq!(rec.tdds, 1);
    }
}
