//! The p-centered coloring stage
//!
//! Orient the host graph with few in-arcs, then alternate transitive-
//! fraternal augmentation with re-coloring until the center check accepts,
//! and finally shrink the palette by merging independent color classes.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::tfgraph::Weight;
use crate::graph::{Coloring, Graph, TfGraph};

pub mod augmentation;
pub mod center_check;
pub mod merge;
pub mod optimize;
pub mod ordering;
pub mod orientation;
pub mod trim;

pub use augmentation::{AugmentationState, StepKind};
pub use center_check::{check_tree_depth, CheckResult, MAX_TREE_DEPTH};
pub use merge::merge_colors;
pub use ordering::{color_by_ordering, ColorChooser, OrderingKind};
pub use orientation::OrientationKind;
pub use trim::PreprocessKind;

/// The configured coloring pipeline.
///
/// Every stage is a closed set of variants selected from the configuration
/// file at startup; the loop itself is fixed.
#[derive(Debug, Clone)]
pub struct CcAlgorithm {
    pub orientation: OrientationKind,
    pub step: StepKind,
    pub ordering: OrderingKind,
    pub chooser: ColorChooser,
    pub optimize: bool,
    pub preprocess: Option<PreprocessKind>,
}

impl Default for CcAlgorithm {
    fn default() -> Self {
        CcAlgorithm {
            orientation: OrientationKind::LowDegree,
            step: StepKind::TransFrater,
            ordering: OrderingKind::Greedy,
            chooser: ColorChooser::NextFree,
            optimize: false,
            preprocess: None,
        }
    }
}

impl CcAlgorithm {
    /// Compute a coloring of `rawgraph` that the center check accepts for
    /// combinations of up to `tree_depth` colors.
    pub fn start(&self, rawgraph: &Graph, tree_depth: usize) -> Result<Coloring> {
        if tree_depth > MAX_TREE_DEPTH {
            return Err(Error::Config(format!(
                "pattern size {} exceeds the supported maximum of {}",
                tree_depth, MAX_TREE_DEPTH
            )));
        }

        let (mut pp_graph, restore) = match self.preprocess {
            Some(kind) => {
                info!("preprocess: trimming degrees");
                let (g, restore) = kind.trim(rawgraph);
                (g, Some(restore))
            }
            None => (rawgraph.clone(), None),
        };

        pp_graph.remove_loops();
        let (orig, backmapping) = pp_graph.normalize();

        let mut g = self.orientation.orient(&orig, None);
        let mut state = AugmentationState::default();
        let mut col = self.color(&g);

        let mut step: Weight = 0;
        loop {
            let check = check_tree_depth(&orig, &col, tree_depth, Some(&mut progress_log))?;
            if check.is_centered() {
                if step > 0 {
                    debug!(step, "augmentation converged");
                }
                break;
            }
            step += 1;
            debug!(step, "augmentation step");
            self.step.augment(&mut g, &mut state, step, self.orientation);
            col = self.color(&g);
        }
        info!(colors = col.num_colors(), "coloring found");

        if self.optimize && step > 0 {
            info!("optimizing");
            col = optimize::optimization_interval(
                &mut g,
                &mut state,
                &col,
                step,
                &mut |tf| self.color(tf),
                &mut |c| Ok(check_tree_depth(&orig, c, tree_depth, None)?.is_centered()),
            )?;
            info!(colors = col.num_colors(), "after optimization");
        }

        // map the coloring back to the original vertex labels
        let mut renamed = Coloring::new();
        for v in col.vertices() {
            if let Some(c) = col.get(v) {
                renamed.set(backmapping[v], c);
            }
        }

        let renamed = match restore {
            Some(restore) => {
                debug!("postprocess: restoring trimmed vertices");
                restore.restore(renamed)
            }
            None => renamed,
        };

        info!("merging color classes");
        let merged = merge_colors(rawgraph, &renamed, tree_depth)?;
        info!(colors = merged.num_colors(), "final coloring");
        Ok(merged)
    }

    fn color(&self, g: &TfGraph) -> Coloring {
        color_by_ordering(&g.undirected(), self.ordering, self.chooser)
    }
}

fn progress_log(done: u64, total: u64) {
    if done % 100_000 == 0 {
        debug!(done, total, "combinations checked");
    }
}

/// Verify a user-supplied coloring: it must be proper and pass the center
/// check at the requested depth.
pub fn verify_coloring(graph: &Graph, coloring: &Coloring, tree_depth: usize) -> Result<()> {
    if !coloring.is_proper(graph)? {
        return Err(Error::InvalidColoring(
            "an edge joins two same-colored vertices".into(),
        ));
    }
    match check_tree_depth(graph, coloring, tree_depth, None)? {
        CheckResult::Centered => Ok(()),
        CheckResult::Failure { combination, .. } => Err(Error::InvalidColoring(format!(
            "not a valid {}-centered coloring: colors {:?} induce a component without a center",
            tree_depth + 1,
            combination
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

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

    fn assert_valid(g: &Graph, algo: &CcAlgorithm, p: usize) {
        let col = algo.start(g, p).unwrap();
        assert!(col.is_proper(g).unwrap());
        assert!(check_tree_depth(g, &col, p, None).unwrap().is_centered());
    }

    #[test]
    fn default_pipeline_colors_petersen() {
        assert_valid(&petersen(), &CcAlgorithm::default(), 3);
    }

    #[test]
    fn every_stage_combination_stays_correct() {
        let g = petersen();
        for &orientation in &[OrientationKind::LowDegree, OrientationKind::Sandpile] {
            for &step in &[StepKind::TransFrater, StepKind::TruncatedTf] {
                for &ordering in &[OrderingKind::Greedy, OrderingKind::Dsatur, OrderingKind::MaxDeg]
                {
                    let algo = CcAlgorithm {
                        orientation,
                        step,
                        ordering,
                        chooser: ColorChooser::NextFree,
                        optimize: false,
                        preprocess: None,
                    };
                    assert_valid(&g, &algo, 3);
                }
            }
        }
    }

    #[test]
    fn verify_rejects_improper_colorings() {
        let mut g = Graph::new();
        g.add_edge(0, 1);
        let mut col = Coloring::new();
        col.set(0, 0);
        col.set(1, 0);
        assert!(verify_coloring(&g, &col, 2).is_err());
    }

    #[test]
    fn verify_rejects_uncentered_colorings() {
        let mut g = Graph::new();
        for i in 0..3 {
            g.add_edge(i, i + 1);
        }
        let mut col = Coloring::new();
        for v in 0..4 {
            col.set(v, v % 2);
        }
        assert!(verify_coloring(&g, &col, 2).is_err());
    }
}
