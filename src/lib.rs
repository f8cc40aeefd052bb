//! Counting occurrences of a small pattern graph in a large sparse host
//! graph, exploiting bounded-expansion structure.
//!
//! The kernel has three parts: a p-centered coloring engine (low-degree
//! orientation, iterated transitive-fraternal augmentation, bit-packed
//! union-find verification), a color-set sweep that turns the components
//! induced by every small set of color classes into treedepth
//! decompositions, and a k-pattern dynamic program over each decomposition
//! whose per-color-set counts a combiner folds into one total.
//!
//! ```no_run
//! use concuss::color::CcAlgorithm;
//! use concuss::count::{CombinerKind, PatternCounter, PatternKind, TableHints};
//! use concuss::decompose::SweepKind;
//! use concuss::graph::{formats, patterns};
//!
//! # fn main() -> concuss::error::Result<()> {
//! let host = formats::load_graph("karate.txt")?;
//! let motif = patterns::clique(3);
//! let coloring = CcAlgorithm::default().start(&host, motif.len())?;
//! let mut counter = PatternCounter::new(
//!     &host,
//!     &coloring,
//!     vec![(motif, 3)],
//!     PatternKind::MemoizedBv,
//!     TableHints::default(),
//!     SweepKind::Dfs,
//!     CombinerKind::InclusionExclusion,
//! )?;
//! println!("{}", counter.count_patterns()?[0]);
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod config;
pub mod count;
pub mod decompose;
pub mod error;
pub mod execdata;
pub mod graph;
