//! Generators and treedepth bounds for the named pattern families

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::graph::Graph;

/// The pattern families the descriptor mini-language knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFamily {
    Clique,
    Cycle,
    Path,
    Star,
    Wheel,
    Biclique,
}

impl FromStr for PatternFamily {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "clique" => Ok(PatternFamily::Clique),
            "cycle" => Ok(PatternFamily::Cycle),
            "path" => Ok(PatternFamily::Path),
            "star" => Ok(PatternFamily::Star),
            "wheel" => Ok(PatternFamily::Wheel),
            "biclique" => Ok(PatternFamily::Biclique),
            _ => Err(()),
        }
    }
}

/// A parsed pattern descriptor such as `clique4` or `biclique2,3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDescriptor {
    pub family: PatternFamily,
    pub sizes: Vec<usize>,
}

impl PatternDescriptor {
    /// Parse `name{n}` / `biclique{m},{n}` descriptors. Returns `None` when
    /// the string is not in descriptor form at all (so callers can fall back
    /// to treating it as a filename) and an error for a known family with
    /// bad arguments.
    pub fn parse(descriptor: &str) -> Option<Result<PatternDescriptor>> {
        let split = descriptor.find(|c: char| !c.is_ascii_alphabetic())?;
        let family: PatternFamily = descriptor[..split].parse().ok()?;
        let sizes: std::result::Result<Vec<usize>, _> = descriptor[split..]
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect();
        let sizes = match sizes {
            Ok(sizes) => sizes,
            Err(_) => return Some(Err(Error::UnknownPattern(descriptor.to_string()))),
        };

        let arity_ok = match family {
            PatternFamily::Biclique => sizes.len() == 2,
            _ => sizes.len() == 1,
        };
        if !arity_ok || sizes.iter().any(|&s| s == 0) {
            return Some(Err(Error::UnknownPattern(descriptor.to_string())));
        }
        Some(Ok(PatternDescriptor { family, sizes }))
    }

    /// Build the pattern graph.
    pub fn generate(&self) -> Graph {
        match self.family {
            PatternFamily::Clique => clique(self.sizes[0]),
            PatternFamily::Cycle => cycle(self.sizes[0]),
            PatternFamily::Path => path(self.sizes[0]),
            PatternFamily::Star => star(self.sizes[0]),
            PatternFamily::Wheel => wheel(self.sizes[0]),
            PatternFamily::Biclique => biclique(self.sizes[0], self.sizes[1]),
        }
    }

    /// Lower bound on the treedepth of the generated pattern.
    ///
    /// Exact for cliques, stars and bicliques; the logarithmic bounds for
    /// paths, cycles and wheels come from halving the longest path.
    pub fn treedepth_lower_bound(&self) -> usize {
        let n = self.sizes[0];
        match self.family {
            PatternFamily::Star => 2,
            PatternFamily::Clique => n,
            PatternFamily::Path => log2_ceil(n + 1),
            PatternFamily::Cycle => log2_ceil(n) + 1,
            PatternFamily::Wheel => log2_ceil(n - 1) + 2,
            PatternFamily::Biclique => self.sizes[0].min(self.sizes[1]) + 1,
        }
    }
}

/// Treedepth lower bound for an arbitrary pattern graph.
pub fn treedepth_lower_bound(pattern: &Graph) -> usize {
    2.max(pattern.degeneracy())
}

fn log2_ceil(n: usize) -> usize {
    let mut bound = 0;
    let mut reach = 1usize;
    while reach < n {
        reach *= 2;
        bound += 1;
    }
    bound
}

pub fn clique(n: usize) -> Graph {
    let mut pattern = Graph::new();
    pattern.add_node(0);
    for u in 0..n {
        for v in u + 1..n {
            pattern.add_edge(u, v);
        }
    }
    pattern
}

pub fn cycle(n: usize) -> Graph {
    let mut pattern = Graph::new();
    for u in 0..n {
        pattern.add_edge(u, (u + 1) % n);
    }
    pattern
}

pub fn path(n: usize) -> Graph {
    let mut pattern = Graph::new();
    pattern.add_node(0);
    for u in 0..n.saturating_sub(1) {
        pattern.add_edge(u, u + 1);
    }
    pattern
}

pub fn star(n: usize) -> Graph {
    let mut pattern = Graph::new();
    pattern.add_node(0);
    for v in 1..n {
        pattern.add_edge(0, v);
    }
    pattern
}

pub fn wheel(n: usize) -> Graph {
    let mut pattern = cycle(n - 1);
    let hub = n - 1;
    for v in 0..n - 1 {
        pattern.add_edge(v, hub);
    }
    pattern
}

pub fn biclique(m: usize, n: usize) -> Graph {
    let mut pattern = Graph::new();
    for u in 0..m {
        for v in 0..n {
            pattern.add_edge(u, m + v);
        }
    }
    pattern
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn descriptor_parsing() {
        let d = PatternDescriptor::parse("clique4").unwrap().unwrap();
        assert_eq!(d.family, PatternFamily::Clique);
        assert_eq!(d.sizes, vec![4]);

        let d = PatternDescriptor::parse("biclique2,3").unwrap().unwrap();
        assert_eq!(d.sizes, vec![2, 3]);

        // not a descriptor at all: the caller treats it as a filename
        assert!(PatternDescriptor::parse("karate.txt").is_none());
        // a known family with broken arguments is an error
        assert!(PatternDescriptor::parse("clique2,3").unwrap().is_err());
        assert!(PatternDescriptor::parse("biclique4").unwrap().is_err());
    }

    #[test]
    fn generated_sizes() {
        assert_eq!(clique(4).num_edges(), 6);
        assert_eq!(cycle(5).num_edges(), 5);
        assert_eq!(path(5).num_edges(), 4);
        assert_eq!(star(5).num_edges(), 4);
        assert_eq!(wheel(5).num_edges(), 8);
        let b = biclique(2, 3);
        assert_eq!(b.len(), 5);
        assert_eq!(b.num_edges(), 6);
    }

    #[test]
    fn treedepth_bounds() {
        let td = |s: &str| {
            PatternDescriptor::parse(s)
                .unwrap()
                .unwrap()
                .treedepth_lower_bound()
        };
        assert_eq!(td("clique4"), 4);
        assert_eq!(td("star7"), 2);
        assert_eq!(td("path3"), 2);
        assert_eq!(td("path4"), 3);
        assert_eq!(td("cycle4"), 3);
        assert_eq!(td("biclique2,3"), 3);

        // generic fallback uses the degeneracy
        assert_eq!(treedepth_lower_bound(&clique(3)), 2.max(2));
        assert_eq!(treedepth_lower_bound(&path(4)), 2);
    }
}
