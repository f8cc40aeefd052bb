//! Treedepth decompositions

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::graph::{Color, Coloring, Graph, Vertex};

/// Placement of one vertex in the decomposition forest.
#[derive(Debug, Clone, Default)]
struct VertexInfo {
    parent: Option<Vertex>,
    children: Vec<Vertex>,
    depth: Option<usize>,
}

/// Rooted forest over an induced subgraph of the host graph.
///
/// Every edge of the underlying subgraph joins an ancestor-descendant pair;
/// `depth(parent(v)) + 1 == depth(v)` and `max_depth` is one more than the
/// deepest vertex. Built per component by the sweep, consumed by the dynamic
/// program, then dropped.
#[derive(Debug, Clone)]
pub struct TdDecomposition {
    graph: Graph,
    records: HashMap<Vertex, VertexInfo>,
    colors: HashMap<Vertex, Color>,
    max_depth: usize,
    root: Option<Vertex>,
}

impl TdDecomposition {
    /// Build the shell of a decomposition from the subgraph induced on
    /// `vertices`, remembering each vertex's color.
    pub fn from_subgraph(graph: &Graph, vertices: &BTreeSet<Vertex>, coloring: &Coloring) -> Self {
        let sub = graph.subgraph(vertices);
        let records = vertices
            .iter()
            .map(|&v| (v, VertexInfo::default()))
            .collect();
        let colors = vertices
            .iter()
            .filter_map(|&v| coloring.get(v).map(|c| (v, c)))
            .collect();
        TdDecomposition {
            graph: sub,
            records,
            colors,
            max_depth: 0,
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.graph.vertices()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn root(&self) -> Option<Vertex> {
        self.root
    }

    pub fn color_of(&self, v: Vertex) -> Option<Color> {
        self.colors.get(&v).copied()
    }

    /// Depth of the whole decomposition (deepest vertex plus one).
    pub fn depth(&self) -> usize {
        self.max_depth
    }

    pub fn vertex_depth(&self, v: Vertex) -> usize {
        self.records[&v].depth.unwrap_or(0)
    }

    pub fn children(&self, v: Vertex) -> &[Vertex] {
        &self.records[&v].children
    }

    pub fn parent(&self, v: Vertex) -> Option<Vertex> {
        self.records[&v].parent
    }

    pub fn is_leaf(&self, v: Vertex) -> bool {
        self.records[&v].children.is_empty()
    }

    pub fn leaves(&self) -> Vec<Vertex> {
        self.vertices().filter(|&v| self.is_leaf(v)).collect()
    }

    /// Make `parent` the parent of `v`; `None` roots the vertex.
    pub fn update_parent_child(&mut self, v: Vertex, parent: Option<Vertex>) {
        match parent {
            None => {
                self.root = Some(v);
                self.records.get_mut(&v).unwrap().depth = Some(0);
            }
            Some(p) => {
                let parent_depth = self.records[&p].depth.unwrap_or(0);
                let rec = self.records.get_mut(&v).unwrap();
                rec.parent = Some(p);
                rec.depth = Some(parent_depth + 1);
                self.records.get_mut(&p).unwrap().children.push(v);
                self.max_depth = self.max_depth.max(parent_depth + 2);
            }
        }
    }

    /// Attach a whole batch of children below `parent` in one pass.
    pub fn update_parent_children(&mut self, children: &BTreeSet<Vertex>, parent: Vertex) {
        let parent_depth = self.records[&parent].depth.unwrap_or(0);
        for &v in children {
            let rec = self.records.get_mut(&v).unwrap();
            rec.parent = Some(parent);
            rec.depth = Some(parent_depth + 1);
            self.records.get_mut(&parent).unwrap().children.push(v);
        }
        if !children.is_empty() {
            self.max_depth = self.max_depth.max(parent_depth + 2);
        }
    }

    /// The path from the root down to `v`, root first.
    pub fn root_path(&self, v: Vertex) -> Vec<Vertex> {
        let mut path = Vec::new();
        let mut curr = Some(v);
        while let Some(u) = curr {
            path.push(u);
            curr = self.records[&u].parent;
        }
        path.reverse();
        path
    }

    /// Verify the parent/child/depth bookkeeping is consistent.
    pub fn check_consistency(&self) -> Result<()> {
        for v in self.vertices() {
            match self.parent(v) {
                None => {
                    if self.vertex_depth(v) != 0 {
                        return Err(Error::Internal(format!(
                            "vertex {} has no parent but depth {}",
                            v,
                            self.vertex_depth(v)
                        )));
                    }
                }
                Some(p) => {
                    if self.vertex_depth(p) + 1 != self.vertex_depth(v) {
                        return Err(Error::Internal(format!(
                            "vertex {} has depth {} under a parent of depth {}",
                            v,
                            self.vertex_depth(v),
                            self.vertex_depth(p)
                        )));
                    }
                }
            }
            for &c in self.children(v) {
                if self.parent(c) != Some(v) {
                    return Err(Error::Internal(format!(
                        "vertex {} lists child {} which claims parent {:?}",
                        v,
                        c,
                        self.parent(c)
                    )));
                }
            }
        }
        Ok(())
    }
}
