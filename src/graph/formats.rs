//! Reading and writing graphs and colorings in the supported file formats

use std::fs;
use std::io::Write;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};
use crate::graph::{Coloring, Graph, Vertex};

fn format_err(path: &Path, reason: impl Into<String>) -> Error {
    Error::GraphFormat {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Load a graph, picking the parser from the file extension.
///
/// Supported: `.txt` (edge list), `.leda`, `.gml`, `.gexf`, `.graphml`.
pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let text = fs::read_to_string(path)?;
    match ext.as_str() {
        "txt" => read_edgelist(&text, path),
        "leda" => read_leda(&text, path),
        "gml" => read_gml(&text, path),
        "gexf" | "graphml" => read_xml_edges(&text, path),
        other => Err(format_err(
            path,
            format!("unknown input file format `.{}`", other),
        )),
    }
}

/// Write a graph, picking the writer from the file extension.
///
/// Supported: `.txt` (edge list), `.leda`, `.gml`.
pub fn write_graph(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let rendered = match ext.as_str() {
        "txt" => render_edgelist(graph, '\t', 0),
        "leda" => render_leda(graph),
        "gml" => render_gml(graph),
        other => {
            return Err(format_err(
                path,
                format!("unknown output file format `.{}`", other),
            ))
        }
    };
    let mut file = fs::File::create(path)?;
    file.write_all(rendered.as_bytes())?;
    Ok(())
}

fn read_edgelist(text: &str, path: &Path) -> Result<Graph> {
    let mut graph = Graph::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (s, t) = match (fields.next(), fields.next()) {
            (Some(s), Some(t)) => (s, t),
            _ => return Err(format_err(path, format!("bad edge line `{}`", line))),
        };
        let s: Vertex = s
            .parse()
            .map_err(|_| format_err(path, format!("bad vertex id `{}`", s)))?;
        let t: Vertex = t
            .parse()
            .map_err(|_| format_err(path, format!("bad vertex id `{}`", t)))?;
        graph.add_edge(s, t);
    }
    Ok(graph)
}

pub fn render_edgelist(graph: &Graph, sep: char, base: usize) -> String {
    let mut out = String::new();
    for (u, v) in graph.edges() {
        out.push_str(&format!("{}{}{}\n", u + base, sep, v + base));
    }
    out
}

/// LEDA graphs are 1-based; ids are shifted down on the way in.
fn read_leda(text: &str, path: &Path) -> Result<Graph> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    // header: LEDA.GRAPH, two type lines, directedness flag
    for _ in 0..4 {
        lines
            .next()
            .ok_or_else(|| format_err(path, "truncated LEDA preamble"))?;
    }
    let num_vertices: usize = lines
        .next()
        .and_then(|l| l.parse().ok())
        .ok_or_else(|| format_err(path, "missing vertex count"))?;
    // vertex labels are not needed
    for _ in 0..num_vertices {
        lines
            .next()
            .ok_or_else(|| format_err(path, "truncated vertex section"))?;
    }
    let _num_edges: usize = lines
        .next()
        .and_then(|l| l.parse().ok())
        .ok_or_else(|| format_err(path, "missing edge count"))?;

    let mut graph = Graph::new();
    for line in lines {
        let mut fields = line.split_whitespace();
        let (s, t) = match (fields.next(), fields.next()) {
            (Some(s), Some(t)) => (s, t),
            _ => return Err(format_err(path, format!("bad edge line `{}`", line))),
        };
        let s: Vertex = s
            .parse()
            .map_err(|_| format_err(path, format!("bad vertex id `{}`", s)))?;
        let t: Vertex = t
            .parse()
            .map_err(|_| format_err(path, format!("bad vertex id `{}`", t)))?;
        if s == 0 || t == 0 {
            return Err(format_err(path, "LEDA vertex ids are 1-based"));
        }
        graph.add_edge(s - 1, t - 1);
    }
    Ok(graph)
}

pub fn render_leda(graph: &Graph) -> String {
    let mut out = String::from("LEDA.GRAPH\nstring\nstring\n-1\n");
    out.push_str(&format!("{}\n", graph.len()));
    for _ in graph.vertices() {
        out.push_str("|{}|\n");
    }
    out.push_str(&format!("{}\n", graph.num_edges()));
    for (s, t) in graph.edges() {
        out.push_str(&format!("{} {} 0 |{{}}|\n", s + 1, t + 1));
    }
    out
}

/// Minimal GML block reader; only `node [ id .. ]` and
/// `edge [ source .. target .. ]` blocks are interpreted.
fn read_gml(text: &str, path: &Path) -> Result<Graph> {
    #[derive(Default)]
    struct EdgeFields {
        source: Option<Vertex>,
        target: Option<Vertex>,
    }

    let mut graph = Graph::new();
    let mut blocks: Vec<String> = Vec::new();
    let mut edge = EdgeFields::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["["] => {}
            ["]"] => {
                if blocks.pop().as_deref() == Some("edge") {
                    match (edge.source, edge.target) {
                        (Some(s), Some(t)) => graph.add_edge(s, t),
                        _ => return Err(format_err(path, "edge block without source/target")),
                    }
                    edge = EdgeFields::default();
                }
            }
            [name] => blocks.push(name.to_string()),
            [key, value, ..] => {
                let in_node = blocks.last().map(|b| b == "node").unwrap_or(false);
                let in_edge = blocks.last().map(|b| b == "edge").unwrap_or(false);
                let parse = |v: &str| -> Result<Vertex> {
                    v.parse()
                        .map_err(|_| format_err(path, format!("bad id `{}`", v)))
                };
                match (*key, in_node, in_edge) {
                    ("id", true, _) => graph.add_node(parse(value)?),
                    ("source", _, true) => edge.source = Some(parse(value)?),
                    ("target", _, true) => edge.target = Some(parse(value)?),
                    _ => {}
                }
            }
            _ => {}
        }
    }
    Ok(graph)
}

pub fn render_gml(graph: &Graph) -> String {
    let mut out = String::from("graph\n[\n");
    for v in graph.vertices() {
        out.push_str(&format!("\tnode\n\t[\n\t\tid {}\n\t]\n", v));
    }
    for (s, t) in graph.edges() {
        out.push_str(&format!(
            "\tedge\n\t[\n\t\tsource {}\n\t\ttarget {}\n\t]\n",
            s, t
        ));
    }
    out.push(']');
    out
}

/// GEXF and GraphML carry edges in `<edge source=".." target="..">` tags;
/// everything else in those files is irrelevant here.
fn read_xml_edges(text: &str, path: &Path) -> Result<Graph> {
    let edge_tag = Regex::new(r"<edge\b[^>]*>").unwrap();
    let source_attr = Regex::new(r#"source\s*=\s*"([^"]*)""#).unwrap();
    let target_attr = Regex::new(r#"target\s*=\s*"([^"]*)""#).unwrap();

    let mut graph = Graph::new();
    for tag in edge_tag.find_iter(text) {
        let tag = tag.as_str();
        let source = source_attr
            .captures(tag)
            .and_then(|c| c.get(1))
            .ok_or_else(|| format_err(path, format!("edge without source: `{}`", tag)))?;
        let target = target_attr
            .captures(tag)
            .and_then(|c| c.get(1))
            .ok_or_else(|| format_err(path, format!("edge without target: `{}`", tag)))?;
        let s: Vertex = source
            .as_str()
            .parse()
            .map_err(|_| format_err(path, format!("bad vertex id `{}`", source.as_str())))?;
        let t: Vertex = target
            .as_str()
            .parse()
            .map_err(|_| format_err(path, format!("bad vertex id `{}`", target.as_str())))?;
        graph.add_edge(s, t);
    }
    Ok(graph)
}

/// Read a coloring file: an optional leading color count, then `v: c` lines.
pub fn load_coloring(path: impl AsRef<Path>) -> Result<Coloring> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mut coloring = Coloring::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.contains(':') {
            continue;
        }
        let mut split = line.splitn(2, ':');
        let vertex = split.next().unwrap_or("").trim();
        let color = split.next().unwrap_or("").trim();
        let vertex: Vertex = vertex
            .parse()
            .map_err(|_| Error::InvalidColoring(format!("bad vertex id `{}`", vertex)))?;
        let color = color
            .parse()
            .map_err(|_| Error::InvalidColoring(format!("bad color `{}`", color)))?;
        coloring.set(vertex, color);
    }
    Ok(coloring)
}

/// Save a coloring in the `count` + `v: c` format.
///
/// Unless `overwrite` is set, an existing file is only replaced when the new
/// coloring uses fewer colors, so the cache keeps the best coloring found.
pub fn save_coloring(coloring: &Coloring, path: impl AsRef<Path>, overwrite: bool) -> Result<bool> {
    let path = path.as_ref();
    let num = coloring.num_colors();

    let mut write = overwrite;
    if !write {
        match fs::read_to_string(path) {
            Ok(existing) => {
                let before: usize = existing
                    .lines()
                    .next()
                    .and_then(|l| l.trim().parse().ok())
                    .unwrap_or(usize::MAX);
                write = before > num;
            }
            Err(_) => write = true,
        }
    }
    if !write {
        return Ok(false);
    }

    let mut out = format!("{}\n", num);
    for v in coloring.vertices() {
        out.push_str(&format!("{}: {}\n", v, coloring.get(v).unwrap_or(0)));
    }
    let mut file = fs::File::create(path)?;
    file.write_all(out.as_bytes())?;
    Ok(true)
}
