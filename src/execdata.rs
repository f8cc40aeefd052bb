//! Execution-data archive for the external visualiser
//!
//! A zip holding the run's inputs (config, host graph, pattern) plus
//! per-stage artifacts: the coloring, the largest component with its
//! treedepth decomposition and DP table dump, and the per-color-set counts.

use std::fs;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::count::ExecCapture;
use crate::error::{Error, Result};
use crate::graph::{Coloring, Graph};
use crate::graph::formats::render_edgelist;

pub struct ExecDataWriter<'a> {
    pub config_text: &'a str,
    pub graph_path: &'a Path,
    pub graph: &'a Graph,
    pub pattern: &'a Graph,
    pub pattern_name: &'a str,
    pub coloring: &'a Coloring,
    pub capture: &'a ExecCapture,
    pub count: u64,
}

impl<'a> ExecDataWriter<'a> {
    /// Write the archive; entries are stored uncompressed.
    pub fn write(&self, out_path: impl AsRef<Path>) -> Result<()> {
        let file = fs::File::create(out_path.as_ref())?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);

        let wrap = |e: zip::result::ZipError| Error::ExecData(e.to_string());

        zip.start_file("config.cfg", options).map_err(wrap)?;
        zip.write_all(self.config_text.as_bytes())?;

        let graph_name = self
            .graph_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("graph.txt");
        zip.start_file(format!("graph/{}", graph_name), options)
            .map_err(wrap)?;
        zip.write_all(fs::read(self.graph_path).unwrap_or_else(|_| {
            render_edgelist(self.graph, '\t', 0).into_bytes()
        }).as_slice())?;

        zip.start_file("graph/pattern.txt", options).map_err(wrap)?;
        zip.write_all(render_edgelist(self.pattern, '\t', 0).as_bytes())?;

        zip.start_file("visinfo.cfg", options).map_err(wrap)?;
        zip.write_all(self.visinfo(graph_name).as_bytes())?;

        zip.start_file("coloring/coloring.txt", options).map_err(wrap)?;
        zip.write_all(self.render_coloring().as_bytes())?;

        if let Some(largest) = self.capture.largest.as_ref() {
            zip.start_file("decompose/big_component.txt", options)
                .map_err(wrap)?;
            let edges = largest
                .edges
                .iter()
                .map(|(u, v)| format!("{}\t{}", u, v))
                .join("\n");
            zip.write_all(edges.as_bytes())?;

            zip.start_file("decompose/tdd.txt", options).map_err(wrap)?;
            let tdd = largest
                .tdd_lines
                .iter()
                .map(|(child, parent)| format!("{} {}", child, parent))
                .join("\n");
            zip.write_all(tdd.as_bytes())?;

            zip.start_file("count/dp_table.txt", options).map_err(wrap)?;
            zip.write_all(largest.table_dump.as_bytes())?;
        }

        zip.start_file("combine/counts_per_colorset.txt", options)
            .map_err(wrap)?;
        let mut counts = String::new();
        for (colors, count) in &self.capture.colorset_counts {
            counts.push_str(&format!(
                "{} : {}\n",
                colors.iter().map(|c| c.to_string()).join(","),
                count
            ));
        }
        zip.write_all(counts.as_bytes())?;

        zip.start_file("count.txt", options).map_err(wrap)?;
        zip.write_all(format!("{}\n", self.count).as_bytes())?;

        zip.finish().map_err(wrap)?;
        Ok(())
    }

    fn visinfo(&self, graph_name: &str) -> String {
        format!(
            "[files]\ngraph = graph/{}\npattern = graph/pattern.txt\ncoloring = coloring/coloring.txt\n\
             [pipeline]\npattern_name = {}\ncolors = {}\n",
            graph_name,
            self.pattern_name,
            self.coloring.num_colors()
        )
    }

    fn render_coloring(&self) -> String {
        let mut out = format!("{}\n", self.coloring.num_colors());
        for v in self.coloring.vertices() {
            out.push_str(&format!("{}: {}\n", v, self.coloring.get(v).unwrap_or(0)));
        }
        out
    }
}
