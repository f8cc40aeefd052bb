use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use concuss::color::{verify_coloring, CcAlgorithm};
use concuss::config::PipelineConfig;
use concuss::count::{CombinerKind, PatternCounter};
use concuss::execdata::ExecDataWriter;
use concuss::graph::patterns::{self, PatternDescriptor};
use concuss::graph::{formats, Coloring, Graph};

/// Count occurrences of a pattern graph in a host graph via p-centered
/// colorings.
#[derive(Parser, Debug)]
#[command(name = "concuss", version)]
struct Cli {
    /// Filename of the host graph
    graph: String,

    /// Pattern: a graph filename or a name like clique4, path5, star6,
    /// wheel5, cycle6, biclique2,3
    pattern: String,

    /// Filename of the configuration settings
    config: Option<String>,

    /// Filename of the result
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Filename of an existing p-centered coloring
    #[arg(short = 'c', long = "coloring")]
    coloring: Option<String>,

    /// Do not verify the correctness of the existing coloring
    #[arg(short = 'C', long = "coloring-no-verify")]
    coloring_no_verify: bool,

    /// File with one pattern descriptor per line
    #[arg(short = 'm', long = "multi")]
    multi_pat_file: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Log wall-clock timings of the pipeline stages
    #[arg(short = 'p', long = "profile")]
    profile: bool,

    /// Write an execution-data archive for the visualizer
    #[arg(short = 'e', long = "execdata")]
    execdata: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.config.as_deref() {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("cannot load configuration {}", path))?,
        None => PipelineConfig::default(),
    };

    if cli.execdata.is_some() && cli.multi_pat_file.is_some() {
        bail!("execution data capture cannot be combined with multi-pattern files");
    }
    if cli.execdata.is_some() && config.combiner != CombinerKind::InclusionExclusion {
        bail!("execution data capture requires the InclusionExclusion combiner");
    }

    let read_start = Instant::now();

    // one (name, graph, treedepth lower bound) triple per pattern
    let descriptors = match cli.multi_pat_file.as_deref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read pattern file {}", path))?;
            let lines: Vec<String> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            if lines.is_empty() {
                bail!("pattern file {} contains no patterns", path);
            }
            lines
        }
        None => vec![cli.pattern.clone()],
    };
    let mut motifs = Vec::new();
    for descriptor in &descriptors {
        motifs.push(load_pattern(descriptor)?);
    }

    let mut host = formats::load_graph(&cli.graph)
        .with_context(|| format!("cannot load graph {}", cli.graph))?;
    host.remove_loops();
    info!(
        vertices = host.len(),
        edges = host.num_edges(),
        "host graph loaded"
    );
    if cli.profile {
        info!(elapsed = ?read_start.elapsed(), "stage: reading graphs");
    }

    let p = motifs.iter().map(|(_, h, _)| h.len()).max().unwrap_or(0);

    let color_start = Instant::now();
    let coloring = obtain_coloring(&cli, &config, &host, p)?;
    info!(colors = coloring.num_colors(), "coloring ready");
    if cli.profile {
        info!(elapsed = ?color_start.elapsed(), "stage: coloring");
    }

    let count_start = Instant::now();
    let jobs: Vec<(Graph, usize)> = motifs
        .iter()
        .map(|(_, h, td)| (h.clone(), *td))
        .collect();
    let mut counter = PatternCounter::new(
        &host,
        &coloring,
        jobs,
        config.pattern_kind,
        config.table_hints,
        config.sweep,
        config.combiner,
    )?;
    if cli.execdata.is_some() {
        counter.enable_execdata()?;
    }
    let counts = counter.count_patterns()?;
    if cli.profile {
        info!(elapsed = ?count_start.elapsed(), "stage: pattern counting");
    }

    let mut report = String::new();
    for ((name, _, _), count) in motifs.iter().zip(&counts) {
        if motifs.len() > 1 {
            report.push_str(&format!("{}: {}\n", name, count));
        } else {
            report.push_str(&format!("Number of occurrences of H in G: {}\n", count));
        }
    }
    print!("{}", report);

    if let Some(out) = cli.output.as_deref() {
        fs::write(out, &report).with_context(|| format!("cannot write {}", out))?;
    }

    if let Some(exec_path) = cli.execdata.as_deref() {
        let capture = counter
            .take_execdata()
            .context("execution data was not captured")?;
        let config_text = match cli.config.as_deref() {
            Some(path) => fs::read_to_string(path)?,
            None => String::from("# default configuration\n"),
        };
        let (pattern_name, pattern, _) = &motifs[0];
        ExecDataWriter {
            config_text: &config_text,
            graph_path: Path::new(&cli.graph),
            graph: &host,
            pattern,
            pattern_name,
            coloring: &coloring,
            capture: &capture,
            count: counts[0],
        }
        .write(exec_path)?;
        info!(path = exec_path, "execution data written");
    }

    Ok(())
}

/// Resolve a pattern descriptor: a family name like `clique4` or a filename.
fn load_pattern(descriptor: &str) -> Result<(String, Graph, usize)> {
    match PatternDescriptor::parse(descriptor) {
        Some(parsed) => {
            let parsed = parsed?;
            let motif = parsed.generate();
            let td = parsed.treedepth_lower_bound();
            debug!(descriptor, td, "generated pattern");
            Ok((descriptor.to_string(), motif, td))
        }
        None => {
            let mut motif = formats::load_graph(descriptor)
                .with_context(|| format!("cannot load pattern {}", descriptor))?;
            motif.remove_loops();
            let td = patterns::treedepth_lower_bound(&motif);
            debug!(descriptor, td, "loaded pattern file");
            Ok((descriptor.to_string(), motif, td))
        }
    }
}

fn obtain_coloring(
    cli: &Cli,
    config: &PipelineConfig,
    host: &Graph,
    p: usize,
) -> Result<Coloring> {
    if let Some(color_file) = cli.coloring.as_deref() {
        let coloring = formats::load_coloring(color_file)
            .with_context(|| format!("cannot load coloring {}", color_file))?;
        if cli.coloring_no_verify {
            warn!("using the supplied coloring without verification");
        } else {
            info!("verifying supplied coloring");
            verify_coloring(host, &coloring, p)?;
            info!("coloring is correct");
        }
        return Ok(coloring);
    }

    let coloring = config.coloring.start(host, p)?;
    cache_coloring(&cli.graph, p, &coloring);
    Ok(coloring)
}

/// Keep the best coloring found for this graph and depth under `colorings/`.
fn cache_coloring(graph_path: &str, p: usize, coloring: &Coloring) {
    let stem = Path::new(graph_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("graph")
        .to_string();
    let dir = PathBuf::from("colorings");
    if fs::create_dir_all(&dir).is_err() {
        warn!("cannot create the colorings cache directory");
        return;
    }
    let target = dir.join(format!("{}{}", stem, p));
    match formats::save_coloring(coloring, &target, false) {
        Ok(true) => debug!(path = %target.display(), "coloring cached"),
        Ok(false) => debug!("cached coloring is already at least as good"),
        Err(err) => warn!(%err, "cannot cache the coloring"),
    }
}
