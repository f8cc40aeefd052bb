//! File-to-count runs exercising the loaders, the configuration layer and
//! the execution-data archive

use std::fs;
use std::io::Read;
use std::path::Path;

use concuss::color::{verify_coloring, CcAlgorithm};
use concuss::config::PipelineConfig;
use concuss::count::PatternCounter;
use concuss::execdata::ExecDataWriter;
use concuss::graph::formats;
use concuss::graph::patterns::PatternDescriptor;

const C6_EDGELIST: &str = "# six-cycle\n0 1\n1 2\n2 3\n3 4\n4 5\n5 0\n";

fn write_temp(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_configured(config: &PipelineConfig, graph_path: &Path, pattern: &str) -> u64 {
    let mut host = formats::load_graph(graph_path).unwrap();
    host.remove_loops();
    let descriptor = PatternDescriptor::parse(pattern).unwrap().unwrap();
    let motif = descriptor.generate();
    let td = descriptor.treedepth_lower_bound();

    let coloring = config.coloring.start(&host, motif.len()).unwrap();
    let mut counter = PatternCounter::new(
        &host,
        &coloring,
        vec![(motif, td)],
        config.pattern_kind,
        config.table_hints,
        config.sweep,
        config.combiner,
    )
    .unwrap();
    counter.count_patterns().unwrap()[0]
}

#[test]
fn counts_a_cycle_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = write_temp(dir.path(), "c6.txt", C6_EDGELIST);
    let config = PipelineConfig::default();
    assert_eq!(run_configured(&config, &graph_path, "path3"), 6);
}

#[test]
fn a_nondefault_config_gets_the_same_count() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = write_temp(dir.path(), "c6.txt", C6_EDGELIST);
    let config_path = write_temp(
        dir.path(),
        "alt.cfg",
        "[color]\nlow_degree_orientation = sandpile_orientation\ncoloring = dsatur\n\
         [compute]\nk_pattern = KPattern\ntable_forward = true\ntable_reuse = false\n\
         [combine]\ncount = ColorCount\n[decompose]\nsweep = CombinationsSweep\n",
    );
    let config = PipelineConfig::load(&config_path).unwrap();
    assert_eq!(run_configured(&config, &graph_path, "path3"), 6);
}

#[test]
fn loads_every_supported_format() {
    let dir = tempfile::tempdir().unwrap();
    let reference = formats::load_graph(write_temp(dir.path(), "g.txt", C6_EDGELIST)).unwrap();

    let gml = write_temp(
        dir.path(),
        "g.gml",
        &concuss::graph::formats::render_gml(&reference),
    );
    assert_eq!(formats::load_graph(gml).unwrap(), reference);

    let leda = write_temp(
        dir.path(),
        "g.leda",
        &concuss::graph::formats::render_leda(&reference),
    );
    assert_eq!(formats::load_graph(leda).unwrap(), reference);

    let gexf = write_temp(
        dir.path(),
        "g.gexf",
        r#"<gexf><graph defaultedgetype="undirected"><edges>
            <edge id="0" source="0" target="1" />
            <edge id="1" source="1" target="2" />
        </edges></graph></gexf>"#,
    );
    assert_eq!(formats::load_graph(gexf).unwrap().num_edges(), 2);
}

#[test]
fn coloring_files_round_trip_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = write_temp(dir.path(), "c6.txt", C6_EDGELIST);
    let host = formats::load_graph(&graph_path).unwrap();

    let coloring = CcAlgorithm::default().start(&host, 3).unwrap();
    let color_path = dir.path().join("c6.colors");
    assert!(formats::save_coloring(&coloring, &color_path, false).unwrap());

    let loaded = formats::load_coloring(&color_path).unwrap();
    assert_eq!(loaded, coloring);
    verify_coloring(&host, &loaded, 3).unwrap();

    // a coloring with more colors does not replace the cached one
    let mut worse = loaded.clone();
    for (i, v) in host.vertices().enumerate() {
        worse.set(v, i);
    }
    assert!(!formats::save_coloring(&worse, &color_path, false).unwrap());
    // unless overwriting is forced
    assert!(formats::save_coloring(&worse, &color_path, true).unwrap());
}

#[test]
fn execdata_archive_contains_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = write_temp(dir.path(), "c6.txt", C6_EDGELIST);
    let mut host = formats::load_graph(&graph_path).unwrap();
    host.remove_loops();
    let motif = concuss::graph::patterns::path(3);

    let coloring = CcAlgorithm::default().start(&host, 3).unwrap();
    let config = PipelineConfig::default();
    let mut counter = PatternCounter::new(
        &host,
        &coloring,
        vec![(motif.clone(), 2)],
        config.pattern_kind,
        config.table_hints,
        config.sweep,
        config.combiner,
    )
    .unwrap();
    counter.enable_execdata().unwrap();
    let counts = counter.count_patterns().unwrap();
    let capture = counter.take_execdata().unwrap();
    assert!(!capture.colorset_counts.is_empty());
    assert!(capture.largest.is_some());

    let zip_path = dir.path().join("exec.zip");
    ExecDataWriter {
        config_text: "# test configuration\n",
        graph_path: &graph_path,
        graph: &host,
        pattern: &motif,
        pattern_name: "path3",
        coloring: &coloring,
        capture: &capture,
        count: counts[0],
    }
    .write(&zip_path)
    .unwrap();

    let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    for expected in &[
        "config.cfg",
        "graph/c6.txt",
        "graph/pattern.txt",
        "visinfo.cfg",
        "coloring/coloring.txt",
        "decompose/big_component.txt",
        "decompose/tdd.txt",
        "count/dp_table.txt",
        "combine/counts_per_colorset.txt",
        "count.txt",
    ] {
        assert!(
            names.iter().any(|n| n == expected),
            "archive is missing {}",
            expected
        );
    }

    let mut counts_file = String::new();
    archive
        .by_name("combine/counts_per_colorset.txt")
        .unwrap()
        .read_to_string(&mut counts_file)
        .unwrap();
    assert!(counts_file.lines().all(|l| l.contains(" : ")));
}
