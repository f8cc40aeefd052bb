//! Configuration file loading
//!
//! The pipeline is configured by a small INI dialect with sections `color`,
//! `compute`, `combine` and `decompose`; every recognised option maps a
//! name onto one variant of a closed enum at startup, so the hot loops never
//! see a string again.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::color::{CcAlgorithm, ColorChooser, OrderingKind, OrientationKind, PreprocessKind, StepKind};
use crate::count::{CombinerKind, PatternKind, TableHints};
use crate::decompose::SweepKind;
use crate::error::{Error, Result};

/// Fully resolved pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub coloring: CcAlgorithm,
    pub pattern_kind: PatternKind,
    pub table_hints: TableHints,
    pub combiner: CombinerKind,
    pub sweep: SweepKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            coloring: CcAlgorithm::default(),
            pattern_kind: PatternKind::MemoizedBv,
            table_hints: TableHints::default(),
            combiner: CombinerKind::InclusionExclusion,
            sweep: SweepKind::Dfs,
        }
    }
}

impl PipelineConfig {
    /// Load and resolve a configuration file; unknown names abort.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw = parse_ini(text)?;
        let mut config = PipelineConfig::default();

        if let Some(value) = raw.get("color", "low_degree_orientation") {
            config.coloring.orientation = match value {
                "low_degree_orientation" => OrientationKind::LowDegree,
                "sandpile_orientation" => OrientationKind::Sandpile,
                other => return Err(unknown("color.low_degree_orientation", other)),
            };
        }
        if let Some(value) = raw.get("color", "step") {
            config.coloring.step = match value {
                "trans_frater_augmentation" => StepKind::TransFrater,
                "truncated_tf_augmentation" => StepKind::TruncatedTf,
                other => return Err(unknown("color.step", other)),
            };
        }
        if let Some(value) = raw.get("color", "coloring") {
            config.coloring.ordering = match value {
                "greedy_coloring" => OrderingKind::Greedy,
                "dsatur" => OrderingKind::Dsatur,
                "max_deg" => OrderingKind::MaxDeg,
                other => return Err(unknown("color.coloring", other)),
            };
        }
        if let Some(value) = raw.get("color", "color_choice") {
            config.coloring.chooser = match value {
                "next_free_color" => ColorChooser::NextFree,
                "least_used_color" => ColorChooser::LeastUsed,
                "most_used_color" => ColorChooser::MostUsed,
                other => return Err(unknown("color.color_choice", other)),
            };
        }
        if let Some(value) = raw.get("color", "check_tree_depth") {
            if value != "check_tree_depth" {
                return Err(unknown("color.check_tree_depth", value));
            }
        }
        if let Some(value) = raw.get("color", "optimization") {
            config.coloring.optimize = match value {
                "optimization_interval" => true,
                "" | "none" => false,
                other => return Err(unknown("color.optimization", other)),
            };
        }
        if let Some(value) = raw.get("color", "preprocess") {
            config.coloring.preprocess = match value {
                "trim_high_degree" => Some(PreprocessKind::TrimHighDegree),
                "trim_low_and_high_degree" => Some(PreprocessKind::TrimLowAndHighDegree),
                "" | "none" => None,
                other => return Err(unknown("color.preprocess", other)),
            };
        }

        if let Some(value) = raw.get("compute", "k_pattern") {
            config.pattern_kind = match value {
                "KPattern" => PatternKind::Dict,
                "BVKPattern" => PatternKind::Bv,
                "MemoizedKPattern" => PatternKind::MemoizedDict,
                "MemoizedBVKPattern" => PatternKind::MemoizedBv,
                other => return Err(unknown("compute.k_pattern", other)),
            };
        }
        if let Some(value) = raw.get("compute", "table_forward") {
            config.table_hints.forward = parse_bool("compute.table_forward", value)?;
        }
        if let Some(value) = raw.get("compute", "table_reuse") {
            config.table_hints.reuse = parse_bool("compute.table_reuse", value)?;
        }

        if let Some(value) = raw.get("combine", "count") {
            config.combiner = match value {
                "InclusionExclusion" => CombinerKind::InclusionExclusion,
                "ColorCount" => CombinerKind::ColorCount,
                "HybridCount" => CombinerKind::HybridCount,
                "BVColorCount" => CombinerKind::BvColorCount,
                "BVHybridCount" => CombinerKind::BvHybridCount,
                other => return Err(unknown("combine.count", other)),
            };
        }
        if let Some(value) = raw.get("decompose", "sweep") {
            config.sweep = match value {
                "CombinationsSweep" => SweepKind::Combinations,
                "DFSSweep" => SweepKind::Dfs,
                other => return Err(unknown("decompose.sweep", other)),
            };
        }

        Ok(config)
    }
}

fn unknown(option: &str, value: &str) -> Error {
    Error::Config(format!("unknown value `{}` for {}", value, option))
}

fn parse_bool(option: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(unknown(option, other)),
    }
}

struct RawConfig {
    values: HashMap<(String, String), String>,
}

impl RawConfig {
    fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.values
            .get(&(section.to_string(), option.to_string()))
            .map(|s| s.as_str())
    }
}

/// `[section]` headers followed by `key = value` or `key: value` lines;
/// `#` and `;` start comments.
fn parse_ini(text: &str) -> Result<RawConfig> {
    let mut values = HashMap::new();
    let mut section = String::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].trim().to_lowercase();
            continue;
        }
        let split = line
            .find(|c| c == '=' || c == ':')
            .ok_or_else(|| Error::Config(format!("line {}: expected `key = value`", lineno + 1)))?;
        if section.is_empty() {
            return Err(Error::Config(format!(
                "line {}: option outside of any section",
                lineno + 1
            )));
        }
        let key = line[..split].trim().to_lowercase();
        let value = line[split + 1..].trim().to_string();
        values.insert((section.clone(), key), value);
    }
    Ok(RawConfig { values })
}
