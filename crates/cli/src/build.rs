//! `depgraph build`: resolve a scan into a graph

use anyhow::{Context, Result};
use depgraph_core::config::Config;
use depgraph_core::entities::ScanInput;
use depgraph_core::graph::ResolutionStats;
use depgraph_resolver::{DependencyGraphEngine, GraphBuildOutput};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Read the parser output of one repository scan
pub fn read_scan_input(path: &Path) -> Result<ScanInput> {
    let file = File::open(path).with_context(|| format!("Failed to open scan input {}", path.display()))?;
    let input: ScanInput = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse scan input {}", path.display()))?;
    info!("Loaded {} parsed files from {}", input.files.len(), path.display());
    Ok(input)
}

/// Run one resolution pass with the configured resolution settings
pub fn build_graph(input: &ScanInput, config: &Config) -> GraphBuildOutput {
    DependencyGraphEngine::new(config.resolution.clone()).build_graph(&input.files)
}

/// Write the graph as pretty JSON to `path`, or to stdout when `None`
pub fn write_output(output: &GraphBuildOutput, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, output).context("Failed to serialize graph")?;
            writer.flush().context("Failed to write graph")?;
            info!("Wrote graph to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, output).context("Failed to serialize graph")?;
            writeln!(writer).context("Failed to write graph")?;
        }
    }
    Ok(())
}

/// Human readable summary of a pass
pub fn format_stats(stats: &ResolutionStats) -> String {
    let rows = [
        ("dependencies", stats.dependencies_seen),
        ("resolved by chain", stats.resolved_by_chain),
        ("resolved by fallback", stats.resolved_by_fallback),
        ("declined", stats.declined),
        ("unanchored", stats.unanchored),
        ("ambiguous, dropped", stats.ambiguous_dropped),
        ("ambiguous, first pick", stats.ambiguous_first_pick),
        ("self-loops suppressed", stats.self_loops_suppressed),
        ("cross-file contains suppressed", stats.cross_file_contains_suppressed),
        ("cross-language suppressed", stats.cross_language_suppressed),
        ("invalid endpoints", stats.invalid_endpoints_filtered),
        ("duplicates removed", stats.duplicates_removed),
        ("resolver errors", stats.internal_errors),
        ("virtual symbols", stats.virtual_symbols),
    ];

    let mut out = format!("Resolution rate: {:.1}%\n", stats.resolution_rate() * 100.0);
    for (label, value) in rows {
        out.push_str(&format!("  {label:<32}{value}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stats() {
        let stats = ResolutionStats {
            dependencies_seen: 4,
            resolved_by_chain: 2,
            resolved_by_fallback: 1,
            declined: 1,
            ..ResolutionStats::default()
        };
        let text = format_stats(&stats);
        assert!(text.starts_with("Resolution rate: 75.0%"));
        assert!(text.contains("resolved by fallback"));
    }
}
