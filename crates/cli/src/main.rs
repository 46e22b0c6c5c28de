//! depgraph CLI - symbol dependency graph builder
//!
//! This binary resolves parser output into a symbol graph and answers call
//! graph queries over a previously built graph.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::Result;
use clap::{Parser, Subcommand};
use depgraph::{build, inspect};
use depgraph_core::config::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(about = "Resolve parsed symbols and dependencies into a symbol graph")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from a scan input file
    Build {
        /// Parser output (JSON)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Where to write the graph; stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// List the callers of a symbol
    Callers {
        #[arg(short, long, value_name = "FILE")]
        graph: PathBuf,
        /// Symbol id, qualified name or unique simple name
        symbol: String,
    },
    /// List the symbols a symbol calls
    Callees {
        #[arg(short, long, value_name = "FILE")]
        graph: PathBuf,
        symbol: String,
    },
    /// Longest call path and example call chains from a symbol
    Depth {
        #[arg(short, long, value_name = "FILE")]
        graph: PathBuf,
        symbol: String,
        /// Overrides query.max_call_depth
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Call cycles
    Cycles {
        #[arg(short, long, value_name = "FILE")]
        graph: PathBuf,
    },
    /// Symbols nothing depends on
    Unused {
        #[arg(short, long, value_name = "FILE")]
        graph: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = Config::load(cli.config.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Commands::Build { input, output } => run_build(&input, output.as_deref(), &config),
        Commands::Callers { graph, symbol } => {
            print_lines(inspect::callers(&inspect::load_graph(&graph)?, &symbol)?);
            Ok(())
        }
        Commands::Callees { graph, symbol } => {
            print_lines(inspect::callees(&inspect::load_graph(&graph)?, &symbol)?);
            Ok(())
        }
        Commands::Depth {
            graph,
            symbol,
            max_depth,
        } => {
            let max_depth = max_depth.unwrap_or(config.query.max_call_depth);
            let graph = inspect::load_graph(&graph)?;
            print_lines(inspect::depth(
                &graph,
                &symbol,
                max_depth,
                config.query.max_call_chains,
            )?);
            Ok(())
        }
        Commands::Cycles { graph } => {
            print_lines(inspect::cycles(&inspect::load_graph(&graph)?));
            Ok(())
        }
        Commands::Unused { graph } => {
            print_lines(inspect::unused(&inspect::load_graph(&graph)?));
            Ok(())
        }
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    // Logs go to stderr so a graph written to stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "depgraph={level},depgraph_core={level},depgraph_resolver={level}"
        ))
        .init();

    Ok(())
}

fn run_build(input: &Path, output: Option<&Path>, config: &Config) -> Result<()> {
    let scan = build::read_scan_input(input)?;
    let result = build::build_graph(&scan, config);
    build::write_output(&result, output)?;
    eprint!("{}", build::format_stats(&result.stats));
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
