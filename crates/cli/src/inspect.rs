//! Query commands over a graph written by `depgraph build`

use anyhow::{bail, Context, Result};
use depgraph_core::graph::{SymbolGraph, SymbolNode};
use depgraph_resolver::{GraphBuildOutput, GraphQuery};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load_graph(path: &Path) -> Result<SymbolGraph> {
    let file = File::open(path).with_context(|| format!("Failed to open graph {}", path.display()))?;
    let output: GraphBuildOutput = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse graph {}", path.display()))?;
    Ok(output.graph)
}

/// Node named by `symbol`: an id, a qualified name or an
/// unambiguous simple name
pub fn find_symbol<'g>(graph: &'g SymbolGraph, symbol: &str) -> Result<&'g SymbolNode> {
    if let Some(node) = graph.node(symbol) {
        return Ok(node);
    }

    let by_qualified: Vec<&SymbolNode> = graph
        .nodes
        .iter()
        .filter(|n| n.qualified_name.as_deref() == Some(symbol))
        .collect();
    let matches = if by_qualified.is_empty() {
        graph.nodes.iter().filter(|n| n.name == symbol).collect()
    } else {
        by_qualified
    };

    match matches.as_slice() {
        [only] => Ok(*only),
        [] => bail!("No symbol named '{symbol}' in the graph"),
        many => {
            let ids: Vec<&str> = many.iter().map(|n| n.id.as_str()).collect();
            bail!(
                "'{symbol}' matches {} symbols, pass one of their ids: {}",
                many.len(),
                ids.join(", ")
            )
        }
    }
}

/// One line per node: id, kind and location
pub fn describe(node: &SymbolNode) -> String {
    let name = node.qualified_name.as_deref().unwrap_or(&node.name);
    format!(
        "{}\t{} {}\t{}:{}",
        node.id, node.kind, name, node.file_id, node.start_line
    )
}

pub fn callers(graph: &SymbolGraph, symbol: &str) -> Result<Vec<String>> {
    let target = find_symbol(graph, symbol)?;
    Ok(GraphQuery::new(graph).callers(&target.id).into_iter().map(describe).collect())
}

pub fn callees(graph: &SymbolGraph, symbol: &str) -> Result<Vec<String>> {
    let target = find_symbol(graph, symbol)?;
    Ok(GraphQuery::new(graph).callees(&target.id).into_iter().map(describe).collect())
}

/// Longest call path from `symbol` followed by up to `max_chains` example chains
pub fn depth(graph: &SymbolGraph, symbol: &str, max_depth: usize, max_chains: usize) -> Result<Vec<String>> {
    let target = find_symbol(graph, symbol)?;
    let query = GraphQuery::new(graph);
    let mut lines = vec![format!(
        "Call depth of {}: {}",
        target.id,
        query.call_depth(&target.id, max_depth)
    )];
    lines.extend(
        query
            .call_chains(&target.id, max_depth, max_chains)
            .into_iter()
            .map(|chain| chain.join(" -> ")),
    );
    Ok(lines)
}

pub fn cycles(graph: &SymbolGraph) -> Vec<String> {
    GraphQuery::new(graph)
        .find_cycles()
        .into_iter()
        .map(|cycle| cycle.join(", "))
        .collect()
}

pub fn unused(graph: &SymbolGraph) -> Vec<String> {
    GraphQuery::new(graph).unused_symbols().into_iter().map(describe).collect()
}
