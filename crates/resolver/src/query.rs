//! Read-only queries over a finished symbol graph
//!
//! The graph is loaded into a petgraph `DiGraph` once; traversals and the
//! cycle search run on node indices.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use depgraph_core::entities::{DependencyType, SymbolKind};
use depgraph_core::entity_id::is_virtual_symbol;
use depgraph_core::graph::{SymbolEdge, SymbolGraph, SymbolNode};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::{EdgeRef, VisitMap, Visitable};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Graph view of a [`SymbolGraph`]
///
/// Edges whose endpoints are not nodes are left out. Neighbours are reported
/// in edge order.
#[derive(Debug)]
pub struct GraphQuery<'g> {
    graph: DiGraph<&'g SymbolNode, &'g SymbolEdge>,
    index: HashMap<&'g str, NodeIndex>,
}

impl<'g> GraphQuery<'g> {
    pub fn new(symbols: &'g SymbolGraph) -> Self {
        let mut graph = DiGraph::with_capacity(symbols.nodes.len(), symbols.edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for node in &symbols.nodes {
            index
                .entry(node.id.as_str())
                .or_insert_with(|| graph.add_node(node));
        }
        for edge in &symbols.edges {
            if let (Some(&from), Some(&to)) = (index.get(edge.from_id.as_str()), index.get(edge.to_id.as_str())) {
                graph.add_edge(from, to, edge);
            }
        }
        Self { graph, index }
    }

    pub fn node(&self, id: &str) -> Option<&'g SymbolNode> {
        self.index.get(id).map(|&idx| self.graph[idx])
    }

    /// Edges of `idx` in one direction, in insertion order
    fn edges_of(&self, idx: NodeIndex, direction: Direction) -> Vec<EdgeReference<'_, &'g SymbolEdge>> {
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id());
        edges
    }

    fn neighbours(&self, id: &str, types: &[DependencyType], direction: Direction) -> Vec<&'g SymbolNode> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.edges_of(idx, direction)
            .into_iter()
            .filter(|e| types.contains(&e.weight().dependency_type))
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .filter(|other| seen.insert(*other))
            .map(|other| self.graph[other])
            .collect()
    }

    /// Symbols calling `id`
    pub fn callers(&self, id: &str) -> Vec<&'g SymbolNode> {
        self.neighbours(id, &[DependencyType::Calls], Direction::Incoming)
    }

    /// Symbols `id` calls
    pub fn callees(&self, id: &str) -> Vec<&'g SymbolNode> {
        self.neighbours(id, &[DependencyType::Calls], Direction::Outgoing)
    }

    /// Types extending or implementing `id`
    pub fn implementations(&self, id: &str) -> Vec<&'g SymbolNode> {
        self.neighbours(
            id,
            &[DependencyType::Inherits, DependencyType::Implements],
            Direction::Incoming,
        )
    }

    /// Types `id` extends or implements
    pub fn parents(&self, id: &str) -> Vec<&'g SymbolNode> {
        self.neighbours(
            id,
            &[DependencyType::Inherits, DependencyType::Implements],
            Direction::Outgoing,
        )
    }

    fn call_targets(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.edges_of(idx, Direction::Outgoing)
            .into_iter()
            .filter(|e| e.weight().dependency_type == DependencyType::Calls)
            .map(|e| e.target())
            .collect()
    }

    /// Longest call path (in edges) reachable from `id`, capped at `max_depth`.
    ///
    /// Iterative depth-first traversal; a symbol is expanded once, so cycles
    /// terminate.
    pub fn call_depth(&self, id: &str, max_depth: usize) -> usize {
        let Some(&start) = self.index.get(id) else {
            return 0;
        };
        let mut visited = self.graph.visit_map();
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        let mut deepest = 0;

        while let Some((current, depth)) = stack.pop() {
            if !visited.visit(current) {
                continue;
            }
            deepest = deepest.max(depth);
            if depth >= max_depth {
                continue;
            }
            for next in self.call_targets(current) {
                if !visited.is_visited(&next) {
                    stack.push((next, depth + 1));
                }
            }
        }
        deepest
    }

    /// Acyclic call paths starting at `id`, each ending at a symbol with no
    /// further unvisited callee or at `max_depth` edges
    pub fn call_chains(&self, id: &str, max_depth: usize, max_chains: usize) -> Vec<Vec<String>> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };
        let mut chains = Vec::new();
        let mut stack: Vec<Vec<NodeIndex>> = vec![vec![start]];

        while let Some(path) = stack.pop() {
            if chains.len() >= max_chains {
                break;
            }
            let Some(&last) = path.last() else {
                continue;
            };
            let next: Vec<NodeIndex> = if path.len() > max_depth {
                Vec::new()
            } else {
                let mut seen = HashSet::new();
                self.call_targets(last)
                    .into_iter()
                    .filter(|t| !path.contains(t) && seen.insert(*t))
                    .collect()
            };

            if next.is_empty() {
                if path.len() > 1 {
                    chains.push(path.iter().map(|&idx| self.graph[idx].id.clone()).collect());
                }
                continue;
            }
            // Reverse so the first callee is explored first
            for target in next.into_iter().rev() {
                let mut extended = path.clone();
                extended.push(target);
                stack.push(extended);
            }
        }
        chains
    }

    /// Strongly connected components of the CALLS subgraph that form a cycle
    /// (more than one symbol, or a symbol calling itself). Each cycle is
    /// sorted; cycles are ordered by their first id.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        // Keeps every node, so indices carry over
        let calls = self.graph.filter_map(
            |_, node| Some(*node),
            |_, edge| (edge.dependency_type == DependencyType::Calls).then_some(()),
        );

        let mut cycles: Vec<Vec<String>> = petgraph::algo::tarjan_scc(&calls)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [only] => calls.find_edge(*only, *only).is_some(),
                _ => true,
            })
            .map(|component| {
                let mut ids: Vec<String> = component.into_iter().map(|idx| calls[idx].id.clone()).collect();
                ids.sort();
                ids
            })
            .collect();

        cycles.sort();
        cycles
    }

    /// Symbols with no inbound edge other than CONTAINS that are neither
    /// exported, virtual nor modules
    pub fn unused_symbols(&self) -> Vec<&'g SymbolNode> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                let node = self.graph[idx];
                !node.exported
                    && !is_virtual_symbol(&node.id, &node.file_id)
                    && !matches!(node.kind, SymbolKind::Module | SymbolKind::Namespace)
            })
            .filter(|&idx| {
                !self
                    .graph
                    .edges_directed(idx, Direction::Incoming)
                    .any(|e| e.weight().dependency_type != DependencyType::Contains)
            })
            .map(|idx| self.graph[idx])
            .collect()
    }
}
