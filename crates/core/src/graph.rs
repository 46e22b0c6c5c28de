//! Symbol graph: the terminal artifact of a resolution pass
//!
//! Nodes are a flattened projection of [`Symbol`]; edges carry the dependency
//! type, the source line and whatever disambiguation context the parser
//! attached to the raw dependency.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::entities::{Dependency, DependencyType, FileId, Symbol, SymbolId, SymbolKind, Visibility};
use crate::resolution::{Confidence, ResolutionStrategy};

/// A node of the symbol graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolNode {
    pub id: SymbolId,
    pub name: String,
    #[serde(default)]
    pub qualified_name: Option<String>,
    pub kind: SymbolKind,
    pub file_id: FileId,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl From<&Symbol> for SymbolNode {
    fn from(symbol: &Symbol) -> Self {
        Self {
            id: symbol.id.clone(),
            name: symbol.name.clone(),
            qualified_name: symbol.qualified_name.clone(),
            kind: symbol.kind,
            file_id: symbol.file_id.clone(),
            start_line: symbol.start_line,
            end_line: symbol.end_line,
            exported: symbol.exported,
            visibility: symbol.visibility,
            signature: symbol.signature.clone(),
        }
    }
}

/// Contextual metadata carried over from the raw dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    #[serde(default)]
    pub qualified_context: Option<String>,
    #[serde(default)]
    pub resolved_class: Option<String>,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default)]
    pub call_instance_id: Option<String>,
    /// How the target was found; `None` for edges built by hand
    #[serde(default)]
    pub strategy: Option<ResolutionStrategy>,
}

impl EdgeMetadata {
    pub fn confidence(&self) -> Option<Confidence> {
        self.strategy.map(|s| s.confidence())
    }
}

impl From<&Dependency> for EdgeMetadata {
    fn from(dep: &Dependency) -> Self {
        Self {
            qualified_context: dep.qualified_context.clone(),
            resolved_class: dep.resolved_class.clone(),
            parameter_types: dep.parameter_types.clone(),
            call_instance_id: dep.call_instance_id.clone(),
            strategy: None,
        }
    }
}

/// A typed edge between two graph nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEdge {
    pub from_id: SymbolId,
    pub to_id: SymbolId,
    pub dependency_type: DependencyType,
    pub line: u32,
    #[serde(default)]
    pub metadata: EdgeMetadata,
}

impl SymbolEdge {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        dependency_type: DependencyType,
        line: u32,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            dependency_type,
            line,
            metadata: EdgeMetadata::default(),
        }
    }

    /// Identity used for de-duplication
    pub fn key(&self) -> (&str, &str, DependencyType, u32) {
        (&self.from_id, &self.to_id, self.dependency_type, self.line)
    }
}

/// Persistence projection of an edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDependency {
    pub from_symbol_id: SymbolId,
    pub to_symbol_id: SymbolId,
    pub dependency_type: DependencyType,
    pub line_number: u32,
    pub qualified_name: Option<String>,
    pub resolved_class: Option<String>,
    pub parameter_types: Vec<String>,
    pub call_instance_id: Option<String>,
}

/// Counters describing the quality of a resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub dependencies_seen: usize,
    pub resolved_by_chain: usize,
    pub resolved_by_fallback: usize,
    /// `from_symbol` not declared in its own file
    pub unanchored: usize,
    /// Neither the chain nor the fallback found a target
    pub declined: usize,
    /// CALLS with several candidates and no class hint
    pub ambiguous_dropped: usize,
    /// CALLS with several candidates where the first was taken
    pub ambiguous_first_pick: usize,
    pub self_loops_suppressed: usize,
    pub cross_file_contains_suppressed: usize,
    pub cross_language_suppressed: usize,
    pub invalid_endpoints_filtered: usize,
    pub duplicates_removed: usize,
    pub internal_errors: usize,
    pub virtual_symbols: usize,
}

impl ResolutionStats {
    /// Share of dependencies that produced at least one target
    pub fn resolution_rate(&self) -> f64 {
        if self.dependencies_seen == 0 {
            return 0.0;
        }
        (self.resolved_by_chain + self.resolved_by_fallback) as f64 / self.dependencies_seen as f64
    }
}

/// Nodes and edges of a finished resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolGraph {
    pub nodes: Vec<SymbolNode>,
    pub edges: Vec<SymbolEdge>,
}

impl SymbolGraph {
    pub fn new(nodes: Vec<SymbolNode>, edges: Vec<SymbolEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&SymbolNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Drop edges whose endpoints are not nodes. Returns the number removed.
    pub fn retain_valid_edges(&mut self) -> usize {
        let ids: HashSet<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        let before = self.edges.len();
        self.edges
            .retain(|e| ids.contains(&e.from_id) && ids.contains(&e.to_id));
        before - self.edges.len()
    }

    /// Collapse edges with identical (from, to, type, line), keeping the first.
    /// Returns the number removed.
    pub fn dedup_edges(&mut self) -> usize {
        let mut seen: HashSet<(String, String, DependencyType, u32)> = HashSet::new();
        let before = self.edges.len();
        self.edges.retain(|e| {
            seen.insert((e.from_id.clone(), e.to_id.clone(), e.dependency_type, e.line))
        });
        before - self.edges.len()
    }

    /// Persistence projection restricted to edges with valid endpoints
    pub fn to_create_dependencies(&self) -> Vec<CreateDependency> {
        let by_id: HashMap<&str, &SymbolNode> =
            self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        self.edges
            .iter()
            .filter(|e| by_id.contains_key(e.from_id.as_str()))
            .filter_map(|e| by_id.get(e.to_id.as_str()).map(|target| (e, target)))
            .map(|(e, target)| CreateDependency {
                from_symbol_id: e.from_id.clone(),
                to_symbol_id: e.to_id.clone(),
                dependency_type: e.dependency_type,
                line_number: e.line,
                qualified_name: e
                    .metadata
                    .qualified_context
                    .clone()
                    .or_else(|| target.qualified_name.clone()),
                resolved_class: e.metadata.resolved_class.clone(),
                parameter_types: e.metadata.parameter_types.clone(),
                call_instance_id: e.metadata.call_instance_id.clone(),
            })
            .collect()
    }
}
