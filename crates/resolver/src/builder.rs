//! Dependency graph engine
//!
//! [`DependencyGraphEngine::build_graph`] runs one full resolution pass over
//! a batch of parsed files:
//!
//! 1. Index every symbol (global and batch indices, node table).
//! 2. Resolve INHERITS/IMPLEMENTS dependencies and build the interface map
//!    from the resulting edges.
//! 3. Resolve every other dependency. Matches from the resolver chain become
//!    edges directly; declined dependencies go through the fallback lookup and,
//!    for CALLS, through disambiguation.
//! 4. Apply the admission rules, drop edges with unknown endpoints and
//!    de-duplicate by (from, to, type, line).
//!
//! The pass never fails: malformed or ambiguous entries are dropped and
//! counted in [`ResolutionStats`].

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use depgraph_core::config::ResolutionConfig;
use depgraph_core::entities::{Dependency, DependencyType, Language, ParsedFile, SourceFile, Symbol};
use depgraph_core::entity_id::is_virtual_symbol;
use depgraph_core::graph::{EdgeMetadata, ResolutionStats, SymbolEdge, SymbolGraph, SymbolNode};
use depgraph_core::namespace::NamespaceResolver;
use depgraph_core::resolution::ResolutionStrategy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::compatibility::languages_compatible;
use crate::context::ResolutionContext;
use crate::disambiguation::{disambiguate_call, CallTarget};
use crate::fallback::FallbackLookup;
use crate::interfaces::InterfaceMap;
use crate::nodes::NodeTable;
use crate::orchestrator::{FileResolution, SymbolResolver};
use crate::resolvers::ResolverChain;

/// Graph and counters of one pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphBuildOutput {
    pub graph: SymbolGraph,
    pub stats: ResolutionStats,
}

/// Which dependencies a sweep handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Hierarchy,
    Rest,
}

impl Sweep {
    fn includes(self, dep: &Dependency) -> bool {
        dep.dependency_type.is_hierarchy() == (self == Sweep::Hierarchy)
    }
}

/// Edge accumulator of one pass
struct EdgeSink<'c> {
    config: &'c ResolutionConfig,
    edges: Vec<SymbolEdge>,
    stats: ResolutionStats,
}

impl EdgeSink<'_> {
    /// Apply the admission rules and record the edge
    fn admit(
        &mut self,
        nodes: &mut NodeTable,
        from: &Symbol,
        from_language: Language,
        to: &Arc<Symbol>,
        dependency_type: DependencyType,
        dep: &Dependency,
        strategy: ResolutionStrategy,
    ) -> bool {
        if from.id == to.id && dependency_type != DependencyType::Calls {
            debug!("Suppressing {} self-loop on {}", dependency_type, from.id);
            self.stats.self_loops_suppressed += 1;
            return false;
        }

        // Declared symbols always go through the checks below, whatever their id looks like
        let declared = nodes.is_declared(&to.id);
        let virtual_target = !declared && is_virtual_symbol(&to.id, &to.file_id);
        if !nodes.contains(&from.id) || !(declared || virtual_target) {
            warn!(
                "Edge {} -> {} references a symbol outside the batch, skipping",
                from.id, to.id
            );
            self.stats.invalid_endpoints_filtered += 1;
            return false;
        }

        if dependency_type == DependencyType::Contains && from.file_id != to.file_id {
            debug!("Suppressing cross-file CONTAINS {} -> {}", from.id, to.id);
            self.stats.cross_file_contains_suppressed += 1;
            return false;
        }

        if self.config.filter_cross_language && !virtual_target {
            if let Some(to_language) = nodes.language_of(&to.id) {
                if !languages_compatible(from_language, to_language) {
                    debug!(
                        "Suppressing {} edge {} ({}) -> {} ({})",
                        dependency_type, from.id, from_language, to.id, to_language
                    );
                    self.stats.cross_language_suppressed += 1;
                    return false;
                }
            }
        }

        if virtual_target && nodes.add_virtual(Arc::clone(to)) {
            self.stats.virtual_symbols += 1;
        }

        let mut edge = SymbolEdge::new(from.id.clone(), to.id.clone(), dependency_type, dep.line);
        edge.metadata = EdgeMetadata {
            strategy: Some(strategy),
            ..EdgeMetadata::from(dep)
        };
        self.edges.push(edge);
        true
    }
}

pub struct DependencyGraphEngine {
    resolver: SymbolResolver,
    config: ResolutionConfig,
}

impl std::fmt::Debug for DependencyGraphEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraphEngine")
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for DependencyGraphEngine {
    fn default() -> Self {
        Self::new(ResolutionConfig::default())
    }
}

impl DependencyGraphEngine {
    /// Engine whose namespace resolver is built from the configured path aliases
    pub fn new(config: ResolutionConfig) -> Self {
        let namespaces = Box::new(config.namespace_resolver());
        Self::with_namespace_resolver(config, namespaces)
    }

    pub fn with_namespace_resolver(config: ResolutionConfig, namespaces: Box<dyn NamespaceResolver>) -> Self {
        Self::from_parts(SymbolResolver::new(namespaces), config)
    }

    /// Engine with a custom resolver chain, e.g. a different store naming
    pub fn with_chain(config: ResolutionConfig, chain: ResolverChain) -> Self {
        let namespaces = Box::new(config.namespace_resolver());
        Self::from_parts(SymbolResolver::with_chain(namespaces, chain), config)
    }

    fn from_parts(mut resolver: SymbolResolver, config: ResolutionConfig) -> Self {
        resolver.set_filter_cross_language(config.filter_cross_language);
        Self { resolver, config }
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    pub fn resolver(&self) -> &SymbolResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut SymbolResolver {
        &mut self.resolver
    }

    /// Forget indices and virtual symbols before an unrelated scan
    pub fn reset(&mut self) {
        self.resolver.reset();
    }

    /// Resolve `files` into a symbol graph
    pub fn build_graph(&mut self, files: &[ParsedFile]) -> GraphBuildOutput {
        let source_files: Vec<SourceFile> = files.iter().map(|p| p.file.clone()).collect();
        let mut all_symbols: Vec<Arc<Symbol>> = Vec::new();
        let mut contexts: Vec<ResolutionContext> = Vec::with_capacity(files.len());
        for parsed in files {
            let symbols: Vec<Arc<Symbol>> = parsed.symbols.iter().cloned().map(Arc::new).collect();
            all_symbols.extend(symbols.iter().cloned());
            contexts.push(ResolutionContext::from_parsed(parsed, symbols));
        }

        self.resolver.prepare(&source_files, &all_symbols, &contexts);
        let mut nodes = NodeTable::new(&source_files, &all_symbols);
        let config = self.config.clone();
        let mut sink = EdgeSink {
            config: &config,
            edges: Vec::new(),
            stats: ResolutionStats::default(),
        };

        let empty = InterfaceMap::default();
        for (parsed, context) in files.iter().zip(contexts.iter_mut()) {
            self.resolve_file(parsed, context, Sweep::Hierarchy, &mut nodes, &empty, &mut sink);
        }

        let interfaces = InterfaceMap::from_edges(&sink.edges, &nodes);
        for (parsed, context) in files.iter().zip(contexts.iter_mut()) {
            self.resolve_file(parsed, context, Sweep::Rest, &mut nodes, &interfaces, &mut sink);
        }

        let EdgeSink { edges, mut stats, .. } = sink;
        let mut graph = SymbolGraph::new(
            nodes.symbols().iter().map(|s| SymbolNode::from(s.as_ref())).collect(),
            edges,
        );
        stats.invalid_endpoints_filtered += graph.retain_valid_edges();
        stats.duplicates_removed += graph.dedup_edges();

        info!(
            "Resolved {} of {} dependencies ({:.1}%): {} nodes, {} edges, {} virtual symbols",
            stats.resolved_by_chain + stats.resolved_by_fallback,
            stats.dependencies_seen,
            stats.resolution_rate() * 100.0,
            graph.nodes.len(),
            graph.edges.len(),
            stats.virtual_symbols
        );
        debug!("Resolution stats: {:?}", stats);

        GraphBuildOutput { graph, stats }
    }

    fn resolve_file(
        &mut self,
        parsed: &ParsedFile,
        context: &mut ResolutionContext,
        sweep: Sweep,
        nodes: &mut NodeTable,
        interfaces: &InterfaceMap,
        sink: &mut EdgeSink<'_>,
    ) {
        let dependencies: Vec<Dependency> = parsed
            .dependencies
            .iter()
            .filter(|d| sweep.includes(d))
            .cloned()
            .collect();
        if dependencies.is_empty() {
            return;
        }

        let language = context.language();
        let FileResolution { resolved, declined } =
            self.resolver
                .resolve_file(context, &dependencies, &mut sink.stats);

        for r in &resolved {
            let admitted = sink.admit(
                nodes,
                &r.from,
                language,
                &r.to,
                r.dependency.dependency_type,
                &r.dependency,
                r.strategy,
            );
            if admitted
                && r.strategy.is_import_flavored()
                && r.dependency.dependency_type != DependencyType::Imports
            {
                sink.admit(
                    nodes,
                    &r.from,
                    language,
                    &r.to,
                    DependencyType::Imports,
                    &r.dependency,
                    r.strategy,
                );
            }
        }

        for d in &declined {
            let dep = &d.dependency;
            let found = FallbackLookup::new(nodes, interfaces, &self.config).lookup(dep, &d.from, language);
            sink.stats.cross_language_suppressed += found.cross_language;

            let targets: Vec<Arc<Symbol>> = if dep.dependency_type == DependencyType::Calls {
                let outcome = disambiguate_call(&found.candidates, dep, nodes, interfaces);
                match &outcome {
                    CallTarget::FirstPick(_) => sink.stats.ambiguous_first_pick += 1,
                    CallTarget::Dropped => sink.stats.ambiguous_dropped += 1,
                    _ => {}
                }
                outcome.symbol().cloned().into_iter().collect()
            } else {
                if found.candidates.len() > self.config.max_fallback_candidates {
                    debug!(
                        "{} {} -> {} matched {} symbols, keeping the first {}",
                        dep.dependency_type,
                        dep.from_symbol,
                        dep.to_symbol,
                        found.candidates.len(),
                        self.config.max_fallback_candidates
                    );
                }
                found
                    .candidates
                    .into_iter()
                    .take(self.config.max_fallback_candidates)
                    .collect()
            };

            if targets.is_empty() {
                sink.stats.declined += 1;
                continue;
            }
            sink.stats.resolved_by_fallback += 1;
            for target in &targets {
                sink.admit(
                    nodes,
                    &d.from,
                    language,
                    target,
                    dep.dependency_type,
                    dep,
                    ResolutionStrategy::Fallback,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph_core::entities::SymbolKind;
    use pretty_assertions::assert_eq;

    fn sym(id: &str, file: &str, name: &str, kind: SymbolKind, lines: (u32, u32)) -> Symbol {
        Symbol {
            id: id.to_string(),
            file_id: file.to_string(),
            name: name.to_string(),
            qualified_name: None,
            kind,
            start_line: lines.0,
            end_line: lines.1,
            exported: false,
            visibility: None,
            signature: None,
        }
    }

    fn file(id: &str, path: &str, language: Language) -> ParsedFile {
        ParsedFile::new(SourceFile::new(id, path, language))
    }

    fn edge_keys(graph: &SymbolGraph) -> Vec<(String, String, DependencyType)> {
        graph
            .edges
            .iter()
            .map(|e| (e.from_id.clone(), e.to_id.clone(), e.dependency_type))
            .collect()
    }

    #[test]
    fn test_self_loop_rule() {
        let mut a = file("a", "src/a.ts", Language::TypeScript);
        a.symbols.push(sym("walk", "a", "walk", SymbolKind::Function, (1, 5)));
        a.dependencies.push(Dependency::new("walk", "walk", DependencyType::Calls, 3));
        a.dependencies.push(Dependency::new("walk", "walk", DependencyType::References, 4));

        let output = DependencyGraphEngine::default().build_graph(&[a]);
        assert_eq!(
            edge_keys(&output.graph),
            vec![("walk".to_string(), "walk".to_string(), DependencyType::Calls)]
        );
        assert_eq!(output.stats.self_loops_suppressed, 1);
    }

    #[test]
    fn test_cross_file_contains_is_suppressed() {
        let mut a = file("a", "src/a.ts", Language::TypeScript);
        a.symbols.push(sym("outer", "a", "outer", SymbolKind::Module, (1, 50)));
        a.dependencies.push(Dependency::new("outer", "helper", DependencyType::Contains, 1));
        let mut b = file("b", "src/b.ts", Language::TypeScript);
        let mut helper = sym("helper", "b", "helper", SymbolKind::Function, (1, 3));
        helper.exported = true;
        b.symbols.push(helper);

        let output = DependencyGraphEngine::default().build_graph(&[a, b]);
        assert!(output.graph.edges.is_empty());
        assert_eq!(output.stats.cross_file_contains_suppressed, 1);
    }

    #[test]
    fn test_global_export_adds_synthetic_import_edge() {
        let mut a = file("a", "src/a.ts", Language::TypeScript);
        a.symbols.push(sym("main", "a", "main", SymbolKind::Function, (1, 5)));
        a.dependencies.push(Dependency::new("main", "formatDate", DependencyType::Calls, 2));
        let mut b = file("b", "src/b.ts", Language::TypeScript);
        let mut format = sym("fmt", "b", "formatDate", SymbolKind::Function, (1, 3));
        format.exported = true;
        b.symbols.push(format);

        let output = DependencyGraphEngine::default().build_graph(&[a, b]);
        assert_eq!(
            edge_keys(&output.graph),
            vec![
                ("main".to_string(), "fmt".to_string(), DependencyType::Calls),
                ("main".to_string(), "fmt".to_string(), DependencyType::Imports),
            ]
        );
        assert_eq!(output.stats.resolved_by_chain, 1);
    }

    #[test]
    fn test_non_call_fallback_keeps_every_candidate_up_to_the_cap() {
        let mut a = file("a", "src/a.ts", Language::TypeScript);
        a.symbols.push(sym("main", "a", "main", SymbolKind::Function, (1, 5)));
        a.dependencies.push(Dependency::new("main", "Options", DependencyType::References, 2));
        let mut b = file("b", "src/b.ts", Language::TypeScript);
        b.symbols.push(sym("b.opts", "b", "Options", SymbolKind::TypeAlias, (1, 1)));
        let mut c = file("c", "src/c.ts", Language::TypeScript);
        c.symbols.push(sym("c.opts", "c", "Options", SymbolKind::TypeAlias, (1, 1)));

        let output = DependencyGraphEngine::default().build_graph(&[a.clone(), b.clone(), c.clone()]);
        assert_eq!(output.graph.edges.len(), 2);
        assert_eq!(output.stats.resolved_by_fallback, 1);

        let config = ResolutionConfig {
            max_fallback_candidates: 1,
            ..ResolutionConfig::default()
        };
        let output = DependencyGraphEngine::new(config).build_graph(&[a, b, c]);
        assert_eq!(
            edge_keys(&output.graph),
            vec![("main".to_string(), "b.opts".to_string(), DependencyType::References)]
        );
    }

    #[test]
    fn test_virtual_targets_become_nodes() {
        use depgraph_core::entities::{ImportDecl, ImportedName};

        let mut a = file("a", "src/App.vue", Language::Vue);
        a.symbols.push(sym("setup", "a", "setup", SymbolKind::Function, (1, 9)));
        a.imports.push(ImportDecl::named("vue", vec![ImportedName::new("ref")]));
        a.dependencies.push(Dependency::new("setup", "ref", DependencyType::Calls, 2));
        a.dependencies.push(Dependency::new("setup", "ref", DependencyType::Calls, 5));

        let output = DependencyGraphEngine::default().build_graph(&[a]);
        assert_eq!(output.graph.nodes.len(), 2);
        assert_eq!(output.graph.edges.len(), 2);
        assert_eq!(output.stats.virtual_symbols, 1);
        let target = output.graph.node(&output.graph.edges[0].to_id).unwrap();
        assert!(is_virtual_symbol(&target.id, &target.file_id));
    }

    #[test]
    fn test_declared_symbols_named_like_virtuals_are_checked() {
        let files = vec![
            SourceFile::new("helpers", "app/helpers.php", Language::Php),
            SourceFile::new("chart", "resources/js/virtualChart.ts", Language::TypeScript),
        ];
        let report = Arc::new(sym("report", "helpers", "report", SymbolKind::Function, (1, 5)));
        let chart = Arc::new(sym(
            "virtualChart.ts#renderChart",
            "chart",
            "renderChart",
            SymbolKind::Function,
            (1, 20),
        ));
        let mut nodes = NodeTable::new(&files, &[Arc::clone(&report), Arc::clone(&chart)]);
        let config = ResolutionConfig::default();
        let mut sink = EdgeSink {
            config: &config,
            edges: Vec::new(),
            stats: ResolutionStats::default(),
        };
        let dep = Dependency::new("report", "renderChart", DependencyType::Calls, 2);

        assert!(!sink.admit(
            &mut nodes,
            &report,
            Language::Php,
            &chart,
            DependencyType::Calls,
            &dep,
            ResolutionStrategy::GlobalExport,
        ));
        assert_eq!(sink.stats.cross_language_suppressed, 1);

        let stray = Arc::new(sym("virtualList", "elsewhere", "virtualList", SymbolKind::Function, (1, 2)));
        assert!(!sink.admit(
            &mut nodes,
            &report,
            Language::Php,
            &stray,
            DependencyType::Calls,
            &dep,
            ResolutionStrategy::GlobalExport,
        ));
        assert_eq!(sink.stats.invalid_endpoints_filtered, 1);
        assert_eq!(sink.stats.virtual_symbols, 0);
        assert!(sink.edges.is_empty());
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_index_faults_are_counted_as_internal_errors() {
        let mut ctl = file("ctl", "app/Http/Controllers/InvoiceController.php", Language::Php);
        ctl.symbols.push(sym("show", "ctl", "show", SymbolKind::Method, (1, 9)));
        // Attributed to a file outside the scan
        let mut invoice = sym("invoice", "gone", "Invoice", SymbolKind::Class, (1, 30));
        invoice.qualified_name = Some("App\\Models\\Invoice".to_string());
        ctl.symbols.push(invoice);
        ctl.dependencies.push(Dependency::new(
            "show",
            "App\\Models\\Invoice::find",
            DependencyType::Calls,
            4,
        ));

        let output = DependencyGraphEngine::default().build_graph(&[ctl]);
        assert_eq!(output.stats.internal_errors, 1);
        assert_eq!(output.stats.declined, 1);
        assert!(output.graph.edges.is_empty());
    }

    #[test]
    fn test_unanchored_dependency_is_counted() {
        let mut a = file("a", "src/a.ts", Language::TypeScript);
        a.symbols.push(sym("main", "a", "main", SymbolKind::Function, (1, 5)));
        a.dependencies.push(Dependency::new("ghost", "main", DependencyType::Calls, 2));

        let output = DependencyGraphEngine::default().build_graph(&[a]);
        assert!(output.graph.edges.is_empty());
        assert_eq!(output.stats.unanchored, 1);
        assert_eq!(output.stats.dependencies_seen, 1);
    }
}
