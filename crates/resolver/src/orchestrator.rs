//! Resolution orchestrator
//!
//! [`SymbolResolver`] owns the indices, the resolver chain, the context
//! analyzer and the virtual-symbol factory. For every raw dependency of a file
//! it anchors the source symbol, computes context hints, then asks the file's
//! language resolver followed by each framework resolver. The first resolver
//! returning a match wins; a resolver error is logged and treated as
//! "declined" so one faulty resolver never aborts the batch.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use depgraph_core::entities::{Dependency, SourceFile, Symbol};
use depgraph_core::error::Result;
use depgraph_core::graph::ResolutionStats;
use depgraph_core::namespace::{NamespaceResolver, NoopNamespaceResolver};
use depgraph_core::resolution::{Confidence, ResolutionStrategy};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::analyzer::ContextAnalyzer;
use crate::context::ResolutionContext;
use crate::index::SymbolIndexManager;
use crate::resolvers::{Resolution, Resolver, ResolverChain, ResolverEnv};
use crate::virtual_symbols::VirtualSymbolFactory;

/// A raw dependency with both endpoints bound to symbols
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub from: Arc<Symbol>,
    pub to: Arc<Symbol>,
    pub dependency: Dependency,
    pub strategy: ResolutionStrategy,
    pub confidence: Confidence,
    /// Name of the resolver that produced the match
    pub resolver: &'static str,
}

/// A dependency whose source symbol was found but whose target was not
#[derive(Debug, Clone)]
pub struct DeclinedDependency {
    pub from: Arc<Symbol>,
    pub dependency: Dependency,
}

/// Outcome of resolving one file's dependencies
#[derive(Debug, Clone, Default)]
pub struct FileResolution {
    pub resolved: Vec<ResolvedDependency>,
    pub declined: Vec<DeclinedDependency>,
}

pub struct SymbolResolver {
    index: SymbolIndexManager,
    chain: ResolverChain,
    analyzer: ContextAnalyzer,
    virtuals: VirtualSymbolFactory,
    namespaces: Box<dyn NamespaceResolver>,
    filter_cross_language: bool,
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new(Box::new(NoopNamespaceResolver))
    }
}

impl std::fmt::Debug for SymbolResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolResolver")
            .field("symbols", &self.index.symbol_count())
            .field("virtual_symbols", &self.virtuals.len())
            .finish_non_exhaustive()
    }
}

impl SymbolResolver {
    pub fn new(namespaces: Box<dyn NamespaceResolver>) -> Self {
        Self::with_chain(namespaces, ResolverChain::default())
    }

    pub fn with_chain(namespaces: Box<dyn NamespaceResolver>, chain: ResolverChain) -> Self {
        Self {
            index: SymbolIndexManager::new(),
            chain,
            analyzer: ContextAnalyzer::new(),
            virtuals: VirtualSymbolFactory::new(),
            namespaces,
            filter_cross_language: true,
        }
    }

    /// When on, a match in an incompatible language counts as a decline
    pub fn set_filter_cross_language(&mut self, filter: bool) {
        self.filter_cross_language = filter;
    }

    pub fn index(&self) -> &SymbolIndexManager {
        &self.index
    }

    pub fn analyzer(&self) -> &ContextAnalyzer {
        &self.analyzer
    }

    pub fn virtual_symbols(&self) -> &VirtualSymbolFactory {
        &self.virtuals
    }

    /// Build the global index from a full scan and the transient index from
    /// the batch about to be resolved
    pub fn prepare(
        &mut self,
        files: &[SourceFile],
        symbols: &[Arc<Symbol>],
        contexts: &[ResolutionContext],
    ) {
        self.index.build_global_index(files, symbols);
        self.index.build_transient_indexes(contexts);
    }

    /// Rebuild only the batch-scoped index
    pub fn prepare_batch(&mut self, contexts: &[ResolutionContext]) {
        self.index.build_transient_indexes(contexts);
    }

    /// Drop every index and virtual symbol
    pub fn reset(&mut self) {
        self.index.clear_all();
        self.virtuals.clear();
    }

    pub fn find_by_qualified_name(&self, qualified_name: &str) -> Result<Option<Arc<Symbol>>> {
        Ok(self.index.get_symbol_by_qualified_name(qualified_name)?.cloned())
    }

    /// Resolve a name as an import binding of `context`, without a dependency
    pub fn resolve_import(&mut self, context: &mut ResolutionContext, name: &str) -> Option<Resolution> {
        context.find_import_binding(name)?;
        self.run_chain(context, name, None)
            .filter(|r| r.strategy.is_import_flavored() || r.strategy == ResolutionStrategy::VirtualSymbol)
    }

    /// Resolve every dependency of one file
    pub fn resolve_file(
        &mut self,
        context: &mut ResolutionContext,
        dependencies: &[Dependency],
        stats: &mut ResolutionStats,
    ) -> FileResolution {
        context.clear_hints();
        let mut outcome = FileResolution::default();

        for dep in dependencies {
            stats.dependencies_seen += 1;

            let Some(from) = context.find_from_symbol(&dep.from_symbol).cloned() else {
                debug!(
                    "Dropping {} -> {} in {}: source symbol not declared in file",
                    dep.from_symbol,
                    dep.to_symbol,
                    context.path()
                );
                stats.unanchored += 1;
                continue;
            };

            match self.resolve_dependency(context, dep, stats) {
                Some((resolution, resolver)) => {
                    trace!(
                        "{} -> {} via {} ({})",
                        dep.from_symbol,
                        dep.to_symbol,
                        resolver,
                        resolution.strategy
                    );
                    stats.resolved_by_chain += 1;
                    outcome.resolved.push(ResolvedDependency {
                        from,
                        to: resolution.symbol,
                        dependency: dep.clone(),
                        strategy: resolution.strategy,
                        confidence: resolution.confidence,
                        resolver,
                    });
                }
                None => outcome.declined.push(DeclinedDependency {
                    from,
                    dependency: dep.clone(),
                }),
            }
        }

        outcome
    }

    fn resolve_dependency(
        &mut self,
        context: &mut ResolutionContext,
        dep: &Dependency,
        stats: &mut ResolutionStats,
    ) -> Option<(Resolution, &'static str)> {
        let mut errors = 0;
        let result = self.run_chain_with_errors(context, &dep.to_symbol, Some(dep), &mut errors);
        stats.internal_errors += errors;
        result
    }

    fn run_chain(
        &mut self,
        context: &mut ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
    ) -> Option<Resolution> {
        let mut errors = 0;
        self.run_chain_with_errors(context, target, dep, &mut errors)
            .map(|(resolution, _)| resolution)
    }

    fn run_chain_with_errors(
        &mut self,
        context: &mut ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
        errors: &mut usize,
    ) -> Option<(Resolution, &'static str)> {
        let hints = self.analyzer.analyze(context, dep);
        let mut env = ResolverEnv {
            index: &self.index,
            virtuals: &mut self.virtuals,
            namespaces: self.namespaces.as_ref(),
            analyzer: &self.analyzer,
            hints,
            filter_cross_language: self.filter_cross_language,
        };

        let language = self.chain.language_resolver(context.language());
        let framework = self.chain.framework_resolvers().iter();
        let resolvers = language
            .into_iter()
            .map(|r| r as &dyn Resolver)
            .chain(framework.map(|r| r as &dyn Resolver));

        run_resolvers(resolvers, context, target, dep, &mut env, errors)
    }
}

/// Try `resolvers` in order; the first match wins. Errors count as declines,
/// and so do matches the cross-language rule would reject.
fn run_resolvers<'r>(
    resolvers: impl IntoIterator<Item = &'r dyn Resolver>,
    context: &mut ResolutionContext,
    target: &str,
    dep: Option<&Dependency>,
    env: &mut ResolverEnv<'_>,
    errors: &mut usize,
) -> Option<(Resolution, &'static str)> {
    for resolver in resolvers {
        if !resolver.can_resolve(context, target, dep, env) {
            continue;
        }
        match resolver.resolve(context, target, dep, env) {
            Ok(Some(resolution)) if !env.language_allows(context, &resolution.symbol) => {
                debug!(
                    "Resolver {} matched {} in another language for {}, trying the next",
                    resolver.name(),
                    resolution.symbol.id,
                    target
                );
            }
            Ok(Some(resolution)) => return Some((resolution, resolver.name())),
            Ok(None) => {}
            Err(e) => {
                warn!(
                    "Resolver {} failed on {} in {}: {}",
                    resolver.name(),
                    target,
                    context.path(),
                    e
                );
                *errors += 1;
            }
        }
    }
    None
}
