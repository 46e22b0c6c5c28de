//! Resolver chain
//!
//! A resolver turns one raw target name, seen from one file, into a concrete
//! symbol. Two closed families exist:
//!
//! - [`LanguageResolver`]: one per source language, consulted first. Handles
//!   local scope, imports, qualified names and the language's own conventions.
//! - [`FrameworkResolver`]: language-agnostic framework conventions (stores,
//!   composables) and the final unique-global-export lookup.
//!
//! Every resolver answers `can_resolve` (cheap gate) and `resolve`, which
//! yields `Ok(None)` when it declines. Errors are internal faults: the
//! orchestrator logs them and moves on to the next resolver.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod common;
pub mod composable;
pub mod csharp;
pub mod php;
pub mod store;
pub mod typescript;
pub mod unique_export;

use depgraph_core::entities::{Dependency, Language, Symbol};
use depgraph_core::error::Result;
use depgraph_core::namespace::NamespaceResolver;
use depgraph_core::resolution::{Confidence, ResolutionStrategy};
use std::sync::Arc;

use crate::analyzer::{ContextAnalyzer, ContextHints};
use crate::compatibility::languages_compatible;
use crate::context::ResolutionContext;
use crate::index::SymbolIndexManager;
use crate::virtual_symbols::VirtualSymbolFactory;

pub use composable::ComposableResolver;
pub use csharp::CSharpResolver;
pub use php::PhpResolver;
pub use store::{StoreNaming, StoreResolver};
pub use typescript::TypeScriptResolver;
pub use unique_export::UniqueExportResolver;

/// Shared state a resolver may consult while resolving one dependency
pub struct ResolverEnv<'a> {
    pub index: &'a SymbolIndexManager,
    pub virtuals: &'a mut VirtualSymbolFactory,
    pub namespaces: &'a dyn NamespaceResolver,
    pub analyzer: &'a ContextAnalyzer,
    pub hints: ContextHints,
    /// Mirrors `resolution.filter_cross_language`
    pub filter_cross_language: bool,
}

impl ResolverEnv<'_> {
    /// Whether an edge from `context` to `symbol` would pass the
    /// cross-language admission rule. Symbols of unknown files pass.
    pub fn language_allows(&self, context: &ResolutionContext, symbol: &Symbol) -> bool {
        !self.filter_cross_language
            || self
                .index
                .get_file(&symbol.file_id)
                .is_none_or(|file| languages_compatible(context.language(), file.language))
    }
}

/// A successful match
#[derive(Debug, Clone)]
pub struct Resolution {
    pub symbol: Arc<Symbol>,
    pub strategy: ResolutionStrategy,
    pub confidence: Confidence,
}

impl Resolution {
    pub fn new(symbol: Arc<Symbol>, strategy: ResolutionStrategy) -> Self {
        Self {
            symbol,
            confidence: strategy.confidence(),
            strategy,
        }
    }
}

/// Capability shared by all resolvers
pub trait Resolver {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Cheap gate evaluated before `resolve`
    fn can_resolve(
        &self,
        context: &ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
        env: &ResolverEnv<'_>,
    ) -> bool;

    /// Resolve `target` as seen from `context`. `Ok(None)` means "declined".
    fn resolve(
        &self,
        context: &mut ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>>;
}

/// Per-language resolvers
#[derive(Debug, Clone)]
pub enum LanguageResolver {
    TypeScript(TypeScriptResolver),
    Php(PhpResolver),
    CSharp(CSharpResolver),
}

impl LanguageResolver {
    pub fn supported_languages(&self) -> &'static [Language] {
        match self {
            LanguageResolver::TypeScript(_) => Language::FRONT_END,
            LanguageResolver::Php(_) => &[Language::Php],
            LanguageResolver::CSharp(_) => &[Language::CSharp],
        }
    }

    pub fn supports(&self, language: Language) -> bool {
        self.supported_languages().contains(&language)
    }

    fn inner(&self) -> &dyn Resolver {
        match self {
            LanguageResolver::TypeScript(r) => r,
            LanguageResolver::Php(r) => r,
            LanguageResolver::CSharp(r) => r,
        }
    }
}

impl Resolver for LanguageResolver {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn can_resolve(
        &self,
        context: &ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
        env: &ResolverEnv<'_>,
    ) -> bool {
        self.supports(context.language()) && self.inner().can_resolve(context, target, dep, env)
    }

    fn resolve(
        &self,
        context: &mut ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        self.inner().resolve(context, target, dep, env)
    }
}

/// Framework-level resolvers, tried in declaration order
#[derive(Debug, Clone)]
pub enum FrameworkResolver {
    Store(StoreResolver),
    Composable(ComposableResolver),
    UniqueExport(UniqueExportResolver),
}

impl FrameworkResolver {
    fn inner(&self) -> &dyn Resolver {
        match self {
            FrameworkResolver::Store(r) => r,
            FrameworkResolver::Composable(r) => r,
            FrameworkResolver::UniqueExport(r) => r,
        }
    }
}

impl Resolver for FrameworkResolver {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn can_resolve(
        &self,
        context: &ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
        env: &ResolverEnv<'_>,
    ) -> bool {
        self.inner().can_resolve(context, target, dep, env)
    }

    fn resolve(
        &self,
        context: &mut ResolutionContext,
        target: &str,
        dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        self.inner().resolve(context, target, dep, env)
    }
}

/// Ordered set of resolvers used by the orchestrator
#[derive(Debug, Clone)]
pub struct ResolverChain {
    language: Vec<LanguageResolver>,
    framework: Vec<FrameworkResolver>,
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self {
            language: vec![
                LanguageResolver::TypeScript(TypeScriptResolver),
                LanguageResolver::Php(PhpResolver),
                LanguageResolver::CSharp(CSharpResolver),
            ],
            framework: vec![
                FrameworkResolver::Store(StoreResolver::default()),
                FrameworkResolver::Composable(ComposableResolver),
                FrameworkResolver::UniqueExport(UniqueExportResolver),
            ],
        }
    }
}

impl ResolverChain {
    pub fn new(language: Vec<LanguageResolver>, framework: Vec<FrameworkResolver>) -> Self {
        Self {
            language,
            framework,
        }
    }

    /// First language resolver supporting `language`
    pub fn language_resolver(&self, language: Language) -> Option<&LanguageResolver> {
        self.language.iter().find(|r| r.supports(language))
    }

    pub fn framework_resolvers(&self) -> &[FrameworkResolver] {
        &self.framework
    }
}
