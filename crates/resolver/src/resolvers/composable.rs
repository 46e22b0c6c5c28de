//! Composable / hook convention resolver
//!
//! Three cases, in order:
//!
//! 1. Names imported from a framework package (`ref` from `vue`,
//!    `defineStore` from `pinia`) become virtual symbols keyed by the package.
//! 2. A `useX` call with no import resolves to a `useX` declaration in a file
//!    named after it or living under a `composables/` directory.
//! 3. A name destructured from a composable (`const { items } = useCart()`)
//!    resolves to the member declared in the composable's module.

use depgraph_core::entities::{Dependency, SymbolKind};
use depgraph_core::error::Result;
use depgraph_core::qualified_name::is_qualified;
use depgraph_core::resolution::ResolutionStrategy;
use tracing::trace;

use super::common::{first_preferring_callable, normalize_target, resolve_module_file};
use super::{Resolution, Resolver, ResolverEnv};
use crate::context::ResolutionContext;

/// Packages whose exports are modelled as virtual symbols
const FRAMEWORK_PACKAGES: &[&str] = &[
    "vue",
    "pinia",
    "vue-router",
    "@vueuse/core",
    "react",
    "react-dom",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ComposableResolver;

/// `useCart` -> true, `user` -> false
fn is_composable_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split('.').next().unwrap_or(name)
}

impl ComposableResolver {
    /// Framework package `name` is imported from, with the exported name
    fn framework_import<'c>(
        &self,
        context: &'c ResolutionContext,
        name: &str,
    ) -> Option<(&'c str, &'c str)> {
        let (import, binding) = context.find_import_binding(name)?;
        FRAMEWORK_PACKAGES
            .contains(&import.source.as_str())
            .then_some((import.source.as_str(), binding.name.as_str()))
    }

    fn resolve_composable_definition(
        &self,
        context: &ResolutionContext,
        name: &str,
        env: &ResolverEnv<'_>,
    ) -> Option<Resolution> {
        let index = env.index;
        index
            .files()
            .filter(|f| f.id != *context.file_id())
            .filter(|f| file_stem(&f.path) == name || f.path.contains("composables/"))
            .find_map(|f| {
                index
                    .get_file_symbols(&f.id)
                    .iter()
                    .find(|s| s.name == name)
                    .cloned()
            })
            .map(|symbol| Resolution::new(symbol, ResolutionStrategy::FrameworkPattern))
    }

    fn resolve_destructured(
        &self,
        context: &ResolutionContext,
        name: &str,
        env: &ResolverEnv<'_>,
    ) -> Option<Resolution> {
        let index = env.index;
        context
            .imports
            .iter()
            .filter(|import| import.names.iter().any(|n| is_composable_name(n.local_name())))
            .filter_map(|import| resolve_module_file(context, &import.source, env))
            .find_map(|file| {
                let symbols = index.get_file_symbols(&file.id);
                let composable_ids: Vec<&str> = symbols
                    .iter()
                    .filter(|s| is_composable_name(&s.name))
                    .map(|s| s.id.as_str())
                    .collect();
                first_preferring_callable(symbols, name)
                    .filter(|s| !composable_ids.contains(&s.id.as_str()))
                    .cloned()
            })
            .map(|symbol| Resolution::new(symbol, ResolutionStrategy::FrameworkPattern))
    }
}

impl Resolver for ComposableResolver {
    fn name(&self) -> &'static str {
        "composable"
    }

    fn can_resolve(
        &self,
        context: &ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        _env: &ResolverEnv<'_>,
    ) -> bool {
        let target = normalize_target(target);
        if target.is_empty() || is_qualified(target) {
            return false;
        }
        is_composable_name(target)
            || self.framework_import(context, target).is_some()
            || context
                .imports
                .iter()
                .flat_map(|import| import.names.iter())
                .any(|n| is_composable_name(n.local_name()))
    }

    fn resolve(
        &self,
        context: &mut ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        let target = normalize_target(target);

        if let Some((package, exported)) = self.framework_import(context, target) {
            let symbol = env
                .virtuals
                .get_or_create(package, exported, SymbolKind::Function);
            trace!("{} imported from {} -> virtual {}", target, package, symbol.id);
            return Ok(Some(Resolution::new(
                symbol,
                ResolutionStrategy::VirtualSymbol,
            )));
        }

        if is_composable_name(target) && context.find_import_binding(target).is_none() {
            if let Some(resolution) = self.resolve_composable_definition(context, target, env) {
                return Ok(Some(resolution));
            }
        }

        Ok(self.resolve_destructured(context, target, env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ContextAnalyzer, ContextHints};
    use crate::index::SymbolIndexManager;
    use crate::virtual_symbols::VirtualSymbolFactory;
    use depgraph_core::entities::{ImportDecl, ImportedName, Language, SourceFile, Symbol};
    use depgraph_core::entity_id::is_virtual_id;
    use depgraph_core::namespace::NoopNamespaceResolver;
    use std::sync::Arc;

    fn sym(id: &str, file: &str, name: &str, kind: SymbolKind) -> Arc<Symbol> {
        Arc::new(Symbol {
            id: id.to_string(),
            file_id: file.to_string(),
            name: name.to_string(),
            qualified_name: None,
            kind,
            start_line: 1,
            end_line: 1,
            exported: true,
            visibility: None,
            signature: None,
        })
    }

    struct Fixture {
        index: SymbolIndexManager,
        view: ResolutionContext,
        virtuals: VirtualSymbolFactory,
    }

    fn fixture() -> Fixture {
        let cart = SourceFile::new("cart", "src/composables/useCart.ts", Language::TypeScript);
        let toast = SourceFile::new("toast", "src/ui/useToast.ts", Language::TypeScript);
        let view = SourceFile::new("view", "src/views/Cart.vue", Language::Vue);

        let cart_symbols = vec![
            sym("useCart", "cart", "useCart", SymbolKind::Function),
            sym("addItem", "cart", "addItem", SymbolKind::Function),
        ];
        let toast_symbols = vec![sym("useToast", "toast", "useToast", SymbolKind::Function)];
        let view_symbols = vec![sym("checkout", "view", "checkout", SymbolKind::Function)];

        let contexts = vec![
            ResolutionContext::new(cart.clone(), cart_symbols.clone(), Vec::new(), Vec::new()),
            ResolutionContext::new(toast.clone(), toast_symbols.clone(), Vec::new(), Vec::new()),
            ResolutionContext::new(
                view.clone(),
                view_symbols.clone(),
                vec![
                    ImportDecl::named("../composables/useCart", vec![ImportedName::new("useCart")]),
                    ImportDecl::named(
                        "vue",
                        vec![ImportedName::new("ref"), ImportedName::aliased("computed", "derived")],
                    ),
                ],
                Vec::new(),
            ),
        ];

        let mut index = SymbolIndexManager::new();
        let all: Vec<_> = cart_symbols
            .into_iter()
            .chain(toast_symbols)
            .chain(view_symbols)
            .collect();
        index.build_global_index(&[cart, toast, view], &all);
        index.build_transient_indexes(&contexts);
        Fixture {
            index,
            view: contexts[2].clone(),
            virtuals: VirtualSymbolFactory::new(),
        }
    }

    fn resolve(fixture: &mut Fixture, target: &str) -> Option<Resolution> {
        let analyzer = ContextAnalyzer::new();
        let mut env = ResolverEnv {
            index: &fixture.index,
            virtuals: &mut fixture.virtuals,
            namespaces: &NoopNamespaceResolver,
            analyzer: &analyzer,
            hints: ContextHints::default(),
            filter_cross_language: true,
        };
        let mut context = fixture.view.clone();
        if !ComposableResolver.can_resolve(&context, target, None, &env) {
            return None;
        }
        ComposableResolver
            .resolve(&mut context, target, None, &mut env)
            .unwrap()
    }

    #[test]
    fn test_framework_import_becomes_virtual() {
        let mut fixture = fixture();
        let resolution = resolve(&mut fixture, "ref").unwrap();
        assert_eq!(resolution.strategy, ResolutionStrategy::VirtualSymbol);
        assert!(is_virtual_id(&resolution.symbol.id));
        assert_eq!(resolution.symbol.file_id, "virtual:vue");

        // Aliased import keys the virtual symbol by the exported name
        let aliased = resolve(&mut fixture, "derived").unwrap();
        assert_eq!(aliased.symbol.name, "computed");
        assert_eq!(fixture.virtuals.len(), 2);
    }

    #[test]
    fn test_unimported_composable_by_file_name() {
        let mut fixture = fixture();
        let resolution = resolve(&mut fixture, "useToast()").unwrap();
        assert_eq!(resolution.symbol.id, "useToast");
        assert_eq!(resolution.strategy, ResolutionStrategy::FrameworkPattern);
    }

    #[test]
    fn test_destructured_member() {
        let mut fixture = fixture();
        let resolution = resolve(&mut fixture, "addItem").unwrap();
        assert_eq!(resolution.symbol.id, "addItem");
    }

    #[test]
    fn test_qualified_targets_are_not_handled() {
        let mut fixture = fixture();
        assert!(resolve(&mut fixture, "cart.addItem").is_none());
        assert!(resolve(&mut fixture, "missingThing").is_none());
    }

    #[test]
    fn test_composable_name() {
        assert!(is_composable_name("useCart"));
        assert!(!is_composable_name("user"));
        assert!(!is_composable_name("use"));
    }
}
