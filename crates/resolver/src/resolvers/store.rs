//! State-store convention resolver
//!
//! `authStore.login()` where `authStore = useAuthStore()` resolves to `login`
//! declared in the store module. The module the `useAuthStore` factory is
//! imported from is searched first, then a file named `auth.store.*`,
//! `authStore.*` or `stores/auth.*`. When no file matches by name, any file
//! whose own symbols mention the store name is searched instead.

use depgraph_core::entities::{Dependency, SourceFile, Symbol};
use depgraph_core::error::Result;
use depgraph_core::qualified_name::simple_name;
use depgraph_core::resolution::ResolutionStrategy;
use std::sync::Arc;
use tracing::trace;

use super::common::{first_preferring_callable, normalize_target, resolve_module_file};
use super::{Resolution, Resolver, ResolverEnv};
use crate::context::ResolutionContext;

/// Naming convention of store factories: `use` + Name + `Store`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNaming {
    pub factory_prefix: String,
    pub suffix: String,
}

impl Default for StoreNaming {
    fn default() -> Self {
        Self {
            factory_prefix: "use".to_string(),
            suffix: "Store".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreResolver {
    naming: StoreNaming,
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split('.').next().unwrap_or(name)
}

impl StoreResolver {
    pub fn new(naming: StoreNaming) -> Self {
        Self { naming }
    }

    /// `authStore` -> `auth` when the receiver follows the convention
    fn receiver_store_name<'t>(&self, receiver: &'t str) -> Option<&'t str> {
        receiver
            .strip_suffix(self.naming.suffix.as_str())
            .or_else(|| receiver.strip_suffix(self.naming.suffix.to_ascii_lowercase().as_str()))
            .filter(|name| !name.is_empty())
    }

    /// Store factories imported by the file, lowercased name first:
    /// `useShoppingCartStore` from `@/stores/shoppingCart` gives `shoppingcart`
    fn imported_factories<'c>(&self, context: &'c ResolutionContext) -> Vec<(String, &'c str)> {
        context
            .imports
            .iter()
            .flat_map(|import| {
                import.names.iter().filter_map(move |name| {
                    let store = name
                        .local_name()
                        .strip_prefix(self.naming.factory_prefix.as_str())?
                        .strip_suffix(self.naming.suffix.as_str())
                        .filter(|store| !store.is_empty())?;
                    Some((store.to_ascii_lowercase(), import.source.as_str()))
                })
            })
            .collect()
    }

    /// Store an accessor is bound to, with the module its factory comes from.
    ///
    /// The imported factory named after the receiver wins, then the single
    /// factory whose name contains the receiver's token, then the single
    /// imported factory. Without a factory import the receiver names the
    /// store. Names are lowercase.
    fn derive_store_name(&self, context: &ResolutionContext, receiver: &str) -> Option<(String, Option<String>)> {
        let from_receiver = self.receiver_store_name(receiver)?.to_ascii_lowercase();
        let factories = self.imported_factories(context);

        let exact = factories.iter().find(|(name, _)| *name == from_receiver);
        let containing: Vec<_> = factories
            .iter()
            .filter(|(name, _)| name.contains(&from_receiver))
            .collect();
        let bound = exact
            .or(match containing.as_slice() {
                [only] => Some(*only),
                _ => None,
            })
            .or(match factories.as_slice() {
                [only] => Some(only),
                _ => None,
            });

        Some(match bound {
            Some((name, source)) => (name.clone(), Some(source.to_string())),
            None => (from_receiver, None),
        })
    }

    fn is_store_file(&self, file: &SourceFile, store_name: &str) -> bool {
        let path = file.path.to_ascii_lowercase();
        let stem = file_stem(&path);
        let suffix = self.naming.suffix.to_ascii_lowercase();
        stem == format!("{store_name}{suffix}")
            || path.contains(&format!("/{store_name}.{suffix}."))
            || path.starts_with(&format!("{store_name}.{suffix}."))
            || (path.contains(&format!("{suffix}s/")) && stem == store_name)
    }

    fn search_files<'a>(
        &self,
        env: &ResolverEnv<'a>,
        files: impl Iterator<Item = &'a SourceFile>,
        method: &str,
    ) -> Option<Arc<Symbol>> {
        files
            .filter_map(|file| first_preferring_callable(env.index.get_file_symbols(&file.id), method))
            .next()
            .cloned()
    }
}

impl Resolver for StoreResolver {
    fn name(&self) -> &'static str {
        "store"
    }

    fn can_resolve(
        &self,
        _context: &ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        _env: &ResolverEnv<'_>,
    ) -> bool {
        let target = normalize_target(target);
        target
            .split_once('.')
            .is_some_and(|(receiver, _)| self.receiver_store_name(receiver).is_some())
    }

    fn resolve(
        &self,
        context: &mut ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        let target = normalize_target(target);
        let Some((receiver, rest)) = target.split_once('.') else {
            return Ok(None);
        };
        let Some((store_name, factory_source)) = self.derive_store_name(context, receiver) else {
            return Ok(None);
        };
        let method = simple_name(rest);
        let index = env.index;

        if let Some(module) = factory_source.and_then(|source| resolve_module_file(context, &source, env)) {
            if let Some(symbol) = self.search_files(env, std::iter::once(module), method) {
                trace!("{} resolved in factory module {}", target, module.path);
                return Ok(Some(Resolution::new(
                    symbol,
                    ResolutionStrategy::FrameworkPattern,
                )));
            }
        }

        let by_file_name = index.files().filter(|f| self.is_store_file(f, &store_name));
        if let Some(symbol) = self.search_files(env, by_file_name, method) {
            trace!("{} resolved in {} store module", target, store_name);
            return Ok(Some(Resolution::new(
                symbol,
                ResolutionStrategy::FrameworkPattern,
            )));
        }

        // Looser: any file whose own symbols mention the store name
        let by_symbol_token = index.files().filter(|f| {
            f.id != *context.file_id()
                && index
                    .get_file_symbols(&f.id)
                    .iter()
                    .any(|s| s.name.to_ascii_lowercase().contains(&store_name))
        });
        if let Some(symbol) = self.search_files(env, by_symbol_token, method) {
            trace!("{} resolved by store token {}", target, store_name);
            return Ok(Some(Resolution::new(
                symbol,
                ResolutionStrategy::FrameworkPattern,
            )));
        }

        Ok(None)
    }
}
