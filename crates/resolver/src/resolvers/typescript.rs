//! Resolver for TypeScript, JavaScript and Vue single-file components
//!
//! Lookup order: own declarations, then import bindings (named, default and
//! namespace imports). Package imports are left to the framework resolvers.

use depgraph_core::entities::{Dependency, ImportKind, Symbol};
use depgraph_core::error::Result;
use depgraph_core::qualified_name::{simple_name, split_qualifier};
use depgraph_core::resolution::ResolutionStrategy;
use std::sync::Arc;
use tracing::trace;

use super::common::{is_package_specifier, normalize_target, resolve_module_file, symbol_in_file};
use super::{Resolution, Resolver, ResolverEnv};
use crate::context::ResolutionContext;
use crate::members::find_member;

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptResolver;

impl TypeScriptResolver {
    fn resolve_local(&self, context: &ResolutionContext, target: &str) -> Option<Arc<Symbol>> {
        if let Some(symbol) = context.find_local(target) {
            return Some(Arc::clone(symbol));
        }

        let (qualifier, member) = split_qualifier(target);
        let owner = context
            .find_locals(simple_name(qualifier?))
            .find(|s| s.kind.is_type_like())?;
        find_member(&context.symbols, owner, member).cloned()
    }

    fn resolve_imported(
        &self,
        context: &ResolutionContext,
        target: &str,
        env: &ResolverEnv<'_>,
    ) -> Option<Arc<Symbol>> {
        let (head, rest) = match target.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (target, None),
        };
        let (import, binding) = context.find_import_binding(head)?;
        let source_file = resolve_module_file(context, &import.source, env);

        if source_file.is_none() && is_package_specifier(&import.source) {
            trace!("{} is bound to package {}", head, import.source);
            return None;
        }

        let base = match (import.kind, source_file) {
            (ImportKind::Named, Some(file)) => symbol_in_file(env.index, &file.id, &binding.name),
            (ImportKind::Named, None) => {
                // Path-like source outside the scan: accept a unique export
                match env.index.get_exported_symbols(&binding.name) {
                    [only] => Some(Arc::clone(&only.symbol)),
                    _ => None,
                }
            }
            (ImportKind::Default, Some(file)) => env.index.get_default_export(&file.id).cloned(),
            (ImportKind::Namespace, Some(file)) => {
                let first = rest?.split('.').next()?;
                let symbol = symbol_in_file(env.index, &file.id, first)?;
                let remainder = rest.and_then(|r| r.split_once('.')).map(|(_, r)| r);
                return match remainder {
                    None => Some(symbol),
                    Some(member) => self.member_of(&symbol, simple_name(member), env),
                };
            }
            (_, None) => None,
        }?;

        match rest {
            None => Some(base),
            Some(member) => self.member_of(&base, simple_name(member), env),
        }
    }

    fn member_of(&self, owner: &Symbol, member: &str, env: &ResolverEnv<'_>) -> Option<Arc<Symbol>> {
        if !owner.kind.is_type_like() {
            return None;
        }
        find_member(env.index.get_file_symbols(&owner.file_id), owner, member).cloned()
    }
}

impl Resolver for TypeScriptResolver {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn can_resolve(
        &self,
        _context: &ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        _env: &ResolverEnv<'_>,
    ) -> bool {
        !normalize_target(target).is_empty()
    }

    fn resolve(
        &self,
        context: &mut ResolutionContext,
        target: &str,
        _dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        let target = normalize_target(target);

        if let Some(symbol) = self.resolve_local(context, target) {
            return Ok(Some(Resolution::new(symbol, ResolutionStrategy::LocalScope)));
        }
        if let Some(symbol) = self.resolve_imported(context, target, env) {
            return Ok(Some(Resolution::new(symbol, ResolutionStrategy::Import)));
        }
        Ok(None)
    }
}
