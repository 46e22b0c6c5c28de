//! Resolver for C#
//!
//! Resolves member access through declared field / property types (kept in the
//! context's [`LanguageHints`](crate::context::LanguageHints) side channel),
//! static access on types, `using` namespaces and the configured namespace
//! resolver.

use depgraph_core::entities::{Dependency, Language, Symbol, SymbolKind};
use depgraph_core::error::Result;
use depgraph_core::qualified_name::{simple_name, split_qualifier, strip_generics};
use depgraph_core::resolution::ResolutionStrategy;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use super::common::normalize_target;
use super::{Resolution, Resolver, ResolverEnv};
use crate::context::ResolutionContext;
use crate::members::find_member;

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "readonly",
    "const",
    "volatile",
    "virtual",
    "override",
    "abstract",
    "sealed",
    "new",
    "required",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpResolver;

/// Declared type of a field or property from its signature:
/// `private readonly IUserService _users;` -> `IUserService`
fn declared_type(symbol: &Symbol) -> Option<String> {
    let signature = symbol.signature.as_deref()?;
    let declaration = signature
        .split(['=', '{', ';'])
        .next()
        .unwrap_or(signature);
    let tokens: Vec<&str> = declaration
        .split_whitespace()
        .filter(|t| !MODIFIERS.contains(t))
        .collect();
    let name_at = tokens.iter().position(|t| *t == symbol.name)?;
    if name_at == 0 {
        return None;
    }
    // Generic arguments may contain spaces: `Dictionary<string, int> _map`
    let ty = tokens[..name_at].join(" ");
    Some(strip_generics(&ty).trim_end_matches('?').to_string())
}

/// Field / property name -> declared type for the file's own members
fn field_types(symbols: &[Arc<Symbol>]) -> HashMap<String, String> {
    symbols
        .iter()
        .filter(|s| matches!(s.kind, SymbolKind::Field | SymbolKind::Property))
        .filter_map(|s| declared_type(s).map(|ty| (s.name.clone(), ty)))
        .collect()
}

impl CSharpResolver {
    fn ensure_field_types(&self, context: &mut ResolutionContext) {
        if context.hints().field_types().is_none() {
            let types = field_types(&context.symbols);
            trace!("{} typed members in {}", types.len(), context.path());
            context.hints_mut().set_field_types(types);
        }
    }

    /// Candidate fully qualified names for a type reference, most specific first
    fn candidate_names(&self, context: &ResolutionContext, name: &str) -> Vec<String> {
        let mut candidates = vec![name.to_string()];
        candidates.extend(
            context
                .imports
                .iter()
                .map(|import| format!("{}.{name}", import.source)),
        );
        let own_namespaces = context
            .symbols
            .iter()
            .filter(|s| s.kind.is_type_like())
            .filter_map(|s| s.qualified_name.as_deref())
            .filter_map(|q| split_qualifier(q).0);
        for namespace in own_namespaces {
            let candidate = format!("{namespace}.{name}");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// Locate a type by (possibly namespace-qualified) name
    fn resolve_type(
        &self,
        context: &ResolutionContext,
        name: &str,
        env: &ResolverEnv<'_>,
    ) -> Result<Option<(Arc<Symbol>, ResolutionStrategy)>> {
        let name = strip_generics(name).trim_end_matches('?');
        let simple = simple_name(name);

        if let Some(local) = context.find_locals(simple).find(|s| s.kind.is_type_like()) {
            return Ok(Some((Arc::clone(local), ResolutionStrategy::LocalScope)));
        }

        let candidates = self.candidate_names(context, name);
        for candidate in &candidates {
            if let Some(symbol) = env
                .index
                .get_symbol_by_qualified_name(candidate)?
                .filter(|s| s.kind.is_type_like())
            {
                return Ok(Some((Arc::clone(symbol), ResolutionStrategy::QualifiedName)));
            }
        }

        for candidate in &candidates {
            let Some(path) = env.namespaces.resolve(candidate, Language::CSharp) else {
                continue;
            };
            if let Some(symbol) = env.index.get_class_in_file(&path.to_string_lossy(), simple)? {
                return Ok(Some((Arc::clone(symbol), ResolutionStrategy::Autoloader)));
            }
        }

        // Last resort: the only C# type with that simple name
        let mut same_name = env.index.get_symbols_by_name(simple).iter().filter(|s| {
            s.kind.is_type_like()
                && env
                    .index
                    .get_file(&s.file_id)
                    .is_some_and(|f| f.language == Language::CSharp)
        });
        Ok(match (same_name.next(), same_name.next()) {
            (Some(only), None) => Some((Arc::clone(only), ResolutionStrategy::GlobalExport)),
            _ => None,
        })
    }

    fn member_of_type(
        &self,
        ty: &Symbol,
        member: &str,
        env: &ResolverEnv<'_>,
    ) -> Option<Arc<Symbol>> {
        find_member(env.index.get_file_symbols(&ty.file_id), ty, member).cloned()
    }
}

impl Resolver for CSharpResolver {
    fn name(&self) -> &'static str {
        "csharp"
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

        if let Some(symbol) = context.find_local(target) {
            return Ok(Some(Resolution::new(
                Arc::clone(symbol),
                ResolutionStrategy::LocalScope,
            )));
        }

        let (qualifier, member) = split_qualifier(target);
        let Some(qualifier) = qualifier else {
            let resolution = self
                .resolve_type(context, target, env)?
                .map(|(ty, strategy)| Resolution::new(ty, strategy));
            return Ok(resolution);
        };

        if let Some(symbol) = env.index.get_symbol_by_qualified_name(target)? {
            return Ok(Some(Resolution::new(
                Arc::clone(symbol),
                ResolutionStrategy::QualifiedName,
            )));
        }

        self.ensure_field_types(context);
        let field_type = context
            .hints()
            .field_types()
            .and_then(|types| types.get(qualifier))
            .cloned();
        if let Some(field_type) = field_type {
            if let Some((ty, _)) = self.resolve_type(context, &field_type, env)? {
                if let Some(symbol) = self.member_of_type(&ty, member, env) {
                    return Ok(Some(Resolution::new(
                        symbol,
                        ResolutionStrategy::QualifiedName,
                    )));
                }
            }
        }

        if let Some((ty, strategy)) = self.resolve_type(context, qualifier, env)? {
            if let Some(symbol) = self.member_of_type(&ty, member, env) {
                return Ok(Some(Resolution::new(symbol, strategy)));
            }
        }

        Ok(None)
    }
}
