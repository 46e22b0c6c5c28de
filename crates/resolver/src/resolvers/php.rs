//! Resolver for PHP
//!
//! Handles `$this->` / `self::` / `static::` member access, `parent::` calls,
//! `use` imports, fully qualified class names and PSR-4 style autoloading
//! through the configured [`NamespaceResolver`](depgraph_core::namespace::NamespaceResolver).
//! Framework objects with no declaration in the repository (the HTTP request,
//! the validator, framework base classes) resolve to virtual symbols.

use depgraph_core::entities::{Dependency, Language, Symbol, SymbolKind};
use depgraph_core::error::Result;
use depgraph_core::qualified_name::{simple_name, split_qualifier, PathSeparator};
use depgraph_core::resolution::ResolutionStrategy;
use std::sync::Arc;
use tracing::trace;

use super::common::normalize_target;
use super::{Resolution, Resolver, ResolverEnv};
use crate::context::ResolutionContext;
use crate::members::{enclosing_type, find_member};

/// Framework key used for virtual symbols when no framework was detected
const FALLBACK_FRAMEWORK: &str = "php";

/// Upper bound on `extends` hops followed for inherited members
const MAX_PARENT_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhpResolver;

fn is_self_reference(qualifier: &str) -> bool {
    matches!(qualifier, "$this" | "this" | "self" | "static")
}

fn is_request_object(qualifier: &str) -> bool {
    let q = qualifier.trim_start_matches('$');
    q.eq_ignore_ascii_case("request") || q == "request()" || simple_name(q) == "Request"
}

fn is_validator_object(qualifier: &str) -> bool {
    let q = qualifier.trim_start_matches('$');
    q.eq_ignore_ascii_case("validator") || simple_name(q) == "Validator"
}

/// Parent class named in a declaration signature: `class A extends B implements C`
fn extends_clause(signature: &str) -> Option<&str> {
    let (_, rest) = signature.split_once(" extends ")?;
    let parent = rest
        .split(|c: char| c.is_whitespace() || matches!(c, '{' | ',' | '('))
        .find(|s| !s.is_empty())?;
    Some(parent)
}

/// Namespace of the file, taken from the first namespaced class-like symbol
fn file_namespace(context: &ResolutionContext) -> Option<&str> {
    context
        .symbols
        .iter()
        .filter(|s| s.kind.is_type_like())
        .filter_map(|s| s.qualified_name.as_deref())
        .find_map(|q| match split_qualifier(q.trim_start_matches('\\')) {
            (Some(ns), _) if !ns.contains("::") => Some(ns),
            _ => None,
        })
}

impl PhpResolver {
    /// Expand a class reference to its fully qualified name using `use`
    /// imports and the file's own namespace
    fn expand_class_name(&self, context: &ResolutionContext, name: &str) -> String {
        let name = name.trim_start_matches('\\');
        if name.contains(PathSeparator::Backslash.as_str()) {
            return name.to_string();
        }
        if let Some((import, binding)) = context.find_import_binding(name) {
            let source = import.source.trim_start_matches('\\');
            return if simple_name(source) == binding.name {
                source.to_string()
            } else {
                format!("{source}\\{}", binding.name)
            };
        }
        match file_namespace(context) {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.to_string(),
        }
    }

    /// Locate a class-like symbol by (possibly short) name
    fn resolve_class(
        &self,
        context: &ResolutionContext,
        name: &str,
        env: &ResolverEnv<'_>,
    ) -> Result<Option<(Arc<Symbol>, ResolutionStrategy)>> {
        let fqcn = self.expand_class_name(context, name);

        if let Some(symbol) = env
            .index
            .get_symbol_by_qualified_name(&fqcn)?
            .filter(|s| s.kind.is_type_like())
        {
            return Ok(Some((Arc::clone(symbol), ResolutionStrategy::QualifiedName)));
        }

        if let Some(local) = context
            .find_locals(simple_name(&fqcn))
            .find(|s| s.kind.is_type_like())
        {
            return Ok(Some((Arc::clone(local), ResolutionStrategy::LocalScope)));
        }

        let Some(path) = env.namespaces.resolve(&fqcn, Language::Php) else {
            return Ok(None);
        };
        let Some(class) = env
            .index
            .get_class_in_file(&path.to_string_lossy(), simple_name(&fqcn))?
        else {
            return Ok(None);
        };
        trace!("Autoloaded {} from {}", fqcn, path.display());
        Ok(Some((Arc::clone(class), ResolutionStrategy::Autoloader)))
    }

    fn member_of_class(
        &self,
        class: &Symbol,
        member: &str,
        env: &ResolverEnv<'_>,
    ) -> Option<Arc<Symbol>> {
        find_member(env.index.get_file_symbols(&class.file_id), class, member).cloned()
    }

    fn framework_key(&self, env: &ResolverEnv<'_>) -> String {
        env.hints
            .framework
            .map(|f| f.to_string())
            .unwrap_or_else(|| FALLBACK_FRAMEWORK.to_string())
    }

    /// Member reached through the enclosing class's ancestors. A chain that
    /// leaves the repository ends in a virtual symbol on the external parent.
    fn resolve_parent_member(
        &self,
        context: &ResolutionContext,
        member: &str,
        dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
        explicit_parent: bool,
    ) -> Result<Option<Resolution>> {
        let mut current = dep
            .and_then(|d| context.find_from_symbol(&d.from_symbol))
            .and_then(|from| enclosing_type(from, &context.symbols).or(Some(from)))
            .filter(|s| s.kind.is_type_like())
            .cloned();
        let mut external_parent: Option<String> = None;
        let mut saw_parent = false;

        for _ in 0..MAX_PARENT_DEPTH {
            let Some(owner) = current.take() else {
                break;
            };
            let Some(parent) = owner.signature.as_deref().and_then(extends_clause) else {
                break;
            };
            saw_parent = true;
            match self.resolve_class(context, parent, env)? {
                Some((class, strategy)) => {
                    if let Some(symbol) = self.member_of_class(&class, member, env) {
                        return Ok(Some(Resolution::new(symbol, strategy)));
                    }
                    current = Some(class);
                }
                None => {
                    external_parent = Some(simple_name(parent.trim_start_matches('\\')).to_string());
                    break;
                }
            }
        }

        let class_name = match external_parent {
            Some(name) => name,
            None if explicit_parent && !saw_parent && env.hints.framework.is_some() => {
                "parent".to_string()
            }
            None => return Ok(None),
        };
        let framework = self.framework_key(env);
        let symbol = env.virtuals.get_or_create(
            &framework,
            &format!("{class_name}::{member}"),
            SymbolKind::Method,
        );
        Ok(Some(Resolution::new(symbol, ResolutionStrategy::VirtualSymbol)))
    }

    fn resolve_qualified(
        &self,
        context: &ResolutionContext,
        qualifier: &str,
        member: &str,
        target: &str,
        dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        if is_self_reference(qualifier) {
            let own = dep
                .and_then(|d| context.find_from_symbol(&d.from_symbol))
                .and_then(|from| enclosing_type(from, &context.symbols))
                .and_then(|owner| find_member(&context.symbols, owner, member))
                .or_else(|| {
                    context
                        .find_locals(member)
                        .find(|s| !s.kind.is_type_like())
                });
            if let Some(symbol) = own {
                return Ok(Some(Resolution::new(
                    Arc::clone(symbol),
                    ResolutionStrategy::LocalScope,
                )));
            }
            // Inherited member
            return self.resolve_parent_member(context, member, dep, env, false);
        }

        if qualifier == "parent" {
            return self.resolve_parent_member(context, member, dep, env, true);
        }

        if env.hints.is_request_context && is_request_object(qualifier) {
            let framework = self.framework_key(env);
            let symbol = env.virtuals.get_or_create(
                &framework,
                &format!("Request::{member}"),
                SymbolKind::Method,
            );
            return Ok(Some(Resolution::new(symbol, ResolutionStrategy::VirtualSymbol)));
        }

        if env.hints.is_validation_context && is_validator_object(qualifier) {
            let framework = self.framework_key(env);
            let symbol = env.virtuals.get_or_create(
                &framework,
                &format!("Validator::{member}"),
                SymbolKind::Method,
            );
            return Ok(Some(Resolution::new(symbol, ResolutionStrategy::VirtualSymbol)));
        }

        if qualifier.starts_with('$') {
            // Untyped instance access, left to the edge builder's fallback
            return Ok(None);
        }

        if let Some(symbol) = env.index.get_symbol_by_qualified_name(target)? {
            return Ok(Some(Resolution::new(
                Arc::clone(symbol),
                ResolutionStrategy::QualifiedName,
            )));
        }

        if let Some((class, strategy)) = self.resolve_class(context, qualifier, env)? {
            if let Some(symbol) = self.member_of_class(&class, member, env) {
                return Ok(Some(Resolution::new(symbol, strategy)));
            }
        }

        // `App\Models\User` splits into a namespace and a class name
        if !target.contains("::") && !target.contains("->") {
            return Ok(self
                .resolve_class(context, target, env)?
                .map(|(class, strategy)| Resolution::new(class, strategy)));
        }
        Ok(None)
    }
}

impl Resolver for PhpResolver {
    fn name(&self) -> &'static str {
        "php"
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
        dep: Option<&Dependency>,
        env: &mut ResolverEnv<'_>,
    ) -> Result<Option<Resolution>> {
        let target = normalize_target(target);

        if let Some(symbol) = context.find_local(target) {
            return Ok(Some(Resolution::new(
                Arc::clone(symbol),
                ResolutionStrategy::LocalScope,
            )));
        }

        match split_qualifier(target) {
            (Some(qualifier), member) => {
                self.resolve_qualified(context, qualifier, member, target, dep, env)
            }
            (None, name) => Ok(self
                .resolve_class(context, name, env)?
                .map(|(class, strategy)| Resolution::new(class, strategy))),
        }
    }
}
