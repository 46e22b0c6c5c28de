//! Helpers shared by the language and framework resolvers

use depgraph_core::entities::{SourceFile, Symbol};
use std::sync::Arc;

use crate::context::ResolutionContext;
use crate::index::SymbolIndexManager;
use crate::resolvers::ResolverEnv;

/// Trim call syntax and receiver noise from a raw target:
/// `this.save()` -> `save`, `\App\Models\User` -> `App\Models\User`
pub(crate) fn normalize_target(target: &str) -> &str {
    let target = target.trim().trim_end_matches("()").trim_start_matches('\\');
    target
        .strip_prefix("this.")
        .unwrap_or(target)
}

/// Whether an import source names an installed package rather than a
/// repository path (`vue`, `@vueuse/core`, `lodash/debounce`)
pub(crate) fn is_package_specifier(source: &str) -> bool {
    !(source.starts_with('.')
        || source.starts_with('/')
        || source.starts_with("@/")
        || source.starts_with("~/"))
}

/// File an import source points at, if it lives in the scanned repository
pub(crate) fn resolve_module_file<'a>(
    context: &ResolutionContext,
    source: &str,
    env: &ResolverEnv<'a>,
) -> Option<&'a SourceFile> {
    let index: &'a SymbolIndexManager = env.index;

    if source.starts_with("./") || source.starts_with("../") {
        let directory = context.directory();
        let joined = if directory.is_empty() {
            source.to_string()
        } else {
            format!("{directory}/{source}")
        };
        return index.find_file_for_module(&joined);
    }

    if let Some(path) = env.namespaces.resolve(source, context.language()) {
        if let Some(file) = index.find_file_for_module(&path.to_string_lossy()) {
            return Some(file);
        }
    }

    if source.starts_with('/') {
        return index.find_file_for_module(source);
    }
    None
}

/// Whether the head of `target` is bound by an import whose source is a
/// scanned file. That file is the only place the name may come from, even
/// when it does not declare it (a re-export the parser did not follow).
pub(crate) fn bound_to_scanned_module(
    context: &ResolutionContext,
    target: &str,
    env: &ResolverEnv<'_>,
) -> bool {
    let head = target.split_once('.').map_or(target, |(head, _)| head);
    context
        .find_import_binding(head)
        .is_some_and(|(import, _)| resolve_module_file(context, &import.source, env).is_some())
}

/// Symbol `name` made visible by the file `file_id`: an export with that name,
/// the default export for `default`, or any top-level declaration
pub(crate) fn symbol_in_file(
    index: &SymbolIndexManager,
    file_id: &str,
    name: &str,
) -> Option<Arc<Symbol>> {
    if let Some(exported) = index
        .get_exported_symbols(name)
        .iter()
        .find(|e| e.file_id == file_id)
    {
        return Some(Arc::clone(&exported.symbol));
    }
    if name == "default" {
        return index.get_default_export(file_id).cloned();
    }
    index
        .get_file_symbols(file_id)
        .iter()
        .find(|s| s.name == name)
        .cloned()
}

/// First symbol named `name` in `symbols`, preferring callables
pub(crate) fn first_preferring_callable<'a>(
    symbols: &'a [Arc<Symbol>],
    name: &str,
) -> Option<&'a Arc<Symbol>> {
    let mut named = symbols.iter().filter(|s| s.name == name);
    let first = named.clone().next();
    named.find(|s| s.kind.is_callable()).or(first)
}
