//! Per-file resolution context
//!
//! A [`ResolutionContext`] is the view a resolver has of one source file: its
//! own symbols, its import and export declarations, plus a typed side channel
//! ([`LanguageHints`]) that language resolvers fill lazily and that is cleared
//! between resolution passes.

use depgraph_core::entities::{
    ExportDecl, FileId, ImportDecl, ImportedName, Language, ParsedFile, SourceFile, Symbol,
};
use depgraph_core::qualified_name::{is_qualified, simple_name};
use std::collections::HashMap;
use std::sync::Arc;

/// Language-specific facts computed on demand while resolving a file
#[derive(Debug, Clone, Default)]
pub struct LanguageHints {
    /// Declared type of each field / property, keyed by member name
    field_types: Option<HashMap<String, String>>,
}

impl LanguageHints {
    pub fn field_types(&self) -> Option<&HashMap<String, String>> {
        self.field_types.as_ref()
    }

    pub fn set_field_types(&mut self, types: HashMap<String, String>) {
        self.field_types = Some(types);
    }

    pub fn is_empty(&self) -> bool {
        self.field_types.is_none()
    }

    pub fn clear(&mut self) {
        self.field_types = None;
    }
}

/// Everything known about one file while its dependencies are resolved
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub file: SourceFile,
    pub symbols: Vec<Arc<Symbol>>,
    pub imports: Vec<ImportDecl>,
    pub exports: Vec<ExportDecl>,
    hints: LanguageHints,
}

impl ResolutionContext {
    pub fn new(
        file: SourceFile,
        symbols: Vec<Arc<Symbol>>,
        imports: Vec<ImportDecl>,
        exports: Vec<ExportDecl>,
    ) -> Self {
        Self {
            file,
            symbols,
            imports,
            exports,
            hints: LanguageHints::default(),
        }
    }

    /// Build a context sharing the already-allocated symbols of `parsed`
    pub fn from_parsed(parsed: &ParsedFile, symbols: Vec<Arc<Symbol>>) -> Self {
        Self::new(
            parsed.file.clone(),
            symbols,
            parsed.imports.clone(),
            parsed.exports.clone(),
        )
    }

    pub fn file_id(&self) -> &FileId {
        &self.file.id
    }

    pub fn path(&self) -> &str {
        &self.file.path
    }

    pub fn language(&self) -> Language {
        self.file.language
    }

    /// Directory part of the file path, without a trailing slash
    pub fn directory(&self) -> &str {
        self.file
            .path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }

    /// First own symbol whose simple or qualified name equals `name`
    pub fn find_local(&self, name: &str) -> Option<&Arc<Symbol>> {
        self.symbols
            .iter()
            .find(|s| s.name == name || s.qualified_name.as_deref() == Some(name))
    }

    /// All own symbols with simple name `name`, in declaration order
    pub fn find_locals<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Symbol>> + 'a {
        self.symbols.iter().filter(move |s| s.name == name)
    }

    /// Locate the symbol a raw dependency originates from.
    ///
    /// Exact name match first; when that fails and the raw name carries a
    /// qualifier, retry with its trailing segment, preferring the symbol whose
    /// qualified name ends with the raw name.
    pub fn find_from_symbol(&self, raw: &str) -> Option<&Arc<Symbol>> {
        if let Some(symbol) = self.find_local(raw) {
            return Some(symbol);
        }
        if !is_qualified(raw) {
            return None;
        }

        let trailing = simple_name(raw);
        let mut candidates = self.symbols.iter().filter(|s| s.name == trailing);
        let first = candidates.clone().next();
        candidates
            .find(|s| {
                s.qualified_name
                    .as_deref()
                    .is_some_and(|q| q.ends_with(raw) || raw.ends_with(q))
            })
            .or(first)
    }

    /// Import declaration and imported name bound locally as `local`
    pub fn find_import_binding(&self, local: &str) -> Option<(&ImportDecl, &ImportedName)> {
        self.imports
            .iter()
            .find_map(|import| import.binding(local).map(|name| (import, name)))
    }

    pub fn hints(&self) -> &LanguageHints {
        &self.hints
    }

    pub fn hints_mut(&mut self) -> &mut LanguageHints {
        &mut self.hints
    }

    pub fn clear_hints(&mut self) {
        self.hints.clear();
    }
}
