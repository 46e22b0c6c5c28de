//! Symbol index manager
//!
//! Two indices live here:
//!
//! - the **global index** (qualified name -> location, `(file_path)::(Class)`
//!   keys, id -> symbol, path -> file). Built once per full scan and replaced
//!   wholesale by [`SymbolIndexManager::build_global_index`].
//! - the **transient index** (simple name -> symbols, exported name ->
//!   symbols, per-file symbol lists, default exports). Scoped to one
//!   resolution batch and rebuilt whenever the batch's contexts change.
//!
//! All lookups are O(1) average and return `None` / an empty slice on a miss.
//! Global lookups that go through a [`SymbolLocation`] fail with
//! [`Error::Resolution`] when the location names a symbol or file the global
//! index does not hold.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use depgraph_core::entities::{FileId, SourceFile, Symbol, SymbolId};
use depgraph_core::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::ResolutionContext;

/// Extensions tried when an import path omits one
const MODULE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "vue", "php", "cs"];

/// Where a qualified name lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLocation {
    pub symbol_id: SymbolId,
    pub file_id: FileId,
    pub file_path: String,
}

/// An exported symbol together with its owning file
#[derive(Debug, Clone)]
pub struct ExportedSymbol {
    pub symbol: Arc<Symbol>,
    pub file_id: FileId,
}

#[derive(Debug, Default)]
struct GlobalIndex {
    by_qualified_name: HashMap<String, SymbolLocation>,
    /// `(file_path)::(simple_name)` for class-like symbols
    class_by_file_key: HashMap<String, SymbolLocation>,
    by_id: HashMap<SymbolId, Arc<Symbol>>,
    files: HashMap<FileId, SourceFile>,
    file_by_path: HashMap<String, FileId>,
    /// Files in scan order, for deterministic iteration
    file_order: Vec<FileId>,
}

#[derive(Debug, Default)]
struct TransientIndex {
    by_name: HashMap<String, Vec<Arc<Symbol>>>,
    exported: HashMap<String, Vec<ExportedSymbol>>,
    default_exports: HashMap<FileId, Arc<Symbol>>,
    by_file: HashMap<FileId, Vec<Arc<Symbol>>>,
}

/// Owner of the global and transient symbol indices
#[derive(Debug, Default)]
pub struct SymbolIndexManager {
    global: GlobalIndex,
    transient: TransientIndex,
}

fn file_class_key(file_path: &str, name: &str) -> String {
    format!("{file_path}::{name}")
}

/// Normalize a repository-relative path: `/` separators, `.` and `..` folded
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

impl SymbolIndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the global index, replacing any previous one
    pub fn build_global_index(&mut self, files: &[SourceFile], symbols: &[Arc<Symbol>]) {
        let mut global = GlobalIndex::default();

        for file in files {
            let path = normalize_path(&file.path);
            if global.files.contains_key(&file.id) {
                warn!("Duplicate file id {} ({}), keeping first", file.id, path);
                continue;
            }
            global.file_by_path.insert(path, file.id.clone());
            global.file_order.push(file.id.clone());
            global.files.insert(file.id.clone(), file.clone());
        }

        for symbol in symbols {
            if global.by_id.contains_key(&symbol.id) {
                warn!("Duplicate symbol id {}, keeping first", symbol.id);
                continue;
            }
            global.by_id.insert(symbol.id.clone(), Arc::clone(symbol));

            let file_path = global
                .files
                .get(&symbol.file_id)
                .map(|f| normalize_path(&f.path))
                .unwrap_or_default();
            let location = SymbolLocation {
                symbol_id: symbol.id.clone(),
                file_id: symbol.file_id.clone(),
                file_path: file_path.clone(),
            };

            if let Some(qualified) = &symbol.qualified_name {
                let key = qualified.trim_start_matches('\\').to_string();
                global
                    .by_qualified_name
                    .entry(key)
                    .or_insert_with(|| location.clone());
            }

            if symbol.kind.is_type_like() {
                global
                    .class_by_file_key
                    .entry(file_class_key(&file_path, &symbol.name))
                    .or_insert(location);
            }
        }

        debug!(
            "Global index built: {} files, {} symbols, {} qualified names",
            global.files.len(),
            global.by_id.len(),
            global.by_qualified_name.len()
        );
        self.global = global;
    }

    /// Populate the batch-scoped indices from the batch's contexts
    pub fn build_transient_indexes(&mut self, contexts: &[ResolutionContext]) {
        let mut transient = TransientIndex::default();

        for context in contexts {
            let file_id = context.file_id().to_string();

            for symbol in &context.symbols {
                transient
                    .by_name
                    .entry(symbol.name.clone())
                    .or_default()
                    .push(Arc::clone(symbol));
                transient
                    .by_file
                    .entry(file_id.clone())
                    .or_default()
                    .push(Arc::clone(symbol));
                if symbol.exported {
                    transient
                        .exported
                        .entry(symbol.name.clone())
                        .or_default()
                        .push(ExportedSymbol {
                            symbol: Arc::clone(symbol),
                            file_id: file_id.clone(),
                        });
                }
            }

            for export in &context.exports {
                let Some(symbol) = context.find_local(export.symbol_name()) else {
                    debug!(
                        "Export {} in {} has no matching declaration",
                        export.name,
                        context.path()
                    );
                    continue;
                };

                if export.is_default {
                    transient
                        .default_exports
                        .entry(file_id.clone())
                        .or_insert_with(|| Arc::clone(symbol));
                    continue;
                }

                let entries = transient.exported.entry(export.name.clone()).or_default();
                let already = entries
                    .iter()
                    .any(|e| e.symbol.id == symbol.id && e.file_id == file_id);
                if !already {
                    entries.push(ExportedSymbol {
                        symbol: Arc::clone(symbol),
                        file_id: file_id.clone(),
                    });
                }
            }
        }

        debug!(
            "Transient index built: {} names, {} exported names",
            transient.by_name.len(),
            transient.exported.len()
        );
        self.transient = transient;
    }

    pub fn get_symbols_by_name(&self, name: &str) -> &[Arc<Symbol>] {
        self.transient
            .by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_exported_symbols(&self, name: &str) -> &[ExportedSymbol] {
        self.transient
            .exported
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_default_export(&self, file_id: &str) -> Option<&Arc<Symbol>> {
        self.transient.default_exports.get(file_id)
    }

    pub fn get_file_symbols(&self, file_id: &str) -> &[Arc<Symbol>] {
        self.transient
            .by_file
            .get(file_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_location_by_qualified_name(&self, qualified_name: &str) -> Option<&SymbolLocation> {
        self.global
            .by_qualified_name
            .get(qualified_name.trim_start_matches('\\'))
    }

    pub fn get_symbol_by_qualified_name(&self, qualified_name: &str) -> Result<Option<&Arc<Symbol>>> {
        self.get_location_by_qualified_name(qualified_name)
            .map(|loc| self.symbol_at(loc))
            .transpose()
    }

    fn symbol_at(&self, location: &SymbolLocation) -> Result<&Arc<Symbol>> {
        if !self.global.files.contains_key(&location.file_id) {
            return Err(Error::resolution(
                &location.file_id,
                format!("symbol {} is indexed under an unscanned file", location.symbol_id),
            ));
        }
        self.global.by_id.get(&location.symbol_id).ok_or_else(|| {
            Error::resolution(
                &location.file_path,
                format!("location of {} has no indexed symbol", location.symbol_id),
            )
        })
    }

    pub fn get_symbol_by_id(&self, id: &str) -> Option<&Arc<Symbol>> {
        self.global.by_id.get(id)
    }

    /// Class-like symbol `name` declared in the file at `file_path`
    pub fn get_class_in_file(&self, file_path: &str, name: &str) -> Result<Option<&Arc<Symbol>>> {
        self.global
            .class_by_file_key
            .get(&file_class_key(&normalize_path(file_path), name))
            .map(|loc| self.symbol_at(loc))
            .transpose()
    }

    pub fn get_file(&self, file_id: &str) -> Option<&SourceFile> {
        self.global.files.get(file_id)
    }

    pub fn get_file_by_path(&self, path: &str) -> Option<&SourceFile> {
        self.global
            .file_by_path
            .get(&normalize_path(path))
            .and_then(|id| self.global.files.get(id))
    }

    /// Resolve an extension-less module path (`src/stores/auth`) to a file,
    /// probing known extensions and `index.*` entry points
    pub fn find_file_for_module(&self, module_path: &str) -> Option<&SourceFile> {
        let base = normalize_path(module_path);
        if let Some(file) = self.get_file_by_path(&base) {
            return Some(file);
        }
        MODULE_EXTENSIONS
            .iter()
            .map(|ext| format!("{base}.{ext}"))
            .chain(MODULE_EXTENSIONS.iter().map(|ext| format!("{base}/index.{ext}")))
            .find_map(|candidate| self.get_file_by_path(&candidate))
    }

    /// Files in scan order
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.global
            .file_order
            .iter()
            .filter_map(|id| self.global.files.get(id))
    }

    pub fn symbol_count(&self) -> usize {
        self.global.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global.by_id.is_empty()
    }

    /// Reset batch-scoped state only
    pub fn clear_transient(&mut self) {
        self.transient = TransientIndex::default();
    }

    /// Reset everything, used before re-scanning a repository from scratch
    pub fn clear_all(&mut self) {
        self.clear_transient();
        self.global = GlobalIndex::default();
    }
}
