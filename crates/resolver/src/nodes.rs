//! Node table of a resolution pass
//!
//! Every declared symbol of the batch plus every virtual symbol referenced by
//! an edge. Lookups used by the fallback path and edge admission: by id, by
//! simple name, by file, owning class and language of the declaring file.

use depgraph_core::entities::{FileId, Language, SourceFile, Symbol, SymbolId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

use crate::members::owner_name;

#[derive(Debug, Default)]
pub struct NodeTable {
    symbols: Vec<Arc<Symbol>>,
    by_id: HashMap<SymbolId, Arc<Symbol>>,
    by_name: HashMap<String, Vec<Arc<Symbol>>>,
    by_file: HashMap<FileId, Vec<Arc<Symbol>>>,
    owners: HashMap<SymbolId, String>,
    languages: HashMap<FileId, Language>,
    virtual_ids: HashSet<SymbolId>,
}

impl NodeTable {
    /// Index `symbols` in input order. A repeated id keeps its first symbol.
    pub fn new(files: &[SourceFile], symbols: &[Arc<Symbol>]) -> Self {
        let mut table = Self {
            languages: files.iter().map(|f| (f.id.clone(), f.language)).collect(),
            ..Self::default()
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for symbol in symbols {
            if !seen.insert(symbol.id.as_str()) {
                warn!("Duplicate symbol id {} in {}, keeping the first", symbol.id, symbol.file_id);
                continue;
            }
            table.insert(Arc::clone(symbol));
        }

        for (_, file_symbols) in table.by_file.iter() {
            for symbol in file_symbols {
                if let Some(owner) = owner_name(symbol, file_symbols) {
                    table.owners.insert(symbol.id.clone(), owner);
                }
            }
        }
        table
    }

    fn insert(&mut self, symbol: Arc<Symbol>) {
        self.by_id.insert(symbol.id.clone(), Arc::clone(&symbol));
        self.by_name
            .entry(symbol.name.clone())
            .or_default()
            .push(Arc::clone(&symbol));
        self.by_file
            .entry(symbol.file_id.clone())
            .or_default()
            .push(Arc::clone(&symbol));
        self.symbols.push(symbol);
    }

    /// Add a virtual symbol as a node. Returns false if the id is known.
    ///
    /// Virtual nodes are reachable by id only, so they never become
    /// name-based fallback candidates.
    pub fn add_virtual(&mut self, symbol: Arc<Symbol>) -> bool {
        if self.by_id.contains_key(&symbol.id) {
            return false;
        }
        // `{framework}::{Class}::{member}` carries an owner, `{framework}::{name}` does not
        let segments: Vec<&str> = symbol
            .qualified_name
            .as_deref()
            .map(|q| q.split("::").collect())
            .unwrap_or_default();
        if segments.len() >= 3 {
            let owner = segments[segments.len() - 2];
            self.owners.insert(symbol.id.clone(), owner.to_string());
        }
        self.by_id.insert(symbol.id.clone(), Arc::clone(&symbol));
        self.virtual_ids.insert(symbol.id.clone());
        self.symbols.push(symbol);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Symbol>> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Whether `id` belongs to a symbol of the scanned files
    pub fn is_declared(&self, id: &str) -> bool {
        self.by_id.contains_key(id) && !self.virtual_ids.contains(id)
    }

    pub fn by_name(&self, name: &str) -> &[Arc<Symbol>] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn file_symbols(&self, file_id: &str) -> &[Arc<Symbol>] {
        self.by_file.get(file_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Simple name of the class declaring `id`
    pub fn owner_of(&self, id: &str) -> Option<&str> {
        self.owners.get(id).map(String::as_str)
    }

    /// Language of the file declaring `id`. `None` for virtual symbols.
    pub fn language_of(&self, id: &str) -> Option<Language> {
        let symbol = self.by_id.get(id)?;
        self.languages.get(&symbol.file_id).copied()
    }

    /// All symbols, in insertion order
    pub fn symbols(&self) -> &[Arc<Symbol>] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
