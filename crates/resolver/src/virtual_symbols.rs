//! Virtual symbols
//!
//! Framework entry points referenced by application code but declared in no
//! scanned file (`ref` from `vue`, `Request::input` in Laravel) become
//! synthesized symbols so the reference still yields an edge. One symbol
//! exists per `(framework, name)` key for the lifetime of the engine.

use depgraph_core::entities::{Symbol, SymbolKind, Visibility};
use depgraph_core::entity_id::{generate_virtual_symbol_id, virtual_file_id};
use depgraph_core::qualified_name::simple_name;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Creates and caches virtual symbols keyed by `(framework, name)`
#[derive(Debug, Default)]
pub struct VirtualSymbolFactory {
    cache: HashMap<(String, String), Arc<Symbol>>,
    order: Vec<(String, String)>,
}

impl VirtualSymbolFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached symbol for `(framework, name)`, creating it on first use
    pub fn get_or_create(&mut self, framework: &str, name: &str, kind: SymbolKind) -> Arc<Symbol> {
        let key = (framework.to_string(), name.to_string());
        if let Some(symbol) = self.cache.get(&key) {
            return Arc::clone(symbol);
        }

        let symbol = Arc::new(Symbol {
            id: generate_virtual_symbol_id(framework, name),
            file_id: virtual_file_id(framework),
            name: simple_name(name).to_string(),
            qualified_name: Some(format!("{framework}::{name}")),
            kind,
            start_line: 1,
            end_line: 1,
            exported: true,
            visibility: Some(Visibility::Public),
            signature: None,
        });
        trace!("Created virtual symbol {} for {}::{}", symbol.id, framework, name);

        self.order.push(key.clone());
        self.cache.insert(key, Arc::clone(&symbol));
        symbol
    }

    pub fn get(&self, framework: &str, name: &str) -> Option<&Arc<Symbol>> {
        self.cache.get(&(framework.to_string(), name.to_string()))
    }

    /// Virtual symbols in creation order
    pub fn symbols(&self) -> impl Iterator<Item = &Arc<Symbol>> {
        self.order.iter().filter_map(|key| self.cache.get(key))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph_core::entity_id::is_virtual_id;

    #[test]
    fn test_same_key_returns_same_symbol() {
        let mut factory = VirtualSymbolFactory::new();
        let a = factory.get_or_create("vue", "ref", SymbolKind::Function);
        let b = factory.get_or_create("vue", "ref", SymbolKind::Function);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.len(), 1);
        assert!(is_virtual_id(&a.id));
        assert_eq!(a.file_id, "virtual:vue");
    }

    #[test]
    fn test_distinct_frameworks_get_distinct_symbols() {
        let mut factory = VirtualSymbolFactory::new();
        let vue = factory.get_or_create("vue", "ref", SymbolKind::Function);
        let pinia = factory.get_or_create("pinia", "ref", SymbolKind::Function);
        assert_ne!(vue.id, pinia.id);
    }

    #[test]
    fn test_qualified_virtual_name() {
        let mut factory = VirtualSymbolFactory::new();
        let input = factory.get_or_create("laravel", "Request::input", SymbolKind::Method);
        assert_eq!(input.name, "input");
        assert_eq!(input.qualified_name.as_deref(), Some("laravel::Request::input"));

        let names: Vec<_> = factory.symbols().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["input".to_string()]);

        factory.clear();
        assert!(factory.is_empty());
        assert!(factory.get("laravel", "Request::input").is_none());
    }
}
