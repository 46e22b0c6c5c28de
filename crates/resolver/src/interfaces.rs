//! Interface map built from the hierarchy edges of a pass
//!
//! `implementers["Base"]` lists the types declaring `extends Base` or
//! `implements Base`; `supertypes["Derived"]` lists the names `Derived`
//! extends or implements. Both keep edge order.

use depgraph_core::entities::Symbol;
use depgraph_core::graph::SymbolEdge;
use std::collections::HashMap;
use std::sync::Arc;

use crate::nodes::NodeTable;

#[derive(Debug, Default, Clone)]
pub struct InterfaceMap {
    implementers: HashMap<String, Vec<Arc<Symbol>>>,
    supertypes: HashMap<String, Vec<String>>,
}

impl InterfaceMap {
    /// Collect INHERITS/IMPLEMENTS edges between type-like nodes
    pub fn from_edges<'e>(edges: impl IntoIterator<Item = &'e SymbolEdge>, nodes: &NodeTable) -> Self {
        let mut map = Self::default();
        for edge in edges {
            if !edge.dependency_type.is_hierarchy() {
                continue;
            }
            let (Some(sub), Some(sup)) = (nodes.get(&edge.from_id), nodes.get(&edge.to_id)) else {
                continue;
            };
            if !sub.kind.is_type_like() {
                continue;
            }

            let implementers = map.implementers.entry(sup.name.clone()).or_default();
            if !implementers.iter().any(|s| s.id == sub.id) {
                implementers.push(Arc::clone(sub));
            }
            let supertypes = map.supertypes.entry(sub.name.clone()).or_default();
            if !supertypes.contains(&sup.name) {
                supertypes.push(sup.name.clone());
            }
        }
        map
    }

    /// Types extending or implementing `name`
    pub fn implementers(&self, name: &str) -> &[Arc<Symbol>] {
        self.implementers.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names `name` extends or implements
    pub fn supertypes(&self, name: &str) -> &[String] {
        self.supertypes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `a` and `b` are directly related in either direction
    pub fn related(&self, a: &str, b: &str) -> bool {
        self.supertypes(a).iter().any(|s| s == b) || self.supertypes(b).iter().any(|s| s == a)
    }

    pub fn is_empty(&self) -> bool {
        self.implementers.is_empty()
    }
}
