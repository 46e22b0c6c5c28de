//! Core types for the depgraph symbol resolution engine
//!
//! This crate provides the foundational abstractions shared by the resolver
//! and the command-line front end:
//!
//! - **Entities**: symbols, raw dependencies, imports and exports produced by parsers
//! - **Graph**: the resolved symbol graph and its persistence projection
//! - **Resolution**: strategy and confidence tags attached to every match
//! - **Qualified names**: separator-agnostic name splitting
//! - **Namespaces**: the path-alias collaborator used for autoloader lookups
//! - **Configuration**: engine configuration management
//! - **Error handling**: unified error types
//!

pub mod config;
pub mod entities;
pub mod entity_id;
pub mod error;
pub mod graph;
pub mod namespace;
pub mod qualified_name;
pub mod resolution;

// Re-export main types for convenience
pub use config::{Config, QueryConfig, ResolutionConfig};
pub use entities::{
    Dependency, DependencyType, ExportDecl, FileId, ImportDecl, ImportKind, ImportedName,
    Language, ParsedFile, ScanInput, SourceFile, Symbol, SymbolBuilder, SymbolId, SymbolKind,
    Visibility,
};
pub use error::{Error, Result, ResultExt};
pub use graph::{CreateDependency, EdgeMetadata, ResolutionStats, SymbolEdge, SymbolGraph, SymbolNode};
pub use namespace::{NamespaceResolver, NoopNamespaceResolver, PathAlias, PathAliasResolver};
pub use resolution::{Confidence, ResolutionStrategy};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::entities::{Dependency, DependencyType, Language, Symbol, SymbolKind};
    pub use crate::error::{Result, ResultExt};
    pub use crate::graph::{SymbolEdge, SymbolGraph};
}
