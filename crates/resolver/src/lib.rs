//! Symbol resolution and dependency graph construction
//!
//! Turns the per-file output of the parsing stage (symbols, raw dependencies,
//! imports, exports) into a [`SymbolGraph`](depgraph_core::SymbolGraph):
//!
//! - **Index**: global qualified-name index plus batch-scoped name/export indices
//! - **Resolvers**: per-language and framework-convention resolvers tried in order
//! - **Orchestrator**: anchors each dependency and runs the resolver chain
//! - **Builder**: fallback lookup, CALL disambiguation, edge admission and de-duplication
//! - **Query**: callers, callees, hierarchy, call depth, cycles and unused symbols
//!
//! ```no_run
//! use depgraph_core::{ResolutionConfig, ScanInput};
//! use depgraph_resolver::DependencyGraphEngine;
//!
//! let scan: ScanInput = serde_json::from_str("{\"files\": []}").unwrap();
//! let mut engine = DependencyGraphEngine::new(ResolutionConfig::default());
//! let output = engine.build_graph(&scan.files);
//! println!("{} edges", output.graph.edges.len());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod analyzer;
pub mod builder;
pub mod compatibility;
pub mod context;
pub mod disambiguation;
pub mod fallback;
pub mod index;
pub mod interfaces;
pub mod members;
pub mod nodes;
pub mod orchestrator;
pub mod query;
pub mod resolvers;
pub mod virtual_symbols;

pub use analyzer::{ContextAnalyzer, ContextHints, Framework};
pub use builder::{DependencyGraphEngine, GraphBuildOutput};
pub use context::{LanguageHints, ResolutionContext};
pub use index::SymbolIndexManager;
pub use orchestrator::{DeclinedDependency, FileResolution, ResolvedDependency, SymbolResolver};
pub use query::GraphQuery;
pub use resolvers::{
    FrameworkResolver, LanguageResolver, Resolution, Resolver, ResolverChain, StoreNaming,
};
pub use virtual_symbols::VirtualSymbolFactory;
