//! Resolution strategy and confidence types
//!
//! Every resolved dependency records which mechanism produced the match and the
//! confidence that mechanism carries. Confidence is an ordinal used for
//! tie-breaking and diagnostics; it never gates whether an edge is emitted.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Ordinal confidence of a resolution, weakest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Heuristic fallback match
    Heuristic,
    /// Exactly one exported symbol with the name across the batch
    GlobalExport,
    /// Framework naming convention (stores, composables, lifecycle hooks)
    FrameworkPattern,
    /// Explicit import or qualified-name / autoloader lookup
    Import,
    /// Declared in the same file
    SameFile,
}

/// Mechanism that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Target declared verbatim among the file's own symbols
    LocalScope,
    /// Target bound by an import declaration
    Import,
    /// Fully qualified name found in the global index
    QualifiedName,
    /// Qualified name mapped to a file through the namespace/path resolver
    Autoloader,
    /// Framework naming convention
    FrameworkPattern,
    /// Placeholder for a framework entry point with no declaration in the repository
    VirtualSymbol,
    /// Single unambiguous export across the batch
    GlobalExport,
    /// Heuristic lookup in the edge builder after the resolver chain declined
    Fallback,
}

impl ResolutionStrategy {
    pub fn confidence(&self) -> Confidence {
        match self {
            ResolutionStrategy::LocalScope => Confidence::SameFile,
            ResolutionStrategy::Import
            | ResolutionStrategy::QualifiedName
            | ResolutionStrategy::Autoloader => Confidence::Import,
            ResolutionStrategy::FrameworkPattern | ResolutionStrategy::VirtualSymbol => {
                Confidence::FrameworkPattern
            }
            ResolutionStrategy::GlobalExport => Confidence::GlobalExport,
            ResolutionStrategy::Fallback => Confidence::Heuristic,
        }
    }

    /// Strategies that imply an import/export relationship between the files
    pub fn is_import_flavored(&self) -> bool {
        matches!(
            self,
            ResolutionStrategy::Import | ResolutionStrategy::GlobalExport
        )
    }
}
