//! Context analysis
//!
//! Derives cheap, per-dependency hints from the file being resolved: which
//! framework the file is written against, whether it is a test file, and
//! whether the reference sits in a validation or HTTP-request context. The
//! hints only steer resolvers; they never produce edges themselves.

use depgraph_core::entities::{Dependency, ImportDecl, Language};
use depgraph_core::qualified_name::split_qualifier;
use glob::Pattern;
use strum_macros::{Display, EnumString};
use tracing::warn;

use crate::context::ResolutionContext;

/// Default glob patterns identifying test files
const TEST_FILE_PATTERNS: &[&str] = &[
    "tests/**",
    "test/**",
    "**/tests/**",
    "**/test/**",
    "**/__tests__/**",
    "**/*.test.*",
    "**/*.spec.*",
    "**/*Test.php",
    "**/*Tests.cs",
    "**/*Test.cs",
    "**/*.Tests/**",
];

/// Framework a file is written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Framework {
    Vue,
    React,
    Laravel,
    #[strum(serialize = "aspnetcore")]
    AspNetCore,
}

/// Hints for one dependency inside one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextHints {
    pub framework: Option<Framework>,
    pub is_test_file: bool,
    pub is_validation_context: bool,
    pub is_request_context: bool,
}

/// Computes [`ContextHints`]
#[derive(Debug, Clone)]
pub struct ContextAnalyzer {
    test_patterns: Vec<Pattern>,
}

impl Default for ContextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_framework_import(import: &ImportDecl, framework: Framework) -> bool {
    let source = import.source.as_str();
    match framework {
        Framework::Vue => {
            matches!(source, "vue" | "pinia" | "vue-router") || source.starts_with("@vue/")
        }
        Framework::React => {
            matches!(source, "react" | "react-dom") || source.starts_with("next/")
        }
        Framework::Laravel => {
            let source = source.trim_start_matches('\\');
            source.starts_with("Illuminate\\") || source.starts_with("Laravel\\")
        }
        Framework::AspNetCore => source.starts_with("Microsoft.AspNetCore"),
    }
}

fn mentions_request(token: &str) -> bool {
    let token = token.trim_start_matches('$').trim_start_matches('\\');
    let lowered = token.to_ascii_lowercase();
    lowered == "request"
        || lowered == "req"
        || lowered.ends_with("\\request")
        || lowered.ends_with("request()")
        || lowered == "httpcontext.request"
}

impl ContextAnalyzer {
    pub fn new() -> Self {
        Self::with_test_patterns(TEST_FILE_PATTERNS.iter().copied())
    }

    /// Analyzer with a custom set of test-file glob patterns. Invalid
    /// patterns are logged and skipped.
    pub fn with_test_patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        let test_patterns = patterns
            .into_iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid test file pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();
        Self { test_patterns }
    }

    pub fn is_test_path(&self, path: &str) -> bool {
        self.test_patterns.iter().any(|p| p.matches(path))
    }

    /// Framework detected from the file's language and imports
    pub fn detect_framework(&self, context: &ResolutionContext) -> Option<Framework> {
        if context.language() == Language::Vue {
            return Some(Framework::Vue);
        }

        let candidates: &[Framework] = match context.language() {
            Language::JavaScript | Language::TypeScript => &[Framework::Vue, Framework::React],
            Language::Php => &[Framework::Laravel],
            Language::CSharp => &[Framework::AspNetCore],
            _ => &[],
        };

        candidates.iter().copied().find(|framework| {
            context
                .imports
                .iter()
                .any(|import| is_framework_import(import, *framework))
        })
    }

    fn is_validation_context(&self, context: &ResolutionContext, dep: Option<&Dependency>) -> bool {
        let path = context.path();
        if path.contains("/Requests/") || path.contains("Validator") || path.contains("validation")
        {
            return true;
        }
        dep.is_some_and(|dep| {
            let target = dep.to_symbol.to_ascii_lowercase();
            let (qualifier, _) = split_qualifier(&dep.to_symbol);
            dep.from_symbol == "rules"
                || target.contains("validate")
                || qualifier.is_some_and(|q| {
                    let q = q.trim_start_matches('$').to_ascii_lowercase();
                    q == "validator" || q.ends_with("\\validator")
                })
        })
    }

    fn is_request_context(&self, dep: Option<&Dependency>) -> bool {
        let Some(dep) = dep else {
            return false;
        };
        if dep.calling_object.as_deref().is_some_and(mentions_request) {
            return true;
        }
        let (qualifier, _) = split_qualifier(&dep.to_symbol);
        qualifier.is_some_and(mentions_request)
    }

    /// Hints for resolving `dep` (or the file in general when `None`)
    pub fn analyze(&self, context: &ResolutionContext, dep: Option<&Dependency>) -> ContextHints {
        ContextHints {
            framework: self.detect_framework(context),
            is_test_file: self.is_test_path(context.path()),
            is_validation_context: self.is_validation_context(context, dep),
            is_request_context: self.is_request_context(dep),
        }
    }
}
