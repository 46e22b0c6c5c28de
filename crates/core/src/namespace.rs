//! Namespace / path-alias resolution
//!
//! Maps a fully qualified name (`App\Models\User`, `@/stores/auth`,
//! `Acme.Billing.Invoice`) to a repository-relative file path. Discovery of
//! the mappings (composer autoload sections, tsconfig paths, csproj roots) is
//! done upstream; this module only applies them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::trace;

use crate::entities::Language;

/// Collaborator consulted when the engine's own indices cannot place a
/// qualified reference.
pub trait NamespaceResolver: Send + Sync {
    /// Returns the repository-relative path (without guaranteeing it exists)
    fn resolve(&self, qualified_name: &str, language: Language) -> Option<PathBuf>;
}

/// Resolver that never maps anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNamespaceResolver;

impl NamespaceResolver for NoopNamespaceResolver {
    fn resolve(&self, _qualified_name: &str, _language: Language) -> Option<PathBuf> {
        None
    }
}

/// One namespace prefix -> directory mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathAlias {
    /// Namespace or alias prefix, e.g. `App\` or `@/`
    pub prefix: String,
    /// Repository-relative directory, e.g. `app/` or `src/`
    pub directory: String,
    /// Restrict the alias to one language
    #[serde(default)]
    pub language: Option<Language>,
}

impl PathAlias {
    pub fn new(prefix: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            directory: directory.into(),
            language: None,
        }
    }
}

/// Longest-prefix table of [`PathAlias`] entries
#[derive(Debug, Clone, Default)]
pub struct PathAliasResolver {
    /// Sorted by prefix length (longest first) for longest-prefix matching
    aliases: Vec<PathAlias>,
}

impl PathAliasResolver {
    pub fn new(aliases: impl IntoIterator<Item = PathAlias>) -> Self {
        let mut resolver = Self::default();
        for alias in aliases {
            resolver.add(alias);
        }
        resolver
    }

    pub fn add(&mut self, alias: PathAlias) {
        self.aliases.push(alias);
        self.aliases
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }
}

fn extension_for(language: Language) -> Option<&'static str> {
    match language {
        Language::Php => Some("php"),
        Language::CSharp => Some("cs"),
        Language::Python => Some("py"),
        Language::Java => Some("java"),
        // Script imports omit extensions; the index tries candidates
        _ => None,
    }
}

impl NamespaceResolver for PathAliasResolver {
    fn resolve(&self, qualified_name: &str, language: Language) -> Option<PathBuf> {
        let name = qualified_name.trim_start_matches('\\');
        let alias = self.aliases.iter().find(|a| {
            name.starts_with(a.prefix.as_str()) && a.language.is_none_or(|l| l == language)
        })?;

        let remainder = &name[alias.prefix.len()..];
        let relative = match language {
            Language::Php => remainder.replace('\\', "/"),
            Language::CSharp | Language::Java | Language::Python => remainder.replace('.', "/"),
            _ => remainder.to_string(),
        };
        let relative = relative.trim_start_matches('/');

        let mut path = PathBuf::from(alias.directory.trim_end_matches('/'));
        path.push(relative);
        if let Some(ext) = extension_for(language) {
            path.set_extension(ext);
        }

        trace!("namespace {} -> {}", qualified_name, path.display());
        Some(path)
    }
}
