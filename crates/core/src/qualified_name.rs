//! Qualified-name parsing shared by resolvers and the edge builder.
//!
//! Parsers emit references in whatever notation the source language uses:
//! `Foo::bar` (PHP static / Rust paths), `App\Models\User` (PHP namespaces),
//! `$this->save` (PHP instance access) and `store.fetch` (JS/C# member access).
//! This module splits those strings into segments without caring which
//! language they came from.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::error::{Error, Result};

/// Path separator style for qualified names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PathSeparator {
    /// `::` separator (PHP static access, Rust)
    #[default]
    DoubleColon,
    /// `.` separator (TypeScript, JavaScript, C#, Python)
    Dot,
    /// `\` separator (PHP namespaces)
    Backslash,
    /// `->` separator (PHP instance access)
    Arrow,
}

impl PathSeparator {
    pub const ALL: [PathSeparator; 4] = [
        PathSeparator::DoubleColon,
        PathSeparator::Arrow,
        PathSeparator::Backslash,
        PathSeparator::Dot,
    ];

    /// Get the string representation of this separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathSeparator::DoubleColon => "::",
            PathSeparator::Dot => ".",
            PathSeparator::Backslash => "\\",
            PathSeparator::Arrow => "->",
        }
    }
}

/// Strip a generic-parameter suffix: `Repository<User>` -> `Repository`
pub fn strip_generics(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

/// Position and separator of the right-most separator in `name`
fn last_separator(name: &str) -> Option<(usize, PathSeparator)> {
    PathSeparator::ALL
        .iter()
        .filter_map(|sep| name.rfind(sep.as_str()).map(|idx| (idx, *sep)))
        .max_by_key(|(idx, sep)| (*idx, sep.as_str().len()))
}

/// Split on the last separator into (qualifier, member).
///
/// `"App\\Models\\User::find"` -> `(Some("App\\Models\\User"), "find")`,
/// `"render"` -> `(None, "render")`. A trailing call suffix `()` is ignored.
pub fn split_qualifier(name: &str) -> (Option<&str>, &str) {
    let name = name.trim().trim_end_matches("()");
    match last_separator(name) {
        Some((idx, sep)) => {
            let qualifier = &name[..idx];
            let member = &name[idx + sep.as_str().len()..];
            if qualifier.is_empty() {
                (None, member)
            } else {
                (Some(qualifier), member)
            }
        }
        None => (None, name),
    }
}

/// Trailing segment after the last separator
pub fn simple_name(name: &str) -> &str {
    split_qualifier(name).1
}

/// Whether `name` contains any separator
pub fn is_qualified(name: &str) -> bool {
    last_separator(name).is_some()
}

/// Structured qualified name: ordered segments plus the dominant separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    segments: Vec<String>,
    separator: PathSeparator,
}

impl QualifiedName {
    /// Parse a qualified name string into segments.
    ///
    /// Mixed notations (`App\Models\User::find`) are split on every separator;
    /// the separator recorded is the last one seen.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or contains an empty segment.
    pub fn parse(s: &str) -> Result<Self> {
        let s = strip_generics(s);
        if s.is_empty() {
            return Err(Error::invalid_input("qualified name cannot be empty"));
        }

        let mut segments = Vec::new();
        let mut separator = PathSeparator::DoubleColon;
        let mut rest = s;
        while let Some((idx, sep)) = first_separator(rest) {
            segments.push(rest[..idx].to_string());
            rest = &rest[idx + sep.as_str().len()..];
            separator = sep;
        }
        segments.push(rest.to_string());

        // Leading `\` in PHP fully-qualified names yields an empty first segment
        if segments.first().is_some_and(|s| s.is_empty()) && segments.len() > 1 {
            segments.remove(0);
        }

        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::invalid_input(format!(
                "qualified name contains empty segment: {s}"
            )));
        }

        Ok(Self {
            segments,
            separator,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn separator(&self) -> PathSeparator {
        self.separator
    }

    /// Last segment (the simple name)
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segment directly enclosing the simple name, e.g. the owning class
    pub fn parent_name(&self) -> Option<&str> {
        if self.segments.len() < 2 {
            return None;
        }
        self.segments.get(self.segments.len() - 2).map(String::as_str)
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

fn first_separator(name: &str) -> Option<(usize, PathSeparator)> {
    PathSeparator::ALL
        .iter()
        .filter_map(|sep| name.find(sep.as_str()).map(|idx| (idx, *sep)))
        .min_by_key(|(idx, sep)| (*idx, usize::MAX - sep.as_str().len()))
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(self.separator.as_str()))
    }
}
