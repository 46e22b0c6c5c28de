//! Fallback lookup for dependencies the resolver chain declined
//!
//! The lookup works on the node table only:
//!
//! 1. Type arguments are stripped and the target split into qualifier and
//!    member on the last separator.
//! 2. A qualified target searches members of the qualifier-named types in the
//!    dependency's own file (every file when file boundaries are off).
//! 3. Failing that, the qualifier is treated as an interface and its
//!    implementers are searched.
//! 4. Failing that, the member name alone is searched, unless the qualifier
//!    looks like an external library or an instance variable.
//! 5. An unqualified target searches the name directly.
//!
//! Candidates in incompatible languages are removed up front so they cannot
//! make an otherwise unique CALL ambiguous.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use depgraph_core::config::ResolutionConfig;
use depgraph_core::entities::{Dependency, Language, Symbol};
use depgraph_core::qualified_name::{simple_name, split_qualifier};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

use crate::compatibility::languages_compatible;
use crate::interfaces::InterfaceMap;
use crate::members::belongs_to;
use crate::nodes::NodeTable;

/// Receivers that always mean "the enclosing class"
const SELF_RECEIVERS: &[&str] = &["this", "$this", "self", "static"];

/// Candidates produced by one lookup
#[derive(Debug, Default)]
pub struct FallbackMatch {
    pub candidates: Vec<Arc<Symbol>>,
    /// Same-named symbols dropped because their language is incompatible
    pub cross_language: usize,
}

/// `Repository<User>.find` -> `Repository.find`
fn strip_type_arguments(name: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().trim_start_matches('\\').to_string()
}

/// Leading segment of a qualifier, before any separator
fn first_segment(qualifier: &str) -> &str {
    let end = ["::", "->", "\\", "."]
        .iter()
        .filter_map(|sep| qualifier.find(sep))
        .min()
        .unwrap_or(qualifier.len());
    &qualifier[..end]
}

/// Whether a member signature names `owner` as its declaring type
fn signature_mentions(member: &Symbol, owner: &str) -> bool {
    member.signature.as_deref().is_some_and(|sig| {
        sig.contains(&format!("{owner}::"))
            || sig.contains(&format!("{owner}."))
            || sig.contains(&format!("{owner}->"))
    })
}

pub struct FallbackLookup<'a> {
    nodes: &'a NodeTable,
    interfaces: &'a InterfaceMap,
    config: &'a ResolutionConfig,
}

impl<'a> FallbackLookup<'a> {
    pub fn new(nodes: &'a NodeTable, interfaces: &'a InterfaceMap, config: &'a ResolutionConfig) -> Self {
        Self {
            nodes,
            interfaces,
            config,
        }
    }

    /// Every plausible target of `dep` as seen from `from`, in node order
    pub fn lookup(&self, dep: &Dependency, from: &Symbol, from_language: Language) -> FallbackMatch {
        let target = strip_type_arguments(&dep.to_symbol);
        let (qualifier, member) = split_qualifier(&target);
        if member.is_empty() {
            return FallbackMatch::default();
        }

        let raw = match qualifier {
            Some(qualifier) => self.lookup_qualified(qualifier, member, from),
            None => self.nodes.by_name(member).to_vec(),
        };
        self.finish(raw, from_language)
    }

    fn lookup_qualified(&self, qualifier: &str, member: &str, from: &Symbol) -> Vec<Arc<Symbol>> {
        let owner = if SELF_RECEIVERS.contains(&qualifier) {
            match self.nodes.owner_of(&from.id) {
                Some(owner) => owner.to_string(),
                None => return Vec::new(),
            }
        } else {
            simple_name(qualifier).trim_start_matches('$').to_string()
        };

        let members = self.owner_members(&owner, member, Some(from.file_id.as_str()));
        if !members.is_empty() {
            trace!("{}.{} found on same-file owner", owner, member);
            return members;
        }

        let substituted: Vec<Arc<Symbol>> = self
            .interfaces
            .implementers(&owner)
            .iter()
            .flat_map(|implementer| {
                self.owner_members(&implementer.name, member, Some(implementer.file_id.as_str()))
            })
            .collect();
        if !substituted.is_empty() {
            trace!("{}.{} found on an implementer", owner, member);
            return substituted;
        }

        if SELF_RECEIVERS.contains(&qualifier) || self.looks_external(qualifier) {
            trace!("Not guessing {}.{}: external or instance access", qualifier, member);
            return Vec::new();
        }
        self.nodes.by_name(member).to_vec()
    }

    /// Members named `member` of the types named `owner`. `file` restricts the
    /// owner search when file boundaries are respected.
    fn owner_members(&self, owner: &str, member: &str, file: Option<&str>) -> Vec<Arc<Symbol>> {
        let restrict = if self.config.respect_file_boundaries { file } else { None };
        self.nodes
            .by_name(owner)
            .iter()
            .filter(|o| o.kind.is_type_like())
            .filter(|o| restrict.is_none_or(|f| o.file_id == f))
            .flat_map(|o| {
                let file_symbols = self.nodes.file_symbols(&o.file_id);
                file_symbols
                    .iter()
                    .filter(move |s| s.name == member && s.id != o.id)
                    .filter(move |s| belongs_to(s, o, file_symbols) || signature_mentions(s, &o.name))
                    .cloned()
            })
            .collect()
    }

    /// Configured library namespaces, or a lowercase / `$` leading member
    /// access (`$request->input`, `user.save`)
    fn looks_external(&self, qualifier: &str) -> bool {
        let head = first_segment(qualifier).trim_start_matches(['$', '\\']);
        if self.config.external_namespaces.iter().any(|ns| ns == head) {
            return true;
        }
        simple_name(qualifier)
            .chars()
            .next()
            .is_none_or(|c| c == '$' || c.is_lowercase())
    }

    fn finish(&self, raw: Vec<Arc<Symbol>>, from_language: Language) -> FallbackMatch {
        let mut seen = HashSet::new();
        let mut result = FallbackMatch::default();
        for candidate in raw {
            if !seen.insert(candidate.id.clone()) {
                continue;
            }
            let compatible = !self.config.filter_cross_language
                || self
                    .nodes
                    .language_of(&candidate.id)
                    .is_none_or(|lang| languages_compatible(from_language, lang));
            if compatible {
                result.candidates.push(candidate);
            } else {
                result.cross_language += 1;
            }
        }
        result
    }
}
