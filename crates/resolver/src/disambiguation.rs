//! CALL disambiguation
//!
//! Several same-named candidates for a call are narrowed with the class hint
//! the parser attached to the dependency (`resolved_class`, else
//! `qualified_context`). An exact owner match wins; otherwise an owner related
//! to the hint through the interface map. A hint that still leaves a tie
//! takes the first candidate. Without any hint the call is not guessed.

use depgraph_core::entities::{Dependency, Symbol};
use depgraph_core::qualified_name::simple_name;
use std::sync::Arc;
use tracing::debug;

use crate::interfaces::InterfaceMap;
use crate::nodes::NodeTable;

const FIELD_CALL_PREFIX: &str = "field_call_";

/// Outcome of narrowing a candidate list
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// Exactly one candidate to begin with
    Unique(Arc<Symbol>),
    /// Owner matched the class hint
    ByHint(Arc<Symbol>),
    /// Owner related to the class hint through the interface map
    ByInterface(Arc<Symbol>),
    /// Hint present but still tied; first candidate in input order
    FirstPick(Arc<Symbol>),
    /// Several candidates and no hint
    Dropped,
    NoCandidates,
}

impl CallTarget {
    pub fn symbol(&self) -> Option<&Arc<Symbol>> {
        match self {
            CallTarget::Unique(s)
            | CallTarget::ByHint(s)
            | CallTarget::ByInterface(s)
            | CallTarget::FirstPick(s) => Some(s),
            CallTarget::Dropped | CallTarget::NoCandidates => None,
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Class name hinted by the dependency, if any.
///
/// `field_call_userService` hints `UserService`; `App\Models\User<T>` hints `User`.
pub fn hint_class_name(dep: &Dependency) -> Option<String> {
    let hint = [dep.resolved_class.as_deref(), dep.qualified_context.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|h| !h.is_empty())?;

    let name = match hint.strip_prefix(FIELD_CALL_PREFIX) {
        Some(field) => capitalize(simple_name(field).trim_start_matches('_')),
        None => simple_name(hint.split('<').next().unwrap_or(hint)).to_string(),
    };
    (!name.is_empty()).then_some(name)
}

/// Narrow `candidates` for a CALL dependency
pub fn disambiguate_call(
    candidates: &[Arc<Symbol>],
    dep: &Dependency,
    nodes: &NodeTable,
    interfaces: &InterfaceMap,
) -> CallTarget {
    match candidates {
        [] => return CallTarget::NoCandidates,
        [only] => return CallTarget::Unique(Arc::clone(only)),
        _ => {}
    }

    let Some(hint) = hint_class_name(dep) else {
        debug!(
            "Dropping call {} -> {}: {} candidates and no class hint",
            dep.from_symbol,
            dep.to_symbol,
            candidates.len()
        );
        return CallTarget::Dropped;
    };

    let by_hint: Vec<&Arc<Symbol>> = candidates
        .iter()
        .filter(|c| nodes.owner_of(&c.id) == Some(hint.as_str()))
        .collect();
    if let [only] = by_hint.as_slice() {
        return CallTarget::ByHint(Arc::clone(only));
    }

    let by_interface: Vec<&Arc<Symbol>> = if by_hint.is_empty() {
        candidates
            .iter()
            .filter(|c| {
                nodes
                    .owner_of(&c.id)
                    .is_some_and(|owner| interfaces.related(owner, &hint))
            })
            .collect()
    } else {
        Vec::new()
    };
    if let [only] = by_interface.as_slice() {
        return CallTarget::ByInterface(Arc::clone(only));
    }

    let remaining = [by_hint, by_interface]
        .into_iter()
        .find(|set| !set.is_empty())
        .and_then(|set| set.first().copied())
        .unwrap_or(&candidates[0]);
    debug!(
        "Call {} -> {} still ambiguous for hint {}, taking {}",
        dep.from_symbol, dep.to_symbol, hint, remaining.id
    );
    CallTarget::FirstPick(Arc::clone(remaining))
}
