//! Member ownership
//!
//! Parsers do not always say which class a method belongs to. Ownership is
//! derived from the qualified name when it names a class declared in the same
//! file, and otherwise from line containment (innermost class-like symbol
//! whose range spans the member's first line).

use depgraph_core::entities::Symbol;
use depgraph_core::qualified_name::QualifiedName;
use std::sync::Arc;

fn qualified_parent(symbol: &Symbol) -> Option<String> {
    let qualified = symbol.qualified_name.as_deref()?;
    QualifiedName::parse(qualified)
        .ok()
        .and_then(|qn| qn.parent_name().map(str::to_string))
}

/// Innermost class-like symbol of `file_symbols` enclosing `symbol`
pub fn enclosing_type<'a>(symbol: &Symbol, file_symbols: &'a [Arc<Symbol>]) -> Option<&'a Arc<Symbol>> {
    if let Some(parent) = qualified_parent(symbol) {
        let by_name = file_symbols
            .iter()
            .find(|s| s.kind.is_type_like() && s.id != symbol.id && s.name == parent);
        if by_name.is_some() {
            return by_name;
        }
    }

    file_symbols
        .iter()
        .filter(|s| s.kind.is_type_like() && s.id != symbol.id)
        .filter(|s| s.end_line > s.start_line && s.spans_line(symbol.start_line))
        .min_by_key(|s| s.end_line - s.start_line)
}

/// Simple name of the class owning `symbol`, if any
pub fn owner_name(symbol: &Symbol, file_symbols: &[Arc<Symbol>]) -> Option<String> {
    enclosing_type(symbol, file_symbols)
        .map(|owner| owner.name.clone())
        .or_else(|| qualified_parent(symbol))
}

/// Whether `member` belongs to `owner`. Members with no derivable owner are
/// accepted when they are declared at or after the owner's first line.
pub fn belongs_to(member: &Symbol, owner: &Symbol, file_symbols: &[Arc<Symbol>]) -> bool {
    match owner_name(member, file_symbols) {
        Some(name) => name == owner.name,
        None => member.start_line >= owner.start_line,
    }
}

/// First member of `owner` named `name`
pub fn find_member<'a>(
    file_symbols: &'a [Arc<Symbol>],
    owner: &Symbol,
    name: &str,
) -> Option<&'a Arc<Symbol>> {
    file_symbols
        .iter()
        .filter(|s| s.name == name && s.id != owner.id)
        .find(|s| belongs_to(s, owner, file_symbols))
}
