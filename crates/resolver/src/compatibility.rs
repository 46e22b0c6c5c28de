//! Cross-language edge compatibility

use depgraph_core::entities::Language;

/// Same language, or both in the front-end group sharing a runtime
pub fn languages_compatible(a: Language, b: Language) -> bool {
    a == b || (a.is_front_end() && b.is_front_end())
}
