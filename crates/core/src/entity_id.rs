//! Deterministic identifiers for synthesized symbols

use twox_hash::XxHash3_128;

/// Prefix shared by every virtual symbol and virtual file id
pub const VIRTUAL_PREFIX: &str = "virtual";

const HASH_HEX_LEN: usize = 32;

/// Generate the id of a virtual symbol from its stable (framework, name) key
///
/// The same key always yields the same id, so repeated references to a
/// framework entry point collapse onto one node.
pub fn generate_virtual_symbol_id(framework: &str, name: &str) -> String {
    let unique_str = format!("{framework}:{name}");
    format!(
        "{VIRTUAL_PREFIX}-{:0width$x}",
        XxHash3_128::oneshot(unique_str.as_bytes()),
        width = HASH_HEX_LEN
    )
}

/// Pseudo file id owning all virtual symbols of a framework
pub fn virtual_file_id(framework: &str) -> String {
    format!("{VIRTUAL_PREFIX}:{framework}")
}

/// Whether `id` has the shape of a generated virtual symbol id:
/// `virtual-` followed by 32 lowercase hex digits
pub fn is_virtual_id(id: &str) -> bool {
    id.strip_prefix(VIRTUAL_PREFIX)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hash| {
            hash.len() == HASH_HEX_LEN && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
}

pub fn is_virtual_file_id(file_id: &str) -> bool {
    file_id
        .strip_prefix(VIRTUAL_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
        .is_some_and(|framework| !framework.is_empty())
}

/// A symbol is virtual only when both its id and its file id were generated
pub fn is_virtual_symbol(id: &str, file_id: &str) -> bool {
    is_virtual_id(id) && is_virtual_file_id(file_id)
}
