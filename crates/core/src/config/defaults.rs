//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_ENV_PREFIX: &str = "DEPGRAPH";
pub(crate) const DEFAULT_MAX_FALLBACK_CANDIDATES: usize = 64;
pub(crate) const DEFAULT_MAX_CALL_DEPTH: usize = 64;
pub(crate) const DEFAULT_MAX_CALL_CHAINS: usize = 1000;

pub(crate) fn default_respect_file_boundaries() -> bool {
    true
}

pub(crate) fn default_filter_cross_language() -> bool {
    true
}

pub(crate) fn default_max_fallback_candidates() -> usize {
    DEFAULT_MAX_FALLBACK_CANDIDATES
}

pub(crate) fn default_max_call_depth() -> usize {
    DEFAULT_MAX_CALL_DEPTH
}

pub(crate) fn default_max_call_chains() -> usize {
    DEFAULT_MAX_CALL_CHAINS
}

/// Namespace tokens that mark a qualifier as belonging to an external library
pub(crate) fn default_external_namespaces() -> Vec<String> {
    [
        "Illuminate",
        "Symfony",
        "Laravel",
        "Carbon",
        "Str",
        "Arr",
        "DB",
        "Log",
        "Cache",
        "Auth",
        "Route",
        "Http",
        "System",
        "Microsoft",
        "Newtonsoft",
        "console",
        "window",
        "document",
        "JSON",
        "Math",
        "Object",
        "Array",
        "Promise",
        "axios",
        "lodash",
        "_",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
