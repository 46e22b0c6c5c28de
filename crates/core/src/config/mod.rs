//! Configuration module for depgraph
//!
//! This module provides configuration structures and loading mechanisms for the
//! resolution engine. Configuration can be loaded from TOML files and/or environment
//! variables.

mod defaults;
mod loading;


use crate::error::{Error, Result, ResultExt};
use crate::namespace::{PathAlias, PathAliasResolver};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.depgraph/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".depgraph").join("config.toml"))
}

/// Resolution engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Restrict fallback owner lookup to the dependency's own file
    #[serde(default = "default_respect_file_boundaries")]
    pub respect_file_boundaries: bool,

    /// Drop edges between incompatible languages
    #[serde(default = "default_filter_cross_language")]
    pub filter_cross_language: bool,

    /// Qualifier tokens treated as external libraries by the fallback lookup
    #[serde(default = "default_external_namespaces")]
    pub external_namespaces: Vec<String>,

    /// Upper bound on candidates a single non-CALL fallback lookup may emit
    #[serde(default = "default_max_fallback_candidates")]
    pub max_fallback_candidates: usize,

    /// Namespace / alias prefix -> directory mappings
    #[serde(default)]
    pub path_aliases: Vec<PathAlias>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            respect_file_boundaries: default_respect_file_boundaries(),
            filter_cross_language: default_filter_cross_language(),
            external_namespaces: default_external_namespaces(),
            max_fallback_candidates: default_max_fallback_candidates(),
            path_aliases: Vec::new(),
        }
    }
}

impl ResolutionConfig {
    /// Namespace resolver built from the configured path aliases
    pub fn namespace_resolver(&self) -> PathAliasResolver {
        PathAliasResolver::new(self.path_aliases.iter().cloned())
    }
}

/// Graph query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Depth limit for call-chain enumeration
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,

    /// Upper bound on enumerated call chains
    #[serde(default = "default_max_call_chains")]
    pub max_call_chains: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
            max_call_chains: default_max_call_chains(),
        }
    }
}

/// Main configuration structure for depgraph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolution configuration
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.resolution.max_fallback_candidates == 0 {
            return Err(Error::config(
                "resolution.max_fallback_candidates must be greater than 0".to_string(),
            ));
        }
        if self.resolution.max_fallback_candidates > 10_000 {
            return Err(Error::config(format!(
                "resolution.max_fallback_candidates too large (max 10000, got {})",
                self.resolution.max_fallback_candidates
            )));
        }

        for alias in &self.resolution.path_aliases {
            if alias.prefix.is_empty() {
                return Err(Error::config(
                    "resolution.path_aliases prefix cannot be empty".to_string(),
                ));
            }
            if alias.directory.is_empty() {
                return Err(Error::config(format!(
                    "resolution.path_aliases directory for prefix '{}' cannot be empty",
                    alias.prefix
                )));
            }
        }

        if self.query.max_call_depth == 0 {
            return Err(Error::config(
                "query.max_call_depth must be greater than 0".to_string(),
            ));
        }
        if self.query.max_call_depth > 4096 {
            return Err(Error::config(format!(
                "query.max_call_depth too large (max 4096, got {})",
                self.query.max_call_depth
            )));
        }
        if self.query.max_call_chains == 0 {
            return Err(Error::config(
                "query.max_call_chains must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file, creating missing parent
    /// directories (`~/.depgraph` on first use)
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string)
            .context(format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }
}
