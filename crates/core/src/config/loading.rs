//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `DEPGRAPH_` and use double underscores
    /// for nested values. For example:
    /// - `DEPGRAPH_RESOLUTION__RESPECT_FILE_BOUNDARIES=false`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for keys overridden piecemeal by env vars
        let builder = set_config_default(
            builder,
            "resolution.respect_file_boundaries",
            default_respect_file_boundaries(),
        )?;
        let builder = set_config_default(
            builder,
            "resolution.filter_cross_language",
            default_filter_cross_language(),
        )?;
        let builder = set_config_default(
            builder,
            "resolution.external_namespaces",
            default_external_namespaces(),
        )?;
        let builder = set_config_default(
            builder,
            "resolution.max_fallback_candidates",
            default_max_fallback_candidates() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "query.max_call_depth",
            default_max_call_depth() as i64,
        )?;
        let mut builder = set_config_default(
            builder,
            "query.max_call_chains",
            default_max_call_chains() as i64,
        )?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(DEFAULT_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.depgraph/config.toml or custom --config path)
    /// 3. Environment variables (DEPGRAPH_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        let config = Self::from_file(&path)?;
        config.validate()?;
        Ok(config)
    }
}
