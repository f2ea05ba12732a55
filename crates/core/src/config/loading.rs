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
    /// Environment variables are prefixed with `INDEX_JANITOR_` and use double
    /// underscores for nested values. For example:
    /// - `INDEX_JANITOR_MONGODB__URI=mongodb://localhost:27017/shop`
    /// - `INDEX_JANITOR_JANITOR__COLLECTIONS=products,orders`
    ///
    /// `MONGODB_URI` and `MONGODB_DATABASE` are honoured as well and take
    /// precedence over everything else.
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        let builder = set_config_default(
            builder,
            "mongodb.server_selection_timeout_ms",
            default_server_selection_timeout_ms() as i64,
        )?;
        let mut builder = set_config_default(
            builder,
            "janitor.operation_timeout_secs",
            default_operation_timeout_secs() as i64,
        )?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("INDEX_JANITOR")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("janitor.collections")
                .try_parsing(true),
        );

        // Conventional variables shared with the application itself
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            builder = builder
                .set_override("mongodb.uri", uri)
                .map_err(|e| Error::config(format!("Failed to set MONGODB_URI: {e}")))?;
        }
        if let Ok(database) = std::env::var("MONGODB_DATABASE") {
            builder = builder
                .set_override("mongodb.database", database)
                .map_err(|e| Error::config(format!("Failed to set MONGODB_DATABASE: {e}")))?;
        }

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

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.index-janitor/config.toml or custom --config path)
    /// 3. Environment variables (INDEX_JANITOR_*)
    /// 4. MONGODB_URI / MONGODB_DATABASE
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
