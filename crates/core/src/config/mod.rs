//! Configuration module for the index janitor
//!
//! Configuration can be loaded from TOML files and/or environment variables.
//! The MongoDB URI is the only setting without a usable default.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.index-janitor/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".index-janitor").join("config.toml"))
}

/// Main configuration structure for the index janitor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub mongodb: MongoConfig,

    /// Janitor run configuration
    #[serde(default)]
    pub janitor: JanitorConfig,
}

/// MongoDB connection settings
#[derive(Clone, Deserialize)]
pub struct MongoConfig {
    /// Connection string, `mongodb://` or `mongodb+srv://`
    #[serde(default)]
    pub uri: String,

    /// Database name; falls back to the default database in the URI
    #[serde(default)]
    pub database: Option<String>,

    /// Upper bound on server selection while connecting
    #[serde(default = "default_server_selection_timeout_ms")]
    pub server_selection_timeout_ms: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: None,
            server_selection_timeout_ms: default_server_selection_timeout_ms(),
        }
    }
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("uri", &self.redacted_uri())
            .field("database", &self.database)
            .field(
                "server_selection_timeout_ms",
                &self.server_selection_timeout_ms,
            )
            .finish()
    }
}

impl MongoConfig {
    /// Explicitly configured database name, ignoring an empty value
    ///
    /// When absent, the adapter uses the default database from the URI.
    pub fn explicit_database(&self) -> Option<&str> {
        self.database.as_deref().filter(|n| !n.is_empty())
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }

    /// URI with any credentials masked, safe for logs
    pub fn redacted_uri(&self) -> String {
        let Some((scheme, rest)) = self.uri.split_once("://") else {
            return self.uri.clone();
        };
        let authority_end = rest.find('/').unwrap_or(rest.len());
        match rest[..authority_end].rfind('@') {
            Some(at) => format!("{scheme}://***REDACTED***{}", &rest[at..]),
            None => self.uri.clone(),
        }
    }
}

/// Settings for a single janitor run
#[derive(Debug, Clone, Deserialize)]
pub struct JanitorConfig {
    /// Collections to clean, in the order they are processed and logged
    #[serde(default = "default_collections")]
    pub collections: Vec<String>,

    /// Bound on each database call made for a collection; 0 disables it
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,

    /// Report what would be dropped without dropping anything
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            collections: default_collections(),
            operation_timeout_secs: default_operation_timeout_secs(),
            dry_run: false,
        }
    }
}

impl JanitorConfig {
    pub fn operation_timeout(&self) -> Option<Duration> {
        (self.operation_timeout_secs > 0).then_some(Duration::from_secs(self.operation_timeout_secs))
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let uri = self.mongodb.uri.trim();
        if uri.is_empty() {
            return Err(Error::config(
                "MongoDB URI is required (set MONGODB_URI or mongodb.uri)".to_string(),
            ));
        }
        if !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")) {
            return Err(Error::config(format!(
                "Invalid MongoDB URI '{}': must start with mongodb:// or mongodb+srv://",
                self.mongodb.redacted_uri()
            )));
        }

        if self.mongodb.server_selection_timeout_ms == 0 {
            return Err(Error::config(
                "server_selection_timeout_ms must be greater than 0".to_string(),
            ));
        }

        validate_collections(&self.janitor.collections)
    }
}

/// Collection names must be usable as-is against the server
fn validate_collections(collections: &[String]) -> Result<()> {
    if collections.is_empty() {
        return Err(Error::config(
            "At least one collection must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for name in collections {
        if name.is_empty() {
            return Err(Error::config("Collection name cannot be empty".to_string()));
        }
        if name.contains('$') || name.contains('\0') {
            return Err(Error::config(format!(
                "Invalid collection name '{name}': '$' and NUL are not allowed"
            )));
        }
        if name.starts_with("system.") {
            return Err(Error::config(format!(
                "Refusing to touch system collection '{name}'"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::config(format!(
                "Collection '{name}' is listed more than once"
            )));
        }
    }
    Ok(())
}
