//! Relay configuration.
//!
//! Configuration is a YAML file loaded once at process start; there is no
//! runtime reconfiguration. The file shape is:
//!
//! ```yaml
//! app:
//!   title: "Cursor Relay"
//!   port: 8080
//! ```
//!
//! Both fields are optional and fall back to the defaults above, so an empty
//! `app:` section (or a file containing only `app: {}`) is valid.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the configuration file.
///
/// Both variants are fatal at startup: the process must not begin serving
/// connections with a half-loaded configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// All runtime configuration for the relay.
///
/// Build this once at startup and pass it by reference into the serving
/// layer; nothing reads configuration through ambient globals.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
}

/// The `app:` section of the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Display title injected into the entry page.
    pub title: String,

    /// TCP port the HTTP/WebSocket listener binds to.
    pub port: u16,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            title: "Cursor Relay".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from a YAML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not well-formed YAML of the expected
    /// shape.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
