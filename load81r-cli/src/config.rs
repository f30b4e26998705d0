//! Configuration loading for the load81r CLI.
//!
//! Configuration is loaded from a TOML file (default: `config.toml` in the
//! platform config directory). Every field is optional; command-line flags
//! override file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use load81r_client::{SessionConfig, DEFAULT_TIMEOUT};
use load81r_types::{CLIENT_VERSION, DEFAULT_PORT};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// Handshake settings.
    pub client: ClientConfig,
    /// Editor used by `edit`.
    pub editor: EditorConfig,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Device port (default: 1900).
    pub port: u16,
    /// Connect and I/O timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

/// Handshake configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Version string sent with `HELLO`.
    pub version: String,
}

/// Editor configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor command line, used when neither `$VISUAL` nor `$EDITOR` is set.
    pub command: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CLIENT_VERSION.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Build a session configuration, letting flags override file values.
    pub fn session(&self, host: &str, port: Option<u16>, timeout_secs: Option<u64>) -> SessionConfig {
        let timeout = timeout_secs.unwrap_or(self.connection.timeout_secs);
        SessionConfig::new(host, port.unwrap_or(self.connection.port))
            .with_timeout(Duration::from_secs(timeout.max(1)))
            .with_client_version(&self.client.version)
    }
}

/// Path of the default config file, if a home directory can be found.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "load81r", "load81r")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
