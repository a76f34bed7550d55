//! Web tier configuration.
//!
//! # Responsibility
//! - Load `WebConfig` from an optional TOML file.
//! - Apply `PARCINFO_*` environment overrides on top of the file values.
//!
//! # Invariants
//! - Missing file sections fall back to defaults; unknown keys are rejected.
//! - `bind_addr` always parses as a socket address once loaded.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8081";
pub const DEFAULT_DB_PATH: &str = "parcinfo.sqlite3";

pub const ENV_DB_PATH: &str = "PARCINFO_DB_PATH";
pub const ENV_BIND_ADDR: &str = "PARCINFO_BIND_ADDR";
pub const ENV_LOG_LEVEL: &str = "PARCINFO_LOG_LEVEL";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidBindAddr(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidBindAddr(value) => write!(f, "invalid bind address `{value}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidBindAddr(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `None` means the build-mode default.
    pub level: Option<String>,
    /// Absolute directory for rolling log files.
    pub dir: Option<PathBuf>,
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            logging: LoggingConfig::default(),
        }
    }
}

impl WebConfig {
    /// Reads `path` when given, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.socket_addr()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.socket_addr()?;
        Ok(config)
    }

    /// Overrides fields from `lookup`; blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(db_path) = value(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(bind_addr) = value(ENV_BIND_ADDR) {
            self.bind_addr = bind_addr;
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            self.logging.level = Some(level);
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.bind_addr.clone()))
    }
}
