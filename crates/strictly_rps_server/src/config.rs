//! Server configuration.
//!
//! Loaded from an optional TOML file. Every field has a default, so a
//! missing file or an empty one both give a working setup. The
//! `DATABASE_URL` environment variable overrides `database_url`.

use chrono::FixedOffset;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Team members seeded into the roster on first start.
pub const DEFAULT_ROSTER: [&str; 5] = ["이재호", "이정용", "이혜진", "김경모", "김기남"];

/// Configuration for the round ledger server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite database path (a `sqlite://` prefix is accepted).
    #[serde(default = "default_database_url")]
    database_url: String,

    /// Players inserted at startup if not already present.
    #[serde(default = "default_roster")]
    roster: Vec<String>,

    /// Create unknown players on submission instead of rejecting the round.
    #[serde(default = "default_auto_register")]
    auto_register_players: bool,

    /// Offset from UTC, in hours, used when presenting timestamps.
    #[serde(default = "default_utc_offset_hours")]
    utc_offset_hours: i32,

    /// Number of recent choices a player profile is computed over.
    #[serde(default = "default_history_window")]
    history_window: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "rps_game.db".to_string()
}

fn default_roster() -> Vec<String> {
    DEFAULT_ROSTER.iter().map(|s| s.to_string()).collect()
}

fn default_auto_register() -> bool {
    true
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_history_window() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            roster: default_roster(),
            auto_register_players: default_auto_register(),
            utc_offset_hours: default_utc_offset_hours(),
            history_window: default_history_window(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `path` if it exists, falling back to defaults, then
    /// applies the `DATABASE_URL` override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is invalid, or the
    /// override names an unsupported backend.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path.as_ref())?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            info!("DATABASE_URL set, overriding database_url");
            config.database_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks field ranges and the database URL scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid field.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(ConfigError::new(format!(
                "utc_offset_hours must be within -23..=23, got {}",
                self.utc_offset_hours
            )));
        }
        if self.history_window == 0 {
            return Err(ConfigError::new("history_window must be at least 1"));
        }
        if let Some(blank) = self.roster.iter().position(|n| n.trim().is_empty()) {
            return Err(ConfigError::new(format!("roster entry {} is blank", blank)));
        }
        self.database_path()?;
        Ok(())
    }

    /// The SQLite file path behind `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for PostgreSQL URLs, which this build does not support.
    #[instrument(skip(self), fields(url = %self.database_url))]
    pub fn database_path(&self) -> Result<String, ConfigError> {
        let url = self.database_url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            warn!("PostgreSQL URL configured");
            return Err(ConfigError::new(
                "PostgreSQL is not supported; set DATABASE_URL to a SQLite path",
            ));
        }
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        if path.is_empty() {
            return Err(ConfigError::new("database_url is empty"));
        }
        Ok(path.to_string())
    }

    /// The configured display offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the offset is out of range.
    #[instrument(skip(self))]
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            ConfigError::new(format!("Invalid UTC offset: {} hours", self.utc_offset_hours))
        })
    }

    /// Returns a copy with host and port replaced where given.
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Returns a copy pointing at a different database.
    pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = ServerConfig::from_toml("").expect("Parse failed");
        assert_eq!(config, ServerConfig::default());
        assert_eq!(*config.port(), 8000);
        assert_eq!(config.roster().len(), 5);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = ServerConfig::from_toml(
            r#"
            port = 9001
            roster = ["alice", "bob"]
            auto_register_players = false
            "#,
        )
        .expect("Parse failed");
        assert_eq!(*config.port(), 9001);
        assert_eq!(config.roster(), &vec!["alice".to_string(), "bob".to_string()]);
        assert!(!config.auto_register_players());
        assert_eq!(config.host(), "127.0.0.1");
    }

    #[test]
    fn test_sqlite_prefix_stripped() {
        let config = ServerConfig::default()
            .with_database_url(Some("sqlite://./data/rps.db".to_string()));
        assert_eq!(config.database_path().unwrap(), "./data/rps.db");
    }

    #[test]
    fn test_postgres_rejected() {
        let config = ServerConfig::default()
            .with_database_url(Some("postgres://user@host/db".to_string()));
        assert!(config.database_path().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let result = ServerConfig::from_toml("utc_offset_hours = 30");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = ServerConfig::from_toml("history_window = 0");
        assert!(result.unwrap_err().message.contains("history_window"));
    }

    #[test]
    fn test_blank_roster_name_rejected() {
        let result = ServerConfig::from_toml(r#"roster = ["alice", "  "]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_offset_is_plus_nine() {
        let offset = ServerConfig::default().utc_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 9 * 3600);
    }
}
