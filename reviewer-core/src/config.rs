//! Configuration management for the reviewer service
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVIEWER_*)
//! 3. Config file (~/.config/reviewer/config.toml)
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reviewer assignment policy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Upper bound on reviewers chosen for a new pull request
    pub max_reviewers_per_pr: usize,

    /// A new pull request is flagged as needing more reviewers when it
    /// gets fewer than this many
    pub needs_more_reviewers_threshold: usize,

    /// Deadline applied to every create, merge and reassign call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            max_reviewers_per_pr: 2,
            needs_more_reviewers_threshold: 1,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite file; `None` means the platform cache directory
    pub path: Option<PathBuf>,

    pub max_connections: u32,

    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(feature = "database")]
impl DatabaseSettings {
    /// Configured path, or [`reviewer_db::DatabaseConfig::default_path`]
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(reviewer_db::DatabaseConfig::default_path)
    }

    /// Connection settings for [`reviewer_db::Database::connect`]
    pub fn to_db_config(&self) -> reviewer_db::DatabaseConfig {
        reviewer_db::DatabaseConfig::new(self.resolved_path())
            .with_max_connections(self.max_connections)
            .with_busy_timeout(self.busy_timeout)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Administrative access
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret required by mutating endpoints
    pub token: Option<String>,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!("Unknown log format: {}", other))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub assignment: AssignmentConfig,
    pub database: DatabaseSettings,
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub log: LogConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_path: Option<PathBuf>,
    pub max_reviewers: Option<usize>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub admin_token: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/reviewer/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reviewer").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVIEWER_DATABASE: Path to the SQLite file
    /// - REVIEWER_MAX_REVIEWERS: Reviewers per pull request
    /// - REVIEWER_REQUEST_TIMEOUT: Per-call deadline (e.g. `5s`)
    /// - REVIEWER_HOST / REVIEWER_PORT: HTTP listener
    /// - REVIEWER_ADMIN_TOKEN: Shared admin secret
    /// - REVIEWER_LOG_FORMAT: `pretty`, `compact` or `json`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = var("REVIEWER_DATABASE") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = var("REVIEWER_MAX_REVIEWERS") {
            self.assignment.max_reviewers_per_pr = max.parse().map_err(|e| {
                Error::Config(format!("Invalid REVIEWER_MAX_REVIEWERS {:?}: {}", max, e))
            })?;
        }

        if let Some(timeout) = var("REVIEWER_REQUEST_TIMEOUT") {
            self.assignment.request_timeout = humantime_serde::re::humantime::parse_duration(
                &timeout,
            )
            .map_err(|e| {
                Error::Config(format!(
                    "Invalid REVIEWER_REQUEST_TIMEOUT {:?}: {}",
                    timeout, e
                ))
            })?;
        }

        if let Some(host) = var("REVIEWER_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("REVIEWER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid REVIEWER_PORT {:?}: {}", port, e)))?;
        }

        if let Some(token) = var("REVIEWER_ADMIN_TOKEN") {
            self.admin.token = Some(token);
        }

        if let Some(format) = var("REVIEWER_LOG_FORMAT") {
            self.log.format = format.parse()?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(path) = overrides.database_path {
            self.database.path = Some(path);
        }

        if let Some(max) = overrides.max_reviewers {
            self.assignment.max_reviewers_per_pr = max;
        }

        if let Some(host) = overrides.host {
            self.server.host = host;
        }

        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(token) = overrides.admin_token {
            self.admin.token = Some(token);
        }

        self
    }

    /// Check values that the rest of the system relies on
    pub fn validate(&self) -> Result<()> {
        if self.assignment.max_reviewers_per_pr == 0 {
            return Err(Error::Config(
                "assignment.max_reviewers_per_pr must be at least 1".to_string(),
            ));
        }

        if self.assignment.request_timeout.is_zero() {
            return Err(Error::Config(
                "assignment.request_timeout must be greater than zero".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit
    /// `config_path` must exist.
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        overrides: CliOverrides,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        let config = base.with_env_overrides()?.with_cli_overrides(overrides);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.assignment.max_reviewers_per_pr, 2);
        assert_eq!(config.assignment.needs_more_reviewers_threshold, 1);
        assert_eq!(config.assignment.request_timeout, Duration::from_secs(10));
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert!(config.admin.token.is_none());
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "database")]
    #[test]
    fn test_database_settings_to_db_config() {
        let settings = DatabaseSettings::default();
        assert_eq!(
            settings.resolved_path(),
            reviewer_db::DatabaseConfig::default_path()
        );

        let settings = DatabaseSettings {
            path: Some(PathBuf::from("/tmp/r.db")),
            max_connections: 2,
            busy_timeout: Duration::from_millis(300),
        };
        let db_config = settings.to_db_config();
        assert_eq!(db_config.path, PathBuf::from("/tmp/r.db"));
        assert_eq!(db_config.max_connections, 2);
        assert_eq!(db_config.busy_timeout, Duration::from_millis(300));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[assignment]
max_reviewers_per_pr = 3
needs_more_reviewers_threshold = 2
request_timeout = "750ms"

[database]
path = "/var/lib/reviewer/reviewer.db"
busy_timeout = "2s"

[server]
port = 9090

[admin]
token = "s3cret"

[log]
format = "json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.assignment.max_reviewers_per_pr, 3);
        assert_eq!(config.assignment.needs_more_reviewers_threshold, 2);
        assert_eq!(config.assignment.request_timeout, Duration::from_millis(750));
        assert_eq!(
            config.database.path,
            Some(PathBuf::from("/var/lib/reviewer/reviewer.db"))
        );
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout, Duration::from_secs(2));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.admin.token.as_deref(), Some("s3cret"));
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[server]
host = "127.0.0.1"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // everything else falls back to defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.assignment, AssignmentConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REVIEWER_MAX_REVIEWERS", "4"),
            ("REVIEWER_REQUEST_TIMEOUT", "3s"),
            ("REVIEWER_PORT", "3000"),
            ("REVIEWER_ADMIN_TOKEN", "from-env"),
            ("REVIEWER_LOG_FORMAT", "Compact"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.assignment.max_reviewers_per_pr, 4);
        assert_eq!(config.assignment.request_timeout, Duration::from_secs(3));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.admin.token.as_deref(), Some("from-env"));
        assert_eq!(config.log.format, LogFormat::Compact);
    }

    #[test]
    fn test_invalid_env_value() {
        let result = Config::default().with_overrides_from(|key| {
            (key == "REVIEWER_PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::default()
            .with_overrides_from(|key| (key == "REVIEWER_HOST").then(|| "10.0.0.1".to_string()))
            .unwrap()
            .with_cli_overrides(CliOverrides {
                database_path: Some(PathBuf::from("/tmp/r.db")),
                max_reviewers: Some(1),
                host: Some("127.0.0.1".to_string()),
                port: None,
                admin_token: Some("cli".to_string()),
            });

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.assignment.max_reviewers_per_pr, 1);
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/r.db")));
        assert_eq!(config.admin.token.as_deref(), Some("cli"));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.assignment.max_reviewers_per_pr = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.assignment.request_timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[assignment]\nmax_reviewers_per_pr = 5\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.assignment.max_reviewers_per_pr, 5);

        std::fs::write(&path, "[assignment\n").unwrap();
        assert!(matches!(Config::load_from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_admin_token_is_redacted() {
        let admin = AdminConfig {
            token: Some("s3cret".to_string()),
        };
        assert!(!format!("{:?}", admin).contains("s3cret"));
    }
}
