//! Server configuration

use std::path::PathBuf;

use auth::{AuthCredentials, DEFAULT_SESSION_TTL_HOURS};
use serde::{Deserialize, Serialize};

/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_TTL_HOURS: u64 = 10 * 365 * 24;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "MEMORIES_CONFIG";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0:8080")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// SQLite database URL; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Directory uploaded photos are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Session lifetime in hours
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,

    /// Whether to enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (any origin when empty)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Login secrets
    #[serde(default)]
    pub auth: AuthCredentials,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_upload_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memories")
        .join("uploads")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_session_ttl_hours() -> u64 {
    DEFAULT_SESSION_TTL_HOURS
}

fn default_enable_cors() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_url: None,
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            session_ttl_hours: default_session_ttl_hours(),
            enable_cors: default_enable_cors(),
            cors_origins: Vec::new(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            auth: AuthCredentials::default(),
        }
    }
}

/// Splits a comma-separated list, dropping empty entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServerConfig {
    /// Load configuration from defaults, an optional config file, and the
    /// environment, in increasing order of precedence
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let mut config = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var("MEMORIES_BIND_ADDRESS") {
            self.bind_address = addr;
        }

        if let Some(url) = var("DATABASE_URL") {
            self.database_url = Some(url);
        }

        if let Some(dir) = var("MEMORIES_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }

        if let Some(bytes) = var("MEMORIES_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = bytes.parse().unwrap_or(self.max_upload_bytes);
        }

        if let Some(hours) = var("MEMORIES_SESSION_TTL_HOURS") {
            self.session_ttl_hours = hours.parse().unwrap_or(self.session_ttl_hours);
        }

        if let Some(val) = var("MEMORIES_ENABLE_CORS") {
            self.enable_cors = val.parse().unwrap_or(true);
        }

        if let Some(origins) = var("MEMORIES_CORS_ORIGINS") {
            self.cors_origins = split_list(&origins);
        }

        if let Some(level) = var("MEMORIES_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(format) = var("MEMORIES_LOG_FORMAT") {
            self.log_format = LogFormat::parse(&format).unwrap_or(self.log_format);
        }

        if let Some(admin_user) = var("MEMORIES_ADMIN_USER") {
            self.auth.admin_user = admin_user;
        }

        if let Some(password) = var("MEMORIES_PASSWORD") {
            self.auth.password = password;
        }

        if let Some(users) = var("MEMORIES_ALLOWED_USERS") {
            self.auth.allowed_users = split_list(&users);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        let locations = [
            PathBuf::from("memories-server.toml"),
            PathBuf::from("/etc/memories/server.toml"),
            dirs::config_dir()
                .map(|p| p.join("memories").join("server.toml"))
                .unwrap_or_default(),
        ];

        locations.into_iter().find(|p| p.exists())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.auth.is_complete() {
            return Err(ConfigError::MissingCredentials);
        }

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(ConfigError::Invalid(format!(
                "session_ttl_hours must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            )));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Admin user and password must both be configured")]
    MissingCredentials,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert!(config.database_url.is_none());
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config = ServerConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingCredentials)
        ));
    }

    #[test]
    fn test_session_ttl_bounds() {
        let mut config = ServerConfig::default();
        config.auth = AuthCredentials::new("admin@x.com", "secret");

        for hours in [0, MAX_SESSION_TTL_HOURS + 1, u64::MAX / 2] {
            config.session_ttl_hours = hours;
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "{hours}"
            );
        }

        config.session_ttl_hours = MAX_SESSION_TTL_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config.apply_env(env(&[
            ("MEMORIES_ADMIN_USER", "admin@x.com"),
            ("MEMORIES_PASSWORD", "secret"),
            ("MEMORIES_ALLOWED_USERS", "bob@x.com, carol@x.com,,"),
            ("MEMORIES_LOG_FORMAT", "JSON"),
            ("MEMORIES_SESSION_TTL_HOURS", "not-a-number"),
            ("DATABASE_URL", "sqlite:memories.db?mode=rwc"),
        ]));

        assert!(config.validate().is_ok());
        assert_eq!(config.auth.admin_user, "admin@x.com");
        assert_eq!(config.auth.allowed_users, ["bob@x.com", "carol@x.com"]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(
            config.database_url.as_deref(),
            Some("sqlite:memories.db?mode=rwc")
        );
    }

    #[test]
    fn test_toml_file_with_auth_section() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind_address = "127.0.0.1:9000"

            [auth]
            admin_user = "admin@x.com"
            password = "secret"
            allowed_users = ["bob@x.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.auth.allowed_users, ["bob@x.com"]);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_wins_over_file() {
        let mut config: ServerConfig = toml::from_str(
            r#"
            [auth]
            admin_user = "admin@x.com"
            password = "from-file"
            "#,
        )
        .unwrap();
        config.apply_env(env(&[("MEMORIES_PASSWORD", "from-env")]));

        assert_eq!(config.auth.password, "from-env");
    }
}
