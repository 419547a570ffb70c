use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Upper bound for `search.recent_days` (about a century).
pub const MAX_RECENT_DAYS: i64 = 36_500;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContextRecordConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub recording: RecordingConfig,
    pub search: SearchConfig,
    pub events: EventsConfig,
    /// Diagnostics gathered while loading, logged once tracing is up.
    #[serde(skip)]
    pub notices: Vec<ConfigNotice>,
}

/// Something worth reporting about how the config was loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNotice {
    MissingFile(PathBuf),
    InvalidPort(String),
    Clamped {
        field: &'static str,
        from: String,
        to: String,
    },
}

impl ConfigNotice {
    pub fn log(&self) {
        match self {
            ConfigNotice::MissingFile(path) => {
                info!("no config file at {}, using defaults", path.display())
            }
            ConfigNotice::InvalidPort(value) => {
                warn!(value = %value, "ignoring invalid CONTEXTRECORD_PORT")
            }
            ConfigNotice::Clamped { field, from, to } => {
                warn!(field, from = %from, to = %to, "config value out of range, clamped")
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RecordingConfig {
    /// Session used when a tool call omits `session_id`.
    pub default_session: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Window for the `recent_week_count` statistic.
    pub recent_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EventsConfig {
    pub keep_alive_secs: u64,
}

impl Default for ContextRecordConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            recording: RecordingConfig::default(),
            search: SearchConfig::default(),
            events: EventsConfig::default(),
            notices: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_data_dir()
            .join("conversations.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            default_session: "default".into(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            recent_days: 7,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { keep_alive_secs: 15 }
    }
}

/// Returns `~/.contextrecord/`, or `./.contextrecord` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".contextrecord")
}

/// Returns the default config file path: `~/.contextrecord/config.toml`
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

impl ContextRecordConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides and clamp
    /// out-of-range values. Anything worth reporting lands in `notices`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            let mut config = ContextRecordConfig::default();
            config.notices.push(ConfigNotice::MissingFile(path.to_path_buf()));
            config
        };

        config.apply_env_overrides();
        config.normalize();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `CONTEXTRECORD_DB`, `CONTEXTRECORD_LOG_LEVEL`, `CONTEXTRECORD_HOST`, `CONTEXTRECORD_PORT`.
    /// An unparsable port is ignored and noted.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CONTEXTRECORD_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("CONTEXTRECORD_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("CONTEXTRECORD_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("CONTEXTRECORD_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => self.notices.push(ConfigNotice::InvalidPort(val)),
            }
        }
    }

    /// Pull `search.recent_days` into `1..=MAX_RECENT_DAYS` and keep the
    /// event keep-alive at one second or more.
    fn normalize(&mut self) {
        let days = self.search.recent_days.clamp(1, MAX_RECENT_DAYS);
        if days != self.search.recent_days {
            self.notices.push(ConfigNotice::Clamped {
                field: "search.recent_days",
                from: self.search.recent_days.to_string(),
                to: days.to_string(),
            });
            self.search.recent_days = days;
        }

        if self.events.keep_alive_secs == 0 {
            self.notices.push(ConfigNotice::Clamped {
                field: "events.keep_alive_secs",
                from: "0".into(),
                to: "1".into(),
            });
            self.events.keep_alive_secs = 1;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Clamp a caller-supplied result limit into `1..=search.max_limit`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.search.default_limit)
            .clamp(1, self.search.max_limit.max(1))
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ContextRecordConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.recording.default_session, "default");
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.search.recent_days, 7);
        assert!(config.storage.db_path.ends_with("conversations.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 9100

[storage]
db_path = "/tmp/test.db"

[recording]
default_session = "cli"
"#;
        let config: ContextRecordConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.recording.default_session, "cli");
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.search.max_limit, 100);
        assert_eq!(config.events.keep_alive_secs, 15);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ContextRecordConfig::default();
        std::env::set_var("CONTEXTRECORD_DB", "/tmp/override.db");
        std::env::set_var("CONTEXTRECORD_LOG_LEVEL", "trace");
        std::env::set_var("CONTEXTRECORD_PORT", "not-a-port");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.port, 8000);
        assert!(config
            .notices
            .contains(&ConfigNotice::InvalidPort("not-a-port".into())));

        // Clean up
        std::env::remove_var("CONTEXTRECORD_DB");
        std::env::remove_var("CONTEXTRECORD_LOG_LEVEL");
        std::env::remove_var("CONTEXTRECORD_PORT");
    }

    #[test]
    fn clamp_limit_bounds_requests() {
        let config = ContextRecordConfig::default();
        assert_eq!(config.clamp_limit(None), 10);
        assert_eq!(config.clamp_limit(Some(0)), 1);
        assert_eq!(config.clamp_limit(Some(5000)), 100);
        assert_eq!(config.clamp_limit(Some(25)), 25);
    }

    #[test]
    fn normalize_clamps_recent_days_and_keep_alive() {
        let mut config = ContextRecordConfig::default();
        config.search.recent_days = i64::MAX;
        config.events.keep_alive_secs = 0;
        config.normalize();
        assert_eq!(config.search.recent_days, MAX_RECENT_DAYS);
        assert_eq!(config.events.keep_alive_secs, 1);
        assert_eq!(config.notices.len(), 2);

        let mut config = ContextRecordConfig::default();
        config.search.recent_days = -3;
        config.normalize();
        assert_eq!(config.search.recent_days, 1);

        let mut config = ContextRecordConfig::default();
        config.normalize();
        assert_eq!(config.search.recent_days, 7);
        assert!(config.notices.is_empty());
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/db.sqlite"), PathBuf::from("/var/db.sqlite"));
    }
}
