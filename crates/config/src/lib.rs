use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "huddle.toml",
    "config/huddle.toml",
    "crates/config/huddle.toml",
    "../huddle.toml",
    "../config/huddle.toml",
    "../crates/config/huddle.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub rooms: RoomsConfig,
    pub sessions: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://huddle.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomsConfig {
    /// How often the background sweeper removes expired rooms.
    #[serde(default = "RoomsConfig::default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Maximum chat messages retained per room.
    #[serde(default = "RoomsConfig::default_history_limit")]
    pub history_limit: i64,
    /// Retention of a room's chat history after the last message.
    #[serde(default = "RoomsConfig::default_history_ttl")]
    pub history_ttl_seconds: u64,
}

impl RoomsConfig {
    const fn default_sweep_interval() -> u64 {
        3600
    }

    const fn default_history_limit() -> i64 {
        500
    }

    const fn default_history_ttl() -> u64 {
        86_400
    }
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: Self::default_sweep_interval(),
            history_limit: Self::default_history_limit(),
            history_ttl_seconds: Self::default_history_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_ttl")]
    pub ttl_seconds: u64,
}

impl SessionConfig {
    const fn default_ttl() -> u64 {
        3600
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: Self::default_ttl(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use huddle_config::load;
///
/// std::env::remove_var("HUDDLE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(config.database.url.starts_with("sqlite"));
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default("redis.url", defaults.redis.url.clone())
        .unwrap()
        .set_default(
            "rooms.sweep_interval_seconds",
            i64::try_from(defaults.rooms.sweep_interval_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default("rooms.history_limit", defaults.rooms.history_limit)
        .unwrap()
        .set_default(
            "rooms.history_ttl_seconds",
            i64::try_from(defaults.rooms.history_ttl_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "sessions.ttl_seconds",
            i64::try_from(defaults.sessions.ttl_seconds).unwrap_or(i64::MAX),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("HUDDLE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("HUDDLE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via HUDDLE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
