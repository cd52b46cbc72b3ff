//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    /// Directory cache backend; the in-memory cache is used when absent
    pub redis: Option<RedisConfig>,
    pub satori: SatoriConfig,
    pub waifu: WaifuConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Satori messaging host connection
#[derive(Debug, Clone, Deserialize)]
pub struct SatoriConfig {
    /// Base URL, e.g. `http://127.0.0.1:5140`
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_satori_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

impl SatoriConfig {
    /// HTTP API base, e.g. `http://host/v1`
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("{}/v1", self.endpoint.trim_end_matches('/'))
    }

    /// WebSocket event endpoint, e.g. `ws://host/v1/events`
    #[must_use]
    pub fn events_url(&self) -> String {
        let base = self.api_base();
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base
        };
        format!("{base}/events")
    }
}

/// A permanently excluded user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExcludedUser {
    /// `platform:userId`, or a bare user id matching on every platform
    pub uid: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl ExcludedUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            note: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check if this exclusion names the given user
    #[must_use]
    pub fn matches(&self, platform: &str, user_id: &str) -> bool {
        match self.uid.split_once(':') {
            Some((p, id)) => p == platform && id == user_id,
            None => self.uid == user_id,
        }
    }
}

/// Wall-clock time of the daily relationship reset (local time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResetTime {
    pub hour: u32,
    pub minute: u32,
}

impl Default for ResetTime {
    fn default() -> Self {
        Self { hour: 4, minute: 0 }
    }
}

impl fmt::Display for ResetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ResetTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue("WAIFU_RESET_TIME", s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

/// Pairing behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct WaifuConfig {
    /// Never hand out a member who is already someone's partner today
    #[serde(default)]
    pub avoid_ntr: bool,
    /// Only pair with members who spoke within `active_days`
    #[serde(default)]
    pub only_active_user: bool,
    #[serde(default = "default_active_days")]
    pub active_days: u32,
    /// Register the `force-marry` command
    #[serde(default)]
    pub force_marry: bool,
    #[serde(default = "default_exclude_users")]
    pub exclude_users: Vec<ExcludedUser>,
    #[serde(default)]
    pub reset_time: ResetTime,
    /// Prefix required before command names (empty means none)
    #[serde(default)]
    pub command_prefix: String,
}

impl Default for WaifuConfig {
    fn default() -> Self {
        Self {
            avoid_ntr: false,
            only_active_user: false,
            active_days: default_active_days(),
            force_marry: false,
            exclude_users: default_exclude_users(),
            reset_time: ResetTime::default(),
            command_prefix: String::new(),
        }
    }
}

impl WaifuConfig {
    /// Check if a user is on the permanent exclusion list
    #[must_use]
    pub fn is_excluded(&self, platform: &str, user_id: &str) -> bool {
        self.exclude_users
            .iter()
            .any(|ex| ex.matches(platform, user_id))
    }

    /// Lifetime of an active-member marker, in seconds
    ///
    /// A zero window counts as one day.
    #[must_use]
    pub fn active_ttl_secs(&self) -> u64 {
        u64::from(self.active_days.max(1)) * 24 * 60 * 60
    }
}

// Default value functions
fn default_app_name() -> String {
    "waifu-bot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_satori_timeout() -> u64 {
    30
}

fn default_reconnect_delay() -> u64 {
    5000
}

fn default_active_days() -> u32 {
    7
}

fn default_exclude_users() -> Vec<ExcludedUser> {
    vec![ExcludedUser::new("red:2854196310").with_note("Q群管家")]
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue(name, value.to_string())),
    }
}

/// Active window in whole days, at least one
fn parse_active_days(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(ConfigError::InvalidValue("WAIFU_ACTIVE_DAYS", value.to_string())),
    }
}

fn env_flag(name: &'static str) -> Result<bool, ConfigError> {
    env::var(name).map_or(Ok(false), |v| parse_flag(name, &v))
}

/// Parse the exclusion list: a JSON array of `{uid, note}` objects, or
/// comma-separated `uid[=note]` entries.
fn parse_exclude_users(value: &str) -> Result<Vec<ExcludedUser>, ConfigError> {
    let value = value.trim();
    if value.starts_with('[') {
        return serde_json::from_str(value)
            .map_err(|e| ConfigError::InvalidValue("WAIFU_EXCLUDE_USERS", e.to_string()));
    }

    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((uid, note)) => ExcludedUser::new(uid.trim()).with_note(note.trim()),
            None => ExcludedUser::new(entry),
        })
        .collect())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            redis: env::var("REDIS_URL").ok().map(|url| RedisConfig {
                url,
                max_connections: env::var("REDIS_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_redis_max_connections),
            }),
            satori: SatoriConfig {
                endpoint: env::var("SATORI_ENDPOINT")
                    .map_err(|_| ConfigError::MissingVar("SATORI_ENDPOINT"))?,
                token: env::var("SATORI_TOKEN").ok().filter(|t| !t.is_empty()),
                timeout_secs: env::var("SATORI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_satori_timeout),
                reconnect_delay_ms: env::var("SATORI_RECONNECT_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_reconnect_delay),
            },
            waifu: WaifuConfig {
                avoid_ntr: env_flag("WAIFU_AVOID_NTR")?,
                only_active_user: env_flag("WAIFU_ONLY_ACTIVE_USER")?,
                active_days: match env::var("WAIFU_ACTIVE_DAYS") {
                    Ok(v) => parse_active_days(&v)?,
                    Err(_) => default_active_days(),
                },
                force_marry: env_flag("WAIFU_FORCE_MARRY")?,
                exclude_users: match env::var("WAIFU_EXCLUDE_USERS") {
                    Ok(v) => parse_exclude_users(&v)?,
                    Err(_) => default_exclude_users(),
                },
                reset_time: match env::var("WAIFU_RESET_TIME") {
                    Ok(v) => v.parse()?,
                    Err(_) => ResetTime::default(),
                },
                command_prefix: env::var("WAIFU_COMMAND_PREFIX").unwrap_or_default(),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
