use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::HirewireError;

/// IANA zone used when the config does not name one. All wall-clock
/// decisions (today, job fire times, retention cutoffs) go through it.
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

/// Top-level config (hirewire.toml + HIREWIRE_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HirewireConfig {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// IANA time zone name, e.g. "Europe/Paris".
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Discord connection settings. `bot_token` and `channel_id` have no
/// defaults: startup fails when either is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    /// Channel that receives reminders, rankings and announcements.
    pub channel_id: u64,
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Local fire times for the two recurring jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_reminder_hour")]
    pub reminder_hour: u32,
    #[serde(default)]
    pub reminder_minute: u32,
    /// The ranking job polls every day at this time and only posts on
    /// Sunday.
    #[serde(default = "default_ranking_hour")]
    pub ranking_hour: u32,
    #[serde(default)]
    pub ranking_minute: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            reminder_hour: default_reminder_hour(),
            reminder_minute: 0,
            ranking_hour: default_ranking_hour(),
            ranking_minute: 0,
        }
    }
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_prefix() -> String {
    "!".to_string()
}
fn default_reminder_hour() -> u32 {
    8
}
fn default_ranking_hour() -> u32 {
    20
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.hirewire/interviews.db", home)
}

impl HirewireConfig {
    /// Load config from a TOML file with HIREWIRE_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.hirewire/hirewire.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: HirewireConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("HIREWIRE_").split("_"))
            .extract()
            .map_err(|e| HirewireError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Parse the configured zone name.
    pub fn tz(&self) -> crate::error::Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| HirewireError::Timezone(self.timezone.clone()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.hirewire/hirewire.toml", home)
}
