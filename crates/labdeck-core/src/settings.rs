//! Runtime settings for the labdeck backend.
//!
//! Loaded from `labdeck.toml` (optional) with `LABDECK__` environment
//! variables taking precedence, e.g. `LABDECK__BIND`,
//! `LABDECK__SCHEDULE__INTERVAL_MIN`.

use serde::Deserialize;

use crate::types::ScheduleState;

/// Top-level backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Static key accepted via the `X-API-KEY` header. Authentication
    /// is disabled when neither this nor `bearer_token` is set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Token accepted via `Authorization: Bearer`.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Root directory for the live document, backups, and the
    /// discovery cache.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// How many timestamped backups to retain.
    #[serde(default = "default_backup_keep")]
    pub backup_keep: usize,

    /// Path to the nmap binary.
    #[serde(default = "default_nmap_path")]
    pub nmap_path: String,

    /// Startup-time recurring scan configuration.
    #[serde(default)]
    pub schedule: ScheduleState,
}

impl Settings {
    /// Load settings from `<file_prefix>.toml` (if present) and
    /// `LABDECK__*` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("LABDECK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        cfg.try_deserialize()
    }
}

fn default_bind() -> String {
    "0.0.0.0:8700".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_backup_keep() -> usize {
    20
}

fn default_nmap_path() -> String {
    "nmap".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_key: None,
            bearer_token: None,
            data_dir: default_data_dir(),
            backup_keep: default_backup_keep(),
            nmap_path: default_nmap_path(),
            schedule: ScheduleState::default(),
        }
    }
}
