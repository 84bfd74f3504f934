// Runtime configuration (environment driven)

use crate::error::{AppError, Result};
use std::str::FromStr;

pub const DEFAULT_DB_PATH: &str = "~/.recall/recall.db";
pub const ENV_DB_PATH: &str = "RECALL_DB_PATH";
pub const ENV_MACHINE_ID: &str = "RECALL_MACHINE_ID";
pub const ENV_LOG_FORMAT: &str = "RECALL_LOG_FORMAT";

/// Console log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "unknown log format '{}' (expected 'pretty' or 'json')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallConfig {
    /// SQLite path or URL; a leading `~` is expanded by the binary
    pub database_url: String,

    /// Explicit machine identifier; hostname is used when `None`
    pub machine_id: Option<String>,

    pub log_format: LogFormat,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DB_PATH.to_string(),
            machine_id: None,
            log_format: LogFormat::default(),
        }
    }
}

impl RecallConfig {
    /// Load from `RECALL_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup (testable without touching the process env)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let database_url = lookup(ENV_DB_PATH)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.database_url);

        let machine_id = lookup(ENV_MACHINE_ID)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            database_url,
            machine_id,
            log_format,
        })
    }
}
