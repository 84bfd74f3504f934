// Log / Cache Entry Domain Model
// Both record kinds are append-only: no update or delete path exists.

use super::error::DomainError;
use super::process::EntityId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Log severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    #[default]
    Generic,
    Warning,
    Error,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Generic => "GENERIC",
            LogType::Warning => "WARNING",
            LogType::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GENERIC" => Ok(LogType::Generic),
            "WARNING" | "WARN" => Ok(LogType::Warning),
            "ERROR" => Ok(LogType::Error),
            _ => Err(DomainError::InvalidLogType(s.to_string())),
        }
    }
}

/// Log Entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntityId,
    pub process: EntityId,
    pub job: EntityId,
    pub machine: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub message: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cache Entry (keys are not unique; every write is an append)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: EntityId,
    pub process: EntityId,
    pub job: EntityId,
    pub machine: String,
    pub key: String,
    pub value: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CacheEntry {
    /// Decode the stored text value as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.value)
    }
}

/// Optional pagination and type restriction for log listings.
/// `Default` applies no restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub log_type: Option<LogType>,
}

impl LogFilter {
    pub fn of_type(log_type: LogType) -> Self {
        Self {
            log_type: Some(log_type),
            ..Default::default()
        }
    }

    pub fn page(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            log_type: None,
        }
    }
}

/// Log listing query as seen by the storage port
///
/// `job == None` lists every job of the process. Listings span all machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub process: EntityId,
    pub job: Option<EntityId>,
    pub filter: LogFilter,
}

/// (process, job, machine) triple every cache read is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheScope {
    pub process: EntityId,
    pub job: EntityId,
    pub machine: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_type_round_trips_through_text() {
        for t in [LogType::Generic, LogType::Warning, LogType::Error] {
            assert_eq!(t.to_string().parse::<LogType>().unwrap(), t);
        }
    }

    #[test]
    fn test_log_type_parse_is_case_insensitive() {
        assert_eq!("warning".parse::<LogType>().unwrap(), LogType::Warning);
        assert_eq!(" Error ".parse::<LogType>().unwrap(), LogType::Error);
        assert_eq!("warn".parse::<LogType>().unwrap(), LogType::Warning);
    }

    #[test]
    fn test_log_type_rejects_unknown() {
        let err = "fatal".parse::<LogType>().unwrap_err();
        assert!(err.to_string().contains("fatal"));
    }

    #[test]
    fn test_default_filter_is_unrestricted() {
        let filter = LogFilter::default();
        assert!(filter.offset.is_none());
        assert!(filter.limit.is_none());
        assert!(filter.log_type.is_none());
    }

    #[test]
    fn test_cache_entry_json_value() {
        let entry = CacheEntry {
            id: "c1".to_string(),
            process: "p1".to_string(),
            job: "j1".to_string(),
            machine: "host".to_string(),
            key: "cursor".to_string(),
            value: r#"{"page": 3}"#.to_string(),
            created_at: 1000,
            updated_at: 1000,
        };

        let value: serde_json::Value = entry.json().unwrap();
        assert_eq!(value["page"], 3);
    }
}
