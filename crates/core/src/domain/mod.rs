// Domain Layer - Pure records and naming rules

pub mod entry;
pub mod error;
pub mod name;
pub mod process;

// Re-exports
pub use entry::{CacheEntry, CacheScope, LogEntry, LogFilter, LogQuery, LogType};
pub use error::DomainError;
pub use name::normalize_name;
pub use process::{EntityId, Job, Process};
