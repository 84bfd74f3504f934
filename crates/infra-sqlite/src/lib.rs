// Recall Infrastructure - SQLite Adapter
// Implements: ProcessRepository, EntryRepository, schema provisioning

mod connection;
mod entry_repository;
mod error;
mod migration;
mod process_repository;

pub use connection::create_pool;
pub use entry_repository::SqliteEntryRepository;
pub use migration::{current_schema_version, run_migrations, LATEST_SCHEMA_VERSION};
pub use process_repository::SqliteProcessRepository;

// Note: sqlx::Error conversion is handled by error::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
