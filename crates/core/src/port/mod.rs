// Port Layer - Interfaces for external dependencies

pub mod entry_repository;
pub mod id_provider; // For deterministic testing
pub mod machine_identity;
pub mod process_repository;
pub mod time_provider;

// Re-exports
pub use entry_repository::EntryRepository;
pub use id_provider::IdProvider;
pub use machine_identity::MachineIdentity;
pub use process_repository::ProcessRepository;
pub use time_provider::TimeProvider;
