// Application Layer - Index, hierarchy resolution, machine-scoped entries, job lifecycle

pub mod hierarchy;
pub mod index;
pub mod job_facade;
pub mod machine_scope;

// Re-exports
pub use hierarchy::HierarchyManager;
pub use index::HierarchyIndex;
pub use job_facade::{CacheHooks, CacheTree, JobFacade, NoopHooks, SyncOnExist};
pub use machine_scope::MachineScopedAccessor;
