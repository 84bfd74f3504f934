// Recall Infrastructure - System Adapters
// Implements: MachineIdentity

pub mod hostname_identity;

pub use hostname_identity::{machine_identity, HostnameIdentity, UNKNOWN_MACHINE};
