// Hostname-based machine identity
// reason: sysinfo for cross-platform host name lookup
use recall_core::port::machine_identity::{MachineIdentity, StaticMachineIdentity};
use sysinfo::System;
use tracing::{debug, warn};

/// Identifier used when the host name cannot be determined
pub const UNKNOWN_MACHINE: &str = "unknown";

/// Machine identity from the operating system's host name
///
/// The name is read once at construction.
#[derive(Debug, Clone)]
pub struct HostnameIdentity {
    hostname: String,
}

impl HostnameIdentity {
    pub fn new() -> Self {
        let hostname = System::host_name()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| {
                warn!("Host name unavailable, using '{}'", UNKNOWN_MACHINE);
                UNKNOWN_MACHINE.to_string()
            });

        debug!(hostname = %hostname, "Resolved machine identity");
        Self { hostname }
    }
}

impl Default for HostnameIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineIdentity for HostnameIdentity {
    fn machine_id(&self) -> String {
        self.hostname.clone()
    }
}

/// Explicit identifier if configured, otherwise the host name
pub fn machine_identity(configured: Option<&str>) -> Box<dyn MachineIdentity> {
    match configured.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => Box::new(StaticMachineIdentity::new(id)),
        None => Box::new(HostnameIdentity::new()),
    }
}
