// Machine Identity Port
// reason: logs and cache entries are scoped to the executing host

/// Resolves the identifier of the executing host/instance
pub trait MachineIdentity: Send + Sync {
    fn machine_id(&self) -> String;
}

/// Fixed identifier (from configuration, or for tests)
#[derive(Debug, Clone)]
pub struct StaticMachineIdentity(String);

impl StaticMachineIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl MachineIdentity for StaticMachineIdentity {
    fn machine_id(&self) -> String {
        self.0.clone()
    }
}
