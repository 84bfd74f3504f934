// Process / Job Domain Model

use serde::{Deserialize, Serialize};

/// Record ID (UUID v4)
pub type EntityId = String;

/// Process: root of the hierarchy, one row per distinct normalized name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: EntityId,
    pub name: String,
    pub created_at: i64, // epoch ms
    pub updated_at: i64, // epoch ms
}

impl Process {
    /// Create a new process record
    ///
    /// `name` must already be normalized; ID and timestamp are injected.
    pub fn new(id: impl Into<String>, name: impl Into<String>, now_millis: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now_millis,
            updated_at: now_millis,
        }
    }
}

/// Job: named sub-unit owned by exactly one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: EntityId,
    pub process: EntityId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        process: &Process,
        name: impl Into<String>,
        now_millis: i64,
    ) -> Self {
        Self {
            id: id.into(),
            process: process.id.clone(),
            name: name.into(),
            created_at: now_millis,
            updated_at: now_millis,
        }
    }

    pub fn belongs_to(&self, process: &Process) -> bool {
        self.process == process.id
    }
}
