// In-memory hierarchy index
// Process-local, unbounded and never evicted. Owned by one HierarchyManager.

use crate::domain::{EntityId, Job, Process};
use std::collections::HashMap;

/// Lookup tables for already-observed processes and jobs
///
/// Keys are normalized names. Entries are only ever added from rows that
/// were read from or written to storage, so the index cannot diverge from
/// storage for anything it holds.
#[derive(Debug, Default, Clone)]
pub struct HierarchyIndex {
    processes: HashMap<String, Process>,
    jobs: HashMap<EntityId, HashMap<String, Job>>,
}

impl HierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.get(name)
    }

    pub fn job(&self, process_id: &EntityId, name: &str) -> Option<&Job> {
        self.jobs.get(process_id).and_then(|jobs| jobs.get(name))
    }

    pub fn insert_process(&mut self, process: Process) {
        self.processes.insert(process.name.clone(), process);
    }

    /// Index a job together with its owning process
    pub fn insert_job(&mut self, process: &Process, job: Job) {
        if !self.processes.contains_key(&process.name) {
            self.insert_process(process.clone());
        }
        self.jobs
            .entry(job.process.clone())
            .or_default()
            .insert(job.name.clone(), job);
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.values().map(HashMap::len).sum()
    }
}
