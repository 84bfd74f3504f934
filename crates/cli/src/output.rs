//! Table rendering for command output

use colored::Colorize;
use recall_core::domain::{CacheEntry, Job, LogEntry, LogType, Process};
use std::collections::HashMap;
use tabled::{Table, Tabled};

pub fn format_millis(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn colored_type(log_type: LogType) -> String {
    match log_type {
        LogType::Generic => log_type.as_str().normal().to_string(),
        LogType::Warning => log_type.as_str().yellow().to_string(),
        LogType::Error => log_type.as_str().red().bold().to_string(),
    }
}

#[derive(Tabled)]
struct LogRow {
    time: String,
    job: String,
    machine: String,
    #[tabled(rename = "type")]
    log_type: String,
    message: String,
}

/// `job_names` maps job id -> job name; unknown ids are shown raw
pub fn log_table(logs: &[LogEntry], job_names: &HashMap<String, String>) -> String {
    let rows = logs.iter().map(|l| LogRow {
        time: format_millis(l.created_at),
        job: job_names.get(&l.job).cloned().unwrap_or_else(|| l.job.clone()),
        machine: l.machine.clone(),
        log_type: colored_type(l.log_type),
        message: l.message.clone(),
    });
    Table::new(rows).to_string()
}

#[derive(Tabled)]
struct CacheRow {
    time: String,
    key: String,
    value: String,
}

pub fn cache_table(entries: &[CacheEntry]) -> String {
    let rows = entries.iter().map(|c| CacheRow {
        time: format_millis(c.created_at),
        key: c.key.clone(),
        value: c.value.clone(),
    });
    Table::new(rows).to_string()
}

#[derive(Tabled)]
struct NamedRow {
    name: String,
    id: String,
    created: String,
}

pub fn process_table(processes: &[Process]) -> String {
    let rows = processes.iter().map(|p| NamedRow {
        name: p.name.clone(),
        id: p.id.clone(),
        created: format_millis(p.created_at),
    });
    Table::new(rows).to_string()
}

pub fn job_table(jobs: &[Job]) -> String {
    let rows = jobs.iter().map(|j| NamedRow {
        name: j.name.clone(),
        id: j.id.clone(),
        created: format_millis(j.created_at),
    });
    Table::new(rows).to_string()
}
