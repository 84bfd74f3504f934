// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid log type: {0}")]
    InvalidLogType(String),

    #[error("Invalid name: {0:?} normalizes to an empty identifier")]
    EmptyName(String),

    #[error("Job {job} does not belong to process {process}")]
    ForeignJob { process: String, job: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
