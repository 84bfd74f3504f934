//! Recall CLI - schema sync utility and command-line access to job state

mod app;
mod logging;
mod output;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use colored::Colorize;
use recall_core::config::{
    LogFormat, RecallConfig, DEFAULT_DB_PATH, ENV_DB_PATH, ENV_LOG_FORMAT, ENV_MACHINE_ID,
};
use recall_core::domain::{Job, LogFilter, LogType, Process};
use recall_core::port::MachineIdentity;
use std::collections::HashMap;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Durable state, cache and logs for recurring jobs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database path or URL
    #[arg(long, global = true, env = ENV_DB_PATH, default_value = DEFAULT_DB_PATH)]
    db: String,

    /// Machine identifier (defaults to the host name)
    #[arg(long, global = true, env = ENV_MACHINE_ID)]
    machine: Option<String>,

    /// Log output format (pretty | json)
    #[arg(
        long,
        global = true,
        env = ENV_LOG_FORMAT,
        default_value = "pretty",
        value_parser = parse_log_format
    )]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision or upgrade the database schema
    Sync,

    #[command(flatten)]
    Data(DataCommands),
}

/// Commands that need a provisioned database
#[derive(Subcommand)]
enum DataCommands {
    /// Append a log entry
    Log {
        process: String,
        job: String,
        message: String,

        /// generic | warning | error
        #[arg(
            short = 't',
            long = "type",
            default_value = "generic",
            value_parser = parse_log_type
        )]
        log_type: LogType,
    },

    /// List log entries of a process (or one of its jobs), oldest first
    Logs {
        process: String,

        #[arg(short, long)]
        job: Option<String>,

        /// Only entries of this type
        #[arg(short = 't', long = "type", value_parser = parse_log_type)]
        log_type: Option<LogType>,

        #[arg(long)]
        offset: Option<u32>,

        #[arg(short = 'n', long)]
        limit: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Cache operations (scoped to this machine)
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// List processes
    Processes,

    /// List jobs of a process
    Jobs { process: String },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Append a value under a key (never overwrites)
    Put {
        process: String,
        job: String,
        key: String,
        value: String,
    },

    /// All values stored under a key, oldest first
    Get {
        process: String,
        job: String,
        key: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Exit 0 if any entry exists (for the key, when given), else 1
    Has {
        process: String,
        job: String,

        #[arg(short, long)]
        key: Option<String>,
    },
}

fn parse_log_type(s: &str) -> std::result::Result<LogType, String> {
    s.parse().map_err(|e: recall_core::domain::DomainError| e.to_string())
}

fn parse_log_format(s: &str) -> std::result::Result<LogFormat, String> {
    s.parse().map_err(|e: recall_core::AppError| e.to_string())
}

impl Cli {
    fn config(&self) -> RecallConfig {
        RecallConfig {
            database_url: self.db.clone(),
            machine_id: self.machine.clone(),
            log_format: self.log_format,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.config();

    logging::init_logging(config.log_format)?;

    let database_url = app::prepare_database_url(&config.database_url)?;
    let machine =
        recall_infra_system::machine_identity(config.machine_id.as_deref()).machine_id();
    debug!(database_url = %database_url, machine = %machine, "Configuration loaded");

    match cli.command {
        Commands::Sync => {
            let (before, after) = app::sync_schema(&database_url).await?;
            if before == after {
                println!("{} schema already at version {}", "✓".green(), after);
            } else {
                println!("{} schema upgraded {} → {}", "✓".green(), before, after);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Data(command) => {
            let app = App::connect(&database_url, machine).await?;
            data_command(&app, command).await
        }
    }
}

async fn data_command(app: &App, command: DataCommands) -> Result<ExitCode> {
    match command {
        DataCommands::Log {
            process,
            job,
            message,
            log_type,
        } => {
            let facade = app.job(&process, &job).await?;
            let entry = facade.create_log(&message, log_type).await?;
            println!("{}", entry.id);
        }

        DataCommands::Logs {
            process,
            job,
            log_type,
            offset,
            limit,
            json,
        } => {
            let filter = LogFilter {
                offset,
                limit,
                log_type,
            };
            let Some(process) = app.hierarchy.get_process(&process).await? else {
                anyhow::bail!("Unknown process '{}'", process);
            };

            let jobs = app.hierarchy.list_jobs(&process).await?;
            let logs = match job {
                Some(job_name) => {
                    let job = find_job(app, &process, &job_name).await?;
                    app.accessor.get_job_logs(&process, &job, filter).await?
                }
                None => app.accessor.get_process_logs(&process, filter).await?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&logs)?);
            } else if logs.is_empty() {
                println!("{}", "No log entries".yellow());
            } else {
                let names: HashMap<String, String> =
                    jobs.into_iter().map(|j| (j.id, j.name)).collect();
                println!("{}", output::log_table(&logs, &names));
            }
        }

        DataCommands::Cache { command } => return cache_command(app, command).await,

        DataCommands::Processes => {
            let processes = app.hierarchy.list_processes().await?;
            if processes.is_empty() {
                println!("{}", "No processes".yellow());
            } else {
                println!("{}", output::process_table(&processes));
            }
        }

        DataCommands::Jobs { process } => {
            let Some(process) = app.hierarchy.get_process(&process).await? else {
                anyhow::bail!("Unknown process '{}'", process);
            };
            let jobs = app.hierarchy.list_jobs(&process).await?;
            if jobs.is_empty() {
                println!("{}", "No jobs".yellow());
            } else {
                println!("{}", output::job_table(&jobs));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn find_job(app: &App, process: &Process, name: &str) -> Result<Job> {
    app.hierarchy
        .get_job(process, name)
        .await?
        .with_context(|| format!("Unknown job '{}' in process '{}'", name, process.name))
}

/// Resolve (process, job) for reads without creating either
async fn lookup(app: &App, process: &str, job: &str) -> Result<Option<(Process, Job)>> {
    let Some(process) = app.hierarchy.get_process(process).await? else {
        return Ok(None);
    };
    let job = app.hierarchy.get_job(&process, job).await?;
    Ok(job.map(|j| (process, j)))
}

async fn cache_command(app: &App, command: CacheCommands) -> Result<ExitCode> {
    match command {
        CacheCommands::Put {
            process,
            job,
            key,
            value,
        } => {
            let facade = app.job(&process, &job).await?;
            let entry = facade.create_cache(&key, &value).await?;
            println!("{}", entry.id);
        }

        CacheCommands::Get {
            process,
            job,
            key,
            json,
        } => {
            let entries = match lookup(app, &process, &job).await? {
                Some((p, j)) => app.accessor.get_cache(&p, &j, &key).await?,
                None => Vec::new(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("{}", format!("No entries for key '{}'", key).yellow());
            } else {
                println!("{}", output::cache_table(&entries));
            }
        }

        CacheCommands::Has { process, job, key } => {
            let present = match lookup(app, &process, &job).await? {
                Some((p, j)) => match key {
                    Some(key) => app.accessor.has_cache_key(&p, &j, &key).await?,
                    None => app.accessor.has_cache(&p, &j).await?,
                },
                None => false,
            };

            println!("{}", present);
            if !present {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
