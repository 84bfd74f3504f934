//! Console logging setup

use anyhow::{Context, Result};
use recall_core::config::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "recall=info";

/// Initialize tracing on stderr (stdout is reserved for command output)
///
/// `RUST_LOG` overrides the default `recall=info` filter.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to install JSON subscriber")?;
        }
        LogFormat::Pretty => {
            // Development: compact human-readable output
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to install subscriber")?;
        }
    }

    Ok(())
}
