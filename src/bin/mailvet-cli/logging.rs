use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the process-wide subscriber writing to `log_file` (append mode).
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(log_file: &Path, smtp_debug: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(smtp_debug));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("install log subscriber")?;
    Ok(())
}

fn default_filter(smtp_debug: bool) -> EnvFilter {
    if smtp_debug {
        EnvFilter::new("info,mailvet::probe=debug")
    } else {
        EnvFilter::new("info")
    }
}
