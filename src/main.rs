use std::{fs, io, path::Path, sync::Mutex};

use brand_hunter::cli::{commands, flags::Cli};
use brand_hunter::core::error::HunterError;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ROTATE_BYTES: u64 = 1_000_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli)?;

    commands::run(cli).await
}

fn init_tracing(cli: &Cli) -> Result<(), HunterError> {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_path = Path::new(&cli.log_file);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let rotation = rotate_if_large(log_path, LOG_ROTATE_BYTES);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| HunterError::Config(e.to_string()))?;

    if let Err(err) = rotation {
        tracing::warn!("log rotation failed for {}: {}", log_path.display(), err);
    }
    Ok(())
}

/// Moves the log aside to `.log.1` once it grows past `limit` bytes.
fn rotate_if_large(path: &Path, limit: u64) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > limit => {
            fs::rename(path, path.with_extension("log.1"))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
