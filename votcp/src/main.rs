//! VOT-CP - Voice Onset Time measurement with AutoVOT

use clap::Parser;
use eyre::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use votcp::cli::{Cli, DEFAULT_LOG_FILE, run_cli};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_dir = cli
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_name = cli
        .log_file
        .file_name()
        .map_or_else(|| DEFAULT_LOG_FILE.into(), |name| name.to_owned());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_name.to_string_lossy())
        .build(log_dir)
        .wrap_err_with(|| format!("failed to open log file: {:?}", cli.log_file.display()))?;

    let (stderr, _stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    let (file, _file_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(stderr))
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .init();

    run_cli(cli)
}
