//! Command line driver for the watch engine.
//!
//! Prints the last changed path, one per line, each time a burst of changes
//! settles. Logs go to stderr so stdout only carries paths.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dirwatch_core::{
    APP_DIR, DEFAULT_DELAY, DEFAULT_LIMIT, Reporter, WatchConfig, WatchSession, resolve_base_dir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable that turns on debug logging when set to `true`.
pub const APP_DEBUG: &str = "APP_DEBUG";

const DEFAULT_DELAY_MS: u64 = DEFAULT_DELAY.as_millis() as u64;

/// Watch dirs and print the path of the last changed file.
#[derive(Debug, Parser)]
#[command(name = "dirwatch", version, about)]
pub struct Cli {
    /// Recursively watch sub dirs.
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Limit dirs to include recursively.
    #[arg(short = 'l', long = "limit", default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Delay in milliseconds before printing changes.
    #[arg(short = 'd', long = "delay", value_name = "MILLIS", default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Base dir for relative paths (defaults to $APP_DIR, then the working dir).
    #[arg(short = 'b', long = "base", value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Dirs to watch.
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Only include matching files.
    #[arg(long = "include", value_name = "REGEX")]
    pub include: Vec<String>,

    /// Exclude matching files.
    #[arg(long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Exclude matching dirs.
    #[arg(long = "exclude-dir", alias = "excludeDir", value_name = "REGEX")]
    pub exclude_dir: Vec<String>,
}

impl Cli {
    /// Build the session config around an already resolved base dir.
    pub fn into_config(self, base_dir: PathBuf) -> WatchConfig {
        WatchConfig {
            base_dir,
            watch_dirs: self.dirs,
            recursive: self.recursive,
            limit: self.limit,
            delay: Duration::from_millis(self.delay_ms),
            include_files: self.include,
            exclude_files: self.exclude,
            exclude_dirs: self.exclude_dir,
        }
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `APP_DEBUG=true` selects debug.
pub fn init_logging() {
    let app_debug = std::env::var(APP_DEBUG).ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(app_debug.as_deref())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_level(app_debug: Option<&str>) -> &'static str {
    match app_debug {
        Some("true") => "debug",
        _ => "info",
    }
}

/// Watch until interrupted or until the session reports a fatal error.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let base_dir = resolve_base_dir(
        cli.base_dir.clone(),
        std::env::var_os(APP_DIR),
        std::env::current_dir,
    )
    .context("failed to resolve base dir")?;
    info!("Base dir: {}", base_dir.display());

    let config = cli.into_config(base_dir);
    let reporter: Reporter = Arc::new(print_path);
    let mut session = WatchSession::start(&config, reporter).context("failed to start watching")?;

    let result = tokio::select! {
        res = shutdown_signal() => res.context("failed to listen for shutdown signal"),
        Some(err) = session.next_error() => Err(err).context("watch session failed"),
    };

    session.close().await;
    result
}

fn print_path(path: &Path) {
    let mut stdout = std::io::stdout().lock();
    // Nothing left to report to once stdout is gone.
    let _ = writeln!(stdout, "{}", path.display());
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
