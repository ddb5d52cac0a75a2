//! Tracing setup shared by the server and the command-line tools.
//!
//! The server writes compact events to stdout and mirrors them into a file
//! (`PARBATCH_LOG_FILE`, or `logs/parbatch.log` when unset) through a non‑blocking writer.
//! The command-line tools print their own report on stdout, so their diagnostics go to
//! stderr only and default to `warn`.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "parbatch.log";

/// Where a process sends its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProfile {
    /// Long-running server: stdout plus a log file, `info` by default.
    Server,
    /// Command-line tool: stderr only, `warn` by default.
    Cli,
}

impl LogProfile {
    fn default_directive(self) -> &'static str {
        match self {
            Self::Server => "info,tower_http=debug",
            Self::Cli => "warn",
        }
    }
}

/// Install the global tracing subscriber for the given profile.
///
/// `RUST_LOG` overrides the profile's default filter. Calling this more than once is
/// harmless: later calls leave the first subscriber in place.
pub fn init_tracing(profile: LogProfile) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
    let registry = tracing_subscriber::registry().with(env_filter);

    match profile {
        LogProfile::Cli => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact();
            let _ = registry.with(stderr_layer).try_init();
        }
        LogProfile::Server => {
            let stdout_layer = fmt::layer().with_target(false).compact();
            let file_layer = open_log_file().map(|writer| {
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false)
                    .compact()
            });
            let _ = registry.with(stdout_layer).with(file_layer).try_init();
        }
    }
}

/// Resolve the server log file path from the environment.
pub fn log_file_path() -> PathBuf {
    std::env::var("PARBATCH_LOG_FILE")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE))
}

/// Open the server log file behind a non‑blocking writer.
///
/// Returns `None` (logging to stdout only) when the file or its directory cannot be created.
fn open_log_file() -> Option<NonBlocking> {
    let path = log_file_path();
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
