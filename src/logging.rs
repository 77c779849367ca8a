//! Tracing subscriber setup.
//!
//! The base level applies to the whole process. The mail subsystem,
//! including the outcome records written by [`crate::mail::TracingLogSink`],
//! gets its own level under [`MAIL_LOG_TARGET`]. A `RUST_LOG` value replaces
//! both.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::mail::MAIL_LOG_TARGET;
use crate::Result;

/// Map a configured level name to a tracing level.
///
/// Accepts `information`, `warning` and `critical` alongside the tracing
/// names. Unknown names fall back to INFO.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" | "information" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" | "critical" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Filter directives derived from the config, e.g. `info,usermail::mail=warn`.
pub fn default_directives(config: &LoggingConfig) -> String {
    let base = parse_level(&config.level).as_str().to_ascii_lowercase();
    let mail = parse_level(&config.mail_level).as_str().to_ascii_lowercase();
    format!("{base},{MAIL_LOG_TARGET}={mail}")
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_directives(config));
    EnvFilter::builder().parse_lossy(directives)
}

fn open_log_file(path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Log to stdout and to the configured file, appending across restarts.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_file = open_log_file(&config.file)?;
    let writer = std::io::stdout.and(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(build_filter(config))
        .init();

    Ok(())
}

/// Log to stdout only. Used when the log file cannot be opened.
pub fn init_console_only(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(build_filter(config))
        .init();
}
