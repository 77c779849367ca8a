//! Log sink for mail dispatch outcomes.
//!
//! The worker records delivery results through [`LogSink`] rather than
//! calling `tracing` directly, so outcome records can be captured or
//! redirected independently of diagnostics.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Target under which [`TracingLogSink`] records mail outcomes.
pub const MAIL_LOG_TARGET: &str = "usermail::mail";

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// Error raised by a log sink.
#[derive(Error, Debug)]
pub enum LogSinkError {
    #[error("log write failed: {0}")]
    Write(String),
}

/// Best-effort destination for outcome records.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn write_log(&self, level: LogLevel, message: &str) -> Result<(), LogSinkError>;
}

/// Sink that forwards entries to `tracing` under the `usermail::mail` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

#[async_trait]
impl LogSink for TracingLogSink {
    async fn write_log(&self, level: LogLevel, message: &str) -> Result<(), LogSinkError> {
        match level {
            LogLevel::Trace => tracing::trace!(target: MAIL_LOG_TARGET, "{}", message),
            LogLevel::Debug => tracing::debug!(target: MAIL_LOG_TARGET, "{}", message),
            LogLevel::Information => tracing::info!(target: MAIL_LOG_TARGET, "{}", message),
            LogLevel::Warning => tracing::warn!(target: MAIL_LOG_TARGET, "{}", message),
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(target: MAIL_LOG_TARGET, severity = %level, "{}", message)
            }
        }
        Ok(())
    }
}
