//! Mail module for usermail.
//!
//! This module provides the outbound mail pipeline:
//! - An in-memory job queue fed by producers
//! - A single background worker with gating, retry and pacing
//! - The gate, transport and log sink it depends on

mod dispatcher;
mod gate;
mod log_sink;
mod queue;
mod smtp;
mod template;
mod transport;
mod types;
mod worker;

pub use dispatcher::{MailDispatcher, MailSender};
pub use gate::{normalize_recipient, BlockedRecipientGate, DbBlockedRecipientGate, GateError};
pub use log_sink::{LogLevel, LogSink, LogSinkError, TracingLogSink, MAIL_LOG_TARGET};
pub use queue::{Dequeued, MailQueue};
pub use smtp::SmtpMailTransport;
pub use template::{fill_placeholders, TemplateError, TemplateStore};
pub use transport::{MailTransport, TransportError};
pub use types::{MailJob, MessageType, Placeholders};
pub use worker::{JobOutcome, MailDispatchWorker, DEFAULT_PACING_DELAY, MAX_DELIVERY_ATTEMPTS};
