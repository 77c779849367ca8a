//! Mail dispatch worker.
//!
//! A single loop drains the [`MailQueue`]: each job is checked against the
//! blocked-recipient gate, sent with one retry, and its outcome recorded
//! before the next job is taken. After every delivery attempt the loop
//! pauses for the pacing delay, which caps outbound volume.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::gate::{BlockedRecipientGate, GateError};
use super::log_sink::{LogLevel, LogSink};
use super::queue::{Dequeued, MailQueue};
use super::transport::{MailTransport, TransportError};
use super::types::MailJob;

/// Delivery attempts per job before the recipient is blocked.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 2;

/// Default pause after each delivery.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(60);

/// What happened to a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Recipient is blocked; the job was discarded.
    Blocked,
    /// The gate could not be queried; the job was discarded.
    GateUnavailable,
    /// Sent on the given attempt.
    Delivered { attempts: u32 },
    /// Every attempt failed; the recipient has been blocked.
    Failed,
}

impl JobOutcome {
    /// Whether the transport was used, which is what the pacing delay throttles.
    pub fn reached_transport(&self) -> bool {
        matches!(self, JobOutcome::Delivered { .. } | JobOutcome::Failed)
    }
}

/// Background consumer of the mail queue.
pub struct MailDispatchWorker {
    queue: Arc<MailQueue>,
    gate: Arc<dyn BlockedRecipientGate>,
    transport: Arc<dyn MailTransport>,
    log_sink: Arc<dyn LogSink>,
    pacing_delay: Duration,
}

impl MailDispatchWorker {
    /// Create a worker with the default pacing delay.
    pub fn new(
        queue: Arc<MailQueue>,
        gate: Arc<dyn BlockedRecipientGate>,
        transport: Arc<dyn MailTransport>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            queue,
            gate,
            transport,
            log_sink,
            pacing_delay: DEFAULT_PACING_DELAY,
        }
    }

    /// Set the pause taken after each delivery.
    pub fn with_pacing_delay(mut self, pacing_delay: Duration) -> Self {
        self.pacing_delay = pacing_delay;
        self
    }

    /// The queue this worker drains.
    pub fn queue(&self) -> &Arc<MailQueue> {
        &self.queue
    }

    /// Pause taken after each delivery.
    pub fn pacing_delay(&self) -> Duration {
        self.pacing_delay
    }

    /// Run until `token` is cancelled.
    ///
    /// A job that has been dequeued is always processed to completion;
    /// cancellation only interrupts waiting for a job or the pacing pause.
    pub async fn run(&self, token: CancellationToken) {
        info!(
            "Mail dispatch worker started (pacing delay: {} seconds)",
            self.pacing_delay.as_secs()
        );

        loop {
            let job = match self.queue.dequeue(&token).await {
                Dequeued::Job(job) => job,
                Dequeued::Empty => {
                    debug!("Mail queue woke with no job");
                    continue;
                }
                Dequeued::Cancelled => break,
            };

            let outcome = self.process_job(job).await;

            if outcome.reached_transport() && !self.pause(&token).await {
                break;
            }
        }

        info!(
            "Mail dispatch worker stopped ({} job(s) left in queue)",
            self.queue.len()
        );
    }

    /// Gate-check, send and record the outcome of one job.
    pub async fn process_job(&self, job: MailJob) -> JobOutcome {
        debug!(
            job_id = %job.id,
            "Processing {} mail for {}",
            job.message_type, job.recipient
        );

        match self.check_gate(&job.recipient).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(job_id = %job.id, "Recipient {} is blocked; job discarded", job.recipient);
                return JobOutcome::Blocked;
            }
            Err(e) => {
                self.write_log(
                    LogLevel::Error,
                    &format!(
                        "Could not check block status of {} at {}: {}; {} mail discarded",
                        job.recipient,
                        Utc::now().to_rfc3339(),
                        e,
                        job.message_type
                    ),
                )
                .await;
                return JobOutcome::GateUnavailable;
            }
        }

        for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
            match self.attempt_send(&job).await {
                Ok(()) => {
                    self.write_log(
                        LogLevel::Information,
                        &format!(
                            "{} mail sent to {} at {}",
                            job.message_type,
                            job.recipient,
                            Utc::now().to_rfc3339()
                        ),
                    )
                    .await;
                    return JobOutcome::Delivered { attempts: attempt };
                }
                Err(e) => {
                    warn!(
                        job_id = %job.id,
                        "Delivery attempt {}/{} to {} failed: {}",
                        attempt, MAX_DELIVERY_ATTEMPTS, job.recipient, e
                    );
                }
            }
        }

        self.write_log(
            LogLevel::Error,
            &format!(
                "Failed to send {} mail to {} at {} after {} attempts; recipient blocked",
                job.message_type,
                job.recipient,
                Utc::now().to_rfc3339(),
                MAX_DELIVERY_ATTEMPTS
            ),
        )
        .await;

        if let Err(e) = self.block_recipient(&job.recipient).await {
            error!(job_id = %job.id, "Failed to block recipient {}: {}", job.recipient, e);
        }

        JobOutcome::Failed
    }

    /// One send call, with panics turned into errors.
    async fn attempt_send(&self, job: &MailJob) -> Result<(), TransportError> {
        let send = self
            .transport
            .send(&job.recipient, job.message_type, &job.placeholders);

        match AssertUnwindSafe(send).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(TransportError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// Gate lookup, with panics turned into errors.
    async fn check_gate(&self, recipient: &str) -> Result<bool, GateError> {
        match AssertUnwindSafe(self.gate.is_blocked(recipient))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(GateError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    async fn block_recipient(&self, recipient: &str) -> Result<(), GateError> {
        match AssertUnwindSafe(self.gate.block(recipient)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(GateError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    async fn write_log(&self, level: LogLevel, message: &str) {
        let write = self.log_sink.write_log(level, message);
        match AssertUnwindSafe(write).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to write mail log entry: {}", e),
            Err(payload) => error!(
                "Mail log sink panicked: {}",
                panic_message(payload.as_ref())
            ),
        }
    }

    /// Wait out the pacing delay. Returns false if cancelled first.
    async fn pause(&self, token: &CancellationToken) -> bool {
        if self.pacing_delay.is_zero() {
            return !token.is_cancelled();
        }

        tokio::select! {
            _ = token.cancelled() => false,
            _ = tokio::time::sleep(self.pacing_delay) => true,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
