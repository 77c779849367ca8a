//! In-memory mail job queue.
//!
//! A FIFO guarded by a mutex, paired with a semaphore that counts available
//! jobs. Each enqueue adds exactly one permit and each successful dequeue
//! consumes exactly one, so a wake signal is never lost: an acquire that is
//! abandoned on cancellation leaves its permit for the next caller.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::types::MailJob;

/// Result of a dequeue call.
#[derive(Debug)]
pub enum Dequeued {
    /// The head job, now owned by the caller.
    Job(MailJob),
    /// Woken, but the store held nothing.
    Empty,
    /// The cancellation token fired before a job became available.
    Cancelled,
}

/// Thread-safe FIFO of pending mail jobs.
#[derive(Debug)]
pub struct MailQueue {
    jobs: Mutex<VecDeque<MailJob>>,
    available: Semaphore,
}

impl Default for MailQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MailQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<MailJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a job to the tail and wake one waiting consumer.
    pub fn enqueue(&self, job: MailJob) {
        debug!(job_id = %job.id, message_type = %job.message_type, "Mail job enqueued");
        self.lock().push_back(job);
        self.available.add_permits(1);
    }

    /// Wait for the head job or cancellation.
    ///
    /// Cancellation is checked first, so a cancelled token returns
    /// [`Dequeued::Cancelled`] even when jobs are pending.
    pub async fn dequeue(&self, token: &CancellationToken) -> Dequeued {
        tokio::select! {
            biased;
            _ = token.cancelled() => Dequeued::Cancelled,
            permit = self.available.acquire() => {
                match permit {
                    Ok(permit) => permit.forget(),
                    Err(_) => {
                        // Only reachable if the semaphore is closed, which this type never does
                        warn!("Mail queue semaphore closed");
                        return Dequeued::Cancelled;
                    }
                }
                match self.lock().pop_front() {
                    Some(job) => Dequeued::Job(job),
                    None => Dequeued::Empty,
                }
            }
        }
    }

    /// Remove the head job without waiting.
    pub fn try_dequeue(&self) -> Option<MailJob> {
        let permit = self.available.try_acquire().ok()?;
        permit.forget();
        self.lock().pop_front()
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no jobs are pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
