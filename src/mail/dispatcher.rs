//! Lifecycle of the mail dispatch worker.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::queue::MailQueue;
use super::types::{MailJob, MessageType, Placeholders};
use super::worker::MailDispatchWorker;

/// Producer handle for enqueuing mail.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct MailSender {
    queue: Arc<MailQueue>,
}

impl MailSender {
    pub fn new(queue: Arc<MailQueue>) -> Self {
        Self { queue }
    }

    /// Queue a mail for background delivery.
    pub fn enqueue_mail(
        &self,
        recipient: impl Into<String>,
        message_type: MessageType,
        placeholders: Placeholders,
    ) {
        self.queue
            .enqueue(MailJob::new(recipient, message_type, placeholders));
    }

    /// Number of jobs waiting for the worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Owns the running worker task.
pub struct MailDispatcher {
    queue: Arc<MailQueue>,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl MailDispatcher {
    /// Spawn the worker on the current tokio runtime.
    pub fn start(worker: MailDispatchWorker) -> Self {
        let queue = Arc::clone(worker.queue());
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let handle = tokio::spawn(async move {
            worker.run(worker_token).await;
        });

        info!("Mail dispatcher started");
        Self {
            queue,
            token,
            handle,
        }
    }

    /// A producer handle for this dispatcher's queue.
    pub fn sender(&self) -> MailSender {
        MailSender::new(Arc::clone(&self.queue))
    }

    /// Whether the worker task is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the worker and wait for it to finish the job in hand.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            error!("Mail dispatch worker ended abnormally: {}", e);
        }
        info!("Mail dispatcher stopped");
    }
}
