//! Blocked-recipient gate.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::db::{BlockedEmailRepository, Database};

/// Error raised by a gate backend.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("gate storage error: {0}")]
    Storage(String),

    /// The gate call panicked; raised by the worker.
    #[error("gate panicked: {0}")]
    Panicked(String),
}

impl From<crate::UsermailError> for GateError {
    fn from(e: crate::UsermailError) -> Self {
        GateError::Storage(e.to_string())
    }
}

/// Checks and records recipients that mail must not be sent to.
#[async_trait]
pub trait BlockedRecipientGate: Send + Sync {
    /// Whether the recipient is blocked.
    async fn is_blocked(&self, recipient: &str) -> Result<bool, GateError>;

    /// Block the recipient. Blocking an already blocked recipient is a no-op.
    async fn block(&self, recipient: &str) -> Result<(), GateError>;
}

/// Normalize a recipient address for gate lookups.
pub fn normalize_recipient(recipient: &str) -> String {
    recipient.trim().to_ascii_lowercase()
}

/// Gate backed by the `blocked_emails` table.
#[derive(Debug, Clone)]
pub struct DbBlockedRecipientGate {
    db: Arc<Database>,
}

impl DbBlockedRecipientGate {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Remove a recipient from the block list.
    ///
    /// Returns true if the recipient was blocked.
    pub async fn unblock(&self, recipient: &str) -> Result<bool, GateError> {
        let email = normalize_recipient(recipient);
        let removed = BlockedEmailRepository::new(self.db.pool())
            .delete(&email)
            .await?;
        if removed {
            info!("Recipient unblocked: {}", email);
        }
        Ok(removed)
    }
}

#[async_trait]
impl BlockedRecipientGate for DbBlockedRecipientGate {
    async fn is_blocked(&self, recipient: &str) -> Result<bool, GateError> {
        let email = normalize_recipient(recipient);
        let blocked = BlockedEmailRepository::new(self.db.pool())
            .exists(&email)
            .await?;
        Ok(blocked)
    }

    async fn block(&self, recipient: &str) -> Result<(), GateError> {
        let email = normalize_recipient(recipient);
        let created = BlockedEmailRepository::new(self.db.pool())
            .create_if_absent(&email)
            .await?;
        if created {
            info!("Recipient blocked: {}", email);
        }
        Ok(())
    }
}
