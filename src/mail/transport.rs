//! Mail transport contract.

use async_trait::async_trait;
use thiserror::Error;

use super::template::TemplateError;
use super::types::{MessageType, Placeholders};

/// A failed delivery attempt.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("smtp error: {0}")]
    Smtp(String),

    /// The send call panicked; raised by the worker.
    #[error("transport panicked: {0}")]
    Panicked(String),
}

/// Delivers one rendered mail to one recipient.
///
/// Implementations must surface failures as `Err`; the worker's retry and
/// block handling depends on it.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        message_type: MessageType,
        placeholders: &Placeholders,
    ) -> Result<(), TransportError>;
}
