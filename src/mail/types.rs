//! Mail job types for usermail.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Placeholder name to replacement value.
pub type Placeholders = HashMap<String, String>;

/// Category of outbound mail; selects template and subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Welcome,
    PasswordReset,
    AccountActivation,
    AccountUpdate,
    AccountDelete,
    Information,
    Notification,
}

impl MessageType {
    /// All message types.
    pub const ALL: [MessageType; 7] = [
        MessageType::Welcome,
        MessageType::PasswordReset,
        MessageType::AccountActivation,
        MessageType::AccountUpdate,
        MessageType::AccountDelete,
        MessageType::Information,
        MessageType::Notification,
    ];

    /// Subject line for this message type.
    pub fn subject(&self) -> &'static str {
        match self {
            MessageType::Welcome => "Welcome!",
            MessageType::PasswordReset => "Password Reset",
            MessageType::AccountActivation => "Account Activation",
            MessageType::AccountUpdate => "Account Update",
            MessageType::AccountDelete => "Account Deletion",
            MessageType::Information => "Information",
            MessageType::Notification => "Notification",
        }
    }

    /// Variant name, used as the template file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Welcome => "Welcome",
            MessageType::PasswordReset => "PasswordReset",
            MessageType::AccountActivation => "AccountActivation",
            MessageType::AccountUpdate => "AccountUpdate",
            MessageType::AccountDelete => "AccountDelete",
            MessageType::Information => "Information",
            MessageType::Notification => "Notification",
        }
    }

    /// Template file name for this message type.
    pub fn template_name(&self) -> String {
        format!("{}.html", self.as_str())
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued request to send a single mail to one recipient.
#[derive(Debug, Clone)]
pub struct MailJob {
    /// Identifier for tracing a job through the worker.
    pub id: Uuid,
    pub recipient: String,
    pub message_type: MessageType,
    pub placeholders: Placeholders,
}

impl MailJob {
    /// Create a new job.
    pub fn new(
        recipient: impl Into<String>,
        message_type: MessageType,
        placeholders: Placeholders,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            message_type,
            placeholders,
        }
    }

    /// Add a placeholder value.
    pub fn with_placeholder(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects() {
        assert_eq!(MessageType::Welcome.subject(), "Welcome!");
        assert_eq!(MessageType::AccountDelete.subject(), "Account Deletion");
        assert_eq!(MessageType::PasswordReset.subject(), "Password Reset");
    }

    #[test]
    fn test_template_name() {
        assert_eq!(MessageType::AccountUpdate.template_name(), "AccountUpdate.html");
        assert_eq!(MessageType::Notification.to_string(), "Notification");
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = MailJob::new("a@example.com", MessageType::Welcome, Placeholders::new());
        let b = MailJob::new("a@example.com", MessageType::Welcome, Placeholders::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_with_placeholder() {
        let job = MailJob::new("a@example.com", MessageType::Welcome, Placeholders::new())
            .with_placeholder("FirstName", "Ada")
            .with_placeholder("FirstName", "Grace");
        assert_eq!(job.placeholders.len(), 1);
        assert_eq!(job.placeholders["FirstName"], "Grace");
    }
}
