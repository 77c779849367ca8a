//! SMTP mail transport built on lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::template::TemplateStore;
use super::transport::{MailTransport, TransportError};
use super::types::{MessageType, Placeholders};
use crate::config::{MailConfig, SmtpConfig};

/// Port that uses implicit TLS instead of STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends rendered templates over SMTP.
pub struct SmtpMailTransport {
    /// `None` when sending is disabled.
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    templates: TemplateStore,
}

impl SmtpMailTransport {
    /// Build a transport from configuration.
    ///
    /// With `send_emails` off no connection settings are required and every
    /// send is a logged no-op.
    pub fn new(
        smtp: &SmtpConfig,
        mail: &MailConfig,
        templates: TemplateStore,
    ) -> Result<Self, TransportError> {
        let from_email = if smtp.from_email.is_empty() {
            "noreply@localhost"
        } else {
            smtp.from_email.as_str()
        };
        let address: Address = from_email.parse().map_err(|e: lettre::address::AddressError| {
            TransportError::Address {
                address: from_email.to_string(),
                reason: e.to_string(),
            }
        })?;
        let from_name = if smtp.from_name.is_empty() {
            None
        } else {
            Some(smtp.from_name.clone())
        };
        let from = Mailbox::new(from_name, address);

        let mailer = if mail.send_emails {
            Some(build_mailer(smtp)?)
        } else {
            info!("Mail sending is disabled; messages will only be logged");
            None
        };

        Ok(Self {
            mailer,
            from,
            templates,
        })
    }

    /// Whether messages are actually sent.
    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }
}

fn build_mailer(smtp: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
    let builder = if !smtp.enable_ssl {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
    } else if smtp.port == IMPLICIT_TLS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| TransportError::Smtp(e.to_string()))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| TransportError::Smtp(e.to_string()))?
    };

    let mut builder = builder.port(smtp.port);
    if !smtp.username.is_empty() {
        builder = builder.credentials(Credentials::new(
            smtp.username.clone(),
            smtp.password.clone(),
        ));
    }

    debug!(
        "SMTP transport configured for {}:{} (tls: {})",
        smtp.host, smtp.port, smtp.enable_ssl
    );
    Ok(builder.build())
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(
        &self,
        recipient: &str,
        message_type: MessageType,
        placeholders: &Placeholders,
    ) -> Result<(), TransportError> {
        let recipient = recipient.trim();
        let Some(mailer) = &self.mailer else {
            info!(
                "Mail sending disabled; skipped {} mail to {}",
                message_type, recipient
            );
            return Ok(());
        };
        if recipient.is_empty() {
            info!("No recipient for {} mail; nothing sent", message_type);
            return Ok(());
        }

        let body = self.templates.render(message_type, placeholders).await?;

        let to: Mailbox = recipient
            .parse()
            .map_err(|e: lettre::address::AddressError| TransportError::Address {
                address: recipient.to_string(),
                reason: e.to_string(),
            })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message_type.subject())
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| TransportError::Message(e.to_string()))?;

        mailer
            .send(message)
            .await
            .map_err(|e| TransportError::Smtp(e.to_string()))?;

        debug!("{} mail sent to {}", message_type, recipient);
        Ok(())
    }
}
