//! Outbound mail delivery over SMTP via lettre.
//!
//! The engine consumes the `MailClient` trait, which reports `(ok, message)`
//! pairs rather than errors: a failed send is a normal terminal outcome for
//! the conversation, relayed to the user verbatim.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::SmtpConfig;
use crate::error::MailError;

/// Mail delivery collaborator.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Send a plain text email. Returns `(ok, message)`.
    async fn send_text(&self, to: &str, subject: &str, body: &str) -> (bool, String);

    /// Send an email with a file attachment. Returns `(ok, message)`.
    async fn send_attachment(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        path: &Path,
    ) -> (bool, String);
}

/// SMTP-backed `MailClient` using STARTTLS (port 587 by default).
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn mailbox(address: &str) -> Result<Mailbox, MailError> {
        address.parse().map_err(|e| MailError::InvalidAddress {
            address: address.to_string(),
            reason: format!("{e}"),
        })
    }

    fn build_text(&self, to: &str, subject: &str, body: &str) -> Result<Message, MailError> {
        Message::builder()
            .from(Self::mailbox(&self.config.from_address)?)
            .to(Self::mailbox(to)?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))
    }

    async fn build_attachment(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        path: &Path,
    ) -> Result<Message, MailError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MailError::AttachmentMissing(PathBuf::from(path))
            } else {
                MailError::Io(e)
            }
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();

        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let content_type = ContentType::parse(mime.essence_str())
            .map_err(|e| MailError::Build(format!("bad content type: {e}")))?;

        let multipart = MultiPart::mixed()
            .singlepart(SinglePart::plain(body.to_string()))
            .singlepart(Attachment::new(filename).body(bytes, content_type));

        Message::builder()
            .from(Self::mailbox(&self.config.from_address)?)
            .to(Self::mailbox(to)?)
            .subject(subject)
            .multipart(multipart)
            .map_err(|e| MailError::Build(e.to_string()))
    }

    /// Deliver a built message. lettre's `SmtpTransport` is blocking, so the
    /// send runs in `spawn_blocking`.
    async fn dispatch(&self, message: Message) -> Result<(), MailError> {
        let host = self.config.host.clone();
        let port = self.config.port;
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().to_string(),
        );

        tokio::task::spawn_blocking(move || {
            let transport = SmtpTransport::starttls_relay(&host)
                .map_err(|e| MailError::Transport(format!("STARTTLS setup failed: {e}")))?
                .port(port)
                .credentials(creds)
                .build();

            transport
                .send(&message)
                .map(|_| ())
                .map_err(|e| MailError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| MailError::Transport(format!("send task panicked: {e}")))?
    }
}

#[async_trait]
impl MailClient for SmtpMailer {
    async fn send_text(&self, to: &str, subject: &str, body: &str) -> (bool, String) {
        let message = match self.build_text(to, subject, body) {
            Ok(m) => m,
            Err(e) => return (false, format!("Failed to send email: {e}")),
        };
        match self.dispatch(message).await {
            Ok(()) => (true, "Email sent successfully!".into()),
            Err(e) => {
                tracing::error!("Text email to {to} failed: {e}");
                (false, format!("Failed to send email: {e}"))
            }
        }
    }

    async fn send_attachment(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        path: &Path,
    ) -> (bool, String) {
        let message = match self.build_attachment(to, subject, body, path).await {
            Ok(m) => m,
            Err(e) => return (false, format!("Failed to send email: {e}")),
        };
        match self.dispatch(message).await {
            Ok(()) => (true, "Email with attachment sent successfully!".into()),
            Err(e) => {
                tracing::error!("Attachment email to {to} failed: {e}");
                (false, format!("Failed to send email: {e}"))
            }
        }
    }
}
