use async_trait::async_trait;

use crate::TransportError;

/// A file attached to an outgoing email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// A fully assembled email, ready for a [`MailTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub attachment: MailAttachment,
}

/// Delivers emails.
///
/// Implementations are shared by every concurrent dispatch task, so `send`
/// must be safe to call from many tasks at once.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), TransportError>;
}
