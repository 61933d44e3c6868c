//! SMTP delivery through `lettre`.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::Deserialize;

use crate::{MailTransport, OutgoingMail, TransportError};

/// Connection settings for the SMTP relay.
#[derive(Clone, Debug, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_port() -> u16 {
    587
}

/// [`MailTransport`] backed by a pooled STARTTLS SMTP connection.
#[derive(Clone)]
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(settings: &SmtpSettings) -> Result<Self, TransportError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|err| TransportError::Smtp(err.to_string()))?
            .port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            inner: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, mail: OutgoingMail) -> Result<(), TransportError> {
        let message = build_message(&mail)?;
        self.inner
            .send(message)
            .await
            .map_err(|err| TransportError::Smtp(err.to_string()))?;
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .parse()
        .map_err(|err| TransportError::InvalidAddress(format!("{address}: {err}")))
}

/// Body as `text/plain`, followed by the attachment.
fn build_message(mail: &OutgoingMail) -> Result<Message, TransportError> {
    let content_type = ContentType::parse(&mail.attachment.content_type)
        .map_err(|err| TransportError::Message(err.to_string()))?;
    let attachment = Attachment::new(mail.attachment.filename.clone())
        .body(mail.attachment.content.clone(), content_type);

    Message::builder()
        .from(mailbox(&mail.from)?)
        .to(mailbox(&mail.to)?)
        .subject(mail.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.clone()))
                .singlepart(attachment),
        )
        .map_err(|err| TransportError::Message(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MailAttachment;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            from: "splitmail@example.com".to_string(),
            subject: "Money Distribution Details for Alice".to_string(),
            body: "Friend Money Distribution\nFriend: Alice\n".to_string(),
            attachment: MailAttachment {
                filename: "distribution_details.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                content: b"%PDF-1.3".to_vec(),
            },
        }
    }

    #[test]
    fn message_carries_subject_and_attachment() {
        let message = build_message(&mail("a@x.com")).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Money Distribution Details for Alice"));
        assert!(raw.contains("To: a@x.com"));
        assert!(raw.contains("distribution_details.pdf"));
        assert!(raw.contains("application/pdf"));
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let err = build_message(&mail("not an address")).unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress(_)));
    }
}
