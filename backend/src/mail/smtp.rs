use futures::FutureExt;
use futures::future::BoxFuture;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::models::ContactEmail;
use super::{MailError, Mailer};
use crate::config::MailConfig;

/// Relays contact notifications through an authenticated SMTP server.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let (username, password) = match (&config.username, &config.password) {
            (Some(u), Some(p)) => (u.clone(), p.clone()),
            _ => return Err(MailError::NotConfigured),
        };
        let sender = config
            .default_sender
            .as_deref()
            .unwrap_or(&username)
            .parse::<Mailbox>()?;
        let recipient = config
            .recipient
            .as_deref()
            .unwrap_or(&username)
            .parse::<Mailbox>()?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            sender,
            recipient,
        })
    }

    pub fn build_message(&self, email: &ContactEmail) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        match email.reply_to.parse::<Mailbox>() {
            Ok(reply_to) => builder = builder.reply_to(reply_to),
            Err(e) => log::warn!("Not setting Reply-To for {:?}: {}", email.reply_to, e),
        }

        Ok(builder.body(email.body.clone())?)
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: ContactEmail) -> BoxFuture<'_, Result<(), MailError>> {
        async move {
            let message = self.build_message(&email)?;
            log::debug!("Attempting to send email...");
            let response = self.transport.send(message).await?;
            log::debug!("Email sent successfully! SMTP code {}", response.code());
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            server: "localhost".into(),
            port: 2525,
            use_tls: false,
            username: Some("owner@example.com".into()),
            password: Some("secret".into()),
            default_sender: None,
            recipient: None,
        }
    }

    #[test]
    fn requires_credentials() {
        let mut config = config();
        config.password = None;
        assert!(matches!(SmtpMailer::new(&config), Err(MailError::NotConfigured)));
    }

    #[test]
    fn rejects_unparseable_sender() {
        let mut config = config();
        config.default_sender = Some("not an address".into());
        assert!(matches!(SmtpMailer::new(&config), Err(MailError::Address(_))));
    }

    // The pooled transport spawns onto the tokio runtime when built.
    #[actix_web::test]
    async fn message_goes_to_owner_with_reply_to_submitter() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let email = ContactEmail {
            subject: "New Contact Form Submission from Ada".into(),
            body: "Name: Ada\nEmail: ada@example.com\nMessage: hi\n".into(),
            reply_to: "ada@example.com".into(),
        };

        let formatted = String::from_utf8(mailer.build_message(&email).unwrap().formatted()).unwrap();
        assert!(formatted.contains("To: owner@example.com"));
        assert!(formatted.contains("From: owner@example.com"));
        assert!(formatted.contains("Reply-To: ada@example.com"));
        assert!(formatted.contains("Subject: New Contact Form Submission from Ada"));
    }

    #[actix_web::test]
    async fn bad_reply_to_is_skipped() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let email = ContactEmail {
            subject: "s".into(),
            body: "b".into(),
            reply_to: "nobody".into(),
        };
        let formatted = String::from_utf8(mailer.build_message(&email).unwrap().formatted()).unwrap();
        assert!(!formatted.contains("Reply-To"));
    }
}
