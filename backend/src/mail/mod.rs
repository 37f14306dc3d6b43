pub mod models;
pub mod smtp;

use futures::FutureExt;
use futures::future::BoxFuture;

use models::ContactEmail;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail is not configured (MAIL_USERNAME / MAIL_PASSWORD missing)")]
    NotConfigured,
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Outbound channel for contact notifications.
pub trait Mailer: Send + Sync {
    fn send(&self, email: ContactEmail) -> BoxFuture<'_, Result<(), MailError>>;
}

/// Stand-in used when SMTP credentials are absent; every send fails.
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
    fn send(&self, _email: ContactEmail) -> BoxFuture<'_, Result<(), MailError>> {
        async { Err(MailError::NotConfigured) }.boxed()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every email instead of sending it, optionally failing.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<ContactEmail>>,
        pub fail: bool,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, email: ContactEmail) -> BoxFuture<'_, Result<(), MailError>> {
            async move {
                if self.fail {
                    return Err(MailError::NotConfigured);
                }
                self.sent.lock().unwrap().push(email);
                Ok(())
            }
            .boxed()
        }
    }
}
