use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, Message, SmtpTransport,
    Transport,
};

use crate::{
    config::MailConfig,
    entities::letter::Letter,
    error::{self, ServiceError},
};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, letter: Letter) -> error::Result<()>;
}

pub type MailerObject = Arc<dyn Mailer>;

/// Sends mail through an authenticated SMTP relay (implicit TLS).
pub struct SmtpMailer {
    host: String,
    credentials: Option<(String, String)>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Self {
        let credentials = match (&config.email_user, &config.email_pass) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => {
                log::warn!("EMAIL_USER/EMAIL_PASS not set, notification emails will fail");
                None
            }
        };
        Self {
            host: config.smtp_host.clone(),
            credentials,
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, letter: Letter) -> error::Result<()> {
        let Some((user, pass)) = self.credentials.clone() else {
            return Err(ServiceError::notification("SMTP credentials are not configured"));
        };

        let from: Mailbox = user.parse().map_err(ServiceError::notification)?;
        let to: Mailbox = letter.email.parse().map_err(ServiceError::notification)?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(letter.subject)
            .body(letter.message)
            .map_err(ServiceError::notification)?;

        let mailer = SmtpTransport::relay(&self.host)
            .map_err(ServiceError::notification)?
            .credentials(Credentials::new(user, pass))
            .build();

        // lettre's SMTP transport blocks
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(ServiceError::notification)?
            .map_err(|err| ServiceError::notification(format!("Error sending email: {}", err)))?;

        Ok(())
    }
}

/// Records letters instead of sending them. Letters addressed to one of
/// `failing_recipients` fail with a notification error.
#[derive(Default)]
pub struct TestMailer {
    pub sent: std::sync::Mutex<Vec<Letter>>,
    failing_recipients: Vec<String>,
}

impl TestMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            sent: Default::default(),
            failing_recipients: recipients.iter().map(|x| x.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<Letter> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for TestMailer {
    async fn send(&self, letter: Letter) -> error::Result<()> {
        if self.failing_recipients.contains(&letter.email) {
            return Err(ServiceError::notification(format!(
                "Mailbox unavailable: {}",
                letter.email
            )));
        }
        self.sent
            .lock()
            .map_err(|_| ServiceError::notification("test mailer lock poisoned"))?
            .push(letter);
        Ok(())
    }
}
