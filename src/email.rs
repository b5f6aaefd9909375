use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, instrument};

use crate::alerts::{DeliveryOutcome, Notifier, OutgoingMessage};
use crate::config::SmtpConfig;
use crate::error::DeliveryError;

/// Email backend submitting over SMTP with implicit TLS.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    config: SmtpConfig,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the UTF-8 plain text message. Non-ASCII subjects are encoded
    /// by the builder.
    pub fn build_message(&self, subject: &str, body: &str) -> Result<Message, DeliveryError> {
        let from: Mailbox = self.config.from.parse()?;
        let to: Mailbox = self.config.to.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|e| DeliveryError::Config(e.to_string()))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    #[instrument(skip_all)]
    async fn send(&self, message: &OutgoingMessage) -> DeliveryOutcome {
        let subject = message.subject.as_deref().unwrap_or_default();
        let email = self.build_message(subject, &message.body)?;

        let response = self.transport()?.send(email).await?;
        debug!("{} answered {:?}", self.config.host, response.code());
        Ok(())
    }
}
