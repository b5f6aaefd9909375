use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::email::EmailNotifier;
use crate::error::DeliveryError;
use crate::event_log::{Entry, EventLog};
use crate::telegram::TelegramNotifier;

/// Outcome of a single delivery attempt.
pub type DeliveryOutcome = Result<(), DeliveryError>;

/// A message handed to a notification backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub subject: Option<String>,
    pub body: String,
}

impl OutgoingMessage {
    pub fn new(subject: impl ToString, body: impl ToString) -> Self {
        Self {
            subject: Some(subject.to_string()),
            body: body.to_string(),
        }
    }

    pub fn text(body: impl ToString) -> Self {
        Self {
            subject: None,
            body: body.to_string(),
        }
    }

    /// Subject and body as one block of text, for backends without a subject.
    pub fn combined(&self) -> String {
        match &self.subject {
            Some(subject) => format!("{subject}\n{}", self.body),
            None => self.body.clone(),
        }
    }
}

/// A notification backend (email, chat bot, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn send(&self, message: &OutgoingMessage) -> DeliveryOutcome;
}

/// What happened to each backend during one dispatch.
#[derive(Debug)]
pub struct DispatchReport {
    /// `None` when email was not part of the dispatch
    pub email: Option<DeliveryOutcome>,
    pub chat: DeliveryOutcome,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.chat.is_ok() && self.email.as_ref().is_none_or(|outcome| outcome.is_ok())
    }
}

/// Fans one alert out to the email and chat backends.
///
/// Both backends are always tried exactly once; a failure in one never keeps
/// the other from running and is never raised to the caller. Outcomes are
/// recorded in the event log.
#[derive(Clone)]
pub struct AlertDispatcher {
    email: Arc<dyn Notifier>,
    chat: Arc<dyn Notifier>,
    log: EventLog,
}

impl AlertDispatcher {
    pub fn new(email: Arc<dyn Notifier>, chat: Arc<dyn Notifier>, log: EventLog) -> Self {
        Self { email, chat, log }
    }

    /// SMTP and Telegram backends as configured.
    pub fn from_config(config: &Config, log: EventLog) -> Self {
        Self::new(
            Arc::new(EmailNotifier::new(config.smtp.clone())),
            Arc::new(TelegramNotifier::new(config.telegram.clone())),
            log,
        )
    }

    /// Send through email first, then through the chat bot.
    #[instrument(skip(self, body))]
    pub async fn dispatch(&self, subject: &str, body: &str) -> DispatchReport {
        let message = OutgoingMessage::new(subject, body);

        let email = self.email.send(&message).await;
        match &email {
            Ok(()) => {
                info!("{}: alert sent", self.email.name());
                self.log.record(&Entry::EmailSent {
                    subject: subject.to_string(),
                });
            }
            Err(e) => {
                error!("{}: failed to send alert: {e}", self.email.name());
                self.log.record(&Entry::EmailFailed {
                    error: e.to_string(),
                });
            }
        }

        let chat = self.send_chat(&OutgoingMessage::text(message.combined())).await;

        DispatchReport {
            email: Some(email),
            chat,
        }
    }

    /// Send through the chat bot only.
    #[instrument(skip_all)]
    pub async fn dispatch_chat(&self, text: &str) -> DispatchReport {
        let chat = self.send_chat(&OutgoingMessage::text(text)).await;
        DispatchReport { email: None, chat }
    }

    async fn send_chat(&self, message: &OutgoingMessage) -> DeliveryOutcome {
        let outcome = self.chat.send(message).await;
        match &outcome {
            Ok(()) => {
                info!("{}: message sent", self.chat.name());
                self.log.record(&Entry::ChatSent);
            }
            Err(e) => {
                error!("{}: failed to send message: {e}", self.chat.name());
                self.log.record(&Entry::ChatFailed {
                    error: e.to_string(),
                });
            }
        }
        outcome
    }
}
