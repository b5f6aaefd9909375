use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::alerts::{DeliveryOutcome, Notifier, OutgoingMessage};
use crate::config::TelegramConfig;
use crate::error::DeliveryError;

/// Form body of a `sendMessage` call.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Error payload returned by the Bot API.
#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("could not build HTTP client with timeout, using defaults: {e}");
                Client::new()
            });
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token
        )
    }

    #[instrument(skip(self, text))]
    pub async fn send_text(&self, text: &str) -> DeliveryOutcome {
        let form = SendMessage {
            chat_id: &self.config.chat_id,
            text,
        };

        let response = self.client.post(self.endpoint()).form(&form).send().await?;
        let status = response.status();
        if status == StatusCode::OK {
            debug!("bot api accepted message");
            return Ok(());
        }

        let raw = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ApiError>(&raw)
            .ok()
            .and_then(|error| error.description)
            .unwrap_or(raw);

        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &OutgoingMessage) -> DeliveryOutcome {
        self.send_text(&message.combined()).await
    }
}
