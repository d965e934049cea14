//! Telegram Bot API notifier for event activation notices.
//!
//! Notifications are best-effort: send failures are logged and never
//! propagate into the request that triggered them.

use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::TelegramConfig;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Sends notifications to the configured chat via the Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: secrecy::SecretString,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a notifier from the Telegram configuration.
    #[must_use]
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    /// Notify the chat that an event was opened.
    pub async fn notify_event_opened(&self, title: &str, location: Option<&str>) {
        let text = match location {
            Some(location) => {
                format!("\u{1F6A8} <b>Nuovo evento attivato</b>\n{title}\n\u{1F4CD} {location}")
            }
            None => format!("\u{1F6A8} <b>Nuovo evento attivato</b>\n{title}"),
        };
        self.send_message(&text).await;
    }

    /// Notify the chat that an event was closed.
    pub async fn notify_event_closed(&self, title: &str) {
        let text = format!("\u{2705} <b>Evento chiuso</b>\n{title}");
        self.send_message(&text).await;
    }

    /// Post one message via `sendMessage`, logging failures.
    async fn send_message(&self, text: &str) {
        let url = format!(
            "{API_BASE}/bot{}/sendMessage",
            self.bot_token.expose_secret()
        );
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        match self.client.post(&url).json(&request).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Telegram notification sent");
            }
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    "Telegram API rejected notification"
                );
            }
            Err(e) => {
                tracing::warn!("Failed to send Telegram notification: {e}");
            }
        }
    }
}
