//! Chat delivery through the Telegram Bot API.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;
use crate::http::{build_client, ensure_success, join_segments, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org/";
const SERVICE: &str = "Telegram";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Client for `POST /bot{token}/sendMessage`.
pub struct TelegramClient {
    client: Client,
    send_url: Url,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL path embeds the bot token.
        f.debug_struct("TelegramClient")
            .field("send_url", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(bot_token: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        Self::with_base_url(bot_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`NotifyError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        bot_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        let base = parse_base_url(base_url)?;
        let bot_segment = format!("bot{bot_token}");
        let send_url = join_segments(&base, &[bot_segment.as_str(), "sendMessage"])?;
        Ok(Self {
            client: build_client(timeout_secs)?,
            send_url,
        })
    }

    /// Sends `text` to `chat_id`.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::UnexpectedStatus`] on a non-2xx response.
    /// - [`NotifyError::Api`] when the bot API answers `"ok": false`.
    /// - [`NotifyError::Http`] on network failure.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.send_url.clone())
            .json(&SendMessage { chat_id, text })
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let body = response.text().await?;
        let parsed: BotResponse =
            serde_json::from_str(&body).map_err(|e| NotifyError::Deserialize {
                context: "Telegram sendMessage".to_string(),
                source: e,
            })?;
        if !parsed.ok {
            return Err(NotifyError::Api {
                service: SERVICE,
                message: parsed
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(())
    }
}
