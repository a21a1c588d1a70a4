//! SMS delivery through the Twilio Messages API.

use marathon_core::TwilioConfig;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::NotifyError;
use crate::http::{build_client, ensure_success, join_segments, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://api.twilio.com/";
const SERVICE: &str = "Twilio";

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Client for `POST /2010-04-01/Accounts/{sid}/Messages.json`.
///
/// Use [`TwilioClient::new`] for production or [`TwilioClient::with_base_url`]
/// to point at a mock server in tests.
pub struct TwilioClient {
    client: Client,
    messages_url: Url,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("messages_url", &self.messages_url.as_str())
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[redacted]")
            .field("from_number", &self.from_number)
            .finish_non_exhaustive()
    }
}

impl TwilioClient {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: &TwilioConfig, timeout_secs: u64) -> Result<Self, NotifyError> {
        Self::with_base_url(config, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`NotifyError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        config: &TwilioConfig,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        let base = parse_base_url(base_url)?;
        let messages_url = join_segments(
            &base,
            &[
                "2010-04-01",
                "Accounts",
                config.account_sid.as_str(),
                "Messages.json",
            ],
        )?;
        Ok(Self {
            client: build_client(timeout_secs)?,
            messages_url,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }

    /// Sends one SMS to `to` (E.164).
    ///
    /// # Errors
    ///
    /// - [`NotifyError::UnexpectedStatus`] if Twilio rejects the message.
    /// - [`NotifyError::Http`] on network failure.
    /// - [`NotifyError::Deserialize`] if the response is not a message resource.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await?;
        let response = ensure_success(SERVICE, response).await?;

        let text = response.text().await?;
        let resource: MessageResource =
            serde_json::from_str(&text).map_err(|e| NotifyError::Deserialize {
                context: "Twilio message resource".to_string(),
                source: e,
            })?;
        tracing::debug!(sid = %resource.sid, status = ?resource.status, "twilio message queued");
        Ok(())
    }
}
