//! Shared construction helpers for the outbound API clients.

use std::time::Duration;

use reqwest::{Client, Response, Url};

use crate::error::NotifyError;

const USER_AGENT: &str = "marathon-alert/0.1 (notifications)";

pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, NotifyError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Parses `base_url`, normalised to end with exactly one slash so that joined
/// paths land under it.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, NotifyError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| NotifyError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, NotifyError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| NotifyError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Returns the response unchanged if it is 2xx, otherwise an error carrying
/// the status and body.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::UnexpectedStatus {
        service,
        status: status.as_u16(),
        body,
    })
}
