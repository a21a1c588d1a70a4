//! Recipient list import from a Google Sheets form-response sheet.
//!
//! Each row is `[timestamp, name, courses, phone]`, as written by the sign-up
//! form. The first row holds column titles.

use marathon_core::{Recipient, SheetsConfig};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::NotifyError;
use crate::http::{build_client, ensure_success, join_segments, parse_base_url};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";
const SERVICE: &str = "Google Sheets";
const NAME_COLUMN: usize = 1;
const PHONE_COLUMN: usize = 3;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Client for `GET /v4/spreadsheets/{id}/values/{range}?key=`.
pub struct SheetsClient {
    client: Client,
    values_url: Url,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The query string carries the API key.
        f.debug_struct("SheetsClient")
            .field("values_url", &self.values_url.path())
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: &SheetsConfig, timeout_secs: u64) -> Result<Self, NotifyError> {
        Self::with_base_url(config, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`NotifyError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        config: &SheetsConfig,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        let base = parse_base_url(base_url)?;
        let mut values_url = join_segments(
            &base,
            &[
                "v4",
                "spreadsheets",
                config.spreadsheet_id.as_str(),
                "values",
                config.range.as_str(),
            ],
        )?;
        values_url
            .query_pairs_mut()
            .append_pair("key", &config.api_key);

        Ok(Self {
            client: build_client(timeout_secs)?,
            values_url,
        })
    }

    /// Fetches the raw cell values of the configured range.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::UnexpectedStatus`] on a non-2xx response.
    /// - [`NotifyError::Http`] on network failure.
    /// - [`NotifyError::Deserialize`] if the body is not a value range.
    pub async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, NotifyError> {
        let response = self.client.get(self.values_url.clone()).send().await?;
        let response = ensure_success(SERVICE, response).await?;
        let body = response.text().await?;
        let range: ValueRange =
            serde_json::from_str(&body).map_err(|e| NotifyError::Deserialize {
                context: "Sheets values".to_string(),
                source: e,
            })?;
        Ok(range.values)
    }

    /// Fetches the sheet and converts its rows into recipients.
    ///
    /// # Errors
    ///
    /// Propagates [`SheetsClient::fetch_rows`] failures.
    pub async fn load_recipients(&self) -> Result<Vec<Recipient>, NotifyError> {
        let rows = self.fetch_rows().await?;
        let recipients = recipients_from_rows(&rows);
        tracing::info!(
            rows = rows.len(),
            recipients = recipients.len(),
            "loaded recipients from sheet"
        );
        Ok(recipients)
    }
}

/// Maps sheet rows to recipients, normalizing phone numbers.
///
/// Rows with fewer than four columns, or whose phone column has no digits
/// (such as the title row), are skipped.
#[must_use]
pub fn recipients_from_rows(rows: &[Vec<String>]) -> Vec<Recipient> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            if row.len() <= PHONE_COLUMN {
                tracing::warn!(row = index, columns = row.len(), "skipping short sheet row");
                return None;
            }
            let phone = &row[PHONE_COLUMN];
            if !phone.chars().any(|c| c.is_ascii_digit()) {
                tracing::debug!(row = index, "skipping sheet row without a phone number");
                return None;
            }
            Some(Recipient {
                name: row[NAME_COLUMN].trim().to_string(),
                phone_number: normalize_phone_number(phone),
            })
        })
        .collect()
}

/// Converts a domestic Korean number to E.164: `010-1234-5678` becomes
/// `+821012345678`. Numbers already starting with `+82` only lose separators.
#[must_use]
pub fn normalize_phone_number(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    if compact.starts_with("+82") {
        return compact;
    }
    let mut chars = compact.chars();
    chars.next();
    format!("+82{}", chars.as_str())
}
