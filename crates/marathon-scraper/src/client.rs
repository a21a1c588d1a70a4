use std::time::Duration;

use encoding_rs::EUC_KR;
use reqwest::Client;

use crate::error::ScraperError;
use crate::extract::{detail_url, extract_detail_fields, merge, parse_listing};
use crate::types::{DetailFields, RawEventRecord};

/// Result of one crawl of the listing page and its detail pages.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// One record per extracted listing row, in page order.
    pub records: Vec<RawEventRecord>,
    /// Rows that passed the acceptance gate but could not be extracted.
    pub rows_skipped: usize,
    /// Detail pages that could not be resolved or fetched. Their records are
    /// still returned, with the detail fields absent.
    pub detail_failures: usize,
}

/// HTTP client for the roadrun.co.kr schedule pages.
///
/// Pages are served as EUC-KR; every body is decoded before parsing. Fetches
/// are single-shot with a request timeout and no retries.
pub struct RoadrunClient {
    client: Client,
    detail_base_url: String,
}

impl RoadrunClient {
    /// Creates a client with the given timeout and `User-Agent`.
    ///
    /// `detail_base_url` is the prefix joined with `view.php?no=<id>`; a
    /// trailing slash is added when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        detail_base_url: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            detail_base_url: format!("{}/", detail_base_url.trim_end_matches('/')),
        })
    }

    /// Fetches `url` and returns the body decoded from EUC-KR.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
    /// - [`ScraperError::Http`] on network failure or timeout.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(decode_euc_kr(&bytes))
    }

    /// Resolves a listing row's detail reference and reads its fields.
    ///
    /// Returns `Ok(None)` when the reference names no detail page.
    ///
    /// # Errors
    ///
    /// Propagates [`RoadrunClient::fetch_page`] failures.
    pub async fn fetch_detail(&self, detail_ref: &str) -> Result<Option<DetailFields>, ScraperError> {
        let Some(url) = detail_url(detail_ref, &self.detail_base_url) else {
            return Ok(None);
        };
        let html = self.fetch_page(&url).await?;
        Ok(Some(extract_detail_fields(&html)))
    }

    /// Crawls the listing page and every referenced detail page, sequentially.
    ///
    /// Only a listing fetch failure is fatal. Malformed rows are counted and
    /// skipped; failed detail pages are counted and leave the fields absent,
    /// which makes normalization drop those records later.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the listing page cannot be fetched.
    pub async fn crawl(&self, listing_url: &str) -> Result<CrawlOutcome, ScraperError> {
        let html = self.fetch_page(listing_url).await?;
        let scan = parse_listing(&html);

        let mut outcome = CrawlOutcome {
            rows_skipped: scan.shape_errors.len(),
            ..CrawlOutcome::default()
        };

        for row in scan.rows {
            let detail = match self.fetch_detail(&row.detail_ref).await {
                Ok(Some(fields)) => fields,
                Ok(None) => {
                    tracing::warn!(title = %row.title, detail_ref = %row.detail_ref, "no detail page reference");
                    outcome.detail_failures += 1;
                    DetailFields::default()
                }
                Err(e) => {
                    tracing::warn!(title = %row.title, error = %e, "detail page fetch failed");
                    outcome.detail_failures += 1;
                    DetailFields::default()
                }
            };
            outcome.records.push(merge(row, detail));
        }

        tracing::info!(
            url = listing_url,
            records = outcome.records.len(),
            rows_skipped = outcome.rows_skipped,
            detail_failures = outcome.detail_failures,
            "crawl complete"
        );

        Ok(outcome)
    }
}

/// Decodes an EUC-KR (CP949) body. Malformed sequences become U+FFFD.
#[must_use]
pub fn decode_euc_kr(bytes: &[u8]) -> String {
    let (text, _, had_errors) = EUC_KR.decode(bytes);
    if had_errors {
        tracing::debug!("replaced malformed EUC-KR sequences while decoding");
    }
    text.into_owned()
}
