//! `crawl` command handlers.

use marathon_core::{korea_now, AppConfig, NormalizedEventRecord};
use marathon_scraper::{pipeline, ListingFilter, PipelineOutcome, RoadrunClient};

/// Crawls `url` (or the configured listing URL) and normalizes every row.
async fn crawl_and_normalize(
    config: &AppConfig,
    url: Option<&str>,
) -> anyhow::Result<PipelineOutcome> {
    let listing_url = url.unwrap_or(&config.listing_url);
    let client = RoadrunClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        &config.detail_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build scraper client: {e}"))?;

    let crawl = client.crawl(listing_url).await?;
    if crawl.rows_skipped > 0 || crawl.detail_failures > 0 {
        println!(
            "warning: {} malformed row(s) skipped, {} detail page(s) unavailable",
            crawl.rows_skipped, crawl.detail_failures
        );
    }

    Ok(pipeline::run(
        &crawl.records,
        ListingFilter::default(),
        korea_now(),
    ))
}

/// Crawl and print what would be stored and announced, without a database.
///
/// # Errors
///
/// Returns an error if the listing page cannot be fetched.
pub(crate) async fn run_crawl_dry_run(config: &AppConfig, url: Option<&str>) -> anyhow::Result<()> {
    let outcome = crawl_and_normalize(config, url).await?;

    println!("dry-run: {} normalized race(s)", outcome.records.len());
    for record in &outcome.records {
        println!("  {}", record_line(record));
    }

    println!("dry-run: notification batch of {}", outcome.batch.len());
    for record in &outcome.batch {
        println!("  {}", record_line(record));
    }

    for dropped in &outcome.dropped {
        println!("dropped: {} ({})", dropped.title, dropped.reason);
    }
    Ok(())
}

/// Crawl and store every normalized race.
///
/// A failed save is logged and counted; the remaining races are still stored.
/// The outcome is returned so `run` can announce its batch.
///
/// # Errors
///
/// Returns an error if the listing page cannot be fetched.
pub(crate) async fn run_crawl(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    url: Option<&str>,
) -> anyhow::Result<PipelineOutcome> {
    let outcome = crawl_and_normalize(config, url).await?;

    let mut inserted = 0_usize;
    let mut existing = 0_usize;
    let mut failed = 0_usize;
    for record in &outcome.records {
        match marathon_db::save_marathon(pool, record).await {
            Ok(marathon_db::SaveOutcome::Inserted(_)) => inserted += 1,
            Ok(marathon_db::SaveOutcome::AlreadyExists(_)) => existing += 1,
            Err(e) => {
                failed += 1;
                tracing::error!(title = %record.title, error = %e, "failed to save marathon");
            }
        }
    }

    println!(
        "stored {inserted} new race(s), {existing} already known, {failed} failed, {} dropped",
        outcome.dropped.len()
    );
    Ok(outcome)
}

fn record_line(record: &NormalizedEventRecord) -> String {
    let courses = record
        .courses
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}  {}  {}  [{}]  접수 {} ~ {}",
        record.race_date.format("%Y-%m-%d %H:%M"),
        record.title,
        record.location,
        courses,
        record.registration_start_date.format("%Y-%m-%d"),
        record.registration_end_date.format("%Y-%m-%d"),
    )
}
