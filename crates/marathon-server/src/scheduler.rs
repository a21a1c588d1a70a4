//! Background job scheduler.
//!
//! Registers the weekly crawl-and-notify job at server startup.

use std::sync::Arc;

use marathon_core::{korea_now, AppConfig, Recipient};
use marathon_notify::{notifiers_from_config, notify_all, DispatchReport, Notifier, SheetsClient};
use marathon_scraper::{pipeline, ListingFilter, PipelineOutcome, RoadrunClient};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every Monday at 00:00 UTC, which is 09:00 in Korea.
const WEEKLY_CRON: &str = "0 0 0 * * Mon";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_weekly_job(&scheduler, pool, config).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_weekly_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(WEEKLY_CRON, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting weekly marathon run");
            run_weekly_job(&pool, &config).await;
            tracing::info!("scheduler: weekly marathon run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Crawls the schedule, stores every normalized race, refreshes recipients
/// and announces this run's notification batch.
///
/// Each stage logs its own failures. Recipients are still refreshed after a
/// failed crawl, but nothing is announced without a fresh batch.
async fn run_weekly_job(pool: &PgPool, config: &AppConfig) {
    let outcome = collect_marathons(pool, config).await;
    import_recipients(pool, config).await;
    match outcome {
        Some(outcome) => notify_recipients(pool, config, &outcome).await,
        None => tracing::warn!("scheduler: no fresh batch; skipping notifications"),
    }
}

async fn collect_marathons(pool: &PgPool, config: &AppConfig) -> Option<PipelineOutcome> {
    let client = match RoadrunClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        &config.detail_base_url,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to build scraper client");
            return None;
        }
    };

    let crawl = match client.crawl(&config.listing_url).await {
        Ok(crawl) => crawl,
        Err(e) => {
            tracing::error!(url = %config.listing_url, error = %e, "scheduler: listing crawl failed");
            return None;
        }
    };

    let outcome = pipeline::run(&crawl.records, ListingFilter::default(), korea_now());

    let mut inserted = 0_usize;
    let mut existing = 0_usize;
    for record in &outcome.records {
        match marathon_db::save_marathon(pool, record).await {
            Ok(marathon_db::SaveOutcome::Inserted(_)) => inserted += 1,
            Ok(marathon_db::SaveOutcome::AlreadyExists(_)) => existing += 1,
            Err(e) => {
                tracing::error!(title = %record.title, error = %e, "scheduler: failed to save marathon");
            }
        }
    }

    tracing::info!(
        inserted,
        existing,
        dropped = outcome.dropped.len(),
        batch = outcome.batch.len(),
        "scheduler: marathons stored"
    );
    Some(outcome)
}

async fn import_recipients(pool: &PgPool, config: &AppConfig) {
    let Some(sheets) = &config.sheets else {
        tracing::debug!("scheduler: no Google Sheets source configured; skipping import");
        return;
    };

    let client = match SheetsClient::new(sheets, config.notify_request_timeout_secs) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to build Sheets client");
            return;
        }
    };
    let recipients = match client.load_recipients().await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: recipient import failed");
            return;
        }
    };

    for recipient in &recipients {
        if let Err(e) = marathon_db::upsert_recipient(pool, recipient).await {
            tracing::warn!(recipient = %recipient.name, error = %e, "scheduler: failed to store recipient");
        }
    }
}

async fn notify_recipients(pool: &PgPool, config: &AppConfig, outcome: &PipelineOutcome) {
    let notifiers = match notifiers_from_config(config) {
        Ok(n) if n.is_empty() => {
            tracing::warn!("scheduler: no notification channel configured; skipping");
            return;
        }
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to build notifiers");
            return;
        }
    };

    let recipients = match marathon_db::list_recipients(pool).await {
        Ok(rows) => rows
            .into_iter()
            .map(marathon_db::RecipientRow::into_recipient)
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load recipients");
            return;
        }
    };

    let report = announce(&notifiers, &config.notify_title, outcome, &recipients).await;
    tracing::info!(
        sent = report.sent,
        failed = report.failed,
        "scheduler: notifications sent"
    );
}

/// Sends the filtered batch of `outcome`. Stored races outside the batch
/// are never announced.
async fn announce(
    notifiers: &[Notifier],
    title: &str,
    outcome: &PipelineOutcome,
    recipients: &[Recipient],
) -> DispatchReport {
    notify_all(notifiers, title, &outcome.batch, recipients).await
}
