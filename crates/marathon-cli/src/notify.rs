//! `notify` and `recipients` command handlers.

use marathon_core::{korea_now, AppConfig, NormalizedEventRecord};
use marathon_notify::{format_marathon_message, notifiers_from_config, notify_all, SheetsClient};

/// Import recipients from the configured Google Sheet into the database.
///
/// # Errors
///
/// Returns an error if no sheet is configured, the sheet cannot be read, or
/// a recipient cannot be stored.
pub(crate) async fn run_recipients_import(
    pool: &sqlx::PgPool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let stored = import_recipients(pool, config).await?;
    println!("imported {stored} recipient(s)");
    Ok(())
}

async fn import_recipients(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<usize> {
    let sheets = config.sheets.as_ref().ok_or_else(|| {
        anyhow::anyhow!("GOOGLE_SHEETS_API_KEY and GOOGLE_SHEETS_SPREADSHEET_ID are not set")
    })?;
    let client = SheetsClient::new(sheets, config.notify_request_timeout_secs)?;
    let recipients = client.load_recipients().await?;

    for recipient in &recipients {
        marathon_db::upsert_recipient(pool, recipient).await?;
    }
    Ok(recipients.len())
}

/// Print every stored recipient.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_recipients_list(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let rows = marathon_db::list_recipients(pool).await?;
    if rows.is_empty() {
        println!("no recipients stored; run `recipients import` first");
        return Ok(());
    }

    println!("{:<6}{:<16}PHONE", "ID", "NAME");
    for row in &rows {
        println!("{:<6}{:<16}{}", row.id, row.name, row.phone_number);
    }
    Ok(())
}

/// Send the stored open-registration race list to every stored recipient.
///
/// With `dry_run` the message is printed and nothing is imported or sent.
///
/// # Errors
///
/// Returns an error if the database cannot be read or no notification
/// channel is configured.
pub(crate) async fn run_notify(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    dry_run: bool,
) -> anyhow::Result<()> {
    let races: Vec<_> = marathon_db::list_open_registration(pool, korea_now())
        .await?
        .into_iter()
        .map(marathon_db::MarathonRow::into_record)
        .collect();
    send_races(pool, config, &races, dry_run).await
}

/// Send the batch selected by a crawl that just ran.
///
/// # Errors
///
/// Returns an error if the database cannot be read or no notification
/// channel is configured.
pub(crate) async fn run_notify_batch(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    batch: &[NormalizedEventRecord],
) -> anyhow::Result<()> {
    send_races(pool, config, batch, false).await
}

/// Recipients are refreshed from the sheet first when one is configured; an
/// import failure is logged and the stored list is used.
async fn send_races(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    races: &[NormalizedEventRecord],
    dry_run: bool,
) -> anyhow::Result<()> {
    if !dry_run && config.sheets.is_some() {
        if let Err(e) = import_recipients(pool, config).await {
            tracing::warn!(error = %e, "recipient import failed; using stored recipients");
        }
    }

    let recipients: Vec<_> = marathon_db::list_recipients(pool)
        .await?
        .into_iter()
        .map(marathon_db::RecipientRow::into_recipient)
        .collect();

    if dry_run {
        println!(
            "dry-run: would send {} race(s) to {} recipient(s)",
            races.len(),
            recipients.len()
        );
        println!("{}", format_marathon_message(&config.notify_title, races));
        return Ok(());
    }

    let notifiers = notifiers_from_config(config)?;
    if notifiers.is_empty() {
        anyhow::bail!("no notification channel configured; set TWILIO_* or TELEGRAM_BOT_TOKEN");
    }

    let report = notify_all(&notifiers, &config.notify_title, races, &recipients).await;
    println!(
        "sent {} notification(s), {} failed, {} race(s) announced",
        report.sent,
        report.failed,
        races.len()
    );
    Ok(())
}
