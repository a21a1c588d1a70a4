use marathon_core::{AppConfig, NormalizedEventRecord, Recipient};

use crate::error::NotifyError;
use crate::message::format_marathon_message;
use crate::telegram::TelegramClient;
use crate::twilio::TwilioClient;

/// A configured delivery channel.
#[derive(Debug)]
pub enum Notifier {
    Twilio(TwilioClient),
    /// Uses the recipient's phone number as the chat id.
    Telegram(TelegramClient),
}

impl Notifier {
    #[must_use]
    pub fn channel(&self) -> &'static str {
        match self {
            Notifier::Twilio(_) => "twilio",
            Notifier::Telegram(_) => "telegram",
        }
    }

    /// Delivers `message` to one recipient.
    ///
    /// # Errors
    ///
    /// Returns the channel's [`NotifyError`].
    pub async fn send(&self, recipient: &Recipient, message: &str) -> Result<(), NotifyError> {
        match self {
            Notifier::Twilio(client) => client.send_sms(&recipient.phone_number, message).await,
            Notifier::Telegram(client) => {
                client
                    .send_message(&recipient.phone_number, message)
                    .await
            }
        }
    }
}

/// Builds one notifier per channel configured in `config`.
///
/// # Errors
///
/// Returns [`NotifyError`] if a channel client cannot be constructed.
pub fn notifiers_from_config(config: &AppConfig) -> Result<Vec<Notifier>, NotifyError> {
    let timeout = config.notify_request_timeout_secs;
    let mut notifiers = Vec::new();
    if let Some(twilio) = &config.twilio {
        notifiers.push(Notifier::Twilio(TwilioClient::new(twilio, timeout)?));
    }
    if let Some(token) = &config.telegram_bot_token {
        notifiers.push(Notifier::Telegram(TelegramClient::new(token, timeout)?));
    }
    Ok(notifiers)
}

/// Delivery counts across every channel and recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends the formatted race list to every recipient on every channel.
///
/// Failures are logged and counted per recipient; they never stop the run.
/// Nothing is sent when `records` is empty.
pub async fn notify_all(
    notifiers: &[Notifier],
    title: &str,
    records: &[NormalizedEventRecord],
    recipients: &[Recipient],
) -> DispatchReport {
    let mut report = DispatchReport::default();
    if records.is_empty() {
        tracing::info!("no races to announce; skipping notifications");
        return report;
    }

    let message = format_marathon_message(title, records);
    for notifier in notifiers {
        for recipient in recipients {
            match notifier.send(recipient, &message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        channel = notifier.channel(),
                        recipient = %recipient.name,
                        error = %e,
                        "notification failed"
                    );
                }
            }
        }
    }

    tracing::info!(
        sent = report.sent,
        failed = report.failed,
        races = records.len(),
        "notifications dispatched"
    );
    report
}
