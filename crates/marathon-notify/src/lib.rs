//! Weekly race notifications and the recipient list they go to.
//!
//! Delivery channels are Twilio SMS and Telegram chat; recipients come from a
//! Google Sheets form-response sheet.

pub mod dispatch;
pub mod error;
mod http;
pub mod message;
pub mod sheets;
pub mod telegram;
pub mod twilio;

pub use dispatch::{notifiers_from_config, notify_all, DispatchReport, Notifier};
pub use error::NotifyError;
pub use message::format_marathon_message;
pub use sheets::{normalize_phone_number, recipients_from_rows, SheetsClient};
pub use telegram::TelegramClient;
pub use twilio::TwilioClient;
