use crate::app_config::{AppConfig, Environment, SheetsConfig, TwilioConfig};
use crate::ConfigError;

const DEFAULT_LISTING_URL: &str = "http://www.roadrun.co.kr/schedule/list.php";
/// Default prefix joined with `view.php?no=<id>` to build detail page URLs.
pub const DEFAULT_DETAIL_BASE_URL: &str = "http://www.roadrun.co.kr/schedule/";
const DEFAULT_NOTIFY_TITLE: &str = "이번주 마라톤 접수일정입니다";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset for optional secrets.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("MARATHON_ENV", "development"))?;

    let bind_addr = or_default("MARATHON_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "MARATHON_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("MARATHON_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("MARATHON_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MARATHON_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MARATHON_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("MARATHON_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "MARATHON_SCRAPER_USER_AGENT",
        "marathon-alert/0.1 (schedule-digest)",
    );
    let listing_url = or_default("MARATHON_LISTING_URL", DEFAULT_LISTING_URL);
    let detail_base_url = or_default("MARATHON_DETAIL_BASE_URL", DEFAULT_DETAIL_BASE_URL);
    let notify_title = or_default("MARATHON_NOTIFY_TITLE", DEFAULT_NOTIFY_TITLE);
    let notify_request_timeout_secs = parse_u64("MARATHON_NOTIFY_REQUEST_TIMEOUT_SECS", "30")?;

    let twilio = match (
        optional("TWILIO_ACCOUNT_SID"),
        optional("TWILIO_AUTH_TOKEN"),
        optional("TWILIO_FROM_NUMBER"),
    ) {
        (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioConfig {
            account_sid,
            auth_token,
            from_number,
        }),
        (None, None, None) => None,
        _ => {
            return Err(ConfigError::InvalidEnvVar {
                var: "TWILIO_ACCOUNT_SID".to_string(),
                reason: "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER \
                         must be set together"
                    .to_string(),
            })
        }
    };

    let telegram_bot_token = optional("TELEGRAM_BOT_TOKEN");

    let sheets = match optional("GOOGLE_SHEETS_API_KEY") {
        Some(api_key) => Some(SheetsConfig {
            api_key,
            spreadsheet_id: require("GOOGLE_SHEETS_SPREADSHEET_ID")?,
            range: or_default("GOOGLE_SHEETS_RANGE", "response_sheet"),
        }),
        None => None,
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        listing_url,
        detail_base_url,
        notify_title,
        notify_request_timeout_secs,
        twilio,
        telegram_bot_token,
        sheets,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MARATHON_ENV".to_string(),
            reason: format!("expected development, test or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
