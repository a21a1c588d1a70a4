pub mod app_config;
pub mod config;
pub mod marathons;
pub mod recipients;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, SheetsConfig, TwilioConfig};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_DETAIL_BASE_URL};
pub use marathons::{
    korea_now, month_bounds, Course, NormalizedEventRecord, Region, FULL_DISTANCE_KM,
    HALF_DISTANCE_KM,
};
pub use recipients::Recipient;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown region: {0}")]
    UnknownRegion(String),
}
