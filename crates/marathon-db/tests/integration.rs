//! Offline unit tests for marathon-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::{NaiveDate, Utc};
use marathon_core::{AppConfig, Environment};
use marathon_db::{MarathonFilters, MarathonRow, PoolConfig, RecipientRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        listing_url: "http://localhost/schedule/list.php".to_string(),
        detail_base_url: "http://localhost/schedule/".to_string(),
        notify_title: "title".to_string(),
        notify_request_timeout_secs: 30,
        twilio: None,
        telegram_bot_token: None,
        sheets: None,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`MarathonRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn marathon_row_has_expected_fields() {
    let day = NaiveDate::from_ymd_opt(2024, 4, 6).unwrap();
    let row = MarathonRow {
        id: 1_i64,
        title: "경주 벚꽃 마라톤".to_string(),
        race_date: day.and_hms_opt(8, 30, 0).unwrap(),
        location: "경북 경주시".to_string(),
        homepage: String::new(),
        organization_name: "경주시체육회".to_string(),
        registration_start_date: day.and_hms_opt(0, 0, 0).unwrap(),
        registration_end_date: day.and_hms_opt(0, 0, 0).unwrap(),
        created_at: Utc::now(),
        course_distances: vec![21.0975],
        course_names: vec!["HALF".to_string()],
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.course_distances, vec![21.0975]);
    let record = row.into_record();
    assert_eq!(record.course_distances(), vec![21.0975]);
}

/// Compile-time smoke test: confirm that [`RecipientRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn recipient_row_has_expected_fields() {
    let row = RecipientRow {
        id: 3_i64,
        name: "홍길동".to_string(),
        phone_number: "+821012345678".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let recipient = row.into_recipient();
    assert_eq!(recipient.name, "홍길동");
    assert_eq!(recipient.phone_number, "+821012345678");
}

#[test]
fn marathon_filters_default_to_none() {
    let filters = MarathonFilters::default();
    assert!(filters.open_at.is_none());
    assert!(filters.region.is_none());
    assert!(filters.course.is_none());
    assert!(filters.race_from.is_none());
    assert!(filters.race_to.is_none());
}
