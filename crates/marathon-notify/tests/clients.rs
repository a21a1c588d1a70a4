//! Integration tests for the notification and recipient clients using
//! wiremock HTTP mocks.

use chrono::NaiveDate;
use marathon_core::{Course, NormalizedEventRecord, Recipient, SheetsConfig, TwilioConfig};
use marathon_notify::{notify_all, NotifyError, Notifier, SheetsClient, TelegramClient, TwilioClient};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn twilio_config() -> TwilioConfig {
    TwilioConfig {
        account_sid: "AC123".to_string(),
        auth_token: "secret".to_string(),
        from_number: "+15005550006".to_string(),
    }
}

fn recipient(name: &str, phone: &str) -> Recipient {
    Recipient {
        name: name.to_string(),
        phone_number: phone.to_string(),
    }
}

fn race() -> NormalizedEventRecord {
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    NormalizedEventRecord {
        title: "삼일절 마라톤".to_string(),
        race_date: day.and_hms_opt(9, 0, 0).unwrap(),
        location: "서울 여의도공원".to_string(),
        homepage: "http://www.samil-run.kr".to_string(),
        organization_name: "서울달리기협회".to_string(),
        courses: vec![Course::new(10.0, "10KM")],
        registration_start_date: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        registration_end_date: NaiveDate::from_ymd_opt(2024, 2, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Twilio
// ---------------------------------------------------------------------------

#[tokio::test]
async fn twilio_posts_form_with_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
        .and(basic_auth("AC123", "secret"))
        .and(body_string_contains("To=%2B821012345678"))
        .and(body_string_contains("From=%2B15005550006"))
        .and(body_string_contains("Body=hello"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "sid": "SM1", "status": "queued" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = TwilioClient::with_base_url(&twilio_config(), 5, &server.uri()).expect("client");
    client
        .send_sms("+821012345678", "hello")
        .await
        .expect("sms should be accepted");
}

#[tokio::test]
async fn twilio_rejection_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "code": 21211, "message": "Invalid 'To' Phone Number" })),
        )
        .mount(&server)
        .await;

    let client = TwilioClient::with_base_url(&twilio_config(), 5, &server.uri()).expect("client");
    let err = client.send_sms("+82", "hello").await.unwrap_err();

    match err {
        NotifyError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("Invalid 'To' Phone Number"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

#[tokio::test]
async fn telegram_posts_json_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .and(body_json(json!({ "chat_id": "12345", "text": "안녕하세요" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TelegramClient::with_base_url("test-token", 5, &server.uri()).expect("client");
    client
        .send_message("12345", "안녕하세요")
        .await
        .expect("message should be sent");
}

#[tokio::test]
async fn telegram_not_ok_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "description": "chat not found" })),
        )
        .mount(&server)
        .await;

    let client = TelegramClient::with_base_url("test-token", 5, &server.uri()).expect("client");
    let err = client.send_message("1", "hi").await.unwrap_err();
    assert!(
        matches!(err, NotifyError::Api { ref message, .. } if message == "chat not found"),
        "got {err:?}"
    );
}

// ---------------------------------------------------------------------------
// notify_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notify_all_counts_per_recipient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .and(body_string_contains("+821011112222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .and(body_string_contains("+821033334444"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notifiers = vec![Notifier::Telegram(
        TelegramClient::with_base_url("test-token", 5, &server.uri()).expect("client"),
    )];
    let recipients = vec![
        recipient("홍길동", "+821011112222"),
        recipient("김철수", "+821033334444"),
    ];

    let report = notify_all(&notifiers, "이번주 마라톤 접수일정입니다", &[race()], &recipients).await;
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn notify_all_sends_nothing_without_races() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(0)
        .mount(&server)
        .await;

    let notifiers = vec![Notifier::Telegram(
        TelegramClient::with_base_url("test-token", 5, &server.uri()).expect("client"),
    )];
    let report = notify_all(
        &notifiers,
        "제목",
        &[],
        &[recipient("홍길동", "+821011112222")],
    )
    .await;
    assert_eq!(report.sent, 0);
    assert_eq!(report.failed, 0);
}

// ---------------------------------------------------------------------------
// Google Sheets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sheets_load_recipients_reads_value_range() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/response_sheet"))
        .and(query_param("key", "api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "response_sheet!A1:D3",
            "majorDimension": "ROWS",
            "values": [
                ["타임스탬프", "이름", "코스", "전화번호"],
                ["2024. 3. 1 오전 9:00:00", "홍길동", "하프", "010-1234-5678"],
                ["2024. 3. 2 오전 9:00:00", "김철수", "풀", "010-8765-4321"]
            ]
        })))
        .mount(&server)
        .await;

    let config = SheetsConfig {
        api_key: "api-key".to_string(),
        spreadsheet_id: "sheet-1".to_string(),
        range: "response_sheet".to_string(),
    };
    let client = SheetsClient::with_base_url(&config, 5, &server.uri()).expect("client");
    let recipients = client.load_recipients().await.expect("recipients");

    assert_eq!(
        recipients,
        vec![
            recipient("홍길동", "+821012345678"),
            recipient("김철수", "+821087654321"),
        ]
    );
}

#[tokio::test]
async fn sheets_empty_range_has_no_recipients() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "range": "response_sheet", "majorDimension": "ROWS" })),
        )
        .mount(&server)
        .await;

    let config = SheetsConfig {
        api_key: "api-key".to_string(),
        spreadsheet_id: "sheet-1".to_string(),
        range: "response_sheet".to_string(),
    };
    let client = SheetsClient::with_base_url(&config, 5, &server.uri()).expect("client");
    assert!(client.load_recipients().await.expect("recipients").is_empty());
}
