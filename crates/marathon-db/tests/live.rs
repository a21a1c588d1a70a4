//! Live integration tests for marathon-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/marathon-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::{NaiveDate, NaiveDateTime};
use marathon_core::{Course, NormalizedEventRecord, Recipient, FULL_DISTANCE_KM, HALF_DISTANCE_KM};
use marathon_db::{
    list_marathons, list_open_registration, list_recipients, save_marathon, upsert_recipient,
    MarathonFilters, RecipientRow, SaveOutcome,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn make_record(title: &str, location: &str, race_date: NaiveDateTime) -> NormalizedEventRecord {
    NormalizedEventRecord {
        title: title.to_string(),
        race_date,
        location: location.to_string(),
        homepage: String::new(),
        organization_name: "주최".to_string(),
        courses: vec![
            Course::new(FULL_DISTANCE_KM, "FULL"),
            Course::new(10.0, "10KM"),
        ],
        registration_start_date: at(2024, 1, 1, 0, 0),
        registration_end_date: at(2024, 2, 1, 0, 0),
    }
}

async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count({table}) failed: {e}"))
}

// ---------------------------------------------------------------------------
// Section 1: save_marathon
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn save_marathon_inserts_record_and_courses(pool: sqlx::PgPool) {
    let record = make_record("서울마라톤", "서울 광화문", at(2024, 3, 17, 8, 0));

    let outcome = save_marathon(&pool, &record).await.expect("save failed");
    assert!(matches!(outcome, SaveOutcome::Inserted(_)));

    let rows = list_marathons(&pool, &MarathonFilters::default())
        .await
        .expect("list failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].clone().into_record(), record);
}

#[sqlx::test(migrations = "../../migrations")]
async fn save_marathon_is_deduplicated_on_title_and_race_date(pool: sqlx::PgPool) {
    let record = make_record("서울마라톤", "서울 광화문", at(2024, 3, 17, 8, 0));

    let first = save_marathon(&pool, &record).await.expect("first save");
    let second = save_marathon(&pool, &record).await.expect("second save");

    assert!(matches!(first, SaveOutcome::Inserted(_)));
    assert_eq!(second, SaveOutcome::AlreadyExists(first.id()));
    assert_eq!(count(&pool, "marathon_info").await, 1);
    assert_eq!(count(&pool, "marathon_course_association").await, 2);

    let other_time = make_record("서울마라톤", "서울 광화문", at(2024, 3, 17, 9, 0));
    let third = save_marathon(&pool, &other_time).await.expect("third save");
    assert!(matches!(third, SaveOutcome::Inserted(_)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn courses_are_reused_by_distance_and_keep_first_name(pool: sqlx::PgPool) {
    let first = make_record("첫 대회", "부산", at(2024, 4, 1, 8, 0));
    let mut second = make_record("둘째 대회", "부산", at(2024, 4, 8, 8, 0));
    second.courses = vec![
        Course::new(10.0, "10K"),
        Course::new(HALF_DISTANCE_KM, "HALF"),
        Course::new(10.0, "10KM"),
    ];

    save_marathon(&pool, &first).await.expect("save first");
    save_marathon(&pool, &second).await.expect("save second");

    assert_eq!(count(&pool, "course").await, 3);

    let filters = MarathonFilters {
        region: Some("부산".to_string()),
        race_from: Some(at(2024, 4, 8, 0, 0)),
        ..MarathonFilters::default()
    };
    let rows = list_marathons(&pool, &filters).await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].course_distances, vec![10.0, HALF_DISTANCE_KM, 10.0]);
    assert_eq!(rows[0].course_names, vec!["10KM", "HALF", "10KM"]);
}

// ---------------------------------------------------------------------------
// Section 2: list_marathons filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_marathons_applies_each_filter(pool: sqlx::PgPool) {
    let mut seoul = make_record("서울 대회", "서울 여의도", at(2024, 3, 3, 8, 0));
    seoul.courses = vec![Course::new(FULL_DISTANCE_KM, "FULL")];
    let mut busan = make_record("부산 대회", "부산 해운대", at(2024, 5, 5, 8, 0));
    busan.courses = vec![Course::new(10.0, "10KM")];
    busan.registration_start_date = at(2024, 3, 1, 0, 0);
    busan.registration_end_date = at(2024, 4, 30, 0, 0);

    save_marathon(&pool, &seoul).await.expect("save seoul");
    save_marathon(&pool, &busan).await.expect("save busan");

    let by_region = list_marathons(
        &pool,
        &MarathonFilters {
            region: Some("부산".to_string()),
            ..MarathonFilters::default()
        },
    )
    .await
    .expect("region");
    assert_eq!(by_region.len(), 1);
    assert_eq!(by_region[0].title, "부산 대회");

    let by_course = list_marathons(
        &pool,
        &MarathonFilters {
            course: Some(FULL_DISTANCE_KM),
            ..MarathonFilters::default()
        },
    )
    .await
    .expect("course");
    assert_eq!(by_course.len(), 1);
    assert_eq!(by_course[0].title, "서울 대회");
    assert_eq!(by_course[0].course_distances, vec![FULL_DISTANCE_KM]);

    let by_range = list_marathons(
        &pool,
        &MarathonFilters {
            race_from: Some(at(2024, 5, 1, 0, 0)),
            race_to: Some(at(2024, 5, 31, 23, 59)),
            ..MarathonFilters::default()
        },
    )
    .await
    .expect("range");
    assert_eq!(by_range.len(), 1);
    assert_eq!(by_range[0].title, "부산 대회");

    let all = list_marathons(&pool, &MarathonFilters::default())
        .await
        .expect("all");
    let titles: Vec<&str> = all.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["서울 대회", "부산 대회"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_open_registration_is_inclusive(pool: sqlx::PgPool) {
    let record = make_record("접수 대회", "대구", at(2024, 3, 10, 8, 0));
    save_marathon(&pool, &record).await.expect("save");

    for now in [at(2024, 1, 1, 0, 0), at(2024, 1, 15, 12, 0), at(2024, 2, 1, 0, 0)] {
        let rows = list_open_registration(&pool, now).await.expect("open");
        assert_eq!(rows.len(), 1, "expected open at {now}");
    }

    let closed = list_open_registration(&pool, at(2024, 2, 1, 0, 1))
        .await
        .expect("closed");
    assert!(closed.is_empty());
}

// ---------------------------------------------------------------------------
// Section 3: recipients
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_recipient_updates_name_on_same_phone(pool: sqlx::PgPool) {
    let first = Recipient {
        name: "홍길동".to_string(),
        phone_number: "+821012345678".to_string(),
    };
    let renamed = Recipient {
        name: "홍길순".to_string(),
        phone_number: "+821012345678".to_string(),
    };
    let other = Recipient {
        name: "김철수".to_string(),
        phone_number: "+821087654321".to_string(),
    };

    let inserted = upsert_recipient(&pool, &first).await.expect("insert");
    let updated = upsert_recipient(&pool, &renamed).await.expect("update");
    upsert_recipient(&pool, &other).await.expect("insert other");

    assert_eq!(inserted.id, updated.id);

    let rows = list_recipients(&pool).await.expect("list");
    let recipients: Vec<Recipient> = rows.into_iter().map(RecipientRow::into_recipient).collect();
    assert_eq!(recipients, vec![renamed, other]);
}
