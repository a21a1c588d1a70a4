//! Database operations for `marathon_info`, `course` and their association.

use chrono::{DateTime, NaiveDateTime, Utc};
use marathon_core::{Course, NormalizedEventRecord};
use sqlx::{PgConnection, PgPool};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A `marathon_info` row with its ordered courses aggregated alongside.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MarathonRow {
    pub id: i64,
    pub title: String,
    pub race_date: NaiveDateTime,
    pub location: String,
    pub homepage: String,
    pub organization_name: String,
    pub registration_start_date: NaiveDateTime,
    pub registration_end_date: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    /// Course distances in association order.
    pub course_distances: Vec<f64>,
    /// Course names, parallel to `course_distances`.
    pub course_names: Vec<String>,
}

impl MarathonRow {
    #[must_use]
    pub fn into_record(self) -> NormalizedEventRecord {
        let courses = self
            .course_distances
            .into_iter()
            .zip(self.course_names)
            .map(|(distance, name)| Course::new(distance, name))
            .collect();

        NormalizedEventRecord {
            title: self.title,
            race_date: self.race_date,
            location: self.location,
            homepage: self.homepage,
            organization_name: self.organization_name,
            courses,
            registration_start_date: self.registration_start_date,
            registration_end_date: self.registration_end_date,
        }
    }
}

/// Result of [`save_marathon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(i64),
    /// A race with the same title and race date-time was already stored.
    AlreadyExists(i64),
}

impl SaveOutcome {
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            SaveOutcome::Inserted(id) | SaveOutcome::AlreadyExists(id) => id,
        }
    }
}

/// Optional filters for [`list_marathons`]. `None` disables a filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarathonFilters {
    /// Only races whose registration window contains this instant.
    pub open_at: Option<NaiveDateTime>,
    /// Location prefix, e.g. `"서울"`.
    pub region: Option<String>,
    /// Course distance in kilometres.
    pub course: Option<f64>,
    /// Inclusive lower bound on the race date-time.
    pub race_from: Option<NaiveDateTime>,
    /// Inclusive upper bound on the race date-time.
    pub race_to: Option<NaiveDateTime>,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Stores a normalized record with its courses in one transaction.
///
/// Records are deduplicated on `(title, race_date)`. Courses are reused by
/// distance; the name stored the first time a distance is seen is kept.
/// Any error drops the transaction, which rolls back every write.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn save_marathon(
    pool: &PgPool,
    record: &NormalizedEventRecord,
) -> Result<SaveOutcome, DbError> {
    let mut tx = pool.begin().await?;

    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO marathon_info \
             (title, race_date, location, homepage, organization_name, \
              registration_start_date, registration_end_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (title, race_date) DO NOTHING \
         RETURNING id",
    )
    .bind(&record.title)
    .bind(record.race_date)
    .bind(&record.location)
    .bind(&record.homepage)
    .bind(&record.organization_name)
    .bind(record.registration_start_date)
    .bind(record.registration_end_date)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(marathon_id) = inserted else {
        let existing: i64 = sqlx::query_scalar(
            "SELECT id FROM marathon_info WHERE title = $1 AND race_date = $2",
        )
        .bind(&record.title)
        .bind(record.race_date)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        return Ok(SaveOutcome::AlreadyExists(existing));
    };

    for (position, course) in (0_i32..).zip(&record.courses) {
        let course_id = get_or_create_course(&mut *tx, course).await?;
        sqlx::query(
            "INSERT INTO marathon_course_association (marathon_id, course_id, position) \
             VALUES ($1, $2, $3)",
        )
        .bind(marathon_id)
        .bind(course_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(SaveOutcome::Inserted(marathon_id))
}

async fn get_or_create_course(conn: &mut PgConnection, course: &Course) -> Result<i64, DbError> {
    // The no-op update makes RETURNING yield the existing id on conflict.
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO course (distance, name) VALUES ($1, $2) \
         ON CONFLICT (distance) DO UPDATE SET name = course.name \
         RETURNING id",
    )
    .bind(course.distance)
    .bind(&course.name)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Lists stored races matching every given filter, ordered by race date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_marathons(
    pool: &PgPool,
    filters: &MarathonFilters,
) -> Result<Vec<MarathonRow>, DbError> {
    let rows = sqlx::query_as::<_, MarathonRow>(
        "SELECT m.id, m.title, m.race_date, m.location, m.homepage, m.organization_name, \
                m.registration_start_date, m.registration_end_date, m.created_at, \
                COALESCE(array_agg(c.distance ORDER BY a.position) \
                         FILTER (WHERE c.id IS NOT NULL), '{}') AS course_distances, \
                COALESCE(array_agg(c.name ORDER BY a.position) \
                         FILTER (WHERE c.id IS NOT NULL), '{}') AS course_names \
         FROM marathon_info m \
         LEFT JOIN marathon_course_association a ON a.marathon_id = m.id \
         LEFT JOIN course c ON c.id = a.course_id \
         WHERE ($1::TIMESTAMP IS NULL \
                OR (m.registration_start_date <= $1 AND m.registration_end_date >= $1)) \
           AND ($2::TEXT IS NULL OR m.location LIKE ($2 || '%')) \
           AND ($3::DOUBLE PRECISION IS NULL OR EXISTS ( \
                SELECT 1 FROM marathon_course_association fa \
                JOIN course fc ON fc.id = fa.course_id \
                WHERE fa.marathon_id = m.id AND fc.distance = $3)) \
           AND ($4::TIMESTAMP IS NULL OR m.race_date >= $4) \
           AND ($5::TIMESTAMP IS NULL OR m.race_date <= $5) \
         GROUP BY m.id \
         ORDER BY m.race_date, m.id",
    )
    .bind(filters.open_at)
    .bind(filters.region.as_deref())
    .bind(filters.course)
    .bind(filters.race_from)
    .bind(filters.race_to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Lists races whose registration window contains `now` (inclusive).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_open_registration(
    pool: &PgPool,
    now: NaiveDateTime,
) -> Result<Vec<MarathonRow>, DbError> {
    let filters = MarathonFilters {
        open_at: Some(now),
        ..MarathonFilters::default()
    };
    list_marathons(pool, &filters).await
}
