//! Database operations for the `recipient` table.

use chrono::{DateTime, Utc};
use marathon_core::Recipient;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `recipient` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipientRow {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipientRow {
    #[must_use]
    pub fn into_recipient(self) -> Recipient {
        Recipient {
            name: self.name,
            phone_number: self.phone_number,
        }
    }
}

/// Inserts a recipient, or updates the name of the one with the same phone
/// number. Returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_recipient(pool: &PgPool, recipient: &Recipient) -> Result<RecipientRow, DbError> {
    let row = sqlx::query_as::<_, RecipientRow>(
        "INSERT INTO recipient (name, phone_number) VALUES ($1, $2) \
         ON CONFLICT (phone_number) DO UPDATE \
           SET name = EXCLUDED.name, updated_at = NOW() \
         RETURNING id, name, phone_number, created_at, updated_at",
    )
    .bind(&recipient.name)
    .bind(&recipient.phone_number)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns every recipient, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recipients(pool: &PgPool) -> Result<Vec<RecipientRow>, DbError> {
    let rows = sqlx::query_as::<_, RecipientRow>(
        "SELECT id, name, phone_number, created_at, updated_at \
         FROM recipient \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
