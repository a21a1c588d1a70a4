use chrono::NaiveTime;
use marathon_core::NormalizedEventRecord;

use crate::course::classify_courses;
use crate::datetime::{parse_registration_period, parse_time_expression, split_event_datetime};
use crate::error::DropReason;
use crate::types::RawEventRecord;

/// Converts a [`RawEventRecord`] into a [`NormalizedEventRecord`].
///
/// Pure in its input: calling it twice on the same record gives equal output.
/// An unparsable start time falls back to midnight; unrecognized course labels
/// are omitted. Both are logged at `warn`.
///
/// # Errors
///
/// Returns a [`DropReason`] when the registration period or the event date is
/// missing or unparsable. The record cannot be stored without them.
pub fn normalize(raw: &RawEventRecord) -> Result<NormalizedEventRecord, DropReason> {
    let period_text = raw
        .registration_period
        .as_deref()
        .ok_or(DropReason::MissingRegistrationPeriod)?;
    let (registration_start_date, registration_end_date) = parse_registration_period(period_text)
        .map_err(|source| DropReason::BadRegistrationPeriod {
            text: period_text.to_string(),
            source,
        })?;

    let event_text = raw
        .event_datetime
        .as_deref()
        .ok_or(DropReason::MissingEventDatetime)?;
    let (race_day, time_text) =
        split_event_datetime(event_text).map_err(|source| DropReason::BadEventDate {
            text: event_text.to_string(),
            source,
        })?;

    let start_time = parse_time_expression(time_text).unwrap_or_else(|e| {
        tracing::warn!(
            title = %raw.title,
            error = %e,
            "unparsable start time; using midnight"
        );
        NaiveTime::MIN
    });

    Ok(NormalizedEventRecord {
        title: raw.title.clone(),
        race_date: race_day.and_time(start_time),
        location: raw.location.clone(),
        homepage: raw.homepage.clone().unwrap_or_default(),
        organization_name: raw.organizer.clone(),
        courses: classify_courses(&raw.title, &raw.courses),
        registration_start_date,
        registration_end_date,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
