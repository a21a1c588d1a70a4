use chrono::NaiveDateTime;
use marathon_core::NormalizedEventRecord;

use crate::error::DropReason;
use crate::filter::ListingFilter;
use crate::normalize::normalize;
use crate::types::RawEventRecord;

/// A raw record that failed normalization, kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRecord {
    pub title: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutcome {
    /// Every record that normalized, in source order. All of these are stored.
    pub records: Vec<NormalizedEventRecord>,
    /// The subset of `records` accepted by the filter, in source order.
    pub batch: Vec<NormalizedEventRecord>,
    pub dropped: Vec<DroppedRecord>,
}

/// Normalizes every raw record and selects the notification batch.
///
/// A failing record never affects the others.
#[must_use]
pub fn run(raws: &[RawEventRecord], filter: ListingFilter, now: NaiveDateTime) -> PipelineOutcome {
    let mut outcome = PipelineOutcome::default();

    for raw in raws {
        match normalize(raw) {
            Ok(record) => {
                if filter.accepts(&record, now) {
                    outcome.batch.push(record.clone());
                }
                outcome.records.push(record);
            }
            Err(reason) => {
                tracing::warn!(
                    title = %raw.title,
                    registration_period = ?raw.registration_period,
                    event_datetime = ?raw.event_datetime,
                    error = %reason,
                    "dropping record"
                );
                outcome.dropped.push(DroppedRecord {
                    title: raw.title.clone(),
                    reason,
                });
            }
        }
    }

    tracing::info!(
        normalized = outcome.records.len(),
        batch = outcome.batch.len(),
        dropped = outcome.dropped.len(),
        "normalization complete"
    );

    outcome
}
