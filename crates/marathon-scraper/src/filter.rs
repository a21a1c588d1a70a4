use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use marathon_core::NormalizedEventRecord;

/// Decides which normalized records belong in the notification batch.
///
/// The clock is always injected so the decision is reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingFilter {
    AcceptAll,
    /// Races this ISO week, or races whose registration is open right now.
    #[default]
    WeeklyOrOpenRegistration,
}

impl ListingFilter {
    #[must_use]
    pub fn accepts(self, record: &NormalizedEventRecord, now: NaiveDateTime) -> bool {
        match self {
            ListingFilter::AcceptAll => true,
            ListingFilter::WeeklyOrOpenRegistration => {
                let (start, end) = week_bounds(now);
                let this_week = start <= record.race_date && record.race_date <= end;
                this_week || record.in_registration_period(now)
            }
        }
    }
}

/// Monday 00:00:00 through Sunday 23:59:59.999999 of the week containing `now`.
#[must_use]
pub fn week_bounds(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let days_from_monday = i64::from(now.weekday().num_days_from_monday());
    let start = (now.date() - Duration::days(days_from_monday)).and_time(NaiveTime::MIN);
    let end = start + Duration::days(7) - Duration::microseconds(1);
    (start, end)
}
