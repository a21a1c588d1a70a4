//! Raw, unparsed shapes scraped from the roadrun.co.kr schedule.
//!
//! ## Observed shape of the listing page (`schedule/list.php`)
//!
//! ### Rows
//! One `<tr>` per race with four `<td>` cells: date, title + courses,
//! location, organizer. Header and separator rows share the same table and
//! are told apart only by the row acceptance gate in [`crate::extract`].
//!
//! ### Date cell
//! `<font size="4">3/1</font>` followed by `<font color="#959595">(금)</font>`.
//! The year is not present; the authoritative date comes from the detail page.
//!
//! ### Title cell
//! The anchor's `href` is a JavaScript popup call that embeds the detail path,
//! e.g. `javascript:open_window('win', 'view.php?no=39123', ...)`. Courses
//! follow in `<font color="#990000">풀, 하프, 10km</font>`.
//!
//! ### Organizer cell
//! `"<organizer> ☎ <phone> <extra>"`, optionally with a homepage anchor that
//! wraps a `home.gif` icon.
//!
//! ## Observed shape of the detail page (`schedule/view.php?no=<id>`)
//! A two-column label/value table. `접수기간` holds
//! `"2024년01월01일 ~ 2024년02월20일"` and `대회일시` holds
//! `"2024년03월01일 출발시간:오전 9시"`. Start-time conventions vary between
//! events; see [`crate::datetime`].

use serde::Serialize;

/// One qualifying row of the listing table, with every field still text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawListingRow {
    /// Month/day text as displayed, e.g. `"3/1"`.
    pub date: String,
    /// Day-of-week with parentheses stripped, e.g. `"금"`.
    pub day_of_week: String,
    pub title: String,
    /// Course labels split on `,` and trimmed. Empty labels are dropped.
    pub courses: Vec<String>,
    pub location: String,
    pub organizer: String,
    /// First whitespace-delimited token after the phone icon.
    pub contact: String,
    pub homepage: Option<String>,
    /// Raw `href` of the title anchor (usually a `javascript:` call).
    pub detail_ref: String,
}

/// Fields captured verbatim from a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailFields {
    pub registration_period: Option<String>,
    pub event_datetime: Option<String>,
}

/// A listing row merged with its detail page. No parsing has happened yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawEventRecord {
    pub title: String,
    pub location: String,
    pub homepage: Option<String>,
    pub organizer: String,
    pub courses: Vec<String>,
    /// `"YYYY년MM월DD일 ~ YYYY년MM월DD일"` when the detail page had it.
    pub registration_period: Option<String>,
    /// `"YYYY년MM월DD일 출발시간:<time>"` when the detail page had it.
    pub event_datetime: Option<String>,
    pub date: String,
    pub day_of_week: String,
    pub contact: String,
}

impl RawEventRecord {
    /// Merges a listing row with the fields scraped from its detail page.
    #[must_use]
    pub fn from_parts(row: RawListingRow, detail: DetailFields) -> Self {
        Self {
            title: row.title,
            location: row.location,
            homepage: row.homepage,
            organizer: row.organizer,
            courses: row.courses,
            registration_period: detail.registration_period,
            event_datetime: detail.event_datetime,
            date: row.date,
            day_of_week: row.day_of_week,
            contact: row.contact,
        }
    }
}
