//! HTML extraction for the listing and detail pages.
//!
//! Both entry points take the already-decoded page text and return owned
//! values, so no `scraper::Html` (which is `!Send`) is held across an await
//! in [`crate::client`].

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::RowShapeError;
use crate::types::{DetailFields, RawEventRecord, RawListingRow};

const PHONE_ICON: char = '☎';
const HOMEPAGE_ICON: &str = "home.gif";
const REGISTRATION_LABEL: &str = "접수기간";
const EVENT_DATETIME_LABEL: &str = "대회일시";

static DETAIL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(view\.php\?no=[0-9]+)'").expect("valid detail reference regex")
});

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

struct Selectors {
    row: Selector,
    cell: Selector,
    date: Selector,
    day_of_week: Selector,
    anchor: Selector,
    courses: Selector,
    linked_anchor: Selector,
    image: Selector,
    table: Selector,
}

impl Selectors {
    fn new() -> Self {
        let parse = |css: &str| Selector::parse(css).expect("valid constant selector");
        Self {
            row: parse("tr"),
            cell: parse("td"),
            date: parse(r#"font[size="4"]"#),
            day_of_week: parse(r##"font[color="#959595"]"##),
            anchor: parse("a"),
            courses: parse(r##"font[color="#990000"]"##),
            linked_anchor: parse("a[href]"),
            image: parse("img"),
            table: parse("table"),
        }
    }
}

/// Qualifying rows of one listing page plus the rows that qualified but could
/// not be extracted.
#[derive(Debug, Default)]
pub struct ListingScan {
    pub rows: Vec<RawListingRow>,
    pub shape_errors: Vec<RowShapeError>,
}

/// Walks every `<tr>` of a listing page, applying the acceptance gate and
/// extracting qualifying rows.
#[must_use]
pub fn parse_listing(html: &str) -> ListingScan {
    let document = Html::parse_document(html);
    let mut scan = ListingScan::default();

    for row in document.select(&SELECTORS.row) {
        if !row_qualifies(row) {
            tracing::debug!("skipping non-race listing row");
            continue;
        }
        match extract_listing_row(row) {
            Ok(parsed) => scan.rows.push(parsed),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed listing row");
                scan.shape_errors.push(e);
            }
        }
    }

    scan
}

/// Row acceptance gate. A row describes a race when it has at least four
/// cells, the first cell holds a date starting with a digit, and the second
/// holds a non-empty title link.
#[must_use]
pub fn row_qualifies(row: ElementRef<'_>) -> bool {
    let cells: Vec<ElementRef<'_>> = row.select(&SELECTORS.cell).collect();
    if cells.len() < 4 {
        return false;
    }

    let date_ok = first_text(cells[0], &SELECTORS.date)
        .is_some_and(|date| date.starts_with(|c: char| c.is_ascii_digit()));
    let title_ok = first_text(cells[1], &SELECTORS.anchor).is_some_and(|t| !t.is_empty());

    date_ok && title_ok
}

/// Extracts a [`RawListingRow`] from a row that passed [`row_qualifies`].
///
/// # Errors
///
/// Returns [`RowShapeError`] when a sub-element the row needs is absent.
pub fn extract_listing_row(row: ElementRef<'_>) -> Result<RawListingRow, RowShapeError> {
    let cells: Vec<ElementRef<'_>> = row.select(&SELECTORS.cell).collect();
    let [date_cell, title_cell, location_cell, organizer_cell, ..] = cells.as_slice() else {
        return Err(RowShapeError::TooFewCells(cells.len()));
    };

    let date = first_text(*date_cell, &SELECTORS.date)
        .ok_or(RowShapeError::MissingElement("date font"))?;
    let day_of_week = first_text(*date_cell, &SELECTORS.day_of_week)
        .map(|d| d.trim_matches(|c| c == '(' || c == ')').to_string())
        .unwrap_or_default();

    let anchor = title_cell
        .select(&SELECTORS.anchor)
        .next()
        .ok_or(RowShapeError::MissingElement("title link"))?;
    let title = element_text(anchor);
    let detail_ref = anchor
        .value()
        .attr("href")
        .ok_or(RowShapeError::MissingAttribute {
            element: "title link",
            attr: "href",
        })?
        .to_string();

    let courses = first_text(*title_cell, &SELECTORS.courses)
        .map(|text| {
            text.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let location = element_text(*location_cell);

    let organizer_text = element_text(*organizer_cell);
    let (organizer, contact) = match organizer_text.split_once(PHONE_ICON) {
        Some((name, rest)) => (
            name.trim().to_string(),
            rest.split_whitespace().next().unwrap_or_default().to_string(),
        ),
        None => (organizer_text.clone(), String::new()),
    };

    Ok(RawListingRow {
        date,
        day_of_week,
        title,
        courses,
        location,
        organizer,
        contact,
        homepage: homepage_link(*organizer_cell),
        detail_ref,
    })
}

/// Resolves the JavaScript detail reference of a title link into a fetchable
/// URL under `base`. Returns `None` when the reference names no detail page.
#[must_use]
pub fn detail_url(reference: &str, base: &str) -> Option<String> {
    DETAIL_REFERENCE
        .captures(reference)
        .map(|caps| format!("{base}{}", &caps[1]))
}

/// Reads the registration period and event date-time from a detail page.
///
/// Only the first `<table>` is inspected. When a label appears more than once
/// the last occurrence wins.
#[must_use]
pub fn extract_detail_fields(html: &str) -> DetailFields {
    let document = Html::parse_document(html);
    let mut fields = DetailFields::default();

    let Some(table) = document.select(&SELECTORS.table).next() else {
        return fields;
    };

    for row in table.select(&SELECTORS.row) {
        let mut cells = row.select(&SELECTORS.cell);
        let (Some(label), Some(value)) = (cells.next(), cells.next()) else {
            continue;
        };
        let label = element_text(label);
        if label.contains(REGISTRATION_LABEL) {
            fields.registration_period = Some(element_text(value));
        } else if label.contains(EVENT_DATETIME_LABEL) {
            fields.event_datetime = Some(element_text(value));
        }
    }

    fields
}

/// Combines a listing row with its detail-page fields.
#[must_use]
pub fn merge(row: RawListingRow, detail: DetailFields) -> RawEventRecord {
    RawEventRecord::from_parts(row, detail)
}

fn homepage_link(cell: ElementRef<'_>) -> Option<String> {
    cell.select(&SELECTORS.linked_anchor).find_map(|anchor| {
        let has_icon = anchor
            .select(&SELECTORS.image)
            .filter_map(|img| img.value().attr("src"))
            .any(|src| src.contains(HOMEPAGE_ICON));
        if has_icon {
            anchor.value().attr("href").map(str::to_string)
        } else {
            None
        }
    })
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
