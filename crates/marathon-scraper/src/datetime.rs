//! Parsers for the Korean date and start-time text found on detail pages.
//!
//! Dates follow one fixed pattern (`2024년03월01일`) and are load-bearing for
//! deduplication, so failures are hard. Start times follow whatever convention
//! the event organizer typed in; the time parser is permissive and its failures
//! are soft (see [`parse_time_expression`]).

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::{DateParseError, TimeParseError};

const KOREAN_DATE_FORMAT: &str = "%Y년%m월%d일";

/// Marker separating the date from the start time in `대회일시`.
pub const START_TIME_MARKER: &str = "출발시간:";

/// Substrings removed from a start-time expression before parsing, in order.
const TIME_DECORATORS: [&str; 2] = [START_TIME_MARKER, "출발"];

static KOREAN_DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}년[0-9]{1,2}월[0-9]{1,2}일$").expect("valid Korean date regex")
});
static DIGIT_GROUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit-group regex"));
static HOUR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)시").expect("valid hour regex"));
static MINUTE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)분").expect("valid minute regex"));

/// Parses a `YYYY년MM월DD일` date. Surrounding whitespace is ignored; anything
/// else is an error.
///
/// # Errors
///
/// Returns [`DateParseError`] carrying the input when the text does not match.
pub fn parse_korean_date(text: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = text.trim();
    // chrono skips inner whitespace and accepts a signed year; the shape
    // check keeps the pattern strict.
    if !KOREAN_DATE_SHAPE.is_match(trimmed) {
        return Err(DateParseError {
            input: trimmed.to_string(),
            reason: "expected YYYY년MM월DD일".to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, KOREAN_DATE_FORMAT).map_err(|e| DateParseError {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a free-text start time such as `"0930"`, `"9:30"`, `"오전 9시 30분"`
/// or `"오후 1시"`.
///
/// Rules, first match wins:
/// 1. four ASCII digits: `HHMM`;
/// 2. other all-digit text: hour only;
/// 3. contains `:`: the first two digit groups are hour and minute;
/// 4. contains `시`: the number before `시` is the hour, the number before `분`
///    (if any) the minute, and `오후` moves hours other than 12 into the
///    afternoon.
///
/// Hour 24 is read as 0 in rules 1 and 3 without moving the date.
///
/// # Errors
///
/// Returns [`TimeParseError`] when no rule matches or the result is not a
/// valid time of day. Callers treat this as non-fatal.
pub fn parse_time_expression(text: &str) -> Result<NaiveTime, TimeParseError> {
    let cleaned = clean_time_text(text);
    resolve_hour_minute(&cleaned)
        .and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
        .ok_or(TimeParseError { input: cleaned })
}

/// Splits `"<start> ~ <end>"` and parses both sides as dates at midnight.
///
/// # Errors
///
/// Returns [`DateParseError`] if there are not exactly two sides or either
/// side is not a valid Korean date.
pub fn parse_registration_period(
    text: &str,
) -> Result<(NaiveDateTime, NaiveDateTime), DateParseError> {
    let mut sides = text.split('~');
    let (Some(start), Some(end), None) = (sides.next(), sides.next(), sides.next()) else {
        return Err(DateParseError {
            input: text.trim().to_string(),
            reason: "expected exactly one '~' between start and end dates".to_string(),
        });
    };

    let start = parse_korean_date(start)?.and_time(NaiveTime::MIN);
    let end = parse_korean_date(end)?.and_time(NaiveTime::MIN);
    Ok((start, end))
}

/// Splits `대회일시` text on [`START_TIME_MARKER`], parsing the date portion.
///
/// Returns the parsed date and the raw time portion. When the marker is
/// absent the whole text is treated as the date and the time portion is empty.
///
/// # Errors
///
/// Returns [`DateParseError`] if the date portion is not a valid Korean date.
pub fn split_event_datetime(text: &str) -> Result<(NaiveDate, &str), DateParseError> {
    let (date_part, time_part) = text.split_once(START_TIME_MARKER).unwrap_or((text, ""));
    let date = parse_korean_date(date_part)?;
    Ok((date, time_part.trim()))
}

fn clean_time_text(text: &str) -> String {
    let mut cleaned = text.to_string();
    for decorator in TIME_DECORATORS {
        cleaned = cleaned.replace(decorator, "");
    }
    cleaned.replace(';', ":").trim().to_string()
}

fn resolve_hour_minute(text: &str) -> Option<(u32, u32)> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if text.len() == 4 {
            let hour = text[..2].parse::<u32>().ok()?;
            let minute = text[2..].parse::<u32>().ok()?;
            return Some((wrap_midnight(hour), minute));
        }
        return Some((text.parse::<u32>().ok()?, 0));
    }

    if text.contains(':') {
        let mut groups = DIGIT_GROUPS
            .find_iter(text)
            .map(|m| m.as_str().parse::<u32>());
        let hour = groups.next()?.ok()?;
        let minute = groups.next()?.ok()?;
        return Some((wrap_midnight(hour), minute));
    }

    if text.contains('시') {
        let hour = HOUR_SUFFIX.captures(text)?[1].parse::<u32>().ok()?;
        let minute = match MINUTE_SUFFIX.captures(text) {
            Some(caps) => caps[1].parse::<u32>().ok()?,
            None => 0,
        };
        let hour = if text.contains("오후") && hour != 12 {
            hour.saturating_add(12)
        } else {
            hour
        };
        return Some((hour, minute));
    }

    None
}

fn wrap_midnight(hour: u32) -> u32 {
    if hour == 24 {
        0
    } else {
        hour
    }
}
