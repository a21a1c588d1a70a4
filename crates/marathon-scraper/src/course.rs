use std::sync::LazyLock;

use marathon_core::{Course, FULL_DISTANCE_KM, HALF_DISTANCE_KM};
use regex::Regex;

static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit-run regex"));

/// Outcome of mapping one free-text course label onto a canonical course.
#[derive(Debug, Clone, PartialEq)]
pub enum CourseClassification {
    Recognized(Course),
    Unrecognized,
}

impl CourseClassification {
    #[must_use]
    pub fn into_course(self) -> Option<Course> {
        match self {
            CourseClassification::Recognized(course) => Some(course),
            CourseClassification::Unrecognized => None,
        }
    }
}

/// Classifies a course label such as `"하프"`, `"풀"` or `"10km"`.
///
/// Matching is case-insensitive after trimming. `...KM` labels take the first
/// run of digits as the distance and keep the uppercased label as the name.
#[must_use]
pub fn classify_course(label: &str) -> CourseClassification {
    let normalized = label.trim().to_uppercase();

    match normalized.as_str() {
        "하프" | "HALF" => CourseClassification::Recognized(Course::new(HALF_DISTANCE_KM, "HALF")),
        "풀" | "FULL" => CourseClassification::Recognized(Course::new(FULL_DISTANCE_KM, "FULL")),
        _ if normalized.ends_with("KM") => LEADING_DIGITS
            .find(&normalized)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map_or(CourseClassification::Unrecognized, |km| {
                CourseClassification::Recognized(Course::new(f64::from(km), normalized.clone()))
            }),
        _ => CourseClassification::Unrecognized,
    }
}

/// Classifies every label, keeping recognized courses in source order.
///
/// Unrecognized labels are omitted and logged at `warn`. Duplicates are kept.
pub fn classify_courses<S: AsRef<str>>(title: &str, labels: &[S]) -> Vec<Course> {
    labels
        .iter()
        .filter_map(|label| {
            let label = label.as_ref();
            let course = classify_course(label).into_course();
            if course.is_none() {
                tracing::warn!(title, label, "unrecognized course label; omitting");
            }
            course
        })
        .collect()
}
