use chrono::{Datelike, Days, Months, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Canonical distance of a half marathon, in kilometres.
pub const HALF_DISTANCE_KM: f64 = 21.0975;
/// Canonical distance of a full marathon, in kilometres.
pub const FULL_DISTANCE_KM: f64 = 42.195;

/// A race distance category attached to an event, e.g. `HALF` or `10KM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Canonical distance in kilometres.
    pub distance: f64,
    /// `"HALF"`, `"FULL"`, or the uppercased source label such as `"10KM"`.
    pub name: String,
}

impl Course {
    #[must_use]
    pub fn new(distance: f64, name: impl Into<String>) -> Self {
        Self {
            distance,
            name: name.into(),
        }
    }
}

/// A race listing normalized for storage and querying.
///
/// Timestamps are naive local (KST) wall-clock values, exactly as the source
/// site publishes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEventRecord {
    pub title: String,
    /// Race date combined with the start time (midnight when the start time
    /// could not be parsed).
    pub race_date: NaiveDateTime,
    pub location: String,
    /// Empty when the listing carried no homepage link.
    pub homepage: String,
    pub organization_name: String,
    /// Recognized courses in source order. Duplicates are kept.
    pub courses: Vec<Course>,
    pub registration_start_date: NaiveDateTime,
    pub registration_end_date: NaiveDateTime,
}

impl NormalizedEventRecord {
    /// Course distances in kilometres, in source order.
    #[must_use]
    pub fn course_distances(&self) -> Vec<f64> {
        self.courses.iter().map(|c| c.distance).collect()
    }

    /// Returns `true` if `now` falls inside the registration window (inclusive).
    #[must_use]
    pub fn in_registration_period(&self, now: NaiveDateTime) -> bool {
        self.registration_start_date <= now && now <= self.registration_end_date
    }
}

/// Region names used by the listing site's location column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "서울")]
    Seoul,
    #[serde(rename = "경기")]
    Gyeonggi,
    #[serde(rename = "인천")]
    Incheon,
    #[serde(rename = "강원")]
    Gangwon,
    #[serde(rename = "충북")]
    Chungbuk,
    #[serde(rename = "충남")]
    Chungnam,
    #[serde(rename = "대전")]
    Daejeon,
    #[serde(rename = "전북")]
    Jeonbuk,
    #[serde(rename = "전남")]
    Jeonnam,
    #[serde(rename = "광주")]
    Gwangju,
    #[serde(rename = "경북")]
    Gyeongbuk,
    #[serde(rename = "대구")]
    Daegu,
    #[serde(rename = "경남")]
    Gyeongnam,
    #[serde(rename = "부산")]
    Busan,
    #[serde(rename = "울산")]
    Ulsan,
    #[serde(rename = "제주")]
    Jeju,
    #[serde(rename = "해외")]
    Overseas,
    #[serde(rename = "기타")]
    Other,
}

impl Region {
    pub const ALL: [Region; 18] = [
        Region::Seoul,
        Region::Gyeonggi,
        Region::Incheon,
        Region::Gangwon,
        Region::Chungbuk,
        Region::Chungnam,
        Region::Daejeon,
        Region::Jeonbuk,
        Region::Jeonnam,
        Region::Gwangju,
        Region::Gyeongbuk,
        Region::Daegu,
        Region::Gyeongnam,
        Region::Busan,
        Region::Ulsan,
        Region::Jeju,
        Region::Overseas,
        Region::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Seoul => "서울",
            Region::Gyeonggi => "경기",
            Region::Incheon => "인천",
            Region::Gangwon => "강원",
            Region::Chungbuk => "충북",
            Region::Chungnam => "충남",
            Region::Daejeon => "대전",
            Region::Jeonbuk => "전북",
            Region::Jeonnam => "전남",
            Region::Gwangju => "광주",
            Region::Gyeongbuk => "경북",
            Region::Daegu => "대구",
            Region::Gyeongnam => "경남",
            Region::Busan => "부산",
            Region::Ulsan => "울산",
            Region::Jeju => "제주",
            Region::Overseas => "해외",
            Region::Other => "기타",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.as_str() == trimmed)
            .ok_or_else(|| CoreError::UnknownRegion(trimmed.to_string()))
    }
}

/// Hours Korea Standard Time is ahead of UTC. Korea observes no DST.
const KST_OFFSET_HOURS: i64 = 9;

/// Current wall-clock time in Korea, the zone every stored date-time is in.
#[must_use]
pub fn korea_now() -> NaiveDateTime {
    Utc::now().naive_utc() + TimeDelta::hours(KST_OFFSET_HOURS)
}

/// First instant (`00:00:00`) and last second (`23:59:59`) of the month
/// containing `now`.
#[must_use]
pub fn month_bounds(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let date = now.date();
    let first = date - Days::new(u64::from(date.day0()));
    let next_first = first + Months::new(1);
    (
        first.and_time(NaiveTime::MIN),
        next_first.and_time(NaiveTime::MIN) - TimeDelta::seconds(1),
    )
}
