//! Scraping and normalization of the roadrun.co.kr marathon schedule.
//!
//! [`RoadrunClient::crawl`] fetches the listing and detail pages and returns
//! [`RawEventRecord`]s; [`pipeline::run`] turns those into
//! [`marathon_core::NormalizedEventRecord`]s and picks the notification batch.

pub mod client;
pub mod course;
pub mod datetime;
pub mod error;
pub mod extract;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use client::{decode_euc_kr, CrawlOutcome, RoadrunClient};
pub use course::{classify_course, classify_courses, CourseClassification};
pub use datetime::{
    parse_korean_date, parse_registration_period, parse_time_expression, split_event_datetime,
};
pub use error::{DateParseError, DropReason, RowShapeError, ScraperError, TimeParseError};
pub use extract::{
    detail_url, extract_detail_fields, extract_listing_row, merge, parse_listing, row_qualifies,
    ListingScan,
};
pub use filter::{week_bounds, ListingFilter};
pub use normalize::normalize;
pub use pipeline::{DroppedRecord, PipelineOutcome};
pub use types::{DetailFields, RawEventRecord, RawListingRow};
