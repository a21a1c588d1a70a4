use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

/// A listing row that passed the acceptance gate but is missing markup the
/// extractor needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowShapeError {
    #[error("row has {0} cells, expected at least 4")]
    TooFewCells(usize),

    #[error("row is missing {0}")]
    MissingElement(&'static str),

    #[error("{element} has no {attr} attribute")]
    MissingAttribute {
        element: &'static str,
        attr: &'static str,
    },
}

/// Hard failure parsing a `YYYY년MM월DD일` date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid Korean date {input:?}: {reason}")]
pub struct DateParseError {
    pub input: String,
    pub reason: String,
}

/// Soft failure parsing a start-time expression. Callers fall back to midnight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized start time {input:?}")]
pub struct TimeParseError {
    pub input: String,
}

/// Why a raw record could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("missing registration period")]
    MissingRegistrationPeriod,

    #[error("bad registration period {text:?}: {source}")]
    BadRegistrationPeriod {
        text: String,
        #[source]
        source: DateParseError,
    },

    #[error("missing event date-time")]
    MissingEventDatetime,

    #[error("bad event date {text:?}: {source}")]
    BadEventDate {
        text: String,
        #[source]
        source: DateParseError,
    },
}
