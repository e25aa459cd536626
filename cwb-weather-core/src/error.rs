use std::{fmt, path::PathBuf, time::Duration};

use thiserror::Error;

/// Which CWB datastore endpoint a fetch failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Observation,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Observation => "observation",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the day/night resolver.
///
/// An unknown location is not an error; see [`crate::moment::resolve_moment`].
#[derive(Debug, Error)]
pub enum MomentError {
    #[error("sun-times table has location '{location}' but no entry for {date}")]
    MissingDateEntry { location: String, date: String },

    #[error("malformed sun-times entry for '{location}' on {date}: {reason}")]
    MalformedEntry {
        location: String,
        date: String,
        reason: String,
    },

    #[error("local time {time} on {date} does not exist in the requested timezone")]
    NonexistentLocalTime { date: String, time: String },
}

/// Failures of a snapshot fetch. Any of these fails the whole refresh.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{endpoint} request failed")]
    Http {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    #[error("failed to parse {endpoint} payload")]
    Payload {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} response has no records for '{query}'")]
    NoRecords { endpoint: Endpoint, query: String },

    #[error("{endpoint} response is missing elements: {}", .missing.join(", "))]
    MalformedElementSet {
        endpoint: Endpoint,
        missing: Vec<&'static str>,
    },

    #[error("{endpoint} element {element} has unusable value '{value}'")]
    InvalidValue {
        endpoint: Endpoint,
        element: &'static str,
        value: String,
    },

    #[error("weather refresh timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// The endpoint at fault, if the failure is attributable to one.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            FetchError::Http { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Payload { endpoint, .. }
            | FetchError::NoRecords { endpoint, .. }
            | FetchError::MalformedElementSet { endpoint, .. }
            | FetchError::InvalidValue { endpoint, .. } => Some(*endpoint),
            FetchError::Timeout(_) => None,
        }
    }
}

/// Failures while loading or building a sun-times table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sun-times JSON")]
    Json(#[from] serde_json::Error),

    #[error("location '{0}' appears more than once")]
    DuplicateLocation(String),

    #[error("location '{location}' lists {date} more than once")]
    DuplicateDate { location: String, date: String },

    #[error("location '{location}' has unparseable date '{value}'")]
    InvalidDate { location: String, value: String },

    #[error("location '{location}' on {date} is missing parameter {parameter}")]
    MissingParameter {
        location: String,
        date: String,
        parameter: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_element_set_lists_missing_names() {
        let err = FetchError::MalformedElementSet {
            endpoint: Endpoint::Forecast,
            missing: vec!["PoP", "CI"],
        };

        assert_eq!(err.to_string(), "forecast response is missing elements: PoP, CI");
        assert_eq!(err.endpoint(), Some(Endpoint::Forecast));
    }

    #[test]
    fn timeout_has_no_endpoint() {
        assert_eq!(FetchError::Timeout(Duration::from_secs(10)).endpoint(), None);
    }

    #[test]
    fn sub_second_timeout_keeps_its_precision() {
        let err = FetchError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "weather refresh timed out after 250ms");
    }
}
