use quip_http::HttpError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub const QUERY_LENGTH_MESSAGE: &str = "Search query must be in a range from 3 to 120 symbols";
pub const FETCH_MESSAGE: &str = "Error during fetching";
pub const SEARCH_MESSAGE: &str = "Joke not found";
pub const CONNECTION_MESSAGE: &str = "Internet connection lost";

/// The closed set of failure kinds the routine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The server signalled a failure other than a bad query.
    FetchError,
    /// The server rejected the search query's shape.
    QueryLengthError,
    /// The search matched nothing.
    SearchError,
    /// The request failed while the host was offline.
    ConnectionError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FetchError => "FetchError",
            ErrorKind::QueryLengthError => "QueryLengthError",
            ErrorKind::SearchError => "SearchError",
            ErrorKind::ConnectionError => "ConnectionError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tagged with its [`ErrorKind`] and a human-readable message.
///
/// ```
/// use quip_fetch::{ClassifiedError, ErrorKind};
///
/// let err = ClassifiedError::search();
/// assert_eq!(err.kind, ErrorKind::SearchError);
/// assert_eq!(err.to_string(), "SearchError: Joke not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn fetch() -> Self {
        Self::new(ErrorKind::FetchError, FETCH_MESSAGE)
    }

    pub fn query_length() -> Self {
        Self::new(ErrorKind::QueryLengthError, QUERY_LENGTH_MESSAGE)
    }

    pub fn search() -> Self {
        Self::new(ErrorKind::SearchError, SEARCH_MESSAGE)
    }

    pub fn connection() -> Self {
        Self::new(ErrorKind::ConnectionError, CONNECTION_MESSAGE)
    }
}

/// Why a fetch produced no data.
///
/// Transport failures are kept as-is while the host is online; the routine
/// only rewrites them into [`ErrorKind::ConnectionError`] when offline.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error(transparent)]
    Classified(#[from] ClassifiedError),
    #[error(transparent)]
    Transport(#[from] HttpError),
}

impl FetchFailure {
    /// The classified kind, if this is not a raw transport error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            FetchFailure::Classified(err) => Some(err.kind),
            FetchFailure::Transport(_) => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        match self {
            FetchFailure::Classified(err) => ErrorReport {
                kind: err.kind.as_str().to_string(),
                message: err.message.clone(),
            },
            FetchFailure::Transport(err) => ErrorReport {
                kind: "TransportError".to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Result of one fetch-and-classify call: data on success, the failure
/// otherwise. Never both, never neither.
pub type Outcome = Result<Value, FetchFailure>;

/// Serializable view of a failure for `{data, error}` consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// The `{ "data": ..., "error": ... }` pair rendered from an [`Outcome`].
///
/// ```
/// use quip_fetch::{ClassifiedError, FetchFailure, Outcome, OutcomePair};
/// use serde_json::json;
///
/// let failed: Outcome = Err(FetchFailure::from(ClassifiedError::fetch()));
/// let pair = OutcomePair::from(&failed);
/// assert_eq!(
///     serde_json::to_value(&pair).unwrap(),
///     json!({"data": null, "error": {"type": "FetchError", "message": "Error during fetching"}})
/// );
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct OutcomePair<'a> {
    pub data: Option<&'a Value>,
    pub error: Option<ErrorReport>,
}

impl<'a> From<&'a Outcome> for OutcomePair<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        match outcome {
            Ok(data) => Self {
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                data: None,
                error: Some(err.report()),
            },
        }
    }
}
