//! Error types for grid harvesting.

use std::time::Duration;

/// Failures raised by a browser session implementation
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("timed out after {0:?} waiting for `{1}`")]
    Timeout(Duration, String),

    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("browser command failed: {0}")]
    Command(String),

    #[error("could not connect to a WebDriver server: {0}")]
    Connect(String),
}

impl From<fantoccini::error::CmdError> for SessionError {
    fn from(error: fantoccini::error::CmdError) -> Self {
        SessionError::Command(error.to_string())
    }
}

/// Failures that abort a whole harvesting run
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Grid rows never appeared on a page expected to have them
    #[error("grid rows matching `{selector}` did not appear within {waited:?}")]
    ExtractionTimeout { selector: String, waited: Duration },

    /// A pager click failed twice in a row
    #[error("pager action `{action}` failed after retry")]
    PagerFault {
        action: String,
        #[source]
        source: SessionError,
    },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("run exceeded its wall-clock budget of {0:?}")]
    Deadline(Duration),

    #[error("run was cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
