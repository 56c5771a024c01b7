use thiserror::Error;

/// Error types for series fetches against the data provider
#[derive(Error, Debug)]
pub enum DataError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("no data available for {series} between {start} and {end}")]
    NoData {
        series: String,
        start: String,
        end: String,
    },
}

/// Result type for series fetches
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Whether this error means "the series had nothing for the window"
    /// rather than a broken fetch. The two are degraded differently.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, DataError::NoData { .. })
    }

    /// Create a parse error with context
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        DataError::Parse {
            message: message.into(),
        }
    }
}
