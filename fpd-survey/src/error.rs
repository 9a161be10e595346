/// Error types for the fuel price dashboard
use thiserror::Error;

/// Main error type for loading and querying survey data
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The source table could not be fetched or parsed. Fatal at startup.
    #[error("Survey data unavailable: {0}")]
    DataUnavailable(String),

    /// A filter references a value that is not present in the loaded table
    #[error("Invalid filter selection: {field} '{value}' is not present in the data")]
    InvalidFilterSelection { field: String, value: String },

    /// An aggregation produced zero rows for the requested combination
    #[error("No data for {0}")]
    EmptyAggregate(String),
}

impl DashboardError {
    /// Recoverable errors render a placeholder chart instead of failing the request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DashboardError::DataUnavailable(_))
    }
}

impl From<csv::Error> for DashboardError {
    fn from(e: csv::Error) -> Self {
        DashboardError::DataUnavailable(format!("malformed CSV: {}", e))
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(e: std::io::Error) -> Self {
        DashboardError::DataUnavailable(format!("I/O failure: {}", e))
    }
}

#[cfg(feature = "api")]
impl From<reqwest::Error> for DashboardError {
    fn from(e: reqwest::Error) -> Self {
        DashboardError::DataUnavailable(format!("HTTP request failed: {}", e))
    }
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
