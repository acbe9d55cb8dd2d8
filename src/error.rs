//! Error types for stock_sync

use thiserror::Error;

/// Unified error type for stock_sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Request exceeded the client deadline
    #[error("Request timed out: {0}")]
    Timeout(reqwest::Error),
    /// Could not reach the remote host
    #[error("Connection error: {0}")]
    Connection(reqwest::Error),
    /// Any other transport failure
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Feed quantity that is neither a sentinel nor an integer
    #[error("Malformed quantity for offer {offer_id}: {value:?}")]
    MalformedQuantity { offer_id: String, value: String },
    /// Feed price without a decimal-point-delimited integer part
    #[error("Malformed price: {0:?}")]
    MalformedPrice(String),
    /// Listing endpoint kept paging without making progress
    #[error("Pagination stalled after {pages} page(s) with {collected} offer(s): {reason}")]
    PaginationStalled {
        pages: usize,
        collected: usize,
        reason: String,
    },
    /// Feed file could not be parsed as CSV
    #[error("Feed error: {0}")]
    Feed(#[from] csv::Error),
    /// Feed archive could not be unpacked
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// Feed workbook could not be read
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] calamine::Error),
    /// Feed is readable but not laid out as expected
    #[error("Feed layout error: {0}")]
    FeedLayout(String),
    /// Update accepted over HTTP but rejected in the response body
    #[error("{marketplace}: {what} update rejected with status {status}")]
    Rejected {
        marketplace: String,
        what: String,
        status: String,
    },
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used for reporting and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Timeout,
    Connection,
    Config,
    Other,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::Timeout(_) => ErrorCategory::Timeout,
            SyncError::Connection(_) => ErrorCategory::Connection,
            SyncError::Config(_) => ErrorCategory::Config,
            _ => ErrorCategory::Other,
        }
    }
}

impl ErrorCategory {
    /// Process exit code for a run that failed with this category
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Other => 1,
            ErrorCategory::Config => 2,
            ErrorCategory::Timeout => 3,
            ErrorCategory::Connection => 4,
        }
    }

    /// Human-readable summary printed when a run stops
    pub fn describe(self) -> &'static str {
        match self {
            ErrorCategory::Timeout => "Request timed out, sync aborted",
            ErrorCategory::Connection => "Connection failed, sync aborted",
            ErrorCategory::Config => "Invalid configuration",
            ErrorCategory::Other => "Sync failed",
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout(err)
        } else if err.is_connect() {
            SyncError::Connection(err)
        } else {
            SyncError::Network(err)
        }
    }
}

/// Result alias for stock_sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_distinct_exit_codes() {
        let codes = [
            ErrorCategory::Timeout.exit_code(),
            ErrorCategory::Connection.exit_code(),
            ErrorCategory::Config.exit_code(),
            ErrorCategory::Other.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn malformed_input_is_generic_category() {
        let err = SyncError::MalformedPrice("abc".to_string());
        assert_eq!(err.category(), ErrorCategory::Other);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn config_error_category() {
        let err = SyncError::Config("SELLER_TOKEN is not set".to_string());
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.category().exit_code(), 2);
    }
}
