//! Error types for the geofeed viewer services.

use thiserror::Error;

/// Result type alias using FeedError.
pub type FeedResult<T> = Result<T, FeedError>;

/// Primary error type for feed operations.
///
/// Every variant is recoverable at the poll-cycle boundary: the scheduler
/// records the display string and keeps polling.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Dataset id is in neither the external-realtime nor the
    /// backend-component endpoint table.
    #[error("Unknown data source: {0}")]
    UnknownSource(String),

    /// Non-success HTTP status or transport failure.
    #[error("Fetch failed for '{dataset}': {message}")]
    Fetch { dataset: String, message: String },

    /// Response body matched none of the known wire shapes.
    #[error("Malformed response from '{dataset}': {message}")]
    MalformedResponse { dataset: String, message: String },
}

impl FeedError {
    /// User-visible message for the status display.
    pub fn user_message(&self) -> String {
        match self {
            FeedError::UnknownSource(id) => format!("Unknown data source '{}'", id),
            FeedError::Fetch { dataset, .. } => {
                format!("Could not load live data for '{}'", dataset)
            }
            FeedError::MalformedResponse { dataset, .. } => {
                format!("Unexpected response format from '{}'", dataset)
            }
        }
    }

    /// Whether the next poll cycle may succeed without operator action.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FeedError::UnknownSource(_))
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::MalformedResponse {
            dataset: String::new(),
            message: format!("JSON error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_names_the_dataset() {
        let err = FeedError::Fetch {
            dataset: "stib".to_string(),
            message: "503 Service Unavailable".to_string(),
        };
        assert!(err.user_message().contains("stib"));
    }

    #[test]
    fn test_unknown_source_is_not_transient() {
        assert!(!FeedError::UnknownSource("x".to_string()).is_transient());
        assert!(FeedError::Fetch {
            dataset: "sncb".to_string(),
            message: "timeout".to_string(),
        }
        .is_transient());
    }
}
