//! Error types for fidemo-core

use thiserror::Error;

/// Main error type for the fidemo-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Cache database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Live Timeline API error
    #[error("timeline API error: {0}")]
    Http(String),

    /// Session not found in the dataset
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Failure injected on purpose by the demo adapter
    #[error("simulated server error (demo error injection): {0}")]
    SimulatedFailure(String),

    /// Read issued before the dataset was loaded or generated
    #[error("demo dataset not loaded")]
    NotLoaded,

    /// Random choice from an empty pool; holds the operation name
    #[error("cannot {0} from an empty pool")]
    EmptyChoice(&'static str),
}

impl Error {
    /// True when the error was injected by the demo adapter rather than
    /// produced by a real fault.
    pub fn is_simulated(&self) -> bool {
        matches!(self, Error::SimulatedFailure(_))
    }
}

/// Result type alias for fidemo-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_errors_are_distinguishable() {
        let injected = Error::SimulatedFailure("503 Service Unavailable".to_string());
        assert!(injected.is_simulated());
        assert!(injected.to_string().contains("simulated"));

        assert!(!Error::SessionNotFound("x".to_string()).is_simulated());
        assert!(!Error::NotLoaded.is_simulated());
    }
}
