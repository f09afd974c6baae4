//! Error types for message sources

use thiserror::Error;

/// Errors raised by a message source transport
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or HTTP failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The endpoint answered with a failure status
    #[error("API error (retcode {retcode}): {message}")]
    Api {
        /// Endpoint return code
        retcode: i64,
        /// Endpoint message, if any
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Communication(e.to_string())
    }
}
