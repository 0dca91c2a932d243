//! Error types for product fetching

use std::time::Duration;
use thiserror::Error;

/// Message shown in place of the product grid when a page fails to load
pub const FETCH_FAILED_MESSAGE: &str = "Error, Failed to fetch products";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Connection, DNS and timeout failures
    #[cfg(test)]
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout(_))
    }

    /// Generic text for the error phase; details stay in the logs
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            FetchError::HttpStatus(status.as_u16())
        } else if error.is_decode() {
            FetchError::Decode(error.to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Decode(error.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
