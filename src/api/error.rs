//! Error taxonomy for backend calls
//!
//! Every failure is scoped to the view that triggered it; nothing here is
//! fatal to the process. Malformed `properties`/`configuration` fields never
//! surface as errors at all — they are recovered where they are decoded.

use thiserror::Error;

/// Errors that can occur talking to the analysis backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network, DNS, or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("server error {status}: {message}")]
    Api { status: u16, message: String },

    /// The requested repository or entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body was not the expected JSON shape
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rejected client-side before any request was issued
    #[error("validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Whether this failure should render as an explicit "not found" state
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
