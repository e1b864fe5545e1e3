// src/core/errors.rs

//! Defines the primary error type for the comment service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// The main error enum, representing all possible failures within the service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouletteError {
    /// The comment source could not be reached or refused the request.
    /// Absorbed at the refill boundary and never surfaced to HTTP callers.
    #[error("Comment source unavailable: {0}")]
    SourceUnavailable(String),

    /// A read was requested while the buffer holds no records.
    #[error("The comment cache is empty. Please try again shortly.")]
    EmptyCache,

    #[error("HTTP client error: {0}")]
    HttpClientError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RouletteError {
    /// The HTTP status a caller sees for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouletteError::EmptyCache => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RouletteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

// --- From trait implementations for easy error conversion ---

impl From<reqwest::Error> for RouletteError {
    fn from(e: reqwest::Error) -> Self {
        RouletteError::HttpClientError(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for RouletteError {
    fn from(e: serde_json::Error) -> Self {
        RouletteError::SourceUnavailable(format!("malformed response body: {e}"))
    }
}
