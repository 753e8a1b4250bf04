//! Errors returned by the hosted model API

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a call to the hosted model API.
///
/// Every variant is terminal for the request that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing, malformed or rejected credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The account hit its request or token quota
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other error status returned by the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (DNS, connect, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failure on our side of the wire
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Short text stored in place of an answer when generation fails
    pub fn placeholder(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "Invalid API Key",
            ApiError::RateLimited(_) => "Rate limit exceeded",
            ApiError::Api { .. } | ApiError::Transport(_) => "OpenAI API Error",
            ApiError::Unexpected(_) => "Unexpected error",
        }
    }

    /// Message shown on screen for this failure
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Authentication(_) => {
                "Invalid API Key. Please check your API key and try again.".to_string()
            }
            ApiError::RateLimited(_) => {
                "API rate limit exceeded. Please try again later.".to_string()
            }
            ApiError::Api { message, .. } => format!("OpenAI API Error: {}", message),
            ApiError::Transport(detail) => format!("OpenAI API Error: {}", detail),
            ApiError::Unexpected(detail) => format!("An unexpected error occurred: {}", detail),
        }
    }

    /// Whether the service itself could not be reached or failed
    pub fn is_service_failure(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Api { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return map_http_error(status, err.to_string());
        }
        if err.is_decode() {
            return ApiError::Unexpected(format!("Failed to parse response: {}", err));
        }
        ApiError::Transport(err.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a non-success HTTP status and its body onto the failure taxonomy
pub fn map_http_error(status: StatusCode, body: String) -> ApiError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message),
        _ => ApiError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
