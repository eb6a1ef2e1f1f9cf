//! Errors returned by the management API client

use reqwest::StatusCode;
use thiserror::Error;

/// Error from a management API call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("HTTP {status}: {message}")]
    Unexpected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl ApiError {
    /// Map a non-success status and its body to an error
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let message = extract_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

        match status.as_u16() {
            400 => ApiError::BadRequest { message },
            401 | 403 => ApiError::Unauthorized { message },
            404 => ApiError::NotFound { message },
            409 | 412 => ApiError::Conflict { message },
            429 => ApiError::RateLimited { message },
            code @ 500..=599 => ApiError::ServerError {
                status: code,
                message,
            },
            code => ApiError::Unexpected {
                status: code,
                message,
            },
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ApiError::BadRequest { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::ServerError { .. })
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Request(e) if e.is_timeout())
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } | ApiError::ServerError { .. } => true,
            ApiError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Pull a human readable message out of an error body
///
/// The services answer with `{"message": "..."}` or `{"error": "..."}`;
/// anything else falls back to the raw body.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_codes() {
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, String::new()).is_not_found());
        assert!(ApiError::from_status(StatusCode::FORBIDDEN, String::new()).is_unauthorized());
        assert!(ApiError::from_status(StatusCode::CONFLICT, String::new()).is_conflict());
        assert!(ApiError::from_status(StatusCode::BAD_GATEWAY, String::new()).is_server_error());
        assert!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()).is_retryable());
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            ApiError::Unexpected { status: 418, .. }
        ));
    }

    #[test]
    fn test_message_extraction() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"code": 400, "message": "name too long"}"#.to_string(),
        );
        assert_eq!(err.to_string(), "Bad request: name too long");

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "plain text".to_string());
        assert_eq!(err.to_string(), "Bad request: plain text");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, "  ".to_string());
        assert_eq!(err.to_string(), "Not found: Not Found");
    }
}
