//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or transport error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server rejected the credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Forbidden (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Bad request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Any other non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Malformed response body, or a request body that failed to serialize
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Path could not be resolved against the base address
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Reading a file for upload failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Message extracted from a non-success response
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_classified() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, "Invalid credentials".into());
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));

        let err = ClientError::from_status(StatusCode::NOT_FOUND, "Not found".into());
        assert!(matches!(err, ClientError::NotFound(_)));

        let err = ClientError::from_status(StatusCode::CONFLICT, "Duplicate SKU".into());
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.message(), Some("Duplicate SKU"));
    }

    #[test]
    fn display_is_the_server_message() {
        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, "Request failed".into());
        assert_eq!(err.to_string(), "Request failed");
    }
}
