//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by every service in the
//! Ocula client. The `Display` text of each variant is user-facing and is
//! what the presentation layer shows in an alert.

use thiserror::Error;

/// Message used when a protected call is attempted without a stored token
pub const UNAUTHENTICATED_MESSAGE: &str = "You are not logged in. Please log in to continue.";
/// Message used when the server rejected the stored token
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
/// Message used for HTTP 403
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
/// Message used for HTTP 404
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
/// Message used for HTTP 500
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Custom error type for client operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// Client-side validation failure for a single form field
    #[error("{message}")]
    Validation { field: String, message: String },

    /// No token is stored
    #[error("{}", UNAUTHENTICATED_MESSAGE)]
    Unauthenticated,

    /// The server rejected the token; the session has been cleared
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    /// The server rejected the supplied credentials
    #[error("{0}")]
    InvalidCredentials(String),

    /// HTTP 403
    #[error("{}", FORBIDDEN_MESSAGE)]
    Forbidden,

    /// HTTP 404
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    /// HTTP 500
    #[error("{}", SERVER_ERROR_MESSAGE)]
    Server,

    /// Any other non-success status, with the best message available
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The server could not be reached
    #[error("{0}")]
    Network(String),

    /// The request did not complete in time
    #[error("{0}")]
    Timeout(String),

    /// A response body could not be interpreted
    #[error("{0}")]
    Format(String),

    /// Local session storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Build a field-scoped validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the user has to log in again
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::SessionExpired)
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::Configuration(err.to_string())
    }
}

/// Type alias for Result with ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_user_facing() {
        assert_eq!(ApiError::Forbidden.to_string(), FORBIDDEN_MESSAGE);
        assert_eq!(
            ApiError::validation("email", "Invalid email format").to_string(),
            "Invalid email format"
        );
        assert_eq!(
            ApiError::Http {
                status: 418,
                message: "I'm a teapot".to_string()
            }
            .to_string(),
            "I'm a teapot"
        );
    }

    #[test]
    fn test_requires_login() {
        assert!(ApiError::SessionExpired.requires_login());
        assert!(ApiError::Unauthenticated.requires_login());
        assert!(!ApiError::Server.requires_login());
    }
}
