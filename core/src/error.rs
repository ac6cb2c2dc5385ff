//! Error types for the todo client and synchronizer.
//!
//! # Design
//! `NotFound` keeps a dedicated variant because the service answers 404 for
//! a stale id, which callers like to tell apart from other failures. Every
//! variant still collapses to one line of text via `user_message`, which is
//! what the synchronizer records as its last error.

use thiserror::Error;

/// Message shown when a failure carries no usable server text.
pub const GENERIC_FAILURE: &str = "request failed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (unreachable host, I/O error).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered 404.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The server answered 2xx but the envelope said `success: false`.
    #[error("{message}")]
    Api { message: String },

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(String),

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// The single human-readable line exposed to the view layer.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { message }
            | ApiError::HttpError { message, .. }
            | ApiError::Api { message }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            ApiError::NotFound { .. } => "todo not found".to_string(),
            ApiError::HttpError { status, .. } => format!("{GENERIC_FAILURE} (HTTP {status})"),
            ApiError::Api { .. } => GENERIC_FAILURE.to_string(),
            ApiError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_text() {
        let err = ApiError::HttpError {
            status: 400,
            message: "Request validation failed".to_string(),
        };
        assert_eq!(err.user_message(), "Request validation failed");
    }

    #[test]
    fn user_message_falls_back_when_server_text_is_blank() {
        let err = ApiError::HttpError {
            status: 502,
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message(), "request failed (HTTP 502)");

        let err = ApiError::Api { message: String::new() };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn transport_errors_keep_their_prefix() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "transport error: connection refused");
    }
}
