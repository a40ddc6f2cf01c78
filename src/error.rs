//! Error types for the tonight client
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, invalid config or filter)
//! - 3: Authentication required (HTTP 401)
//! - 4: Operation failed (transport error, server error)

use thiserror::Error;

/// Exit codes for the tonight CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const AUTH_REQUIRED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for client operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid filter query: {0}")]
    InvalidFilter(String),

    // Server rejections (exit code 3 for 401, 4 otherwise)
    #[error("API error ({status}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },

    // Operation failures (exit code 4)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(u64),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) | Error::InvalidArgument(_) | Error::InvalidFilter(_) => {
                exit_codes::USER_ERROR
            }

            Error::Api { status: 401, .. } => exit_codes::AUTH_REQUIRED,

            Error::Api { .. }
            | Error::Http(_)
            | Error::Json(_)
            | Error::Io(_)
            | Error::TomlParse(_)
            | Error::TaskNotFound(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message shown in user-facing notifications: the server-supplied error
    /// text when present, the transport message otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            status: err.status(),
        }
    }
}
