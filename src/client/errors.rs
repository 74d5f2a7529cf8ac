use serde::{Deserialize, Serialize};
use std::fmt;

/// Field-level validation error reported by the backend or by local checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Clone, Debug)]
pub enum AppError {
    Config(String),
    /// No response was received.
    Network(String),
    Timeout(String),
    /// The backend answered with a non-success status.
    Http {
        status: u16,
        message: Option<String>,
        errors: Vec<FieldError>,
    },
    Parse(String),
    Serialization(String),
    Storage(String),
}

impl AppError {
    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-supplied message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Http {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Http { errors, .. } => errors,
            _ => &[],
        }
    }

    /// True when the request never produced a response.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Timeout(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(message) => write!(formatter, "Config error: {message}"),
            AppError::Network(message) => write!(formatter, "Network error: {message}"),
            AppError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            AppError::Http {
                status, message, ..
            } => write!(
                formatter,
                "Request failed ({status}): {}",
                message.as_deref().unwrap_or("no details")
            ),
            AppError::Parse(message) => write!(formatter, "Response error: {message}"),
            AppError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
            AppError::Storage(message) => write!(formatter, "Storage error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<crate::storage::StorageError> for AppError {
    fn from(err: crate::storage::StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}
