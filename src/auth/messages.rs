//! Maps `AppError`s to the messages shown to the user. The mapping depends on
//! the HTTP status and on the context of the call: a 401 during login means
//! bad credentials, during a recovery flow a bad code, and in an authenticated
//! call an expired session.

use crate::client::AppError;

pub const NETWORK_MESSAGE: &str =
    "Unable to connect to server. Please check your internet connection.";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
pub const INVALID_CODE_MESSAGE: &str = "Invalid or expired code.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const CURRENT_PASSWORD_MESSAGE: &str = "Current password is incorrect.";
pub const ACCOUNT_EXISTS_MESSAGE: &str = "An account with this email already exists.";
pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorContext {
    /// Login and registration.
    Credentials,
    /// Email verification and password reset steps.
    Recovery,
    /// Calls that require the bearer token.
    Authenticated,
}

/// Classifies an error into a user-facing message.
#[must_use]
pub fn user_message(err: &AppError, context: ErrorContext) -> String {
    if err.is_unreachable() {
        return NETWORK_MESSAGE.to_string();
    }

    let Some(status) = err.status() else {
        return UNEXPECTED_MESSAGE.to_string();
    };

    match status {
        400 => err
            .field_errors()
            .first()
            .map(|field| field.message.clone())
            .or_else(|| err.server_message().map(str::to_string))
            .unwrap_or_else(|| INVALID_REQUEST_MESSAGE.to_string()),
        401 => match context {
            ErrorContext::Credentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            ErrorContext::Recovery => server_or(err, INVALID_CODE_MESSAGE),
            ErrorContext::Authenticated => SESSION_EXPIRED_MESSAGE.to_string(),
        },
        409 => ACCOUNT_EXISTS_MESSAGE.to_string(),
        500 => SERVER_ERROR_MESSAGE.to_string(),
        _ => server_or(err, UNEXPECTED_MESSAGE),
    }
}

/// True for a 401 that blames the current password rather than the token.
#[must_use]
pub fn is_wrong_current_password(err: &AppError) -> bool {
    err.status() == Some(401)
        && err
            .server_message()
            .is_some_and(|message| message.to_lowercase().contains("current password"))
}

fn server_or(err: &AppError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}
