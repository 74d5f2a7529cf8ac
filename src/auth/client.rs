//! Client wrappers for the auth API endpoints. Keeping the paths here means
//! the coordinator never builds URLs, and no route code sees the token.

use crate::{
    auth::types::{
        AuthPayload, ChangePasswordRequest, CodeRequest, CredentialsRequest, EmailRequest,
        ResetPasswordRequest, VerifyEmailPayload,
    },
    client::{ApiClient, AppError},
    storage::KeyValueStore,
};

pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGIN_PATH: &str = "/auth/login";
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";
pub const RESEND_VERIFICATION_PATH: &str = "/auth/resend-verification";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const VERIFY_RESET_CODE_PATH: &str = "/auth/verify-reset-code";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

/// Creates an account and returns the issued token and user.
pub async fn register<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &CredentialsRequest<'_>,
) -> Result<AuthPayload, AppError> {
    api.post_json(REGISTER_PATH, request).await
}

/// Authenticates and returns the issued token and user.
pub async fn login<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &CredentialsRequest<'_>,
) -> Result<AuthPayload, AppError> {
    api.post_json(LOGIN_PATH, request).await
}

/// Submits an email verification code. The backend may answer with a token.
pub async fn verify_email<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &CodeRequest<'_>,
) -> Result<VerifyEmailPayload, AppError> {
    Ok(api
        .post_json_optional(VERIFY_EMAIL_PATH, request)
        .await?
        .unwrap_or_default())
}

pub async fn resend_verification<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &EmailRequest<'_>,
) -> Result<(), AppError> {
    api.post_empty(RESEND_VERIFICATION_PATH, request).await
}

/// Requests a password reset code. Also used to resend the code.
pub async fn forgot_password<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &EmailRequest<'_>,
) -> Result<(), AppError> {
    api.post_empty(FORGOT_PASSWORD_PATH, request).await
}

pub async fn verify_reset_code<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &CodeRequest<'_>,
) -> Result<(), AppError> {
    api.post_empty(VERIFY_RESET_CODE_PATH, request).await
}

pub async fn reset_password<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &ResetPasswordRequest<'_>,
) -> Result<(), AppError> {
    api.post_empty(RESET_PASSWORD_PATH, request).await
}

/// Changes the password of the authenticated user. Requires the bearer token.
pub async fn change_password<S: KeyValueStore>(
    api: &ApiClient<S>,
    request: &ChangePasswordRequest<'_>,
) -> Result<(), AppError> {
    api.post_empty(CHANGE_PASSWORD_PATH, request).await
}
