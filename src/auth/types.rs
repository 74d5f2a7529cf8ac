//! Request and response types for the auth API. Requests borrow their fields
//! and deliberately do not implement `Debug`: they carry passwords and codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity record returned by the backend and persisted under `auth_user`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Serialize)]
pub struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

/// Body for both email verification and reset-code verification.
#[derive(Serialize)]
pub struct CodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
    pub new_password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Payload of a successful register or login.
#[derive(Clone, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("user", &self.user)
            .field("token", &"***")
            .finish()
    }
}

/// Payload of a successful email verification.
#[derive(Clone, Default, Deserialize)]
pub struct VerifyEmailPayload {
    #[serde(default)]
    pub token: Option<String>,
}

impl fmt::Debug for VerifyEmailPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyEmailPayload")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}
