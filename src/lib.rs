//! # Authflow (Session Coordinator & Screen Flow)
//!
//! `authflow` drives the authentication side of a client app that talks to a
//! REST backend: registration, login, email verification, password reset and
//! password change.
//!
//! ## Session
//!
//! The [`auth::session::SessionCoordinator`] owns the in-memory session (user,
//! loading flag, error message). It restores the session from a
//! [`storage::KeyValueStore`] at startup and persists the bearer token and user
//! record after a successful login or registration. Operations never return
//! errors to the caller; failures are classified into user-facing messages.
//!
//! ## Transport
//!
//! [`client::api::ApiClient`] attaches the persisted bearer token to every
//! request and purges it when the backend answers `401 Unauthorized`. Clearing
//! the in-memory user is left to whoever observes that error.
//!
//! ## Screen Flow
//!
//! [`auth::flow::ScreenFlow`] is a pure state machine that maps session
//! snapshots and navigation events to the screen that should be presented. It
//! emits [`auth::flow::FlowEffect`]s for a presentation layer to interpret.

pub mod auth;
pub mod cli;
pub mod client;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with("authflow/"));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
