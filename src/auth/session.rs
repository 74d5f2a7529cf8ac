//! Session coordinator for the client. It owns the in-memory session, restores
//! it from the persisted store at startup, and runs every auth operation
//! against the backend. Observers subscribe to a `watch` channel and receive a
//! fresh [`Session`] snapshot after each change; the bearer token is never part
//! of that snapshot.
//!
//! Operations never return `Err`: failures are classified into user-facing
//! messages, stored in `Session::error`, and returned as an [`AuthOutcome`].

use crate::{
    auth::{
        client,
        messages::{self, ErrorContext, UNEXPECTED_MESSAGE},
        types::{
            AuthPayload, ChangePasswordRequest, CodeRequest, CredentialsRequest, EmailRequest,
            ResetPasswordRequest, User,
        },
        validation::{MIN_PASSWORD_CHARS, is_valid_email, is_valid_password},
    },
    client::{ApiClient, AppError},
    storage::{KeyValueStore, StorageError, TOKEN_KEY, USER_KEY},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Snapshot of the authentication state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Present iff authenticated.
    pub user: Option<User>,
    /// True while an operation is in flight.
    pub loading: bool,
    /// User-facing message from the last failed operation.
    pub error: Option<String>,
    /// False until the startup restore has completed.
    pub restored: bool,
}

impl Session {
    /// State at process start, before the restore has run.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Result of a coordinator operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failed { message: String },
    /// Input or server-side rejection tied to one form field.
    FieldError { field: String, message: String },
    /// The token was rejected; the session has been logged out.
    SessionExpired { message: String },
}

impl AuthOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success)
    }

    /// Message to display, `None` on success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success => None,
            AuthOutcome::Failed { message }
            | AuthOutcome::FieldError { message, .. }
            | AuthOutcome::SessionExpired { message } => Some(message),
        }
    }

    fn field(field: &str, message: &str) -> Self {
        AuthOutcome::FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    fn failed(err: &AppError, context: ErrorContext) -> Self {
        AuthOutcome::Failed {
            message: messages::user_message(err, context),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum CredentialsFlow {
    Register,
    Login,
}

pub struct SessionCoordinator<S> {
    api: ApiClient<S>,
    store: Arc<S>,
    state: watch::Sender<Session>,
}

impl<S: KeyValueStore> SessionCoordinator<S> {
    /// Creates a coordinator sharing the API client's store. Call
    /// [`Self::restore_session`] before presenting any screen.
    #[must_use]
    pub fn new(api: ApiClient<S>) -> Self {
        let store = Arc::clone(api.store());
        let (state, _) = watch::channel(Session::starting());
        Self { api, store, state }
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn api(&self) -> &ApiClient<S> {
        &self.api
    }

    /// Repopulates the session from storage without contacting the backend.
    /// A token and a parseable user record authenticate the session; an
    /// unreadable record or a storage failure discards both entries. Never
    /// fails.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) {
        self.state.send_modify(|session| session.loading = true);

        let user = match self.read_persisted().await {
            Ok(user) => user,
            Err(err) => {
                warn!("Discarding persisted session: {}", err);
                self.discard_persisted().await;
                None
            }
        };

        if let Some(user) = &user {
            info!(user_id = %user.id, "session restored");
        } else {
            debug!("no persisted session");
        }

        self.state.send_modify(|session| {
            session.user = user;
            session.loading = false;
            session.restored = true;
        });
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> AuthOutcome {
        self.authenticate(CredentialsFlow::Register, email, password)
            .await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        self.authenticate(CredentialsFlow::Login, email, password)
            .await
    }

    /// Deletes the persisted token and user and clears the session. Storage
    /// failures are logged and swallowed.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.state.send_modify(|session| session.loading = true);
        self.discard_persisted().await;
        self.state.send_modify(|session| {
            session.user = None;
            session.error = None;
            session.loading = false;
        });
        info!("logged out");
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|session| session.error.take().is_some());
    }

    /// Submits an email verification code. A token returned by the backend is
    /// persisted, but the session is not authenticated: the user logs in next.
    #[instrument(skip(self, code))]
    pub async fn verify_email(&self, email: &str, code: &str) -> AuthOutcome {
        let email = email.trim();
        if let Some(outcome) = check_email(email).or_else(|| check_code(code)) {
            return self.reject(outcome);
        }

        self.begin();
        let request = CodeRequest {
            email,
            code: code.trim(),
        };
        let outcome = match client::verify_email(&self.api, &request).await {
            Ok(payload) => {
                if let Some(token) = payload.token
                    && let Err(err) = self.store.set(TOKEN_KEY, &token).await
                {
                    warn!("Failed to persist verification token: {}", err);
                }
                AuthOutcome::Success
            }
            Err(err) => AuthOutcome::failed(&err, ErrorContext::Recovery),
        };
        self.finish(outcome)
    }

    #[instrument(skip(self))]
    pub async fn resend_verification(&self, email: &str) -> AuthOutcome {
        let email = email.trim();
        if let Some(outcome) = check_email(email) {
            return self.reject(outcome);
        }

        self.begin();
        let result = client::resend_verification(&self.api, &EmailRequest { email }).await;
        self.finish(recovery_outcome(result))
    }

    /// Requests a reset code. Also used to resend it.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> AuthOutcome {
        let email = email.trim();
        if let Some(outcome) = check_email(email) {
            return self.reject(outcome);
        }

        self.begin();
        let result = client::forgot_password(&self.api, &EmailRequest { email }).await;
        self.finish(recovery_outcome(result))
    }

    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> AuthOutcome {
        let email = email.trim();
        if let Some(outcome) = check_email(email).or_else(|| check_code(code)) {
            return self.reject(outcome);
        }

        self.begin();
        let request = CodeRequest {
            email,
            code: code.trim(),
        };
        let result = client::verify_reset_code(&self.api, &request).await;
        self.finish(recovery_outcome(result))
    }

    #[instrument(skip(self, code, new_password))]
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> AuthOutcome {
        let email = email.trim();
        if let Some(outcome) = check_email(email)
            .or_else(|| check_code(code))
            .or_else(|| check_password("newPassword", new_password))
        {
            return self.reject(outcome);
        }

        self.begin();
        let request = ResetPasswordRequest {
            email,
            code: code.trim(),
            new_password,
        };
        let result = client::reset_password(&self.api, &request).await;
        self.finish(recovery_outcome(result))
    }

    /// Changes the password of the authenticated user. A 401 that blames the
    /// current password is reported against that field; any other 401 means
    /// the token is no longer valid and forces a logout.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> AuthOutcome {
        if current_password.is_empty() {
            return self.reject(AuthOutcome::field(
                "currentPassword",
                "Current password is required.",
            ));
        }
        if let Some(outcome) = check_password("newPassword", new_password) {
            return self.reject(outcome);
        }

        self.begin();
        let request = ChangePasswordRequest {
            current_password,
            new_password,
        };
        let outcome = match client::change_password(&self.api, &request).await {
            Ok(()) => AuthOutcome::Success,
            Err(err) if messages::is_wrong_current_password(&err) => AuthOutcome::field(
                "currentPassword",
                err.server_message()
                    .unwrap_or(messages::CURRENT_PASSWORD_MESSAGE),
            ),
            Err(err) if err.status() == Some(401) => {
                warn!("token rejected during password change, logging out");
                self.logout().await;
                AuthOutcome::SessionExpired {
                    message: messages::user_message(&err, ErrorContext::Authenticated),
                }
            }
            Err(err) => AuthOutcome::failed(&err, ErrorContext::Authenticated),
        };
        self.finish(outcome)
    }

    async fn authenticate(&self, flow: CredentialsFlow, email: &str, password: &str) -> AuthOutcome {
        let email = email.trim();
        if let Some(outcome) = check_email(email).or_else(|| check_password("password", password)) {
            return self.reject(outcome);
        }

        self.begin();
        let request = CredentialsRequest { email, password };
        let result = match flow {
            CredentialsFlow::Register => client::register(&self.api, &request).await,
            CredentialsFlow::Login => client::login(&self.api, &request).await,
        };

        let outcome = match result {
            Ok(payload) => self.establish(payload).await,
            Err(err) => {
                debug!("{:?} failed: {}", flow, err);
                AuthOutcome::failed(&err, ErrorContext::Credentials)
            }
        };
        self.finish(outcome)
    }

    /// Persists the token and user, then authenticates the session. A failed
    /// write leaves nothing behind and the session unauthenticated.
    async fn establish(&self, payload: AuthPayload) -> AuthOutcome {
        let AuthPayload { user, token } = payload;

        if let Err(err) = self.persist(&user, &token).await {
            warn!("Failed to persist session: {}", err);
            self.discard_persisted().await;
            return AuthOutcome::Failed {
                message: UNEXPECTED_MESSAGE.to_string(),
            };
        }

        info!(user_id = %user.id, "authenticated");
        self.state.send_modify(|session| session.user = Some(user));
        AuthOutcome::Success
    }

    async fn persist(&self, user: &User, token: &str) -> Result<(), StorageError> {
        let record = serde_json::to_string(user)?;
        self.store.set(TOKEN_KEY, token).await?;
        self.store.set(USER_KEY, &record).await
    }

    async fn read_persisted(&self) -> Result<Option<User>, StorageError> {
        let token = self.store.get(TOKEN_KEY).await?;
        let record = self.store.get(USER_KEY).await?;

        match (token, record) {
            (Some(token), Some(record)) if !token.is_empty() => {
                Ok(Some(serde_json::from_str::<User>(&record)?))
            }
            _ => Ok(None),
        }
    }

    async fn discard_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.store.delete(key).await {
                warn!("Failed to delete {}: {}", key, err);
            }
        }
    }

    fn begin(&self) {
        self.state.send_modify(|session| {
            session.loading = true;
            session.error = None;
        });
    }

    fn finish(&self, outcome: AuthOutcome) -> AuthOutcome {
        let error = outcome.error().map(str::to_string);
        self.state.send_modify(|session| {
            session.loading = false;
            session.error = error;
        });
        outcome
    }

    /// Records a validation failure without contacting the backend.
    fn reject(&self, outcome: AuthOutcome) -> AuthOutcome {
        let error = outcome.error().map(str::to_string);
        self.state.send_modify(|session| session.error = error);
        outcome
    }
}

fn recovery_outcome(result: Result<(), AppError>) -> AuthOutcome {
    match result {
        Ok(()) => AuthOutcome::Success,
        Err(err) => AuthOutcome::failed(&err, ErrorContext::Recovery),
    }
}

fn check_email(email: &str) -> Option<AuthOutcome> {
    (!is_valid_email(email)).then(|| AuthOutcome::field("email", "Please enter a valid email address."))
}

fn check_password(field: &str, password: &str) -> Option<AuthOutcome> {
    (!is_valid_password(password)).then(|| {
        AuthOutcome::field(
            field,
            &format!("Password must be at least {MIN_PASSWORD_CHARS} characters."),
        )
    })
}

fn check_code(code: &str) -> Option<AuthOutcome> {
    code.trim()
        .is_empty()
        .then(|| AuthOutcome::field("code", "Please enter the verification code."))
}
