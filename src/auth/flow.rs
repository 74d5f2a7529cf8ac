//! Screen-flow state machine.
//!
//! `ScreenFlow` decides which screen is presented from two inputs: session
//! snapshots published by the coordinator, and navigation events raised by the
//! presentation layer. It performs no I/O; every transition returns the
//! [`FlowEffect`]s the presentation layer should apply.
//!
//! Exactly one of the auth flow or the main flow is active, selected by
//! whether the session has a user. Entering the main flow always starts on
//! [`MainScreen::Home`]. Data carried between steps of the verification and
//! reset sub-flows lives inside the [`AuthScreen`] variants, so it is dropped
//! as soon as the flow returns to the login screen.

use crate::auth::session::Session;
use std::fmt;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Register,
    EmailVerification { email: String },
    ForgotPassword,
    VerifyCode { email: String },
    ResetPassword { email: String, code: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MainScreen {
    #[default]
    Home,
    Settings,
    ChangePassword,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowState {
    Loading,
    Unauthenticated(AuthScreen),
    Authenticated(MainScreen),
}

/// Screen identifier handed to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    Register,
    EmailVerification,
    ForgotPassword,
    VerifyCode,
    ResetPassword,
    Home,
    Settings,
    ChangePassword,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Loading => "loading",
            Screen::Login => "login",
            Screen::Register => "register",
            Screen::EmailVerification => "email-verification",
            Screen::ForgotPassword => "forgot-password",
            Screen::VerifyCode => "verify-code",
            Screen::ResetPassword => "reset-password",
            Screen::Home => "home",
            Screen::Settings => "settings",
            Screen::ChangePassword => "change-password",
        };
        f.write_str(name)
    }
}

impl FlowState {
    #[must_use]
    pub fn screen(&self) -> Screen {
        match self {
            FlowState::Loading => Screen::Loading,
            FlowState::Unauthenticated(screen) => match screen {
                AuthScreen::Login => Screen::Login,
                AuthScreen::Register => Screen::Register,
                AuthScreen::EmailVerification { .. } => Screen::EmailVerification,
                AuthScreen::ForgotPassword => Screen::ForgotPassword,
                AuthScreen::VerifyCode { .. } => Screen::VerifyCode,
                AuthScreen::ResetPassword { .. } => Screen::ResetPassword,
            },
            FlowState::Authenticated(screen) => match screen {
                MainScreen::Home => Screen::Home,
                MainScreen::Settings => Screen::Settings,
                MainScreen::ChangePassword => Screen::ChangePassword,
            },
        }
    }
}

/// Navigation requested by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    ShowLogin,
    ShowRegister,
    /// The account needs its email verified before logging in.
    VerificationRequested { email: String },
    EmailVerified,
    ShowForgotPassword,
    /// A reset code was sent (or re-sent) to `email`.
    ResetCodeRequested { email: String },
    /// The code was accepted for the email carried by the verify-code step.
    ResetCodeVerified { code: String },
    PasswordReset,
    ShowHome,
    ShowSettings,
    ShowChangePassword,
    PasswordChanged,
}

/// Commands for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowEffect {
    ShowLoading,
    Present(Screen),
    /// Dismiss the session error shown on the previous auth screen.
    ClearError,
}

#[derive(Debug)]
pub struct ScreenFlow {
    state: FlowState,
}

impl Default for ScreenFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenFlow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: FlowState::Loading,
        }
    }

    /// Effects to apply before the first session snapshot arrives.
    #[must_use]
    pub fn start(&self) -> Vec<FlowEffect> {
        match self.state {
            FlowState::Loading => vec![FlowEffect::ShowLoading],
            _ => vec![FlowEffect::Present(self.state.screen())],
        }
    }

    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.state.screen()
    }

    #[must_use]
    pub fn pending_verification_email(&self) -> Option<&str> {
        match &self.state {
            FlowState::Unauthenticated(AuthScreen::EmailVerification { email }) => Some(email),
            _ => None,
        }
    }

    #[must_use]
    pub fn pending_reset_email(&self) -> Option<&str> {
        match &self.state {
            FlowState::Unauthenticated(
                AuthScreen::VerifyCode { email } | AuthScreen::ResetPassword { email, .. },
            ) => Some(email),
            _ => None,
        }
    }

    #[must_use]
    pub fn pending_reset_code(&self) -> Option<&str> {
        match &self.state {
            FlowState::Unauthenticated(AuthScreen::ResetPassword { code, .. }) => Some(code),
            _ => None,
        }
    }

    /// Reacts to a session snapshot. Leaves `Loading` once the restore has
    /// completed and switches between the auth and main flows whenever the
    /// presence of a user changes.
    pub fn sync(&mut self, session: &Session) -> Vec<FlowEffect> {
        if !session.restored {
            return Vec::new();
        }

        let next = match (&self.state, session.is_authenticated()) {
            (FlowState::Authenticated(_), true) | (FlowState::Unauthenticated(_), false) => {
                return Vec::new();
            }
            (_, true) => FlowState::Authenticated(MainScreen::Home),
            (_, false) => FlowState::Unauthenticated(AuthScreen::Login),
        };

        debug!(from = %self.state.screen(), to = %next.screen(), "session transition");
        self.state = next;
        vec![FlowEffect::Present(self.state.screen())]
    }

    /// Applies a navigation event. Events that do not apply to the current
    /// state, or that carry a blank email or code, are ignored.
    pub fn handle(&mut self, event: FlowEvent) -> Vec<FlowEffect> {
        let next = match &self.state {
            FlowState::Loading => None,
            FlowState::Unauthenticated(screen) => auth_transition(screen, event)
                .map(FlowState::Unauthenticated),
            FlowState::Authenticated(screen) => {
                main_transition(*screen, event).map(FlowState::Authenticated)
            }
        };

        let Some(next) = next else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        if matches!(next, FlowState::Unauthenticated(_)) {
            effects.push(FlowEffect::ClearError);
        }
        if next.screen() != self.state.screen() {
            effects.push(FlowEffect::Present(next.screen()));
        }
        self.state = next;
        effects
    }
}

fn auth_transition(current: &AuthScreen, event: FlowEvent) -> Option<AuthScreen> {
    let next = match (current, event) {
        (_, FlowEvent::ShowLogin) => AuthScreen::Login,
        (_, FlowEvent::ShowRegister) => AuthScreen::Register,
        (AuthScreen::Login | AuthScreen::Register, FlowEvent::VerificationRequested { email }) => {
            AuthScreen::EmailVerification {
                email: non_blank(email)?,
            }
        }
        (AuthScreen::EmailVerification { .. }, FlowEvent::EmailVerified) => AuthScreen::Login,
        (_, FlowEvent::ShowForgotPassword) => AuthScreen::ForgotPassword,
        (
            AuthScreen::ForgotPassword | AuthScreen::VerifyCode { .. },
            FlowEvent::ResetCodeRequested { email },
        ) => AuthScreen::VerifyCode {
            email: non_blank(email)?,
        },
        (AuthScreen::VerifyCode { email }, FlowEvent::ResetCodeVerified { code }) => {
            AuthScreen::ResetPassword {
                email: email.clone(),
                code: non_blank(code)?,
            }
        }
        (AuthScreen::ResetPassword { .. }, FlowEvent::PasswordReset) => AuthScreen::Login,
        (_, event) => {
            debug!(?event, "navigation ignored in auth flow");
            return None;
        }
    };
    Some(next)
}

fn main_transition(current: MainScreen, event: FlowEvent) -> Option<MainScreen> {
    let next = match (current, event) {
        (_, FlowEvent::ShowHome) => MainScreen::Home,
        (_, FlowEvent::ShowSettings) => MainScreen::Settings,
        (_, FlowEvent::ShowChangePassword) => MainScreen::ChangePassword,
        (MainScreen::ChangePassword, FlowEvent::PasswordChanged) => MainScreen::Settings,
        (_, event) => {
            debug!(?event, "navigation ignored in main flow");
            return None;
        }
    };
    Some(next)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::User;

    fn restored(authenticated: bool) -> Session {
        Session {
            user: authenticated.then(|| User {
                id: "1".to_string(),
                email: "a@b.com".to_string(),
                created_at: None,
                updated_at: None,
            }),
            loading: false,
            error: None,
            restored: true,
        }
    }

    fn logged_in() -> ScreenFlow {
        let mut flow = ScreenFlow::new();
        let _ = flow.sync(&restored(true));
        flow
    }

    fn logged_out() -> ScreenFlow {
        let mut flow = ScreenFlow::new();
        let _ = flow.sync(&restored(false));
        flow
    }

    #[test]
    fn stays_loading_until_restore_completes() {
        let mut flow = ScreenFlow::new();
        assert_eq!(flow.start(), vec![FlowEffect::ShowLoading]);
        assert!(flow.sync(&Session::starting()).is_empty());
        assert_eq!(flow.screen(), Screen::Loading);
        assert!(flow.handle(FlowEvent::ShowRegister).is_empty());
    }

    #[test]
    fn restore_without_user_presents_login() {
        let mut flow = ScreenFlow::new();
        assert_eq!(
            flow.sync(&restored(false)),
            vec![FlowEffect::Present(Screen::Login)]
        );
        assert_eq!(flow.state(), &FlowState::Unauthenticated(AuthScreen::Login));
    }

    #[test]
    fn restore_with_user_presents_home() {
        let mut flow = ScreenFlow::new();
        assert_eq!(
            flow.sync(&restored(true)),
            vec![FlowEffect::Present(Screen::Home)]
        );
    }

    #[test]
    fn in_flight_login_does_not_leave_auth_flow() {
        let mut flow = logged_out();
        let mut session = restored(false);
        session.loading = true;
        assert!(flow.sync(&session).is_empty());
        assert_eq!(flow.screen(), Screen::Login);
    }

    #[test]
    fn entering_main_flow_always_resets_to_home() {
        for screen in [FlowEvent::ShowSettings, FlowEvent::ShowChangePassword] {
            let mut flow = logged_in();
            let _ = flow.handle(screen);
            assert_ne!(flow.screen(), Screen::Home);

            assert_eq!(
                flow.sync(&restored(false)),
                vec![FlowEffect::Present(Screen::Login)]
            );
            assert_eq!(
                flow.sync(&restored(true)),
                vec![FlowEffect::Present(Screen::Home)]
            );
        }
    }

    #[test]
    fn repeated_snapshots_are_idempotent() {
        let mut flow = logged_in();
        let _ = flow.handle(FlowEvent::ShowSettings);
        assert!(flow.sync(&restored(true)).is_empty());
        assert_eq!(flow.screen(), Screen::Settings);
    }

    #[test]
    fn password_reset_flow_carries_email_and_code() {
        let mut flow = logged_out();

        assert_eq!(
            flow.handle(FlowEvent::ShowForgotPassword),
            vec![
                FlowEffect::ClearError,
                FlowEffect::Present(Screen::ForgotPassword)
            ]
        );
        let _ = flow.handle(FlowEvent::ResetCodeRequested {
            email: " a@b.com ".to_string(),
        });
        assert_eq!(flow.screen(), Screen::VerifyCode);
        assert_eq!(flow.pending_reset_email(), Some("a@b.com"));

        // resending keeps the user on the same screen
        assert_eq!(
            flow.handle(FlowEvent::ResetCodeRequested {
                email: "a@b.com".to_string(),
            }),
            vec![FlowEffect::ClearError]
        );

        let _ = flow.handle(FlowEvent::ResetCodeVerified {
            code: "123456".to_string(),
        });
        assert_eq!(flow.screen(), Screen::ResetPassword);
        assert_eq!(flow.pending_reset_email(), Some("a@b.com"));
        assert_eq!(flow.pending_reset_code(), Some("123456"));

        let _ = flow.handle(FlowEvent::PasswordReset);
        assert_eq!(flow.screen(), Screen::Login);
        assert_eq!(flow.pending_reset_email(), None);
        assert_eq!(flow.pending_reset_code(), None);
    }

    #[test]
    fn email_verification_redirects_to_login() {
        let mut flow = logged_out();
        let _ = flow.handle(FlowEvent::ShowRegister);
        let _ = flow.handle(FlowEvent::VerificationRequested {
            email: "a@b.com".to_string(),
        });
        assert_eq!(flow.screen(), Screen::EmailVerification);
        assert_eq!(flow.pending_verification_email(), Some("a@b.com"));

        let _ = flow.handle(FlowEvent::EmailVerified);
        assert_eq!(flow.screen(), Screen::Login);
        assert_eq!(flow.pending_verification_email(), None);
    }

    #[test]
    fn blank_or_out_of_place_events_are_ignored() {
        let mut flow = logged_out();
        let _ = flow.handle(FlowEvent::ShowForgotPassword);
        assert!(
            flow.handle(FlowEvent::ResetCodeRequested {
                email: "  ".to_string()
            })
            .is_empty()
        );
        assert!(
            flow.handle(FlowEvent::ResetCodeVerified {
                code: "123".to_string()
            })
            .is_empty()
        );
        assert!(flow.handle(FlowEvent::ShowSettings).is_empty());
        assert_eq!(flow.screen(), Screen::ForgotPassword);

        let mut flow = logged_in();
        assert!(flow.handle(FlowEvent::ShowRegister).is_empty());
        assert!(flow.handle(FlowEvent::PasswordChanged).is_empty());
        assert_eq!(flow.screen(), Screen::Home);
    }

    #[test]
    fn main_flow_navigation() {
        let mut flow = logged_in();
        assert_eq!(
            flow.handle(FlowEvent::ShowSettings),
            vec![FlowEffect::Present(Screen::Settings)]
        );
        let _ = flow.handle(FlowEvent::ShowChangePassword);
        assert_eq!(
            flow.handle(FlowEvent::PasswordChanged),
            vec![FlowEffect::Present(Screen::Settings)]
        );
        assert!(flow.handle(FlowEvent::ShowSettings).is_empty());
    }

    #[test]
    fn screen_names() {
        assert_eq!(Screen::VerifyCode.to_string(), "verify-code");
        assert_eq!(Screen::ChangePassword.to_string(), "change-password");
    }
}
