use crate::{
    APP_USER_AGENT, GIT_COMMIT_HASH,
    auth::{AuthOutcome, FlowEffect, FlowEvent, Screen, ScreenFlow, Session, SessionCoordinator},
    cli::globals::GlobalArgs,
    client::ApiClient,
    storage::{FileStore, KeyValueStore},
};
use anyhow::{Result, bail};
use secrecy::{ExposeSecret, SecretString};
use std::{fmt::Write as _, sync::Arc};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub operation: Operation,
}

#[derive(Debug)]
pub enum Operation {
    Register {
        email: String,
        password: SecretString,
    },
    Login {
        email: String,
        password: SecretString,
    },
    Logout,
    Status,
    VerifyEmail {
        email: String,
        code: String,
    },
    ResendVerification {
        email: String,
    },
    ForgotPassword {
        email: String,
    },
    VerifyResetCode {
        email: String,
        code: String,
    },
    ResetPassword {
        email: String,
        code: String,
        new_password: SecretString,
    },
    ChangePassword {
        current_password: SecretString,
        new_password: SecretString,
    },
}

/// Restore the persisted session, run one operation and print the result.
/// # Errors
/// Returns an error if the HTTP client cannot be built or the operation fails.
pub async fn execute(args: Args) -> Result<()> {
    let store = Arc::new(FileStore::new(&args.globals.state_dir));
    debug!(path = %store.path().display(), "session store");

    let api = ApiClient::new(&args.globals.config, store)?;
    let coordinator = SessionCoordinator::new(api);

    let (outcome, session, screen) = run(&coordinator, args.operation).await;
    println!("{}", report(outcome.as_ref(), &session, screen));

    if let Some(message) = outcome.as_ref().and_then(AuthOutcome::error) {
        bail!("{message}");
    }

    Ok(())
}

/// Presentation side of one command: the screen flow plus the coordinator it
/// observes.
struct Presenter<'a, S> {
    coordinator: &'a SessionCoordinator<S>,
    flow: ScreenFlow,
}

impl<'a, S: KeyValueStore> Presenter<'a, S> {
    fn new(coordinator: &'a SessionCoordinator<S>) -> Self {
        let flow = ScreenFlow::new();
        let effects = flow.start();
        let presenter = Self { coordinator, flow };
        presenter.apply(effects);
        presenter
    }

    fn sync(&mut self) {
        let effects = self.flow.sync(&self.coordinator.snapshot());
        self.apply(effects);
    }

    fn navigate(&mut self, event: FlowEvent) {
        let effects = self.flow.handle(event);
        self.apply(effects);
    }

    fn apply(&self, effects: Vec<FlowEffect>) {
        for effect in effects {
            match effect {
                FlowEffect::ShowLoading => debug!("loading"),
                FlowEffect::Present(screen) => info!(%screen, "present"),
                FlowEffect::ClearError => self.coordinator.clear_error(),
            }
        }
    }

    /// Follows up a successful operation with `event`, then picks up any
    /// session change.
    fn settle(&mut self, outcome: &AuthOutcome, event: Option<FlowEvent>) {
        if outcome.is_success()
            && let Some(event) = event
        {
            self.navigate(event);
        }
        self.sync();
    }
}

async fn run<S: KeyValueStore>(
    coordinator: &SessionCoordinator<S>,
    operation: Operation,
) -> (Option<AuthOutcome>, Session, Screen) {
    let mut presenter = Presenter::new(coordinator);
    coordinator.restore_session().await;
    presenter.sync();

    let outcome = match operation {
        Operation::Status => None,
        Operation::Logout => {
            coordinator.logout().await;
            presenter.sync();
            Some(AuthOutcome::Success)
        }
        Operation::Register { email, password } => {
            presenter.navigate(FlowEvent::ShowRegister);
            let outcome = coordinator.register(&email, password.expose_secret()).await;
            presenter.settle(&outcome, None);
            Some(outcome)
        }
        Operation::Login { email, password } => {
            presenter.navigate(FlowEvent::ShowLogin);
            let outcome = coordinator.login(&email, password.expose_secret()).await;
            presenter.settle(&outcome, None);
            Some(outcome)
        }
        Operation::VerifyEmail { email, code } => {
            presenter.navigate(FlowEvent::VerificationRequested {
                email: email.clone(),
            });
            let outcome = coordinator.verify_email(&email, &code).await;
            presenter.settle(&outcome, Some(FlowEvent::EmailVerified));
            Some(outcome)
        }
        Operation::ResendVerification { email } => {
            presenter.navigate(FlowEvent::VerificationRequested {
                email: email.clone(),
            });
            let outcome = coordinator.resend_verification(&email).await;
            presenter.settle(&outcome, None);
            Some(outcome)
        }
        Operation::ForgotPassword { email } => {
            presenter.navigate(FlowEvent::ShowForgotPassword);
            let outcome = coordinator.forgot_password(&email).await;
            presenter.settle(&outcome, Some(FlowEvent::ResetCodeRequested { email }));
            Some(outcome)
        }
        Operation::VerifyResetCode { email, code } => {
            presenter.navigate(FlowEvent::ShowForgotPassword);
            presenter.navigate(FlowEvent::ResetCodeRequested {
                email: email.clone(),
            });
            let outcome = coordinator.verify_reset_code(&email, &code).await;
            presenter.settle(&outcome, Some(FlowEvent::ResetCodeVerified { code }));
            Some(outcome)
        }
        Operation::ResetPassword {
            email,
            code,
            new_password,
        } => {
            presenter.navigate(FlowEvent::ShowForgotPassword);
            presenter.navigate(FlowEvent::ResetCodeRequested {
                email: email.clone(),
            });
            presenter.navigate(FlowEvent::ResetCodeVerified { code: code.clone() });
            let outcome = coordinator
                .reset_password(&email, &code, new_password.expose_secret())
                .await;
            presenter.settle(&outcome, Some(FlowEvent::PasswordReset));
            Some(outcome)
        }
        Operation::ChangePassword {
            current_password,
            new_password,
        } => {
            if coordinator.snapshot().is_authenticated() {
                presenter.navigate(FlowEvent::ShowSettings);
                presenter.navigate(FlowEvent::ShowChangePassword);
                let outcome = coordinator
                    .change_password(
                        current_password.expose_secret(),
                        new_password.expose_secret(),
                    )
                    .await;
                presenter.settle(&outcome, Some(FlowEvent::PasswordChanged));
                Some(outcome)
            } else {
                Some(AuthOutcome::Failed {
                    message: "Not logged in. Run `authflow login` first.".to_string(),
                })
            }
        }
    };

    let screen = presenter.flow.screen();
    (outcome, coordinator.snapshot(), screen)
}

fn report(outcome: Option<&AuthOutcome>, session: &Session, screen: Screen) -> String {
    let mut out = String::new();

    match outcome {
        None => {
            let _ = writeln!(out, "{APP_USER_AGENT} ({GIT_COMMIT_HASH})");
        }
        Some(AuthOutcome::Success) => {
            let _ = writeln!(out, "ok");
        }
        Some(AuthOutcome::FieldError { field, message }) => {
            let _ = writeln!(out, "error: {field}: {message}");
        }
        Some(AuthOutcome::Failed { message } | AuthOutcome::SessionExpired { message }) => {
            let _ = writeln!(out, "error: {message}");
        }
    }

    match &session.user {
        Some(user) => {
            let _ = writeln!(out, "user: {} ({})", user.email, user.id);
        }
        None => {
            let _ = writeln!(out, "user: not logged in");
        }
    }
    let _ = write!(out, "screen: {screen}");
    out
}
