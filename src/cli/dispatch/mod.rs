//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::cli::{
    actions::{
        Action,
        session::{self, Operation},
        strength,
    },
    commands::{
        client,
        session::{
            ARG_CODE, ARG_CURRENT_PASSWORD, ARG_EMAIL, ARG_NEW_PASSWORD, ARG_PASSWORD,
            CMD_CHANGE_PASSWORD, CMD_FORGOT_PASSWORD, CMD_LOGIN, CMD_LOGOUT, CMD_REGISTER,
            CMD_RESEND_VERIFICATION, CMD_RESET_PASSWORD, CMD_STATUS, CMD_STRENGTH,
            CMD_VERIFY_EMAIL, CMD_VERIFY_RESET_CODE,
        },
    },
    globals::GlobalArgs,
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if a required argument is missing or the configuration is invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches.subcommand().context("missing subcommand")?;

    // Closure to read required subcommand arguments
    let read_required = |id: &str| -> Result<String> {
        sub_m
            .get_one::<String>(id)
            .cloned()
            .with_context(|| format!("missing required argument: --{id}"))
    };
    let read_secret = |id: &str| -> Result<SecretString> { read_required(id).map(SecretString::from) };

    if name == CMD_STRENGTH {
        return Ok(Action::Strength(strength::Args {
            password: read_secret(ARG_PASSWORD)?,
        }));
    }

    let operation = match name {
        CMD_REGISTER => Operation::Register {
            email: read_required(ARG_EMAIL)?,
            password: read_secret(ARG_PASSWORD)?,
        },
        CMD_LOGIN => Operation::Login {
            email: read_required(ARG_EMAIL)?,
            password: read_secret(ARG_PASSWORD)?,
        },
        CMD_LOGOUT => Operation::Logout,
        CMD_STATUS => Operation::Status,
        CMD_VERIFY_EMAIL => Operation::VerifyEmail {
            email: read_required(ARG_EMAIL)?,
            code: read_required(ARG_CODE)?,
        },
        CMD_RESEND_VERIFICATION => Operation::ResendVerification {
            email: read_required(ARG_EMAIL)?,
        },
        CMD_FORGOT_PASSWORD => Operation::ForgotPassword {
            email: read_required(ARG_EMAIL)?,
        },
        CMD_VERIFY_RESET_CODE => Operation::VerifyResetCode {
            email: read_required(ARG_EMAIL)?,
            code: read_required(ARG_CODE)?,
        },
        CMD_RESET_PASSWORD => Operation::ResetPassword {
            email: read_required(ARG_EMAIL)?,
            code: read_required(ARG_CODE)?,
            new_password: read_secret(ARG_NEW_PASSWORD)?,
        },
        CMD_CHANGE_PASSWORD => Operation::ChangePassword {
            current_password: read_secret(ARG_CURRENT_PASSWORD)?,
            new_password: read_secret(ARG_NEW_PASSWORD)?,
        },
        other => return Err(anyhow!("unknown command: {other}")),
    };

    let globals = GlobalArgs::new(client::Options::parse(matches)?)?;

    Ok(Action::Session(session::Args { globals, operation }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    const CLEAN_ENV: [(&str, Option<&str>); 4] = [
        ("AUTHFLOW_PASSWORD", None),
        ("AUTHFLOW_NEW_PASSWORD", None),
        ("AUTHFLOW_API_URL", None),
        ("AUTHFLOW_STATE_DIR", Some("/tmp/authflow-test")),
    ];

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn strength_skips_backend_config() {
        temp_env::with_vars(
            [("AUTHFLOW_API_URL", Some("not a url")), ("AUTHFLOW_STATE_DIR", None)],
            || {
                let action = dispatch(&["authflow", "strength", "hunter22"]).unwrap();
                let Action::Strength(args) = action else {
                    panic!("expected strength action");
                };
                assert_eq!(args.password.expose_secret(), "hunter22");
            },
        );
    }

    #[test]
    fn login_maps_to_operation() {
        temp_env::with_vars(CLEAN_ENV, || {
            let action = dispatch(&["authflow", "login", "a@b.com", "-p", "secret"]).unwrap();
            let Action::Session(args) = action else {
                panic!("expected session action");
            };
            let Operation::Login { email, password } = args.operation else {
                panic!("expected login");
            };
            assert_eq!(email, "a@b.com");
            assert_eq!(password.expose_secret(), "secret");
            assert_eq!(args.globals.state_dir.to_str(), Some("/tmp/authflow-test"));
        });
    }

    #[test]
    fn reset_password_maps_all_arguments() {
        temp_env::with_vars(CLEAN_ENV, || {
            let action = dispatch(&[
                "authflow",
                "reset-password",
                "a@b.com",
                "123456",
                "--new-password",
                "secret2",
            ])
            .unwrap();
            let Action::Session(args) = action else {
                panic!("expected session action");
            };
            let Operation::ResetPassword {
                email,
                code,
                new_password,
            } = args.operation
            else {
                panic!("expected reset-password");
            };
            assert_eq!(email, "a@b.com");
            assert_eq!(code, "123456");
            assert_eq!(new_password.expose_secret(), "secret2");
        });
    }

    #[test]
    fn change_password_reads_env() {
        temp_env::with_vars(
            [
                ("AUTHFLOW_PASSWORD", Some("old-secret")),
                ("AUTHFLOW_NEW_PASSWORD", Some("new-secret")),
                ("AUTHFLOW_STATE_DIR", Some("/tmp/authflow-test")),
            ],
            || {
                let action = dispatch(&["authflow", "change-password"]).unwrap();
                let Action::Session(args) = action else {
                    panic!("expected session action");
                };
                let Operation::ChangePassword {
                    current_password,
                    new_password,
                } = args.operation
                else {
                    panic!("expected change-password");
                };
                assert_eq!(current_password.expose_secret(), "old-secret");
                assert_eq!(new_password.expose_secret(), "new-secret");
            },
        );
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        temp_env::with_vars(
            [
                ("AUTHFLOW_API_URL", Some("ftp://files.example.com")),
                ("AUTHFLOW_STATE_DIR", Some("/tmp/authflow-test")),
            ],
            || {
                assert!(dispatch(&["authflow", "status"]).is_err());
            },
        );
    }
}
