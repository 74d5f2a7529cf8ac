use clap::{Arg, Command};

pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";
pub const CMD_VERIFY_EMAIL: &str = "verify-email";
pub const CMD_RESEND_VERIFICATION: &str = "resend-verification";
pub const CMD_FORGOT_PASSWORD: &str = "forgot-password";
pub const CMD_VERIFY_RESET_CODE: &str = "verify-reset-code";
pub const CMD_RESET_PASSWORD: &str = "reset-password";
pub const CMD_CHANGE_PASSWORD: &str = "change-password";
pub const CMD_STRENGTH: &str = "strength";

pub const ARG_EMAIL: &str = "email";
pub const ARG_CODE: &str = "code";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_NEW_PASSWORD: &str = "new-password";
pub const ARG_CURRENT_PASSWORD: &str = "current-password";

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .help("Account email address")
        .required(true)
}

fn code_arg() -> Arg {
    Arg::new(ARG_CODE)
        .help("Code received by email")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("AUTHFLOW_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn new_password_arg() -> Arg {
    Arg::new(ARG_NEW_PASSWORD)
        .long(ARG_NEW_PASSWORD)
        .help("New password, at least 6 characters")
        .env("AUTHFLOW_NEW_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

/// Session subcommands, one per auth operation.
#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new(CMD_REGISTER)
            .about("Create an account and start a session")
            .arg(email_arg())
            .arg(password_arg()),
        Command::new(CMD_LOGIN)
            .about("Log in and persist the session")
            .arg(email_arg())
            .arg(password_arg()),
        Command::new(CMD_LOGOUT).about("Clear the persisted session"),
        Command::new(CMD_STATUS).about("Show the restored session"),
        Command::new(CMD_VERIFY_EMAIL)
            .about("Confirm an email address with the emailed code")
            .arg(email_arg())
            .arg(code_arg()),
        Command::new(CMD_RESEND_VERIFICATION)
            .about("Send a new email verification code")
            .arg(email_arg()),
        Command::new(CMD_FORGOT_PASSWORD)
            .about("Request a password reset code")
            .arg(email_arg()),
        Command::new(CMD_VERIFY_RESET_CODE)
            .about("Check a password reset code")
            .arg(email_arg())
            .arg(code_arg()),
        Command::new(CMD_RESET_PASSWORD)
            .about("Set a new password with a reset code")
            .arg(email_arg())
            .arg(code_arg())
            .arg(new_password_arg()),
        Command::new(CMD_CHANGE_PASSWORD)
            .about("Change the password of the logged in account")
            .arg(
                Arg::new(ARG_CURRENT_PASSWORD)
                    .long(ARG_CURRENT_PASSWORD)
                    .help("Current password")
                    .env("AUTHFLOW_PASSWORD")
                    .hide_env_values(true)
                    .required(true),
            )
            .arg(new_password_arg()),
        Command::new(CMD_STRENGTH)
            .about("Rate a password without contacting the backend")
            .arg(Arg::new(ARG_PASSWORD).help("Password to rate").required(true)),
    ]
}
