use crate::auth::validation::{MIN_PASSWORD_CHARS, is_valid_password, password_strength};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub password: SecretString,
}

/// Rate a password locally.
/// # Errors
/// Never fails; the signature matches the other actions.
pub fn execute(args: &Args) -> Result<()> {
    println!("{}", report(args.password.expose_secret()));
    Ok(())
}

fn report(password: &str) -> String {
    let strength = password_strength(password).map_or_else(|| "empty".to_string(), |s| s.to_string());
    let accepted = if is_valid_password(password) {
        "accepted".to_string()
    } else {
        format!("rejected, needs at least {MIN_PASSWORD_CHARS} characters")
    };
    format!("strength: {strength} ({accepted})")
}
