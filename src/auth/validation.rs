use regex::Regex;
use std::fmt;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;
const STRONG_PASSWORD_CHARS: usize = 10;

/// Permissive `local@domain.tld` check, not RFC 5322.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty()
        && Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

/// Advisory strength bucket used by the UI indicator. It never gates
/// submission beyond [`is_valid_password`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordStrength::Weak => write!(f, "weak"),
            PasswordStrength::Medium => write!(f, "medium"),
            PasswordStrength::Strong => write!(f, "strong"),
        }
    }
}

/// Buckets a password by length and character classes. `None` for an empty
/// password.
#[must_use]
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    let length = password.chars().count();
    if length == 0 {
        return None;
    }
    if length < MIN_PASSWORD_CHARS {
        return Some(PasswordStrength::Weak);
    }
    if length >= STRONG_PASSWORD_CHARS && character_classes(password) >= 3 {
        return Some(PasswordStrength::Strong);
    }
    Some(PasswordStrength::Medium)
}

/// Counts how many of upper, lower, digit and symbol appear.
fn character_classes(password: &str) -> usize {
    let upper = password.chars().any(char::is_uppercase);
    let lower = password.chars().any(char::is_lowercase);
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let symbol = password.chars().any(|c| !c.is_alphanumeric());

    [upper, lower, digit, symbol]
        .into_iter()
        .filter(|present| *present)
        .count()
}
