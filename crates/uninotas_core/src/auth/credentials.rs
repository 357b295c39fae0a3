//! Credential form rules applied before talking to the identity provider.
//!
//! # Invariants
//! - Registration requires a password longer than 6 characters and a
//!   matching confirmation.
//! - Login requires a password of at least 6 characters.
//! - Only the first failing rule is reported.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const REGISTER_MIN_PASSWORD_CHARS: usize = 7;
pub const LOGIN_MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    MissingFields,
    PasswordTooShort { min_chars: usize },
    PasswordMismatch,
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(f, "please fill in every field"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "the password must have at least {min_chars} characters")
            }
            Self::PasswordMismatch => write!(f, "the passwords do not match"),
        }
    }
}

impl Error for CredentialError {}

/// Checks a registration form: email, password and its confirmation.
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), CredentialError> {
    if email.trim().is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(CredentialError::MissingFields);
    }
    if password.chars().count() < REGISTER_MIN_PASSWORD_CHARS {
        return Err(CredentialError::PasswordTooShort {
            min_chars: REGISTER_MIN_PASSWORD_CHARS,
        });
    }
    if password != confirm_password {
        return Err(CredentialError::PasswordMismatch);
    }
    Ok(())
}

/// Checks a login form.
pub fn validate_login(email: &str, password: &str) -> Result<(), CredentialError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CredentialError::MissingFields);
    }
    if password.chars().count() < LOGIN_MIN_PASSWORD_CHARS {
        return Err(CredentialError::PasswordTooShort {
            min_chars: LOGIN_MIN_PASSWORD_CHARS,
        });
    }
    Ok(())
}

/// Loose structural email check (`local@domain.tld`, no whitespace).
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_requires_every_field() {
        assert_eq!(
            validate_registration("", "secret123", "secret123"),
            Err(CredentialError::MissingFields)
        );
        assert_eq!(
            validate_registration("a@b.cl", "secret123", ""),
            Err(CredentialError::MissingFields)
        );
    }

    #[test]
    fn registration_needs_more_than_six_chars_then_a_match() {
        assert_eq!(
            validate_registration("a@b.cl", "sixsix", "sixsix"),
            Err(CredentialError::PasswordTooShort { min_chars: 7 })
        );
        assert_eq!(
            validate_registration("a@b.cl", "seven77", "seven78"),
            Err(CredentialError::PasswordMismatch)
        );
        assert!(validate_registration("a@b.cl", "seven77", "seven77").is_ok());
    }

    #[test]
    fn login_accepts_six_char_passwords() {
        assert!(validate_login("a@b.cl", "sixsix").is_ok());
        assert_eq!(
            validate_login("a@b.cl", "five5"),
            Err(CredentialError::PasswordTooShort { min_chars: 6 })
        );
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("student@uni.cl"));
        assert!(!is_valid_email("student@uni"));
        assert!(!is_valid_email("stu dent@uni.cl"));
        assert!(!is_valid_email("@uni.cl"));
    }
}
