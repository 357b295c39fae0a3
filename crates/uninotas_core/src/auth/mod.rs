//! Identity provider contract and local implementation.
//!
//! # Responsibility
//! - Define the `IdentityProvider` contract used by the composition root.
//! - Provide a SQLite-backed provider storing Argon2id password hashes.
//! - Publish sign-in state changes through an explicit subscription API.
//!
//! # Invariants
//! - A new subscriber is invoked once immediately with the current user.
//! - Passwords never leave this module in clear text and are never logged.

use crate::model::user::UserAccount;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod credentials;
mod local;
mod password;
pub mod session;

pub use local::LocalIdentityProvider;
pub use session::{SessionHandler, SessionObservers, SubscriptionId};

/// Minimum password length accepted by the identity provider itself.
pub const PROVIDER_MIN_PASSWORD_CHARS: usize = 6;

pub type AuthResult<T> = Result<T, AuthError>;

/// Identity failures, mirroring the reasons a hosted auth service reports.
#[derive(Debug)]
pub enum AuthError {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword { min_chars: usize },
    UserNotFound,
    WrongPassword,
    /// Hashing failed, or a stored hash could not be read.
    PasswordHash(String),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailAlreadyInUse => write!(f, "email already in use"),
            Self::InvalidEmail => write!(f, "invalid email"),
            Self::WeakPassword { min_chars } => {
                write!(f, "weak password: at least {min_chars} characters required")
            }
            Self::UserNotFound => write!(f, "user not found"),
            Self::WrongPassword => write!(f, "wrong password"),
            Self::PasswordHash(details) => write!(f, "password hash error: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(_) => Self::EmailAlreadyInUse,
            other => Self::Repo(other),
        }
    }
}

impl AuthError {
    /// Stable machine-readable code, in the hosted-auth naming style.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::InvalidEmail => "auth/invalid-email",
            Self::WeakPassword { .. } => "auth/weak-password",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::PasswordHash(_) | Self::Repo(_) => "auth/internal-error",
        }
    }

    /// Copy suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmailAlreadyInUse => "This email address is already registered.".to_string(),
            Self::InvalidEmail => "The email address is not valid.".to_string(),
            Self::WeakPassword { .. } => "The password is too weak.".to_string(),
            Self::UserNotFound => "No account exists for this email address.".to_string(),
            Self::WrongPassword => "The password is incorrect.".to_string(),
            Self::PasswordHash(_) | Self::Repo(_) => {
                "An unexpected error occurred.".to_string()
            }
        }
    }
}

/// Sign-in contract consumed by the application.
pub trait IdentityProvider {
    /// Creates an account and signs it in.
    fn register(&mut self, email: &str, password: &str) -> AuthResult<UserAccount>;
    fn login(&mut self, email: &str, password: &str) -> AuthResult<UserAccount>;
    /// Ends the current session; a no-op when nobody is signed in.
    fn logout(&mut self) -> AuthResult<()>;
    fn current_user(&self) -> Option<&UserAccount>;
    /// Registers `handler`, calls it right away with the current user, and
    /// again after every sign-in state change.
    fn on_session_change(&mut self, handler: SessionHandler) -> SubscriptionId;
    /// Removes a handler; returns `false` for an unknown id.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
