//! SQLite-backed identity provider.
//!
//! # Invariants
//! - Emails are normalized (trimmed, lowercased) before lookup and storage.
//! - Session state lives in this value only; it is not persisted.
//! - Observers are notified after the session field is updated.

use crate::auth::credentials::is_valid_email;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{SessionHandler, SessionObservers, SubscriptionId};
use crate::auth::{AuthError, AuthResult, IdentityProvider, PROVIDER_MIN_PASSWORD_CHARS};
use crate::model::now_epoch_ms;
use crate::model::user::{normalize_email, UserAccount, UserRecord};
use crate::repo::user_repo::UserRepository;
use log::{error, info, warn};
use uuid::Uuid;

/// Identity provider over a `UserRepository`.
pub struct LocalIdentityProvider<U: UserRepository> {
    users: U,
    current: Option<UserAccount>,
    observers: SessionObservers,
}

impl<U: UserRepository> LocalIdentityProvider<U> {
    pub fn new(users: U) -> Self {
        Self {
            users,
            current: None,
            observers: SessionObservers::new(),
        }
    }

    fn start_session(&mut self, account: UserAccount) -> UserAccount {
        self.current = Some(account.clone());
        self.observers.notify(self.current.as_ref());
        account
    }
}

impl<U: UserRepository> IdentityProvider for LocalIdentityProvider<U> {
    fn register(&mut self, email: &str, password: &str) -> AuthResult<UserAccount> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < PROVIDER_MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword {
                min_chars: PROVIDER_MIN_PASSWORD_CHARS,
            });
        }

        let password_hash = hash_password(password)
            .map_err(|err| AuthError::PasswordHash(err.to_string()))?;
        let record = UserRecord {
            account: UserAccount {
                id: Uuid::new_v4(),
                email,
            },
            password_hash,
            created_at: now_epoch_ms(),
        };

        if let Err(err) = self.users.create_user(&record) {
            let err = AuthError::from(err);
            warn!(
                "event=auth_register module=auth status=error error_code={}",
                err.code()
            );
            return Err(err);
        }

        info!(
            "event=auth_register module=auth status=ok user_id={}",
            record.account.id
        );
        Ok(self.start_session(record.account))
    }

    fn login(&mut self, email: &str, password: &str) -> AuthResult<UserAccount> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let record = match self.users.find_by_email(&email)? {
            Some(record) => record,
            None => {
                warn!("event=auth_login module=auth status=error error_code=auth/user-not-found");
                return Err(AuthError::UserNotFound);
            }
        };

        let matches = verify_password(password, &record.password_hash).map_err(|err| {
            error!(
                "event=auth_login module=auth status=error error_code=auth/internal-error user_id={} error={err}",
                record.account.id
            );
            AuthError::PasswordHash(err.to_string())
        })?;
        if !matches {
            warn!(
                "event=auth_login module=auth status=error error_code=auth/wrong-password user_id={}",
                record.account.id
            );
            return Err(AuthError::WrongPassword);
        }

        info!(
            "event=auth_login module=auth status=ok user_id={}",
            record.account.id
        );
        Ok(self.start_session(record.account))
    }

    fn logout(&mut self) -> AuthResult<()> {
        if let Some(account) = self.current.take() {
            info!(
                "event=auth_logout module=auth status=ok user_id={}",
                account.id
            );
            self.observers.notify(None);
        }
        Ok(())
    }

    fn current_user(&self) -> Option<&UserAccount> {
        self.current.as_ref()
    }

    fn on_session_change(&mut self, handler: SessionHandler) -> SubscriptionId {
        self.observers.subscribe(handler, self.current.as_ref())
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}
