//! Application composition root.
//!
//! # Responsibility
//! - Bind one identity provider to the subject and grade services.
//! - Resolve the signed-in user for every data operation.
//! - Translate every failure into user-facing copy.
//!
//! # Invariants
//! - Data operations without a signed-in user fail with
//!   `AppError::NotAuthenticated` before touching the store.
//! - Credential forms are validated before the identity provider is called.
//! - There is no global instance; the entry point constructs and owns it.

use crate::auth::credentials::{validate_login, validate_registration, CredentialError};
use crate::auth::{
    AuthError, IdentityProvider, LocalIdentityProvider, SessionHandler, SubscriptionId,
};
use crate::ledger::SubjectStats;
use crate::model::note::NoteId;
use crate::model::subject::{Subject, SubjectId, SubjectNameError};
use crate::model::user::UserAccount;
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
use crate::repo::user_repo::SqliteUserRepository;
use crate::service::grade_service::{GradeService, GradeServiceError, NoteAdded, SubjectNotes};
use crate::service::subject_service::{SubjectService, SubjectServiceError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// A data operation was attempted with nobody signed in.
    NotAuthenticated,
    Credentials(CredentialError),
    Auth(AuthError),
    Subject(SubjectServiceError),
    Grade(GradeServiceError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "no authenticated user"),
            Self::Credentials(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::Subject(err) => write!(f, "{err}"),
            Self::Grade(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotAuthenticated => None,
            Self::Credentials(err) => Some(err),
            Self::Auth(err) => Some(err),
            Self::Subject(err) => Some(err),
            Self::Grade(err) => Some(err),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(value: CredentialError) -> Self {
        Self::Credentials(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<SubjectServiceError> for AppError {
    fn from(value: SubjectServiceError) -> Self {
        Self::Subject(value)
    }
}

impl From<GradeServiceError> for AppError {
    fn from(value: GradeServiceError) -> Self {
        Self::Grade(value)
    }
}

impl AppError {
    /// Copy suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "You need to sign in first.".to_string(),
            Self::Credentials(err) => sentence(&err.to_string()),
            Self::Auth(err) => err.user_message(),
            Self::Subject(err) => match err {
                SubjectServiceError::InvalidName(SubjectNameError::Empty) => {
                    "Please enter a name for the subject.".to_string()
                }
                SubjectServiceError::InvalidName(SubjectNameError::TooShort { min_chars }) => {
                    format!("The name must have at least {min_chars} characters.")
                }
                SubjectServiceError::DuplicateName(_) => {
                    "A subject with that name already exists.".to_string()
                }
                SubjectServiceError::SubjectNotFound(_) => "Subject not found.".to_string(),
                SubjectServiceError::Repo(_) => {
                    "Your subjects could not be saved or loaded.".to_string()
                }
            },
            Self::Grade(err) => match err {
                GradeServiceError::Rejected(rejected) => rejected
                    .violations
                    .iter()
                    .map(|violation| sentence(&violation.to_string()))
                    .collect::<Vec<_>>()
                    .join(" "),
                GradeServiceError::SubjectNotFound(_) => "Subject not found.".to_string(),
                GradeServiceError::NoteNotFound(_) => "Note not found.".to_string(),
                GradeServiceError::Repo(_) => {
                    "Your notes could not be saved or loaded.".to_string()
                }
            },
        }
    }
}

fn sentence(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// The application object: identity plus the data services.
pub struct GradeBook<I, S, N>
where
    I: IdentityProvider,
    S: SubjectRepository,
    N: NoteRepository,
{
    identity: I,
    subjects: SubjectService<S>,
    grades: GradeService<S, N>,
}

/// `GradeBook` wired entirely to one SQLite connection.
pub type SqliteGradeBook<'conn> = GradeBook<
    LocalIdentityProvider<SqliteUserRepository<'conn>>,
    SqliteSubjectRepository<'conn>,
    SqliteNoteRepository<'conn>,
>;

impl<'conn> SqliteGradeBook<'conn> {
    /// Builds the full SQLite stack over a migrated connection.
    pub fn with_connection(conn: &'conn Connection) -> Self {
        GradeBook::new(
            LocalIdentityProvider::new(SqliteUserRepository::new(conn)),
            SubjectService::new(SqliteSubjectRepository::new(conn)),
            GradeService::new(
                SqliteSubjectRepository::new(conn),
                SqliteNoteRepository::new(conn),
            ),
        )
    }
}

impl<I, S, N> GradeBook<I, S, N>
where
    I: IdentityProvider,
    S: SubjectRepository,
    N: NoteRepository,
{
    pub fn new(identity: I, subjects: SubjectService<S>, grades: GradeService<S, N>) -> Self {
        Self {
            identity,
            subjects,
            grades,
        }
    }

    /// Validates the registration form, creates the account and signs it in.
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<UserAccount> {
        validate_registration(email, password, confirm_password)?;
        Ok(self.identity.register(email.trim(), password)?)
    }

    pub fn login(&mut self, email: &str, password: &str) -> AppResult<UserAccount> {
        validate_login(email, password)?;
        Ok(self.identity.login(email.trim(), password)?)
    }

    pub fn logout(&mut self) -> AppResult<()> {
        Ok(self.identity.logout()?)
    }

    pub fn current_user(&self) -> Option<&UserAccount> {
        self.identity.current_user()
    }

    /// See `IdentityProvider::on_session_change`.
    pub fn on_session_change(&mut self, handler: SessionHandler) -> SubscriptionId {
        self.identity.on_session_change(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.identity.unsubscribe(id)
    }

    pub fn create_subject(&self, name: &str) -> AppResult<Subject> {
        let owner = self.require_user()?;
        Ok(self.subjects.create_subject(owner, name)?)
    }

    pub fn list_subjects(&self) -> AppResult<Vec<Subject>> {
        let owner = self.require_user()?;
        Ok(self.subjects.list_subjects(owner)?)
    }

    pub fn get_subject(&self, id: SubjectId) -> AppResult<Subject> {
        let owner = self.require_user()?;
        Ok(self.subjects.get_subject(owner, id)?)
    }

    pub fn subject_name_exists(&self, name: &str) -> AppResult<bool> {
        let owner = self.require_user()?;
        Ok(self.subjects.subject_name_exists(owner, name)?)
    }

    pub fn delete_subject(&self, id: SubjectId) -> AppResult<()> {
        let owner = self.require_user()?;
        Ok(self.subjects.delete_subject(owner, id)?)
    }

    pub fn add_note(&self, subject_id: SubjectId, grade: f64, weight: f64) -> AppResult<NoteAdded> {
        let owner = self.require_user()?;
        Ok(self.grades.add_note(owner, subject_id, grade, weight)?)
    }

    pub fn list_notes(&self, subject_id: SubjectId) -> AppResult<SubjectNotes> {
        let owner = self.require_user()?;
        Ok(self.grades.list_notes(owner, subject_id)?)
    }

    pub fn remove_note(&self, subject_id: SubjectId, note_id: NoteId) -> AppResult<SubjectStats> {
        let owner = self.require_user()?;
        Ok(self.grades.remove_note(owner, subject_id, note_id)?)
    }

    fn require_user(&self) -> AppResult<&UserAccount> {
        self.identity
            .current_user()
            .ok_or(AppError::NotAuthenticated)
    }
}
