//! Subject use-case service.
//!
//! # Responsibility
//! - Validate subject names and enforce per-owner uniqueness before writes.
//! - Expose list/get/delete scoped to the caller.
//!
//! # Invariants
//! - The uniqueness check runs before every insert; the store's unique
//!   index is the backstop for races.
//! - New subjects start with zero cached stats.

use crate::model::subject::{normalize_subject_name, Subject, SubjectId, SubjectNameError};
use crate::model::user::UserAccount;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SubjectServiceError {
    InvalidName(SubjectNameError),
    DuplicateName(String),
    SubjectNotFound(SubjectId),
    Repo(RepoError),
}

impl Display for SubjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "a subject named `{name}` already exists"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SubjectNameError> for SubjectServiceError {
    fn from(value: SubjectNameError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<RepoError> for SubjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::SubjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Subject facade over a repository implementation.
pub struct SubjectService<S: SubjectRepository> {
    repo: S,
}

impl<S: SubjectRepository> SubjectService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    /// Creates a subject for `owner` after name validation and the
    /// duplicate check.
    pub fn create_subject(
        &self,
        owner: &UserAccount,
        name: &str,
    ) -> Result<Subject, SubjectServiceError> {
        let name = normalize_subject_name(name)?;
        if self.repo.subject_name_exists(owner.id, &name)? {
            return Err(SubjectServiceError::DuplicateName(name));
        }

        let subject = Subject::new(name);
        match self.repo.create_subject(owner.id, &subject) {
            Ok(_) => {}
            Err(RepoError::Conflict(_)) => {
                return Err(SubjectServiceError::DuplicateName(subject.name));
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            "event=subject_create module=subject status=ok subject_id={}",
            subject.id
        );
        Ok(subject)
    }

    /// Lists the owner's subjects, newest first.
    pub fn list_subjects(&self, owner: &UserAccount) -> Result<Vec<Subject>, SubjectServiceError> {
        Ok(self.repo.list_subjects(owner.id)?)
    }

    pub fn get_subject(
        &self,
        owner: &UserAccount,
        id: SubjectId,
    ) -> Result<Subject, SubjectServiceError> {
        self.repo
            .get_subject(owner.id, id)?
            .ok_or(SubjectServiceError::SubjectNotFound(id))
    }

    pub fn subject_name_exists(
        &self,
        owner: &UserAccount,
        name: &str,
    ) -> Result<bool, SubjectServiceError> {
        Ok(self.repo.subject_name_exists(owner.id, name.trim())?)
    }

    /// Deletes a subject together with all of its notes.
    pub fn delete_subject(
        &self,
        owner: &UserAccount,
        id: SubjectId,
    ) -> Result<(), SubjectServiceError> {
        self.repo.delete_subject(owner.id, id)?;
        info!("event=subject_delete module=subject status=ok subject_id={id}");
        Ok(())
    }
}
