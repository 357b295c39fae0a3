//! Subject record and name rules.
//!
//! # Responsibility
//! - Define the subject shape `{ id, name, createdAt, notesCount, averageGrade }`.
//! - Normalize user-entered subject names.
//!
//! # Invariants
//! - Names are trimmed and at least `MIN_SUBJECT_NAME_CHARS` characters.
//! - Name uniqueness is per owner and case-sensitive; it is checked by the
//!   service/store, not here.
//! - `notes_count`/`average_grade` mirror `SubjectStats` of the current notes.

use crate::ledger::SubjectStats;
use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type SubjectId = Uuid;

pub const MIN_SUBJECT_NAME_CHARS: usize = 2;

/// One tracked course, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub created_at: i64,
    /// Cached note count.
    pub notes_count: u32,
    /// Cached weighted average, rounded to two decimals.
    pub average_grade: f64,
}

impl Subject {
    /// Builds a new subject with zeroed stats.
    ///
    /// The caller is expected to pass a name produced by
    /// `normalize_subject_name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now_epoch_ms(),
            notes_count: 0,
            average_grade: 0.0,
        }
    }

    pub fn stats(&self) -> SubjectStats {
        SubjectStats {
            notes_count: self.notes_count,
            average_grade: self.average_grade,
        }
    }

    /// Whether an average is worth showing (at least one weighted note).
    pub fn has_average(&self) -> bool {
        self.average_grade > 0.0
    }
}

/// Rejection reasons for a subject name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectNameError {
    Empty,
    TooShort { min_chars: usize },
}

impl Display for SubjectNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "subject name cannot be empty"),
            Self::TooShort { min_chars } => {
                write!(f, "subject name must have at least {min_chars} characters")
            }
        }
    }
}

impl Error for SubjectNameError {}

/// Trims and validates a subject name.
pub fn normalize_subject_name(name: &str) -> Result<String, SubjectNameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SubjectNameError::Empty);
    }
    if trimmed.chars().count() < MIN_SUBJECT_NAME_CHARS {
        return Err(SubjectNameError::TooShort {
            min_chars: MIN_SUBJECT_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
