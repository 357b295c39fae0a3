//! Grade (note) use-case service.
//!
//! # Responsibility
//! - Validate candidate notes against the subject's current note set.
//! - Keep each subject's cached `notes_count`/`average_grade` in step with
//!   its notes after every mutation.
//!
//! # Invariants
//! - The parent subject must belong to the caller before any note access.
//! - Validation runs before any write.
//! - Stats are always recomputed from a fresh read of the store, never
//!   patched incrementally, and are written in the same transaction as the
//!   note insert or delete.
//!
//! Concurrent writers in different sessions can both pass the weight
//! ceiling against their own snapshot; nothing here serializes them.

use crate::ledger::{validate_entry, EntryRejected, LedgerSummary, SubjectStats};
use crate::model::note::{Note, NoteId};
use crate::model::subject::{Subject, SubjectId};
use crate::model::user::UserAccount;
use crate::repo::note_repo::NoteRepository;
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum GradeServiceError {
    /// Candidate note failed ledger validation.
    Rejected(EntryRejected),
    SubjectNotFound(SubjectId),
    NoteNotFound(NoteId),
    Repo(RepoError),
}

impl Display for GradeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(rejected) => write!(f, "note rejected: {rejected}"),
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GradeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GradeServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<EntryRejected> for GradeServiceError {
    fn from(value: EntryRejected) -> Self {
        Self::Rejected(value)
    }
}

/// Result of a successful `add_note`.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteAdded {
    pub note: Note,
    /// Cached stats after the insert.
    pub stats: SubjectStats,
}

/// A subject together with its notes and live ledger figures.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectNotes {
    pub subject: Subject,
    /// Newest first.
    pub notes: Vec<Note>,
    pub summary: LedgerSummary,
}

/// Orchestrates note writes and the stats recomputation that follows them.
pub struct GradeService<S: SubjectRepository, N: NoteRepository> {
    subjects: S,
    notes: N,
}

impl<S: SubjectRepository, N: NoteRepository> GradeService<S, N> {
    pub fn new(subjects: S, notes: N) -> Self {
        Self { subjects, notes }
    }

    /// Validates one note, then stores it and refreshes the subject's stats
    /// in a single transaction.
    pub fn add_note(
        &self,
        owner: &UserAccount,
        subject_id: SubjectId,
        grade: f64,
        weight: f64,
    ) -> Result<NoteAdded, GradeServiceError> {
        self.require_subject(owner, subject_id)?;
        let existing = self.notes.list_notes(subject_id)?;
        validate_entry(grade, weight, &existing)?;

        let note = Note::new(grade, weight);
        let stats = self
            .notes
            .create_note(owner.id, subject_id, &note)
            .map_err(|err| write_failed("note_create", subject_id, err))?;

        info!(
            "event=note_create module=grade status=ok subject_id={subject_id} note_id={} notes_count={}",
            note.id, stats.notes_count
        );
        Ok(NoteAdded { note, stats })
    }

    /// Loads a subject's notes and computes its live summary.
    pub fn list_notes(
        &self,
        owner: &UserAccount,
        subject_id: SubjectId,
    ) -> Result<SubjectNotes, GradeServiceError> {
        let subject = self.require_subject(owner, subject_id)?;
        let notes = self.notes.list_notes(subject_id)?;
        let summary = LedgerSummary::from_notes(&notes);
        Ok(SubjectNotes {
            subject,
            notes,
            summary,
        })
    }

    /// Deletes one note and refreshes the subject's stats in one transaction.
    pub fn remove_note(
        &self,
        owner: &UserAccount,
        subject_id: SubjectId,
        note_id: NoteId,
    ) -> Result<SubjectStats, GradeServiceError> {
        self.require_subject(owner, subject_id)?;
        let stats = match self.notes.delete_note(owner.id, subject_id, note_id) {
            Ok(stats) => stats,
            Err(RepoError::NotFound(id)) if id == note_id => {
                return Err(GradeServiceError::NoteNotFound(note_id));
            }
            Err(err) => return Err(write_failed("note_delete", subject_id, err)),
        };
        info!(
            "event=note_delete module=grade status=ok subject_id={subject_id} note_id={note_id} notes_count={}",
            stats.notes_count
        );
        Ok(stats)
    }

    /// Recomputes cached stats from the stored notes and persists them.
    pub fn refresh_subject_stats(
        &self,
        owner: &UserAccount,
        subject_id: SubjectId,
    ) -> Result<SubjectStats, GradeServiceError> {
        let notes = self.notes.list_notes(subject_id)?;
        let stats = SubjectStats::from_notes(&notes);
        self.subjects
            .update_subject_stats(owner.id, subject_id, &stats)
            .map_err(|err| write_failed("subject_stats", subject_id, err))?;
        Ok(stats)
    }

    fn require_subject(
        &self,
        owner: &UserAccount,
        subject_id: SubjectId,
    ) -> Result<Subject, GradeServiceError> {
        self.subjects
            .get_subject(owner.id, subject_id)?
            .ok_or(GradeServiceError::SubjectNotFound(subject_id))
    }
}

fn write_failed(event: &'static str, subject_id: SubjectId, err: RepoError) -> GradeServiceError {
    match err {
        RepoError::NotFound(_) => GradeServiceError::SubjectNotFound(subject_id),
        other => {
            error!("event={event} module=grade status=error subject_id={subject_id} error={other}");
            other.into()
        }
    }
}
