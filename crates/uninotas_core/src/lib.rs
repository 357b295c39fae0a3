//! Core domain logic for UniNotas, a weighted grade tracker.
//! This crate is the single source of truth for grade and ownership invariants.

pub mod app;
pub mod auth;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use app::{AppError, AppResult, GradeBook, SqliteGradeBook};
pub use auth::credentials::CredentialError;
pub use auth::{
    AuthError, AuthResult, IdentityProvider, LocalIdentityProvider, SessionHandler,
    SubscriptionId,
};
pub use ledger::{
    remaining_weight, round_to_cents, total_weight, validate_entry, weighted_average,
    EntryRejected, EntryViolation, GradeBand, GradeEntry, LedgerSummary, SubjectStats,
    WeightedGrade,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId};
pub use model::subject::{Subject, SubjectId};
pub use model::user::{UserAccount, UserId};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::grade_service::{GradeService, GradeServiceError, NoteAdded, SubjectNotes};
pub use service::subject_service::{SubjectService, SubjectServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
