//! Subject repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist subjects inside their owner's namespace.
//! - Store the cached `notes_count`/`average_grade` pair.
//!
//! # Invariants
//! - Every query filters on `owner_id`; a subject of another user behaves
//!   exactly like a missing one.
//! - Lists are ordered newest first (`created_at DESC`, then insertion order).
//! - Name comparison is case-sensitive (SQLite `BINARY` collation).

use crate::ledger::SubjectStats;
use crate::model::subject::{Subject, SubjectId};
use crate::model::user::UserId;
use crate::repo::{is_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SUBJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    created_at,
    notes_count,
    average_grade
FROM subjects";

/// Persistence contract for subjects.
pub trait SubjectRepository {
    fn create_subject(&self, owner: UserId, subject: &Subject) -> RepoResult<SubjectId>;
    fn get_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<Option<Subject>>;
    /// Lists the owner's subjects, newest first.
    fn list_subjects(&self, owner: UserId) -> RepoResult<Vec<Subject>>;
    /// Exact (case-sensitive) name lookup within the owner's subjects.
    fn subject_name_exists(&self, owner: UserId, name: &str) -> RepoResult<bool>;
    /// Overwrites the cached stats of one subject.
    fn update_subject_stats(
        &self,
        owner: UserId,
        id: SubjectId,
        stats: &SubjectStats,
    ) -> RepoResult<()> {
        write_subject_stats(self.conn, owner, id, stats)
    }

    fn delete_subject(&self, owner: UserId, id: SubjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM subjects
             WHERE id = ?1
               AND owner_id = ?2;",
            params![id.to_string(), owner.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Overwrites cached stats on `conn`, which may be an open transaction.
pub(crate) fn write_subject_stats(
    conn: &Connection,
    owner: UserId,
    id: SubjectId,
    stats: &SubjectStats,
) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE subjects
         SET
            notes_count = ?1,
            average_grade = ?2
         WHERE id = ?3
           AND owner_id = ?4;",
        params![
            stats.notes_count,
            stats.average_grade,
            id.to_string(),
            owner.to_string(),
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::NotFound(id));
    }

    Ok(())
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let id_text: String = row.get("id")?;
    let notes_count = match row.get::<_, i64>("notes_count")? {
        value if value >= 0 => u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!(
                "notes_count `{value}` out of range in subjects.notes_count"
            ))
        })?,
        other => {
            return Err(RepoError::InvalidData(format!(
                "negative notes_count `{other}` in subjects.notes_count"
            )));
        }
    };

    Ok(Subject {
        id: parse_uuid(&id_text, "subjects.id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        notes_count,
        average_grade: row.get("average_grade")?,
    })
}
