//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist weighted grade entries under their subject.
//! - Keep the parent subject's cached stats in the same transaction as
//!   every note write.
//!
//! # Invariants
//! - Notes are insert/delete only; there is no update statement.
//! - A note write and the stats refresh commit together or not at all.
//! - Lists are ordered newest first (`created_at DESC`, then insertion order).
//! - Ownership of the parent subject is checked by the caller before any
//!   note operation; the stats refresh is additionally scoped by owner.

use crate::ledger::SubjectStats;
use crate::model::note::{Note, NoteId};
use crate::model::subject::SubjectId;
use crate::model::user::UserId;
use crate::repo::subject_repo::write_subject_stats;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Persistence contract for notes of one subject.
pub trait NoteRepository {
    /// Inserts `note` and refreshes the parent's cached stats atomically.
    fn create_note(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        note: &Note,
    ) -> RepoResult<SubjectStats>;
    /// Lists a subject's notes, newest first.
    fn list_notes(&self, subject_id: SubjectId) -> RepoResult<Vec<Note>>;
    /// Deletes one note and refreshes the parent's cached stats atomically.
    ///
    /// A missing note yields `RepoError::NotFound(note_id)`.
    fn delete_note(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        note_id: NoteId,
    ) -> RepoResult<SubjectStats>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        note: &Note,
    ) -> RepoResult<SubjectStats> {
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO notes (id, subject_id, grade, percentage, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                subject_id.to_string(),
                note.note,
                note.percentage,
                note.created_at,
            ],
        )?;

        let stats = refresh_stats_in_tx(&tx, owner, subject_id)?;
        tx.commit()?;
        Ok(stats)
    }

    fn list_notes(&self, subject_id: SubjectId) -> RepoResult<Vec<Note>> {
        query_notes(self.conn, subject_id)
    }

    fn delete_note(
        &self,
        owner: UserId,
        subject_id: SubjectId,
        note_id: NoteId,
    ) -> RepoResult<SubjectStats> {
        let tx = self.begin()?;
        let changed = tx.execute(
            "DELETE FROM notes
             WHERE id = ?1
               AND subject_id = ?2;",
            params![note_id.to_string(), subject_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(note_id));
        }

        let stats = refresh_stats_in_tx(&tx, owner, subject_id)?;
        tx.commit()?;
        Ok(stats)
    }
}

fn refresh_stats_in_tx(
    tx: &Transaction<'_>,
    owner: UserId,
    subject_id: SubjectId,
) -> RepoResult<SubjectStats> {
    let notes = query_notes(tx, subject_id)?;
    let stats = SubjectStats::from_notes(&notes);
    write_subject_stats(tx, owner, subject_id, &stats)?;
    Ok(stats)
}

fn query_notes(conn: &Connection, subject_id: SubjectId) -> RepoResult<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, grade, percentage, created_at
         FROM notes
         WHERE subject_id = ?1
         ORDER BY created_at DESC, rowid DESC;",
    )?;

    let mut rows = stmt.query([subject_id.to_string()])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }

    Ok(notes)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        note: row.get("grade")?,
        percentage: row.get("percentage")?,
        created_at: row.get("created_at")?,
    })
}
