//! User credential repository.
//!
//! # Invariants
//! - Emails are stored exactly as given; callers pass `normalize_email` output.
//! - A duplicate email surfaces as `RepoError::Conflict`.

use crate::model::user::{UserAccount, UserRecord};
use crate::repo::{is_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Persistence contract for identity records.
pub trait UserRepository {
    fn create_user(&self, record: &UserRecord) -> RepoResult<()>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, record: &UserRecord) -> RepoResult<()> {
        let inserted = self.conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.account.id.to_string(),
                record.account.email.as_str(),
                record.password_hash.as_str(),
                record.created_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict(format!(
                "email `{}` already registered",
                record.account.email
            ))),
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, password_hash, created_at
             FROM users
             WHERE email = ?1;",
        )?;

        let mut rows = stmt.query([email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    let id_text: String = row.get("id")?;
    Ok(UserRecord {
        account: UserAccount {
            id: parse_uuid(&id_text, "users.id")?,
            email: row.get("email")?,
        },
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}
