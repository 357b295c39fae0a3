//! Domain records for users, subjects and their weighted grades.
//!
//! # Responsibility
//! - Define the records persisted by the document store.
//! - Own input normalization rules that apply before persistence.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at creation.
//! - Timestamps are Unix epoch milliseconds.
//! - Serialized shapes use camelCase field names.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod note;
pub mod subject;
pub mod user;

/// Current wall-clock time in epoch milliseconds.
///
/// Clocks before the epoch collapse to `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
