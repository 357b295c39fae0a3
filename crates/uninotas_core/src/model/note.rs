//! Note (weighted grade entry) record.
//!
//! # Invariants
//! - `note` is the grade, `percentage` its weight; both already passed
//!   `ledger::validate_entry` before a record is built for persistence.
//! - Notes are immutable once stored; there is no update path.

use crate::ledger::WeightedGrade;
use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;

/// One weighted grade inside a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Grade value on the 1.0 to 7.0 scale.
    pub note: f64,
    /// Weight in percent.
    pub percentage: f64,
    pub created_at: i64,
}

impl Note {
    /// Builds a fresh note with a generated id and the current timestamp.
    pub fn new(note: f64, percentage: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            note,
            percentage,
            created_at: now_epoch_ms(),
        }
    }
}

impl WeightedGrade for Note {
    fn grade(&self) -> f64 {
        self.note
    }

    fn weight(&self) -> f64 {
        self.percentage
    }
}
