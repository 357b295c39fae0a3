//! Grade ledger: weighted-grade validation and aggregate statistics.
//!
//! # Responsibility
//! - Validate candidate grade entries against range and weight-ceiling rules.
//! - Compute weight-normalized averages and cached subject statistics.
//!
//! # Invariants
//! - Grades live in `[MIN_GRADE, MAX_GRADE]`.
//! - Weights live in `(0, MAX_TOTAL_WEIGHT]`.
//! - The weights of one subject never sum above `MAX_TOTAL_WEIGHT`.
//! - Every function here is pure: no I/O, no shared state.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest accepted grade (inclusive).
pub const MIN_GRADE: f64 = 1.0;
/// Highest accepted grade (inclusive).
pub const MAX_GRADE: f64 = 7.0;
/// Ceiling for the summed weights of one subject, in percent.
pub const MAX_TOTAL_WEIGHT: f64 = 100.0;

/// Float slack for `is_weight_complete` only; the ceiling itself is strict.
const WEIGHT_EPSILON: f64 = 1e-9;

const PASSING_GRADE: f64 = 4.0;
const GOOD_GRADE: f64 = 5.5;

/// Read access to the two numbers the ledger cares about.
pub trait WeightedGrade {
    fn grade(&self) -> f64;
    /// Weight in percent.
    fn weight(&self) -> f64;
}

/// Plain in-memory grade entry, used before anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub grade: f64,
    pub weight: f64,
}

impl GradeEntry {
    pub fn new(grade: f64, weight: f64) -> Self {
        Self { grade, weight }
    }
}

impl WeightedGrade for GradeEntry {
    fn grade(&self) -> f64 {
        self.grade
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// One reason a candidate entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryViolation {
    /// Grade is not a finite number inside `[MIN_GRADE, MAX_GRADE]`.
    GradeOutOfRange { grade: f64 },
    /// Weight is not a finite number inside `(0, MAX_TOTAL_WEIGHT]`.
    WeightOutOfRange { weight: f64 },
    /// Adding the weight would push the subject above the ceiling.
    WeightLimitExceeded { weight: f64, remaining: f64 },
}

impl Display for EntryViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GradeOutOfRange { .. } => write!(
                f,
                "the grade must be a number between {MIN_GRADE:.1} and {MAX_GRADE:.1}"
            ),
            Self::WeightOutOfRange { .. } => write!(
                f,
                "the percentage must be a number greater than 0 and at most {MAX_TOTAL_WEIGHT}"
            ),
            Self::WeightLimitExceeded { remaining, .. } => write!(
                f,
                "the total percentage would exceed {MAX_TOTAL_WEIGHT}%; available: {}%",
                format_amount(*remaining)
            ),
        }
    }
}

impl Error for EntryViolation {}

/// Rejection envelope for `validate_entry`: never empty, in check order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRejected {
    pub violations: Vec<EntryViolation>,
}

impl EntryRejected {
    /// Remaining weight reported by a ceiling violation, if any.
    pub fn remaining_weight(&self) -> Option<f64> {
        self.violations.iter().find_map(|violation| match violation {
            EntryViolation::WeightLimitExceeded { remaining, .. } => Some(*remaining),
            _ => None,
        })
    }

    pub fn has_grade_violation(&self) -> bool {
        self.violations
            .iter()
            .any(|violation| matches!(violation, EntryViolation::GradeOutOfRange { .. }))
    }
}

impl Display for EntryRejected {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reasons = self
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        write!(f, "{}", reasons.join("; "))
    }
}

impl Error for EntryRejected {}

/// Validates one candidate entry against the subject's existing entries.
///
/// Checks run in a fixed order (grade, weight, ceiling) and every failing
/// check is reported. The ceiling is only evaluated for a finite weight.
pub fn validate_entry<E: WeightedGrade>(
    grade: f64,
    weight: f64,
    existing: &[E],
) -> Result<(), EntryRejected> {
    let mut violations = Vec::new();

    if !is_valid_grade(grade) {
        violations.push(EntryViolation::GradeOutOfRange { grade });
    }

    if !is_valid_weight(weight) {
        violations.push(EntryViolation::WeightOutOfRange { weight });
    }

    if weight.is_finite() {
        let current = total_weight(existing);
        if current + weight > MAX_TOTAL_WEIGHT {
            violations.push(EntryViolation::WeightLimitExceeded {
                weight,
                remaining: MAX_TOTAL_WEIGHT - current,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(EntryRejected { violations })
    }
}

pub fn is_valid_grade(grade: f64) -> bool {
    grade.is_finite() && (MIN_GRADE..=MAX_GRADE).contains(&grade)
}

pub fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0 && weight <= MAX_TOTAL_WEIGHT
}

/// Sum of all weights; `0` for an empty set.
pub fn total_weight<E: WeightedGrade>(entries: &[E]) -> f64 {
    entries.iter().map(WeightedGrade::weight).sum()
}

/// Weight still available before the ceiling is reached.
pub fn remaining_weight<E: WeightedGrade>(entries: &[E]) -> f64 {
    MAX_TOTAL_WEIGHT - total_weight(entries)
}

/// Whether the entries already use the whole weight budget.
pub fn is_weight_complete<E: WeightedGrade>(entries: &[E]) -> bool {
    (total_weight(entries) - MAX_TOTAL_WEIGHT).abs() <= WEIGHT_EPSILON
}

/// Weight-normalized average: `Σ(grade × weight) / Σ weight`.
///
/// Returns `0` when the set is empty or carries no weight. The result is not
/// rounded; see `round_to_cents` for the cached/presented value.
pub fn weighted_average<E: WeightedGrade>(entries: &[E]) -> f64 {
    let total = total_weight(entries);
    if total <= 0.0 {
        return 0.0;
    }

    let weighted_sum: f64 = entries
        .iter()
        .map(|entry| entry.grade() * entry.weight())
        .sum();
    weighted_sum / total
}

/// Rounds to two decimals, half away from zero.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cached per-subject aggregate, derived from its full note set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub notes_count: u32,
    /// Weighted average rounded to two decimals.
    pub average_grade: f64,
}

impl SubjectStats {
    pub const EMPTY: Self = Self {
        notes_count: 0,
        average_grade: 0.0,
    };

    pub fn from_notes<E: WeightedGrade>(entries: &[E]) -> Self {
        Self {
            notes_count: u32::try_from(entries.len()).unwrap_or(u32::MAX),
            average_grade: round_to_cents(weighted_average(entries)),
        }
    }
}

/// Everything a subject page shows above its note list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub notes_count: u32,
    pub total_weight: f64,
    pub remaining_weight: f64,
    /// Weighted average rounded to two decimals.
    pub average_grade: f64,
    pub is_complete: bool,
}

impl LedgerSummary {
    pub fn from_notes<E: WeightedGrade>(entries: &[E]) -> Self {
        let stats = SubjectStats::from_notes(entries);
        Self {
            notes_count: stats.notes_count,
            total_weight: total_weight(entries),
            remaining_weight: remaining_weight(entries),
            average_grade: stats.average_grade,
            is_complete: is_weight_complete(entries),
        }
    }
}

/// Colour band of a grade on the 1.0 to 7.0 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    /// Below 4.0.
    Failing,
    /// 4.0 up to (not including) 5.5.
    Passing,
    /// 5.5 and above.
    Good,
}

impl GradeBand {
    pub fn classify(grade: f64) -> Self {
        if grade < PASSING_GRADE {
            Self::Failing
        } else if grade < GOOD_GRADE {
            Self::Passing
        } else {
            Self::Good
        }
    }
}

/// Formats an amount without a trailing `.0` for whole numbers.
pub fn format_amount(value: f64) -> String {
    let rounded = round_to_cents(value);
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded}")
    }
}
