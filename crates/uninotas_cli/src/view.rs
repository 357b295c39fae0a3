//! Plain-text rendering of subjects and notes.

use chrono::{DateTime, Utc};
use uninotas_core::ledger::format_amount;
use uninotas_core::{GradeBand, LedgerSummary, Note, Subject};

pub fn format_date(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|moment| moment.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn subject_line(subject: &Subject) -> String {
    let average = if subject.has_average() {
        format!("average {:.2}", subject.average_grade)
    } else {
        "no average".to_string()
    };
    format!(
        "{}  {}  created {}  notes {}  {}",
        subject.id,
        subject.name,
        format_date(subject.created_at),
        subject.notes_count,
        average
    )
}

pub fn band_label(band: GradeBand) -> &'static str {
    match band {
        GradeBand::Failing => "failing",
        GradeBand::Passing => "passing",
        GradeBand::Good => "good",
    }
}

pub fn note_line(note: &Note) -> String {
    format!(
        "{}  {:.1}  {}%  {}  {}",
        note.id,
        note.note,
        format_amount(note.percentage),
        band_label(GradeBand::classify(note.note)),
        format_date(note.created_at)
    )
}

pub fn summary_line(summary: &LedgerSummary) -> String {
    let average = if summary.average_grade > 0.0 {
        format!("{:.2}", summary.average_grade)
    } else {
        "0".to_string()
    };
    format!(
        "notes {}  total {}%  available {}%  average {}",
        summary.notes_count,
        format_amount(summary.total_weight),
        format_amount(summary.remaining_weight),
        average
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uninotas_core::GradeEntry;

    #[test]
    fn dates_render_as_utc_days() {
        assert_eq!(format_date(0), "1970-01-01");
    }

    #[test]
    fn subject_without_notes_has_no_average() {
        let subject = Subject::new("Física");
        assert!(subject_line(&subject).ends_with("no average"));
    }

    #[test]
    fn summary_shows_two_decimals_and_available_weight() {
        let summary = LedgerSummary::from_notes(&[
            GradeEntry::new(6.0, 40.0),
            GradeEntry::new(4.0, 35.5),
        ]);
        let line = summary_line(&summary);
        assert!(line.contains("total 75.5%"));
        assert!(line.contains("available 24.5%"));
    }

    #[test]
    fn note_line_includes_band() {
        let note = Note::new(3.5, 20.0);
        assert!(note_line(&note).contains("20%  failing"));
    }
}
