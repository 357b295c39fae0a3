use rusqlite::Connection;
use uninotas_core::db::open_db_in_memory;
use uninotas_core::{
    EntryViolation, GradeService, GradeServiceError, IdentityProvider, LocalIdentityProvider,
    SqliteNoteRepository, SqliteSubjectRepository, SqliteUserRepository, SubjectId,
    SubjectService, SubjectStats, UserAccount,
};
use uuid::Uuid;

struct Fixture<'conn> {
    owner: UserAccount,
    subjects: SubjectService<SqliteSubjectRepository<'conn>>,
    grades: GradeService<SqliteSubjectRepository<'conn>, SqliteNoteRepository<'conn>>,
}

impl<'conn> Fixture<'conn> {
    fn new(conn: &'conn Connection) -> Self {
        let mut provider = LocalIdentityProvider::new(SqliteUserRepository::new(conn));
        let owner = provider.register("ana@uni.cl", "secret123").unwrap();
        Self {
            owner,
            subjects: SubjectService::new(SqliteSubjectRepository::new(conn)),
            grades: GradeService::new(
                SqliteSubjectRepository::new(conn),
                SqliteNoteRepository::new(conn),
            ),
        }
    }

    fn subject(&self, name: &str) -> SubjectId {
        self.subjects.create_subject(&self.owner, name).unwrap().id
    }

    fn stored_stats(&self, id: SubjectId) -> SubjectStats {
        self.subjects.get_subject(&self.owner, id).unwrap().stats()
    }
}

#[test]
fn add_note_persists_and_refreshes_cached_stats() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");

    let first = fx.grades.add_note(&fx.owner, subject_id, 6.0, 40.0).unwrap();
    assert_eq!(first.note.note, 6.0);
    assert_eq!(first.note.percentage, 40.0);
    assert_eq!(
        first.stats,
        SubjectStats {
            notes_count: 1,
            average_grade: 6.0
        }
    );

    let second = fx.grades.add_note(&fx.owner, subject_id, 3.0, 60.0).unwrap();
    assert_eq!(second.stats.notes_count, 2);
    assert_eq!(second.stats.average_grade, 4.2);
    assert_eq!(fx.stored_stats(subject_id), second.stats);
}

#[test]
fn list_notes_returns_newest_first_with_live_summary() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");
    let older = fx.grades.add_note(&fx.owner, subject_id, 5.0, 50.0).unwrap();
    let newer = fx.grades.add_note(&fx.owner, subject_id, 7.0, 50.0).unwrap();

    let listed = fx.grades.list_notes(&fx.owner, subject_id).unwrap();
    let ids = listed.notes.iter().map(|note| note.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![newer.note.id, older.note.id]);
    assert_eq!(listed.subject.id, subject_id);
    assert_eq!(listed.summary.notes_count, 2);
    assert_eq!(listed.summary.total_weight, 100.0);
    assert_eq!(listed.summary.remaining_weight, 0.0);
    assert_eq!(listed.summary.average_grade, 6.0);
    assert!(listed.summary.is_complete);
}

#[test]
fn rejected_note_leaves_store_untouched() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");
    fx.grades.add_note(&fx.owner, subject_id, 5.0, 90.0).unwrap();
    let before = fx.stored_stats(subject_id);

    let err = fx
        .grades
        .add_note(&fx.owner, subject_id, 6.0, 15.0)
        .unwrap_err();
    match err {
        GradeServiceError::Rejected(rejected) => {
            assert_eq!(
                rejected.violations,
                vec![EntryViolation::WeightLimitExceeded {
                    weight: 15.0,
                    remaining: 10.0
                }]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = fx
        .grades
        .add_note(&fx.owner, subject_id, 0.9, 5.0)
        .unwrap_err();
    assert!(matches!(err, GradeServiceError::Rejected(ref r) if r.has_grade_violation()));

    assert_eq!(fx.grades.list_notes(&fx.owner, subject_id).unwrap().notes.len(), 1);
    assert_eq!(fx.stored_stats(subject_id), before);
}

#[test]
fn remove_note_recomputes_stats_from_remaining_notes() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");
    fx.grades.add_note(&fx.owner, subject_id, 7.0, 90.0).unwrap();
    let low = fx.grades.add_note(&fx.owner, subject_id, 1.0, 10.0).unwrap();
    assert_eq!(low.stats.average_grade, 6.4);

    let stats = fx
        .grades
        .remove_note(&fx.owner, subject_id, low.note.id)
        .unwrap();
    assert_eq!(
        stats,
        SubjectStats {
            notes_count: 1,
            average_grade: 7.0
        }
    );
    assert_eq!(fx.stored_stats(subject_id), stats);

    let listed = fx.grades.list_notes(&fx.owner, subject_id).unwrap();
    let only = &listed.notes[0];
    let stats = fx.grades.remove_note(&fx.owner, subject_id, only.id).unwrap();
    assert_eq!(stats, SubjectStats::EMPTY);
}

#[test]
fn removing_unknown_note_reports_note_not_found() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");
    let other_subject = fx.subject("Química");
    let note = fx.grades.add_note(&fx.owner, other_subject, 5.0, 20.0).unwrap();

    let missing = Uuid::new_v4();
    assert!(matches!(
        fx.grades.remove_note(&fx.owner, subject_id, missing).unwrap_err(),
        GradeServiceError::NoteNotFound(id) if id == missing
    ));
    assert!(matches!(
        fx.grades
            .remove_note(&fx.owner, subject_id, note.note.id)
            .unwrap_err(),
        GradeServiceError::NoteNotFound(_)
    ));
    assert_eq!(fx.stored_stats(other_subject).notes_count, 1);
}

#[test]
fn notes_of_another_users_subject_are_unreachable() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");
    let note = fx.grades.add_note(&fx.owner, subject_id, 5.0, 20.0).unwrap();

    let mut provider = LocalIdentityProvider::new(SqliteUserRepository::new(&conn));
    let intruder = provider.register("bruno@uni.cl", "secret123").unwrap();

    assert!(matches!(
        fx.grades.add_note(&intruder, subject_id, 7.0, 10.0).unwrap_err(),
        GradeServiceError::SubjectNotFound(_)
    ));
    assert!(matches!(
        fx.grades.list_notes(&intruder, subject_id).unwrap_err(),
        GradeServiceError::SubjectNotFound(_)
    ));
    assert!(matches!(
        fx.grades
            .remove_note(&intruder, subject_id, note.note.id)
            .unwrap_err(),
        GradeServiceError::SubjectNotFound(_)
    ));
    assert_eq!(fx.stored_stats(subject_id).notes_count, 1);
}

fn lock_subject_stats(conn: &Connection) {
    conn.execute_batch(
        "CREATE TRIGGER lock_subject_stats
         BEFORE UPDATE ON subjects
         BEGIN
             SELECT RAISE(ABORT, 'subject stats are locked');
         END;",
    )
    .unwrap();
}

fn stored_note_count(conn: &Connection, subject_id: SubjectId) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM notes WHERE subject_id = ?1;",
        [subject_id.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn failed_stats_refresh_rolls_back_the_inserted_note() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");
    lock_subject_stats(&conn);

    let err = fx
        .grades
        .add_note(&fx.owner, subject_id, 6.0, 40.0)
        .unwrap_err();
    assert!(matches!(err, GradeServiceError::Repo(_)));

    assert_eq!(stored_note_count(&conn, subject_id), 0);
    assert_eq!(fx.stored_stats(subject_id), SubjectStats::EMPTY);
}

#[test]
fn failed_stats_refresh_rolls_back_the_deleted_note() {
    let conn = open_db_in_memory().unwrap();
    let fx = Fixture::new(&conn);
    let subject_id = fx.subject("Física");
    let added = fx.grades.add_note(&fx.owner, subject_id, 6.0, 40.0).unwrap();
    lock_subject_stats(&conn);

    let err = fx
        .grades
        .remove_note(&fx.owner, subject_id, added.note.id)
        .unwrap_err();
    assert!(matches!(err, GradeServiceError::Repo(_)));

    assert_eq!(stored_note_count(&conn, subject_id), 1);
    assert_eq!(fx.stored_stats(subject_id), added.stats);
}
