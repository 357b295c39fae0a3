use rusqlite::Connection;
use uninotas_core::db::open_db_in_memory;
use uninotas_core::model::subject::SubjectNameError;
use uninotas_core::{
    IdentityProvider, LocalIdentityProvider, SqliteSubjectRepository, SqliteUserRepository,
    SubjectService, SubjectServiceError, UserAccount,
};

fn register(conn: &Connection, email: &str) -> UserAccount {
    let mut provider = LocalIdentityProvider::new(SqliteUserRepository::new(conn));
    provider.register(email, "secret123").unwrap()
}

#[test]
fn create_subject_trims_name_and_starts_with_empty_stats() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "ana@uni.cl");
    let service = SubjectService::new(SqliteSubjectRepository::new(&conn));

    let subject = service.create_subject(&owner, "  Cálculo I  ").unwrap();
    assert_eq!(subject.name, "Cálculo I");
    assert_eq!(subject.notes_count, 0);
    assert_eq!(subject.average_grade, 0.0);

    let loaded = service.get_subject(&owner, subject.id).unwrap();
    assert_eq!(loaded, subject);
}

#[test]
fn invalid_names_are_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "ana@uni.cl");
    let service = SubjectService::new(SqliteSubjectRepository::new(&conn));

    assert!(matches!(
        service.create_subject(&owner, "   ").unwrap_err(),
        SubjectServiceError::InvalidName(SubjectNameError::Empty)
    ));
    assert!(matches!(
        service.create_subject(&owner, " F ").unwrap_err(),
        SubjectServiceError::InvalidName(SubjectNameError::TooShort { min_chars: 2 })
    ));
    assert!(service.list_subjects(&owner).unwrap().is_empty());
}

#[test]
fn duplicate_names_are_rejected_case_sensitively() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "ana@uni.cl");
    let service = SubjectService::new(SqliteSubjectRepository::new(&conn));

    service.create_subject(&owner, "Física").unwrap();
    match service.create_subject(&owner, " Física ").unwrap_err() {
        SubjectServiceError::DuplicateName(name) => assert_eq!(name, "Física"),
        other => panic!("unexpected error: {other:?}"),
    }

    service.create_subject(&owner, "física").unwrap();
    assert!(service.subject_name_exists(&owner, "Física").unwrap());
    assert!(!service.subject_name_exists(&owner, "FÍSICA").unwrap());
    assert_eq!(service.list_subjects(&owner).unwrap().len(), 2);
}

#[test]
fn subjects_are_listed_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "ana@uni.cl");
    let service = SubjectService::new(SqliteSubjectRepository::new(&conn));

    for name in ["Álgebra", "Química", "Historia"] {
        service.create_subject(&owner, name).unwrap();
    }

    let names = service
        .list_subjects(&owner)
        .unwrap()
        .into_iter()
        .map(|subject| subject.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Historia", "Química", "Álgebra"]);
}

#[test]
fn subjects_are_isolated_per_owner() {
    let conn = open_db_in_memory().unwrap();
    let ana = register(&conn, "ana@uni.cl");
    let bruno = register(&conn, "bruno@uni.cl");
    let service = SubjectService::new(SqliteSubjectRepository::new(&conn));

    let subject = service.create_subject(&ana, "Física").unwrap();
    service.create_subject(&bruno, "Física").unwrap();

    assert_eq!(service.list_subjects(&ana).unwrap().len(), 1);
    assert!(matches!(
        service.get_subject(&bruno, subject.id).unwrap_err(),
        SubjectServiceError::SubjectNotFound(id) if id == subject.id
    ));
    assert!(matches!(
        service.delete_subject(&bruno, subject.id).unwrap_err(),
        SubjectServiceError::SubjectNotFound(_)
    ));
    assert!(service.get_subject(&ana, subject.id).is_ok());
}

#[test]
fn delete_subject_removes_it_and_its_notes() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "ana@uni.cl");
    let service = SubjectService::new(SqliteSubjectRepository::new(&conn));
    let subject = service.create_subject(&owner, "Física").unwrap();

    conn.execute(
        "INSERT INTO notes (id, subject_id, grade, percentage, created_at)
         VALUES ('note-1', ?1, 5.0, 30.0, 1);",
        [subject.id.to_string()],
    )
    .unwrap();

    service.delete_subject(&owner, subject.id).unwrap();

    assert!(matches!(
        service.get_subject(&owner, subject.id).unwrap_err(),
        SubjectServiceError::SubjectNotFound(_)
    ));
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
}
