//! `uninotas` command-line front-end.
//!
//! # Responsibility
//! - Load configuration, start logging and open the grade store.
//! - Construct the `GradeBook` and run exactly one command against it.

mod cli;
mod config;
mod view;

use cli::{parse_command, Command, USAGE};
use config::{Config, EMAIL_KEY, PASSWORD_KEY};
use log::{debug, info};
use std::process::ExitCode;
use uninotas_core::db::open_db;
use uninotas_core::{core_version, init_logging, SqliteGradeBook, UserAccount};

fn main() -> ExitCode {
    let config = Config::load();
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }
    config.log_notices();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&config, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, command: Command) -> Result<(), String> {
    match command {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Version => {
            println!("uninotas {}", core_version());
            return Ok(());
        }
        _ => {}
    }

    let conn = open_db(&config.db_path)
        .map_err(|err| format!("could not open {}: {err}", config.db_path.display()))?;
    let mut book = SqliteGradeBook::with_connection(&conn);
    book.on_session_change(Box::new(|user: Option<&UserAccount>| match user {
        Some(account) => info!(
            "event=session_change module=cli status=signed_in user_id={}",
            account.id
        ),
        None => debug!("event=session_change module=cli status=signed_out"),
    }));

    if command.requires_session() {
        let (Some(email), Some(password)) = (config.email.as_deref(), config.password.as_deref())
        else {
            return Err(format!("set {EMAIL_KEY} and {PASSWORD_KEY} to sign in"));
        };
        book.login(email, password)
            .map_err(|err| err.user_message())?;
    }

    let outcome = execute(&mut book, command);
    if book.current_user().is_some() {
        book.logout().map_err(|err| err.user_message())?;
    }
    outcome
}

fn execute(book: &mut SqliteGradeBook<'_>, command: Command) -> Result<(), String> {
    match command {
        Command::Help | Command::Version => {}
        Command::Register {
            email,
            password,
            confirm_password,
        } => {
            let account = book
                .register(&email, &password, &confirm_password)
                .map_err(|err| err.user_message())?;
            println!("Account created for {}.", account.email);
        }
        Command::Subjects => {
            let subjects = book.list_subjects().map_err(|err| err.user_message())?;
            if subjects.is_empty() {
                println!("No subjects yet.");
            }
            for subject in &subjects {
                println!("{}", view::subject_line(subject));
            }
        }
        Command::AddSubject { name } => {
            let subject = book
                .create_subject(&name)
                .map_err(|err| err.user_message())?;
            println!("{}", view::subject_line(&subject));
        }
        Command::RemoveSubject { subject_id } => {
            book.delete_subject(subject_id)
                .map_err(|err| err.user_message())?;
            println!("Subject removed.");
        }
        Command::Notes { subject_id } => {
            let page = book
                .list_notes(subject_id)
                .map_err(|err| err.user_message())?;
            println!("{}", page.subject.name);
            println!("{}", view::summary_line(&page.summary));
            for note in &page.notes {
                println!("{}", view::note_line(note));
            }
        }
        Command::AddNote {
            subject_id,
            grade,
            percentage,
        } => {
            let added = book
                .add_note(subject_id, grade, percentage)
                .map_err(|err| err.user_message())?;
            println!("{}", view::note_line(&added.note));
            println!(
                "notes {}  average {:.2}",
                added.stats.notes_count, added.stats.average_grade
            );
        }
        Command::RemoveNote {
            subject_id,
            note_id,
        } => {
            let stats = book
                .remove_note(subject_id, note_id)
                .map_err(|err| err.user_message())?;
            println!(
                "Note removed. notes {}  average {:.2}",
                stats.notes_count, stats.average_grade
            );
        }
    }
    Ok(())
}
