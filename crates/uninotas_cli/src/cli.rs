//! Argument parsing for the `uninotas` binary.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const USAGE: &str = "usage: uninotas <command> [args]

commands:
  version
  register <email> <password> <confirm-password>
  subjects
  add-subject <name>
  remove-subject <subject-id>
  notes <subject-id>
  add-note <subject-id> <grade> <percentage>
  remove-note <subject-id> <note-id>

data commands sign in with UNINOTAS_EMAIL and UNINOTAS_PASSWORD";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Version,
    Register {
        email: String,
        password: String,
        confirm_password: String,
    },
    Subjects,
    AddSubject {
        name: String,
    },
    RemoveSubject {
        subject_id: Uuid,
    },
    Notes {
        subject_id: Uuid,
    },
    AddNote {
        subject_id: Uuid,
        grade: f64,
        percentage: f64,
    },
    RemoveNote {
        subject_id: Uuid,
        note_id: Uuid,
    },
}

impl Command {
    /// Whether the command needs a signed-in user.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::Help | Self::Version | Self::Register { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl Display for UsageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for UsageError {}

/// Parses the arguments that follow the program name.
pub fn parse_command(args: &[String]) -> Result<Command, UsageError> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match name.as_str() {
        "help" | "-h" | "--help" => Ok(Command::Help),
        "version" | "--version" => Ok(Command::Version),
        "register" => {
            let [email, password, confirm_password] = exact::<3>(name, rest)?;
            Ok(Command::Register {
                email,
                password,
                confirm_password,
            })
        }
        "subjects" => {
            exact::<0>(name, rest)?;
            Ok(Command::Subjects)
        }
        "add-subject" => {
            if rest.is_empty() {
                return Err(UsageError("add-subject expects a name".to_string()));
            }
            Ok(Command::AddSubject {
                name: rest.join(" "),
            })
        }
        "remove-subject" => {
            let [subject_id] = exact::<1>(name, rest)?;
            Ok(Command::RemoveSubject {
                subject_id: parse_id("subject-id", &subject_id)?,
            })
        }
        "notes" => {
            let [subject_id] = exact::<1>(name, rest)?;
            Ok(Command::Notes {
                subject_id: parse_id("subject-id", &subject_id)?,
            })
        }
        "add-note" => {
            let [subject_id, grade, percentage] = exact::<3>(name, rest)?;
            Ok(Command::AddNote {
                subject_id: parse_id("subject-id", &subject_id)?,
                grade: parse_number("grade", &grade)?,
                percentage: parse_number("percentage", &percentage)?,
            })
        }
        "remove-note" => {
            let [subject_id, note_id] = exact::<2>(name, rest)?;
            Ok(Command::RemoveNote {
                subject_id: parse_id("subject-id", &subject_id)?,
                note_id: parse_id("note-id", &note_id)?,
            })
        }
        other => Err(UsageError(format!("unknown command `{other}`"))),
    }
}

fn exact<const N: usize>(command: &str, rest: &[String]) -> Result<[String; N], UsageError> {
    <[String; N]>::try_from(rest.to_vec()).map_err(|_| {
        UsageError(format!(
            "{command} expects {N} argument(s), got {}",
            rest.len()
        ))
    })
}

fn parse_id(label: &str, value: &str) -> Result<Uuid, UsageError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| UsageError(format!("{label} `{value}` is not a valid id")))
}

/// Accepts `5,5` as well as `5.5`.
fn parse_number(label: &str, value: &str) -> Result<f64, UsageError> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| UsageError(format!("{label} `{value}` is not a number")))
}
