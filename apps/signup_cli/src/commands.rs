use shared::{domain::FormField, error::FieldParseError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    SetField { field: FormField, value: String },
    ToggleVisibility,
    Submit,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error(transparent)]
    Field(#[from] FieldParseError),
}

pub const HELP: &str = "\
commands:
  name <value>      set the name field
  email <value>     set the email field
  password <value>  set the password field
  set <field> <v>   set any field by name
  toggle            show/hide the password
  submit            send the form
  show              redraw the form
  quit              leave (cancels an in-flight submission)";

// Field values are everything after the first space, untouched apart from the line terminator.
pub fn parse_command(line: &str) -> Result<UiCommand, CommandError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return Err(CommandError::Empty);
    }

    let (head, rest) = match line.split_once(' ') {
        Some((head, rest)) => (head, rest),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "name" | "email" | "password" => Ok(UiCommand::SetField {
            field: head.parse()?,
            value: rest.to_string(),
        }),
        "set" => {
            let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
            Ok(UiCommand::SetField {
                field: field.parse()?,
                value: value.to_string(),
            })
        }
        "toggle" => Ok(UiCommand::ToggleVisibility),
        "submit" => Ok(UiCommand::Submit),
        "show" => Ok(UiCommand::Show),
        "help" | "?" => Ok(UiCommand::Help),
        "quit" | "exit" => Ok(UiCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
