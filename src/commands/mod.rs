pub mod executable;
pub mod get;
pub mod set;

use std::str;
use thiserror::Error as ThisError;

use crate::codec::Line;
use crate::commands::executable::Executable;
use crate::response::Response;
use crate::store::Store;

use get::Get;
use set::Set;

#[derive(Debug, PartialEq)]
pub enum Command {
    Get(Get),
    Set(Set),
}

impl Executable for Command {
    fn exec(self, store: &Store) -> Response {
        match self {
            Command::Get(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Line> for Command {
    type Error = ParseError;

    fn try_from(line: Line) -> Result<Self, Self::Error> {
        let text = str::from_utf8(line.as_bytes())?;
        let parser = &mut CommandParser::new(text);

        let command_name = parser.next_token().ok_or(ParseError::EmptyLine)?;

        // Command words are matched case-insensitively; keys and values
        // are taken verbatim.
        match command_name.to_ascii_lowercase().as_str() {
            "get" => Get::try_from(parser).map(Command::Get),
            "set" => Set::try_from(parser).map(Command::Set),
            _ => Err(ParseError::UnknownCommand {
                command: command_name.to_string(),
            }),
        }
    }
}

/// Walks the whitespace-separated tokens of one command line.
pub(crate) struct CommandParser<'a> {
    parts: str::SplitWhitespace<'a>,
}

impl<'a> CommandParser<'a> {
    fn new(line: &'a str) -> CommandParser<'a> {
        CommandParser {
            parts: line.split_whitespace(),
        }
    }

    pub(crate) fn next_token(&mut self) -> Option<&'a str> {
        self.parts.next()
    }

    /// Fails if any token remains. Keys and values are single
    /// whitespace-free tokens, so trailing input means a malformed command.
    pub(crate) fn finish(&mut self, command: &'static str) -> Result<(), ParseError> {
        match self.parts.next() {
            Some(_) => Err(ParseError::WrongArity { command }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    EmptyLine,
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("wrong number of arguments for '{command}'")]
    WrongArity { command: &'static str },
    #[error("invalid UTF-8 in command")]
    InvalidUtf8(#[from] str::Utf8Error),
}
