use crate::{ExecuteError, ImplementationError, LexError, ParseError, Position};
use std::fmt::{Display, Formatter};

impl LexError {
    pub fn new(position: Position, message: String) -> Self {
        Self { position, message }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LexError: {} at {}", self.message, self.position)
    }
}

impl ParseError {
    pub fn new(position: Position, message: String) -> Self {
        Self { position, message }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyntaxError: {} at {}", self.message, self.position)
    }
}

impl ImplementationError {
    pub fn new(what: String, message: String) -> Self {
        Self { message, what }
    }
}

impl Display for ImplementationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImplementationError: {}-{}", self.what, self.message)
    }
}

impl From<LexError> for ExecuteError {
    fn from(error: LexError) -> Self {
        ExecuteError::Lex(error)
    }
}

impl From<ParseError> for ExecuteError {
    fn from(error: ParseError) -> Self {
        ExecuteError::Parse(error)
    }
}

impl ExecuteError {
    /// The source position the error is anchored to.
    pub fn position(&self) -> Position {
        match self {
            ExecuteError::CommandNotFound { position, .. }
            | ExecuteError::Validation { position, .. }
            | ExecuteError::Runtime { position, .. }
            | ExecuteError::Expansion { position, .. } => *position,
            ExecuteError::Lex(error) => error.position,
            ExecuteError::Parse(error) => error.position,
        }
    }
}

impl Display for ExecuteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::CommandNotFound { name, position } => {
                write!(
                    f,
                    "error resolving command \"{}\": command not found, at {}",
                    name, position
                )
            }
            ExecuteError::Validation {
                command,
                position,
                message,
            } => {
                write!(
                    f,
                    "error validating command \"{}\": {}, at {}",
                    command, message, position
                )
            }
            ExecuteError::Runtime { position, message } => {
                write!(f, "runtime error: {} at {}", message, position)
            }
            ExecuteError::Lex(error) => write!(f, "{}", error),
            ExecuteError::Parse(error) => write!(f, "{}", error),
            ExecuteError::Expansion {
                command,
                position,
                source,
            } => {
                write!(
                    f,
                    "error expanding command \"{}\" at {}: {}",
                    command, position, source
                )
            }
        }
    }
}
