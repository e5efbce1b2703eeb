use std::fmt;

use thiserror::Error;

/// Error classes a script can raise, named the way they are shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    IndentationError,
    NameError,
    UnboundLocalError,
    TypeError,
    ValueError,
    ZeroDivisionError,
    IndexError,
    AttributeError,
    OverflowError,
    MemoryError,
    RecursionError,
    EOFError,
    /// A fault inside the interpreter itself rather than in the script
    InternalError,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::IndentationError => "IndentationError",
            ErrorKind::NameError => "NameError",
            ErrorKind::UnboundLocalError => "UnboundLocalError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::ZeroDivisionError => "ZeroDivisionError",
            ErrorKind::IndexError => "IndexError",
            ErrorKind::AttributeError => "AttributeError",
            ErrorKind::OverflowError => "OverflowError",
            ErrorKind::MemoryError => "MemoryError",
            ErrorKind::RecursionError => "RecursionError",
            ErrorKind::EOFError => "EOFError",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A script failure: kind, message and (when known) the source line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
}

pub type ScriptResult<T> = Result<T, ScriptError>;

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    /// Syntax errors carry their line in the message as well
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::located(ErrorKind::SyntaxError, message, line)
    }

    pub fn indentation(message: impl Into<String>, line: usize) -> Self {
        Self::located(ErrorKind::IndentationError, message, line)
    }

    fn located(kind: ErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: format!("{} (line {})", message.into(), line),
            line: Some(line),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValueError, message)
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IndexError, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ZeroDivisionError, message)
    }

    pub fn overflow() -> Self {
        Self::new(ErrorKind::OverflowError, "integer result out of range")
    }

    pub fn name_error(name: &str) -> Self {
        Self::new(ErrorKind::NameError, format!("name '{}' is not defined", name))
    }

    pub fn unbound_local(name: &str) -> Self {
        Self::new(
            ErrorKind::UnboundLocalError,
            format!(
                "cannot access local variable '{}' where it is not associated with a value",
                name
            ),
        )
    }

    pub fn eof() -> Self {
        Self::new(ErrorKind::EOFError, "EOF when reading a line")
    }

    /// Attach a line number unless one is already recorded
    pub fn at_line(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_kind_colon_message() {
        let err = ScriptError::zero_division("division by zero");
        assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
    }

    #[test]
    fn test_syntax_error_mentions_line() {
        let err = ScriptError::syntax("invalid syntax", 4);
        assert_eq!(err.to_string(), "SyntaxError: invalid syntax (line 4)");
        assert_eq!(err.line, Some(4));
    }

    #[test]
    fn test_at_line_keeps_first_location() {
        let err = ScriptError::name_error("x").at_line(2).at_line(9);
        assert_eq!(err.line, Some(2));
        assert_eq!(err.message, "name 'x' is not defined");
    }
}
