//! Centralized error handling for the Lisp core
//!
//! Every failure in the evaluator, parser, buffer, or builtin registry is a
//! value of this type rather than a panic or native exception. See
//! `SPEC_FULL.md` §7.

use crate::value::Value;
use std::fmt;

/// Category of error, per spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No error occurred; used as a placeholder in a few C-style call sites.
    None,
    Generic,
    Syntax,
    NotBound,
    Arguments,
    Type,
    Memory,
    /// Feature acknowledged but not implemented.
    Todo,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Generic => "GENERIC",
            Self::Syntax => "SYNTAX",
            Self::NotBound => "NOT_BOUND",
            Self::Arguments => "ARGUMENTS",
            Self::Type => "TYPE",
            Self::Memory => "MEMORY",
            Self::Todo => "TODO",
        };
        write!(f, "{s}")
    }
}

/// A structured error carrying the offending form, a short message, and an
/// optional suggestion, per spec §7.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
    pub form: Option<Value>,
}

impl LiteError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            suggestion: None,
            form: None,
        }
    }

    #[must_use]
    pub fn with_form(mut self, form: Value) -> Self {
        self.form = Some(form);
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn not_bound(name: &str) -> Self {
        Self::new(
            ErrorKind::NotBound,
            "UNBOUND_SYMBOL",
            format!("Unbound symbol: {name}"),
        )
    }

    pub fn arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Arguments, "ARGUMENT_ERROR", message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, "TYPE_ERROR", message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, "SYNTAX_ERROR", message)
    }

    /// Check if the message contains a substring (useful for tests).
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }
}

impl fmt::Display for LiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.kind, self.code, self.message)?;
        if let Some(s) = &self.suggestion {
            write!(f, " (suggestion: {s})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LiteError {}

impl From<std::io::Error> for LiteError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Generic, "IO_ERROR", err.to_string())
    }
}

impl From<String> for LiteError {
    fn from(msg: String) -> Self {
        Self::new(ErrorKind::Generic, "GENERIC_ERROR", msg)
    }
}

impl From<&str> for LiteError {
    fn from(msg: &str) -> Self {
        Self::new(ErrorKind::Generic, "GENERIC_ERROR", msg)
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, LiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_code_message() {
        let e = LiteError::not_bound("FOO");
        let s = e.to_string();
        assert!(s.contains("NOT_BOUND"));
        assert!(s.contains("UNBOUND_SYMBOL"));
        assert!(s.contains("FOO"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let e: LiteError = io.into();
        assert_eq!(e.kind, ErrorKind::Generic);
    }
}
