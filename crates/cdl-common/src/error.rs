//! Unified error types for the CDL workspace.
//!
//! Parse failures (lexical and syntax errors) describe bad user input and
//! carry the source position where processing stopped. Logical errors
//! signal an internal contract violation, such as building a node from a
//! token of the wrong kind, and carry no position.

use std::fmt;

use thiserror::Error;

use crate::types::Position;

/// Top-level error type shared across the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CdlError {
    /// The source text cannot be tokenized.
    #[error("lexical error at {position}: {message}")]
    Lexical {
        /// Where tokenization stopped.
        position: Position,
        /// Description of the offending input.
        message: String,
    },

    /// Well-formed tokens violate the grammar.
    #[error("syntax error at {position}: {message}")]
    Syntax {
        /// Position of the token at which the expectation failed.
        position: Position,
        /// Description of the violated expectation.
        message: String,
    },

    /// A node construction or conversion invariant was violated.
    #[error("logical node error: {message}")]
    Logical {
        /// Description of the violated invariant.
        message: String,
    },

    /// A parsed scope is inconsistent (duplicate names, dependency cycles).
    #[error("invalid scope: {message}")]
    Semantic {
        /// Description of the inconsistency.
        message: String,
    },

    /// A referenced item was not found during resolution.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing item.
        kind: &'static str,
        /// Name of the missing item.
        id: String,
    },
}

/// Discriminant of a [`CdlError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CdlError::Lexical`].
    Lexical,
    /// See [`CdlError::Syntax`].
    Syntax,
    /// See [`CdlError::Logical`].
    Logical,
    /// See [`CdlError::Semantic`].
    Semantic,
    /// See [`CdlError::NotFound`].
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lexical => "lexical",
            Self::Syntax => "syntax",
            Self::Logical => "logical",
            Self::Semantic => "semantic",
            Self::NotFound => "not found",
        };
        f.write_str(name)
    }
}

impl CdlError {
    /// Builds a lexical error.
    pub fn lexical(position: Position, message: impl Into<String>) -> Self {
        Self::Lexical {
            position,
            message: message.into(),
        }
    }

    /// Builds a syntax error.
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Builds a logical node error.
    pub fn logical(message: impl Into<String>) -> Self {
        Self::Logical {
            message: message.into(),
        }
    }

    /// Returns the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Lexical { .. } => ErrorKind::Lexical,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Logical { .. } => ErrorKind::Logical,
            Self::Semantic { .. } => ErrorKind::Semantic,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Returns `true` for lexical and syntax errors.
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::Lexical { .. } | Self::Syntax { .. })
    }

    /// Returns `true` when the error stems from the input rather than from
    /// invalid use of the node API.
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Logical { .. })
    }

    /// Returns the source position attached to the error, if any.
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Lexical { position, .. } | Self::Syntax { position, .. } => Some(*position),
            Self::Logical { .. } | Self::Semantic { .. } | Self::NotFound { .. } => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CdlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_displays_position() {
        let err = CdlError::syntax(Position::new(5, 1, 6), "expected ','");
        assert_eq!(err.to_string(), "syntax error at 1:6: expected ','");
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.position(), Some(Position::new(5, 1, 6)));
    }

    #[test]
    fn logical_error_is_not_user_error() {
        let err = CdlError::logical("invalid value type");
        assert!(!err.is_user_error());
        assert!(!err.is_parse_error());
        assert!(err.position().is_none());
    }

    #[test]
    fn lexical_error_is_parse_error() {
        let err = CdlError::lexical(Position::start(), "unterminated string literal");
        assert!(err.is_parse_error());
        assert!(err.is_user_error());
        assert_eq!(err.kind().to_string(), "lexical");
    }

    #[test]
    fn not_found_formats_kind_and_id() {
        let err = CdlError::NotFound {
            kind: "parameter",
            id: "db.host".into(),
        };
        assert_eq!(err.to_string(), "parameter not found: db.host");
        assert!(err.is_user_error());
    }
}
