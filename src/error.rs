//! Error types for literal-expression parsing and serialization.
//!
//! All fallible operations in this crate return [`Result`]. Parse-path
//! errors ([`Error::Lex`], [`Error::Parse`]) carry the byte offset into the
//! original input plus line/column, so a caller can point at the offending
//! spot in a wire payload. Serialize-path errors are
//! [`Error::UnsupportedType`] and [`Error::DepthExceeded`].
//!
//! ## Examples
//!
//! ```rust
//! use serpentine::{parse, Error};
//!
//! let result = parse(b"{'a':1,'a':2}");
//! assert!(matches!(result, Err(Error::Parse { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors produced by the codec.
///
/// Parse-path variants carry enough positional context to diagnose a bad
/// payload without re-tokenizing it.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed token: bad escape, unterminated string, malformed number
    #[error("lex error at byte {offset} (line {line}, column {column}): {msg}")]
    Lex {
        offset: usize,
        line: usize,
        column: usize,
        msg: String,
    },

    /// Grammar violation: unexpected token, duplicate key, mixed container
    #[error("parse error at byte {offset} (line {line}, column {column}): {msg}")]
    Parse {
        offset: usize,
        line: usize,
        column: usize,
        msg: String,
    },

    /// Value matches no serializable category (e.g. a non-finite float)
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Nesting beyond the configured maximum, on either codec path
    #[error("nesting depth exceeds the configured maximum of {limit}")]
    DepthExceeded { limit: usize },

    /// IO error while writing serialized output
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error raised through the serde bridge
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a lex error at the given byte offset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serpentine::Error;
    ///
    /// let err = Error::lex(7, 1, 8, "unterminated string");
    /// assert!(err.to_string().contains("byte 7"));
    /// ```
    pub fn lex(offset: usize, line: usize, column: usize, msg: impl Into<String>) -> Self {
        Error::Lex {
            offset,
            line,
            column,
            msg: msg.into(),
        }
    }

    /// Creates a parse error at the given byte offset.
    pub fn parse(offset: usize, line: usize, column: usize, msg: impl Into<String>) -> Self {
        Error::Parse {
            offset,
            line,
            column,
            msg: msg.into(),
        }
    }

    /// Creates a parse error in the "expected X, found Y" shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serpentine::Error;
    ///
    /// let err = Error::expected(3, 1, 4, "':'", "','");
    /// assert!(err.to_string().contains("expected ':'"));
    /// ```
    pub fn expected(
        offset: usize,
        line: usize,
        column: usize,
        expected: &str,
        found: &str,
    ) -> Self {
        Error::Parse {
            offset,
            line,
            column,
            msg: format!("expected {expected}, found {found}"),
        }
    }

    /// Creates an unsupported-type error for values the format cannot express.
    pub fn unsupported_type(msg: impl Into<String>) -> Self {
        Error::UnsupportedType(msg.into())
    }

    /// Creates a depth-exceeded error for the given limit.
    pub fn depth_exceeded(limit: usize) -> Self {
        Error::DepthExceeded { limit }
    }

    /// Creates an I/O error from a writer failure.
    pub fn io(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
