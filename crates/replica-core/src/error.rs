//! Error types for the capture/replay engine

use crate::events::KeyToken;
use crate::session::SessionState;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced at the control-surface boundary. All recoverable by the
/// caller; none of these crash the process.
#[derive(Error, Debug)]
pub enum Error {
    /// Non-positive speed or zero repeats; stored config is left untouched
    #[error("invalid playback config: {0}")]
    InvalidConfig(String),

    /// Malformed macro file content; the in-memory log is left untouched
    #[error("macro parse error: {0}")]
    Parse(#[from] ParseError),

    /// File open/read/write/rename failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation not legal in the current session state
    #[error("cannot {action} while {state}")]
    IllegalState {
        action: &'static str,
        state: SessionState,
    },

    /// Key token with no entry in the key table; playback skips the event
    #[error("no key mapping for token '{0}'")]
    UnresolvedKey(KeyToken),

    /// OS refused the global input hook (missing capture permission, or the
    /// listener died). Startup-fatal for recording, but reported, not thrown.
    #[error("failed to install input hook: {0}")]
    HookInstall(String),

    /// Synthetic event was not delivered; playback logs and continues
    #[error("failed to emit synthetic input: {0}")]
    Emit(String),
}

/// Parse failure for one line of a macro file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number in the decoded text
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unknown event tag '{0}'")]
    UnknownTag(String),

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid integer '{0}'")]
    InvalidInt(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid boolean '{0}'")]
    InvalidBool(String),

    #[error("unknown button '{0}'")]
    UnknownButton(String),

    #[error("empty key token")]
    EmptyToken,

    #[error("unterminated quoted string")]
    UnterminatedString,

    #[error("unexpected character '{0}' after quoted string")]
    TrailingChars(char),

    #[error("invalid escape sequence '\\{0}'")]
    BadEscape(char),

    #[error("expected a quoted string")]
    ExpectedString,

    #[error("expected a bare literal")]
    ExpectedLiteral,
}
