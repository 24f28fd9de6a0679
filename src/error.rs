//! Error types for the wrapper.

use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Error raised by database operations.
///
/// Every variant carries the engine's numeric result code and its message
/// text; failures are never reduced to an opaque wrapper-only description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    /// Statement text rejected at prepare time: syntax error, unknown schema
    /// object, or authorizer denial.
    #[error("compile error {code}: {message}")]
    Compile {
        /// Engine result code.
        code: i32,
        /// Engine message text.
        message: String,
    },

    /// Parameter index or name invalid, or the value was rejected.
    #[error("bind error {code}: {message}")]
    Bind {
        /// Engine result code.
        code: i32,
        /// Engine message text.
        message: String,
    },

    /// Execution-time failure: constraint violation, I/O error, misuse, or
    /// an unresolved busy condition.
    #[error("step error {code}: {message}")]
    Step {
        /// Engine result code.
        code: i32,
        /// Engine message text.
        message: String,
    },

    /// Session-level failure: open, close, attach, or detach.
    #[error("connection error {code}: {message}")]
    Connection {
        /// Engine result code.
        code: i32,
        /// Engine message text.
        message: String,
    },
}

impl DbError {
    pub(crate) fn compile(code: i32, message: impl Into<String>) -> Self {
        Self::Compile { code, message: message.into() }
    }

    pub(crate) fn bind(code: i32, message: impl Into<String>) -> Self {
        Self::Bind { code, message: message.into() }
    }

    pub(crate) fn step(code: i32, message: impl Into<String>) -> Self {
        Self::Step { code, message: message.into() }
    }

    pub(crate) fn connection(code: i32, message: impl Into<String>) -> Self {
        Self::Connection { code, message: message.into() }
    }

    /// The engine's numeric result code.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Compile { code, .. }
            | Self::Bind { code, .. }
            | Self::Step { code, .. }
            | Self::Connection { code, .. } => *code,
        }
    }

    /// The engine's message text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Compile { message, .. }
            | Self::Bind { message, .. }
            | Self::Step { message, .. }
            | Self::Connection { message, .. } => message,
        }
    }

    /// Re-tags the error as a session-level failure, keeping code and
    /// message.
    pub(crate) fn into_connection(self) -> Self {
        Self::Connection {
            code: self.code(),
            message: self.message().to_string(),
        }
    }
}
