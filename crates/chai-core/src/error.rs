use std::fmt;

use crate::store::StoreError;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TaskNotFound,
    AmbiguousToken,
    AlreadyDone,
    InvalidRecurrence,
    CorruptStore,
    StoreReadFailed,
    StoreWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::TaskNotFound => "E2001",
            Self::AmbiguousToken => "E2002",
            Self::AlreadyDone => "E2003",
            Self::InvalidRecurrence => "E2004",
            Self::CorruptStore => "E3001",
            Self::StoreReadFailed => "E5001",
            Self::StoreWriteFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::AmbiguousToken => "Ambiguous task token",
            Self::AlreadyDone => "Task already done",
            Self::InvalidRecurrence => "Invalid recurrence rule",
            Self::CorruptStore => "Corrupt todo store",
            Self::StoreReadFailed => "Todo store read failed",
            Self::StoreWriteFailed => "Todo store write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in chai/config.toml and retry."),
            Self::TaskNotFound => Some("Use `chai list` to see available tasks."),
            Self::AmbiguousToken => Some("Use a longer slug prefix or the numeric id."),
            Self::AlreadyDone => None,
            Self::InvalidRecurrence => {
                Some("Use the form \"every N day|week|weekday|month\".")
            }
            Self::CorruptStore => {
                Some("Repair or remove the offending line in todos.jsonl.")
            }
            Self::StoreReadFailed => Some("Check the space directory and permissions."),
            Self::StoreWriteFailed => {
                Some("Check disk space and permissions, then retry; no data was lost.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by the task core.
///
/// Every operation reports a definite outcome; nothing here is retried
/// internally or treated as fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No task matched the lookup token.
    #[error("no task matches '{token}'")]
    NotFound { token: String },

    /// The token matched more than one task; the caller must disambiguate.
    #[error("'{token}' is ambiguous; matches: {}", .candidates.join(", "))]
    AmbiguousMatch {
        token: String,
        candidates: Vec<String>,
    },

    /// Re-completion of an already-done task.
    #[error("task {id} ('{slug}') is already done")]
    AlreadyDone { id: u64, slug: String },

    /// Persistence boundary failure; the in-memory view was not committed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// The machine code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::TaskNotFound,
            Self::AmbiguousMatch { .. } => ErrorCode::AmbiguousToken,
            Self::AlreadyDone { .. } => ErrorCode::AlreadyDone,
            Self::Store(StoreError::Corrupt { .. }) => ErrorCode::CorruptStore,
            Self::Store(StoreError::Io { .. }) => ErrorCode::StoreReadFailed,
            Self::Store(StoreError::Serialize { .. } | StoreError::WriteFailed { .. }) => {
                ErrorCode::StoreWriteFailed
            }
        }
    }
}
