//! Host boundary error types.
//!
//! Failures reported by a [`SequenceHost`](crate::host::SequenceHost). The
//! sequence layer wraps these without translation, so callers always see the
//! host's own reason.

use crate::types::SequenceId;
use std::fmt;

/// The boundary operation a host error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOperation {
    /// Opening a new sequence
    Open,
    /// Generating model output
    Generate,
    /// Appending text or tokens
    Append,
    /// Forking a sequence
    Fork,
    /// Releasing a sequence
    Close,
}

impl HostOperation {
    /// Returns the boundary function name for this operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open_sequence",
            Self::Generate => "generate",
            Self::Append => "append_content",
            Self::Fork => "fork_sequence",
            Self::Close => "close_sequence",
        }
    }
}

impl fmt::Display for HostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by a sequence host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    /// The operation that failed
    pub operation: HostOperation,
    /// The specific error that occurred
    pub kind: HostErrorKind,
}

/// Specific host error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostErrorKind {
    /// The host has no sequence with this id (never opened, or already closed)
    UnknownSequence {
        /// The id that was not recognised
        sequence_id: SequenceId,
    },
    /// The host refused the request
    Rejected {
        /// Reason given by the host
        reason: String,
    },
    /// The host could not be reached
    Unavailable {
        /// Description of the failure
        reason: String,
    },
    /// The host does not implement this operation
    NotImplemented,
}

impl HostError {
    /// Creates a new HostError.
    #[must_use]
    pub fn new(operation: HostOperation, kind: HostErrorKind) -> Self {
        Self { operation, kind }
    }

    /// Creates an unknown sequence error.
    #[must_use]
    pub fn unknown_sequence(operation: HostOperation, sequence_id: SequenceId) -> Self {
        Self::new(operation, HostErrorKind::UnknownSequence { sequence_id })
    }

    /// Creates a rejected error.
    #[must_use]
    pub fn rejected(operation: HostOperation, reason: impl Into<String>) -> Self {
        Self::new(
            operation,
            HostErrorKind::Rejected {
                reason: reason.into(),
            },
        )
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(operation: HostOperation, reason: impl Into<String>) -> Self {
        Self::new(
            operation,
            HostErrorKind::Unavailable {
                reason: reason.into(),
            },
        )
    }

    /// Creates a not implemented error.
    #[must_use]
    pub fn not_implemented(operation: HostOperation) -> Self {
        Self::new(operation, HostErrorKind::NotImplemented)
    }

    /// Returns true if the host does not implement the operation.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self.kind, HostErrorKind::NotImplemented)
    }

    /// Returns true if the host did not recognise the sequence id.
    #[must_use]
    pub fn is_unknown_sequence(&self) -> bool {
        matches!(self.kind, HostErrorKind::UnknownSequence { .. })
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.operation)?;
        match &self.kind {
            HostErrorKind::UnknownSequence { sequence_id } => {
                write!(
                    f,
                    "sequence '{}' is unknown to the host; it may already be closed",
                    sequence_id
                )
            }
            HostErrorKind::Rejected { reason } => write!(f, "rejected by host: {}", reason),
            HostErrorKind::Unavailable { reason } => write!(f, "host unavailable: {}", reason),
            HostErrorKind::NotImplemented => {
                write!(f, "not implemented by this host")
            }
        }
    }
}

impl std::error::Error for HostError {}
