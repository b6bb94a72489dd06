//! Error types for acton-seq.
//!
//! Each error type implements Display, Debug, Clone, PartialEq, Eq, and std::error::Error.
//!
//! The library's error types are written by hand without an error crate. Only
//! the `acton-seq` binary uses `anyhow`, to collect these errors in `main`.

use crate::host::HostError;
use crate::tools::{InvalidTool, ToolError};
use crate::types::SequenceId;
use std::fmt;

/// Errors surfaced by sequence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceError {
    /// The sequence the error relates to, if known
    pub sequence_id: Option<SequenceId>,
    /// The specific error that occurred
    pub kind: SequenceErrorKind,
}

/// Specific sequence error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceErrorKind {
    /// No tool with this name is installed
    ToolNotFound {
        /// The requested name
        tool_name: String,
    },
    /// Tool installation attempted on a sequence opened without tool support
    PermissionDenied,
    /// Tool candidate failed validation
    InvalidTool(InvalidTool),
    /// A tool with this name is already installed
    DuplicateTool {
        /// The conflicting name
        tool_name: String,
    },
    /// The tool ran and returned an error
    ToolFailed {
        /// The tool that failed
        tool_name: String,
        /// The error it returned
        error: ToolError,
    },
    /// The host rejected a boundary call
    Host(HostError),
    /// Configuration could not be loaded
    Configuration {
        /// Description of what was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
}

impl SequenceError {
    /// Creates a new SequenceError with the given kind.
    #[must_use]
    pub fn new(sequence_id: Option<SequenceId>, kind: SequenceErrorKind) -> Self {
        Self { sequence_id, kind }
    }

    /// Creates a tool not found error.
    #[must_use]
    pub fn tool_not_found(sequence_id: &SequenceId, tool_name: impl Into<String>) -> Self {
        Self::new(
            Some(sequence_id.clone()),
            SequenceErrorKind::ToolNotFound {
                tool_name: tool_name.into(),
            },
        )
    }

    /// Creates a permission denied error.
    #[must_use]
    pub fn permission_denied(sequence_id: &SequenceId) -> Self {
        Self::new(
            Some(sequence_id.clone()),
            SequenceErrorKind::PermissionDenied,
        )
    }

    /// Creates an invalid tool error.
    #[must_use]
    pub fn invalid_tool(sequence_id: Option<&SequenceId>, rule: InvalidTool) -> Self {
        Self::new(sequence_id.cloned(), SequenceErrorKind::InvalidTool(rule))
    }

    /// Creates a duplicate tool error.
    #[must_use]
    pub fn duplicate_tool(sequence_id: Option<&SequenceId>, tool_name: impl Into<String>) -> Self {
        Self::new(
            sequence_id.cloned(),
            SequenceErrorKind::DuplicateTool {
                tool_name: tool_name.into(),
            },
        )
    }

    /// Creates a tool failed error.
    #[must_use]
    pub fn tool_failed(
        sequence_id: &SequenceId,
        tool_name: impl Into<String>,
        error: ToolError,
    ) -> Self {
        Self::new(
            Some(sequence_id.clone()),
            SequenceErrorKind::ToolFailed {
                tool_name: tool_name.into(),
                error,
            },
        )
    }

    /// Wraps a host error raised while operating on a sequence.
    #[must_use]
    pub fn host(sequence_id: Option<&SequenceId>, error: HostError) -> Self {
        Self::new(sequence_id.cloned(), SequenceErrorKind::Host(error))
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            None,
            SequenceErrorKind::Configuration {
                field: field.into(),
                reason: reason.into(),
            },
        )
    }

    /// Returns true if a requested tool was not installed.
    #[must_use]
    pub fn is_tool_not_found(&self) -> bool {
        matches!(self.kind, SequenceErrorKind::ToolNotFound { .. })
    }

    /// Returns true if tool installation was not permitted.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.kind, SequenceErrorKind::PermissionDenied)
    }

    /// Returns the broken validation rule, if this is a validation error.
    #[must_use]
    pub fn invalid_tool_rule(&self) -> Option<&InvalidTool> {
        match &self.kind {
            SequenceErrorKind::InvalidTool(rule) => Some(rule),
            _ => None,
        }
    }

    /// Returns true if the tool name was already installed.
    #[must_use]
    pub fn is_duplicate_tool(&self) -> bool {
        matches!(self.kind, SequenceErrorKind::DuplicateTool { .. })
    }

    /// Returns the host error, if this error came from the host.
    #[must_use]
    pub fn host_error(&self) -> Option<&HostError> {
        match &self.kind {
            SequenceErrorKind::Host(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true if the host has not implemented the requested operation.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        self.host_error().is_some_and(HostError::is_not_implemented)
    }

    /// Returns true if this error indicates a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, SequenceErrorKind::Configuration { .. })
    }
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref id) = self.sequence_id {
            write!(f, "sequence '{}': ", id)?;
        }

        match &self.kind {
            SequenceErrorKind::ToolNotFound { tool_name } => {
                write!(
                    f,
                    "tool '{}' not found; install it before invoking",
                    tool_name
                )
            }
            SequenceErrorKind::PermissionDenied => {
                write!(
                    f,
                    "tools are not enabled for this sequence; open it with tools enabled"
                )
            }
            SequenceErrorKind::InvalidTool(rule) => {
                write!(f, "invalid tool ({}): {}", rule.rule(), rule)
            }
            SequenceErrorKind::DuplicateTool { tool_name } => {
                write!(
                    f,
                    "tool '{}' already exists; use a different name",
                    tool_name
                )
            }
            SequenceErrorKind::ToolFailed { tool_name, error } => {
                write!(f, "tool '{}' {}", tool_name, error)
            }
            SequenceErrorKind::Host(error) => write!(f, "host error: {}", error),
            SequenceErrorKind::Configuration { field, reason } => {
                write!(f, "configuration error for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for SequenceError {}

impl From<HostError> for SequenceError {
    fn from(error: HostError) -> Self {
        Self::host(None, error)
    }
}
