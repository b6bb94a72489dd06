//! Tool error types.
//!
//! [`ToolError`] is what a tool callable returns when it fails.
//! [`InvalidTool`] names the installation rule a tool candidate broke.

use std::fmt;

/// Errors returned by tool callables.
///
/// This type uses Box<ToolErrorKind> to keep the error size small,
/// enabling efficient use in Result types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    kind: Box<ToolErrorKind>,
}

/// Specific tool error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// The tool ran and failed
    ExecutionFailed {
        /// Reason for failure
        reason: String,
    },
    /// The parameters did not have the expected shape
    InvalidArguments {
        /// What was wrong with them
        reason: String,
    },
}

impl ToolError {
    /// Creates a new ToolError with the given kind.
    #[must_use]
    pub fn new(kind: ToolErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &ToolErrorKind {
        &self.kind
    }

    /// Creates an execution failed error.
    #[must_use]
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ExecutionFailed {
            reason: reason.into(),
        })
    }

    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments {
            reason: reason.into(),
        })
    }

    /// Returns true if the parameters were rejected.
    #[must_use]
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::InvalidArguments { .. })
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            ToolErrorKind::ExecutionFailed { reason } => {
                write!(f, "execution failed: {}", reason)
            }
            ToolErrorKind::InvalidArguments { reason } => {
                write!(f, "invalid arguments: {}; check the parameters schema", reason)
            }
        }
    }
}

impl std::error::Error for ToolError {}

/// A tool candidate that failed validation, one variant per rule.
///
/// Rules are checked in declaration order and the first failure wins.
/// Duplicate names are reported separately as
/// [`SequenceErrorKind::DuplicateTool`](crate::error::SequenceErrorKind::DuplicateTool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTool {
    /// Name absent or empty
    MissingName,
    /// Name is not a string
    NameNotString,
    /// Name does not match `^[a-zA-Z0-9_]+$`
    InvalidNameFormat {
        /// The rejected name
        name: String,
    },
    /// Description absent or empty
    MissingDescription,
    /// Description is not a string
    DescriptionNotString,
    /// No callable supplied
    MissingFunction,
    /// The supplied function is not callable
    FunctionNotCallable,
    /// Parameters supplied but not a JSON object
    ParametersNotObject,
}

impl InvalidTool {
    /// Returns a stable label for the broken rule.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        match self {
            Self::MissingName => "missing_name",
            Self::NameNotString => "name_not_string",
            Self::InvalidNameFormat { .. } => "invalid_name_format",
            Self::MissingDescription => "missing_description",
            Self::DescriptionNotString => "description_not_string",
            Self::MissingFunction => "missing_function",
            Self::FunctionNotCallable => "function_not_callable",
            Self::ParametersNotObject => "parameters_not_object",
        }
    }
}

impl fmt::Display for InvalidTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "tool must have a name"),
            Self::NameNotString => write!(f, "tool name must be a string"),
            Self::InvalidNameFormat { name } => write!(
                f,
                "tool name '{}' is not valid; only alphanumerics and underscores are allowed",
                name
            ),
            Self::MissingDescription => write!(f, "tool must have a description"),
            Self::DescriptionNotString => write!(f, "tool description must be a string"),
            Self::MissingFunction => write!(f, "tool must have a function"),
            Self::FunctionNotCallable => {
                write!(f, "tool function is not callable; bind a handler before installing")
            }
            Self::ParametersNotObject => write!(f, "tool parameters must be a JSON object"),
        }
    }
}

impl std::error::Error for InvalidTool {}
