//! Tool name type.
//!
//! ToolName is the validated key of a sequence's tool registry.
//! Names are ASCII alphanumerics and underscores only: `^[a-zA-Z0-9_]+$`

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Pattern every tool name must match.
pub const TOOL_NAME_PATTERN: &str = "^[a-zA-Z0-9_]+$";

fn tool_name_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TOOL_NAME_PATTERN).expect("tool name pattern is valid"))
}

/// A validated tool name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolName(String);

/// Error returned when attempting to create an invalid tool name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidToolName {
    /// The name was empty
    Empty,
    /// The name contains characters outside `[a-zA-Z0-9_]`
    InvalidCharacters(String),
}

impl fmt::Display for InvalidToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tool name cannot be empty"),
            Self::InvalidCharacters(name) => write!(
                f,
                "tool name '{name}' is not valid; only alphanumerics and underscores are allowed"
            ),
        }
    }
}

impl std::error::Error for InvalidToolName {}

impl ToolName {
    /// Parses a tool name, validating it against [`TOOL_NAME_PATTERN`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidToolName::Empty` for the empty string.
    /// Returns `InvalidToolName::InvalidCharacters` if any character is outside `[a-zA-Z0-9_]`.
    pub fn parse(s: &str) -> Result<Self, InvalidToolName> {
        if s.is_empty() {
            return Err(InvalidToolName::Empty);
        }
        if !tool_name_regex().is_match(s) {
            return Err(InvalidToolName::InvalidCharacters(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ToolName {
    type Err = InvalidToolName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ToolName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for ToolName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ToolName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
