//! Option bags passed to the host on open, generate and append.
//!
//! Generate and append options are an open key-value configuration: the
//! well-known keys `role` and `hidden` are typed fields, everything else
//! rides along in an order-preserving passthrough map that the host
//! interprets (temperature, max tokens, stop sequences, ...).
//!
//! # Example
//!
//! ```rust
//! use acton_seq::options::{Options, Role};
//!
//! let fixed = Options::new().with_role(Role::User);
//! let call = Options::new().with_role(Role::Assistant).with("temperature", 0.2);
//!
//! let merged = fixed.merged_with(&call);
//! assert_eq!(merged.role, Some(Role::Assistant));
//! assert_eq!(merged.extra["temperature"], 0.2);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// The conversational role a message or generation is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// System instructions
    System,
    /// The human side of the conversation
    User,
    /// The model side of the conversation
    Assistant,
    /// Any other role the host understands (e.g. `ipython`)
    Custom(String),
}

impl Role {
    /// Returns the wire name of this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Options for a generate or append call.
///
/// Unset fields are omitted when serialized, so the host only sees the keys
/// the caller (or a proxy) actually supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Role the call is attributed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Whether an appended message is hidden from the visible conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Host-specific passthrough keys, in insertion order
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Options for a generation call.
pub type GenOptions = Options;

/// Options for an append call.
pub type AppendOptions = Options;

impl Options {
    /// Creates an empty option bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The options every hidden system message is appended with.
    #[must_use]
    pub fn hidden_system() -> Self {
        Self::new().with_role(Role::System).with_hidden(true)
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.extra.remove("role");
        self.role = Some(role.into());
        self
    }

    /// Sets the hidden flag.
    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.extra.remove("hidden");
        self.hidden = Some(hidden);
        self
    }

    /// Adds a key by name.
    ///
    /// `role` (a string) and `hidden` (a bool) land in their typed fields, so
    /// they merge and serialize like [`with_role`](Self::with_role) and
    /// [`with_hidden`](Self::with_hidden). Any other key is passed through.
    /// A reserved key with a value of the wrong type stays in the passthrough
    /// map and clears the typed field, so only one `role` or `hidden` reaches
    /// the host.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let (key, value) = (key.into(), value.into());
        match (key.as_str(), &value) {
            ("role", Value::String(role)) => {
                self.role = Some(Role::from(role.as_str()));
                self.extra.remove("role");
                return self;
            }
            ("hidden", Value::Bool(hidden)) => {
                self.hidden = Some(*hidden);
                self.extra.remove("hidden");
                return self;
            }
            ("role", _) => self.role = None,
            ("hidden", _) => self.hidden = None,
            _ => {}
        }
        self.extra.insert(key, value);
        self
    }

    /// Returns true if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.hidden.is_none() && self.extra.is_empty()
    }

    /// Shallow merge: starts from `self` and applies every key set in `overrides`.
    ///
    /// Keys present in `overrides` win; keys only in `self` are kept.
    #[must_use]
    pub fn merged_with(&self, overrides: &Options) -> Options {
        let mut merged = self.clone();
        if let Some(ref role) = overrides.role {
            merged.extra.remove("role");
            merged.role = Some(role.clone());
        }
        if let Some(hidden) = overrides.hidden {
            merged.extra.remove("hidden");
            merged.hidden = Some(hidden);
        }
        for (key, value) in &overrides.extra {
            match key.as_str() {
                "role" => merged.role = None,
                "hidden" => merged.hidden = None,
                _ => {}
            }
            merged.extra.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl From<Role> for Options {
    fn from(role: Role) -> Self {
        Self::new().with_role(role)
    }
}

/// Content appended to a sequence: text or pre-tokenized input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text
    Text(String),
    /// Token ids in the host model's vocabulary
    Tokens(Vec<u32>),
}

impl Content {
    /// Returns the text, if this is text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Tokens(_) => None,
        }
    }

    /// Returns true if there is nothing to append.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Tokens(tokens) => tokens.is_empty(),
        }
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u32>> for Content {
    fn from(value: Vec<u32>) -> Self {
        Self::Tokens(value)
    }
}

/// Options for opening a new sequence.
///
/// The flags are tri-state: `None` means "not chosen here" and is filled from
/// defaults by [`or`](Self::or); `Some(false)` switches a default off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOptions {
    /// Enable tool installation on the sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<bool>,
    /// Caller system prompt, appended after the prelude and tool protocol
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Replacement for the built-in tool protocol block
    #[serde(default)]
    pub tool_prompt: Option<String>,
    /// Omit the environment, knowledge cutoff and date lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_prelude: Option<bool>,
}

impl OpenOptions {
    /// Creates default open options (no tools, full prelude).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables tool support.
    #[must_use]
    pub fn with_tools(mut self, enabled: bool) -> Self {
        self.tools = Some(enabled);
        self
    }

    /// Sets the caller system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Replaces the built-in tool protocol block.
    #[must_use]
    pub fn with_tool_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.tool_prompt = Some(prompt.into());
        self
    }

    /// Skips the date prelude.
    #[must_use]
    pub fn with_skip_prelude(mut self, skip: bool) -> Self {
        self.skip_prelude = Some(skip);
        self
    }

    /// Returns true if tools are enabled; unset means disabled.
    #[must_use]
    pub fn tools_enabled(&self) -> bool {
        self.tools.unwrap_or(false)
    }

    /// Returns true if the date prelude is skipped; unset means kept.
    #[must_use]
    pub fn skips_prelude(&self) -> bool {
        self.skip_prelude.unwrap_or(false)
    }

    /// Fills every unset field from `defaults`. Fields set here are kept,
    /// including flags explicitly set to `false`.
    #[must_use]
    pub fn or(mut self, defaults: &OpenOptions) -> Self {
        self.tools = self.tools.or(defaults.tools);
        self.skip_prelude = self.skip_prelude.or(defaults.skip_prelude);
        if self.system_prompt.is_none() {
            self.system_prompt.clone_from(&defaults.system_prompt);
        }
        if self.tool_prompt.is_none() {
            self.tool_prompt.clone_from(&defaults.tool_prompt);
        }
        self
    }
}
