//! Configuration types.
//!
//! Every section is optional; anything left out keeps the built-in defaults.

use crate::logging::LoggingConfig;
use crate::options::OpenOptions;
use crate::system_prompt::PreludeSettings;
use serde::{Deserialize, Serialize};

/// Root configuration structure for acton-seq.
///
/// This structure maps directly to the TOML configuration file format:
///
/// ```toml
/// [open]
/// tools = true
/// system_prompt = "Be terse."
///
/// [prelude]
/// knowledge_cutoff = "December 2023"
/// environment = "ipython"
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeqConfig {
    /// Defaults applied to every `open`.
    #[serde(default)]
    pub open: OpenDefaults,

    /// Values announced in the prelude.
    #[serde(default)]
    pub prelude: PreludeSettings,

    /// Logging setup for the CLI.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SeqConfig {
    /// Creates a configuration with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `[open]` section.
    #[must_use]
    pub fn with_open(mut self, open: OpenDefaults) -> Self {
        self.open = open;
        self
    }

    /// Sets the `[prelude]` section.
    #[must_use]
    pub fn with_prelude(mut self, prelude: PreludeSettings) -> Self {
        self.prelude = prelude;
        self
    }

    /// Sets the `[logging]` section.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Returns the default open options described by `[open]`.
    ///
    /// A flag left `false` stays unset, so it behaves like the built-in default.
    #[must_use]
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            tools: self.open.tools.then_some(true),
            system_prompt: self.open.system_prompt.clone(),
            tool_prompt: self.open.tool_prompt.clone(),
            skip_prelude: self.open.skip_prelude.then_some(true),
        }
    }

    /// Returns the prelude settings described by `[prelude]`.
    #[must_use]
    pub fn prelude(&self) -> PreludeSettings {
        self.prelude.clone()
    }
}

/// The `[open]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenDefaults {
    /// Enable tools on every sequence.
    pub tools: bool,

    /// System prompt appended when the caller gives none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Replacement for the built-in tool protocol block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_prompt: Option<String>,

    /// Skip the date prelude.
    pub skip_prelude: bool,
}
