//! Parsing of model-issued function calls.
//!
//! The tool prompt teaches the model to reply with
//! `<function=name>{"arg": "value"}</function>`, one call per line.
//! [`FunctionCall::parse_all`] pulls those calls out of generated text.

use crate::tools::error::ToolError;
use crate::types::ToolName;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn call_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<function=([a-zA-Z0-9_]+)>(.*?)</function>")
            .expect("function call pattern is valid")
    })
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// The tool to call
    pub name: ToolName,
    /// The arguments, always a JSON value (an empty object when none were given)
    pub arguments: Value,
}

impl FunctionCall {
    /// Extracts every function call in `text`, in order of appearance.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::invalid_arguments` if a call's arguments are not valid JSON.
    pub fn parse_all(text: &str) -> Result<Vec<Self>, ToolError> {
        call_regex()
            .captures_iter(text)
            .map(|caps| -> Result<Self, ToolError> {
                let name = ToolName::parse(&caps[1])
                    .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                let raw = caps[2].trim();
                let arguments = if raw.is_empty() {
                    Value::Object(Map::new())
                } else {
                    serde_json::from_str(raw).map_err(|e| {
                        ToolError::invalid_arguments(format!(
                            "arguments for '{}' are not valid JSON: {}",
                            name, e
                        ))
                    })?
                };
                Ok(Self { name, arguments })
            })
            .collect()
    }

    /// Extracts the first function call in `text`, if any.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::invalid_arguments` if that call's arguments are not valid JSON.
    pub fn parse_first(text: &str) -> Result<Option<Self>, ToolError> {
        Ok(Self::parse_all(text)?.into_iter().next())
    }
}
