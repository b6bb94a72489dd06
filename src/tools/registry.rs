//! Per-sequence tool registry.
//!
//! The registry maps tool names to installed definitions and remembers the
//! order they were installed in, which is the order the model saw their
//! announcements. It is owned by exactly one sequence; forking copies it.

use crate::error::SequenceError;
use crate::tools::definition::{ToolDefinition, ToolFunction, ToolSpec};
use crate::tools::error::InvalidTool;
use crate::types::{InvalidToolName, SequenceId, ToolName};
use serde_json::Value;
use std::collections::HashMap;

/// Installed tools by name, in installation order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    order: Vec<ToolName>,
    tools: HashMap<ToolName, ToolDefinition>,
}

/// JavaScript-style truthiness of a descriptor value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn present(slot: Option<&Value>) -> Option<&Value> {
    slot.filter(|value| is_truthy(value))
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of installed tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no tool is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Checks if a tool is installed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Looks up an installed tool.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Tool names in installation order.
    pub fn names(&self) -> impl Iterator<Item = &ToolName> {
        self.order.iter()
    }

    /// Definitions in installation order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }

    /// Validates a candidate against this registry.
    ///
    /// Rules run in a fixed order and the first failure is returned:
    /// name present, name is a string, name format, description present,
    /// name not already installed, description is a string, function present,
    /// function callable, parameters (when given) are an object.
    ///
    /// # Errors
    ///
    /// Returns `SequenceErrorKind::InvalidTool` naming the broken rule, or
    /// `SequenceErrorKind::DuplicateTool` for an installed name.
    pub fn validate(
        &self,
        sequence_id: Option<&SequenceId>,
        spec: ToolSpec,
    ) -> Result<ToolDefinition, SequenceError> {
        let invalid = |rule| SequenceError::invalid_tool(sequence_id, rule);

        let name = present(spec.name.as_ref()).ok_or_else(|| invalid(InvalidTool::MissingName))?;
        let Value::String(name) = name else {
            return Err(invalid(InvalidTool::NameNotString));
        };
        let name = ToolName::parse(name).map_err(|e| match e {
            InvalidToolName::Empty => invalid(InvalidTool::MissingName),
            InvalidToolName::InvalidCharacters(name) => {
                invalid(InvalidTool::InvalidNameFormat { name })
            }
        })?;

        let description = present(spec.description.as_ref())
            .ok_or_else(|| invalid(InvalidTool::MissingDescription))?;

        if self.contains(name.as_str()) {
            return Err(SequenceError::duplicate_tool(sequence_id, name.as_str()));
        }

        let Value::String(description) = description else {
            return Err(invalid(InvalidTool::DescriptionNotString));
        };

        let function = match spec.function {
            None => return Err(invalid(InvalidTool::MissingFunction)),
            Some(ToolFunction::Unbound(ref value)) if !is_truthy(value) => {
                return Err(invalid(InvalidTool::MissingFunction));
            }
            Some(ToolFunction::Unbound(_)) => {
                return Err(invalid(InvalidTool::FunctionNotCallable));
            }
            Some(ToolFunction::Callable(function)) => function,
        };

        // Only `null` counts as absent; `false`, `0` and `""` are rejected.
        let parameters = match spec.parameters {
            None | Some(Value::Null) => None,
            Some(params @ Value::Object(_)) => Some(params),
            Some(_) => return Err(invalid(InvalidTool::ParametersNotObject)),
        };

        Ok(ToolDefinition::new(
            name,
            description.clone(),
            parameters,
            function,
        ))
    }

    /// Registers a validated definition.
    ///
    /// Only [`Sequence::install`](crate::sequence::Sequence::install) calls
    /// this, after the announcement has reached the host.
    pub(crate) fn insert(&mut self, definition: ToolDefinition) {
        let name = definition.name().clone();
        if self.tools.insert(name.clone(), definition).is_none() {
            self.order.push(name);
        }
    }
}
