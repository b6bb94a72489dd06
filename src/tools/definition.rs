//! Tool candidates, validated definitions and the callable abstraction.
//!
//! A [`ToolSpec`] is what a caller hands to
//! [`Sequence::install`](crate::sequence::Sequence::install). It is loosely
//! typed on purpose so that descriptors loaded from JSON can be checked by
//! the same rules as ones built in code. Installation turns it into a
//! [`ToolDefinition`], which is what the registry stores.

use crate::tools::error::ToolError;
use crate::types::ToolName;
use serde_json::{json, Value};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for tool execution futures.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;

/// Trait for tool callables.
///
/// Synchronous and asynchronous tools both surface as a [`ToolFuture`], so
/// dispatch has a single code path.
pub trait ToolExecutorFn: Send + Sync {
    /// Invokes the tool with its parameters.
    fn call(&self, params: Value) -> ToolFuture;
}

/// Adapter to wrap async closures as `ToolExecutorFn`.
struct ClosureToolExecutor<F> {
    func: F,
}

impl<F, Fut> ToolExecutorFn for ClosureToolExecutor<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    fn call(&self, params: Value) -> ToolFuture {
        Box::pin((self.func)(params))
    }
}

/// Adapter to wrap plain closures as `ToolExecutorFn`.
struct SyncToolExecutor<F> {
    func: F,
}

impl<F> ToolExecutorFn for SyncToolExecutor<F>
where
    F: Fn(Value) -> Result<Value, ToolError> + Send + Sync,
{
    fn call(&self, params: Value) -> ToolFuture {
        Box::pin(futures::future::ready((self.func)(params)))
    }
}

/// The function slot of a tool candidate.
#[derive(Clone)]
pub enum ToolFunction {
    /// A callable handler
    Callable(Arc<dyn ToolExecutorFn>),
    /// A raw descriptor value that has not been bound to a handler
    Unbound(Value),
}

impl ToolFunction {
    /// Wraps an async closure.
    ///
    /// ```rust
    /// use acton_seq::tools::ToolFunction;
    /// use serde_json::json;
    ///
    /// let f = ToolFunction::new(|params| async move { Ok(json!({"echo": params})) });
    /// assert!(f.is_callable());
    /// ```
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        Self::Callable(Arc::new(ClosureToolExecutor { func }))
    }

    /// Wraps a synchronous closure.
    pub fn sync<F>(func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(SyncToolExecutor { func }))
    }

    /// Wraps an existing executor.
    pub fn from_executor(executor: Arc<dyn ToolExecutorFn>) -> Self {
        Self::Callable(executor)
    }

    /// Returns true if this slot holds a handler.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }
}

impl fmt::Debug for ToolFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Unbound(value) => f.debug_tuple("Unbound").field(value).finish(),
        }
    }
}

/// A tool candidate awaiting installation.
///
/// # Example
///
/// ```rust
/// use acton_seq::tools::{ToolFunction, ToolSpec};
/// use serde_json::json;
///
/// let spec = ToolSpec::new(
///     "get_weather",
///     "Look up the current weather for a city",
///     ToolFunction::sync(|params| Ok(json!({"city": params["city"], "sky": "clear"}))),
/// )
/// .with_parameters(json!({
///     "type": "object",
///     "properties": {"city": {"type": "string"}},
///     "required": ["city"]
/// }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    /// Tool name
    pub name: Option<Value>,
    /// What the tool does, for the model
    pub description: Option<Value>,
    /// The callable
    pub function: Option<ToolFunction>,
    /// JSON schema of the parameters
    pub parameters: Option<Value>,
}

impl ToolSpec {
    /// Creates a candidate from typed parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        function: ToolFunction,
    ) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            description: Some(Value::String(description.into())),
            function: Some(function),
            parameters: None,
        }
    }

    /// Creates a candidate from an untyped descriptor.
    ///
    /// Reads the `name`, `description`, `fn` and `parameters` keys. A present
    /// `fn` key becomes an [`ToolFunction::Unbound`] slot until
    /// [`bind`](Self::bind) supplies a handler.
    #[must_use]
    pub fn from_value(descriptor: Value) -> Self {
        let Value::Object(mut map) = descriptor else {
            return Self::default();
        };
        Self {
            name: map.remove("name"),
            description: map.remove("description"),
            function: map.remove("fn").map(ToolFunction::Unbound),
            parameters: map.remove("parameters"),
        }
    }

    /// Sets the parameters schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Attaches a handler, replacing whatever was in the function slot.
    #[must_use]
    pub fn bind(mut self, function: ToolFunction) -> Self {
        self.function = Some(function);
        self
    }
}

/// An installed tool.
#[derive(Clone)]
pub struct ToolDefinition {
    name: ToolName,
    description: String,
    parameters: Option<Value>,
    function: Arc<dyn ToolExecutorFn>,
}

impl ToolDefinition {
    pub(crate) fn new(
        name: ToolName,
        description: String,
        parameters: Option<Value>,
        function: Arc<dyn ToolExecutorFn>,
    ) -> Self {
        Self {
            name,
            description,
            parameters,
            function,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &ToolName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters schema, if any.
    #[must_use]
    pub fn parameters(&self) -> Option<&Value> {
        self.parameters.as_ref()
    }

    /// Invokes the tool.
    pub fn call(&self, params: Value) -> ToolFuture {
        self.function.call(params)
    }

    /// The `{name, description, parameters}` object shown to the model.
    ///
    /// `parameters` is omitted when the tool has none.
    #[must_use]
    pub fn descriptor(&self) -> Value {
        let mut descriptor = json!({
            "name": self.name.as_str(),
            "description": self.description,
        });
        if let (Some(params), Value::Object(map)) = (&self.parameters, &mut descriptor) {
            map.insert("parameters".to_string(), params.clone());
        }
        descriptor
    }

    /// The hidden system message announcing this tool to the model.
    ///
    /// A usage line followed by the pretty-printed descriptor and a blank line.
    #[must_use]
    pub fn announcement(&self) -> String {
        format!(
            "Use the function '{}' to: {}\n{:#}\n\n",
            self.name,
            self.description,
            self.descriptor()
        )
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(parameters: Option<Value>) -> ToolDefinition {
        ToolDefinition::new(
            ToolName::parse("get_weather").unwrap(),
            "Look up the weather".to_string(),
            parameters,
            Arc::new(SyncToolExecutor {
                func: |params: Value| -> Result<Value, ToolError> { Ok(params) },
            }),
        )
    }

    #[test]
    fn announcement_without_parameters() {
        let expected = "Use the function 'get_weather' to: Look up the weather\n\
                        {\n  \"name\": \"get_weather\",\n  \"description\": \"Look up the weather\"\n}\n\n";
        assert_eq!(definition(None).announcement(), expected);
    }

    #[test]
    fn announcement_with_parameters() {
        let def = definition(Some(json!({"type": "object"})));
        let expected = "Use the function 'get_weather' to: Look up the weather\n\
                        {\n  \"name\": \"get_weather\",\n  \"description\": \"Look up the weather\",\n  \
                        \"parameters\": {\n    \"type\": \"object\"\n  }\n}\n\n";
        assert_eq!(def.announcement(), expected);
    }

    #[test]
    fn descriptor_keeps_key_order() {
        let def = definition(Some(json!({"type": "object"})));
        let descriptor = def.descriptor();
        let keys: Vec<&str> = descriptor
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["name", "description", "parameters"]);
    }

    #[tokio::test]
    async fn sync_and_async_functions_share_one_path() {
        let sync = ToolFunction::sync(|params| Ok(json!({"sync": params})));
        let r#async = ToolFunction::new(|params| async move { Ok(json!({"async": params})) });

        for (function, key) in [(sync, "sync"), (r#async, "async")] {
            let ToolFunction::Callable(exec) = function else {
                panic!("expected a callable");
            };
            let out = exec.call(json!(1)).await.unwrap();
            assert_eq!(out[key], 1);
        }
    }

    #[test]
    fn from_value_reads_descriptor_keys() {
        let spec = ToolSpec::from_value(json!({
            "name": "lookup",
            "description": "Find things",
            "fn": "lookup_handler",
            "parameters": {"type": "object"}
        }));

        assert_eq!(spec.name, Some(json!("lookup")));
        assert_eq!(spec.description, Some(json!("Find things")));
        assert!(matches!(spec.function, Some(ToolFunction::Unbound(_))));
        assert_eq!(spec.parameters, Some(json!({"type": "object"})));
    }

    #[test]
    fn from_value_of_non_object_is_empty() {
        let spec = ToolSpec::from_value(json!("not a tool"));
        assert!(spec.name.is_none());
        assert!(spec.function.is_none());
    }

    #[test]
    fn bind_replaces_unbound_slot() {
        let spec = ToolSpec::from_value(json!({"name": "x", "fn": true}))
            .bind(ToolFunction::sync(|_| Ok(Value::Null)));
        assert!(spec.function.unwrap().is_callable());
    }
}
