//! Tool system for acton-seq.
//!
//! Tools are external functions exposed to model-driven calls. Each
//! [`Sequence`](crate::sequence::Sequence) owns a [`ToolRegistry`]; installing
//! a tool validates a [`ToolSpec`], announces it to the model in a hidden
//! system message, and only then registers the resulting [`ToolDefinition`].
//!
//! ```text
//! ToolSpec --validate--> ToolDefinition --announce (host append)--> ToolRegistry
//!                                                                      |
//!  model text --FunctionCall::parse_all--> invoke_tool(name, params) <-+
//! ```

pub mod call;
pub mod definition;
pub mod error;
pub mod registry;

pub use call::FunctionCall;
pub use definition::{ToolDefinition, ToolExecutorFn, ToolFunction, ToolFuture, ToolSpec};
pub use error::{InvalidTool, ToolError, ToolErrorKind};
pub use registry::ToolRegistry;
