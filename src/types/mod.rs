//! Core type definitions for acton-seq.
//!
//! - [`SequenceId`]: opaque host-issued sequence handle
//! - [`ToolName`]: validated tool registry key

mod sequence_id;
mod tool_name;

pub use sequence_id::SequenceId;
pub use tool_name::{InvalidToolName, ToolName, TOOL_NAME_PATTERN};
