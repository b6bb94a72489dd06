//! # Acton-Seq: Sequences with Installable Tools
//!
//! A thin client layer over a model host that exposes forkable, append-only
//! "sequences" (running model contexts). The host does the real work; this
//! crate adds system-prompt assembly, a per-sequence tool registry, and
//! role-pinned views.
//!
//! ## Architecture
//!
//! - **Host**: the [`SequenceHost`](host::SequenceHost) trait, the only boundary to the model
//! - **Sequence**: generate, append, fork, close, install and invoke tools
//! - **System prompt**: environment, knowledge cutoff, date and tool protocol prelude
//! - **Tools**: nine-rule validation, announcement, registry, function-call parsing
//! - **Proxy**: `user(&seq)` / `assistant(&seq)` views with a pinned role
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use acton_seq::prelude::*;
//! use serde_json::json;
//!
//! let host: Arc<dyn SequenceHost> = Arc::new(InMemoryHost::new());
//! let mut seq = open(host, OpenOptions::new().with_tools(true)).await?;
//!
//! seq.install(ToolSpec::new(
//!     "get_time",
//!     "Returns the current time",
//!     ToolFunction::sync(|_| Ok(json!("12:00"))),
//! ))
//! .await?;
//!
//! user(&seq).append("What time is it?", Options::new()).await?;
//! let reply = assistant(&seq).gen(Options::new()).await?;
//!
//! seq.close().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod options;
pub mod proxy;
pub mod sequence;
pub mod system_prompt;
pub mod tools;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::SequenceClient;
    pub use crate::config::SeqConfig;
    pub use crate::error::{SequenceError, SequenceErrorKind};
    pub use crate::host::{
        HostCall, HostError, HostErrorKind, HostOperation, InMemoryHost, SequenceHost,
        TranscriptEntry,
    };
    pub use crate::options::{AppendOptions, Content, GenOptions, OpenOptions, Options, Role};
    pub use crate::proxy::{assistant, user, ProxySequence};
    pub use crate::sequence::{open, open_with, Sequence, SequenceOps};
    pub use crate::system_prompt::PreludeSettings;
    pub use crate::tools::{
        FunctionCall, InvalidTool, ToolDefinition, ToolError, ToolFunction, ToolRegistry,
        ToolSpec,
    };
    pub use crate::types::{SequenceId, ToolName};

    pub use std::sync::Arc;
}
