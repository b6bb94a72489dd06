//! Model host boundary.
//!
//! The host owns the actual sequences: it tokenizes, runs inference and keeps
//! the running context. This crate only ever talks to it through the five
//! operations of [`SequenceHost`]. Implement the trait over a native runtime,
//! an RPC client, or use [`InMemoryHost`] for tests and demos.

mod error;
mod memory;

pub use error::{HostError, HostErrorKind, HostOperation};
pub use memory::{HostCall, InMemoryHost, TranscriptEntry};

use crate::options::{Content, OpenOptions, Options};
use crate::types::SequenceId;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for model hosts.
///
/// Every method is a single suspension point. Results of `generate` and
/// `append_content` are host-defined and passed back to callers untouched.
///
/// # Example
///
/// ```rust,ignore
/// use acton_seq::host::{HostError, SequenceHost};
///
/// #[derive(Debug)]
/// struct RpcHost { client: RpcClient }
///
/// #[async_trait]
/// impl SequenceHost for RpcHost {
///     async fn open_sequence(&self, options: &OpenOptions) -> Result<SequenceId, HostError> {
///         self.client.call("open", options).await
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait SequenceHost: Send + Sync + std::fmt::Debug {
    /// Creates a new sequence and returns its id.
    async fn open_sequence(&self, options: &OpenOptions) -> Result<SequenceId, HostError>;

    /// Produces model output for the sequence's current context.
    async fn generate(&self, sequence: &SequenceId, options: &Options)
        -> Result<Value, HostError>;

    /// Appends text or tokens to the sequence's running context.
    async fn append_content(
        &self,
        sequence: &SequenceId,
        content: &Content,
        options: &Options,
    ) -> Result<Value, HostError>;

    /// Clones the sequence's state into a new sequence and returns the new id.
    async fn fork_sequence(&self, sequence: &SequenceId) -> Result<SequenceId, HostError>;

    /// Releases the sequence.
    ///
    /// Hosts that have not wired this up report `HostErrorKind::NotImplemented`.
    async fn close_sequence(&self, _sequence: &SequenceId) -> Result<(), HostError> {
        Err(HostError::not_implemented(HostOperation::Close))
    }

    /// Returns the name of this host for logging.
    fn host_name(&self) -> &'static str;
}
