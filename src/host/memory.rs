//! In-memory reference host.
//!
//! Keeps one transcript per open sequence and a log of every boundary call.
//! It performs no inference: `generate` echoes the request back. Useful for
//! tests, for the CLI, and as a template for real hosts.

use super::{HostError, HostOperation, SequenceHost};
use crate::options::{Content, OpenOptions, Options};
use crate::types::SequenceId;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A message held in a sequence transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    /// The appended content
    pub content: Content,
    /// The options it was appended with
    pub options: Options,
}

impl TranscriptEntry {
    /// Returns true if the entry was appended as hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.options.hidden.unwrap_or(false)
    }
}

/// A boundary call as received by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    /// `open_sequence`
    Open {
        /// Options passed by the caller
        options: OpenOptions,
    },
    /// `generate`
    Generate {
        /// Target sequence
        sequence_id: SequenceId,
        /// Merged generation options
        options: Options,
    },
    /// `append_content`
    Append {
        /// Target sequence
        sequence_id: SequenceId,
        /// Appended content
        content: Content,
        /// Merged append options
        options: Options,
    },
    /// `fork_sequence`
    Fork {
        /// Sequence being forked
        sequence_id: SequenceId,
    },
    /// `close_sequence`
    Close {
        /// Sequence being closed
        sequence_id: SequenceId,
    },
}

impl HostCall {
    /// Returns the boundary operation of this call.
    #[must_use]
    pub fn operation(&self) -> HostOperation {
        match self {
            Self::Open { .. } => HostOperation::Open,
            Self::Generate { .. } => HostOperation::Generate,
            Self::Append { .. } => HostOperation::Append,
            Self::Fork { .. } => HostOperation::Fork,
            Self::Close { .. } => HostOperation::Close,
        }
    }
}

#[derive(Debug, Default)]
struct HostState {
    sequences: HashMap<SequenceId, Vec<TranscriptEntry>>,
    calls: Vec<HostCall>,
    failures: HashMap<HostOperation, String>,
}

impl HostState {
    fn take_failure(&mut self, operation: HostOperation) -> Result<(), HostError> {
        match self.failures.remove(&operation) {
            Some(reason) => Err(HostError::rejected(operation, reason)),
            None => Ok(()),
        }
    }
}

/// A host that keeps sequences in memory.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next call of `operation` fail with a `Rejected` error.
    pub fn fail_next(&self, operation: HostOperation, reason: impl Into<String>) {
        self.state().failures.insert(operation, reason.into());
    }

    /// Returns every call received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.state().calls.clone()
    }

    /// Returns the calls of one operation kind.
    #[must_use]
    pub fn calls_of(&self, operation: HostOperation) -> Vec<HostCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    /// Returns the transcript of an open sequence.
    #[must_use]
    pub fn transcript(&self, sequence: &SequenceId) -> Option<Vec<TranscriptEntry>> {
        self.state().sequences.get(sequence).cloned()
    }

    /// Returns true if the sequence is open on this host.
    #[must_use]
    pub fn is_open(&self, sequence: &SequenceId) -> bool {
        self.state().sequences.contains_key(sequence)
    }

    /// Returns the number of open sequences.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state().sequences.len()
    }
}

#[async_trait]
impl SequenceHost for InMemoryHost {
    async fn open_sequence(&self, options: &OpenOptions) -> Result<SequenceId, HostError> {
        let mut state = self.state();
        state.calls.push(HostCall::Open {
            options: options.clone(),
        });
        state.take_failure(HostOperation::Open)?;

        let id = SequenceId::generate();
        state.sequences.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn generate(
        &self,
        sequence: &SequenceId,
        options: &Options,
    ) -> Result<Value, HostError> {
        let mut state = self.state();
        state.calls.push(HostCall::Generate {
            sequence_id: sequence.clone(),
            options: options.clone(),
        });
        state.take_failure(HostOperation::Generate)?;

        let context_len = state
            .sequences
            .get(sequence)
            .map(Vec::len)
            .ok_or_else(|| HostError::unknown_sequence(HostOperation::Generate, sequence.clone()))?;

        Ok(json!({
            "sequence_id": sequence,
            "context_len": context_len,
            "options": options,
            "text": "",
        }))
    }

    async fn append_content(
        &self,
        sequence: &SequenceId,
        content: &Content,
        options: &Options,
    ) -> Result<Value, HostError> {
        let mut state = self.state();
        state.calls.push(HostCall::Append {
            sequence_id: sequence.clone(),
            content: content.clone(),
            options: options.clone(),
        });
        state.take_failure(HostOperation::Append)?;

        let transcript = state
            .sequences
            .get_mut(sequence)
            .ok_or_else(|| HostError::unknown_sequence(HostOperation::Append, sequence.clone()))?;
        transcript.push(TranscriptEntry {
            content: content.clone(),
            options: options.clone(),
        });

        Ok(json!({ "context_len": transcript.len() }))
    }

    async fn fork_sequence(&self, sequence: &SequenceId) -> Result<SequenceId, HostError> {
        let mut state = self.state();
        state.calls.push(HostCall::Fork {
            sequence_id: sequence.clone(),
        });
        state.take_failure(HostOperation::Fork)?;

        let transcript = state
            .sequences
            .get(sequence)
            .cloned()
            .ok_or_else(|| HostError::unknown_sequence(HostOperation::Fork, sequence.clone()))?;

        let id = SequenceId::generate();
        state.sequences.insert(id.clone(), transcript);
        Ok(id)
    }

    async fn close_sequence(&self, sequence: &SequenceId) -> Result<(), HostError> {
        let mut state = self.state();
        state.calls.push(HostCall::Close {
            sequence_id: sequence.clone(),
        });
        state.take_failure(HostOperation::Close)?;

        state
            .sequences
            .remove(sequence)
            .map(|_| ())
            .ok_or_else(|| HostError::unknown_sequence(HostOperation::Close, sequence.clone()))
    }

    fn host_name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_append_and_read_transcript() {
        let host = InMemoryHost::new();
        let id = host.open_sequence(&OpenOptions::new()).await.unwrap();

        host.append_content(&id, &Content::from("hello"), &Options::hidden_system())
            .await
            .unwrap();

        let transcript = host.transcript(&id).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].content.as_text(), Some("hello"));
        assert!(transcript[0].is_hidden());
    }

    #[tokio::test]
    async fn fork_copies_transcript() {
        let host = InMemoryHost::new();
        let id = host.open_sequence(&OpenOptions::new()).await.unwrap();
        host.append_content(&id, &Content::from("a"), &Options::new())
            .await
            .unwrap();

        let forked = host.fork_sequence(&id).await.unwrap();
        assert_ne!(forked, id);

        host.append_content(&forked, &Content::from("b"), &Options::new())
            .await
            .unwrap();

        assert_eq!(host.transcript(&id).unwrap().len(), 1);
        assert_eq!(host.transcript(&forked).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn close_releases_sequence() {
        let host = InMemoryHost::new();
        let id = host.open_sequence(&OpenOptions::new()).await.unwrap();
        assert_eq!(host.open_count(), 1);

        host.close_sequence(&id).await.unwrap();
        assert!(!host.is_open(&id));

        let again = host.close_sequence(&id).await.unwrap_err();
        assert!(again.is_unknown_sequence());
    }

    #[tokio::test]
    async fn generate_echoes_options() {
        let host = InMemoryHost::new();
        let id = host.open_sequence(&OpenOptions::new()).await.unwrap();

        let output = host
            .generate(&id, &Options::new().with_role("user").with("max_tokens", 5))
            .await
            .unwrap();

        assert_eq!(output["options"]["role"], "user");
        assert_eq!(output["options"]["max_tokens"], 5);
        assert_eq!(output["context_len"], 0);
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let host = InMemoryHost::new();
        let id = host.open_sequence(&OpenOptions::new()).await.unwrap();
        host.fail_next(HostOperation::Append, "disk full");

        let err = host
            .append_content(&id, &Content::from("x"), &Options::new())
            .await
            .unwrap_err();
        assert_eq!(err, HostError::rejected(HostOperation::Append, "disk full"));
        assert!(host.transcript(&id).unwrap().is_empty());

        host.append_content(&id, &Content::from("x"), &Options::new())
            .await
            .unwrap();
        assert_eq!(host.transcript(&id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn calls_are_recorded_in_order() {
        let host = InMemoryHost::new();
        let id = host.open_sequence(&OpenOptions::new()).await.unwrap();
        host.generate(&id, &Options::new()).await.unwrap();
        host.fork_sequence(&id).await.unwrap();

        let ops: Vec<HostOperation> = host.calls().iter().map(HostCall::operation).collect();
        assert_eq!(
            ops,
            [HostOperation::Open, HostOperation::Generate, HostOperation::Fork]
        );
        assert_eq!(host.calls_of(HostOperation::Generate).len(), 1);
    }

    #[tokio::test]
    async fn unknown_sequence_is_reported() {
        let host = InMemoryHost::new();
        let err = host
            .generate(&SequenceId::from(404), &Options::new())
            .await
            .unwrap_err();
        assert!(err.is_unknown_sequence());
        assert_eq!(err.operation, HostOperation::Generate);
    }
}
