//! Sequences: forkable, append-only model contexts with installable tools.
//!
//! A [`Sequence`] is a handle on a host-side context plus the tools installed
//! on it. Generation and append are forwarded to the host as-is; the only
//! local logic is tool validation, the tool permission check, and the
//! install ordering (announce first, register after).
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_seq::prelude::*;
//!
//! let host: Arc<dyn SequenceHost> = Arc::new(InMemoryHost::new());
//! let mut seq = open(host, OpenOptions::new().with_tools(true).with_system_prompt("Be terse.")).await?;
//!
//! seq.install(ToolSpec::new("add", "Adds two numbers", ToolFunction::sync(add))).await?;
//! user(&seq).append("What is 2 + 3?", Options::new()).await?;
//! let out = assistant(&seq).gen(Options::new()).await?;
//!
//! seq.close().await?;
//! ```

use crate::error::SequenceError;
use crate::host::SequenceHost;
use crate::options::{Content, OpenOptions, Options};
use crate::system_prompt::PreludeSettings;
use crate::tools::{FunctionCall, ToolRegistry, ToolSpec};
use crate::types::SequenceId;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// The generate/append/close surface shared by sequences and proxies.
#[async_trait]
pub trait SequenceOps: Send + Sync {
    /// The id of the underlying host sequence.
    fn id(&self) -> &SequenceId;

    /// Requests generation with the given options.
    async fn gen(&self, options: Options) -> Result<Value, SequenceError>;

    /// Appends content with the given options.
    async fn append(&self, content: Content, options: Options) -> Result<Value, SequenceError>;

    /// Releases the underlying host sequence.
    async fn close(&self) -> Result<(), SequenceError>;
}

/// An open model sequence.
#[derive(Debug)]
pub struct Sequence {
    id: SequenceId,
    tools_enabled: bool,
    tools: ToolRegistry,
    host: Arc<dyn SequenceHost>,
    closed: AtomicBool,
}

/// Opens a sequence and appends its opening system message.
///
/// Uses the default prelude settings and today's local date.
///
/// # Errors
///
/// Returns the host's error if opening the sequence or appending the
/// system message fails.
pub async fn open(
    host: Arc<dyn SequenceHost>,
    options: OpenOptions,
) -> Result<Sequence, SequenceError> {
    open_with(
        host,
        &options,
        &PreludeSettings::default(),
        chrono::Local::now().date_naive(),
    )
    .await
}

/// Opens a sequence with explicit prelude settings and date.
///
/// # Errors
///
/// Returns the host's error if opening the sequence or appending the
/// system message fails.
pub async fn open_with(
    host: Arc<dyn SequenceHost>,
    options: &OpenOptions,
    prelude: &PreludeSettings,
    today: NaiveDate,
) -> Result<Sequence, SequenceError> {
    debug!(host = host.host_name(), tools = options.tools_enabled(), "Opening sequence");
    let id = host
        .open_sequence(options)
        .await
        .map_err(|e| SequenceError::host(None, e))?;

    let seq = Sequence::new(id, options.tools_enabled(), ToolRegistry::new(), host);

    let system_message = prelude.assemble(options, today);
    trace!(
        sequence_id = %seq.id,
        length = system_message.len(),
        "Assembled opening system message"
    );
    if !system_message.is_empty() {
        seq.append(system_message, Options::hidden_system()).await?;
    }

    info!(sequence_id = %seq.id, tools_enabled = seq.tools_enabled, "Sequence opened");
    Ok(seq)
}

impl Sequence {
    fn new(
        id: SequenceId,
        tools_enabled: bool,
        tools: ToolRegistry,
        host: Arc<dyn SequenceHost>,
    ) -> Self {
        Self {
            id,
            tools_enabled,
            tools,
            host,
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the host-issued id.
    #[must_use]
    pub fn id(&self) -> &SequenceId {
        &self.id
    }

    /// Returns true if tools may be installed.
    #[must_use]
    pub fn tools_enabled(&self) -> bool {
        self.tools_enabled
    }

    /// Returns the installed tools.
    #[must_use]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Returns the host this sequence lives on.
    #[must_use]
    pub fn host(&self) -> &Arc<dyn SequenceHost> {
        &self.host
    }

    /// Returns true once [`close`](Self::close) has succeeded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Requests generation from the host.
    ///
    /// Options are passed through unvalidated; the host decides what they mean.
    ///
    /// # Errors
    ///
    /// Returns the host's error unchanged.
    pub async fn gen(&self, options: Options) -> Result<Value, SequenceError> {
        debug!(sequence_id = %self.id, role = ?options.role, "Generating");
        self.host
            .generate(&self.id, &options)
            .await
            .map_err(|e| SequenceError::host(Some(&self.id), e))
    }

    /// Appends text or tokens to the host context.
    ///
    /// # Errors
    ///
    /// Returns the host's error unchanged.
    pub async fn append(
        &self,
        content: impl Into<Content>,
        options: Options,
    ) -> Result<Value, SequenceError> {
        let content = content.into();
        debug!(
            sequence_id = %self.id,
            role = ?options.role,
            hidden = ?options.hidden,
            "Appending"
        );
        self.host
            .append_content(&self.id, &content, &options)
            .await
            .map_err(|e| SequenceError::host(Some(&self.id), e))
    }

    /// Forks the host context into a new sequence.
    ///
    /// The fork gets its own id, the same tool permission, and a copy of the
    /// installed tools; nothing is re-announced.
    ///
    /// # Errors
    ///
    /// Returns the host's error unchanged.
    pub async fn fork(&self) -> Result<Sequence, SequenceError> {
        let id = self
            .host
            .fork_sequence(&self.id)
            .await
            .map_err(|e| SequenceError::host(Some(&self.id), e))?;

        info!(
            sequence_id = %self.id,
            fork_id = %id,
            tools_count = self.tools.len(),
            "Sequence forked"
        );
        Ok(Self::new(
            id,
            self.tools_enabled,
            self.tools.clone(),
            Arc::clone(&self.host),
        ))
    }

    /// Releases the sequence on the host.
    ///
    /// Only the first successful call reaches the host; later calls return
    /// `Ok(())`. Forks are separate resources and need their own close.
    ///
    /// # Errors
    ///
    /// Returns the host's error unchanged, including `NotImplemented` for
    /// hosts without close support. A failed close may be retried.
    pub async fn close(&self) -> Result<(), SequenceError> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(sequence_id = %self.id, "Sequence already closed");
            return Ok(());
        }

        match self.host.close_sequence(&self.id).await {
            Ok(()) => {
                info!(sequence_id = %self.id, "Sequence closed");
                Ok(())
            }
            Err(e) => {
                self.closed.store(false, Ordering::Release);
                Err(SequenceError::host(Some(&self.id), e))
            }
        }
    }

    /// Calls an installed tool with `params`.
    ///
    /// Talks only to the tool, never to the host.
    ///
    /// # Errors
    ///
    /// Returns `ToolNotFound` if no tool has this name, or `ToolFailed`
    /// carrying the tool's own error.
    pub async fn invoke_tool(&self, name: &str, params: Value) -> Result<Value, SequenceError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| SequenceError::tool_not_found(&self.id, name))?;

        debug!(sequence_id = %self.id, tool_name = name, "Invoking tool");
        tool.call(params)
            .await
            .map_err(|e| SequenceError::tool_failed(&self.id, name, e))
    }

    /// Dispatches a parsed model function call to its tool.
    ///
    /// # Errors
    ///
    /// Same as [`invoke_tool`](Self::invoke_tool).
    pub async fn invoke_call(&self, call: &FunctionCall) -> Result<Value, SequenceError> {
        self.invoke_tool(call.name.as_str(), call.arguments.clone())
            .await
    }

    /// Installs a tool.
    ///
    /// Validates the candidate, appends its announcement as a hidden system
    /// message, and registers it once the host has accepted the append. If
    /// the append fails the tool stays unregistered and the call can be
    /// retried.
    ///
    /// Concurrent installs on one sequence are not synchronised; await each
    /// install before issuing the next.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if the sequence was opened without tools
    /// - `InvalidTool` naming the first broken rule
    /// - `DuplicateTool` if the name is already installed
    /// - the host's error if the announcement could not be appended
    pub async fn install(&mut self, spec: ToolSpec) -> Result<(), SequenceError> {
        if !self.tools_enabled {
            return Err(SequenceError::permission_denied(&self.id));
        }

        let definition = self.tools.validate(Some(&self.id), spec)?;

        if let Err(e) = self
            .append(definition.announcement(), Options::hidden_system())
            .await
        {
            warn!(
                sequence_id = %self.id,
                tool_name = %definition.name(),
                error = %e,
                "Tool announcement failed; tool not installed"
            );
            return Err(e);
        }

        let tool_name = definition.name().clone();
        self.tools.insert(definition);
        info!(
            sequence_id = %self.id,
            tool_name = %tool_name,
            tools_count = self.tools.len(),
            "Tool installed"
        );
        Ok(())
    }
}

#[async_trait]
impl SequenceOps for Sequence {
    fn id(&self) -> &SequenceId {
        &self.id
    }

    async fn gen(&self, options: Options) -> Result<Value, SequenceError> {
        Sequence::gen(self, options).await
    }

    async fn append(&self, content: Content, options: Options) -> Result<Value, SequenceError> {
        Sequence::append(self, content, options).await
    }

    async fn close(&self) -> Result<(), SequenceError> {
        Sequence::close(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, HostOperation, InMemoryHost};
    use crate::options::Role;
    use crate::tools::{InvalidTool, ToolError, ToolFunction};
    use serde_json::json;

    fn april_5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()
    }

    async fn open_on(host: &Arc<InMemoryHost>, options: OpenOptions) -> Sequence {
        let dyn_host: Arc<dyn SequenceHost> = host.clone();
        open_with(dyn_host, &options, &PreludeSettings::default(), april_5())
            .await
            .unwrap()
    }

    fn add_tool() -> ToolSpec {
        ToolSpec::new(
            "add",
            "Adds a and b",
            ToolFunction::sync(|p| {
                let a = p["a"].as_i64().ok_or_else(|| ToolError::invalid_arguments("a"))?;
                let b = p["b"].as_i64().ok_or_else(|| ToolError::invalid_arguments("b"))?;
                Ok(json!(a + b))
            }),
        )
    }

    fn appended_texts(host: &InMemoryHost, id: &SequenceId) -> Vec<String> {
        host.transcript(id)
            .unwrap()
            .into_iter()
            .filter_map(|entry| entry.content.as_text().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn open_appends_hidden_system_prelude() {
        let host = Arc::new(InMemoryHost::new());
        let seq = open_on(&host, OpenOptions::new().with_system_prompt("Hello")).await;

        let transcript = host.transcript(seq.id()).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].options, Options::hidden_system());
        assert_eq!(
            transcript[0].content.as_text(),
            Some("Cutting Knowledge Date: December 2023\nToday Date: April 5, 2024\n\nHello")
        );
    }

    #[tokio::test]
    async fn open_with_nothing_to_say_appends_nothing() {
        let host = Arc::new(InMemoryHost::new());
        let _seq = open_on(
            &host,
            OpenOptions::new()
                .with_skip_prelude(true)
                .with_system_prompt(""),
        )
        .await;

        assert!(host.calls_of(HostOperation::Append).is_empty());
    }

    #[tokio::test]
    async fn open_failure_propagates() {
        let host = Arc::new(InMemoryHost::new());
        host.fail_next(HostOperation::Open, "no capacity");
        let dyn_host: Arc<dyn SequenceHost> = host.clone();

        let err = open(dyn_host, OpenOptions::new()).await.unwrap_err();
        assert_eq!(
            err.host_error().map(|e| e.operation),
            Some(HostOperation::Open)
        );
    }

    #[tokio::test]
    async fn gen_and_append_pass_options_through() {
        let host = Arc::new(InMemoryHost::new());
        let seq = open_on(&host, OpenOptions::new().with_skip_prelude(true)).await;

        seq.append(vec![1u32, 2, 3], Options::new().with_role(Role::User))
            .await
            .unwrap();
        let out = seq
            .gen(Options::new().with("temperature", 0.7))
            .await
            .unwrap();

        assert_eq!(out["options"], json!({"temperature": 0.7}));
        let transcript = host.transcript(seq.id()).unwrap();
        assert_eq!(transcript[0].content, Content::Tokens(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn install_announces_then_registers() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;

        seq.install(add_tool()).await.unwrap();

        assert!(seq.tools().contains("add"));
        let texts = appended_texts(&host, seq.id());
        assert_eq!(texts.len(), 2);
        assert!(texts[1].starts_with("Use the function 'add' to: Adds a and b\n{\n"));
        assert!(texts[1].ends_with("}\n\n"));
    }

    #[tokio::test]
    async fn install_twice_is_duplicate() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;

        seq.install(add_tool()).await.unwrap();
        let err = seq.install(add_tool()).await.unwrap_err();

        assert!(err.is_duplicate_tool());
        assert_eq!(seq.tools().len(), 1);
    }

    #[tokio::test]
    async fn install_without_tools_is_denied() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new()).await;
        let appends_before = host.calls_of(HostOperation::Append).len();

        let err = seq.install(add_tool()).await.unwrap_err();
        assert!(err.is_permission_denied());

        let err = seq.install(ToolSpec::default()).await.unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(host.calls_of(HostOperation::Append).len(), appends_before);
    }

    #[tokio::test]
    async fn invalid_name_fails_before_append() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;
        let appends_before = host.calls_of(HostOperation::Append).len();

        for name in ["my tool", "tool!", ""] {
            let spec = ToolSpec::new(name, "d", ToolFunction::sync(Ok));
            let err = seq.install(spec).await.unwrap_err();
            assert!(err.invalid_tool_rule().is_some(), "{name} should be invalid");
        }
        assert_eq!(host.calls_of(HostOperation::Append).len(), appends_before);
        assert!(seq.tools().is_empty());
    }

    #[tokio::test]
    async fn failed_announcement_leaves_tool_unregistered() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;

        host.fail_next(HostOperation::Append, "context full");
        let err = seq.install(add_tool()).await.unwrap_err();
        assert!(err.host_error().is_some());
        assert!(!seq.tools().contains("add"));

        seq.install(add_tool()).await.unwrap();
        assert!(seq.tools().contains("add"));
    }

    #[tokio::test]
    async fn invoke_tool_dispatches() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;
        seq.install(add_tool()).await.unwrap();
        let calls_before = host.calls().len();

        let out = seq.invoke_tool("add", json!({"a": 2, "b": 3})).await.unwrap();
        assert_eq!(out, json!(5));
        assert_eq!(host.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn invoke_missing_tool_is_not_found() {
        let host = Arc::new(InMemoryHost::new());
        let seq = open_on(&host, OpenOptions::new()).await;

        let err = seq.invoke_tool("missing", json!({})).await.unwrap_err();
        assert!(err.is_tool_not_found());
    }

    #[tokio::test]
    async fn tool_errors_are_reported_with_tool_name() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;
        seq.install(add_tool()).await.unwrap();

        let err = seq.invoke_tool("add", json!({"a": 1})).await.unwrap_err();
        match err.kind {
            crate::error::SequenceErrorKind::ToolFailed { tool_name, error } => {
                assert_eq!(tool_name, "add");
                assert!(error.is_invalid_arguments());
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invoke_call_uses_parsed_arguments() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;
        seq.install(add_tool()).await.unwrap();

        let calls = FunctionCall::parse_all(r#"<function=add>{"a": 20, "b": 22}</function>"#)
            .unwrap();
        let out = seq.invoke_call(&calls[0]).await.unwrap();
        assert_eq!(out, json!(42));
    }

    #[tokio::test]
    async fn fork_copies_tools_without_reannouncing() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;
        seq.install(add_tool()).await.unwrap();
        seq.install(ToolSpec::new("noop", "Does nothing", ToolFunction::sync(Ok)))
            .await
            .unwrap();
        let appends_before = host.calls_of(HostOperation::Append).len();

        let fork = seq.fork().await.unwrap();

        assert_ne!(fork.id(), seq.id());
        assert!(fork.tools_enabled());
        let names: Vec<&str> = fork.tools().names().map(|n| n.as_str()).collect();
        assert_eq!(names, ["add", "noop"]);
        assert_eq!(host.calls_of(HostOperation::Append).len(), appends_before);
        assert_eq!(fork.invoke_tool("add", json!({"a": 1, "b": 1})).await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn fork_registry_is_independent() {
        let host = Arc::new(InMemoryHost::new());
        let seq = open_on(&host, OpenOptions::new().with_tools(true)).await;
        let mut fork = seq.fork().await.unwrap();

        fork.install(add_tool()).await.unwrap();
        assert!(fork.tools().contains("add"));
        assert!(!seq.tools().contains("add"));
    }

    #[tokio::test]
    async fn close_reaches_host_once() {
        let host = Arc::new(InMemoryHost::new());
        let seq = open_on(&host, OpenOptions::new()).await;

        seq.close().await.unwrap();
        seq.close().await.unwrap();

        assert!(seq.is_closed());
        assert!(!host.is_open(seq.id()));
        let closes = host.calls_of(HostOperation::Close);
        assert_eq!(
            closes,
            vec![HostCall::Close {
                sequence_id: seq.id().clone()
            }]
        );
    }

    #[tokio::test]
    async fn failed_close_can_be_retried() {
        let host = Arc::new(InMemoryHost::new());
        let seq = open_on(&host, OpenOptions::new()).await;

        host.fail_next(HostOperation::Close, "busy");
        assert!(seq.close().await.is_err());
        assert!(!seq.is_closed());

        seq.close().await.unwrap();
        assert!(seq.is_closed());
    }

    #[tokio::test]
    async fn invalid_descriptor_reports_rule() {
        let host = Arc::new(InMemoryHost::new());
        let mut seq = open_on(&host, OpenOptions::new().with_tools(true)).await;

        let spec = ToolSpec::from_value(json!({"name": "lookup", "description": "Find", "fn": "h"}));
        let err = seq.install(spec).await.unwrap_err();
        assert_eq!(
            err.invalid_tool_rule(),
            Some(&InvalidTool::FunctionNotCallable)
        );
    }
}
