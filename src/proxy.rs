//! Role-pinned views over a sequence.
//!
//! A [`ProxySequence`] borrows a sequence and folds a fixed set of options
//! into every `gen` and `append`. Call-site options win over the fixed ones,
//! so `user(&seq).gen(Options::new().with_role(Role::Assistant))` generates
//! as the assistant.
//!
//! Proxies implement [`SequenceOps`] themselves and can wrap each other; the
//! outer proxy's fixed options are applied on top of the inner one's.

use crate::error::SequenceError;
use crate::options::{Content, Options, Role};
use crate::sequence::SequenceOps;
use crate::types::SequenceId;
use async_trait::async_trait;
use serde_json::Value;

/// A borrowed view of a sequence with fixed generate and append options.
#[derive(Debug)]
pub struct ProxySequence<'a, S: SequenceOps + ?Sized> {
    inner: &'a S,
    gen_overrides: Options,
    append_overrides: Options,
}

// Manual impl: derive would require `S: Clone`.
impl<S: SequenceOps + ?Sized> Clone for ProxySequence<'_, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner,
            gen_overrides: self.gen_overrides.clone(),
            append_overrides: self.append_overrides.clone(),
        }
    }
}

impl<'a, S: SequenceOps + ?Sized> ProxySequence<'a, S> {
    /// Creates a proxy with separate fixed options for generate and append.
    #[must_use]
    pub fn new(inner: &'a S, gen_overrides: Options, append_overrides: Options) -> Self {
        Self {
            inner,
            gen_overrides,
            append_overrides,
        }
    }

    /// Creates a proxy that pins `role` on both generate and append.
    #[must_use]
    pub fn with_role(inner: &'a S, role: Role) -> Self {
        let fixed = Options::new().with_role(role);
        Self::new(inner, fixed.clone(), fixed)
    }

    /// Returns the wrapped sequence.
    #[must_use]
    pub fn inner(&self) -> &'a S {
        self.inner
    }

    /// Returns the options fixed for generation.
    #[must_use]
    pub fn gen_overrides(&self) -> &Options {
        &self.gen_overrides
    }

    /// Returns the options fixed for append.
    #[must_use]
    pub fn append_overrides(&self) -> &Options {
        &self.append_overrides
    }

    /// Generates with the fixed options merged under `options`.
    ///
    /// # Errors
    ///
    /// Returns whatever the wrapped sequence returns.
    pub async fn gen(&self, options: Options) -> Result<Value, SequenceError> {
        self.inner
            .gen(self.gen_overrides.merged_with(&options))
            .await
    }

    /// Appends with the fixed options merged under `options`.
    ///
    /// # Errors
    ///
    /// Returns whatever the wrapped sequence returns.
    pub async fn append(
        &self,
        content: impl Into<Content>,
        options: Options,
    ) -> Result<Value, SequenceError> {
        self.inner
            .append(content.into(), self.append_overrides.merged_with(&options))
            .await
    }

    /// Closes the wrapped sequence.
    ///
    /// # Errors
    ///
    /// Returns whatever the wrapped sequence returns.
    pub async fn close(&self) -> Result<(), SequenceError> {
        self.inner.close().await
    }
}

#[async_trait]
impl<'a, S: SequenceOps + ?Sized> SequenceOps for ProxySequence<'a, S> {
    fn id(&self) -> &SequenceId {
        self.inner.id()
    }

    async fn gen(&self, options: Options) -> Result<Value, SequenceError> {
        ProxySequence::gen(self, options).await
    }

    async fn append(&self, content: Content, options: Options) -> Result<Value, SequenceError> {
        ProxySequence::append(self, content, options).await
    }

    async fn close(&self) -> Result<(), SequenceError> {
        ProxySequence::close(self).await
    }
}

/// Pins the `user` role on a sequence.
#[must_use]
pub fn user<S: SequenceOps + ?Sized>(seq: &S) -> ProxySequence<'_, S> {
    ProxySequence::with_role(seq, Role::User)
}

/// Pins the `assistant` role on a sequence.
#[must_use]
pub fn assistant<S: SequenceOps + ?Sized>(seq: &S) -> ProxySequence<'_, S> {
    ProxySequence::with_role(seq, Role::Assistant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, HostOperation, InMemoryHost, SequenceHost};
    use crate::options::OpenOptions;
    use crate::sequence::{open, Sequence};
    use serde_json::json;
    use std::sync::Arc;

    async fn bare_sequence(host: &Arc<InMemoryHost>) -> Sequence {
        let dyn_host: Arc<dyn SequenceHost> = host.clone();
        open(dyn_host, OpenOptions::new().with_skip_prelude(true))
            .await
            .unwrap()
    }

    fn last_append_options(host: &InMemoryHost) -> Options {
        match host.calls_of(HostOperation::Append).pop() {
            Some(HostCall::Append { options, .. }) => options,
            other => panic!("expected an append, got {other:?}"),
        }
    }

    fn last_gen_options(host: &InMemoryHost) -> Options {
        match host.calls_of(HostOperation::Generate).pop() {
            Some(HostCall::Generate { options, .. }) => options,
            other => panic!("expected a generate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn user_proxy_pins_role() {
        let host = Arc::new(InMemoryHost::new());
        let seq = bare_sequence(&host).await;

        user(&seq).append("Hello", Options::new()).await.unwrap();
        assert_eq!(last_append_options(&host), Options::new().with_role(Role::User));

        user(&seq).gen(Options::new()).await.unwrap();
        assert_eq!(last_gen_options(&host), Options::new().with_role(Role::User));
    }

    #[tokio::test]
    async fn assistant_proxy_keeps_caller_keys() {
        let host = Arc::new(InMemoryHost::new());
        let seq = bare_sequence(&host).await;

        let out = assistant(&seq)
            .gen(Options::new().with("max_tokens", 16))
            .await
            .unwrap();

        assert_eq!(out["options"], json!({"role": "assistant", "max_tokens": 16}));
    }

    #[tokio::test]
    async fn call_site_role_wins() {
        let host = Arc::new(InMemoryHost::new());
        let seq = bare_sequence(&host).await;

        user(&seq)
            .gen(Options::new().with_role(Role::Assistant))
            .await
            .unwrap();
        assert_eq!(last_gen_options(&host).role, Some(Role::Assistant));
    }

    #[tokio::test]
    async fn role_passed_by_key_wins() {
        let host = Arc::new(InMemoryHost::new());
        let seq = bare_sequence(&host).await;

        let out = user(&seq)
            .gen(Options::new().with("role", "assistant"))
            .await
            .unwrap();

        let options = last_gen_options(&host);
        assert_eq!(options.role, Some(Role::Assistant));
        assert!(!options.extra.contains_key("role"));
        assert_eq!(out["options"], json!({"role": "assistant"}));

        user(&seq)
            .append("aside", Options::new().with("hidden", true))
            .await
            .unwrap();
        assert_eq!(
            last_append_options(&host),
            Options::new().with_role(Role::User).with_hidden(true)
        );
    }

    #[tokio::test]
    async fn proxies_share_the_underlying_sequence() {
        let host = Arc::new(InMemoryHost::new());
        let seq = bare_sequence(&host).await;

        user(&seq).append("Q", Options::new()).await.unwrap();
        assistant(&seq).append("A", Options::new()).await.unwrap();

        let transcript = host.transcript(seq.id()).unwrap();
        let roles: Vec<Option<Role>> = transcript.into_iter().map(|e| e.options.role).collect();
        assert_eq!(roles, [Some(Role::User), Some(Role::Assistant)]);
        assert_eq!(SequenceOps::id(&user(&seq)), seq.id());
    }

    #[tokio::test]
    async fn nested_proxies_apply_outer_over_inner() {
        let host = Arc::new(InMemoryHost::new());
        let seq = bare_sequence(&host).await;

        let hidden = Options::new().with_hidden(true);
        let inner = user(&seq);
        let outer = ProxySequence::new(&inner, Options::new(), hidden);

        outer.append("note", Options::new()).await.unwrap();
        assert_eq!(
            last_append_options(&host),
            Options::new().with_role(Role::User).with_hidden(true)
        );
    }

    #[tokio::test]
    async fn proxy_close_closes_the_sequence() {
        let host = Arc::new(InMemoryHost::new());
        let seq = bare_sequence(&host).await;

        user(&seq).close().await.unwrap();
        assert!(seq.is_closed());
        assert!(!host.is_open(seq.id()));
        assert_eq!(user(&seq).inner().id(), seq.id());
    }
}
