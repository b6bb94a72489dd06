//! A host bundled with prelude settings and open defaults.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_seq::prelude::*;
//!
//! let config = acton_seq::config::load()?;
//! let client = SequenceClient::from_config(Arc::new(InMemoryHost::new()), &config);
//!
//! let seq = client.open(OpenOptions::new().with_system_prompt("Be terse.")).await?;
//! ```

use crate::config::SeqConfig;
use crate::error::SequenceError;
use crate::host::SequenceHost;
use crate::options::OpenOptions;
use crate::sequence::{open_with, Sequence};
use crate::system_prompt::PreludeSettings;
use chrono::NaiveDate;
use std::sync::Arc;

/// Opens sequences on a shared host with fixed prelude settings and defaults.
#[derive(Debug, Clone)]
pub struct SequenceClient {
    host: Arc<dyn SequenceHost>,
    prelude: PreludeSettings,
    defaults: OpenOptions,
}

impl SequenceClient {
    /// Creates a client with the built-in prelude and no open defaults.
    #[must_use]
    pub fn new(host: Arc<dyn SequenceHost>) -> Self {
        Self {
            host,
            prelude: PreludeSettings::default(),
            defaults: OpenOptions::default(),
        }
    }

    /// Creates a client from a loaded configuration.
    #[must_use]
    pub fn from_config(host: Arc<dyn SequenceHost>, config: &SeqConfig) -> Self {
        Self {
            host,
            prelude: config.prelude(),
            defaults: config.open_options(),
        }
    }

    /// Replaces the prelude settings.
    #[must_use]
    pub fn with_prelude(mut self, prelude: PreludeSettings) -> Self {
        self.prelude = prelude;
        self
    }

    /// Replaces the open defaults.
    #[must_use]
    pub fn with_defaults(mut self, defaults: OpenOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Returns the shared host.
    #[must_use]
    pub fn host(&self) -> &Arc<dyn SequenceHost> {
        &self.host
    }

    /// Returns the prelude settings.
    #[must_use]
    pub fn prelude(&self) -> &PreludeSettings {
        &self.prelude
    }

    /// Returns the open defaults.
    #[must_use]
    pub fn defaults(&self) -> &OpenOptions {
        &self.defaults
    }

    /// Opens a sequence dated today, filling unset options from the defaults.
    ///
    /// # Errors
    ///
    /// Returns the host's error if opening or the opening append fails.
    pub async fn open(&self, options: OpenOptions) -> Result<Sequence, SequenceError> {
        self.open_on(options, chrono::Local::now().date_naive())
            .await
    }

    /// Opens a sequence with an explicit date.
    ///
    /// # Errors
    ///
    /// Returns the host's error if opening or the opening append fails.
    pub async fn open_on(
        &self,
        options: OpenOptions,
        today: NaiveDate,
    ) -> Result<Sequence, SequenceError> {
        let options = options.or(&self.defaults);
        open_with(Arc::clone(&self.host), &options, &self.prelude, today).await
    }
}
