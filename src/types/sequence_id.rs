//! Sequence identifier type.
//!
//! Sequence ids are issued by the model host and are opaque to this crate.
//! Hosts may hand out either text or numeric ids. Hosts that mint their own
//! ids (such as the in-memory host) use the TypeID format:
//! `seq_01h455vb4pex5vsknk084sn02q`

use mti::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, host-issued sequence identifier.
///
/// Immutable for the life of the sequence it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SequenceId {
    /// A numeric handle (typical for native runtimes)
    Number(u64),
    /// A textual handle (typical for remote services)
    Text(String),
}

impl SequenceId {
    /// The TypeID prefix used for locally generated sequence ids.
    pub const PREFIX: &'static str = "seq";

    /// Generates a fresh, time-sortable TypeID sequence id.
    ///
    /// Hosts that do not have a natural id space of their own can use this.
    #[must_use]
    pub fn generate() -> Self {
        Self::Text(Self::PREFIX.create_type_id::<V7>().to_string())
    }

    /// Returns true if this id looks like one produced by [`SequenceId::generate`].
    #[must_use]
    pub fn is_type_id(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s
                .parse::<MagicTypeId>()
                .map(|id| id.prefix().as_str() == Self::PREFIX)
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for SequenceId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SequenceId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SequenceId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
