//! Agent identifiers.
//!
//! Agents are named rather than generated: a scenario declares a small,
//! closed set of ids up front and the scheduler checks every snapshot
//! against that set. Ids are ordered so that snapshots keyed by them
//! iterate deterministically.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of one agent in the simulated frame.
///
/// Serializes as a bare string so it can key a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct AgentId(String);

impl AgentId {
    /// Create an identifier from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier and return the owned name.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for AgentId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
