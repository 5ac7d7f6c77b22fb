//! Statement type: the canonical record of a learning event

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Actor, StatementObject, Verb};

/// Canonical serialization could not produce output
#[derive(Debug, thiserror::Error)]
#[error("failed to encode {kind} as JSON: {source}")]
pub struct EncodingError {
    pub kind: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Serialize any record to its canonical JSON text
pub fn to_canonical_json<T: Serialize>(kind: &'static str, value: &T) -> Result<String, EncodingError> {
    serde_json::to_string(value).map_err(|source| EncodingError { kind, source })
}

/// An "actor verb object" experience statement.
///
/// Fields left unset are omitted from the serialized form; `result`,
/// `context` and `attachments` are kept as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub actor: Actor,
    pub verb: Verb,
    pub object: StatementObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// When the experience occurred (client supplied)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// When the LRS persisted the statement (server assigned)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Value>>,
}

impl Statement {
    /// Registry discriminator for statement records
    pub const OBJECT_KEY: &'static str = "STATEMENT";

    /// Create a pending statement with only the required parts set
    pub fn new(actor: Actor, verb: Verb, object: StatementObject) -> Self {
        Self {
            id: None,
            actor,
            verb,
            object,
            result: None,
            context: None,
            timestamp: None,
            stored: None,
            authority: None,
            version: None,
            attachments: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Lookup key, `None` until an id is assigned
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn object_key(&self) -> &'static str {
        Self::OBJECT_KEY
    }

    /// Whether the LRS has assigned identity and `stored`
    pub fn is_stored(&self) -> bool {
        self.key().is_some() && self.stored.is_some()
    }

    /// Canonical JSON text
    pub fn to_json(&self) -> Result<String, EncodingError> {
        to_canonical_json(Self::OBJECT_KEY, self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
