//! Registry of LRS record kinds
//!
//! Every persisted record exposes a type discriminator and a lookup key.
//! The JSON-lines store writes records in this envelope:
//! `{"kind":"STATEMENT","record":{...}}`.

use serde::{Deserialize, Serialize};

use super::statement::{to_canonical_json, EncodingError};
use super::{Activity, Agent, Statement};

/// A record of any kind the LRS can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record")]
pub enum LrsRecord {
    #[serde(rename = "STATEMENT")]
    Statement(Statement),
    #[serde(rename = "ACTIVITY")]
    Activity(Activity),
    #[serde(rename = "AGENT")]
    Agent(Agent),
}

impl LrsRecord {
    /// Lookup key within the record's kind
    pub fn key(&self) -> Option<String> {
        match self {
            LrsRecord::Statement(statement) => statement.key().map(str::to_owned),
            LrsRecord::Activity(activity) => Some(activity.id.clone()),
            LrsRecord::Agent(agent) => agent.identifier.canonical(),
        }
    }

    pub fn object_key(&self) -> &'static str {
        match self {
            LrsRecord::Statement(_) => Statement::OBJECT_KEY,
            LrsRecord::Activity(_) => Activity::OBJECT_KEY,
            LrsRecord::Agent(_) => Agent::OBJECT_KEY,
        }
    }

    /// Serialize to one JSONL line (no trailing newline)
    pub fn to_json_line(&self) -> Result<String, EncodingError> {
        to_canonical_json(self.object_key(), self)
    }

    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl From<Statement> for LrsRecord {
    fn from(statement: Statement) -> Self {
        LrsRecord::Statement(statement)
    }
}
