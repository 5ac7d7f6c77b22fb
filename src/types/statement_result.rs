//! Query response envelope and continuation tokens

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::statement::{to_canonical_json, EncodingError};
use super::Statement;

/// One page of statements returned by a filtered query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatementResult {
    pub statements: Vec<Statement>,
    /// Where to fetch the next page; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more: Option<String>,
}

impl StatementResult {
    pub fn new(statements: Vec<Statement>, more: Option<String>) -> Self {
        Self { statements, more }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn has_more(&self) -> bool {
        self.more.is_some()
    }

    pub fn to_json(&self) -> Result<String, EncodingError> {
        to_canonical_json("STATEMENT_RESULT", self)
    }
}

/// Opaque paging cursor: the store position the next page starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContinuationToken(u64);

impl ContinuationToken {
    const PREFIX: &'static str = "p";

    pub fn new(position: u64) -> Self {
        Self(position)
    }

    pub fn position(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:x}", Self::PREFIX, self.0)
    }
}

impl FromStr for ContinuationToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| format!("invalid continuation token '{}'", s))?;
        u64::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| format!("invalid continuation token '{}'", s))
    }
}
