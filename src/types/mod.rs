//! Data types for the LRS
//!
//! This module contains the statement model and the records that travel
//! between the service, the store, and the HTTP layer.

mod actor;
mod filter;
mod object;
mod record;
mod statement;
mod statement_result;
mod verb;

pub use actor::{Account, Actor, Agent, Group, Identifier};
pub use filter::{FilterCriteria, FilterKey};
pub use object::{Activity, StatementObject, StatementRef};
pub use record::LrsRecord;
pub use statement::{to_canonical_json, EncodingError, Statement};
pub use statement_result::{ContinuationToken, StatementResult};
pub use verb::Verb;

/// Result type for top-level operations
pub type LrsResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// xAPI version reported in response headers
pub const XAPI_VERSION: &str = "1.0.3";

/// Version assigned to statements that arrive without one
pub const DEFAULT_STATEMENT_VERSION: &str = "1.0.0";
