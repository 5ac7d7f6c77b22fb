//! Statement Store
//!
//! The store exclusively owns durable statement state. Two backends are
//! provided:
//! - `MemoryStore`: process-local, for tests and ephemeral deployments
//! - `JsonlStore`: append-only `statements.jsonl` replayed on startup
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐    ┌──────────────┐    ┌───────────────┐    ┌──────────────┐
//! │ Service  │───►│ check ids vs │───►│ append batch  │───►│ insert into  │
//! │ save_all │    │ index        │    │ + fsync (log) │    │ index        │
//! └──────────┘    └──────────────┘    └───────────────┘    └──────────────┘
//!
//! Read Path:
//! ┌──────────┐    ┌─────────────────────────────┐
//! │ Service  │───►│ index scan under read lock  │───► page + next position
//! └──────────┘    └─────────────────────────────┘
//! ```

mod index;
mod jsonl;
mod memory;

use async_trait::async_trait;

use crate::types::{EncodingError, FilterCriteria, Statement};

pub use jsonl::{JsonlStore, JsonlStoreConfig};
pub use memory::MemoryStore;

/// Errors a store can report
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id
    #[error("statement not found: {id}")]
    NotFound { id: String },

    /// A record with this id exists but could not be decoded
    #[error("statement {id} is stored but could not be decoded: {reason}")]
    Malformed { id: String, reason: String },

    /// The id is already taken
    #[error("statement id already stored: {id}")]
    Conflict { id: String },

    /// The record is unacceptable to the store (e.g. no id assigned)
    #[error("statement rejected by store: {0}")]
    Rejected(String),

    /// Durable write did not complete; nothing from the batch was kept
    #[error("store write failed: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The backend could not be reached or its worker failed
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Which slice of the matching statements to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Store position to start scanning from
    pub start: u64,
    /// Maximum number of statements to return
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { start: 0, limit }
    }
}

/// One page of matching statements in write order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementPage {
    pub statements: Vec<Statement>,
    /// Position of the first match not included in this page
    pub next: Option<u64>,
}

/// Durable persistence for statements.
///
/// Implementations must be `Send + Sync + 'static` to live in axum state.
/// Writes are all-or-nothing per call; reads see a consistent snapshot.
#[async_trait]
pub trait StatementStore: Send + Sync + 'static {
    /// Look up exactly one statement
    async fn find_by_id(&self, id: &str) -> StoreResult<Statement>;

    /// All statements matching `criteria`, in write order, one page at a time
    async fn find_by_filter(
        &self,
        criteria: &FilterCriteria,
        page: PageRequest,
    ) -> StoreResult<StatementPage>;

    /// Persist a batch atomically; every statement must already carry an id
    async fn save_all(&self, statements: Vec<Statement>) -> StoreResult<()>;

    /// Persist one statement
    async fn save(&self, statement: Statement) -> StoreResult<()> {
        self.save_all(vec![statement]).await
    }

    /// Number of statements held
    async fn count(&self) -> StoreResult<usize>;
}
