//! Statement Service - operation layer between requests and the store
//!
//! The service completes statements on write (id, stored, version,
//! authority), delegates persistence to the store, and turns filter criteria
//! into paged store lookups. It keeps no statement state between calls.

mod error;

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::{PageRequest, StatementStore};
use crate::types::{
    ContinuationToken, FilterCriteria, FilterKey, Statement, StatementResult,
    DEFAULT_STATEMENT_VERSION,
};
use crate::utils::time::{format_instant, StoredClock};
use crate::validation::{normalize_id, validate_batch, verb_warning, ValidationError};

pub use error::{ServiceError, ServiceResult};

/// Tunables for the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Page size when the caller gives no limit
    pub page_size: usize,
    /// Upper bound on any requested limit
    pub max_page_size: usize,
    /// Authority recorded on statements that arrive without one
    pub authority: Option<String>,
    /// Version recorded on statements that arrive without one
    pub default_version: String,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_page_size: 1000,
            authority: None,
            default_version: DEFAULT_STATEMENT_VERSION.to_string(),
        }
    }
}

/// Paging parameters of a filtered query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: Option<usize>,
    /// Continuation token from a previous `StatementResult`
    pub more: Option<String>,
}

/// Mediates between the request layer and the store
pub struct StatementService {
    store: Arc<dyn StatementStore>,
    clock: StoredClock,
    /// Held from `stored` assignment until the store acknowledges the write,
    /// so write order and `stored` order agree
    write_gate: Mutex<()>,
    options: ServiceOptions,
}

impl StatementService {
    pub fn new(store: Arc<dyn StatementStore>, options: ServiceOptions) -> Self {
        Self {
            store,
            clock: StoredClock::new(),
            write_gate: Mutex::new(()),
            options,
        }
    }

    /// Service with default options
    pub fn with_store(store: Arc<dyn StatementStore>) -> Self {
        Self::new(store, ServiceOptions::default())
    }

    pub fn store(&self) -> &Arc<dyn StatementStore> {
        &self.store
    }

    /// Fetch exactly one statement by id
    pub async fn get_statement(&self, id: &str) -> ServiceResult<Statement> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ValidationError::EmptyField { field: "statementId" }.into());
        }
        let statement = self.store.find_by_id(&normalize_id(id)).await?;
        Ok(statement)
    }

    /// Fetch one page of statements matching every set criterion
    pub async fn get_statements(
        &self,
        criteria: &FilterCriteria,
        page: &PageQuery,
    ) -> ServiceResult<StatementResult> {
        tracing::debug!(
            actor = criteria.get(FilterKey::Actor),
            activity = criteria.get(FilterKey::Activity),
            limit = page.limit,
            "querying statements"
        );

        let start = match page.more.as_deref() {
            Some(token) => token
                .parse::<ContinuationToken>()
                .map_err(ValidationError::InvalidContinuation)?
                .position(),
            None => 0,
        };
        let limit = self.effective_limit(page.limit);

        let found = self
            .store
            .find_by_filter(criteria, PageRequest { start, limit })
            .await?;

        let more = found.next.map(|next| ContinuationToken::new(next).to_string());
        Ok(StatementResult::new(found.statements, more))
    }

    /// Store one statement; returns a one-element id list
    pub async fn post_statement(&self, statement: Statement) -> ServiceResult<Vec<String>> {
        self.post_statements(vec![statement]).await
    }

    /// Validate, complete and store a batch; returns ids in submission order.
    ///
    /// Nothing reaches the store unless every statement is valid, and the
    /// store keeps all of the batch or none of it.
    pub async fn post_statements(&self, statements: Vec<Statement>) -> ServiceResult<Vec<String>> {
        validate_batch(&statements)?;

        for statement in &statements {
            if let Some(warning) = verb_warning(&statement.verb.id) {
                tracing::warn!("{}", warning);
            }
        }

        let writing = self.write_gate.lock().await;

        let completed: Vec<Statement> = statements
            .into_iter()
            .map(|statement| self.complete(statement))
            .collect();
        let ids: Vec<String> = completed
            .iter()
            .filter_map(|s| s.key().map(str::to_owned))
            .collect();

        self.store.save_all(completed).await?;
        drop(writing);

        tracing::info!(count = ids.len(), first = ids.first().map(String::as_str), "stored statements");
        Ok(ids)
    }

    /// Pending → Stored: assign id, stored, and defaults
    fn complete(&self, mut statement: Statement) -> Statement {
        statement.id = Some(match statement.key() {
            Some(id) => normalize_id(id),
            None => Uuid::new_v4().to_string(),
        });
        statement.stored = Some(format_instant(self.clock.next()));
        if statement.version.is_none() {
            statement.version = Some(self.options.default_version.clone());
        }
        if statement.authority.is_none() {
            statement.authority = self.options.authority.clone();
        }
        statement
    }

    fn effective_limit(&self, requested: Option<usize>) -> usize {
        let limit = match requested {
            Some(0) | None => self.options.page_size,
            Some(limit) => limit,
        };
        limit.min(self.options.max_page_size).max(1)
    }
}
