//! Process-local statement store

use async_trait::async_trait;
use parking_lot::RwLock;

use super::index::StatementIndex;
use super::{PageRequest, StatementPage, StatementStore, StoreResult};
use crate::types::{FilterCriteria, Statement};

/// Statements held in memory only; lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    index: RwLock<StatementIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatementStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Statement> {
        self.index.read().get(id)
    }

    async fn find_by_filter(
        &self,
        criteria: &FilterCriteria,
        page: PageRequest,
    ) -> StoreResult<StatementPage> {
        Ok(self.index.read().find(criteria, page))
    }

    async fn save_all(&self, statements: Vec<Statement>) -> StoreResult<()> {
        self.index.write().insert(statements)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.index.read().len())
    }
}
