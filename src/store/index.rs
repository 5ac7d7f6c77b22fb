//! In-memory statement index shared by the store backends

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use super::{PageRequest, StatementPage, StoreError, StoreResult};
use crate::types::{FilterCriteria, Statement};

/// Threshold for using a parallel scan (statements to examine)
const PARALLEL_SCAN_THRESHOLD: usize = 10_000;

/// Statements in write order plus an id lookup table
#[derive(Debug, Default)]
pub(crate) struct StatementIndex {
    records: Vec<Statement>,
    by_id: HashMap<String, usize>,
    /// Ids of records that exist but failed to decode
    malformed: HashMap<String, String>,
}

impl StatementIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id) || self.malformed.contains_key(id)
    }

    pub(crate) fn get(&self, id: &str) -> StoreResult<Statement> {
        if let Some(&position) = self.by_id.get(id) {
            return Ok(self.records[position].clone());
        }
        if let Some(reason) = self.malformed.get(id) {
            return Err(StoreError::Malformed {
                id: id.to_string(),
                reason: reason.clone(),
            });
        }
        Err(StoreError::NotFound { id: id.to_string() })
    }

    /// Check a batch can be inserted without touching the index
    pub(crate) fn check_insertable(&self, batch: &[Statement]) -> StoreResult<()> {
        let mut incoming = HashSet::with_capacity(batch.len());
        for statement in batch {
            let id = statement
                .key()
                .ok_or_else(|| StoreError::Rejected("statement has no id".to_string()))?;
            if self.contains(id) || !incoming.insert(id) {
                return Err(StoreError::Conflict { id: id.to_string() });
            }
        }
        Ok(())
    }

    /// Append a batch previously accepted by `check_insertable`
    pub(crate) fn insert_checked(&mut self, batch: Vec<Statement>) {
        for statement in batch {
            if let Some(id) = statement.key() {
                self.by_id.insert(id.to_string(), self.records.len());
            }
            self.records.push(statement);
        }
    }

    pub(crate) fn insert(&mut self, batch: Vec<Statement>) -> StoreResult<()> {
        self.check_insertable(&batch)?;
        self.insert_checked(batch);
        Ok(())
    }

    pub(crate) fn mark_malformed(&mut self, id: String, reason: String) {
        self.malformed.insert(id, reason);
    }

    /// Scan for matches starting at `page.start`
    pub(crate) fn find(&self, criteria: &FilterCriteria, page: PageRequest) -> StatementPage {
        let start = usize::try_from(page.start).unwrap_or(usize::MAX).min(self.records.len());
        let candidates = &self.records[start..];

        // Positions (relative to `start`) of up to limit + 1 matches
        let positions: Vec<usize> = if !criteria.is_empty() && candidates.len() > PARALLEL_SCAN_THRESHOLD {
            let mut all: Vec<usize> = candidates
                .par_iter()
                .enumerate()
                .filter(|(_, s)| criteria.matches(s))
                .map(|(i, _)| i)
                .collect();
            all.truncate(page.limit.saturating_add(1));
            all
        } else {
            candidates
                .iter()
                .enumerate()
                .filter(|(_, s)| criteria.matches(s))
                .map(|(i, _)| i)
                .take(page.limit.saturating_add(1))
                .collect()
        };

        let next = positions
            .get(page.limit)
            .map(|&relative| (start + relative) as u64);
        let statements = positions
            .into_iter()
            .take(page.limit)
            .map(|relative| candidates[relative].clone())
            .collect();

        StatementPage { statements, next }
    }
}
