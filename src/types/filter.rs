//! Filter criteria for statement queries

use std::collections::BTreeMap;
use std::fmt;

use super::Statement;

/// Dimension a query can be constrained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    /// Reserved: exact statement id
    StatementId,
    /// Canonical identifier of the actor
    Actor,
    /// IRI of the object activity
    Activity,
}

impl FilterKey {
    /// Query parameter name
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::StatementId => "statementId",
            FilterKey::Actor => "actor",
            FilterKey::Activity => "activity",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality constraints; an absent key places no constraint on that dimension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    values: BTreeMap<FilterKey, String>,
}

impl FilterCriteria {
    /// Unconstrained criteria
    pub fn new() -> Self {
        Self::default()
    }

    /// Build criteria from optional request parameters, dropping blank values
    pub fn from_params(
        statement_id: Option<String>,
        actor: Option<String>,
        activity: Option<String>,
    ) -> Self {
        [
            (FilterKey::StatementId, statement_id),
            (FilterKey::Actor, actor),
            (FilterKey::Activity, activity),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .fold(Self::new(), |criteria, (key, value)| criteria.with(key, value))
    }

    /// Add a constraint; blank values are ignored
    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.values.insert(key, value);
        }
        self
    }

    pub fn actor(self, actor: impl Into<String>) -> Self {
        self.with(FilterKey::Actor, actor)
    }

    pub fn activity(self, activity: impl Into<String>) -> Self {
        self.with(FilterKey::Activity, activity)
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Constraints in key order
    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Logical AND of exact matches across every set dimension
    pub fn matches(&self, statement: &Statement) -> bool {
        self.iter().all(|(key, expected)| match key {
            FilterKey::StatementId => statement.key() == Some(expected),
            FilterKey::Actor => statement.actor.canonical_id().as_deref() == Some(expected),
            FilterKey::Activity => statement.object.activity_id() == Some(expected),
        })
    }
}
