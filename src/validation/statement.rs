//! Statement validation rules

use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use crate::types::{Actor, Agent, Group, Identifier, Statement, StatementObject};
use crate::utils::time::parse_instant;

/// Statement versions this LRS accepts (any `1.0.x`)
pub const SUPPORTED_VERSION_PREFIX: &str = "1.0";

/// A request was structurally or semantically invalid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("statement could not be decoded: {reason}")]
    Decode {
        /// Position in a batch, `None` for a single statement
        position: Option<usize>,
        reason: String,
    },

    #[error("no statements submitted")]
    EmptyBatch,

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} '{value}' is not a UUID")]
    InvalidUuid { field: &'static str, value: String },

    #[error("statement id '{id}' appears more than once in the batch")]
    DuplicateId { id: String },

    #[error("timestamp '{value}' is not an ISO 8601 instant")]
    InvalidTimestamp { value: String },

    #[error("unsupported statement version '{version}'")]
    UnsupportedVersion { version: String },

    #[error("invalid {field}: {reason}")]
    InvalidIdentifier { field: &'static str, reason: String },

    #[error("{0}")]
    InvalidContinuation(String),
}

/// Decode a POST body holding one statement or an array of statements
pub fn decode_batch(body: Value) -> Result<Vec<Statement>, ValidationError> {
    match body {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(ValidationError::EmptyBatch);
            }
            items
                .into_iter()
                .enumerate()
                .map(|(position, item)| {
                    serde_json::from_value(item).map_err(|e| ValidationError::Decode {
                        position: Some(position),
                        reason: e.to_string(),
                    })
                })
                .collect()
        }
        single => serde_json::from_value(single)
            .map(|statement| vec![statement])
            .map_err(|e| ValidationError::Decode {
                position: None,
                reason: e.to_string(),
            }),
    }
}

/// Validate a batch, including id uniqueness within it
pub fn validate_batch(statements: &[Statement]) -> Result<(), ValidationError> {
    if statements.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    let mut seen = HashSet::new();
    for statement in statements {
        validate_statement(statement)?;
        if let Some(id) = statement.key() {
            if !seen.insert(normalize_id(id)) {
                return Err(ValidationError::DuplicateId { id: id.to_string() });
            }
        }
    }
    Ok(())
}

/// Lowercase hyphenated form for UUIDs; other strings pass through
pub fn normalize_id(id: &str) -> String {
    Uuid::parse_str(id)
        .map(|uuid| uuid.hyphenated().to_string())
        .unwrap_or_else(|_| id.to_string())
}

/// Validate a single statement
pub fn validate_statement(statement: &Statement) -> Result<(), ValidationError> {
    if let Some(id) = statement.key() {
        check_uuid("id", id)?;
    }

    check_actor("actor", &statement.actor)?;

    if statement.verb.id.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "verb.id" });
    }

    match &statement.object {
        StatementObject::Activity(activity) => {
            if activity.id.trim().is_empty() {
                return Err(ValidationError::EmptyField { field: "object.id" });
            }
        }
        StatementObject::Agent(agent) => check_agent("object", agent)?,
        StatementObject::Group(group) => check_group("object", group)?,
        StatementObject::StatementRef(reference) => check_uuid("object.id", &reference.id)?,
    }

    if let Some(timestamp) = &statement.timestamp {
        if parse_instant(timestamp).is_none() {
            return Err(ValidationError::InvalidTimestamp {
                value: timestamp.clone(),
            });
        }
    }

    if let Some(version) = &statement.version {
        if !version.starts_with(SUPPORTED_VERSION_PREFIX) {
            return Err(ValidationError::UnsupportedVersion {
                version: version.clone(),
            });
        }
    }

    Ok(())
}

/// Warn when a verb id is not an absolute IRI
pub fn verb_warning(verb_id: &str) -> Option<String> {
    match verb_id.split_once(':') {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => None,
        _ => Some(format!(
            "Verb id '{}' is not an absolute IRI. Recommended: http://adlnet.gov/expapi/verbs/{}",
            verb_id, verb_id
        )),
    }
}

fn check_uuid(field: &'static str, value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidUuid {
            field,
            value: value.to_string(),
        })
}

fn check_actor(field: &'static str, actor: &Actor) -> Result<(), ValidationError> {
    match actor {
        Actor::Agent(agent) => check_agent(field, agent),
        Actor::Group(group) => check_group(field, group),
    }
}

fn check_agent(field: &'static str, agent: &Agent) -> Result<(), ValidationError> {
    check_identifier(field, &agent.identifier)
}

fn check_group(field: &'static str, group: &Group) -> Result<(), ValidationError> {
    if group.is_anonymous() {
        if group.member.is_empty() {
            return Err(ValidationError::InvalidIdentifier {
                field,
                reason: "anonymous group must list its members".to_string(),
            });
        }
    } else {
        check_identifier(field, &group.identifier)?;
    }
    group
        .member
        .iter()
        .try_for_each(|member| check_agent(field, member))
}

fn check_identifier(field: &'static str, identifier: &Identifier) -> Result<(), ValidationError> {
    match identifier.count() {
        0 => {
            return Err(ValidationError::InvalidIdentifier {
                field,
                reason: "no mbox, mbox_sha1sum, openid or account".to_string(),
            })
        }
        1 => {}
        n => {
            return Err(ValidationError::InvalidIdentifier {
                field,
                reason: format!("{} identifiers given, expected exactly one", n),
            })
        }
    }

    if let Some(mbox) = &identifier.mbox {
        if !mbox.starts_with("mailto:") || mbox.len() == "mailto:".len() {
            return Err(ValidationError::InvalidIdentifier {
                field,
                reason: format!("mbox '{}' is not a mailto IRI", mbox),
            });
        }
    }
    if let Some(account) = &identifier.account {
        if account.home_page.trim().is_empty() || account.name.trim().is_empty() {
            return Err(ValidationError::InvalidIdentifier {
                field,
                reason: "account needs both homePage and name".to_string(),
            });
        }
    }
    Ok(())
}
