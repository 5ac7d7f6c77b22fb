//! Verb type

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Action linking the actor to the object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verb {
    pub id: String,
    /// Language map, ordered so the canonical form is deterministic
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub display: BTreeMap<String, String>,
}

impl Verb {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: BTreeMap::new(),
        }
    }

    /// Add a display name for a language tag
    pub fn with_display(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.display.insert(language.into(), text.into());
        self
    }
}

#[derive(Deserialize)]
struct VerbObject {
    id: String,
    #[serde(default)]
    display: BTreeMap<String, String>,
}

impl<'de> Deserialize<'de> for Verb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Verb::new(id)),
            value @ Value::Object(_) => {
                let raw: VerbObject = serde_json::from_value(value).map_err(D::Error::custom)?;
                Ok(Verb {
                    id: raw.id,
                    display: raw.display,
                })
            }
            _ => Err(D::Error::custom("verb must be an object or an IRI string")),
        }
    }
}
