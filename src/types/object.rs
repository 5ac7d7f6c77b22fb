//! Statement object types
//!
//! The object of a statement is polymorphic: an activity, an agent or group,
//! or a reference to another statement. Sub-statements are not supported.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::actor::{actor_from_value, Actor, Agent, Group};

/// Something an actor interacted with, identified by an IRI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    /// Activity definition, stored verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Value>,
}

impl Activity {
    /// Registry discriminator for activity records
    pub const OBJECT_KEY: &'static str = "ACTIVITY";

    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            definition: None,
        }
    }
}

/// Pointer to another stored statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRef {
    pub id: String,
}

/// The "this" in "I did this"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "objectType")]
pub enum StatementObject {
    Activity(Activity),
    Agent(Agent),
    Group(Group),
    StatementRef(StatementRef),
}

impl StatementObject {
    pub fn activity(id: impl Into<String>) -> Self {
        StatementObject::Activity(Activity::new(id))
    }

    /// Activity IRI, when the object is an activity
    pub fn activity_id(&self) -> Option<&str> {
        match self {
            StatementObject::Activity(activity) => Some(&activity.id),
            _ => None,
        }
    }

    /// Name of the variant as it appears in `objectType`
    pub fn object_type(&self) -> &'static str {
        match self {
            StatementObject::Activity(_) => "Activity",
            StatementObject::Agent(_) => "Agent",
            StatementObject::Group(_) => "Group",
            StatementObject::StatementRef(_) => "StatementRef",
        }
    }
}

impl From<Activity> for StatementObject {
    fn from(activity: Activity) -> Self {
        StatementObject::Activity(activity)
    }
}

impl<'de> Deserialize<'de> for StatementObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = match Value::deserialize(deserializer)? {
            Value::String(id) => return Ok(StatementObject::activity(id)),
            Value::Object(map) => map,
            _ => return Err(D::Error::custom("object must be an object or an IRI string")),
        };

        let object_type = map
            .get("objectType")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let value = Value::Object(map);

        match object_type.as_deref() {
            None | Some("Activity") => serde_json::from_value(value)
                .map(StatementObject::Activity)
                .map_err(D::Error::custom),
            Some("Agent") | Some("Group") => {
                actor_from_value(value)
                    .map(|actor| match actor {
                        Actor::Agent(agent) => StatementObject::Agent(agent),
                        Actor::Group(group) => StatementObject::Group(group),
                    })
                    .map_err(D::Error::custom)
            }
            Some("StatementRef") => serde_json::from_value(value)
                .map(StatementObject::StatementRef)
                .map_err(D::Error::custom),
            Some("SubStatement") => Err(D::Error::custom("sub-statements are not supported")),
            Some(other) => Err(D::Error::custom(format!(
                "unsupported object objectType '{}'",
                other
            ))),
        }
    }
}
