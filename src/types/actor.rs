//! Actor types: agents and groups

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Account on an external system, e.g. an LMS login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "homePage")]
    pub home_page: String,
    pub name: String,
}

/// Inverse functional identifier of an agent or group.
///
/// A well-formed identified actor carries exactly one of these fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbox: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbox_sha1sum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
}

impl Identifier {
    /// Identifier from a `mailto:` IRI
    pub fn mbox(mbox: impl Into<String>) -> Self {
        Self {
            mbox: Some(mbox.into()),
            ..Default::default()
        }
    }

    /// Identifier from an OpenID IRI
    pub fn openid(openid: impl Into<String>) -> Self {
        Self {
            openid: Some(openid.into()),
            ..Default::default()
        }
    }

    /// Identifier from an account
    pub fn account(home_page: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            account: Some(Account {
                home_page: home_page.into(),
                name: name.into(),
            }),
            ..Default::default()
        }
    }

    /// Number of identifier fields that are set
    pub fn count(&self) -> usize {
        [
            self.mbox.is_some(),
            self.mbox_sha1sum.is_some(),
            self.openid.is_some(),
            self.account.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Canonical string form used for exact-match filtering.
    ///
    /// Precedence: `mbox`, `mbox_sha1sum`, `openid`, then `account`
    /// rendered as `homePage|name`.
    pub fn canonical(&self) -> Option<String> {
        if let Some(mbox) = &self.mbox {
            return Some(mbox.clone());
        }
        if let Some(sha) = &self.mbox_sha1sum {
            return Some(sha.clone());
        }
        if let Some(openid) = &self.openid {
            return Some(openid.clone());
        }
        self.account
            .as_ref()
            .map(|a| format!("{}|{}", a.home_page, a.name))
    }
}

/// An individual person or system
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub identifier: Identifier,
}

impl Agent {
    /// Registry discriminator for agent records
    pub const OBJECT_KEY: &'static str = "AGENT";

    pub fn new(identifier: Identifier) -> Self {
        Self {
            name: None,
            identifier,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A collection of agents, either identified or anonymous
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub identifier: Identifier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member: Vec<Agent>,
}

impl Group {
    /// A group without any identifier, defined only by its members
    pub fn is_anonymous(&self) -> bool {
        self.identifier.count() == 0
    }
}

/// Who performed the action of a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "objectType")]
pub enum Actor {
    Agent(Agent),
    Group(Group),
}

impl Actor {
    /// Agent actor identified by a `mailto:` IRI
    pub fn mbox(mbox: impl Into<String>) -> Self {
        Actor::Agent(Agent::new(Identifier::mbox(mbox)))
    }

    pub fn identifier(&self) -> &Identifier {
        match self {
            Actor::Agent(agent) => &agent.identifier,
            Actor::Group(group) => &group.identifier,
        }
    }

    /// Canonical identifier, `None` for anonymous groups
    pub fn canonical_id(&self) -> Option<String> {
        self.identifier().canonical()
    }
}

impl From<Agent> for Actor {
    fn from(agent: Agent) -> Self {
        Actor::Agent(agent)
    }
}

impl From<Group> for Actor {
    fn from(group: Group) -> Self {
        Actor::Group(group)
    }
}

/// Shorthand string form: `mailto:` IRIs become `mbox`, anything else `openid`
fn identifier_from_shorthand(value: String) -> Identifier {
    if value.starts_with("mailto:") {
        Identifier::mbox(value)
    } else {
        Identifier::openid(value)
    }
}

/// Decode an agent-or-group JSON value; `objectType` defaults to `Agent`
pub(crate) fn actor_from_value(value: Value) -> Result<Actor, String> {
    match value {
        Value::String(s) => Ok(Actor::Agent(Agent::new(identifier_from_shorthand(s)))),
        Value::Object(map) => {
            let object_type = map
                .get("objectType")
                .and_then(Value::as_str)
                .map(str::to_owned);
            match object_type.as_deref() {
                None | Some("Agent") => serde_json::from_value(Value::Object(map))
                    .map(Actor::Agent)
                    .map_err(|e| e.to_string()),
                Some("Group") => serde_json::from_value(Value::Object(map))
                    .map(Actor::Group)
                    .map_err(|e| e.to_string()),
                Some(other) => Err(format!("unsupported actor objectType '{}'", other)),
            }
        }
        _ => Err("actor must be an object or an identifier string".to_string()),
    }
}

impl<'de> Deserialize<'de> for Actor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        actor_from_value(value).map_err(D::Error::custom)
    }
}
