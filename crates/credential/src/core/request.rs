//! Provisioning request model
//!
//! A request is a JSON object with three required fields (`action`,
//! `token`, `username`), an optional `password`, and whatever free-form
//! attributes the host's statement supplied (`dbname`, `priv`, `iplist`,
//! ...). Required fields always overlay attributes of the same name.

use secrecy::{ExposeSecret, SecretString};
use serde::de::{self, DeserializeOwned, Deserializer, Error as _};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ProvisionError, StatementKind};

/// Free-form attributes carried verbatim into the request body
pub type Attributes = serde_json::Map<String, Value>;

/// Command understood by the provisioning service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Create a database user
    AddUser,
    /// Drop a database user
    VaultDelUser,
}

/// Request body sent to the provisioning service
pub struct ProvisioningRequest {
    pub action: Action,
    pub username: String,
    pub token: SecretString,
    pub password: Option<SecretString>,
    pub attributes: Attributes,
}

impl ProvisioningRequest {
    /// Build an `AddUser` command
    pub fn add_user(
        username: impl Into<String>,
        password: SecretString,
        token: SecretString,
        attributes: Attributes,
    ) -> Self {
        Self {
            action: Action::AddUser,
            username: username.into(),
            token,
            password: Some(password),
            attributes,
        }
    }

    /// Build a `VaultDelUser` command
    ///
    /// A `password` attribute in the revocation statement is passed through
    /// untouched.
    pub fn delete_user(username: impl Into<String>, token: SecretString, attributes: Attributes) -> Self {
        Self {
            action: Action::VaultDelUser,
            username: username.into(),
            token,
            password: None,
            attributes,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Secret values that must never leak into errors or logs
    pub fn secrets(&self) -> Vec<&str> {
        let mut secrets = vec![self.token.expose_secret()];
        if let Some(password) = &self.password {
            secrets.push(password.expose_secret());
        }
        secrets
    }

    fn overlays(&self, key: &str) -> bool {
        match key {
            "action" | "token" | "username" => true,
            "password" => self.password.is_some(),
            _ => false,
        }
    }
}

impl std::fmt::Debug for ProvisioningRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningRequest")
            .field("action", &self.action)
            .field("username", &self.username)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Serialize for ProvisioningRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extras: Vec<(&String, &Value)> = self
            .attributes
            .iter()
            .filter(|(key, _)| !self.overlays(key))
            .collect();
        let len = extras.len() + 3 + usize::from(self.password.is_some());

        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in extras {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("action", &self.action)?;
        map.serialize_entry("token", self.token.expose_secret())?;
        map.serialize_entry("username", &self.username)?;
        if let Some(password) = &self.password {
            map.serialize_entry("password", password.expose_secret())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProvisioningRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut attributes = Attributes::deserialize(deserializer)?;

        let action: Action = take_required(&mut attributes, "action")?;
        let username: String = take_required(&mut attributes, "username")?;
        let token: String = take_required(&mut attributes, "token")?;
        let password = match attributes.remove("password") {
            None | Some(Value::Null) => None,
            Some(value) => Some(String::deserialize(value).map_err(D::Error::custom)?),
        };

        Ok(Self {
            action,
            username,
            token: SecretString::from(token),
            password: password.map(SecretString::from),
            attributes,
        })
    }
}

fn take_required<T, E>(attributes: &mut Attributes, key: &'static str) -> Result<T, E>
where
    T: DeserializeOwned,
    E: de::Error,
{
    let value = attributes.remove(key).ok_or_else(|| E::missing_field(key))?;
    serde_json::from_value(value).map_err(E::custom)
}

/// Pick the only statement out of the host's list.
pub fn single_statement(statements: &[String], kind: StatementKind) -> Result<&str, ProvisionError> {
    match statements {
        [] => Err(ProvisionError::EmptyStatements { kind }),
        [statement] => Ok(statement),
        more => Err(ProvisionError::TooManyStatements {
            kind,
            count: more.len(),
        }),
    }
}

/// Parse a statement as a JSON object; `null` yields no attributes.
///
/// `username` is the subject of the call when it is already known.
pub fn parse_statement(
    statement: &str,
    kind: StatementKind,
    username: Option<&str>,
) -> Result<Attributes, ProvisionError> {
    serde_json::from_str::<Option<Attributes>>(statement)
        .map(Option::unwrap_or_default)
        .map_err(|source| ProvisionError::InvalidStatement {
            operation: kind.operation(),
            username: username.map(str::to_owned),
            kind,
            source,
        })
}
