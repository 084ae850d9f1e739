//! Host-facing database plugin contract
//!
//! A secrets-management host drives dynamic credentials through four calls:
//! `initialize` once with the stored configuration, then `new_user`,
//! `update_user` and `delete_user` as leases are created, renewed and
//! revoked. Request types deserialize straight from the host's JSON.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use credbridge_client::RequestContext;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::core::{Attributes, ProvisionError};

/// Templates supplied by the host for one lifecycle step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statements {
    pub commands: Vec<String>,
}

impl Statements {
    pub fn new(commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeRequest {
    #[serde(default)]
    pub config: Attributes,
    #[serde(default)]
    pub verify_connection: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitializeResponse {
    /// Configuration the host should persist
    pub config: Attributes,
}

/// Display and role names the host offers for username templating
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UsernameMetadata {
    pub display_name: String,
    pub role_name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    #[serde(default)]
    pub username_config: UsernameMetadata,
    #[serde(default)]
    pub statements: Statements,
    #[serde(default)]
    pub rollback_statements: Statements,
    #[serde(deserialize_with = "crate::utils::secret::deserialize")]
    pub password: SecretString,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUserResponse {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePassword {
    #[serde(deserialize_with = "crate::utils::secret::deserialize")]
    pub new_password: SecretString,
    #[serde(default)]
    pub statements: Statements,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeExpiration {
    pub new_expiration: DateTime<Utc>,
    #[serde(default)]
    pub statements: Statements,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub password: Option<ChangePassword>,
    #[serde(default)]
    pub expiration: Option<ChangeExpiration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateUserResponse {}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUserRequest {
    pub username: String,
    #[serde(default)]
    pub statements: Statements,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteUserResponse {}

/// Dynamic database credential backend
///
/// Every call carries a [`RequestContext`]; cancelling it or letting its
/// deadline pass aborts the in-flight exchange.
#[async_trait]
pub trait Database: Send + Sync {
    async fn initialize(
        &self,
        ctx: &RequestContext,
        request: InitializeRequest,
    ) -> Result<InitializeResponse, ProvisionError>;

    async fn new_user(
        &self,
        ctx: &RequestContext,
        request: NewUserRequest,
    ) -> Result<NewUserResponse, ProvisionError>;

    async fn update_user(
        &self,
        ctx: &RequestContext,
        request: UpdateUserRequest,
    ) -> Result<UpdateUserResponse, ProvisionError>;

    async fn delete_user(
        &self,
        ctx: &RequestContext,
        request: DeleteUserRequest,
    ) -> Result<DeleteUserResponse, ProvisionError>;

    /// Static backend identifier
    fn type_name(&self) -> &'static str;

    /// Release held resources
    async fn close(&self) -> Result<(), ProvisionError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use serde_json::json;

    #[test]
    fn test_new_user_request_from_host_json() {
        let request: NewUserRequest = serde_json::from_value(json!({
            "username_config": {"display_name": "token", "role_name": "readonly"},
            "statements": {"commands": [r#"{"dbname":"orders"}"#]},
            "password": "Aa1-generated",
            "expiration": "2026-01-01T00:00:00Z",
        }))
        .unwrap();

        assert_eq!(request.statements.commands.len(), 1);
        assert_eq!(request.password.expose_secret(), "Aa1-generated");
        assert_eq!(request.username_config.role_name, "readonly");
        assert!(request.expiration.is_some());
        assert!(!format!("{request:?}").contains("Aa1-generated"));
    }

    #[test]
    fn test_update_user_request_optional_parts() {
        let request: UpdateUserRequest =
            serde_json::from_value(json!({"username": "V-ABC_r"})).unwrap();
        assert!(request.password.is_none());
        assert!(request.expiration.is_none());

        let request: UpdateUserRequest = serde_json::from_value(json!({
            "username": "V-ABC_r",
            "password": {"new_password": "rotated"},
            "expiration": {"new_expiration": "2026-06-01T12:00:00Z"},
        }))
        .unwrap();
        assert_eq!(
            request.password.unwrap().new_password.expose_secret(),
            "rotated"
        );
    }

    #[test]
    fn test_statements_new() {
        assert_eq!(Statements::new(["a", "b"]).commands, vec!["a", "b"]);
    }
}
