//! Credbridge Credential - dynamic database users through a provisioning service
//!
//! Implements the create / update / revoke lifecycle a secrets-management
//! host drives for dynamic database credentials. The database itself is
//! never touched: every mutation is a JSON command POSTed to a remote
//! user-provisioning service, which is the source of truth.
//!
//! # Features
//!
//! - **Typed wire model** - required fields plus an explicit attribute bag
//! - **Username policy** - random, at most 13 characters, `_r` / `_rw` suffix
//! - **Serialized mutations** - one provisioning call in flight per instance
//! - **Secret hygiene** - token and password never appear in errors or logs
//!
//! # Example
//!
//! ```rust,no_run
//! use credbridge_credential::prelude::*;
//! use secrecy::SecretString;
//!
//! # async fn example() -> Result<(), ProvisionError> {
//! let orchestrator = Orchestrator::new();
//! let mut config = serde_json::Map::new();
//! config.insert("connection_url".into(), "https://provisioner.internal/api".into());
//! config.insert("timeout".into(), 20.into());
//! orchestrator.initialize(&config, false)?;
//!
//! let ctx = RequestContext::new();
//! let username = orchestrator
//!     .issue(&ctx, &[r#"{"dbname":"orders","priv":1}"#.to_string()], &SecretString::from("pw".to_string()))
//!     .await?;
//! orchestrator.revoke(&ctx, &username, &[r#"{"dbname":"orders"}"#.to_string()]).await?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

/// Wire model, username policy and errors
pub mod core;
/// Credential orchestrator - the lifecycle operations
pub mod orchestrator;
/// Connection configuration and environment sources
pub mod providers;
/// Host-facing database plugin contract
pub mod traits;
/// Redaction and serde helpers
pub mod utils;

// ── Root re-exports ─────────────────────────────────────────────────────────

pub use crate::core::{
    Action, Attributes, ErrorKind, Operation, Privilege, ProvisionError, ProvisioningRequest,
    ProvisioningResponse, ResponseError, StatementKind, UsernameGenerator,
};
pub use crate::orchestrator::{MutationGate, Orchestrator, TYPE_NAME};
pub use crate::providers::{ConfigError, ConnectionConfig, Environment, ProcessEnv, StaticEnv};
pub use crate::traits::Database;
pub use credbridge_client::{ClientError, RequestContext};

/// Commonly used types and traits
pub mod prelude {
    pub use crate::core::{Operation, Privilege, ProvisionError};
    pub use crate::orchestrator::Orchestrator;
    pub use crate::providers::{ConnectionConfig, Environment, ProcessEnv, StaticEnv};
    pub use crate::traits::{
        ChangeExpiration, ChangePassword, Database, DeleteUserRequest, DeleteUserResponse,
        InitializeRequest, InitializeResponse, NewUserRequest, NewUserResponse, Statements,
        UpdateUserRequest, UpdateUserResponse,
    };
    pub use credbridge_client::RequestContext;
}
