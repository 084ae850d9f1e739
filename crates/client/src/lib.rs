//! Credbridge Client - HTTP exchange with the remote provisioning service
//!
//! A thin, stateless request/response primitive: POST a JSON payload to the
//! provisioning endpoint and hand back the status code and raw body. The
//! client is configured once and its connection pool is reused for every
//! call for the lifetime of the process.
//!
//! Status-code policy and body interpretation belong to the caller; the
//! client only reports what the server said, or why it could not say it.
//!
//! # Example
//!
//! ```rust,no_run
//! use credbridge_client::{ClientConfig, ProvisioningClient, RequestContext};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), credbridge_client::ClientError> {
//! let client = ProvisioningClient::new(ClientConfig {
//!     timeout: Duration::from_secs(10),
//!     ..Default::default()
//! })?;
//!
//! let ctx = RequestContext::new().with_timeout(Duration::from_secs(5));
//! let response = client
//!     .post_json(&ctx, "https://provisioner.internal/api", &serde_json::json!({"action": "AddUser"}))
//!     .await?;
//! assert!(response.is_ok());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod client;
mod config;
mod context;
mod error;

pub use client::{JSON_CONTENT_TYPE, PostResponse, ProvisioningClient, user_agent};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use context::RequestContext;
pub use error::ClientError;
