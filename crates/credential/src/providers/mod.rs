//! Connection configuration and environment sources

mod config;
mod env;

pub use config::{ConfigError, ConnectionConfig, ProviderConfig};
pub use env::{CONNECTION_URL_VAR, Environment, ProcessEnv, StaticEnv, TOKEN_VAR};
