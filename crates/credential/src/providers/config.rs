//! Connection configuration and its error types

use std::time::Duration;

use credbridge_client::{ClientConfig, DEFAULT_TIMEOUT};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use super::env::{CONNECTION_URL_VAR, Environment};
use crate::core::Attributes;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    #[error("Missing required configuration: {field}")]
    MissingRequired { field: String },

    /// Configuration validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Validation contract for provider configurations
///
/// `validate()` must reject every value the provider cannot work with and
/// say which field is wrong. `provider_name()` identifies the provider in
/// logs.
pub trait ProviderConfig: Send + Sync + Clone {
    fn validate(&self) -> Result<(), ConfigError>;

    fn provider_name(&self) -> &'static str;
}

/// Settings the host passes to `initialize`
///
/// Durations are whole seconds. Every numeric field accepts a JSON number
/// or a numeric string, and `0` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Provisioning endpoint; `vault_mysql_db` overrides it when set
    pub connection_url: Option<String>,

    #[serde(deserialize_with = "weak_u64")]
    pub timeout: Option<u64>,

    #[serde(deserialize_with = "weak_u64")]
    pub keep_alive: Option<u64>,

    #[serde(deserialize_with = "weak_u64")]
    pub idle_conn_timeout: Option<u64>,

    #[serde(deserialize_with = "weak_u64")]
    pub max_idle_conns: Option<u64>,
}

impl ConnectionConfig {
    /// Decode the host's raw configuration map. Unknown keys are ignored.
    pub fn from_map(config: &Attributes) -> Result<Self, ConfigError> {
        serde_json::from_value(Value::Object(config.clone()))
            .map_err(|e| ConfigError::ValidationFailed(format!("cannot decode connection config: {e}")))
    }

    /// Endpoint to POST to.
    ///
    /// A non-empty `vault_mysql_db` environment variable overrides the
    /// configured `connection_url`, which is used only when the variable is
    /// unset or empty.
    pub fn resolve_url(&self, env: &dyn Environment) -> Result<Url, ConfigError> {
        if let Some(url) = env.var(CONNECTION_URL_VAR).filter(|url| !url.trim().is_empty()) {
            return parse_url(CONNECTION_URL_VAR, &url);
        }

        match self.connection_url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => parse_url("connection_url", url),
            None => Err(ConfigError::MissingRequired {
                field: "connection_url".into(),
            }),
        }
    }

    /// Transport settings for the provisioning client
    pub fn client_config(&self) -> ClientConfig {
        let seconds = |value: Option<u64>| value.filter(|secs| *secs > 0).map(Duration::from_secs);

        ClientConfig {
            timeout: seconds(self.timeout).unwrap_or(DEFAULT_TIMEOUT),
            keep_alive: seconds(self.keep_alive),
            idle_conn_timeout: seconds(self.idle_conn_timeout),
            max_idle_conns: self
                .max_idle_conns
                .filter(|count| *count > 0)
                .map(|count| usize::try_from(count).unwrap_or(usize::MAX)),
        }
    }
}

impl ProviderConfig for ConnectionConfig {
    fn provider_name(&self) -> &'static str {
        "ProvisioningService"
    }

    /// Bounds-check the transport settings.
    ///
    /// `connection_url` is checked by [`ConnectionConfig::resolve_url`], and
    /// only when it is the endpoint in effect.
    fn validate(&self) -> Result<(), ConfigError> {
        let day = 24 * 60 * 60;
        for (field, value) in [
            ("timeout", self.timeout),
            ("keep_alive", self.keep_alive),
            ("idle_conn_timeout", self.idle_conn_timeout),
        ] {
            if let Some(secs) = value.filter(|secs| *secs > day) {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    reason: format!("must be at most {day} seconds, got {secs}"),
                });
            }
        }

        Ok(())
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        field: field.into(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: field.into(),
            reason: format!("must use http:// or https://, got {}://", url.scheme()),
        });
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            field: field.into(),
            reason: "must name a host".into(),
        });
    }

    Ok(url)
}

/// Accept `12`, `12.0`, `"12"`, `""` or `null`; reject negatives.
fn weak_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number_to_u64(&number.to_string()).map_err(D::Error::custom),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => number_to_u64(text.trim()).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn number_to_u64(text: &str) -> Result<Option<u64>, String> {
    if let Ok(value) = text.parse::<u64>() {
        return Ok(Some(value));
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value.trunc() as u64)),
        Ok(value) if value < 0.0 => Err(format!("must not be negative, got {text}")),
        _ => Err(format!("expected a number, got {text:?}")),
    }
}
