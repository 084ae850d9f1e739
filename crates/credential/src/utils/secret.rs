//! Serde helpers for `SecretString` fields

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Deserialize a required secret from a JSON string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

