//! Username generation and privilege suffixing

use std::fmt;

use chrono::Utc;
use serde_json::Value;

/// Upper bound on the username before the privilege suffix is appended
pub const MAX_USERNAME_LEN: usize = 13;

const RANDOM_LEN: usize = 20;

/// Privilege requested by the `priv` attribute of a creation statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privilege {
    ReadOnly,
    ReadWrite,
}

impl Privilege {
    /// Interpret a `priv` attribute value.
    ///
    /// Absent, `null`, `false`, numeric zero, `"0"` and `""` mean read-only.
    /// Everything else grants read-write.
    pub fn from_value(value: Option<&Value>) -> Self {
        let read_only = match value {
            None | Some(Value::Null) => true,
            Some(Value::Bool(flag)) => !flag,
            Some(Value::Number(number)) => number.as_f64() == Some(0.0),
            Some(Value::String(text)) => text.is_empty() || text == "0",
            Some(Value::Array(_) | Value::Object(_)) => false,
        };
        if read_only { Self::ReadOnly } else { Self::ReadWrite }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::ReadOnly => "_r",
            Self::ReadWrite => "_rw",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Random username source
///
/// Produces `v-<20 random alphanumerics>-<unix seconds>`, truncated to
/// [`MAX_USERNAME_LEN`] characters and upper-cased. Truncation keeps the
/// random part, so two calls in the same second still differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsernameGenerator;

impl UsernameGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a username without the privilege suffix.
    pub fn generate(&self) -> String {
        let random: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(RANDOM_LEN)
            .collect();
        let raw = format!("v-{random}-{}", Utc::now().timestamp());
        truncate(&raw, MAX_USERNAME_LEN).to_uppercase()
    }
}

/// Cut `value` to at most `max_len` characters.
pub fn truncate(value: &str, max_len: usize) -> &str {
    match value.char_indices().nth(max_len) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Append the privilege suffix to a generated username.
pub fn suffixed(username: &str, privilege: Privilege) -> String {
    format!("{username}{}", privilege.suffix())
}
