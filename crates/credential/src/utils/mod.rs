//! Utility modules

pub mod redact;
pub mod secret;

pub use redact::{REDACTED, redact};
