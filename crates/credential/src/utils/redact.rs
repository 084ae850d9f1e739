//! Scrubbing secrets out of text that leaves the crate

/// Placeholder written in place of a secret
pub const REDACTED: &str = "[REDACTED]";

/// Replace every occurrence of each non-empty secret in `message`.
///
/// Longer secrets are replaced first so a secret that contains another one
/// is scrubbed whole.
pub fn redact(message: &str, secrets: &[&str]) -> String {
    let mut secrets: Vec<&str> = secrets.iter().copied().filter(|s| !s.is_empty()).collect();
    secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));

    secrets
        .into_iter()
        .fold(message.to_owned(), |message, secret| message.replace(secret, REDACTED))
}
