//! Error types for the provisioning lifecycle

use std::fmt;

use credbridge_client::ClientError;
use thiserror::Error;

use super::ResponseError;
use crate::providers::ConfigError;

/// Lifecycle operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CreateUser => "create user",
            Operation::UpdateUser => "update user",
            Operation::DeleteUser => "delete user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which host-supplied statement list is being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Creation,
    Revocation,
}

impl StatementKind {
    /// Lifecycle operation the statement feeds
    pub fn operation(self) -> Operation {
        match self {
            StatementKind::Creation => Operation::CreateUser,
            StatementKind::Revocation => Operation::DeleteUser,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Creation => f.write_str("create_statement"),
            StatementKind::Revocation => f.write_str("revocation_statement"),
        }
    }
}

/// Coarse classification used by hosts to decide how to report a failure
///
/// None of the classes is retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any network I/O
    Validation,
    /// The exchange did not complete, or completed with a non-200 status
    Transport,
    /// The response could not be interpreted
    Decode,
    /// The provisioning service answered with a non-zero status
    Rejected,
    /// The instance is not usable (not initialized, bad config)
    Configuration,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Configuration => "configuration",
        }
    }
}

/// Errors surfaced to the host by lifecycle operations
///
/// Messages name the operation and username but never the bearer token or
/// the password.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// No statement was supplied
    #[error("{kind} is empty")]
    EmptyStatements { kind: StatementKind },

    /// More than one statement was supplied
    #[error("a maximum of one {kind} is supported, got {count}")]
    TooManyStatements { kind: StatementKind, count: usize },

    /// The statement is not a JSON object
    #[error("invoke db {operation}: {} failed: invalid {kind}: {source}", subject(.username))]
    InvalidStatement {
        operation: Operation,
        username: Option<String>,
        kind: StatementKind,
        #[source]
        source: serde_json::Error,
    },

    /// The bearer token is absent from the environment
    #[error("not exist mysql token")]
    MissingToken,

    /// The request body could not be serialized
    #[error("invoke db {operation}: {username} failed: {source}")]
    Encode {
        operation: Operation,
        username: String,
        #[source]
        source: serde_json::Error,
    },

    /// Network failure, timeout or cancellation
    #[error("invoke db {operation}: {username} failed: {source}")]
    Transport {
        operation: Operation,
        username: String,
        #[source]
        source: ClientError,
    },

    /// The caller gave up while another mutation held the gate
    #[error("invoke db {operation}: {} aborted while queued: {source}", subject(.username))]
    Aborted {
        operation: Operation,
        username: Option<String>,
        #[source]
        source: ClientError,
    },

    /// The service answered with something other than `200 OK`
    #[error("invoke db {operation}: {username} failed: http statusCode: {status}")]
    UnexpectedStatus {
        operation: Operation,
        username: String,
        status: u16,
    },

    /// The response body does not follow the `{status, error}` contract
    #[error("invoke db {operation}: {username} failed: {source}")]
    Decode {
        operation: Operation,
        username: String,
        #[source]
        source: ResponseError,
    },

    /// The service reported a non-zero status
    #[error("invoke db {operation}: {username} failed: {message}")]
    Rejected {
        operation: Operation,
        username: String,
        message: String,
    },

    /// A lifecycle call arrived before `initialize`
    #[error("connection is not initialized")]
    NotInitialized,

    /// The supplied connection configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built
    #[error("failed to build provisioning client: {0}")]
    Client(#[source] ClientError),
}

impl ProvisionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyStatements { .. }
            | Self::TooManyStatements { .. }
            | Self::InvalidStatement { .. }
            | Self::MissingToken
            | Self::Encode { .. } => ErrorKind::Validation,
            Self::Transport { .. } | Self::Aborted { .. } | Self::UnexpectedStatus { .. } => {
                ErrorKind::Transport
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::NotInitialized | Self::Config(_) | Self::Client(_) => ErrorKind::Configuration,
        }
    }

    /// Username the failure concerns, when one was known
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Encode { username, .. }
            | Self::Transport { username, .. }
            | Self::UnexpectedStatus { username, .. }
            | Self::Decode { username, .. }
            | Self::Rejected { username, .. } => Some(username),
            Self::InvalidStatement { username, .. } | Self::Aborted { username, .. } => {
                username.as_deref()
            }
            _ => None,
        }
    }

    /// Whether the caller cancelled or its deadline passed
    pub fn is_aborted(&self) -> bool {
        matches!(
            self,
            Self::Aborted { .. }
                | Self::Transport {
                    source: ClientError::Cancelled | ClientError::DeadlineExceeded,
                    ..
                }
        )
    }
}

fn subject(username: &Option<String>) -> &str {
    username.as_deref().unwrap_or("<new user>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statement_messages_match_host_contract() {
        let empty = ProvisionError::EmptyStatements {
            kind: StatementKind::Creation,
        };
        assert_eq!(empty.to_string(), "create_statement is empty");

        let many = ProvisionError::TooManyStatements {
            kind: StatementKind::Creation,
            count: 2,
        };
        assert!(
            many.to_string()
                .starts_with("a maximum of one create_statement is supported")
        );

        let revoke = ProvisionError::EmptyStatements {
            kind: StatementKind::Revocation,
        };
        assert_eq!(revoke.to_string(), "revocation_statement is empty");
    }

    #[test]
    fn test_status_error_names_user_and_code() {
        let err = ProvisionError::UnexpectedStatus {
            operation: Operation::CreateUser,
            username: "V-ABCDEFGHIJK_rw".into(),
            status: 502,
        };
        let message = err.to_string();
        assert!(message.contains("V-ABCDEFGHIJK_rw"));
        assert!(message.contains("502"));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.username(), Some("V-ABCDEFGHIJK_rw"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ProvisionError::MissingToken.kind(), ErrorKind::Validation);
        assert_eq!(ProvisionError::NotInitialized.kind(), ErrorKind::Configuration);
        let rejected = ProvisionError::Rejected {
            operation: Operation::DeleteUser,
            username: "U_r".into(),
            message: "boom".into(),
        };
        assert_eq!(rejected.kind(), ErrorKind::Rejected);
        assert_eq!(rejected.kind().as_str(), "rejected");
    }

    #[test]
    fn test_cancellation_is_aborted() {
        let err = ProvisionError::Transport {
            operation: Operation::CreateUser,
            username: "U_r".into(),
            source: ClientError::Cancelled,
        };
        assert!(err.is_aborted());
        assert!(!ProvisionError::MissingToken.is_aborted());

        let queued = ProvisionError::Aborted {
            operation: Operation::CreateUser,
            username: None,
            source: ClientError::DeadlineExceeded,
        };
        assert!(queued.is_aborted());
        assert_eq!(queued.kind(), ErrorKind::Transport);
        assert_eq!(queued.username(), None);
    }

    #[test]
    fn test_invalid_statement_names_operation_and_user() {
        let source = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err = ProvisionError::InvalidStatement {
            operation: Operation::DeleteUser,
            username: Some("V-ABCDEFGHIJK_r".into()),
            kind: StatementKind::Revocation,
            source,
        };
        let message = err.to_string();
        assert!(
            message.starts_with(
                "invoke db delete user: V-ABCDEFGHIJK_r failed: invalid revocation_statement"
            )
        );
        assert_eq!(err.username(), Some("V-ABCDEFGHIJK_r"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
