use thiserror::Error;

/// Errors that can occur during an exchange with the provisioning service
///
/// Every variant is a transport-level failure: the server's answer, if any,
/// never reached the caller. A non-200 status is not an error here.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying HTTP client could not be constructed
    #[error("Build error: {0}")]
    Build(#[source] reqwest::Error),

    /// DNS resolution or TCP/TLS connect failed
    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// The configured request timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// Sending the request failed after connecting
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response body could not be read
    #[error("Response body error: {0}")]
    Body(#[source] reqwest::Error),

    /// The payload could not be serialized
    #[error("Serialization error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The caller cancelled the exchange
    #[error("Request cancelled")]
    Cancelled,

    /// The caller's deadline passed before the exchange finished
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl ClientError {
    /// Classify a send failure. The URL is stripped so that credentials
    /// embedded in the endpoint never reach logs or host-visible errors.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err)
        } else {
            Self::Request(err)
        }
    }

    pub(crate) fn from_body(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Body(err)
        }
    }

    /// Whether the failure was a time bound (client timeout or caller deadline)
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout | Self::DeadlineExceeded)
    }
}
