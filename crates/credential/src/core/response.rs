//! Provisioning response model

use serde_json::{Number, Value};
use thiserror::Error;

use super::Attributes;

/// Why a response body could not be interpreted
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("malformed response body: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("response body has no status field")]
    MissingStatus,

    #[error("response status is not numeric: {0}")]
    NonNumericStatus(Value),
}

/// Body returned by the provisioning service
///
/// `status` zero means success. Any other field is kept in `attributes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningResponse {
    pub status: Number,
    pub error: Option<Value>,
    pub attributes: Attributes,
}

impl ProvisioningResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, ResponseError> {
        let value: Value = serde_json::from_slice(body).map_err(ResponseError::Malformed)?;
        let Value::Object(mut attributes) = value else {
            return Err(ResponseError::NotAnObject);
        };

        let status = match attributes.remove("status") {
            Some(Value::Number(status)) => status,
            None | Some(Value::Null) => return Err(ResponseError::MissingStatus),
            Some(other) => return Err(ResponseError::NonNumericStatus(other)),
        };
        let error = attributes.remove("error").filter(|error| !error.is_null());

        Ok(Self {
            status,
            error,
            attributes,
        })
    }

    /// Whether the service reported success
    pub fn is_success(&self) -> bool {
        self.status.as_f64() == Some(0.0)
    }

    /// Failure description for a non-zero status
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            Some(Value::String(_)) | None => {
                format!("remote service returned status {}", self.status)
            }
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_forms() {
        for body in [r#"{"status":0}"#, r#"{"status":0.0}"#, r#"{"status":0,"error":null}"#] {
            let response = ProvisioningResponse::from_slice(body.as_bytes()).unwrap();
            assert!(response.is_success(), "{body}");
        }
    }

    #[test]
    fn test_failure_message() {
        let response =
            ProvisioningResponse::from_slice(br#"{"status":1,"error":"user exists"}"#).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.error_message(), "user exists");

        let response = ProvisioningResponse::from_slice(br#"{"status":3}"#).unwrap();
        assert_eq!(response.error_message(), "remote service returned status 3");

        let response =
            ProvisioningResponse::from_slice(br#"{"status":2,"error":{"code":"E1"}}"#).unwrap();
        assert_eq!(response.error_message(), r#"{"code":"E1"}"#);
    }

    #[test]
    fn test_extra_fields_kept() {
        let response =
            ProvisioningResponse::from_slice(br#"{"status":0,"request_id":"abc"}"#).unwrap();
        assert_eq!(response.attributes.get("request_id"), Some(&Value::from("abc")));
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(
            ProvisioningResponse::from_slice(b"<html>"),
            Err(ResponseError::Malformed(_))
        ));
        assert!(matches!(
            ProvisioningResponse::from_slice(b"[0]"),
            Err(ResponseError::NotAnObject)
        ));
        assert!(matches!(
            ProvisioningResponse::from_slice(br#"{"error":"x"}"#),
            Err(ResponseError::MissingStatus)
        ));
        assert!(matches!(
            ProvisioningResponse::from_slice(br#"{"status":"0"}"#),
            Err(ResponseError::NonNumericStatus(_))
        ));
    }
}
