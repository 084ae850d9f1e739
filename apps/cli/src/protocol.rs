//! Line-delimited JSON protocol between the host and the plugin
//!
//! Each request is one line: `{"id": .., "method": .., "params": ..}`.
//! Each reply echoes the `id` and carries either `result` or
//! `error: {kind, message}`. Replies may arrive out of order.

use credbridge_client::RequestContext;
use credbridge_credential::ProvisionError;
use credbridge_credential::traits::Database;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CallError>,
}

impl Response {
    pub fn from_outcome(id: Value, outcome: Result<Value, CallError>) -> Self {
        match outcome {
            Ok(result) => Self {
                id,
                result: Some(result),
                error: None,
            },
            Err(error) => Self {
                id,
                result: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallError {
    pub kind: String,
    pub message: String,
}

impl CallError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: "protocol".into(),
            message: message.into(),
        }
    }
}

impl From<ProvisionError> for CallError {
    fn from(err: ProvisionError) -> Self {
        Self {
            kind: err.kind().as_str().into(),
            message: err.to_string(),
        }
    }
}

/// Run one request against `db`.
pub async fn dispatch(
    db: &dyn Database,
    ctx: &RequestContext,
    method: &str,
    params: Value,
) -> Result<Value, CallError> {
    match method {
        "initialize" => encode(db.initialize(ctx, decode(params)?).await?),
        "new_user" => encode(db.new_user(ctx, decode(params)?).await?),
        "update_user" => encode(db.update_user(ctx, decode(params)?).await?),
        "delete_user" => encode(db.delete_user(ctx, decode(params)?).await?),
        "type" => Ok(Value::from(db.type_name())),
        "close" => {
            db.close().await?;
            Ok(Value::Null)
        }
        other => Err(CallError::protocol(format!("unknown method: {other}"))),
    }
}

fn decode<T: DeserializeOwned>(params: Value) -> Result<T, CallError> {
    serde_json::from_value(params).map_err(|e| CallError::protocol(format!("invalid params: {e}")))
}

fn encode<T: Serialize>(value: T) -> Result<Value, CallError> {
    serde_json::to_value(value).map_err(|e| CallError::protocol(format!("cannot encode result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use credbridge_credential::{Orchestrator, StaticEnv};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn backend() -> Orchestrator {
        Orchestrator::with_environment(Arc::new(StaticEnv::new()))
    }

    #[tokio::test]
    async fn test_type_method() {
        let db = backend();
        let result = dispatch(&db, &RequestContext::new(), "type", Value::Null).await;
        assert_eq!(result, Ok(json!("mgtv_mysql")));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let db = backend();
        let err = dispatch(&db, &RequestContext::new(), "rotate_root", Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.kind, "protocol");
        assert!(err.message.contains("rotate_root"));
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let db = backend();
        let err = dispatch(&db, &RequestContext::new(), "new_user", json!({"statements": 3}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, "protocol");
    }

    #[tokio::test]
    async fn test_initialize_echoes_config() {
        let db = backend();
        let params = json!({"config": {"connection_url": "http://127.0.0.1:9/"}});
        let result = dispatch(&db, &RequestContext::new(), "initialize", params)
            .await
            .unwrap();
        assert_eq!(result, json!({"config": {"connection_url": "http://127.0.0.1:9/"}}));
    }

    #[tokio::test]
    async fn test_provision_error_kind_is_reported() {
        let db = backend();
        let params = json!({"username": "V-ABC_r", "statements": {"commands": []}});
        let err = dispatch(&db, &RequestContext::new(), "delete_user", params)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CallError {
                kind: "validation".into(),
                message: "revocation_statement is empty".into(),
            }
        );
    }

    #[test]
    fn test_response_shape() {
        let ok = Response::from_outcome(json!(1), Ok(json!({"username": "U_r"})));
        assert_eq!(
            serde_json::to_value(ok).unwrap(),
            json!({"id": 1, "result": {"username": "U_r"}})
        );

        let err = Response::from_outcome(json!("a"), Err(CallError::protocol("bad")));
        assert_eq!(
            serde_json::to_value(err).unwrap(),
            json!({"id": "a", "error": {"kind": "protocol", "message": "bad"}})
        );
    }
}
