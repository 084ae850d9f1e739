use std::time::Instant;

use bytes::Bytes;
use reqwest::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::{ClientConfig, ClientError, RequestContext};

/// Content type of every provisioning request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Returns the default User-Agent string.
///
/// Format: `credbridge/{version}`
pub fn user_agent() -> String {
    format!("credbridge/{}", env!("CARGO_PKG_VERSION"))
}

/// Raw answer from the provisioning service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResponse {
    /// HTTP status code
    pub status: u16,
    /// Unparsed response body
    pub body: Bytes,
}

impl PostResponse {
    /// The provisioning contract only accepts a plain `200 OK`.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// HTTP client for the provisioning service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ProvisioningClient {
    client: ReqwestClient,
    config: ClientConfig,
}

impl ProvisioningClient {
    /// Build a client with a dedicated connection pool.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = ReqwestClient::builder()
            .user_agent(user_agent())
            .timeout(config.timeout)
            .connect_timeout(config.timeout);

        if let Some(keep_alive) = config.keep_alive {
            builder = builder.tcp_keepalive(keep_alive);
        }
        if let Some(idle) = config.idle_conn_timeout {
            builder = builder.pool_idle_timeout(idle);
        }
        if let Some(max_idle) = config.max_idle_conns {
            builder = builder.pool_max_idle_per_host(max_idle);
        }

        let client = builder.build().map_err(ClientError::Build)?;

        tracing::debug!(
            timeout = ?config.timeout,
            keep_alive = ?config.keep_alive,
            idle_conn_timeout = ?config.idle_conn_timeout,
            max_idle_conns = ?config.max_idle_conns,
            "Initialized provisioning HTTP client"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POST `body` to `url` and return the status code and body.
    ///
    /// No retries. Any status code is returned as-is; only network-level
    /// failures, timeouts and cancellation are errors.
    pub async fn post(
        &self,
        ctx: &RequestContext,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<PostResponse, ClientError> {
        let start = Instant::now();

        let exchange = async {
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .await
                .map_err(ClientError::from_send)?;

            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(ClientError::from_body)?;

            Ok::<_, ClientError>(PostResponse { status, body })
        };

        let result = ctx.run(exchange).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) => tracing::debug!(
                status = response.status,
                bytes = response.body.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Provisioning exchange completed"
            ),
            Err(e) => tracing::debug!(
                error = %e,
                elapsed_ms = elapsed.as_millis() as u64,
                "Provisioning exchange failed"
            ),
        }

        result
    }

    /// Serialize `payload` as JSON and POST it.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        url: &str,
        payload: &T,
    ) -> Result<PostResponse, ClientError> {
        let body = serde_json::to_vec(payload)?;
        self.post(ctx, url, JSON_CONTENT_TYPE, body).await
    }
}
