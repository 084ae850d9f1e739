//! Credential Orchestrator - the create / update / revoke lifecycle
//!
//! Owns the connection (endpoint plus pooled HTTP client), generates
//! usernames, builds provisioning requests and interprets the service's
//! answers. Every mutation holds a single [`MutationGate`] from start to
//! finish.

mod database;
mod gate;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use credbridge_client::{JSON_CONTENT_TYPE, ProvisioningClient, RequestContext};
use secrecy::SecretString;
use tracing::{Span, debug, info, warn};
use url::Url;

use crate::core::{
    Attributes, Operation, Privilege, ProvisionError, ProvisioningRequest, ProvisioningResponse,
    StatementKind, UsernameGenerator, parse_statement, single_statement, suffixed,
};
use crate::providers::{ConnectionConfig, Environment, ProcessEnv, ProviderConfig, TOKEN_VAR};
use crate::utils::redact;

pub use gate::{GatePermit, MutationGate};

/// Backend identifier reported to the host
pub const TYPE_NAME: &str = "mgtv_mysql";

/// Endpoint and client fixed at initialization
#[derive(Debug)]
pub struct Connection {
    url: Url,
    client: ProvisioningClient,
    config: ConnectionConfig,
}

impl Connection {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn client(&self) -> &ProvisioningClient {
        &self.client
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

/// Lifecycle driver for dynamic database users
#[derive(Debug)]
pub struct Orchestrator {
    env: Arc<dyn Environment>,
    connection: ArcSwapOption<Connection>,
    gate: MutationGate,
    usernames: UsernameGenerator,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Orchestrator reading the process environment
    pub fn new() -> Self {
        Self::with_environment(Arc::new(ProcessEnv))
    }

    pub fn with_environment(env: Arc<dyn Environment>) -> Self {
        Self {
            env,
            connection: ArcSwapOption::empty(),
            gate: MutationGate::new(),
            usernames: UsernameGenerator::new(),
        }
    }

    /// Decode `config`, resolve the endpoint and build the client.
    ///
    /// Returns the configuration unchanged for the host to persist. On error
    /// the previous connection, if any, stays in place.
    pub fn initialize(
        &self,
        config: &Attributes,
        verify_connection: bool,
    ) -> Result<Attributes, ProvisionError> {
        let decoded = ConnectionConfig::from_map(config)?;
        decoded.validate()?;
        let url = decoded.resolve_url(self.env.as_ref())?;
        let client =
            ProvisioningClient::new(decoded.client_config()).map_err(ProvisionError::Client)?;

        if verify_connection {
            debug!("Connection verification requested; the endpoint is not probed");
        }

        info!(
            provider = decoded.provider_name(),
            host = url.host_str().unwrap_or_default(),
            timeout_secs = client.config().timeout.as_secs(),
            "Provisioning connection initialized"
        );

        self.connection.store(Some(Arc::new(Connection {
            url,
            client,
            config: decoded,
        })));

        Ok(config.clone())
    }

    /// Current connection, if initialized
    pub fn connection(&self) -> Result<Arc<Connection>, ProvisionError> {
        self.connection.load_full().ok_or(ProvisionError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.connection.load().is_some()
    }

    pub fn gate(&self) -> &MutationGate {
        &self.gate
    }

    /// Bearer token for the provisioning service, read on every call
    pub fn bearer_token(&self) -> Result<SecretString, ProvisionError> {
        self.env
            .var(TOKEN_VAR)
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
            .ok_or(ProvisionError::MissingToken)
    }

    /// Create a user and return its suffixed name.
    ///
    /// Holds the mutation gate for the whole call. Validation failures never
    /// reach the network.
    #[tracing::instrument(
        skip_all,
        fields(operation = %Operation::CreateUser, username = tracing::field::Empty)
    )]
    pub async fn issue(
        &self,
        ctx: &RequestContext,
        statements: &[String],
        password: &SecretString,
    ) -> Result<String, ProvisionError> {
        let _permit = self.enter(ctx, Operation::CreateUser, None).await?;

        let statement = single_statement(statements, StatementKind::Creation)?;
        let token = self.bearer_token()?;
        let attributes = parse_statement(statement, StatementKind::Creation, None)?;

        let privilege = Privilege::from_value(attributes.get("priv"));
        let username = suffixed(&self.usernames.generate(), privilege);
        Span::current().record("username", username.as_str());

        let request = ProvisioningRequest::add_user(
            username.clone(),
            clone_secret(password),
            token,
            attributes,
        );
        self.dispatch(ctx, Operation::CreateUser, &request).await?;

        info!(username = %username, privilege = %privilege, "User provisioned");
        Ok(username)
    }

    /// Apply a password or expiration change.
    ///
    /// The provisioning service owns passwords and lease lifetimes, so both
    /// are accepted without a remote call.
    #[tracing::instrument(
        skip_all,
        fields(operation = %Operation::UpdateUser, username = %username)
    )]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        username: &str,
        new_password: Option<&SecretString>,
    ) -> Result<(), ProvisionError> {
        let _permit = self.enter(ctx, Operation::UpdateUser, Some(username)).await?;

        match new_password {
            Some(password) => self.change_password(username, password),
            None => {
                debug!("No password change requested");
                Ok(())
            }
        }
    }

    /// Password change hook; accepted without contacting the service.
    pub fn change_password(
        &self,
        username: &str,
        _password: &SecretString,
    ) -> Result<(), ProvisionError> {
        debug!(username = %username, "Password change accepted without remote call");
        Ok(())
    }

    /// Drop a user, holding the mutation gate for the whole call.
    #[tracing::instrument(
        skip_all,
        fields(operation = %Operation::DeleteUser, username = %username)
    )]
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        username: &str,
        statements: &[String],
    ) -> Result<(), ProvisionError> {
        let _permit = self.enter(ctx, Operation::DeleteUser, Some(username)).await?;

        let statement = single_statement(statements, StatementKind::Revocation)?;
        let token = self.bearer_token()?;
        let attributes = parse_statement(statement, StatementKind::Revocation, Some(username))?;

        let request = ProvisioningRequest::delete_user(username, token, attributes);
        self.dispatch(ctx, Operation::DeleteUser, &request).await?;

        info!(username = %username, "User revoked");
        Ok(())
    }

    /// Wait for the mutation gate, giving up when `ctx` is cancelled.
    async fn enter(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        username: Option<&str>,
    ) -> Result<GatePermit<'_>, ProvisionError> {
        self.gate.acquire(ctx).await.map_err(|source| {
            debug!(error = %source, "Gave up waiting for the mutation gate");
            ProvisionError::Aborted {
                operation,
                username: username.map(str::to_owned),
                source,
            }
        })
    }

    /// Encode, POST, then check status and body. The caller holds the gate.
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        request: &ProvisioningRequest,
    ) -> Result<(), ProvisionError> {
        let connection = self.connection()?;
        let username = request.username.as_str();

        let body = request.to_json().map_err(|source| ProvisionError::Encode {
            operation,
            username: username.to_owned(),
            source,
        })?;

        let response = connection
            .client
            .post(ctx, connection.url.as_str(), JSON_CONTENT_TYPE, body)
            .await
            .map_err(|source| ProvisionError::Transport {
                operation,
                username: username.to_owned(),
                source,
            })?;

        if !response.is_ok() {
            warn!(status = response.status, "Provisioning service answered with non-200 status");
            return Err(ProvisionError::UnexpectedStatus {
                operation,
                username: username.to_owned(),
                status: response.status,
            });
        }

        let reply = ProvisioningResponse::from_slice(&response.body).map_err(|source| {
            ProvisionError::Decode {
                operation,
                username: username.to_owned(),
                source,
            }
        })?;

        if !reply.is_success() {
            let message = redact(&reply.error_message(), &request.secrets());
            warn!(status = %reply.status, error = %message, "Provisioning service rejected request");
            return Err(ProvisionError::Rejected {
                operation,
                username: username.to_owned(),
                message,
            });
        }

        Ok(())
    }
}

fn clone_secret(secret: &SecretString) -> SecretString {
    use secrecy::ExposeSecret;

    SecretString::from(secret.expose_secret().to_owned())
}
