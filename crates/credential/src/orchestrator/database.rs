use async_trait::async_trait;
use credbridge_client::RequestContext;
use tracing::debug;

use super::{Orchestrator, TYPE_NAME};
use crate::core::ProvisionError;
use crate::traits::{
    Database, DeleteUserRequest, DeleteUserResponse, InitializeRequest, InitializeResponse,
    NewUserRequest, NewUserResponse, UpdateUserRequest, UpdateUserResponse,
};

#[async_trait]
impl Database for Orchestrator {
    async fn initialize(
        &self,
        _ctx: &RequestContext,
        request: InitializeRequest,
    ) -> Result<InitializeResponse, ProvisionError> {
        let config = Orchestrator::initialize(self, &request.config, request.verify_connection)?;
        Ok(InitializeResponse { config })
    }

    async fn new_user(
        &self,
        ctx: &RequestContext,
        request: NewUserRequest,
    ) -> Result<NewUserResponse, ProvisionError> {
        let username = self
            .issue(ctx, &request.statements.commands, &request.password)
            .await?;
        Ok(NewUserResponse { username })
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        request: UpdateUserRequest,
    ) -> Result<UpdateUserResponse, ProvisionError> {
        if let Some(expiration) = &request.expiration {
            debug!(
                username = %request.username,
                new_expiration = %expiration.new_expiration,
                "Expiration change ignored"
            );
        }

        let password = request.password.as_ref().map(|change| &change.new_password);
        self.update(ctx, &request.username, password).await?;
        Ok(UpdateUserResponse {})
    }

    async fn delete_user(
        &self,
        ctx: &RequestContext,
        request: DeleteUserRequest,
    ) -> Result<DeleteUserResponse, ProvisionError> {
        self.revoke(ctx, &request.username, &request.statements.commands)
            .await?;
        Ok(DeleteUserResponse {})
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }
}
