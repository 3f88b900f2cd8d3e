use clap::Args;
use uuid::Uuid;

use ssv_daemon::http_server::api::client::ApiError;
use ssv_daemon::http_server::api::v0::keys::revoke::RevokeRequest;

#[derive(Args, Debug, Clone)]
pub struct Revoke {
    /// Key ID to revoke
    #[arg(long)]
    pub key_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum KeysRevokeError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Revoke {
    type Error = KeysRevokeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx
            .client
            .call(RevokeRequest {
                key_id: self.key_id,
            })
            .await?;

        Ok(format!("revoked {}", response.id))
    }
}
