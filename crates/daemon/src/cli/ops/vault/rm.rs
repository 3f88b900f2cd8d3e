use clap::Args;
use uuid::Uuid;

use ssv_daemon::http_server::api::client::ApiError;
use ssv_daemon::http_server::api::v0::files::delete::DeleteRequest;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// File ID to delete
    #[arg(long)]
    pub file_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum VaultRmError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = VaultRmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx
            .client
            .call(DeleteRequest {
                file_id: self.file_id,
            })
            .await?;

        Ok(format!("deleted {}", response.id))
    }
}
