use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use ssv_daemon::http_server::api::client::ApiError;
use ssv_daemon::http_server::api::v0::files::download::DownloadRequest;

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// File ID to download
    #[arg(long)]
    pub file_id: Uuid,

    /// Output path (defaults to <file_id>.ssv in the working directory)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum VaultDownloadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("could not write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = VaultDownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let bytes = ctx
            .client
            .call_bytes(DownloadRequest {
                file_id: self.file_id,
            })
            .await?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.ssv", self.file_id)));

        tokio::fs::write(&output, &bytes)
            .await
            .map_err(|e| VaultDownloadError::Write(output.clone(), e))?;

        Ok(format!("wrote {} bytes to {}", bytes.len(), output.display()))
    }
}
