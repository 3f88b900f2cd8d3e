use std::path::PathBuf;

use clap::Args;

use ssv_daemon::http_server::api::client::ApiError;
use ssv_daemon::http_server::api::v0::files::upload::UploadResponse;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Path of the file to encrypt and store
    #[arg(long)]
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum VaultUploadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("could not read {0}: {1}")]
    Read(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = VaultUploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| VaultUploadError::Read(self.path.clone(), e))?;

        let filename = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();

        let part = reqwest::multipart::Part::bytes(data).file_name(filename.clone());
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = ctx
            .client
            .base_url()
            .join("/api/v0/files/upload")
            .map_err(ApiError::UrlParse)?;
        let response = ctx
            .client
            .http_client()
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::Reqwest)?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(
                response.status(),
                response.text().await.map_err(ApiError::Reqwest)?,
            )
            .into());
        }

        let uploaded: UploadResponse = response.json().await.map_err(ApiError::Reqwest)?;

        Ok(format!(
            "stored {} as {} ({} bytes plaintext, {} bytes sealed)",
            filename, uploaded.id, uploaded.size, uploaded.container_size
        ))
    }
}
