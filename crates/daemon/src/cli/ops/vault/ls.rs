use clap::Args;

use ssv_daemon::http_server::api::client::ApiError;
use ssv_daemon::http_server::api::v0::files::list::{ListRequest, ListResponse};

#[derive(Args, Debug, Clone)]
pub struct Ls;

#[derive(Debug, thiserror::Error)]
pub enum VaultLsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = VaultLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response: ListResponse = ctx.client.call(ListRequest {}).await?;

        if response.files.is_empty() {
            Ok("No files found".to_string())
        } else {
            let output = response
                .files
                .iter()
                .map(|f| {
                    format!(
                        "{}  {}  {} bytes  {}",
                        f.id, f.filename, f.size, f.upload_date
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            Ok(output)
        }
    }
}
