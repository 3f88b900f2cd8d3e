use clap::Args;

use ssv_daemon::http_server::api::client::ApiError;
use ssv_daemon::http_server::api::v0::keys::list::{ListKeysRequest, ListKeysResponse};

#[derive(Args, Debug, Clone)]
pub struct Ls;

#[derive(Debug, thiserror::Error)]
pub enum KeysLsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = KeysLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response: ListKeysResponse = ctx.client.call(ListKeysRequest {}).await?;

        if response.keys.is_empty() {
            Ok("No keys found".to_string())
        } else {
            let output = response
                .keys
                .iter()
                .map(|k| {
                    format!(
                        "{}  {}  [{}]  {}  hits: {}  expires: {}",
                        k.id, k.app_name, k.fingerprint, k.status, k.hit_count, k.expires_at
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            Ok(output)
        }
    }
}
