use clap::Args;
use uuid::Uuid;

use ssv_daemon::http_server::api::client::ApiError;
use ssv_daemon::http_server::api::v0::keys::issue::IssueRequest;

#[derive(Args, Debug, Clone)]
pub struct Issue {
    /// Name of the application this key is for
    #[arg(long)]
    pub app_name: String,

    /// Key lifetime in days
    #[arg(long, default_value_t = 30)]
    pub ttl_days: i64,

    /// Issue on behalf of another owner (administrators only)
    #[arg(long)]
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum KeysIssueError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Issue {
    type Error = KeysIssueError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx
            .client
            .call(IssueRequest {
                app_name: self.app_name.clone(),
                ttl_days: self.ttl_days,
                owner_id: self.owner_id,
            })
            .await?;

        let lines = vec![
            format!("issued key {} for {}", response.id, response.app_name),
            format!("  expires: {}", response.expires_at),
            String::new(),
            format!("  {}", response.secret),
            String::new(),
            "This secret is shown once and cannot be recovered.".to_string(),
        ];

        Ok(lines.join("\n"))
    }
}
