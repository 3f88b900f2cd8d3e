use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::principal::Role;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::RequirePrincipal;
use crate::keys::KeyRegistryError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct IssueRequest {
    /// Name of the application this key is for
    #[arg(long)]
    pub app_name: String,

    /// Key lifetime in days
    #[arg(long, default_value_t = 30)]
    pub ttl_days: i64,

    /// Issue on behalf of another owner (administrators only)
    #[arg(long)]
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    pub id: Uuid,
    pub app_name: String,
    pub owner_id: Uuid,
    pub role: Role,
    /// The full bearer secret. Returned here exactly once; listings only
    /// ever show a fingerprint.
    pub secret: String,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
    Json(req): Json<IssueRequest>,
) -> Result<impl IntoResponse, IssueError> {
    let issued = state
        .keys()
        .issue(&principal, &req.app_name, req.ttl_days, req.owner_id)
        .await?;

    Ok((
        http::StatusCode::OK,
        Json(IssueResponse {
            id: issued.record.id,
            app_name: issued.record.app_name,
            owner_id: issued.record.owner_id,
            role: issued.record.role,
            secret: issued.secret,
            issued_at: issued.record.issued_at,
            expires_at: issued.record.expires_at,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("Registry error: {0}")]
    Registry(#[from] KeyRegistryError),
}

impl IntoResponse for IssueError {
    fn into_response(self) -> Response {
        match self {
            IssueError::Registry(KeyRegistryError::InvalidTtl(ttl)) => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: ttl must be positive, got {}", ttl),
            )
                .into_response(),
            IssueError::Registry(KeyRegistryError::Forbidden { .. }) => {
                let msg = serde_json::json!({"msg": "forbidden"});
                (http::StatusCode::FORBIDDEN, Json(msg)).into_response()
            }
            IssueError::Registry(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for IssueRequest {
    type Response = IssueResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/keys/issue").unwrap();
        client.post(full_url).json(&self)
    }
}
