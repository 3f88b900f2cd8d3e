use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::RequirePrincipal;
use crate::keys::KeyRegistryError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct RevokeRequest {
    /// Key ID to revoke
    #[arg(long)]
    pub key_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeResponse {
    pub id: Uuid,
}

/// Revocation is immediate and irreversible. Missing and forbidden keys
/// share one response shape, same as file deletion.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
    Json(req): Json<RevokeRequest>,
) -> Result<impl IntoResponse, RevokeError> {
    state.keys().revoke(&principal, &req.key_id).await?;

    Ok((http::StatusCode::OK, Json(RevokeResponse { id: req.key_id })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum RevokeError {
    #[error("Registry error: {0}")]
    Registry(#[from] KeyRegistryError),
}

impl IntoResponse for RevokeError {
    fn into_response(self) -> Response {
        match self {
            RevokeError::Registry(KeyRegistryError::NotFound(_))
            | RevokeError::Registry(KeyRegistryError::Forbidden { .. }) => {
                let msg = serde_json::json!({"msg": "not found"});
                (http::StatusCode::NOT_FOUND, Json(msg)).into_response()
            }
            RevokeError::Registry(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for RevokeRequest {
    type Response = RevokeResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/keys/revoke").unwrap();
        client.post(full_url).json(&self)
    }
}
