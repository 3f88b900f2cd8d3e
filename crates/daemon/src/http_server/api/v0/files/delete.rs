use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::RequirePrincipal;
use crate::vault::VaultStoreError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteRequest {
    /// File ID to delete
    #[arg(long)]
    pub file_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: Uuid,
}

/// Hard-delete a file. Internally the store distinguishes a missing file
/// from a forbidden one; on the wire both produce the same 404 shape so
/// the endpoint can't confirm the existence of other users' files.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, DeleteError> {
    state.vault().delete(&file_id, &principal).await?;

    Ok((http::StatusCode::OK, Json(DeleteResponse { id: file_id })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("Vault error: {0}")]
    Vault(#[from] VaultStoreError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::Vault(VaultStoreError::NotFound(_))
            | DeleteError::Vault(VaultStoreError::Forbidden { .. }) => {
                let msg = serde_json::json!({"msg": "not found"});
                (http::StatusCode::NOT_FOUND, Json(msg)).into_response()
            }
            DeleteError::Vault(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for DeleteRequest {
    type Response = DeleteResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/files/{}", self.file_id))
            .unwrap();
        client.delete(full_url)
    }
}
