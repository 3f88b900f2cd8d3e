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
pub struct DownloadRequest {
    /// File ID to download
    #[arg(long)]
    pub file_id: Uuid,
}

/// Serve a file's raw `.ssv` container bytes.
///
/// Non-owners get the same response as a missing file, so the endpoint
/// can't be used to enumerate other users' files.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
    Path(file_id): Path<Uuid>,
) -> Result<Response, DownloadError> {
    let record = state.vault().get(&file_id).await?;
    if !principal.can_manage(&record.owner_id) {
        tracing::warn!(
            file = %file_id,
            caller = %principal.id,
            "refused container download by non-owner"
        );
        return Err(DownloadError::NotFound);
    }

    let bytes = state.vault().read_container(&file_id).await?;

    let stem = std::path::Path::new(&record.original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("download");
    let disposition = format!("attachment; filename=\"{}.ssv\"", stem);

    Ok((
        http::StatusCode::OK,
        [
            (
                axum::http::header::CONTENT_TYPE,
                "application/octet-stream",
            ),
            (axum::http::header::CONTENT_DISPOSITION, disposition.as_str()),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("File not found")]
    NotFound,
    #[error("Vault error: {0}")]
    Vault(#[from] VaultStoreError),
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        match self {
            DownloadError::NotFound
            | DownloadError::Vault(VaultStoreError::NotFound(_))
            | DownloadError::Vault(VaultStoreError::Forbidden { .. }) => {
                let msg = serde_json::json!({"msg": "not found"});
                (http::StatusCode::NOT_FOUND, Json(msg)).into_response()
            }
            DownloadError::Vault(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for DownloadRequest {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/files/download/{}", self.file_id))
            .unwrap();
        client.get(full_url)
    }
}
