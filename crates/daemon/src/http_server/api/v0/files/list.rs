use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::database::models::FileRecord;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::RequirePrincipal;
use crate::vault::VaultStoreError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ListRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: String,
    pub mime_hint: String,
    pub size: i64,
    pub container_size: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
}

impl From<FileRecord> for FileMetadata {
    fn from(record: FileRecord) -> Self {
        FileMetadata {
            id: record.id,
            owner_id: record.owner_id,
            filename: record.original_filename,
            mime_hint: record.mime_hint,
            size: record.plain_size,
            container_size: record.container_size,
            upload_date: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub files: Vec<FileMetadata>,
}

/// Metadata only: filename, sizes, timestamps. Never ciphertext or keys.
/// Administrators see every owner's files, everyone else their own.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> Result<impl IntoResponse, ListError> {
    let owner = if principal.is_admin() {
        None
    } else {
        Some(&principal.id)
    };

    let files = state.vault().list(owner).await?;

    Ok((
        http::StatusCode::OK,
        Json(ListResponse {
            files: files.into_iter().map(FileMetadata::from).collect(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("Vault error: {0}")]
    Vault(#[from] VaultStoreError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::Vault(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/files").unwrap();
        client.get(full_url)
    }
}
