use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::mime_class::MimeClass;

use crate::http_server::auth::RequirePrincipal;
use crate::preview::PreviewError;
use crate::vault::VaultStoreError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRequest {
    pub file_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenResponse {
    pub session_id: Uuid,
    pub file_id: Uuid,
    pub mime_class: MimeClass,
    pub previewable: bool,
    pub expires_in_secs: u64,
}

/// Open a view-only session over a file's decrypted content. The session
/// is the only handle to the plaintext and dies on expiry or close.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
    Json(req): Json<OpenRequest>,
) -> Result<impl IntoResponse, OpenError> {
    let session = state.previews().open(&req.file_id, &principal).await?;

    Ok((
        http::StatusCode::OK,
        Json(OpenResponse {
            session_id: session.id,
            file_id: session.file_id,
            mime_class: session.mime_class,
            previewable: session.previewable,
            expires_in_secs: session.expires_in.as_secs(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),
}

impl IntoResponse for OpenError {
    fn into_response(self) -> Response {
        match self {
            OpenError::Preview(PreviewError::Forbidden { .. })
            | OpenError::Preview(PreviewError::Vault(VaultStoreError::NotFound(_)))
            | OpenError::Preview(PreviewError::Vault(VaultStoreError::Forbidden { .. })) => {
                let msg = serde_json::json!({"msg": "not found"});
                (http::StatusCode::NOT_FOUND, Json(msg)).into_response()
            }
            OpenError::Preview(PreviewError::Vault(VaultStoreError::Integrity(_)))
            | OpenError::Preview(PreviewError::Vault(VaultStoreError::Container(_))) => {
                let msg = serde_json::json!({"msg": "file cannot be opened"});
                (http::StatusCode::UNPROCESSABLE_ENTITY, Json(msg)).into_response()
            }
            OpenError::Preview(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}
