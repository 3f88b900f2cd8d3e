use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::auth::RequirePrincipal;
use crate::vault::VaultStoreError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeRequest {
    pub file_id: Uuid,
}

/// The explicit, audited plaintext path: decode and decrypt a stored file
/// and hand the original bytes back for immediate in-browser rendering.
///
/// Integrity and format failures are collapsed into one generic "cannot
/// open" response so the endpoint can't be probed as an oracle; the
/// distinguishable cause lands in the audit log only.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
    Query(req): Query<DecodeRequest>,
) -> Result<Response, DecodeError> {
    let record = state.vault().get(&req.file_id).await?;
    if !principal.can_manage(&record.owner_id) {
        tracing::warn!(
            file = %req.file_id,
            caller = %principal.id,
            "refused decode by non-owner"
        );
        return Err(DecodeError::NotFound);
    }

    let (record, plaintext) = state.vault().open_plaintext(&req.file_id).await.map_err(|e| {
        match &e {
            VaultStoreError::Integrity(_) | VaultStoreError::Container(_) => {
                tracing::error!(file = %req.file_id, error = %e, "container failed to open");
            }
            _ => {}
        }
        DecodeError::Vault(e)
    })?;

    tracing::info!(
        file = %req.file_id,
        caller = %principal.id,
        size = plaintext.len(),
        "decoded file for inline rendering"
    );

    let disposition = format!("inline; filename=\"{}\"", record.original_filename);

    Ok((
        http::StatusCode::OK,
        [
            (axum::http::header::CONTENT_TYPE, record.mime_hint.as_str()),
            (axum::http::header::CONTENT_DISPOSITION, disposition.as_str()),
        ],
        plaintext,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("File not found")]
    NotFound,
    #[error("Vault error: {0}")]
    Vault(#[from] VaultStoreError),
}

impl IntoResponse for DecodeError {
    fn into_response(self) -> Response {
        match self {
            DecodeError::NotFound
            | DecodeError::Vault(VaultStoreError::NotFound(_))
            | DecodeError::Vault(VaultStoreError::Forbidden { .. }) => {
                let msg = serde_json::json!({"msg": "not found"});
                (http::StatusCode::NOT_FOUND, Json(msg)).into_response()
            }
            // tampered, truncated, and future-versioned containers all look
            // the same from outside
            DecodeError::Vault(VaultStoreError::Integrity(_))
            | DecodeError::Vault(VaultStoreError::Container(_)) => {
                let msg = serde_json::json!({"msg": "file cannot be opened"});
                (http::StatusCode::UNPROCESSABLE_ENTITY, Json(msg)).into_response()
            }
            DecodeError::Vault(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}
