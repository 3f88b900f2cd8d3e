use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http_server::auth::RequirePrincipal;
use crate::vault::VaultStoreError;
use crate::ServiceState;

/// Decode a caller-supplied `.ssv` container that was never stored here.
///
/// Useful for recovering a previously downloaded container. The same
/// generic "cannot open" collapse applies: wrong key, tampering, and
/// structural damage are indistinguishable on the wire.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
    mut multipart: Multipart,
) -> Result<Response, DecodeUploadError> {
    let mut container: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Multipart parsing error: {}", e);
        DecodeUploadError::MultipartError(e.to_string())
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        tracing::error!("Error reading container data: {}", e);
                        DecodeUploadError::MultipartError(e.to_string())
                    })?
                    .to_vec();
                container = Some(data);
            }
            _ => {
                tracing::warn!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let bytes =
        container.ok_or_else(|| DecodeUploadError::InvalidRequest("file is required".into()))?;

    let plaintext = state.vault().open_container_bytes(bytes).await?;

    tracing::info!(
        caller = %principal.id,
        size = plaintext.len(),
        "decoded uploaded container"
    );

    Ok((
        http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "application/octet-stream",
        )],
        plaintext,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeUploadError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Multipart error: {0}")]
    MultipartError(String),
    #[error("Vault error: {0}")]
    Vault(#[from] VaultStoreError),
}

impl IntoResponse for DecodeUploadError {
    fn into_response(self) -> Response {
        match self {
            DecodeUploadError::InvalidRequest(msg) | DecodeUploadError::MultipartError(msg) => (
                http::StatusCode::BAD_REQUEST,
                format!("Bad request: {}", msg),
            )
                .into_response(),
            DecodeUploadError::Vault(VaultStoreError::Integrity(_))
            | DecodeUploadError::Vault(VaultStoreError::Container(_)) => {
                let msg = serde_json::json!({"msg": "file cannot be opened"});
                (http::StatusCode::UNPROCESSABLE_ENTITY, Json(msg)).into_response()
            }
            DecodeUploadError::Vault(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}
