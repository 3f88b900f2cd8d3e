use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::http_server::auth::RequirePrincipal;
use crate::preview::PreviewError;
use crate::ServiceState;

/// Serve a session's plaintext for rendering. An expired or closed handle
/// is indistinguishable from one that never existed.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(_principal): RequirePrincipal,
    Path(session_id): Path<Uuid>,
) -> Result<Response, ContentError> {
    let content = state.previews().read(&session_id)?;

    Ok((
        http::StatusCode::OK,
        [
            (axum::http::header::CONTENT_TYPE, content.mime_hint.as_str()),
            (axum::http::header::CONTENT_DISPOSITION, "inline"),
        ],
        content.bytes,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        match self {
            ContentError::Preview(PreviewError::Unsupported) => {
                let msg = serde_json::json!({"msg": "no inline preview available"});
                (http::StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(msg)).into_response()
            }
            ContentError::Preview(PreviewError::SessionNotFound) => {
                let msg = serde_json::json!({"msg": "not found"});
                (http::StatusCode::NOT_FOUND, Json(msg)).into_response()
            }
            ContentError::Preview(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}
