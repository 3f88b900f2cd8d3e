use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::auth::RequirePrincipal;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseResponse {
    pub session_id: Uuid,
}

/// Close a preview session, zeroing its plaintext buffer. Idempotent:
/// closing an unknown or already-expired session succeeds.
pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(_principal): RequirePrincipal,
    Json(req): Json<CloseRequest>,
) -> impl IntoResponse {
    state.previews().close(&req.session_id);

    (
        http::StatusCode::OK,
        Json(CloseResponse {
            session_id: req.session_id,
        }),
    )
}
