//! API-key authentication for the HTTP surface.
//!
//! Every route under `/api` extracts a [`RequirePrincipal`], which
//! validates the `X-Api-Key` header through the key registry. Invalid,
//! expired, and revoked credentials are distinguishable in the logs but
//! all produce the same "unauthorized" body on the wire, so the API can't
//! be used to probe key state.

use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract::FromRequestParts, Json};

use common::principal::Principal;

use crate::keys::CredentialError;
use crate::ServiceState;

/// Header carrying the bearer secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor that authenticates the request and yields its principal.
#[derive(Debug, Clone)]
pub struct RequirePrincipal(pub Principal);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let msg = serde_json::json!({"msg": "unauthorized"});
        (StatusCode::UNAUTHORIZED, Json(msg)).into_response()
    }
}

#[async_trait::async_trait]
impl FromRequestParts<ServiceState> for RequirePrincipal {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::Unauthorized)?;

        match state.keys().validate(secret).await {
            Ok(principal) => Ok(RequirePrincipal(principal)),
            Err(e) => {
                match &e {
                    CredentialError::Database(db) => {
                        tracing::error!(error = %db, "credential check failed")
                    }
                    _ => tracing::warn!(error = %e, "rejected api credential"),
                }
                Err(AuthError::Unauthorized)
            }
        }
    }
}
