use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::principal::Role;

use crate::database::models::ApiKeyRecord;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::RequirePrincipal;
use crate::keys::KeyRegistryError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ListKeysRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub id: Uuid,
    pub app_name: String,
    pub owner_id: Uuid,
    pub role: Role,
    /// Digest prefix; the secret itself is shown only at issuance.
    pub fingerprint: String,
    pub status: String,
    pub hit_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

fn to_metadata(record: ApiKeyRecord, now: OffsetDateTime) -> KeyMetadata {
    KeyMetadata {
        fingerprint: record.fingerprint(),
        status: record.status_at(now).to_string(),
        id: record.id,
        app_name: record.app_name,
        owner_id: record.owner_id,
        role: record.role,
        hit_count: record.hit_count,
        issued_at: record.issued_at,
        expires_at: record.expires_at,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListKeysResponse {
    pub keys: Vec<KeyMetadata>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> Result<impl IntoResponse, ListKeysError> {
    let now = OffsetDateTime::now_utc();
    let keys = state.keys().list(&principal).await?;

    Ok((
        http::StatusCode::OK,
        Json(ListKeysResponse {
            keys: keys.into_iter().map(|k| to_metadata(k, now)).collect(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListKeysError {
    #[error("Registry error: {0}")]
    Registry(#[from] KeyRegistryError),
}

impl IntoResponse for ListKeysError {
    fn into_response(self) -> Response {
        match self {
            ListKeysError::Registry(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListKeysRequest {
    type Response = ListKeysResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/keys").unwrap();
        client.get(full_url)
    }
}
