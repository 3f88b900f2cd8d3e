use axum::routing::{get, post};
use axum::Router;

pub mod decode;
pub mod decode_upload;
pub mod delete;
pub mod download;
pub mod list;
pub mod upload;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler))
        .route("/upload", post(upload::handler))
        .route("/download/:file_id", get(download::handler))
        .route("/decode", post(decode::handler))
        .route("/decode-upload", post(decode_upload::handler))
        .route("/:file_id", axum::routing::delete(delete::handler))
        .with_state(state)
}
