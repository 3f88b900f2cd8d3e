use axum::routing::{get, post};
use axum::Router;

pub mod close;
pub mod content;
pub mod open;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/open", post(open::handler))
        .route("/close", post(close::handler))
        .route("/:session_id", get(content::handler))
        .with_state(state)
}
