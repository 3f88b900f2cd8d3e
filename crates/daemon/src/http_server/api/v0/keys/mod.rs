use axum::routing::{get, post};
use axum::Router;

pub mod issue;
pub mod list;
pub mod revoke;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler))
        .route("/issue", post(issue::handler))
        .route("/revoke", post(revoke::handler))
        .with_state(state)
}
