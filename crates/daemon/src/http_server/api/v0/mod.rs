use axum::Router;

pub mod files;
pub mod keys;
pub mod previews;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/files", files::router(state.clone()))
        .nest("/keys", keys::router(state.clone()))
        .nest("/previews", previews::router(state.clone()))
        .with_state(state)
}
