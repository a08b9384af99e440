pub mod health;
pub mod notices;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(notices::read_notices).post(notices::create_notice))
        .route("/{id}", put(notices::update_notice).delete(notices::delete_notice))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
