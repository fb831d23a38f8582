pub mod health;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::webhook::handlers::handle_clerk_webhook;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/clerk-webhook", post(handle_clerk_webhook))
        .route("/api/v1/users", get(users::handle_list_users))
        .route("/api/v1/users/:clerk_id", get(users::handle_get_user))
        .with_state(state)
}
