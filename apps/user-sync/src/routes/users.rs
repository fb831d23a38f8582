use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

/// GET /api/v1/users/:clerk_id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(clerk_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .find_by_clerk_id(&clerk_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {clerk_id} not found")))?;
    Ok(Json(user))
}
