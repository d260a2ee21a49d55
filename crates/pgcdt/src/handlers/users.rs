//! User handlers.
//!
//! Users carry their address in the `address` composite column.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use pgcdt_core::person::{NewUser, User};

use crate::{handlers::AppError, state::AppState};

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Only return users whose address has this pin code.
    pub pin_code: Option<i32>,
}

/// List users ordered by id (GET /users).
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = match query.pin_code {
        Some(pin_code) => state.user_repo.fetch_by_pin_code(pin_code).await?,
        None => state.user_repo.fetch_all().await?,
    };

    tracing::debug!(count = users.len(), pin_code = ?query.pin_code, "Listed users");

    Ok(Json(users))
}

/// Insert a batch of users (POST /users).
pub async fn create_users(
    State(state): State<AppState>,
    Json(users): Json<Vec<NewUser>>,
) -> Result<Json<u64>, AppError> {
    let count = state.user_repo.persist(&users).await?;

    tracing::info!(count, "Persisted users");

    Ok(Json(count))
}
