// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::{auth::Auth, error::ApiError, models::UserResponse, state::AppState};

/// Get the current user's stored profile.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "User no longer exists")
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let store = state.store.read().await;
    let stored = store
        .user_by_id(user.user_id())
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse {
        message: "Profile retrieved successfully".to_string(),
        user: stored.identity.clone(),
    }))
}
