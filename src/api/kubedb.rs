// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proxy endpoints backed by the Appscode (KubeDB) backend.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::Auth,
    error::ApiError,
    models::ExternalProfileResponse,
    relay::RequestCookies,
    state::AppState,
};

/// Fetch the Appscode profile for the relayed session.
///
/// Replays every browser cookie plus the `_csrf` token (as `x-csrf-token`).
/// The upstream body is returned untouched under `res`; upstream failures
/// are reported as `502` with the upstream status.
#[utoipa::path(
    get,
    path = "/kubedb/profile",
    tag = "KubeDB",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Appscode profile", body = ExternalProfileResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 502, description = "Appscode backend failed or rejected the session")
    )
)]
pub async fn profile(
    Auth(user): Auth,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<ExternalProfileResponse>, ApiError> {
    let cookies = RequestCookies::from_jar(&jar);

    let body = state
        .appscode
        .fetch_profile(&cookies)
        .await
        .inspect_err(|e| {
            tracing::warn!(user_id = %user.user_id(), error = %e, "Appscode profile fetch failed");
        })?;

    Ok(Json(ExternalProfileResponse {
        message: "Profile retrieved successfully".to_string(),
        res: body,
        cookies: cookies.into_map(),
    }))
}
