// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local session endpoints.
//!
//! Registration and login set the `access_token` cookie. Login additionally
//! relays an Appscode session, whose cookies are appended to the same
//! response as separate `Set-Cookie` headers.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::{
    auth::{session_cookie, Auth, CredentialValidator},
    error::ApiError,
    models::{
        CheckResponse, LoginRequest, LoginResponse, LogoutResponse, ProfileResponse,
        RegisterRequest, RegisterResponse,
    },
    relay::{relay_login, set_cookie_headers, RequestCookies, SetCookieHeaders},
    state::AppState,
};

/// Register a new local user and start a session.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered; access_token cookie set", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email or username already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), ApiError> {
    let identity = CredentialValidator::new(&state.store)
        .register(request)
        .await?;
    let token = state.tokens.issue(&identity).map_err(|e| ApiError::internal(e.to_string()))?;

    info!(user_id = %identity.id, username = %identity.username, "User registered");

    let jar = jar.add(session_cookie::session_cookie(token, state.config.environment));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            user: identity,
        }),
    ))
}

/// Log in, set the local session cookie and relay the Appscode session.
///
/// The Appscode login is best-effort; when it fails the response still
/// succeeds with only the local session and `appscodetoken: null`.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; access_token and relayed cookies set", body = LoginResponse),
        (status = 400, description = "Missing identifier or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, SetCookieHeaders, Json<LoginResponse>), ApiError> {
    let identity = CredentialValidator::new(&state.store)
        .validate_login(&request)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "Login rejected"))?;
    let token = state.tokens.issue(&identity).map_err(|e| ApiError::internal(e.to_string()))?;

    info!(user_id = %identity.id, "User logged in");

    let jar = jar.add(session_cookie::session_cookie(
        token.clone(),
        state.config.environment,
    ));
    let (relayed, appscode) = relay_login(&state.appscode).await;

    Ok((
        jar,
        set_cookie_headers(&relayed),
        Json(LoginResponse {
            message: "Login successful and cookie set".to_string(),
            user: identity,
            access_token: token,
            appscodetoken: appscode,
        }),
    ))
}

/// End the local session by clearing the `access_token` cookie.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn logout(
    Auth(user): Auth,
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    info!(user_id = %user.user_id(), "User logged out");

    let jar = jar.add(session_cookie::clear_session_cookie(state.config.environment));

    (
        jar,
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
            success: true,
        }),
    )
}

/// Return the authenticated user along with the cookies the browser sent.
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Auth",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn profile(Auth(user): Auth, jar: CookieJar) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        message: "Profile retrieved successfully".to_string(),
        user: user.identity,
        cookies: RequestCookies::from_jar(&jar).into_map(),
    })
}

/// Cheap session check for the frontend, including when the session ends.
#[utoipa::path(
    get,
    path = "/auth/check",
    tag = "Auth",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session is valid", body = CheckResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn check(Auth(user): Auth) -> Json<CheckResponse> {
    Json(CheckResponse {
        authenticated: true,
        user: user.identity,
        expires_at: user.expires_at,
        token_source: user.token_source.to_string(),
    })
}
