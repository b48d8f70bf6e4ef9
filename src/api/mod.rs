// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::SESSION_COOKIE_NAME,
    models::{
        CheckResponse, ExternalProfileResponse, Identity, LoginRequest, LoginResponse,
        LogoutResponse, ProfileResponse, RegisterRequest, RegisterResponse, UserResponse,
    },
    relay::AppscodeSession,
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod kubedb;
pub mod users;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile))
        .route("/auth/check", get(auth::check))
        .route("/kubedb/profile", get(kubedb::profile))
        .route("/users/me", get(users::get_current_user))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    // The frontend sends cookies, so CORS must echo the origin and allow
    // credentials rather than answer with a wildcard.
    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::very_permissive()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::profile,
        auth::check,
        kubedb::profile,
        users::get_current_user,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Identity,
            RegisterRequest,
            LoginRequest,
            RegisterResponse,
            LoginResponse,
            LogoutResponse,
            ProfileResponse,
            CheckResponse,
            UserResponse,
            ExternalProfileResponse,
            AppscodeSession,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Local sessions and Appscode login relay"),
        (name = "KubeDB", description = "Appscode profile proxy"),
        (name = "Users", description = "Stored user profiles"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        cookie_pair, get_request, json_request, send, spawn_upstream, Upstream,
    };
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn registration(username: &str) -> Value {
        json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "firstName": "Test",
            "lastName": "User",
            "password": "correct-horse",
        })
    }

    /// Register `username` and log in with it; returns the login response.
    async fn register_and_login(app: &Router, username: &str) -> (StatusCode, Vec<String>, Value) {
        let (status, _, _) =
            send(app, json_request("POST", "/auth/register", registration(username))).await;
        assert_eq!(status, StatusCode::CREATED);

        send(
            app,
            json_request(
                "POST",
                "/auth/login",
                json!({ "identifier": username, "password": "correct-horse" }),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/register",
            "/auth/login",
            "/auth/logout",
            "/auth/profile",
            "/auth/check",
            "/kubedb/profile",
            "/users/me",
            "/health/live",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn health_endpoints_respond() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));

        let (status, _, body) = send(&app, get_request("/health/live", &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, _, body) = send(&app, get_request("/health/ready", &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["identity_store_users"], 0);
        assert_eq!(body["checks"]["appscode_relay"], "enabled");
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));
        let response = tower::ServiceExt::oneshot(app, get_request("/health/live", &[]))
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn register_sets_session_cookie() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));

        let (status, set_cookies, body) =
            send(&app, json_request("POST", "/auth/register", registration("alice"))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["firstName"], "Test");
        assert!(body["user"].get("password").is_none());
        assert!(cookie_pair(&set_cookies, "access_token").is_some());
        assert!(set_cookies[0].contains("HttpOnly"));
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));
        send(&app, json_request("POST", "/auth/register", registration("bob"))).await;

        let (status, set_cookies, body) =
            send(&app, json_request("POST", "/auth/register", registration("bob"))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error_code"], "duplicate_identity");
        assert!(set_cookies.is_empty());
    }

    #[tokio::test]
    async fn login_relays_appscode_cookies() {
        let base = spawn_upstream(Upstream::Healthy).await;
        let app = router(AppState::for_tests(&base));

        let (status, set_cookies, body) = register_and_login(&app, "carol").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful and cookie set");
        assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["appscodetoken"]["cookies"].as_array().map(Vec::len), Some(2));

        assert!(cookie_pair(&set_cookies, "access_token").is_some());
        assert_eq!(cookie_pair(&set_cookies, "sid"), Some("sid=abc123"));
        assert_eq!(cookie_pair(&set_cookies, "_csrf"), Some("_csrf=tok123"));

        let sid = set_cookies
            .iter()
            .find(|c| c.starts_with("sid="))
            .unwrap();
        assert!(sid.contains("Max-Age=3600"));
        assert!(sid.contains("HttpOnly"));
        assert!(!sid.contains("Domain"));
    }

    #[tokio::test]
    async fn login_keeps_every_relayed_directive_and_the_local_session() {
        let base = spawn_upstream(Upstream::Colliding).await;
        let app = router(AppState::for_tests(&base));

        let (status, set_cookies, body) = register_and_login(&app, "nora").await;

        assert_eq!(status, StatusCode::OK);
        let sids: Vec<&String> = set_cookies.iter().filter(|c| c.starts_with("sid=")).collect();
        assert_eq!(sids.len(), 2);
        assert!(sids.iter().any(|c| c.starts_with("sid=one") && c.contains("Path=/a")));
        assert!(sids.iter().any(|c| c.starts_with("sid=two") && c.contains("Path=/b")));

        let sessions: Vec<&String> = set_cookies
            .iter()
            .filter(|c| c.starts_with("access_token="))
            .collect();
        assert_eq!(sessions.len(), 1);
        let local = format!("access_token={}", body["access_token"].as_str().unwrap());
        assert_eq!(cookie_pair(&set_cookies, "access_token"), Some(local.as_str()));
    }

    #[tokio::test]
    async fn login_survives_slow_appscode() {
        let base = spawn_upstream(Upstream::Slow).await;
        let app = router(AppState::for_tests(&base));

        let (status, set_cookies, body) = register_and_login(&app, "dave").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["appscodetoken"].is_null());
        assert_eq!(set_cookies.len(), 1);
        assert!(cookie_pair(&set_cookies, "access_token").is_some());
    }

    #[tokio::test]
    async fn login_survives_failing_appscode() {
        let base = spawn_upstream(Upstream::Broken).await;
        let app = router(AppState::for_tests(&base));

        let (status, set_cookies, body) = register_and_login(&app, "erin").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["appscodetoken"].is_null());
        assert_eq!(set_cookies.len(), 1);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));
        send(&app, json_request("POST", "/auth/register", registration("frank"))).await;

        let (status, set_cookies, body) = send(
            &app,
            json_request(
                "POST",
                "/auth/login",
                json!({ "identifier": "frank", "password": "wrong-password" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "invalid_credentials");
        assert!(set_cookies.is_empty());
    }

    #[tokio::test]
    async fn concurrent_logins_get_their_own_sessions() {
        let base = spawn_upstream(Upstream::Healthy).await;
        let app = router(AppState::for_tests(&base));
        for name in ["gina", "hank"] {
            send(&app, json_request("POST", "/auth/register", registration(name))).await;
        }

        let login = |name: &str| {
            json_request(
                "POST",
                "/auth/login",
                json!({ "identifier": name, "password": "correct-horse" }),
            )
        };
        let (first, second) = tokio::join!(send(&app, login("gina")), send(&app, login("hank")));

        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(second.0, StatusCode::OK);
        assert_eq!(first.2["user"]["username"], "gina");
        assert_eq!(second.2["user"]["username"], "hank");
        assert_ne!(first.2["access_token"], second.2["access_token"]);
        assert_eq!(first.1.len(), 3);
        assert_eq!(second.1.len(), 3);
    }

    #[tokio::test]
    async fn session_cookie_and_bearer_both_authenticate() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));
        let (_, set_cookies, body) = register_and_login(&app, "iris").await;
        let cookie = cookie_pair(&set_cookies, "access_token").unwrap().to_string();
        let bearer = format!("Bearer {}", body["access_token"].as_str().unwrap());

        let (status, _, body) =
            send(&app, get_request("/auth/check", &[("cookie", cookie.as_str())])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["username"], "iris");
        assert_eq!(body["token_source"], "cookie");
        assert!(body["expires_at"].as_i64().is_some_and(|exp| exp > chrono::Utc::now().timestamp()));

        let (_, _, body) =
            send(&app, get_request("/auth/check", &[("authorization", bearer.as_str())])).await;
        assert_eq!(body["token_source"], "bearer");

        let (status, _, body) =
            send(&app, get_request("/users/me", &[("authorization", bearer.as_str())])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "iris@example.com");
    }

    #[tokio::test]
    async fn profile_echoes_request_cookies() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));
        let (_, set_cookies, _) = register_and_login(&app, "jack").await;
        let cookie = format!(
            "{}; theme=dark",
            cookie_pair(&set_cookies, "access_token").unwrap()
        );

        let (status, _, body) =
            send(&app, get_request("/auth/profile", &[("cookie", cookie.as_str())])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "jack");
        assert_eq!(body["cookies"]["theme"], "dark");
        assert!(body["cookies"]["access_token"].is_string());
    }

    #[tokio::test]
    async fn protected_routes_reject_anonymous_requests() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));

        for uri in ["/auth/profile", "/auth/check", "/kubedb/profile", "/users/me"] {
            let (status, _, body) = send(&app, get_request(uri, &[])).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error_code"], "missing_token", "{uri}");
        }

        let (status, _, body) = send(
            &app,
            get_request("/auth/check", &[("cookie", "access_token=not-a-jwt")]),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "malformed_token");
    }

    #[tokio::test]
    async fn logout_clears_session_cookie() {
        let app = router(AppState::for_tests("http://127.0.0.1:9"));
        let (_, set_cookies, _) = register_and_login(&app, "kate").await;
        let cookie = cookie_pair(&set_cookies, "access_token").unwrap().to_string();

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .header("cookie", cookie.as_str())
            .body(axum::body::Body::empty())
            .unwrap();
        let (status, set_cookies, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(cookie_pair(&set_cookies, "access_token"), Some("access_token="));
        assert!(set_cookies[0].contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn kubedb_profile_replays_cookies_and_csrf() {
        let base = spawn_upstream(Upstream::Healthy).await;
        let app = router(AppState::for_tests(&base));
        let (_, set_cookies, _) = register_and_login(&app, "liam").await;
        let cookie = ["access_token", "sid", "_csrf"]
            .iter()
            .filter_map(|name| cookie_pair(&set_cookies, name))
            .collect::<Vec<_>>()
            .join("; ");

        let (status, _, body) =
            send(&app, get_request("/kubedb/profile", &[("cookie", cookie.as_str())])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["res"]["username"], "appscode");
        assert_eq!(body["res"]["csrf"], "tok123");
        let forwarded = body["res"]["cookie"].as_str().unwrap();
        assert!(forwarded.starts_with("_csrf=tok123; access_token="));
        assert!(forwarded.ends_with("; sid=abc123"));
        assert_eq!(body["cookies"]["sid"], "abc123");
    }

    #[tokio::test]
    async fn kubedb_profile_maps_upstream_rejection_to_bad_gateway() {
        let base = spawn_upstream(Upstream::Rejecting).await;
        let app = router(AppState::for_tests(&base));
        let (_, set_cookies, _) = register_and_login(&app, "mona").await;
        let cookie = cookie_pair(&set_cookies, "access_token").unwrap().to_string();

        let (status, _, body) =
            send(&app, get_request("/kubedb/profile", &[("cookie", cookie.as_str())])).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error_code"], "upstream_unavailable");
        assert_eq!(body["upstream_status"], 401);
    }
}
