// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test helpers: a stand-in Appscode backend and request plumbing.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Directives returned by the fake Appscode login.
pub const UPSTREAM_COOKIES: [&str; 2] = [
    "sid=abc123; Max-Age=3600; HttpOnly; Path=/; Domain=bb.test",
    "_csrf=tok123; Path=/; SameSite=Lax",
];

/// How the fake Appscode backend behaves.
#[derive(Debug, Clone, Copy)]
pub enum Upstream {
    /// Login answers 302 with session cookies; profile echoes what it got.
    Healthy,
    /// Login sleeps past the client timeout.
    Slow,
    /// Login and profile answer 500.
    Broken,
    /// Login succeeds without cookies; profile answers 401.
    Rejecting,
    /// Login sets two cookies with one name plus one named `access_token`.
    Colliding,
}

async fn login_ok() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, "/console".parse().unwrap());
    for raw in UPSTREAM_COOKIES {
        headers.append(header::SET_COOKIE, raw.parse().unwrap());
    }
    (StatusCode::FOUND, headers).into_response()
}

async fn login_colliding() -> Response {
    let mut headers = HeaderMap::new();
    for raw in [
        "sid=one; Path=/a",
        "sid=two; Path=/b",
        "access_token=UPSTREAM; Path=/",
    ] {
        headers.append(header::SET_COOKIE, raw.parse().unwrap());
    }
    (StatusCode::OK, headers).into_response()
}

async fn profile_echo(headers: HeaderMap) -> Json<Value> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "username": "appscode",
        "cookie": read("cookie"),
        "csrf": read("x-csrf-token"),
    }))
}

fn upstream_router(kind: Upstream) -> Router {
    match kind {
        Upstream::Healthy => Router::new()
            .route("/accounts/user/login", post(login_ok))
            .route("/api/v1/user", get(profile_echo)),
        Upstream::Slow => Router::new().route(
            "/accounts/user/login",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                login_ok().await
            }),
        ),
        Upstream::Broken => Router::new()
            .route(
                "/accounts/user/login",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/api/v1/user",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            ),
        Upstream::Rejecting => Router::new()
            .route("/accounts/user/login", post(|| async { StatusCode::OK }))
            .route(
                "/api/v1/user",
                get(|| async { (StatusCode::UNAUTHORIZED, r#"{"message":"no session"}"#) }),
            ),
        Upstream::Colliding => {
            Router::new().route("/accounts/user/login", post(login_colliding))
        }
    }
}

/// Serve a fake Appscode backend on an ephemeral port; returns its base URL.
pub async fn spawn_upstream(kind: Upstream) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream_router(kind)).await.unwrap();
    });
    format!("http://{addr}")
}

/// Send a request through the app and return status, `Set-Cookie` values and
/// the JSON body (`Null` when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookies = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookies, body)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

/// The `name=value` part of a `Set-Cookie` header for `name`, if present.
pub fn cookie_pair<'a>(set_cookies: &'a [String], name: &str) -> Option<&'a str> {
    set_cookies
        .iter()
        .map(|raw| raw.split(';').next().unwrap_or_default())
        .find(|pair| pair.split_once('=').map(|(n, _)| n) == Some(name))
}
