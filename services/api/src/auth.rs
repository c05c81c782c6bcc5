use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use school_clearance::config::AuthConfig;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

pub(crate) const AUTH_COOKIE_NAME: &str = "school_auth_token";
pub(crate) const AUTH_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 7;
const AUTH_COOKIE_VALUE: &str = "authenticated";

#[derive(Clone)]
pub(crate) struct AuthState {
    config: Arc<AuthConfig>,
}

impl AuthState {
    pub(crate) fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn accepts(&self, email: &str, password: &str) -> bool {
        match (&self.config.admin_email, &self.config.admin_password) {
            (Some(admin_email), Some(admin_password)) => {
                email == admin_email && password == admin_password
            }
            _ => {
                error!("admin credentials are not configured; rejecting login");
                false
            }
        }
    }

    fn session_cookie(&self) -> String {
        let mut cookie = format!(
            "{AUTH_COOKIE_NAME}={AUTH_COOKIE_VALUE}; HttpOnly; Path=/; SameSite=Lax; Max-Age={AUTH_COOKIE_MAX_AGE}"
        );
        if self.config.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn expired_cookie() -> String {
    format!("{AUTH_COOKIE_NAME}=; Path=/; Max-Age=0")
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub(crate) fn auth_routes(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login_endpoint))
        .route("/api/auth/logout", post(logout_endpoint))
        .route("/api/auth/check", get(check_endpoint))
        .with_state(state)
}

/// True when the request carries a non-empty session cookie.
pub(crate) fn is_authenticated(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == AUTH_COOKIE_NAME && !value.is_empty())
}

fn with_cookie(mut response: Response, cookie: String) -> Response {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(err) => {
            error!(%err, "failed to encode session cookie");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn login_endpoint(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    if !state.accepts(&payload.email, &payload.password) {
        warn!("rejected admin login");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        )
            .into_response();
    }

    let response = Json(json!({ "success": true })).into_response();
    with_cookie(response, state.session_cookie())
}

pub(crate) async fn logout_endpoint() -> Response {
    let response = Json(json!({ "success": true })).into_response();
    with_cookie(response, expired_cookie())
}

pub(crate) async fn check_endpoint(headers: HeaderMap) -> Json<serde_json::Value> {
    Json(json!({ "authenticated": is_authenticated(&headers) }))
}

/// Rejects requests without the admin session cookie.
pub(crate) async fn require_admin(request: Request, next: Next) -> Response {
    if is_authenticated(request.headers()) {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "authentication required" })),
    )
        .into_response()
}
