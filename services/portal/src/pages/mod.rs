//! Screens of the portal
//!
//! Each page reports failures as alerts rather than returning them, so the
//! caller always gets to render whatever the page left behind.

pub mod dashboard;
pub mod login;
pub mod profile;
pub mod register;

use common::alerts::AlertKind;
use common::navigation::require_session;

use crate::state::AppState;

/// Guard for protected pages
///
/// Returns `false` after redirecting to the login screen and telling the
/// user why.
pub(crate) async fn guard(state: &AppState) -> anyhow::Result<bool> {
    if require_session(&state.session, &state.navigator)? {
        return Ok(true);
    }
    state
        .notify("Please log in to continue", AlertKind::Warning)
        .await;
    Ok(false)
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::state::AppState;
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode, header::AUTHORIZATION},
        response::{IntoResponse, Response},
        routing::{get, post},
    };
    use common::config::ClientConfig;
    use common::storage::MemoryStore;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// `Basic base64("jane@example.com:Secret1!")`
    const JANE_BASIC: &str = "Basic amFuZUBleGFtcGxlLmNvbTpTZWNyZXQxIQ==";

    fn bearer(headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            == Some("Bearer tok123")
    }

    async fn login(headers: HeaderMap) -> Response {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if authorization == Some(JANE_BASIC) {
            Json(json!({ "token": "tok123" })).into_response()
        } else {
            (StatusCode::UNAUTHORIZED, "Invalid password").into_response()
        }
    }

    async fn register() -> Response {
        (StatusCode::CREATED, "User registered").into_response()
    }

    async fn profile(headers: HeaderMap) -> Response {
        if !bearer(&headers) {
            return (StatusCode::UNAUTHORIZED, "Token expired").into_response();
        }
        Json(json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "userName": "jane@example.com"
        }))
        .into_response()
    }

    /// Fake user API; returns its base URL
    pub async fn backend() -> String {
        let router = Router::new()
            .route("/users/login", post(login))
            .route("/users/register", post(register))
            .route("/users/profile", get(profile));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}", addr)
    }

    pub fn state_for(base_url: &str) -> AppState {
        let mut vars = HashMap::new();
        vars.insert("OCULA_AUTH_BASE_URL".to_string(), base_url.to_string());
        vars.insert("OCULA_INFERENCE_BASE_URL".to_string(), base_url.to_string());
        let config = ClientConfig::from_vars(vars).unwrap();

        AppState::with_storage(config, Arc::new(MemoryStore::new())).unwrap()
    }
}
