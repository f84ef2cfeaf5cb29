//! Authenticated request pipeline
//!
//! Every call to the protected API goes through [`ApiClient`], which attaches
//! the bearer token from the [`SessionStore`], maps HTTP failures onto
//! [`ApiError`] and clears the session when the server rejects the token.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult};
use crate::navigation::{Navigator, Route};
use crate::session::{SessionStore, strip_scheme};

/// Fallback message for a 401 that concerns the password
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";
/// Message for requests that did not complete in time
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";
/// Message for unreachable servers
pub const NETWORK_MESSAGE: &str = "Unable to reach the server. Please check your connection.";
/// Message for bodies that could not be interpreted
pub const FORMAT_MESSAGE: &str = "The server returned an unexpected response.";

/// Request body variants
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// A request to the protected API, relative to the client's base URL
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Format(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a multipart form body
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Response returned by the pipeline
///
/// Successful responses and the one failure the pipeline passes through
/// untouched (a 401 about the password) are represented here.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ApiResponse {
    /// Parse a raw body according to its declared type
    pub fn parse(status: StatusCode, is_json: bool, text: String) -> ApiResult<Self> {
        let body = if is_json {
            if text.trim().is_empty() {
                ResponseBody::Json(Value::Null)
            } else {
                let value = serde_json::from_str(&text).map_err(|e| {
                    error!("Failed to parse JSON response: {}", e);
                    ApiError::Format(FORMAT_MESSAGE.to_string())
                })?;
                ResponseBody::Json(value)
            }
        } else {
            ResponseBody::Text(text)
        };

        Ok(Self { status, body })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the body carries nothing: no bytes, blank text or JSON `null`
    pub fn is_empty(&self) -> bool {
        match &self.body {
            ResponseBody::Json(value) => value.is_null(),
            ResponseBody::Text(text) => text.trim().is_empty(),
        }
    }

    /// Best human-readable message carried by the body
    pub fn message(&self) -> Option<String> {
        match &self.body {
            ResponseBody::Json(value) => message_from_json(value),
            ResponseBody::Text(text) => message_from_text(text),
        }
    }

    /// Turn an untouched 401 into [`ApiError::InvalidCredentials`]
    pub fn into_result(self) -> ApiResult<Self> {
        if self.status == StatusCode::UNAUTHORIZED {
            let message = self
                .message()
                .unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_string());
            return Err(ApiError::InvalidCredentials(message));
        }
        Ok(self)
    }

    /// Deserialize the body into `T`
    pub fn json<T: DeserializeOwned>(self) -> ApiResult<T> {
        let parsed = match self.body {
            ResponseBody::Json(value) => serde_json::from_value(value),
            ResponseBody::Text(text) => serde_json::from_str(&text),
        };
        parsed.map_err(|e| {
            error!("Unexpected response shape: {}", e);
            ApiError::Format(FORMAT_MESSAGE.to_string())
        })
    }
}

/// What a dispatched request produced before the body was consumed
enum Dispatched {
    Success(reqwest::Response),
    PasswordRejected(ApiResponse),
}

/// HTTP client for the protected API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    session: SessionStore,
    navigator: Navigator,
}

impl ApiClient {
    /// Create a new client; cookies set by the server are kept and replayed
    pub fn new(
        base_url: &str,
        session: SessionStore,
        navigator: Navigator,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(http, base_url, session, navigator))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: SessionStore,
        navigator: Navigator,
    ) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session,
            navigator,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send an authenticated request and parse the response body
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        match self.dispatch(request).await? {
            Dispatched::PasswordRejected(response) => Ok(response),
            Dispatched::Success(response) => {
                let status = response.status();
                let is_json = is_json(&response);
                let text = response.text().await.map_err(classify_transport)?;
                ApiResponse::parse(status, is_json, text)
            }
        }
    }

    /// Send an authenticated request and return the raw body bytes
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn send_bytes(&self, request: ApiRequest) -> ApiResult<Vec<u8>> {
        match self.dispatch(request).await? {
            Dispatched::PasswordRejected(response) => response.into_result().map(|_| Vec::new()),
            Dispatched::Success(response) => {
                let bytes = response.bytes().await.map_err(classify_transport)?;
                Ok(bytes.to_vec())
            }
        }
    }

    async fn dispatch(&self, request: ApiRequest) -> ApiResult<Dispatched> {
        let token = self.session.token()?.ok_or_else(|| {
            warn!("Refusing request without a stored token");
            ApiError::Unauthenticated
        })?;

        let url = self.url(&request.path);
        debug!("{} {}", request.method, url);

        let builder = self
            .http
            .request(request.method, &url)
            .header(AUTHORIZATION, format!("Bearer {}", strip_scheme(&token)));

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(classify_transport)?;
        let status = response.status();

        if status.is_success() {
            return Ok(Dispatched::Success(response));
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                let is_json = is_json(&response);
                let text = response.text().await.unwrap_or_default();

                if text.to_lowercase().contains("password") {
                    debug!("401 concerns the password, passing response through");
                    let body = ApiResponse::parse(status, is_json, text.clone())
                        .map(|parsed| parsed.body)
                        .unwrap_or(ResponseBody::Text(text));
                    return Ok(Dispatched::PasswordRejected(ApiResponse { status, body }));
                }

                warn!("Server rejected the session token");
                self.session.remove_token()?;
                self.navigator.redirect(Route::Login);
                Err(ApiError::SessionExpired)
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(error_for_status(status, &text))
            }
        }
    }
}

/// Whether the response declares a JSON body
pub fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"))
}

/// Map a non-success status other than 401 onto an error
pub fn error_for_status(status: StatusCode, text: &str) -> ApiError {
    match status {
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::INTERNAL_SERVER_ERROR => ApiError::Server,
        _ => error_from_body(status, text),
    }
}

/// Build the error for a non-success status from its body
pub fn error_from_body(status: StatusCode, text: &str) -> ApiError {
    let message = body_message(text)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    ApiError::Http {
        status: status.as_u16(),
        message,
    }
}

/// Message carried by a raw body, whether JSON or plain text
pub fn body_message(text: &str) -> Option<String> {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| message_from_json(&value))
        .or_else(|| message_from_text(text))
}

fn message_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => message_from_text(text),
        Value::Object(map) => ["message", "error", "detail"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|field| match field {
                Value::String(text) => message_from_text(text),
                Value::Null => None,
                other => Some(other.to_string()),
            }),
        _ => None,
    }
}

fn message_from_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Classify a transport-level failure into a user-facing error
pub fn classify_transport(err: reqwest::Error) -> ApiError {
    error!("HTTP transport error: {}", err);

    if err.is_timeout() {
        ApiError::Timeout(TIMEOUT_MESSAGE.to_string())
    } else if err.is_connect() {
        ApiError::Network(NETWORK_MESSAGE.to_string())
    } else if err.is_decode() {
        ApiError::Format(FORMAT_MESSAGE.to_string())
    } else {
        classify_message(&err.to_string())
    }
}

/// Classify a failure by the wording of its message
pub fn classify_message(message: &str) -> ApiError {
    let lowered = message.to_lowercase();

    if lowered.contains("timeout") || lowered.contains("timed out") {
        ApiError::Timeout(TIMEOUT_MESSAGE.to_string())
    } else if ["network", "connect", "dns", "failed to fetch"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        ApiError::Network(NETWORK_MESSAGE.to_string())
    } else if ["json", "parse", "decode", "format"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        ApiError::Format(FORMAT_MESSAGE.to_string())
    } else {
        ApiError::Network(message.to_string())
    }
}
