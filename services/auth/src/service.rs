//! Authentication domain service
//!
//! Login and registration are the only calls made without a token, so they
//! talk to the API directly; everything else goes through the pipeline.

use common::error::{ApiError, ApiResult};
use common::pipeline::{
    ApiClient, ApiRequest, ApiResponse, INVALID_CREDENTIALS_MESSAGE, classify_transport,
    error_for_status, is_json,
};
use common::session::{SessionStore, strip_scheme};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{ProfileData, ProfileUpdate, Registration, TokenResponse};

const REGISTERED_MESSAGE: &str = "Registration successful. Please log in.";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Create a new auth service on top of the request pipeline
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Log in with HTTP Basic credentials and store the returned token
    #[tracing::instrument(skip(self, secret))]
    pub async fn login(&self, identifier: &str, secret: &str) -> ApiResult<()> {
        if identifier.trim().is_empty() {
            return Err(ApiError::validation("email", "Email is required"));
        }
        if secret.is_empty() {
            return Err(ApiError::validation("password", "Password is required"));
        }

        let response = self
            .client
            .http()
            .post(self.client.url("/users/login"))
            .basic_auth(identifier.trim(), Some(secret))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let json = is_json(&response);
        let text = response.text().await.map_err(classify_transport)?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("Login rejected");
            let message = ApiResponse::parse(status, json, text)
                .ok()
                .and_then(|response| response.message())
                .unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_string());
            return Err(ApiError::InvalidCredentials(message));
        }

        if !status.is_success() {
            return Err(error_for_status(status, &text));
        }

        let token = extract_token(&text).ok_or_else(|| {
            warn!("Login response did not contain a token");
            ApiError::Format("No token received from the server".to_string())
        })?;

        self.session().set_token(&token)?;
        info!("Login successful");
        Ok(())
    }

    /// Register a new account
    ///
    /// Returns the server's confirmation message. Server-side validation
    /// failures are surfaced with the server's own wording.
    #[tracing::instrument(skip(self, registration), fields(user_name = %registration.user_name))]
    pub async fn register(&self, registration: &Registration) -> ApiResult<String> {
        if let Some((field, message)) = registration.validate().into_iter().next() {
            return Err(ApiError::validation(field, message));
        }

        let response = self
            .client
            .http()
            .post(self.client.url("/users/register"))
            .json(registration)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let json = is_json(&response);
        let text = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            warn!("Registration rejected with status {}", status);
            return Err(error_for_status(status, &text));
        }

        info!("Registration successful");
        let message = ApiResponse::parse(status, json, text)
            .ok()
            .and_then(|response| response.message())
            .filter(|message| !message.starts_with('{'))
            .unwrap_or_else(|| REGISTERED_MESSAGE.to_string());
        Ok(message)
    }

    /// Whether a token is stored
    ///
    /// There is no dedicated validation endpoint; the server reports an
    /// invalid token on the next protected call instead.
    pub fn validate_token(&self) -> ApiResult<bool> {
        Ok(self.session().token()?.is_some())
    }

    /// Clear the session
    pub fn logout(&self) -> ApiResult<()> {
        info!("Logging out");
        self.session().remove_token()
    }

    /// Fetch the profile of the logged-in user
    pub async fn profile(&self) -> ApiResult<ProfileData> {
        self.client
            .send(ApiRequest::get("/users/profile"))
            .await?
            .into_result()?
            .json()
    }

    /// Update the profile of the logged-in user
    ///
    /// Uses `PATCH /users/update`, falling back to `PUT /users/profile` on
    /// servers without the former.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<ProfileData> {
        if update.is_empty() {
            return Err(ApiError::validation("profile", "Nothing to update"));
        }

        let response = match self
            .client
            .send(ApiRequest::patch("/users/update").json(update)?)
            .await
        {
            Err(ApiError::NotFound) => {
                info!("PATCH /users/update not available, using PUT /users/profile");
                self.client
                    .send(ApiRequest::put("/users/profile").json(update)?)
                    .await?
            }
            other => other?,
        }
        .into_result()?;

        match response.json::<ProfileData>() {
            Ok(profile) if !profile.user_name.is_empty() => Ok(profile),
            _ => self.profile().await,
        }
    }
}

/// Pull the token out of a login response body
///
/// Accepts `{"token": ...}`, `{"access_token": ...}`, a JSON string, or the
/// raw token as plain text. Scheme prefixes are removed.
fn extract_token(body: &str) -> Option<String> {
    let token = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            let parsed: TokenResponse = serde_json::from_value(Value::Object(map)).ok()?;
            parsed.token.or(parsed.access_token)?
        }
        Ok(Value::String(token)) => token,
        _ => body.to_string(),
    };

    let token = strip_scheme(&token);
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_variants() {
        assert_eq!(extract_token(r#"{"token":"abc"}"#), Some("abc".to_string()));
        assert_eq!(
            extract_token(r#"{"access_token":"Bearer abc"}"#),
            Some("abc".to_string())
        );
        assert_eq!(extract_token(r#""Bearer abc""#), Some("abc".to_string()));
        assert_eq!(extract_token("Bearer abc\n"), Some("abc".to_string()));
        assert_eq!(extract_token(r#"{"message":"ok"}"#), None);
        assert_eq!(extract_token("   "), None);
    }
}
