//! Session store holding the bearer token
//!
//! The session consists of two storage entries: the token itself and an
//! authenticated flag. A session is only considered valid when both are set.

use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::storage::KeyValueStore;

/// Storage key for the token
pub const TOKEN_KEY: &str = "token";
/// Storage key for the authenticated flag
pub const AUTHENTICATED_KEY: &str = "isAuthenticated";

const SCHEME_PREFIXES: [&str; 3] = ["bearer ", "basic ", "token "];

/// Session store backed by a [`KeyValueStore`]
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create a new session store
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Store a token, stripping any authorization scheme prefix, and mark
    /// the session as authenticated
    pub fn set_token(&self, raw: &str) -> ApiResult<()> {
        let token = strip_scheme(raw);
        if token.is_empty() {
            return Err(ApiError::Format("Received an empty token".to_string()));
        }

        self.storage.set(TOKEN_KEY, token)?;
        self.storage.set(AUTHENTICATED_KEY, "true")?;
        info!("Session token stored");
        Ok(())
    }

    /// Get the stored token
    pub fn token(&self) -> ApiResult<Option<String>> {
        Ok(self
            .storage
            .get(TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    /// Whether the authenticated flag is set and a token is present
    pub fn is_authenticated(&self) -> ApiResult<bool> {
        let flag = self.storage.get(AUTHENTICATED_KEY)?.as_deref() == Some("true");
        Ok(flag && self.token()?.is_some())
    }

    /// Clear the token and the authenticated flag
    pub fn remove_token(&self) -> ApiResult<()> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(AUTHENTICATED_KEY)?;
        info!("Session cleared");
        Ok(())
    }
}

/// Strip surrounding quotes, whitespace and any number of leading
/// authorization scheme prefixes (`Bearer`, `Basic`, `Token`)
pub fn strip_scheme(raw: &str) -> &str {
    let mut token = raw.trim().trim_matches('"').trim();
    loop {
        let lowered = token.to_ascii_lowercase();
        match SCHEME_PREFIXES
            .iter()
            .find(|prefix| lowered.starts_with(**prefix))
        {
            Some(prefix) => token = token[prefix.len()..].trim_start(),
            None => return token,
        }
    }
}
