//! Client configuration
//!
//! Values are read from `OCULA_*` environment variables through the `config`
//! crate, falling back to defaults suitable for a local development stack.

use config::{Config, Environment, Map};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ApiResult;

/// Default upload limit for eye images (5 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the authentication/profile API
    pub auth_base_url: String,
    /// Base URL of the image-classification API
    pub inference_base_url: String,
    /// File holding the persisted session entries
    pub session_file: PathBuf,
    /// Directory downloaded images are saved into
    pub download_dir: PathBuf,
    /// Maximum accepted image size in bytes
    pub max_upload_bytes: u64,
    /// Default alert lifetime in milliseconds
    pub alert_timeout_ms: u64,
    /// Lifetime of validation alerts in milliseconds
    pub validation_alert_timeout_ms: u64,
    /// Upper bound on the history fetch in seconds
    pub history_timeout_secs: u64,
    /// Timeout applied to every HTTP request in seconds
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `OCULA_AUTH_BASE_URL` (default: "http://localhost:8080")
    /// - `OCULA_INFERENCE_BASE_URL` (default: "http://localhost:8000")
    /// - `OCULA_SESSION_FILE` (default: ".ocula/session.json")
    /// - `OCULA_DOWNLOAD_DIR` (default: "downloads")
    /// - `OCULA_MAX_UPLOAD_BYTES` (default: 5242880)
    /// - `OCULA_ALERT_TIMEOUT_MS` (default: 5000)
    /// - `OCULA_VALIDATION_ALERT_TIMEOUT_MS` (default: 3000)
    /// - `OCULA_HISTORY_TIMEOUT_SECS` (default: 15)
    /// - `OCULA_REQUEST_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> ApiResult<Self> {
        Self::load(None)
    }

    /// Same as [`ClientConfig::from_env`] but reads variables from `vars`
    /// instead of the process environment.
    pub fn from_vars(vars: Map<String, String>) -> ApiResult<Self> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> ApiResult<Self> {
        let config = Config::builder()
            .set_default("auth_base_url", "http://localhost:8080")?
            .set_default("inference_base_url", "http://localhost:8000")?
            .set_default("session_file", ".ocula/session.json")?
            .set_default("download_dir", "downloads")?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
            .set_default("alert_timeout_ms", 5000_i64)?
            .set_default("validation_alert_timeout_ms", 3000_i64)?
            .set_default("history_timeout_secs", 15_i64)?
            .set_default("request_timeout_secs", 30_i64)?
            .add_source(
                Environment::with_prefix("OCULA")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        let mut client_config: ClientConfig = config.try_deserialize()?;
        client_config.auth_base_url = trim_base_url(&client_config.auth_base_url);
        client_config.inference_base_url = trim_base_url(&client_config.inference_base_url);
        Ok(client_config)
    }

    /// Timeout applied to every HTTP request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Upper bound on the history fetch
    pub fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history_timeout_secs)
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::from_vars(Map::new()).expect("Failed to create client config");
        assert_eq!(config.auth_base_url, "http://localhost:8080");
        assert_eq!(config.inference_base_url, "http://localhost:8000");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.alert_timeout_ms, 5000);
        assert_eq!(config.validation_alert_timeout_ms, 3000);
        assert_eq!(config.history_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_client_config_overrides() {
        let mut vars = Map::new();
        vars.insert(
            "OCULA_AUTH_BASE_URL".to_string(),
            "https://api.example.com/".to_string(),
        );
        vars.insert("OCULA_MAX_UPLOAD_BYTES".to_string(), "1024".to_string());

        let config = ClientConfig::from_vars(vars).expect("Failed to create client config");
        assert_eq!(config.auth_base_url, "https://api.example.com");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    #[serial_test::serial]
    fn test_client_config_from_process_env() {
        // SAFETY: serialised with every other test touching the environment
        unsafe { std::env::set_var("OCULA_HISTORY_TIMEOUT_SECS", "3") };
        let config = ClientConfig::from_env();
        unsafe { std::env::remove_var("OCULA_HISTORY_TIMEOUT_SECS") };

        let config = config.expect("Failed to create client config");
        assert_eq!(config.history_timeout(), Duration::from_secs(3));
    }
}
