//! Application state shared across pages

use analysis::{AnalysisService, AnalysisSettings};
use auth::AuthService;
use common::{
    alerts::{AlertConfig, AlertKind, AlertStore},
    config::ClientConfig,
    error::{ApiError, ApiResult},
    navigation::{Navigator, Route},
    pipeline::ApiClient,
    session::SessionStore,
    storage::{FileStore, KeyValueStore},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Application state shared across pages
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub session: SessionStore,
    pub navigator: Navigator,
    pub alerts: AlertStore,
    pub auth: AuthService,
    pub analysis: AnalysisService,
}

impl AppState {
    /// State persisting the session in the configured session file
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let storage = Arc::new(FileStore::new(&config.session_file));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: ClientConfig, storage: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        let session = SessionStore::new(storage);
        let initial = if session.is_authenticated()? {
            Route::Dashboard
        } else {
            Route::Login
        };
        let navigator = Navigator::new(initial);

        let client = ApiClient::new(
            &config.auth_base_url,
            session.clone(),
            navigator.clone(),
            config.request_timeout(),
        )?;

        let alerts = AlertStore::new(AlertConfig {
            default_timeout: Duration::from_millis(config.alert_timeout_ms),
            validation_timeout: Duration::from_millis(config.validation_alert_timeout_ms),
        });

        Ok(Self {
            auth: AuthService::new(client.clone()),
            analysis: AnalysisService::new(client, AnalysisSettings::from_config(&config)),
            config,
            session,
            navigator,
            alerts,
        })
    }

    /// Show an alert
    pub async fn notify(&self, message: impl Into<String>, kind: AlertKind) {
        self.alerts.add_alert(message, kind, None).await;
    }

    /// Surface a failed operation to the user
    ///
    /// Validation problems become validation alerts. Errors that invalidate
    /// the session send the user back to the login screen.
    pub async fn report(&self, err: &ApiError) {
        match err {
            ApiError::Validation { field, message } => {
                warn!("Validation failed for {}: {}", field, message);
                self.notify(message.clone(), AlertKind::Validation).await;
            }
            err if err.requires_login() => {
                warn!("Session required: {}", err);
                self.navigator.redirect(Route::Login);
                self.notify(err.to_string(), AlertKind::Warning).await;
            }
            err => {
                error!("Operation failed: {}", err);
                self.notify(err.to_string(), AlertKind::Error).await;
            }
        }
    }
}
