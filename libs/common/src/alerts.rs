//! Transient user-facing notifications

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Kind of an alert, determining its styling and default lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    Info,
    Validation,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Error => "error",
            AlertKind::Warning => "warning",
            AlertKind::Info => "info",
            AlertKind::Validation => "validation",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visible alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub kind: AlertKind,
}

/// Alert lifetimes
#[derive(Debug, Clone, Copy)]
pub struct AlertConfig {
    /// Lifetime of every kind except validation
    pub default_timeout: Duration,
    /// Lifetime of validation alerts
    pub validation_timeout: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(5000),
            validation_timeout: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Default)]
struct AlertState {
    next_id: u64,
    alerts: Vec<Alert>,
}

/// Ordered list of visible alerts; each alert removes itself once its
/// lifetime has elapsed
///
/// Removal tasks are spawned on the current tokio runtime, so alerts must be
/// added from within one.
#[derive(Debug, Clone)]
pub struct AlertStore {
    config: AlertConfig,
    state: Arc<Mutex<AlertState>>,
}

impl AlertStore {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(AlertState::default())),
        }
    }

    /// Add an alert unless an identical one is visible
    ///
    /// `timeout` overrides the kind's default lifetime. Returns the new
    /// alert's id, or `None` when it was suppressed as a duplicate.
    pub async fn add_alert(
        &self,
        message: impl Into<String>,
        kind: AlertKind,
        timeout: Option<Duration>,
    ) -> Option<u64> {
        let message = message.into();
        let mut state = self.state.lock().await;

        if state
            .alerts
            .iter()
            .any(|alert| alert.kind == kind && alert.message == message)
        {
            debug!("Suppressing duplicate {} alert", kind);
            return None;
        }

        state.next_id += 1;
        let id = state.next_id;
        state.alerts.push(Alert { id, message, kind });
        drop(state);

        let timeout = timeout.unwrap_or_else(|| self.timeout_for(kind));
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            store.remove_alert(id).await;
        });

        Some(id)
    }

    /// Remove one alert; removing an unknown id does nothing
    pub async fn remove_alert(&self, id: u64) {
        let mut state = self.state.lock().await;
        state.alerts.retain(|alert| alert.id != id);
    }

    /// Remove every alert
    pub async fn clear_alerts(&self) {
        self.state.lock().await.alerts.clear();
    }

    /// Remove every alert of one kind
    pub async fn clear_alerts_by_kind(&self, kind: AlertKind) {
        let mut state = self.state.lock().await;
        state.alerts.retain(|alert| alert.kind != kind);
    }

    /// Visible alerts in insertion order
    pub async fn alerts(&self) -> Vec<Alert> {
        self.state.lock().await.alerts.clone()
    }

    fn timeout_for(&self, kind: AlertKind) -> Duration {
        match kind {
            AlertKind::Validation => self.config.validation_timeout,
            _ => self.config.default_timeout,
        }
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
