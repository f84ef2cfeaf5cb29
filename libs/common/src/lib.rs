//! Common library for the Ocula client
//!
//! This crate provides the pieces shared by every service of the client:
//! configuration, the error taxonomy, the persisted session, the
//! authenticated request pipeline, transient alerts, navigation and input
//! validation.

pub mod alerts;
pub mod config;
pub mod error;
pub mod navigation;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod timestamp;
pub mod validation;

/// Example wiring of the session store and request pipeline
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use common::config::ClientConfig;
/// use common::navigation::Navigator;
/// use common::pipeline::{ApiClient, ApiRequest};
/// use common::session::SessionStore;
/// use common::storage::FileStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::from_env()?;
///     let session = SessionStore::new(Arc::new(FileStore::new(&config.session_file)));
///     let client = ApiClient::new(
///         &config.auth_base_url,
///         session,
///         Navigator::default(),
///         config.request_timeout(),
///     )?;
///     let profile = client.send(ApiRequest::get("/users/profile")).await?;
///     println!("{:?}", profile.body);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
