//! Eye-image analysis service for the Ocula client
//!
//! Sends eye images to the classification service, turns its raw scores
//! into an [`AnalysisResult`] with advice, and manages the user's stored
//! images and history through the authenticated pipeline.

pub mod identity;
pub mod models;
pub mod recommendations;
pub mod service;

pub use models::{AnalysisRecord, AnalysisResult, Condition};
pub use service::{AnalysisService, AnalysisSettings, EyeImage};
