//! Authentication service for the Ocula client
//!
//! Login, registration, logout and profile management on top of the
//! authenticated request pipeline from the `common` crate.

pub mod models;
pub mod service;

pub use models::{ProfileData, ProfileUpdate, Registration};
pub use service::AuthService;
