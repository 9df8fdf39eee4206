//! Client-side access layer for the story report backend.
//!
//! Covers account registration and login, story listing and upload, and web
//! push subscription management. Every operation goes through one
//! `ApiClient` and reports results in a uniform `NormalizedResult` shape.

pub mod api;
pub mod config;

pub use api::{ApiClient, ApiError, NormalizedResult};
pub use config::ClientConfig;
