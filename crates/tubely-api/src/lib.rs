//! Tubely HTTP API
//!
//! Authenticated upload endpoints for videos and thumbnails, built on axum.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
