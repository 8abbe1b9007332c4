//! Tubely database layer
//!
//! Repositories over PostgreSQL. Schema lives in the workspace `migrations/` directory.

pub mod video;

pub use video::{PgVideoRepository, VideoRepository};
