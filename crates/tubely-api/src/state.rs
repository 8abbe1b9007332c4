//! Shared application state handed to every handler.

use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::VideoPipeline;
use tubely_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    /// Processed videos, partitioned by orientation
    pub storage: Arc<dyn Storage>,
    /// Thumbnails, served from `/assets`
    pub assets: Arc<dyn Storage>,
    pub pipeline: Arc<VideoPipeline>,
}
