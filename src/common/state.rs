// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::{InstagramIngester, LoginRateLimiter, YouTubeIngester};
use crate::videos::VideoStore;

/// Application state containing database pool, services, and configuration
///
/// The classifier is not carried here: only the ingesters talk to it, and
/// they hold their own handle.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub login_limiter: Arc<LoginRateLimiter>,
    pub video_store: Arc<VideoStore>,
    pub youtube: Arc<YouTubeIngester>,
    pub instagram: Arc<InstagramIngester>,
}
