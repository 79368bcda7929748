//! Video library routes

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

/// Creates and returns the video library router
///
/// # Routes (all bearer-auth)
/// - `GET /api/videos` - List the caller's saved videos
/// - `POST /api/videos/youtube` - Ingest a YouTube playlist
/// - `POST /api/videos/instagram` - Ingest an Instagram reel/post
/// - `PUT /api/videos/:video_id/watch-status` - Update watch status
pub fn videos_routes() -> Router {
    Router::new()
        .route("/api/videos", get(handlers::get_videos))
        .route("/api/videos/youtube", post(handlers::add_youtube_playlist))
        .route(
            "/api/videos/instagram",
            post(handlers::add_instagram_video),
        )
        .route(
            "/api/videos/:video_id/watch-status",
            put(handlers::update_watch_status),
        )
}
