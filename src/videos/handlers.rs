//! Video library handlers

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{
    InstagramRequest, InstagramSummary, InstagramVideoSummary, PlaylistRequest, PlaylistSummary,
    Video, WatchStatus, WatchStatusParams,
};
use crate::auth::AuthedUser;
use crate::common::{safe_email_log, ApiError, AppState};

/// GET /api/videos
///
/// The caller's library, scoped to their identity, in insertion order.
pub async fn get_videos(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
) -> Result<Json<Vec<Video>>, ApiError> {
    let state = state_lock.read().await.clone();
    let videos = state.video_store.list_for_user(&user.email).await?;
    Ok(Json(videos))
}

/// POST /api/videos/youtube
///
/// # Request Body
/// ```json
/// { "playlist_url": "https://www.youtube.com/playlist?list=PL..." }
/// ```
pub async fn add_youtube_playlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(payload): Json<PlaylistRequest>,
) -> Result<Json<PlaylistSummary>, ApiError> {
    let state = state_lock.read().await.clone();

    let videos = state
        .youtube
        .ingest_playlist(&payload.playlist_url, &user.email)
        .await?;

    state.video_store.insert_many(&videos).await?;

    info!(
        owner = %safe_email_log(&user.email),
        count = videos.len(),
        "Saved YouTube playlist"
    );

    Ok(Json(PlaylistSummary {
        message: format!("Successfully added {} videos from playlist", videos.len()),
        count: videos.len(),
        videos,
    }))
}

/// POST /api/videos/instagram
///
/// # Request Body
/// ```json
/// { "url": "https://www.instagram.com/reel/ABC123/" }
/// ```
pub async fn add_instagram_video(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(payload): Json<InstagramRequest>,
) -> Result<Json<InstagramSummary>, ApiError> {
    let state = state_lock.read().await.clone();

    let video = state.instagram.ingest_media(&payload.url, &user.email).await?;

    state.video_store.insert_one(&video).await?;

    info!(
        owner = %safe_email_log(&user.email),
        video_id = %video.id,
        "Saved Instagram video"
    );

    Ok(Json(InstagramSummary {
        message: "Successfully added Instagram video".to_string(),
        video: InstagramVideoSummary {
            id: video.id,
            title: video.title,
            platform: video.platform,
            genre: video.genre,
        },
    }))
}

/// PUT /api/videos/:video_id/watch-status?status=watched|unwatched
pub async fn update_watch_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(video_id): Path<String>,
    Query(params): Query<WatchStatusParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let status = WatchStatus::parse(&params.status)
        .ok_or_else(|| ApiError::Validation("Invalid watch status".to_string()))?;

    state
        .video_store
        .update_watch_status(&video_id, &user.email, status)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Watch status updated" })))
}
