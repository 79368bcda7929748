//! Video data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Source platform of a saved video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
}

/// Inferred genre of a video
///
/// Ten fixed categories plus `Other`, which doubles as the fallback whenever
/// classification fails or returns a label outside the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Genre {
    Music,
    Gaming,
    Education,
    Technology,
    Lifestyle,
    Sports,
    News,
    Arts,
    Science,
    Food,
    Other,
}

/// Watch status of a saved video, mutable after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum WatchStatus {
    Watched,
    Unwatched,
}

impl WatchStatus {
    /// Parse a client-supplied status string
    pub fn parse(s: &str) -> Option<WatchStatus> {
        match s {
            "watched" => Some(WatchStatus::Watched),
            "unwatched" => Some(WatchStatus::Unwatched),
            _ => None,
        }
    }
}

/// Canonical video record
///
/// `id` is the platform-native identifier and is only unique within a
/// platform. Ownership is by value: `user_id` holds the owner's email.
/// Timestamps are stored and serialized as RFC 3339 strings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "id")]
    #[sqlx(rename = "video_id")]
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub platform: Platform,
    pub genre: Genre,
    pub saved_at: String,
    pub watch_status: WatchStatus,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
}

/// Request body for `POST /api/videos/youtube`
#[derive(Deserialize)]
pub struct PlaylistRequest {
    pub playlist_url: String,
}

/// Request body for `POST /api/videos/instagram`
#[derive(Deserialize)]
pub struct InstagramRequest {
    pub url: String,
}

/// Query parameters for `PUT /api/videos/:video_id/watch-status`
#[derive(Deserialize)]
pub struct WatchStatusParams {
    pub status: String,
}

/// Summary returned after a playlist ingestion
#[derive(Serialize)]
pub struct PlaylistSummary {
    pub message: String,
    pub count: usize,
    pub videos: Vec<Video>,
}

/// Trimmed per-video summary returned after an Instagram ingestion
///
/// Intentionally omits thumbnail and description from the response payload.
#[derive(Serialize)]
pub struct InstagramVideoSummary {
    pub id: String,
    pub title: String,
    pub platform: Platform,
    pub genre: Genre,
}

#[derive(Serialize)]
pub struct InstagramSummary {
    pub message: String,
    pub video: InstagramVideoSummary,
}
