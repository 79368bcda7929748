//! Persistence layer for video records, always scoped by owner

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::models::{Video, WatchStatus};
use crate::common::ApiError;

pub struct VideoStore {
    db: SqlitePool,
}

const VIDEO_COLUMNS: &str = "video_id, title, thumbnail, platform, genre, saved_at, \
                             watch_status, user_id, description, original_url";

impl VideoStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All videos owned by `owner_email`, in store-native insertion order
    pub async fn list_for_user(&self, owner_email: &str) -> Result<Vec<Video>, ApiError> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {} FROM videos WHERE user_id = ?",
            VIDEO_COLUMNS
        ))
        .bind(owner_email)
        .fetch_all(&self.db)
        .await?;

        debug!(owner = %crate::common::safe_email_log(owner_email), count = videos.len(), "Listed videos");
        Ok(videos)
    }

    pub async fn insert_one(&self, video: &Video) -> Result<(), ApiError> {
        sqlx::query(&format!(
            "INSERT INTO videos ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            VIDEO_COLUMNS
        ))
        .bind(&video.id)
        .bind(&video.title)
        .bind(&video.thumbnail)
        .bind(video.platform)
        .bind(video.genre)
        .bind(&video.saved_at)
        .bind(video.watch_status)
        .bind(&video.user_id)
        .bind(&video.description)
        .bind(&video.original_url)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Insert a batch of freshly ingested records
    ///
    /// No cross-document transaction is required by the store contract, so
    /// records are inserted one at a time.
    pub async fn insert_many(&self, videos: &[Video]) -> Result<(), ApiError> {
        for video in videos {
            self.insert_one(video).await?;
        }
        info!(count = videos.len(), "Inserted video batch");
        Ok(())
    }

    /// Update watch status, scoped by both video id and owner
    ///
    /// Scoping by owner as well as id prevents cross-user tampering: a video
    /// id that exists for a different owner reports `NotFound` here.
    pub async fn update_watch_status(
        &self,
        video_id: &str,
        owner_email: &str,
        status: WatchStatus,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE videos SET watch_status = ? WHERE video_id = ? AND user_id = ?",
        )
        .bind(status)
        .bind(video_id)
        .bind(owner_email)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Video not found".to_string()));
        }

        Ok(())
    }

    /// Unwatched videos saved at or before `cutoff` (RFC 3339), for the sweeper
    pub async fn stale_unwatched(&self, cutoff: &str) -> Result<Vec<Video>, ApiError> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {} FROM videos WHERE watch_status = 'unwatched' AND saved_at <= ?",
            VIDEO_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.db)
        .await?;

        Ok(videos)
    }
}
