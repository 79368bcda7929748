// src/services/sweeper.rs
//! Background sweep flagging unwatched videos older than a threshold

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::notifications::Notifier;
use crate::common::ApiError;
use crate::videos::VideoStore;

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const STALE_AFTER_DAYS: i64 = 14;

const INITIAL_BACKOFF: Duration = Duration::from_secs(60);
const MAX_BACKOFF: Duration = Duration::from_secs(60 * 60);

/// Supervised stale-video sweeper
///
/// A sweep failure is logged and retried with capped exponential backoff
/// instead of killing the task, and the loop exits cleanly when the
/// shutdown signal fires.
pub struct StaleVideoSweeper {
    store: Arc<VideoStore>,
    notifier: Arc<Notifier>,
    interval: Duration,
    stale_after: ChronoDuration,
}

impl StaleVideoSweeper {
    pub fn new(store: Arc<VideoStore>, notifier: Arc<Notifier>) -> Self {
        Self {
            store,
            notifier,
            interval: SWEEP_INTERVAL,
            stale_after: ChronoDuration::days(STALE_AFTER_DAYS),
        }
    }

    #[cfg(test)]
    fn with_schedule(mut self, interval: Duration, stale_after: ChronoDuration) -> Self {
        self.interval = interval;
        self.stale_after = stale_after;
        self
    }

    /// Spawn the sweep loop on the runtime
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                stale_after_days = self.stale_after.num_days(),
                "Stale-video sweeper started"
            );

            let mut backoff = INITIAL_BACKOFF;
            loop {
                let wait = match self.sweep_once().await {
                    Ok(flagged) => {
                        info!(flagged, "Sweep completed");
                        backoff = INITIAL_BACKOFF;
                        self.interval
                    }
                    Err(e) => {
                        error!(error = %e, "Sweep failed, retrying with backoff");
                        let wait = backoff;
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                        wait
                    }
                };

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = shutdown.changed() => {
                        info!("Stale-video sweeper shutting down");
                        return;
                    }
                }
            }
        })
    }

    /// One sweep pass: flag every unwatched video past the threshold
    pub async fn sweep_once(&self) -> Result<usize, ApiError> {
        let cutoff = (Utc::now() - self.stale_after).to_rfc3339();
        let stale = self.store.stale_unwatched(&cutoff).await?;

        for video in &stale {
            self.notifier
                .notify_unwatched(&video.user_id, &video.title)
                .await;
        }

        Ok(stale.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::run_migrations;
    use crate::videos::{Genre, Platform, Video, WatchStatus};
    use sqlx::SqlitePool;

    fn video(id: &str, owner: &str, saved_at: String, status: WatchStatus) -> Video {
        Video {
            id: id.to_string(),
            title: format!("title-{}", id),
            thumbnail: String::new(),
            platform: Platform::Youtube,
            genre: Genre::Other,
            saved_at,
            watch_status: status,
            user_id: owner.to_string(),
            description: None,
            original_url: None,
        }
    }

    async fn test_store() -> Arc<VideoStore> {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        Arc::new(VideoStore::new(pool))
    }

    #[tokio::test]
    async fn flags_only_stale_unwatched_videos() {
        let store = test_store().await;
        let notifier = Arc::new(Notifier::new());

        let old = (Utc::now() - ChronoDuration::days(20)).to_rfc3339();
        let fresh = Utc::now().to_rfc3339();

        store
            .insert_many(&[
                video("stale", "a@b.com", old.clone(), WatchStatus::Unwatched),
                video("fresh", "a@b.com", fresh, WatchStatus::Unwatched),
                video("old-but-watched", "a@b.com", old, WatchStatus::Watched),
            ])
            .await
            .unwrap();

        let sweeper = StaleVideoSweeper::new(store, notifier.clone());
        let flagged = sweeper.sweep_once().await.unwrap();

        assert_eq!(flagged, 1);
        let intents = notifier.recorded_intents().await;
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].user_email, "a@b.com");
        assert_eq!(intents[0].video_title, "title-stale");
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_loop() {
        let store = test_store().await;
        let notifier = Arc::new(Notifier::new());

        let sweeper = StaleVideoSweeper::new(store, notifier)
            .with_schedule(Duration::from_secs(3600), ChronoDuration::days(14));

        let (tx, rx) = watch::channel(false);
        let handle = sweeper.spawn(rx);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper should exit promptly on shutdown")
            .unwrap();
    }
}
