// src/services/notifications.rs
//! Notification collaborator for the stale-video sweeper
//!
//! Delivery is stubbed: intents are logged and held in a bounded buffer of
//! the most recent entries. The sweeper revisits the same stale videos every
//! pass, so the buffer must not grow with repeated sweeps.

use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::info;

const MAX_RECORDED_INTENTS: usize = 256;

/// A notification the system intends to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub user_email: String,
    pub video_title: String,
}

#[derive(Debug, Default)]
pub struct Notifier {
    intents: RwLock<VecDeque<NotificationIntent>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the intent to remind `user_email` about an unwatched video
    ///
    /// When the buffer is full the oldest intent is dropped; the log line is
    /// the durable trace.
    pub async fn notify_unwatched(&self, user_email: &str, video_title: &str) {
        info!(
            user = %crate::common::safe_email_log(user_email),
            title = %video_title,
            "Recording unwatched-video notification intent"
        );

        let mut intents = self.intents.write().await;
        while intents.len() >= MAX_RECORDED_INTENTS {
            intents.pop_front();
        }
        intents.push_back(NotificationIntent {
            user_email: user_email.to_string(),
            video_title: video_title.to_string(),
        });
    }

    /// Intents recorded so far, oldest first
    pub async fn recorded_intents(&self) -> Vec<NotificationIntent> {
        self.intents.read().await.iter().cloned().collect()
    }
}
