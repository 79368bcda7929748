// src/services/instagram.rs
//! Instagram Graph API media ingestion

use chrono::Utc;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::classifier::GenreClassifier;
use crate::common::ApiError;
use crate::videos::{Platform, Video, WatchStatus};

const GRAPH_BASE_URL: &str = "https://graph.instagram.com/v12.0";
const MEDIA_FIELDS: &str = "id,media_type,media_url,thumbnail_url,permalink,caption";
const TITLE_MAX_CHARS: usize = 100;

// reel/p path segment with the media shortcode
const URL_PATTERN: &str = r"^https?://(?:www\.)?instagram\.com/(?:reel|p)/([a-zA-Z0-9_-]+)/?";

#[derive(Debug, thiserror::Error)]
pub enum InstagramError {
    #[error("Invalid Instagram URL")]
    InvalidUrl,
    #[error("Instagram integration requires API setup. Please configure INSTAGRAM_ACCESS_TOKEN")]
    NotConfigured,
    #[error("Failed to fetch Instagram video. Please check the URL and try again.")]
    FetchFailed,
    #[error("URL must point to a video or reel")]
    NotAVideo,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<InstagramError> for ApiError {
    fn from(e: InstagramError) -> Self {
        match e {
            InstagramError::InvalidUrl | InstagramError::NotAVideo => {
                ApiError::Validation(e.to_string())
            }
            InstagramError::NotConfigured => ApiError::NotConfigured(e.to_string()),
            InstagramError::FetchFailed => ApiError::Upstream {
                status: StatusCode::BAD_REQUEST,
                message: e.to_string(),
            },
            InstagramError::Network(err) => ApiError::Upstream {
                status: StatusCode::BAD_REQUEST,
                message: format!("Failed to reach Instagram API: {}", err),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct MediaResponse {
    id: String,
    media_type: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
    permalink: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InstagramIngester {
    http: Client,
    access_token: Option<String>,
    classifier: Arc<GenreClassifier>,
    url_pattern: Regex,
    graph_url: String,
}

impl InstagramIngester {
    pub fn new(
        http: Client,
        access_token: Option<String>,
        classifier: Arc<GenreClassifier>,
    ) -> anyhow::Result<Self> {
        if access_token.is_none() {
            warn!("INSTAGRAM_ACCESS_TOKEN not set; Instagram ingestion will report NotConfigured");
        }
        Ok(Self {
            http,
            access_token,
            classifier,
            url_pattern: Regex::new(URL_PATTERN)?,
            graph_url: GRAPH_BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_api_url(mut self, graph_url: String) -> Self {
        self.graph_url = graph_url;
        self
    }

    /// Fetch a single reel/post and produce a canonical video record
    ///
    /// The URL is validated before any configuration check, so a malformed
    /// URL is reported as a user error even on unconfigured deployments.
    pub async fn ingest_media(
        &self,
        url: &str,
        owner_email: &str,
    ) -> Result<Video, InstagramError> {
        let media_id = self.extract_media_id(url).ok_or(InstagramError::InvalidUrl)?;

        let access_token = self
            .access_token
            .as_deref()
            .ok_or(InstagramError::NotConfigured)?;

        debug!(media_id = %media_id, "Fetching Instagram media");

        let response = self
            .http
            .get(format!("{}/{}", self.graph_url, media_id))
            .query(&[("fields", MEDIA_FIELDS), ("access_token", access_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(http_status = %response.status(), "Instagram media request failed");
            return Err(InstagramError::FetchFailed);
        }

        let media: MediaResponse = response.json().await?;

        if !is_video_media(&media.media_type) {
            return Err(InstagramError::NotAVideo);
        }

        let caption = media.caption.unwrap_or_default();

        // No separate title on Instagram: classify from the caption alone
        let genre = self.classifier.classify(&caption, "").await;

        let video = Video {
            id: media.id,
            title: truncate_title(&caption),
            thumbnail: media.thumbnail_url.unwrap_or_default(),
            platform: Platform::Instagram,
            genre,
            saved_at: Utc::now().to_rfc3339(),
            watch_status: WatchStatus::Unwatched,
            user_id: owner_email.to_string(),
            description: Some(caption),
            original_url: media.permalink,
        };

        info!(video_id = %video.id, "Ingested Instagram video");
        Ok(video)
    }

    /// Extract the media shortcode from a reel/post URL
    pub fn extract_media_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.url_pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Only VIDEO and REELS media can be saved
fn is_video_media(media_type: &str) -> bool {
    matches!(media_type, "VIDEO" | "REELS")
}

/// Truncate a caption to the title limit, with an ellipsis when cut
fn truncate_title(caption: &str) -> String {
    if caption.chars().count() > TITLE_MAX_CHARS {
        let truncated: String = caption.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        caption.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    fn test_ingester() -> InstagramIngester {
        let classifier = Arc::new(GenreClassifier::new(
            Client::new(),
            "http://127.0.0.1:1/unused".to_string(),
            None,
        ));
        InstagramIngester::new(Client::new(), None, classifier).unwrap()
    }

    #[test]
    fn extracts_id_from_reel_url() {
        let ingester = test_ingester();
        assert_eq!(
            ingester.extract_media_id("https://instagram.com/reel/ABC123"),
            Some("ABC123")
        );
        assert_eq!(
            ingester.extract_media_id("https://www.instagram.com/p/xYz_-9/?igsh=1"),
            Some("xYz_-9")
        );
    }

    #[test]
    fn rejects_non_media_urls() {
        let ingester = test_ingester();
        assert_eq!(
            ingester.extract_media_id("https://instagram.com/some_user"),
            None
        );
        assert_eq!(
            ingester.extract_media_id("https://example.com/reel/ABC123"),
            None
        );
    }

    #[tokio::test]
    async fn unconfigured_token_is_reported_distinctly() {
        let ingester = test_ingester();
        let err = ingester
            .ingest_media("https://instagram.com/reel/ABC123", "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, InstagramError::NotConfigured));
    }

    #[test]
    fn image_media_is_not_a_video() {
        assert!(!is_video_media("IMAGE"));
        assert!(!is_video_media("CAROUSEL_ALBUM"));
        assert!(is_video_media("VIDEO"));
        assert!(is_video_media("REELS"));
    }

    #[test]
    fn short_captions_are_kept_verbatim() {
        assert_eq!(truncate_title("hello world"), "hello world");
    }

    #[test]
    fn long_captions_are_truncated_with_ellipsis() {
        let caption = "x".repeat(150);
        let title = truncate_title(&caption);
        assert_eq!(title.chars().count(), 103);
        assert!(title.ends_with("..."));
    }

    // A throwaway local Graph API returning a fixed status and body
    async fn mock_graph(status: u16, body: &'static str) -> String {
        use axum::{routing::get, Router};

        let app = Router::new().route(
            "/:media_id",
            get(move || async move {
                (axum::http::StatusCode::from_u16(status).unwrap(), body)
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn configured_ingester(graph_url: String) -> InstagramIngester {
        let classifier = Arc::new(GenreClassifier::new(
            Client::new(),
            "http://127.0.0.1:1/unused".to_string(),
            None,
        ));
        InstagramIngester::new(Client::new(), Some("test-token".to_string()), classifier)
            .unwrap()
            .with_api_url(graph_url)
    }

    #[tokio::test]
    async fn upstream_failure_is_a_fetch_failure() {
        let graph = mock_graph(400, r#"{"error": "bad media id"}"#).await;
        let err = configured_ingester(graph)
            .ingest_media("https://instagram.com/reel/ABC123", "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, InstagramError::FetchFailed));
    }

    #[tokio::test]
    async fn image_media_is_rejected_end_to_end() {
        let graph = mock_graph(200, r#"{"id": "1", "media_type": "IMAGE"}"#).await;
        let err = configured_ingester(graph)
            .ingest_media("https://instagram.com/p/ABC123", "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, InstagramError::NotAVideo));
    }

    #[tokio::test]
    async fn reel_media_becomes_an_unwatched_record() {
        let body = r#"{
            "id": "17900000000000000",
            "media_type": "REELS",
            "thumbnail_url": "https://img.example.com/t.jpg",
            "permalink": "https://www.instagram.com/reel/ABC123/",
            "caption": "a short caption"
        }"#;
        let graph = mock_graph(200, body).await;

        let video = configured_ingester(graph)
            .ingest_media("https://instagram.com/reel/ABC123", "a@b.com")
            .await
            .unwrap();

        assert_eq!(video.id, "17900000000000000");
        assert_eq!(video.title, "a short caption");
        assert_eq!(video.platform, Platform::Instagram);
        assert_eq!(video.watch_status, WatchStatus::Unwatched);
        assert_eq!(
            video.original_url.as_deref(),
            Some("https://www.instagram.com/reel/ABC123/")
        );
    }
}
