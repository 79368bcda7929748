// src/services/youtube.rs
//! YouTube Data API v3 playlist ingestion

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::classifier::GenreClassifier;
use crate::common::ApiError;
use crate::videos::{Platform, Video, WatchStatus};

const PLAYLIST_ITEMS_URL: &str = "https://www.googleapis.com/youtube/v3/playlistItems";
const MAX_RESULTS: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum YouTubeError {
    #[error("Invalid YouTube playlist URL")]
    InvalidUrl,
    #[error("YouTube API key is invalid or quota exceeded")]
    QuotaOrAuth,
    #[error("Failed to fetch playlist. Please check the URL and try again.")]
    FetchFailed,
    #[error("No videos found in playlist")]
    NoVideosFound,
    #[error("YouTube integration requires API setup. Please configure YOUTUBE_API_KEY")]
    NotConfigured,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<YouTubeError> for ApiError {
    fn from(e: YouTubeError) -> Self {
        match e {
            YouTubeError::InvalidUrl => ApiError::Validation(e.to_string()),
            YouTubeError::QuotaOrAuth => ApiError::Upstream {
                status: StatusCode::FORBIDDEN,
                message: e.to_string(),
            },
            YouTubeError::FetchFailed => ApiError::Upstream {
                status: StatusCode::BAD_REQUEST,
                message: e.to_string(),
            },
            YouTubeError::NoVideosFound => ApiError::NotFound(e.to_string()),
            YouTubeError::NotConfigured => ApiError::NotConfigured(e.to_string()),
            YouTubeError::Network(err) => ApiError::Upstream {
                status: StatusCode::BAD_REQUEST,
                message: format!("Failed to reach YouTube API: {}", err),
            },
        }
    }
}

// Playlist items response structure
#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    items: Option<Vec<PlaylistItem>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemSnippet {
    #[serde(rename = "resourceId")]
    resource_id: ResourceId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct ResourceId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    maxres: Option<Thumbnail>,
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Clone)]
pub struct YouTubeIngester {
    http: Client,
    api_key: Option<String>,
    classifier: Arc<GenreClassifier>,
    api_url: String,
}

impl YouTubeIngester {
    pub fn new(http: Client, api_key: Option<String>, classifier: Arc<GenreClassifier>) -> Self {
        if api_key.is_none() {
            warn!("YOUTUBE_API_KEY not set; YouTube ingestion will report NotConfigured");
        }
        Self {
            http,
            api_key,
            classifier,
            api_url: PLAYLIST_ITEMS_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Fetch a playlist and produce canonical video records for `owner_email`
    ///
    /// Every record is created unwatched, stamped with the ingestion time,
    /// and classified individually. Classification failures degrade the
    /// genre, never the ingestion.
    pub async fn ingest_playlist(
        &self,
        playlist_url: &str,
        owner_email: &str,
    ) -> Result<Vec<Video>, YouTubeError> {
        let playlist_id =
            extract_playlist_id(playlist_url).ok_or(YouTubeError::InvalidUrl)?;

        let api_key = self.api_key.as_deref().ok_or(YouTubeError::NotConfigured)?;

        debug!(playlist_id = %playlist_id, "Fetching YouTube playlist items");

        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", &MAX_RESULTS.to_string()),
                ("key", api_key),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::FORBIDDEN => return Err(YouTubeError::QuotaOrAuth),
            status if !status.is_success() => {
                warn!(http_status = %status, "YouTube playlistItems request failed");
                return Err(YouTubeError::FetchFailed);
            }
            _ => {}
        }

        let body: PlaylistItemsResponse = response.json().await?;
        let items = body.items.unwrap_or_default();
        if items.is_empty() {
            return Err(YouTubeError::NoVideosFound);
        }

        let saved_at = Utc::now().to_rfc3339();
        let mut videos = Vec::with_capacity(items.len());

        for item in items {
            let snippet = item.snippet;
            let genre = self
                .classifier
                .classify(&snippet.title, &snippet.description)
                .await;

            videos.push(Video {
                id: snippet.resource_id.video_id,
                title: snippet.title,
                thumbnail: best_thumbnail(&snippet.thumbnails),
                platform: Platform::Youtube,
                genre,
                saved_at: saved_at.clone(),
                watch_status: WatchStatus::Unwatched,
                user_id: owner_email.to_string(),
                description: Some(snippet.description),
                original_url: None,
            });
        }

        info!(count = videos.len(), "Ingested YouTube playlist");
        Ok(videos)
    }
}

/// Extract the playlist id: the substring between `list=` and the next `&`
pub fn extract_playlist_id(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("list=")?;
    Some(rest.split('&').next().unwrap_or(rest))
}

/// Best-available thumbnail: maxres > high > medium > default
fn best_thumbnail(thumbnails: &Thumbnails) -> String {
    thumbnails
        .maxres
        .as_ref()
        .or(thumbnails.high.as_ref())
        .or(thumbnails.medium.as_ref())
        .or(thumbnails.default.as_ref())
        .map(|t| t.url.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_playlist_id_from_url() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PLabc123"),
            Some("PLabc123")
        );
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/watch?v=xyz&list=PLabc123&index=2"),
            Some("PLabc123")
        );
    }

    #[test]
    fn url_without_list_param_is_invalid() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/watch?v=xyz"),
            None
        );
    }

    #[test]
    fn quota_errors_keep_their_upstream_status() {
        match ApiError::from(YouTubeError::QuotaOrAuth) {
            ApiError::Upstream { status, .. } => assert_eq!(status, StatusCode::FORBIDDEN),
            other => panic!("expected Upstream, got {}", other),
        }
        match ApiError::from(YouTubeError::FetchFailed) {
            ApiError::Upstream { status, .. } => assert_eq!(status, StatusCode::BAD_REQUEST),
            other => panic!("expected Upstream, got {}", other),
        }
        assert!(matches!(
            ApiError::from(YouTubeError::NoVideosFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(YouTubeError::NotConfigured),
            ApiError::NotConfigured(_)
        ));
    }

    #[test]
    fn thumbnail_preference_order() {
        let thumb = |url: &str| {
            Some(Thumbnail {
                url: url.to_string(),
            })
        };

        let all = Thumbnails {
            maxres: thumb("maxres"),
            high: thumb("high"),
            medium: thumb("medium"),
            default: thumb("default"),
        };
        assert_eq!(best_thumbnail(&all), "maxres");

        let no_maxres = Thumbnails {
            maxres: None,
            high: thumb("high"),
            medium: thumb("medium"),
            default: thumb("default"),
        };
        assert_eq!(best_thumbnail(&no_maxres), "high");

        let only_default = Thumbnails {
            maxres: None,
            high: None,
            medium: None,
            default: thumb("default"),
        };
        assert_eq!(best_thumbnail(&only_default), "default");

        assert_eq!(best_thumbnail(&Thumbnails::default()), "");
    }

    // A throwaway local API returning a fixed status and body
    async fn mock_api(status: u16, body: &'static str) -> String {
        use axum::{routing::get, Router};

        let app = Router::new().route(
            "/playlistItems",
            get(move || async move {
                (axum::http::StatusCode::from_u16(status).unwrap(), body)
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/playlistItems", addr)
    }

    fn test_ingester(api_url: String) -> YouTubeIngester {
        // The classifier endpoint is unreachable, so every item falls back
        // to Genre::Other
        let classifier = Arc::new(GenreClassifier::new(
            Client::new(),
            "http://127.0.0.1:1/unused".to_string(),
            None,
        ));
        YouTubeIngester::new(Client::new(), Some("test-key".to_string()), classifier)
            .with_api_url(api_url)
    }

    const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PLabc123";

    #[tokio::test]
    async fn forbidden_response_is_a_quota_error() {
        let api = mock_api(403, r#"{"error": "quotaExceeded"}"#).await;
        let err = test_ingester(api)
            .ingest_playlist(PLAYLIST_URL, "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, YouTubeError::QuotaOrAuth));
    }

    #[tokio::test]
    async fn server_error_is_a_fetch_failure() {
        let api = mock_api(500, "").await;
        let err = test_ingester(api)
            .ingest_playlist(PLAYLIST_URL, "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, YouTubeError::FetchFailed));
    }

    #[tokio::test]
    async fn empty_playlist_is_no_videos_found() {
        let api = mock_api(200, r#"{"items": []}"#).await;
        let err = test_ingester(api)
            .ingest_playlist(PLAYLIST_URL, "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, YouTubeError::NoVideosFound));
    }

    #[tokio::test]
    async fn playlist_items_become_unwatched_records() {
        let body = r#"{"items": [{"snippet": {
            "resourceId": {"videoId": "vid1"},
            "title": "A title",
            "description": "a description",
            "thumbnails": {"high": {"url": "https://img.example.com/hi.jpg"}}
        }}]}"#;
        let api = mock_api(200, body).await;

        let videos = test_ingester(api)
            .ingest_playlist(PLAYLIST_URL, "a@b.com")
            .await
            .unwrap();

        assert_eq!(videos.len(), 1);
        let video = &videos[0];
        assert_eq!(video.id, "vid1");
        assert_eq!(video.title, "A title");
        assert_eq!(video.thumbnail, "https://img.example.com/hi.jpg");
        assert_eq!(video.platform, Platform::Youtube);
        assert_eq!(video.genre, crate::videos::Genre::Other);
        assert_eq!(video.watch_status, WatchStatus::Unwatched);
        assert_eq!(video.user_id, "a@b.com");
    }
}
