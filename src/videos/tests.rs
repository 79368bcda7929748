//! Tests for the videos module
//!
//! Store-level coverage: owner scoping, insertion order, and watch-status
//! updates guarded against cross-user tampering.

#[cfg(test)]
mod tests {
    use crate::common::migrations::run_migrations;
    use crate::common::ApiError;
    use crate::videos::models::{Genre, Platform, Video, WatchStatus};
    use crate::videos::store::VideoStore;
    use chrono::Utc;
    use sqlx::SqlitePool;

    async fn test_store() -> VideoStore {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        VideoStore::new(pool)
    }

    fn video(id: &str, owner: &str) -> Video {
        Video {
            id: id.to_string(),
            title: format!("title-{}", id),
            thumbnail: format!("https://img.example.com/{}.jpg", id),
            platform: Platform::Youtube,
            genre: Genre::Music,
            saved_at: Utc::now().to_rfc3339(),
            watch_status: WatchStatus::Unwatched,
            user_id: owner.to_string(),
            description: Some("desc".to_string()),
            original_url: None,
        }
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_owner() {
        let store = test_store().await;
        store
            .insert_many(&[
                video("a1", "alice@example.com"),
                video("b1", "bob@example.com"),
                video("a2", "alice@example.com"),
            ])
            .await
            .unwrap();

        let alice = store.list_for_user("alice@example.com").await.unwrap();
        assert_eq!(
            alice.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
            vec!["a1", "a2"]
        );

        let bob = store.list_for_user("bob@example.com").await.unwrap();
        assert_eq!(bob.len(), 1);

        let nobody = store.list_for_user("nobody@example.com").await.unwrap();
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn records_round_trip_through_the_store() {
        let store = test_store().await;
        let mut original = video("yt123", "alice@example.com");
        original.original_url = Some("https://instagram.com/reel/yt123".to_string());
        store.insert_one(&original).await.unwrap();

        let listed = store.list_for_user("alice@example.com").await.unwrap();
        assert_eq!(listed.len(), 1);
        let got = &listed[0];
        assert_eq!(got.id, "yt123");
        assert_eq!(got.platform, Platform::Youtube);
        assert_eq!(got.genre, Genre::Music);
        assert_eq!(got.watch_status, WatchStatus::Unwatched);
        assert_eq!(got.description.as_deref(), Some("desc"));
        assert_eq!(
            got.original_url.as_deref(),
            Some("https://instagram.com/reel/yt123")
        );
    }

    #[tokio::test]
    async fn update_watch_status_flips_the_flag() {
        let store = test_store().await;
        store.insert_one(&video("v1", "alice@example.com")).await.unwrap();

        store
            .update_watch_status("v1", "alice@example.com", WatchStatus::Watched)
            .await
            .unwrap();

        let listed = store.list_for_user("alice@example.com").await.unwrap();
        assert_eq!(listed[0].watch_status, WatchStatus::Watched);
    }

    #[tokio::test]
    async fn update_scoped_by_owner_rejects_cross_user_tampering() {
        let store = test_store().await;
        store.insert_one(&video("shared-id", "alice@example.com")).await.unwrap();

        // The id exists, but for another owner
        let err = store
            .update_watch_status("shared-id", "bob@example.com", WatchStatus::Watched)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // Alice's record is untouched
        let listed = store.list_for_user("alice@example.com").await.unwrap();
        assert_eq!(listed[0].watch_status, WatchStatus::Unwatched);
    }

    #[tokio::test]
    async fn update_unknown_video_is_not_found() {
        let store = test_store().await;
        let err = store
            .update_watch_status("missing", "alice@example.com", WatchStatus::Watched)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn watch_status_parsing_accepts_only_known_values() {
        assert_eq!(WatchStatus::parse("watched"), Some(WatchStatus::Watched));
        assert_eq!(WatchStatus::parse("unwatched"), Some(WatchStatus::Unwatched));
        assert_eq!(WatchStatus::parse("seen"), None);
        assert_eq!(WatchStatus::parse(""), None);
        assert_eq!(WatchStatus::parse("Watched"), None);
    }

    #[test]
    fn video_serializes_with_original_wire_field_names() {
        let v = video("v1", "alice@example.com");
        let json = serde_json::to_value(&v).unwrap();

        assert_eq!(json["id"], "v1");
        assert_eq!(json["platform"], "youtube");
        assert_eq!(json["genre"], "music");
        assert_eq!(json["watchStatus"], "unwatched");
        assert_eq!(json["userId"], "alice@example.com");
        assert!(json.get("savedAt").is_some());
        // original_url is omitted when absent
        assert!(json.get("originalUrl").is_none());
    }
}
