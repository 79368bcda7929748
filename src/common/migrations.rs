// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use tracing::info;

/// Run all database migrations
///
/// Idempotent: every statement is CREATE ... IF NOT EXISTS, so this is safe
/// to run on every startup (and against in-memory pools in tests).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_user_tables(pool).await?;
    create_video_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");

    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            email TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            hashed_password TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_video_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // video_id is only unique within a platform, and the same video may be
    // saved by several users, so the implicit rowid stays the primary key.
    // rowid also provides the insertion order that listing relies on.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            video_id TEXT NOT NULL,
            title TEXT NOT NULL,
            thumbnail TEXT NOT NULL,
            platform TEXT NOT NULL,
            genre TEXT NOT NULL,
            saved_at TEXT NOT NULL,
            watch_status TEXT NOT NULL,
            user_id TEXT NOT NULL,
            description TEXT,
            original_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_videos_user_id ON videos(user_id)")
        .execute(pool)
        .await?;

    // The sweeper filters on status and age
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_videos_watch_status ON videos(watch_status, saved_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
