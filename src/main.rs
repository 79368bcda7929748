// src/main.rs
use axum::{extract::Extension, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{watch, RwLock},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod common;
mod services;
mod videos;

use common::AppState;
use services::{
    GenreClassifier, InstagramIngester, LoginRateLimiter, Notifier, StaleVideoSweeper,
    YouTubeIngester,
};
use videos::VideoStore;

const DEFAULT_CLASSIFIER_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://vidvault.db".to_string());
    let jwt_secret =
        env::var("SECRET_KEY").unwrap_or_else(|_| "replace_with_strong_secret".to_string());

    // Missing third-party credentials degrade that one integration to a
    // NotConfigured response; they are never a startup failure.
    let youtube_api_key = env::var("YOUTUBE_API_KEY").ok();
    let instagram_access_token = env::var("INSTAGRAM_ACCESS_TOKEN").ok();

    let classifier_url =
        env::var("CLASSIFIER_API_URL").unwrap_or_else(|_| DEFAULT_CLASSIFIER_URL.to_string());
    let classifier_token = env::var("CLASSIFIER_API_TOKEN").ok();

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().build()?;

    let classifier = Arc::new(GenreClassifier::new(
        http_client.clone(),
        classifier_url,
        classifier_token,
    ));
    info!("GenreClassifier initialized");

    let login_limiter = Arc::new(LoginRateLimiter::new());

    let video_store = Arc::new(VideoStore::new(pool.clone()));

    let youtube = Arc::new(YouTubeIngester::new(
        http_client.clone(),
        youtube_api_key,
        classifier.clone(),
    ));
    let instagram = Arc::new(InstagramIngester::new(
        http_client.clone(),
        instagram_access_token,
        classifier.clone(),
    )?);
    info!("Platform ingesters initialized");

    // ========================================================================
    // BACKGROUND TASKS
    // ========================================================================

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let notifier = Arc::new(Notifier::new());
    let _sweeper = StaleVideoSweeper::new(video_store.clone(), notifier).spawn(shutdown_rx);
    info!("Stale-video sweeper started");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        jwt_secret,
        login_limiter,
        video_store,
        youtube,
        instagram,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(videos::videos_routes())
        .layer(Extension(shared.clone()))
        .layer({
            let cors_origins = std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    })
    .await?;

    Ok(())
}
