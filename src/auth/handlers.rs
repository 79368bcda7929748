//! Authentication handlers

use axum::{
    extract::{ConnectInfo, Extension, Json},
    http::HeaderMap,
    Form,
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{LoginForm, LoginResponse, RegisterRequest, RegisterResponse, User, UserInfo};
use super::{password, tokens};
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::{LoginRateLimit, LoginRateLimiter};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 6;
const PASSWORD_MAX_CHARS: usize = 50;

/// POST /api/auth/register
///
/// # Request Body
/// ```json
/// {
///   "email": "user@example.com",
///   "name": "User Name",
///   "password": "Password1"
/// }
/// ```
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let response = register_user(&state.db, payload).await?;
    Ok(Json(response))
}

/// POST /api/auth/login (form-encoded, OAuth2 password-flow field names)
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Json<LoginResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let client_ip = extract_client_ip(&headers, addr);

    let response = login_user(
        &state.db,
        &state.login_limiter,
        &state.jwt_secret,
        &client_ip,
        &form.username,
        &form.password,
    )
    .await?;

    Ok(Json(response))
}

/// Core registration flow, separated from the axum plumbing for testability
///
/// The duplicate check and the insert are two separate statements, not one
/// atomic operation: concurrent registrations of the same email can race.
/// Preserved current behavior; see DESIGN.md.
pub(crate) async fn register_user(
    db: &SqlitePool,
    payload: RegisterRequest,
) -> Result<RegisterResponse, ApiError> {
    let email = payload.email.to_lowercase();

    validate_registration(&email, &payload.name, &payload.password)?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(db)
        .await?;
    if existing > 0 {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }

    let hashed_password = password::hash_password(&payload.password)
        .map_err(|_| ApiError::Internal("Failed to create user account".to_string()))?;

    sqlx::query(
        "INSERT INTO users (email, name, hashed_password, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&email)
    .bind(&payload.name)
    .bind(&hashed_password)
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await?;

    info!(email = %safe_email_log(&email), "User registered");

    Ok(RegisterResponse {
        message: "User created successfully".to_string(),
        email,
    })
}

/// Core login flow
///
/// The rate limiter runs before any credential work: a limited client learns
/// nothing about whether the email exists. Past that gate, an unknown email
/// is reported as such. The asymmetry is preserved current behavior; see
/// DESIGN.md.
pub(crate) async fn login_user(
    db: &SqlitePool,
    limiter: &LoginRateLimiter,
    jwt_secret: &str,
    client_ip: &str,
    username: &str,
    plain_password: &str,
) -> Result<LoginResponse, ApiError> {
    if let LoginRateLimit::Limited { retry_after } = limiter.check(client_ip).await {
        return Err(ApiError::RateLimited { retry_after });
    }

    let email = username.trim().to_lowercase();

    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(db)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!(email = %safe_email_log(&email), "Login failed: email not registered");
            return Err(ApiError::Unauthorized("Email not registered".to_string()));
        }
    };

    let verified = password::verify_password(plain_password, &user.hashed_password)
        .map_err(|_| ApiError::Internal("An error occurred during login".to_string()))?;

    if !verified {
        // Counts on top of the hit already recorded by check above
        limiter.record_failure(client_ip).await;
        warn!(email = %safe_email_log(&email), "Login failed: incorrect password");
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    limiter.clear(client_ip).await;

    let access_token = tokens::issue(jwt_secret, &user.email, &user.name, client_ip)
        .map_err(|e| {
            warn!(error = %e, "Token creation failed");
            ApiError::Internal("Could not create access token".to_string())
        })?;

    info!(email = %safe_email_log(&user.email), "Login successful");

    Ok(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: (tokens::ACCESS_TOKEN_EXPIRE_MINUTES * 60) as u64,
        user: UserInfo {
            email: user.email,
            name: user.name,
        },
    })
}

pub(crate) fn validate_registration(
    email: &str,
    name: &str,
    password: &str,
) -> Result<(), ApiError> {
    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }

    let name_len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
        return Err(ApiError::Validation(format!(
            "Name must be between {} and {} characters",
            NAME_MIN_CHARS, NAME_MAX_CHARS
        )));
    }

    let password_len = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&password_len) {
        return Err(ApiError::Validation(format!(
            "Password must be between {} and {} characters",
            PASSWORD_MIN_CHARS, PASSWORD_MAX_CHARS
        )));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "Password must contain at least one number".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ApiError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    Ok(())
}

/// Client IP resolution: forwarded headers first, then the socket address
pub(crate) fn extract_client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    // Try X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // Take the first IP in the chain
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return first_ip.to_string();
                }
            }
        }
    }

    // Try X-Real-IP header
    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return ip_str.to_string();
        }
    }

    addr.ip().to_string()
}
