//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::User;
use super::tokens::{self, TokenError};
use crate::common::helpers::safe_token_log;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the bearer token and re-fetches the user record for the token's
/// subject, so deleted accounts lose access even while their token is still
/// within its expiry window.
#[derive(Debug)]
pub struct AuthedUser {
    pub email: String,
    pub name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Internal("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        // Extract Bearer token from Authorization header
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = if let Some(rest) = token.strip_prefix("Bearer ") {
            rest.to_string()
        } else {
            token
        };

        let claims = tokens::validate(&app_state.jwt_secret, &bare_token).map_err(|e| {
            warn!(
                error = %e,
                token = %safe_token_log(&bare_token),
                "Access token validation failed"
            );
            match e {
                TokenError::Expired => ApiError::Unauthorized("Token has expired".into()),
                TokenError::Invalid => {
                    ApiError::Unauthorized("Could not validate credentials".into())
                }
            }
        })?;

        // Look up user in database
        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(&claims.sub)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    email = %safe_email_log(&claims.sub),
                    "Database error during user lookup in authentication"
                );
                ApiError::Database(e)
            })?;

        match user {
            Some(u) => {
                debug!(
                    email = %safe_email_log(&u.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    email: u.email,
                    name: u.name,
                })
            }
            None => {
                warn!(
                    email = %safe_email_log(&claims.sub),
                    "Authentication failed: user not found in database"
                );
                Err(ApiError::Unauthorized("User not found".into()))
            }
        }
    }
}
