//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
///
/// `email` is the unique identifier, stored lowercased. The password hash
/// never leaves this process.
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub created_at: String,
}

/// Registration request body
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Registration response
#[derive(Serialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
}

/// Login form body (form-encoded, OAuth2 password-flow field names)
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Public user info returned on login
#[derive(Serialize, Debug)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
}

/// Login response
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserInfo,
}
