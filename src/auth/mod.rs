//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Registration and password-based login
//! - Password hashing and verification
//! - Signed access token issuance and validation
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod tokens;


pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
