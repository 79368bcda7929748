//! Access token issuance and validation
//!
//! Signed, time-limited bearer tokens (HS256). Tokens carry the issuing
//! client's IP as a claim; it is bound at issuance and not re-checked on
//! later requests. There is no jti blacklist, so a token stays valid until
//! its natural expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub iat: usize,
    pub exp: usize,
    #[serde(rename = "type")]
    pub token_type: String,
    pub jti: String,
    pub client_ip: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Could not validate credentials")]
    Invalid,
}

/// Issue an access token for `email`, bound to the issuing client's IP
pub fn issue(
    secret: &str,
    email: &str,
    name: &str,
    client_ip: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue_at(Utc::now(), secret, email, name, client_ip)
}

pub(crate) fn issue_at(
    now: DateTime<Utc>,
    secret: &str,
    email: &str,
    name: &str,
    client_ip: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expire = now + Duration::minutes(ACCESS_TOKEN_EXPIRE_MINUTES);

    let claims = Claims {
        sub: email.to_string(),
        name: name.to_string(),
        iat: now.timestamp() as usize,
        exp: expire.timestamp() as usize,
        token_type: "access".to_string(),
        jti: new_jti(now),
        client_ip: client_ip.to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token's signature and expiry
///
/// Expiry is reported distinctly from every other failure (bad signature,
/// malformed token, missing subject).
pub fn validate(secret: &str, token: &str) -> Result<Claims, TokenError> {
    // No leeway: a token is expired the moment its exp passes
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    if decoded.claims.sub.is_empty() {
        return Err(TokenError::Invalid);
    }

    Ok(decoded.claims)
}

/// Uniqueness token combining issuance time and random bytes
fn new_jti(now: DateTime<Utc>) -> String {
    let random: [u8; 8] = rand::random();
    let hex: String = random.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}_{}", now.timestamp(), hex)
}
