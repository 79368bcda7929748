//! Password hashing and verification
//!
//! Argon2id with a per-password random salt. The memory cost is tunable via
//! `ARGON2_MEMORY_KIB` but clamped to the library default as a floor, so a
//! misconfigured environment cannot downgrade hashing strength.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::env;
use tracing::error;

const MIN_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;

fn hasher() -> Argon2<'static> {
    let memory_kib = env::var("ARGON2_MEMORY_KIB")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(MIN_MEMORY_KIB)
        .max(MIN_MEMORY_KIB);

    let params = Params::new(
        memory_kib,
        Params::DEFAULT_T_COST,
        Params::DEFAULT_P_COST,
        None,
    )
    .unwrap_or_default();

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}
