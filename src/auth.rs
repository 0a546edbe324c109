//! User accounts and bearer tokens.
//!
//! Passwords are stored as `pbkdf2$<iterations>$<salt>$<hash>` (standard
//! base64, PBKDF2-HMAC-SHA256). Tokens are random 32-byte URL-safe strings;
//! only their SHA-256 digest is persisted, next to an expiry.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{Duration, Utc};
use pbkdf2::pbkdf2_hmac;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::db;
use crate::models::{AuthToken, User};
use crate::workflow::assembler::{self, ProfileView};
use crate::workflow::directory::is_valid_email;
use crate::workflow::reference::resolve;
use crate::workflow::WorkflowError;

#[cfg(not(test))]
pub const PBKDF2_ITERATIONS: u32 = 210_000;
#[cfg(test)]
pub const PBKDF2_ITERATIONS: u32 = 1_000;

pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authenticated caller, injected into request extensions by the auth
/// middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
}

// ═══════════════════════════════════════════════════════════
// Password hashing
// ═══════════════════════════════════════════════════════════

fn derive(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; HASH_LENGTH]> {
    let mut out = Zeroizing::new([0u8; HASH_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out[..]);
    out
}

pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LENGTH] = rand::random();
    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "pbkdf2${PBKDF2_ITERATIONS}${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(&hash[..])
    )
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some("pbkdf2"), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(expected)) else {
        return false;
    };
    if iterations == 0 || expected.len() != HASH_LENGTH {
        return false;
    }

    let actual = derive(password, &salt, iterations);
    actual[..].ct_eq(&expected[..]).into()
}

// ═══════════════════════════════════════════════════════════
// Tokens
// ═══════════════════════════════════════════════════════════

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of a bearer token, as stored in `auth_token.token_hash`.
pub fn hash_token(token: &str) -> String {
    let digest: [u8; 32] = Sha256::digest(token.as_bytes()).into();
    URL_SAFE_NO_PAD.encode(digest)
}

// ═══════════════════════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════════════════════

pub fn register(conn: &Connection, credentials: &Credentials) -> Result<User, WorkflowError> {
    let email = credentials.email.trim();
    if !is_valid_email(email) {
        return Err(WorkflowError::Validation("Invalid email format".into()));
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(WorkflowError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    const TAKEN: &str = "User with this email already exists";
    if db::find_user_by_email(conn, email)?.is_some() {
        tracing::warn!("Registration for existing email rejected");
        return Err(WorkflowError::Conflict(TAKEN.into()));
    }

    let id = db::insert_user(conn, email, &hash_password(&credentials.password))
        .map_err(|e| WorkflowError::from_write(e, TAKEN))?;
    tracing::info!(user_id = id, "User registered");
    resolve::<User>(conn, id)
}

pub fn login(
    conn: &Connection,
    credentials: &Credentials,
    ttl_hours: i64,
) -> Result<LoginResponse, WorkflowError> {
    let user = db::find_user_by_email(conn, credentials.email.trim())?
        .filter(|u| u.is_active)
        .ok_or_else(|| WorkflowError::NotFound("User not found".into()))?;

    if !verify_password(&credentials.password, &user.password_hash) {
        tracing::warn!(user_id = user.id, "Login with incorrect password");
        return Err(WorkflowError::Validation("Incorrect password".into()));
    }

    let now = Utc::now();
    let expires_at = Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| WorkflowError::Validation(format!("Invalid token lifetime: {ttl_hours} hours")))?;
    let token = generate_token();
    let record = AuthToken {
        token_hash: hash_token(&token),
        user_id: user.id,
        issued_at: now,
        expires_at,
    };
    db::insert_auth_token(conn, &record)?;

    let pruned = db::delete_expired_tokens(conn, &now)?;
    tracing::info!(user_id = user.id, pruned, "Token issued");

    Ok(LoginResponse {
        token,
        expires_at: db::fmt_timestamp(&record.expires_at),
    })
}

/// Resolve a bearer token to its user. Unknown, expired and inactive-user
/// tokens all yield `None`.
pub fn authenticate(conn: &Connection, token: &str) -> Result<Option<UserContext>, WorkflowError> {
    let Some(record) = db::get_auth_token(conn, &hash_token(token))? else {
        return Ok(None);
    };
    if record.expires_at <= Utc::now() {
        tracing::debug!(user_id = record.user_id, "Expired token presented");
        return Ok(None);
    }
    let user = db::get_user(conn, record.user_id)?.filter(|u| u.is_active);
    Ok(user.map(|u| UserContext {
        user_id: u.id,
        email: u.email,
    }))
}

pub fn profile(conn: &Connection, user_id: i64) -> Result<ProfileView, WorkflowError> {
    let user = resolve::<User>(conn, user_id)?;
    let entities = db::get_entities_for_user(conn, user_id)?;
    Ok(assembler::profile_view(&user, entities))
}
