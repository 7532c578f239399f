//! Session-token authentication
//!
//! Thin authentication layer for local single-user deployments:
//! - Passwords hashed with SHA-256 over a per-user random salt
//! - Opaque session tokens stored in the `sessions` table with an expiry
//! - An empty stored password hash means the account logs in with any
//!   password (local "auth disabled" mode)

use crate::db::models::UserRow;
use crate::{Error, Result};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Hash a password with the given salt (hex SHA-256)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Generate a random hex salt
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex_encode(&bytes)
}

/// Generate an opaque session token
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create a user account, replacing nothing if the username exists
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<UserRow> {
    let salt = generate_salt();
    let user = UserRow {
        guid: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: hash_password(password, &salt),
        password_salt: salt,
    };

    sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, ?, ?, ?)",
    )
    .bind(&user.guid)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.password_salt)
    .execute(pool)
    .await?;

    info!("Created user '{}'", username);
    Ok(user)
}

/// Ensure the default local user exists
///
/// First run creates a passwordless "local" account so the desktop UI can
/// log in without setup.
pub async fn ensure_default_user(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (guid, username, password_hash, password_salt)
        VALUES ('00000000-0000-0000-0000-000000000001', 'local', '', '')
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Validate credentials and open a session
///
/// Returns the session token on success.
pub async fn login(pool: &SqlitePool, username: &str, password: &str) -> Result<(String, String)> {
    let user: Option<UserRow> = sqlx::query_as(
        "SELECT guid, username, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let user = user.ok_or_else(|| Error::Unauthorized("Unknown user".to_string()))?;

    // Empty stored hash = passwordless local account
    if !user.password_hash.is_empty() {
        let provided = hash_password(password, &user.password_salt);
        if provided != user.password_hash {
            warn!("Failed login attempt for '{}'", username);
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }
    }

    let token = generate_token();
    let timeout_secs =
        crate::db::init::get_setting_i64(pool, "session_timeout_seconds", 31_536_000).await;
    let expires_at = chrono::Utc::now() + chrono::Duration::seconds(timeout_secs);

    sqlx::query("INSERT INTO sessions (token, user_guid, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(&user.guid)
        .bind(expires_at.to_rfc3339())
        .execute(pool)
        .await?;

    info!("User '{}' logged in", username);
    Ok((token, user.guid))
}

/// Validate a session token, returning the owning user guid
pub async fn validate_session(pool: &SqlitePool, token: &str) -> Result<String> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT user_guid, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(pool)
            .await?;

    let (user_guid, expires_at) =
        row.ok_or_else(|| Error::Unauthorized("Invalid session".to_string()))?;

    let expires = chrono::DateTime::parse_from_rfc3339(&expires_at)
        .map_err(|e| Error::Internal(format!("Bad session expiry: {}", e)))?;

    if expires < chrono::Utc::now() {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(pool)
            .await?;
        return Err(Error::Unauthorized("Session expired".to_string()));
    }

    Ok(user_guid)
}

/// Terminate a session
pub async fn logout(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}
