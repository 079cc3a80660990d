//! Server-side store for authenticated admin sessions.
//!
//! Only a SHA-256 hash of each session token is persisted; the raw token lives
//! in the admin's cookie.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::storage::db::DbConnection;
use crate::storage::messages::{format_timestamp, parse_timestamp};

/// An admin session that was found valid for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Hex-encoded SHA-256 of a session token, the key under which it is stored.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn create_session(
    conn: &DbConnection,
    token: &str,
    username: &str,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO admin_session (token_hash, username, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            hash_token(token),
            username,
            format_timestamp(&created_at),
            format_timestamp(&expires_at)
        ],
    )?;
    Ok(())
}

/// Looks up a live session. Expired rows are treated as absent.
pub fn find_session(conn: &DbConnection, token: &str, now: DateTime<Utc>) -> rusqlite::Result<Option<AdminSession>> {
    conn.query_row(
        "SELECT username, created_at, expires_at FROM admin_session WHERE token_hash = ?1 AND expires_at > ?2",
        params![hash_token(token), format_timestamp(&now)],
        |row| {
            let created_at: String = row.get(1)?;
            let expires_at: String = row.get(2)?;
            Ok(AdminSession {
                username: row.get(0)?,
                created_at: parse_timestamp(1, &created_at)?,
                expires_at: parse_timestamp(2, &expires_at)?,
            })
        },
    )
    .optional()
}

/// Returns `true` if a session row was removed.
pub fn delete_session(conn: &DbConnection, token: &str) -> rusqlite::Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM admin_session WHERE token_hash = ?1",
        params![hash_token(token)],
    )?;
    Ok(deleted > 0)
}

/// Removes every session whose expiry is at or before `now`.
pub fn purge_expired_sessions(conn: &DbConnection, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM admin_session WHERE expires_at <= ?1",
        params![format_timestamp(&now)],
    )
}
