//! The `message` table: inbound chat messages and their admin replies.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use crate::storage::db::DbConnection;

/// A chat message received through the webhook.
///
/// `replied` is true exactly when both `reply_text` and `replied_at` are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i64,
    /// Sender's platform identifier (the chat id replies are sent to)
    pub user_id: String,
    pub user_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub replied: bool,
    pub reply_text: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
}

/// Fields supplied when a message is first recorded.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub user_id: String,
    pub user_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl NewMessage {
    /// Message stamped with the current time.
    pub fn received_now(user_id: impl Into<String>, user_name: Option<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Totals shown on the stats page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub total: i64,
    pub replied: i64,
    pub pending: i64,
}

/// Fixed-width RFC 3339 so that text ordering in SQLite matches time ordering.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, user_name, text, timestamp, replied, reply_text, replied_at FROM message";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    let timestamp: String = row.get(4)?;
    let replied_at: Option<String> = row.get(7)?;

    Ok(Message {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_name: row.get(2)?,
        text: row.get(3)?,
        timestamp: parse_timestamp(4, &timestamp)?,
        replied: row.get::<_, i64>(5)? != 0,
        reply_text: row.get(6)?,
        replied_at: replied_at.as_deref().map(|raw| parse_timestamp(7, raw)).transpose()?,
    })
}

/// Inserts a new, unreplied message and returns its id.
pub fn insert_message(conn: &DbConnection, message: &NewMessage) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO message (user_id, user_name, text, timestamp, replied) VALUES (?1, ?2, ?3, ?4, 0)",
        params![
            message.user_id,
            message.user_name,
            message.text,
            format_timestamp(&message.timestamp)
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All messages, newest first. Equal timestamps fall back to the higher id first.
pub fn list_messages(conn: &DbConnection) -> rusqlite::Result<Vec<Message>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY timestamp DESC, id DESC", SELECT_COLUMNS))?;
    let rows = stmt.query_map([], message_from_row)?;
    rows.collect()
}

pub fn get_message(conn: &DbConnection, id: i64) -> rusqlite::Result<Option<Message>> {
    conn.query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![id], message_from_row)
        .optional()
}

/// Records the admin's reply. A second reply overwrites the first.
///
/// Returns `false` when no message has this id.
pub fn mark_replied(
    conn: &DbConnection,
    id: i64,
    reply_text: &str,
    replied_at: DateTime<Utc>,
) -> rusqlite::Result<bool> {
    let updated = conn.execute(
        "UPDATE message SET replied = 1, reply_text = ?1, replied_at = ?2 WHERE id = ?3",
        params![reply_text, format_timestamp(&replied_at), id],
    )?;
    Ok(updated > 0)
}

pub fn message_stats(conn: &DbConnection) -> rusqlite::Result<MessageStats> {
    conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(replied), 0) FROM message",
        [],
        |row| {
            let total: i64 = row.get(0)?;
            let replied: i64 = row.get(1)?;
            Ok(MessageStats {
                total,
                replied,
                pending: total - replied,
            })
        },
    )
}
