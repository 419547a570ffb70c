//! Write and point-read paths for the `conversations` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{now_timestamp, ConversationRecord};
use crate::error::StorageError;

pub(crate) const SELECT_COLUMNS: &str =
    "SELECT id, timestamp, role, content, metadata FROM conversations";

/// Insert one chat turn and return the stored record.
///
/// Runs in a transaction so the row is visible only once committed.
pub fn create_conversation(
    conn: &mut Connection,
    role: &str,
    content: &str,
    metadata: Option<&serde_json::Value>,
) -> Result<ConversationRecord, StorageError> {
    let timestamp = now_timestamp();
    let metadata_json = metadata.map(|m| serde_json::to_string(m)).transpose()?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO conversations (role, content, timestamp, metadata) VALUES (?1, ?2, ?3, ?4)",
        params![role, content, timestamp, metadata_json],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    tracing::debug!(id, role, content_len = content.len(), "conversation stored");

    Ok(ConversationRecord {
        id,
        timestamp,
        role: role.to_string(),
        content: content.to_string(),
        metadata: metadata.cloned(),
    })
}

/// Fetch a single conversation by id.
pub fn get_conversation(conn: &Connection, id: i64) -> Result<ConversationRecord, StorageError> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        row_to_raw,
    )
    .optional()?
    .ok_or(StorageError::NotFound(id))?
    .into_record()
}

/// Page through all conversations in insertion order.
pub fn list_conversations(
    conn: &Connection,
    skip: usize,
    limit: usize,
) -> Result<Vec<ConversationRecord>, StorageError> {
    query_records(
        conn,
        &format!("{SELECT_COLUMNS} ORDER BY id ASC LIMIT ?1 OFFSET ?2"),
        params![to_sql_count(limit), to_sql_count(skip)],
    )
}

/// The most recent conversations, newest first.
pub fn recent_conversations(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<ConversationRecord>, StorageError> {
    query_records(
        conn,
        &format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC LIMIT ?1"),
        params![to_sql_count(limit)],
    )
}

/// Permanently remove a conversation.
pub fn delete_conversation(conn: &Connection, id: i64) -> Result<(), StorageError> {
    let removed = conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(StorageError::NotFound(id));
    }
    tracing::info!(id, "conversation deleted");
    Ok(())
}

/// Row as read from SQLite, before the metadata text is decoded.
pub(crate) struct RawRecord {
    id: i64,
    timestamp: String,
    role: String,
    content: String,
    metadata: Option<String>,
}

impl RawRecord {
    pub(crate) fn into_record(self) -> Result<ConversationRecord, StorageError> {
        let metadata = self
            .metadata
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()?;
        Ok(ConversationRecord {
            id: self.id,
            timestamp: self.timestamp,
            role: self.role,
            content: self.content,
            metadata,
        })
    }
}

pub(crate) fn row_to_raw(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        metadata: row.get(4)?,
    })
}

/// SQLite binds integers as `i64`; counts beyond that saturate.
pub(crate) fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

pub(crate) fn query_records(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<ConversationRecord>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let raw: Vec<RawRecord> = stmt
        .query_map(params, row_to_raw)?
        .collect::<Result<Vec<_>, _>>()?;
    raw.into_iter().map(RawRecord::into_record).collect()
}
