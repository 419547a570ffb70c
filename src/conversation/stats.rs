use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;

use super::types::format_timestamp;
use crate::error::StorageError;

/// Response from conversation_stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_conversations: u64,
    pub role_distribution: BTreeMap<String, u64>,
    pub recent_week_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_conversation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_conversation: Option<String>,
}

/// Compute conversation store statistics.
///
/// `recent_days` sets the window counted in `recent_week_count`. A window
/// reaching past the representable date range counts every row.
pub fn conversation_stats(
    conn: &Connection,
    recent_days: i64,
) -> Result<StatsResponse, StorageError> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))?;

    let role_distribution = count_by_role(conn)?;

    let cutoff = chrono::TimeDelta::try_days(recent_days)
        .and_then(|window| chrono::Utc::now().checked_sub_signed(window));
    let recent: i64 = match cutoff {
        Some(cutoff) => conn.query_row(
            "SELECT COUNT(*) FROM conversations WHERE timestamp >= ?1",
            params![format_timestamp(cutoff)],
            |row| row.get(0),
        )?,
        None => total,
    };

    let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(timestamp), MAX(timestamp) FROM conversations",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(StatsResponse {
        total_conversations: total as u64,
        role_distribution,
        recent_week_count: recent as u64,
        oldest_conversation: oldest,
        newest_conversation: newest,
    })
}

fn count_by_role(conn: &Connection) -> Result<BTreeMap<String, u64>, StorageError> {
    let mut stmt = conn.prepare("SELECT role, COUNT(*) FROM conversations GROUP BY role")?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(|(role, count)| (role, count as u64))
        .collect())
}
