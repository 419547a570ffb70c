use anyhow::Result;

use crate::config::ContextRecordConfig;
use crate::conversation::store::recent_conversations;

/// Print the most recent conversations, newest first.
pub fn recent(config: &ContextRecordConfig, limit: Option<usize>) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let records = recent_conversations(&conn, config.clamp_limit(limit))?;

    if records.is_empty() {
        println!("No conversations recorded yet.");
        return Ok(());
    }

    println!("{} most recent conversation(s)\n", records.len());
    super::print_records(&records);

    Ok(())
}
