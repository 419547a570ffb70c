use anyhow::Result;

use crate::config::ContextRecordConfig;
use crate::conversation::search::search_conversations;

/// Run a keyword search from the terminal.
pub fn search(config: &ContextRecordConfig, query: &str, limit: Option<usize>) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let limit = config.clamp_limit(limit);

    let results = search_conversations(&conn, query, 0, limit)?;

    if results.is_empty() {
        println!("No conversations matching \"{query}\".");
        return Ok(());
    }

    println!("Found {} conversation(s) matching \"{query}\"\n", results.len());
    super::print_records(&results);

    Ok(())
}
