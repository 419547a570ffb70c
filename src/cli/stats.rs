use anyhow::Result;

use crate::config::ContextRecordConfig;

/// Display conversation statistics in the terminal.
pub fn stats(config: &ContextRecordConfig) -> Result<()> {
    let conn = crate::db::open_database(config.resolved_db_path())?;

    let response =
        crate::conversation::stats::conversation_stats(&conn, config.search.recent_days)?;

    println!("Conversation Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total conversations: {}", response.total_conversations);
    println!(
        "  Last {} days:        {}",
        config.search.recent_days, response.recent_week_count
    );
    println!();

    println!("By Role:");
    if response.role_distribution.is_empty() {
        println!("  (none)");
    }
    for (role, count) in &response.role_distribution {
        println!("  {:<12} {}", role, count);
    }
    println!();

    if let Some(ref oldest) = response.oldest_conversation {
        println!("Oldest conversation:   {oldest}");
    }
    if let Some(ref newest) = response.newest_conversation {
        println!("Newest conversation:   {newest}");
    }

    Ok(())
}
