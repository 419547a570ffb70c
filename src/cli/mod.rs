//! Terminal commands that read the conversation database directly.

pub mod doctor;
pub mod recent;
pub mod search;
pub mod stats;

use crate::conversation::types::ConversationRecord;

const PREVIEW_CHARS: usize = 120;

/// First line of `content`, cut to at most [`PREVIEW_CHARS`] characters.
pub(crate) fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or("");
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() || line.len() < content.trim_end().len() {
        format!("{head}...")
    } else {
        head
    }
}

pub(crate) fn print_records(records: &[ConversationRecord]) {
    for (i, record) in records.iter().enumerate() {
        println!(
            "  {}. [{}] #{} {}",
            i + 1,
            record.role,
            record.id,
            record.timestamp
        );
        println!("     {}", preview(&record.content));
        if let Some(ref metadata) = record.metadata {
            println!("     metadata: {metadata}");
        }
    }
}
