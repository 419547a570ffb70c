//! Substring search over conversation content.
//!
//! Uses SQLite `LIKE` (ASCII case-insensitive). Wildcard characters in the
//! query are escaped so the query always matches literally.

use rusqlite::params;
use rusqlite::Connection;

use super::store::{query_records, to_sql_count, SELECT_COLUMNS};
use super::types::ConversationRecord;
use crate::error::StorageError;

/// Find conversations whose content contains `query`, newest first.
pub fn search_conversations(
    conn: &Connection,
    query: &str,
    skip: usize,
    limit: usize,
) -> Result<Vec<ConversationRecord>, StorageError> {
    let pattern = format!("%{}%", escape_like(query));
    let results = query_records(
        conn,
        &format!(
            "{SELECT_COLUMNS} WHERE content LIKE ?1 ESCAPE '\\' \
             ORDER BY timestamp DESC, id DESC LIMIT ?2 OFFSET ?3"
        ),
        params![pattern, to_sql_count(limit), to_sql_count(skip)],
    )?;

    tracing::debug!(query, matched = results.len(), "conversation search");
    Ok(results)
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::store::create_conversation;

    fn seeded() -> Connection {
        let mut conn = crate::db::open_memory_database().unwrap();
        create_conversation(&mut conn, "user", "How do I open a SQLite file?", None).unwrap();
        create_conversation(&mut conn, "assistant", "Use Connection::open on the path.", None)
            .unwrap();
        create_conversation(&mut conn, "user", "Progress is 100% done", None).unwrap();
        create_conversation(&mut conn, "user", "snake_case names", None).unwrap();
        conn
    }

    #[test]
    fn matches_substring_case_insensitively() {
        let conn = seeded();
        let hits = search_conversations(&conn, "sqlite", 0, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].role, "user");
    }

    #[test]
    fn orders_newest_first_and_pages() {
        let conn = seeded();
        let all = search_conversations(&conn, "o", 0, 10).unwrap();
        assert!(all.len() >= 3);
        assert!(all.windows(2).all(|w| w[0].id > w[1].id));

        let second = search_conversations(&conn, "o", 1, 1).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, all[1].id);

        assert!(search_conversations(&conn, "o", usize::MAX, 10).unwrap().is_empty());
    }

    #[test]
    fn wildcards_match_literally() {
        let conn = seeded();
        let percent = search_conversations(&conn, "100%", 0, 10).unwrap();
        assert_eq!(percent.len(), 1);

        let underscore = search_conversations(&conn, "e_c", 0, 10).unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].content, "snake_case names");

        assert!(search_conversations(&conn, "%%%", 0, 10).unwrap().is_empty());
    }

    #[test]
    fn no_match_returns_empty() {
        let conn = seeded();
        assert!(search_conversations(&conn, "kubernetes", 0, 10).unwrap().is_empty());
    }

    #[test]
    fn escape_like_escapes_specials() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
    }
}
