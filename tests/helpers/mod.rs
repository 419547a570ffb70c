#![allow(dead_code)]

use contextrecord::config::ContextRecordConfig;
use contextrecord::db;
use contextrecord::service::ConversationService;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// A shared connection handle, as the service and the store use it.
pub fn shared_db() -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(test_db()))
}

/// A service over an in-memory database with default config.
pub fn test_service() -> ConversationService {
    ConversationService::new(shared_db(), Arc::new(ContextRecordConfig::default()))
}

/// Insert `n` records alternating user/assistant, contents `msg 0`, `msg 1`, ...
pub fn seed(conn: &mut Connection, n: usize) {
    for i in 0..n {
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        let content = format!("msg {i}");
        contextrecord::conversation::store::create_conversation(conn, role, &content, None)
            .unwrap();
    }
}
