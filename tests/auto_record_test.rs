mod helpers;

use contextrecord::conversation::{store, SqliteConversationStore};
use contextrecord::recording::{AutoRecorder, RecordingConfigUpdate, SessionConfigStore};
use contextrecord::tools::auto_record_conversation::AutoRecordConversationParams;
use serde_json::{json, Map};
use std::sync::Arc;

fn sqlite_recorder() -> (AutoRecorder, Arc<std::sync::Mutex<rusqlite::Connection>>) {
    let db = helpers::shared_db();
    let store = Arc::new(SqliteConversationStore::new(Arc::clone(&db)));
    let recorder = AutoRecorder::new(Arc::new(SessionConfigStore::new()), store);
    (recorder, db)
}

#[test]
fn enable_record_disable_against_sqlite() {
    let (recorder, db) = sqlite_recorder();

    recorder.sessions().enable("s1", true, true);
    assert!(recorder.try_auto_record("user", "hello", "s1", Map::new()));

    recorder.sessions().disable("s1");
    assert!(!recorder.try_auto_record("user", "hello again", "s1", Map::new()));

    let conn = db.lock().unwrap();
    let all = store::list_conversations(&conn, 0, 10).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].role, "user");
    assert_eq!(all[0].content, "hello");
    assert_eq!(
        all[0].metadata,
        Some(json!({"session_id": "s1", "auto_recorded": true}))
    );
}

#[test]
fn sessions_are_independent() {
    let (recorder, db) = sqlite_recorder();
    recorder.sessions().enable("a", true, true);

    assert!(recorder.try_auto_record("user", "in a", "a", Map::new()));
    assert!(!recorder.try_auto_record("user", "in b", "b", Map::new()));

    let conn = db.lock().unwrap();
    assert_eq!(store::list_conversations(&conn, 0, 10).unwrap().len(), 1);
}

#[test]
fn unknown_roles_pass_once_enabled() {
    let (recorder, _db) = sqlite_recorder();
    let sessions = recorder.sessions();

    sessions.set_config(
        "s",
        RecordingConfigUpdate {
            enabled: Some(true),
            record_user: Some(false),
            record_assistant: Some(false),
        },
    );
    assert!(!recorder.try_auto_record("user", "u", "s", Map::new()));
    assert!(!recorder.try_auto_record("assistant", "a", "s", Map::new()));
    assert!(recorder.try_auto_record("system", "sys", "s", Map::new()));
}

#[test]
fn disable_keeps_role_flags() {
    let sessions = SessionConfigStore::new();
    sessions.enable("s", true, false);
    let config = sessions.disable("s");

    assert!(!config.enabled);
    assert!(config.record_user);
    assert!(!config.record_assistant);
    for role in ["user", "assistant", "system"] {
        assert!(!sessions.should_record("s", role));
    }
}

#[tokio::test]
async fn service_auto_record_pair_with_context() {
    let service = helpers::test_service();
    service.enable_auto_recording(Some("chat".into()), None, None);

    let reply = service
        .auto_record_conversation(AutoRecordConversationParams {
            user_message: "what is rust?".into(),
            assistant_response: "a systems language".into(),
            session_id: Some("chat".into()),
            context: Some(r#"{"channel": "cli", "session_id": "spoofed"}"#.into()),
        })
        .await
        .unwrap();

    assert!(reply.user_recorded);
    assert!(reply.assistant_recorded);
    assert_eq!(reply.session_id, "chat");

    let listed = service.list_conversations(None, None).await.unwrap();
    assert_eq!(listed.count, 2);

    let user = &listed.results[0];
    assert_eq!(user.role, "user");
    assert_eq!(
        user.metadata,
        Some(json!({
            "channel": "cli",
            "session_id": "chat",
            "message_type": "user_input",
            "auto_recorded": true
        }))
    );

    let assistant = &listed.results[1];
    assert_eq!(assistant.role, "assistant");
    assert_eq!(assistant.metadata.as_ref().unwrap()["message_type"], "assistant_response");
}

#[tokio::test]
async fn disabled_session_records_nothing() {
    let service = helpers::test_service();

    let reply = service
        .auto_record_conversation(AutoRecordConversationParams {
            user_message: "hi".into(),
            assistant_response: "hello".into(),
            session_id: None,
            context: None,
        })
        .await
        .unwrap();

    assert_eq!(reply.session_id, "default");
    assert!(!reply.user_recorded);
    assert!(!reply.assistant_recorded);

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.stats.total_conversations, 0);
}
