//! The conversation service: one owner for the database handle, the session
//! switches, the auto-record gate and the event broadcaster.
//!
//! Both front ends (MCP tools and the HTTP API) hold a clone of
//! [`ConversationService`] and call the same async operations. Blocking
//! SQLite work runs on `tokio::task::spawn_blocking`.

use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use crate::config::ContextRecordConfig;
use crate::conversation::stats::{conversation_stats, StatsResponse};
use crate::conversation::types::{parse_metadata, ConversationRecord};
use crate::conversation::{search, store, SqliteConversationStore};
use crate::error::{ServiceError, StorageError};
use crate::events::EventBroadcaster;
use crate::recording::{AutoRecorder, SessionConfigStore, SessionRecordingConfig};
use crate::tools::auto_record_conversation::AutoRecordConversationParams;
use crate::tools::request::ToolRequest;

#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub success: bool,
    pub conversation_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AutoRecordResponse {
    pub success: bool,
    pub session_id: String,
    pub user_recorded: bool,
    pub assistant_recorded: bool,
    pub message: String,
}

/// Reply for the enable/disable/status operations.
#[derive(Debug, Serialize)]
pub struct AutoRecordingResponse {
    pub success: bool,
    pub session_id: String,
    pub config: SessionRecordingConfig,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionEntry {
    pub session_id: String,
    #[serde(flatten)]
    pub config: SessionRecordingConfig,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<ConversationRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub results: Vec<ConversationRecord>,
    pub count: usize,
}

impl ListResponse {
    fn new(results: Vec<ConversationRecord>) -> Self {
        Self {
            success: true,
            count: results.len(),
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub success: bool,
    pub conversation: ConversationRecord,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub conversation_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatsReply {
    pub success: bool,
    #[serde(flatten)]
    pub stats: StatsResponse,
}

fn status_label(config: &SessionRecordingConfig) -> &'static str {
    if config.enabled {
        "enabled"
    } else {
        "disabled"
    }
}

#[derive(Clone)]
pub struct ConversationService {
    db: Arc<Mutex<Connection>>,
    recorder: AutoRecorder,
    events: EventBroadcaster,
    config: Arc<ContextRecordConfig>,
}

impl ConversationService {
    pub fn new(db: Arc<Mutex<Connection>>, config: Arc<ContextRecordConfig>) -> Self {
        let store = Arc::new(SqliteConversationStore::new(Arc::clone(&db)));
        let recorder = AutoRecorder::new(Arc::new(SessionConfigStore::new()), store);
        Self {
            db,
            recorder,
            events: EventBroadcaster::new(),
            config,
        }
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    pub fn sessions(&self) -> &SessionConfigStore {
        self.recorder.sessions()
    }

    pub fn config(&self) -> &ContextRecordConfig {
        &self.config
    }

    fn session_or_default(&self, session_id: Option<String>) -> String {
        session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.config.recording.default_session.clone())
    }

    /// Run `f` against the shared connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))??;
        Ok(result)
    }

    /// Store a record and announce it to every event subscriber.
    pub async fn create_conversation(
        &self,
        role: String,
        content: String,
        metadata: Option<Value>,
    ) -> Result<ConversationRecord, ServiceError> {
        let record = self
            .with_conn(move |conn| {
                store::create_conversation(conn, &role, &content, metadata.as_ref())
            })
            .await?;

        let delivered = self.events.broadcast_conversation(&record);
        tracing::info!(id = record.id, role = %record.role, delivered, "conversation created");
        Ok(record)
    }

    /// Pass a user/assistant pair through the session's gate. Nothing is
    /// broadcast on this path.
    pub async fn auto_record_conversation(
        &self,
        params: AutoRecordConversationParams,
    ) -> Result<AutoRecordResponse, ServiceError> {
        let session_id = self.session_or_default(params.session_id);
        let context = match params.context.as_deref().and_then(parse_metadata) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let recorder = self.recorder.clone();
        let session = session_id.clone();
        let user_message = params.user_message;
        let assistant_response = params.assistant_response;
        let (user_recorded, assistant_recorded) = tokio::task::spawn_blocking(move || {
            let mut user_meta = context.clone();
            user_meta.insert("message_type".into(), Value::from("user_input"));
            let user = recorder.try_auto_record("user", &user_message, &session, user_meta);

            let mut assistant_meta = context;
            assistant_meta.insert("message_type".into(), Value::from("assistant_response"));
            let assistant = recorder.try_auto_record(
                "assistant",
                &assistant_response,
                &session,
                assistant_meta,
            );
            (user, assistant)
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?;

        let mark = |recorded: bool| if recorded { "recorded" } else { "skipped" };
        Ok(AutoRecordResponse {
            success: true,
            message: format!(
                "user message {}, assistant response {}",
                mark(user_recorded),
                mark(assistant_recorded)
            ),
            session_id,
            user_recorded,
            assistant_recorded,
        })
    }

    pub fn enable_auto_recording(
        &self,
        session_id: Option<String>,
        record_user: Option<bool>,
        record_assistant: Option<bool>,
    ) -> AutoRecordingResponse {
        let session_id = self.session_or_default(session_id);
        let config = self.sessions().enable(
            &session_id,
            record_user.unwrap_or(true),
            record_assistant.unwrap_or(true),
        );
        AutoRecordingResponse {
            success: true,
            message: Some(format!("auto recording enabled for session '{session_id}'")),
            status: status_label(&config),
            session_id,
            config,
        }
    }

    pub fn disable_auto_recording(&self, session_id: Option<String>) -> AutoRecordingResponse {
        let session_id = self.session_or_default(session_id);
        let config = self.sessions().disable(&session_id);
        AutoRecordingResponse {
            success: true,
            message: Some(format!("auto recording disabled for session '{session_id}'")),
            status: status_label(&config),
            session_id,
            config,
        }
    }

    pub fn auto_recording_status(&self, session_id: Option<String>) -> AutoRecordingResponse {
        let session_id = self.session_or_default(session_id);
        let config = self.sessions().get_config(&session_id);
        AutoRecordingResponse {
            success: true,
            message: None,
            status: status_label(&config),
            session_id,
            config,
        }
    }

    pub fn list_sessions(&self) -> Vec<SessionEntry> {
        self.sessions()
            .sessions()
            .into_iter()
            .map(|(session_id, config)| SessionEntry { session_id, config })
            .collect()
    }

    pub async fn search_conversations(
        &self,
        query: String,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> Result<SearchResponse, ServiceError> {
        let limit = self.config.clamp_limit(limit);
        let skip = skip.unwrap_or(0);
        let q = query.clone();
        let results = self
            .with_conn(move |conn| search::search_conversations(conn, &q, skip, limit))
            .await?;
        Ok(SearchResponse {
            success: true,
            query,
            count: results.len(),
            results,
        })
    }

    pub async fn list_conversations(
        &self,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> Result<ListResponse, ServiceError> {
        let limit = self.config.clamp_limit(limit);
        let skip = skip.unwrap_or(0);
        let results = self
            .with_conn(move |conn| store::list_conversations(conn, skip, limit))
            .await?;
        Ok(ListResponse::new(results))
    }

    pub async fn recent_conversations(
        &self,
        limit: Option<usize>,
    ) -> Result<ListResponse, ServiceError> {
        let limit = self.config.clamp_limit(limit);
        let results = self
            .with_conn(move |conn| store::recent_conversations(conn, limit))
            .await?;
        Ok(ListResponse::new(results))
    }

    pub async fn get_conversation(&self, id: i64) -> Result<ConversationRecord, ServiceError> {
        self.with_conn(move |conn| store::get_conversation(conn, id))
            .await
    }

    pub async fn delete_conversation(&self, id: i64) -> Result<DeleteResponse, ServiceError> {
        self.with_conn(move |conn| store::delete_conversation(conn, id))
            .await?;
        tracing::info!(id, "conversation deleted");
        Ok(DeleteResponse {
            success: true,
            conversation_id: id,
            message: format!("deleted conversation {id}"),
        })
    }

    pub async fn stats(&self) -> Result<StatsReply, ServiceError> {
        let recent_days = self.config.search.recent_days;
        let stats = self
            .with_conn(move |conn| conversation_stats(conn, recent_days))
            .await?;
        Ok(StatsReply {
            success: true,
            stats,
        })
    }

    /// Run one tool invocation and return its JSON reply.
    pub async fn execute(&self, request: ToolRequest) -> Result<Value, ServiceError> {
        let tool = request.tool_name();
        tracing::info!(tool, "executing tool");

        match request {
            ToolRequest::CreateConversation(p) => {
                let metadata = p.metadata.as_deref().and_then(parse_metadata);
                let record = self.create_conversation(p.role, p.content, metadata).await?;
                to_value(&CreateConversationResponse {
                    success: true,
                    conversation_id: record.id,
                    message: format!("created conversation {}", record.id),
                })
            }
            ToolRequest::AutoRecordConversation(p) => {
                to_value(&self.auto_record_conversation(p).await?)
            }
            ToolRequest::EnableAutoRecording(p) => to_value(&self.enable_auto_recording(
                p.session_id,
                p.record_user,
                p.record_assistant,
            )),
            ToolRequest::DisableAutoRecording(p) => {
                to_value(&self.disable_auto_recording(p.session_id))
            }
            ToolRequest::GetAutoRecordingStatus(p) => {
                to_value(&self.auto_recording_status(p.session_id))
            }
            ToolRequest::SearchConversations(p) => {
                to_value(&self.search_conversations(p.query, p.skip, p.limit).await?)
            }
            ToolRequest::GetConversationStats => to_value(&self.stats().await?),
            ToolRequest::DeleteConversation(p) => {
                to_value(&self.delete_conversation(p.conversation_id).await?)
            }
            ToolRequest::GetConversation(p) => to_value(&ConversationResponse {
                success: true,
                conversation: self.get_conversation(p.conversation_id).await?,
            }),
            ToolRequest::ListConversations(p) => {
                to_value(&self.list_conversations(p.skip, p.limit).await?)
            }
            ToolRequest::GetRecentConversations(p) => {
                to_value(&self.recent_conversations(p.limit).await?)
            }
        }
    }
}

fn to_value<T: Serialize>(reply: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(reply).map_err(|e| ServiceError::Storage(StorageError::Serialization(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> ConversationService {
        let conn = crate::db::open_memory_database().unwrap();
        ConversationService::new(
            Arc::new(Mutex::new(conn)),
            Arc::new(ContextRecordConfig::default()),
        )
    }

    async fn call(service: &ConversationService, tool: &str, params: Value) -> Value {
        let request = ToolRequest::parse(tool, params).unwrap();
        service.execute(request).await.unwrap()
    }

    #[tokio::test]
    async fn create_broadcasts_to_subscribers() {
        let service = service();
        let mut sub = service.events().register();

        let record = service
            .create_conversation("user".into(), "hello".into(), None)
            .await
            .unwrap();

        let event: Value = serde_json::from_str(&sub.recv().await.unwrap()).unwrap();
        assert_eq!(event["type"], "new_conversation");
        assert_eq!(event["data"]["id"], record.id);
        assert_eq!(event["data"]["content"], "hello");
    }

    #[tokio::test]
    async fn auto_record_respects_session_and_skips_broadcast() {
        let service = service();
        let mut sub = service.events().register();

        let reply = call(
            &service,
            "auto_record_conversation",
            json!({"user_message": "q", "assistant_response": "a", "session_id": "s1"}),
        )
        .await;
        assert_eq!(reply["user_recorded"], false);
        assert_eq!(reply["assistant_recorded"], false);

        call(
            &service,
            "enable_auto_recording",
            json!({"session_id": "s1", "record_assistant": false}),
        )
        .await;

        let reply = call(
            &service,
            "auto_record_conversation",
            json!({
                "user_message": "q",
                "assistant_response": "a",
                "session_id": "s1",
                "context": "{\"topic\": \"rust\"}"
            }),
        )
        .await;
        assert_eq!(reply["user_recorded"], true);
        assert_eq!(reply["assistant_recorded"], false);

        let recent = service.recent_conversations(None).await.unwrap();
        assert_eq!(recent.count, 1);
        assert_eq!(
            recent.results[0].metadata,
            Some(json!({
                "topic": "rust",
                "message_type": "user_input",
                "session_id": "s1",
                "auto_recorded": true
            }))
        );
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn session_defaults_to_configured_name() {
        let service = service();
        let reply = call(&service, "enable_auto_recording", json!({})).await;
        assert_eq!(reply["session_id"], "default");
        assert_eq!(reply["status"], "enabled");

        let status = call(&service, "get_auto_recording_status", Value::Null).await;
        assert_eq!(status["config"]["enabled"], true);

        let reply = call(&service, "disable_auto_recording", json!({})).await;
        assert_eq!(reply["status"], "disabled");
        assert_eq!(reply["config"]["record_user"], true);
    }

    #[tokio::test]
    async fn malformed_metadata_is_wrapped() {
        let service = service();
        let reply = call(
            &service,
            "create_conversation",
            json!({"role": "user", "content": "x", "metadata": "not json"}),
        )
        .await;
        let id = reply["conversation_id"].as_i64().unwrap();

        let record = service.get_conversation(id).await.unwrap();
        assert_eq!(record.metadata, Some(json!({"raw": "not json"})));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let service = service();
        let request =
            ToolRequest::parse("delete_conversation", json!({"conversation_id": 42})).unwrap();
        let err = service.execute(request).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn stats_reply_is_flattened() {
        let service = service();
        service
            .create_conversation("assistant".into(), "hi".into(), None)
            .await
            .unwrap();

        let reply = call(&service, "get_conversation_stats", Value::Null).await;
        assert_eq!(reply["success"], true);
        assert_eq!(reply["total_conversations"], 1);
        assert_eq!(reply["role_distribution"]["assistant"], 1);
        assert_eq!(reply["recent_week_count"], 1);
    }

    #[tokio::test]
    async fn limits_are_clamped() {
        let service = service();
        for i in 0..3 {
            service
                .create_conversation("user".into(), format!("m{i}"), None)
                .await
                .unwrap();
        }
        let reply = service.list_conversations(None, Some(0)).await.unwrap();
        assert_eq!(reply.count, 1);
        assert_eq!(reply.results[0].content, "m0");
    }

    #[tokio::test]
    async fn huge_stats_window_leaves_storage_usable() {
        for days in [i64::MAX, 1_000_000_000] {
            let mut config = ContextRecordConfig::default();
            config.search.recent_days = days;
            let conn = crate::db::open_memory_database().unwrap();
            let service = ConversationService::new(Arc::new(Mutex::new(conn)), Arc::new(config));
            service
                .create_conversation("user".into(), "kept".into(), None)
                .await
                .unwrap();

            let stats = service.stats().await.unwrap();
            assert_eq!(stats.stats.recent_week_count, 1);

            let listed = service.list_conversations(None, None).await.unwrap();
            assert_eq!(listed.count, 1);
        }
    }

    #[tokio::test]
    async fn skip_past_the_end_is_empty() {
        let service = service();
        service
            .create_conversation("user".into(), "rust".into(), None)
            .await
            .unwrap();

        let listed = service.list_conversations(Some(usize::MAX), None).await.unwrap();
        assert_eq!(listed.count, 0);
        let found = service
            .search_conversations("rust".into(), Some(usize::MAX), None)
            .await
            .unwrap();
        assert_eq!(found.count, 0);
    }
}
