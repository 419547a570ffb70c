use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::{future, stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::error::ApiError;
use crate::error::ServiceError;
use crate::events::BroadcastEvent;
use crate::service::ConversationService;
use crate::tools::auto_record_conversation::AutoRecordConversationParams;
use crate::tools::request::{ToolRequest, TOOL_CATALOG};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub role: String,
    pub content: String,
    /// Must be a JSON object when present.
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnableRecordingRequest {
    pub record_user: Option<bool>,
    pub record_assistant: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    pub request_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolCallResponse {
    pub request_id: String,
    pub result: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check(State(service): State<ConversationService>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "contextrecord",
        "version": env!("CARGO_PKG_VERSION"),
        "subscribers": service.events().subscriber_count(),
    }))
}

/// POST /conversations
pub async fn create_conversation(
    State(service): State<ConversationService>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<Response, ApiError> {
    let metadata = match req.metadata {
        None | Some(Value::Null) => None,
        Some(value @ Value::Object(_)) => Some(value),
        Some(_) => {
            return Err(ServiceError::InvalidInput("metadata must be a JSON object".into()).into())
        }
    };
    let record = service
        .create_conversation(req.role, req.content, metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

/// GET /conversations
pub async fn list_conversations(
    State(service): State<ConversationService>,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let reply = service.list_conversations(page.skip, page.limit).await?;
    Ok(Json(reply).into_response())
}

/// GET /conversations/recent
pub async fn recent_conversations(
    State(service): State<ConversationService>,
    Query(q): Query<LimitQuery>,
) -> Result<Response, ApiError> {
    let reply = service.recent_conversations(q.limit).await?;
    Ok(Json(reply).into_response())
}

/// GET /conversations/{id}
pub async fn get_conversation(
    State(service): State<ConversationService>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let record = service.get_conversation(id).await?;
    Ok(Json(record).into_response())
}

/// DELETE /conversations/{id}
pub async fn delete_conversation(
    State(service): State<ConversationService>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let reply = service.delete_conversation(id).await?;
    Ok(Json(reply).into_response())
}

/// GET /search
pub async fn search_conversations(
    State(service): State<ConversationService>,
    Query(q): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let reply = service.search_conversations(q.query, q.skip, q.limit).await?;
    Ok(Json(reply).into_response())
}

/// GET /stats
pub async fn stats(State(service): State<ConversationService>) -> Result<Response, ApiError> {
    let reply = service.stats().await?;
    Ok(Json(reply).into_response())
}

/// GET /sessions
pub async fn list_sessions(State(service): State<ConversationService>) -> impl IntoResponse {
    let sessions = service.list_sessions();
    Json(serde_json::json!({
        "total": sessions.len(),
        "sessions": sessions,
    }))
}

/// GET /sessions/{session_id}/auto-recording
pub async fn auto_recording_status(
    State(service): State<ConversationService>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    Json(service.auto_recording_status(Some(session_id)))
}

/// POST /sessions/{session_id}/auto-recording
///
/// The body is optional; both role flags default to true.
pub async fn enable_auto_recording(
    State(service): State<ConversationService>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req: EnableRecordingRequest = if body.is_empty() {
        EnableRecordingRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ServiceError::InvalidInput(format!("invalid request body: {e}")))?
    };
    let reply =
        service.enable_auto_recording(Some(session_id), req.record_user, req.record_assistant);
    Ok(Json(reply).into_response())
}

/// DELETE /sessions/{session_id}/auto-recording
pub async fn disable_auto_recording(
    State(service): State<ConversationService>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    Json(service.disable_auto_recording(Some(session_id)))
}

/// POST /auto-record
pub async fn auto_record(
    State(service): State<ConversationService>,
    Json(params): Json<AutoRecordConversationParams>,
) -> Result<Response, ApiError> {
    let reply = service.auto_record_conversation(params).await?;
    Ok(Json(reply).into_response())
}

/// GET /events
///
/// Sends a `connected` event, then every broadcast. The subscriber is
/// released when the client goes away and the stream is dropped.
pub async fn events(
    State(service): State<ConversationService>,
) -> Sse<impl Stream<Item = Result<Event, serde_json::Error>>> {
    let subscriber = service.events().register();
    tracing::info!(
        subscribers = service.events().subscriber_count(),
        "event stream opened"
    );

    let connected =
        serde_json::to_string(&BroadcastEvent::connected()).map(|json| Event::default().data(json));

    let updates = stream::unfold(subscriber, |mut subscriber| async move {
        let message = subscriber.recv().await?;
        Some((Ok::<_, serde_json::Error>(Event::default().data(message)), subscriber))
    });

    let keep_alive = Duration::from_secs(service.config().events.keep_alive_secs.max(1));
    Sse::new(stream::once(future::ready(connected)).chain(updates))
        .keep_alive(KeepAlive::new().interval(keep_alive))
}

/// GET /tools/list
pub async fn list_tools() -> impl IntoResponse {
    let tools: Vec<ToolInfo> = TOOL_CATALOG
        .iter()
        .map(|&(name, description)| ToolInfo { name, description })
        .collect();
    Json(serde_json::json!({
        "total": tools.len(),
        "tools": tools,
    }))
}

/// POST /tools/call
///
/// Unknown tools and malformed parameters are request errors; a failure
/// while running the tool is reported in the `error` field.
pub async fn call_tool(
    State(service): State<ConversationService>,
    Json(call): Json<ToolCallRequest>,
) -> Result<Response, ApiError> {
    let request = ToolRequest::parse(&call.tool_name, call.parameters).map_err(ServiceError::from)?;

    let reply = match service.execute(request).await {
        Ok(result) => ToolCallResponse {
            request_id: call.request_id,
            result: Some(result),
            error: None,
        },
        Err(e) => {
            tracing::warn!(tool = %call.tool_name, error = %e, "tool call failed");
            ToolCallResponse {
                request_id: call.request_id,
                result: None,
                error: Some(e.to_string()),
            }
        }
    };
    Ok(Json(reply).into_response())
}
