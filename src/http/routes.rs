use super::handlers;
use crate::service::ConversationService;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(service: ConversationService) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Conversation records
        .route(
            "/conversations",
            get(handlers::list_conversations).post(handlers::create_conversation),
        )
        .route("/conversations/recent", get(handlers::recent_conversations))
        .route(
            "/conversations/{id}",
            get(handlers::get_conversation).delete(handlers::delete_conversation),
        )
        .route("/search", get(handlers::search_conversations))
        .route("/stats", get(handlers::stats))
        // Auto recording
        .route("/sessions", get(handlers::list_sessions))
        .route(
            "/sessions/{session_id}/auto-recording",
            get(handlers::auto_recording_status)
                .post(handlers::enable_auto_recording)
                .delete(handlers::disable_auto_recording),
        )
        .route("/auto-record", post(handlers::auto_record))
        // Live events
        .route("/events", get(handlers::events))
        // Tool calls
        .route("/tools/list", get(handlers::list_tools))
        .route("/tools/call", post(handlers::call_tool))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
