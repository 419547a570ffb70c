//! Server initialization for the MCP stdio transport and the HTTP API.
//!
//! [`serve_stdio`] runs the MCP tools over stdin/stdout. [`serve_http`] runs
//! the HTTP API, the event stream and the MCP streamable HTTP transport
//! (at `/mcp`) on one listener, all sharing a single [`ConversationService`].

use crate::config::ContextRecordConfig;
use crate::db;
use crate::http;
use crate::service::ConversationService;
use crate::tools::ContextRecordTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Shared setup: open the database and build the service around it.
pub fn build_service(config: ContextRecordConfig) -> Result<ConversationService> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    Ok(ConversationService::new(
        Arc::new(Mutex::new(conn)),
        Arc::new(config),
    ))
}

/// Build the full HTTP application: API routes plus MCP at `/mcp`.
pub fn build_app(service: ConversationService) -> axum::Router {
    let mcp_service = service.clone();
    let mcp = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(ContextRecordTools::new(mcp_service.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    http::create_router(service).nest_service("/mcp", mcp)
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: ContextRecordConfig) -> Result<()> {
    tracing::info!("starting contextrecord MCP server on stdio");

    let service = build_service(config)?;

    let tools = ContextRecordTools::new(service);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the HTTP API, SSE event stream and MCP streamable HTTP transport.
pub async fn serve_http(config: ContextRecordConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting contextrecord HTTP server");

    let service = build_service(config)?;
    let router = build_app(service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        addr = %bind_addr,
        "listening at http://{bind_addr} (MCP at /mcp, events at /events)"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
