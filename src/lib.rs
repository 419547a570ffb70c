//! Conversation recording for AI assistants, over MCP and HTTP.
//!
//! contextrecord stores chat turns (role, content, optional JSON metadata) in
//! SQLite and serves them through two front ends that share one
//! [`service::ConversationService`]:
//!
//! - an [MCP](https://modelcontextprotocol.io/) tool server (stdio, or
//!   streamable HTTP at `/mcp`)
//! - an HTTP API with a server-sent event stream of newly created records
//!
//! Auto recording is switched per session. Once a session is enabled,
//! `auto_record_conversation` stores the user and assistant messages that
//! the session's role flags allow.
//!
//! # Modules
//!
//! - [`config`]: configuration from TOML and environment variables
//! - [`db`]: SQLite initialization, schema, migrations and health checks
//! - [`conversation`]: conversation storage, search and statistics
//! - [`recording`]: per-session switches and the auto-record gate
//! - [`events`]: fan-out of new-conversation events to subscribers
//! - [`service`]: the shared service behind every front end
//! - [`tools`]: MCP tool definitions and the typed tool request
//! - [`http`]: the axum HTTP API

pub mod cli;
pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod events;
pub mod http;
pub mod recording;
pub mod server;
pub mod service;
pub mod tools;
