//! HTTP API over the conversation service.
//!
//! - `POST /conversations`, `GET /conversations[/recent|/{id}]`, `DELETE /conversations/{id}`
//! - `GET /search`, `GET /stats`
//! - `GET /sessions`, `GET|POST|DELETE /sessions/{id}/auto-recording`, `POST /auto-record`
//! - `GET /events` - server-sent event stream of new conversations
//! - `GET /tools/list`, `POST /tools/call`
//! - `GET /health`

mod error;
mod handlers;
mod routes;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
