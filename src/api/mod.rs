//! HTTP API.
//!
//! Exposes the verification pipeline, document uploads, the scheme
//! registry and the admin surface as JSON endpoints nested under `/api/`.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server_on, ApiServer, ServerInfo};
pub use types::ApiContext;
