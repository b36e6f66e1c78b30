//! HTTP API layer for soko.
//!
//! REST endpoints over the core services: follow relationships, the
//! collaboration/campaign workflow, admin approvals, the product catalog,
//! and message inboxes. Built on Axum 0.8 with Tower middleware.

pub mod endpoints;
pub mod middleware;

pub use endpoints::router;
pub use middleware::AppState;
