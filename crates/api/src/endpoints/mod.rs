//! API endpoints.

mod admin;
mod campaigns;
mod collaborations;
mod messages;
mod products;
mod users;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::middleware::AppState;

/// Liveness probe.
async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/users", users::router().merge(messages::router()))
        .nest("/products", products::router())
        .nest("/collaboration-requests", collaborations::router())
        .nest("/campaign-requests", campaigns::router())
        .nest("/admin-actions", admin::router())
}
