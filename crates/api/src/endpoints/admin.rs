//! Admin action endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use soko_common::{AppError, AppResult};
use soko_store::entities::{AdminAction, AdminActionStatus};

use crate::endpoints::campaigns::CampaignResponse;
use crate::middleware::AppState;

/// Admin action response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActionResponse {
    pub id: String,
    pub admin_id: Option<String>,
    pub action: String,
    pub user_id: String,
    pub campaign_request_id: Option<String>,
    pub status: AdminActionStatus,
    pub details: Option<String>,
    pub created_at: String,
    pub status_updated_at: Option<String>,
}

impl From<AdminAction> for AdminActionResponse {
    fn from(a: AdminAction) -> Self {
        Self {
            id: a.id,
            admin_id: a.admin_id,
            action: a.action,
            user_id: a.user_id,
            campaign_request_id: a.campaign_request_id,
            status: a.status,
            details: a.details,
            created_at: a.created_at.to_rfc3339(),
            status_updated_at: a.status_updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Resolution body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveActionRequest {
    /// "approved" or "rejected".
    pub status: String,
    pub admin_id: String,
}

/// Resolved action plus the campaign it propagated to.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedActionResponse {
    pub admin_action: AdminActionResponse,
    pub campaign_request: CampaignResponse,
}

/// Resolve an admin action, propagating to its campaign request.
async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveActionRequest>,
) -> AppResult<Json<ResolvedActionResponse>> {
    let status = match req.status.as_str() {
        "approved" => AdminActionStatus::Approved,
        "rejected" => AdminActionStatus::Rejected,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown status {other:?}; expected approved or rejected"
            )));
        }
    };

    let decision = state
        .admin
        .resolve_by_action(&id, status, &req.admin_id)
        .await?;
    Ok(Json(ResolvedActionResponse {
        admin_action: decision.admin_action.into(),
        campaign_request: decision.campaign.into(),
    }))
}

/// Listing filter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Pending admin actions, newest first.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<AdminActionResponse>>> {
    match query.status.as_deref() {
        None | Some("pending") => {}
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unsupported status filter {other:?}"
            )));
        }
    }
    let actions = state.admin.list_pending().await?;
    Ok(Json(actions.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", put(resolve))
}
