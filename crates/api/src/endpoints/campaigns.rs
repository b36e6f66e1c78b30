//! Campaign request endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use soko_common::AppResult;
use soko_core::CreateCampaignInput;
use soko_store::entities::{CampaignRequest, CampaignStatus};
use validator::Validate;

use crate::endpoints::admin::AdminActionResponse;
use crate::middleware::AppState;

/// Campaign request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: String,
    pub collaboration_request_id: String,
    pub seller_id: String,
    pub influencer_id: String,
    pub product_id: String,
    pub product_name: String,
    pub commission: u8,
    pub campaign_duration: u32,
    pub details: Option<String>,
    pub status: CampaignStatus,
    pub created_at: String,
    pub status_updated_at: Option<String>,
}

impl From<CampaignRequest> for CampaignResponse {
    fn from(c: CampaignRequest) -> Self {
        Self {
            id: c.id,
            collaboration_request_id: c.collaboration_request_id,
            seller_id: c.seller_id,
            influencer_id: c.influencer_id,
            product_id: c.product_id,
            product_name: c.product_name,
            commission: c.commission,
            campaign_duration: c.campaign_duration_days,
            details: c.details,
            status: c.status,
            created_at: c.created_at.to_rfc3339(),
            status_updated_at: c.status_updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Campaign creation body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    /// The accepted collaboration being promoted; also the idempotency key
    /// for retries.
    pub request_id: String,
    pub product_id: String,
    #[validate(range(min = 1, max = 100))]
    pub commission: u8,
    /// Duration in days.
    #[validate(range(min = 1))]
    pub duration: u32,
    pub details: Option<String>,
}

/// Created campaign plus its gating admin action.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCreatedResponse {
    pub campaign_request: CampaignResponse,
    pub admin_action: AdminActionResponse,
}

/// Promote an accepted collaboration into a campaign request.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCampaignRequest>,
) -> AppResult<(StatusCode, Json<CampaignCreatedResponse>)> {
    req.validate()?;
    let created = state
        .collaborations
        .create_campaign(CreateCampaignInput {
            request_id: req.request_id,
            product_id: req.product_id,
            commission: req.commission,
            duration_days: req.duration,
            details: req.details,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CampaignCreatedResponse {
            campaign_request: created.campaign.into(),
            admin_action: created.admin_action.into(),
        }),
    ))
}

/// Get a campaign request.
async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CampaignResponse>> {
    let campaign = state.collaborations.get_campaign(&id).await?;
    Ok(Json(campaign.into()))
}

/// Cancellation query: the acting seller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelQuery {
    pub seller_id: String,
}

/// Cancel a still-pending campaign.
async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CancelQuery>,
) -> AppResult<Json<super::collaborations::CollaborationResponse>> {
    let campaign = state.collaborations.get_campaign(&id).await?;
    let request = state
        .collaborations
        .cancel_campaign(&campaign.collaboration_request_id, &query.seller_id)
        .await?;
    Ok(Json(request.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_campaign).delete(cancel))
}
