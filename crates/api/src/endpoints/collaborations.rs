//! Collaboration request endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{post, put},
};
use serde::{Deserialize, Serialize};
use soko_common::{AppError, AppResult};
use soko_store::entities::{CollaborationRequest, CollaborationStatus};

use crate::middleware::AppState;

/// Collaboration request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationResponse {
    pub id: String,
    pub seller_id: String,
    pub influencer_id: String,
    pub status: CollaborationStatus,
    pub product_name: Option<String>,
    pub details: Option<String>,
    pub campaign_request_id: Option<String>,
    pub created_at: String,
    pub status_updated_at: Option<String>,
}

impl From<CollaborationRequest> for CollaborationResponse {
    fn from(r: CollaborationRequest) -> Self {
        Self {
            id: r.id,
            seller_id: r.seller_id,
            influencer_id: r.influencer_id,
            status: r.status,
            product_name: r.product_name,
            details: r.details,
            campaign_request_id: r.campaign_request_id,
            created_at: r.created_at.to_rfc3339(),
            status_updated_at: r.status_updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Collaboration creation body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollaborationRequest {
    pub seller_id: String,
    pub influencer_id: String,
    pub product_name: Option<String>,
    pub details: Option<String>,
}

/// Create a pending collaboration request.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCollaborationRequest>,
) -> AppResult<(StatusCode, Json<CollaborationResponse>)> {
    let request = state
        .collaborations
        .create(
            &req.seller_id,
            &req.influencer_id,
            req.product_name,
            req.details,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

/// Listing filter: exactly one side of the pair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub seller_id: Option<String>,
    pub influencer_id: Option<String>,
}

/// List requests for a seller or an influencer, duplicates collapsed.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<CollaborationResponse>>> {
    let requests = match (query.seller_id, query.influencer_id) {
        (Some(seller_id), None) => state.collaborations.list_for_seller(&seller_id).await?,
        (None, Some(influencer_id)) => {
            state
                .collaborations
                .list_for_influencer(&influencer_id)
                .await?
        }
        _ => {
            return Err(AppError::Validation(
                "Provide exactly one of sellerId or influencerId".to_string(),
            ));
        }
    };
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Requested status transition.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Accepted,
    Declined,
}

/// Status update body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollaborationRequest {
    pub status: UpdateStatus,
    pub seller_id: String,
    /// Administrative bypass of the subscription ceiling.
    #[serde(default)]
    pub override_limit: bool,
}

/// Accept or decline a pending request as the seller.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCollaborationRequest>,
) -> AppResult<Json<CollaborationResponse>> {
    let request = match req.status {
        UpdateStatus::Accepted => {
            state
                .collaborations
                .accept(&id, &req.seller_id, req.override_limit)
                .await?
        }
        UpdateStatus::Declined => state.collaborations.decline(&id, &req.seller_id).await?,
    };
    Ok(Json(request.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/{id}", put(update))
}
