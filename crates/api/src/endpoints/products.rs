//! Product catalog endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use soko_common::AppResult;
use soko_store::entities::Product;
use validator::Validate;

use crate::middleware::AppState;

/// Product response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub seller_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub verified: bool,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            seller_id: p.seller_id,
            name: p.name,
            description: p.description,
            price: p.price,
            verified: p.verified,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Product creation body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub seller_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.01))]
    pub price: f64,
}

/// List a new product.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    req.validate()?;
    let product = state
        .catalog
        .create_product(&req.seller_id, &req.name, req.description, req.price)
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Product verification body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProductRequest {
    pub admin_id: String,
}

/// Verify a product for campaign eligibility.
async fn verify(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VerifyProductRequest>,
) -> AppResult<Json<ProductResponse>> {
    let product = state.catalog.verify_product(&id, &req.admin_id).await?;
    Ok(Json(product.into()))
}

/// Get a product.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let product = state.catalog.get(&id).await?;
    Ok(Json(product.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_product))
        .route("/{id}/verify", post(verify))
}
