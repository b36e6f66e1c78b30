//! User endpoints: profiles, follow relationships, suggestions.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use soko_common::AppResult;
use soko_core::SuggestedFollow;
use soko_store::entities::{FollowEntry, Role, User};

use crate::endpoints::products::ProductResponse;
use crate::middleware::AppState;

/// Follow request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub target_id: String,
}

/// Follow state response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub following: bool,
}

/// Follow a seller or influencer.
async fn follow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FollowRequest>,
) -> AppResult<Json<FollowResponse>> {
    state.social_graph.follow(&id, &req.target_id).await?;
    Ok(Json(FollowResponse { following: true }))
}

/// Unfollow a previously followed account.
async fn unfollow(
    State(state): State<AppState>,
    Path((id, target_id)): Path<(String, String)>,
) -> AppResult<Json<FollowResponse>> {
    state.social_graph.unfollow(&id, &target_id).await?;
    Ok(Json(FollowResponse { following: false }))
}

/// User profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub account_type: Role,
    pub tier: Option<String>,
    pub followers_count: u32,
    pub following_count: u32,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            profile_image: u.profile_image,
            account_type: u.role,
            tier: u.tier,
            followers_count: u.followers_count,
            following_count: u.following_count,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Get a user profile.
async fn profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.social_graph.get_user(&id).await?;
    Ok(Json(user.into()))
}

/// Denormalized follow entry response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEntryResponse {
    pub user_id: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub account_type: Role,
    pub followed_at: String,
}

impl From<FollowEntry> for FollowEntryResponse {
    fn from(e: FollowEntry) -> Self {
        Self {
            user_id: e.user_id,
            name: e.name,
            profile_image: e.profile_image,
            account_type: e.account_type,
            followed_at: e.followed_at.to_rfc3339(),
        }
    }
}

/// Followers of a user.
async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<FollowEntryResponse>>> {
    let followers = state.social_graph.get_followers(&id).await?;
    Ok(Json(followers.into_iter().map(Into::into).collect()))
}

/// Accounts a user follows.
async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<FollowEntryResponse>>> {
    let following = state.social_graph.get_following(&id).await?;
    Ok(Json(following.into_iter().map(Into::into).collect()))
}

/// Ranked follow suggestion response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub user_id: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub account_type: Role,
    pub followers_count: u32,
}

impl From<SuggestedFollow> for SuggestionResponse {
    fn from(s: SuggestedFollow) -> Self {
        Self {
            user_id: s.user_id,
            name: s.name,
            profile_image: s.profile_image,
            account_type: s.account_type,
            followers_count: s.followers_count,
        }
    }
}

/// Suggested accounts to follow.
async fn suggestions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<SuggestionResponse>>> {
    let suggestions = state.social_graph.suggested_follows(&id).await?;
    Ok(Json(suggestions.into_iter().map(Into::into).collect()))
}

/// A seller's catalog.
async fn seller_products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state.catalog.list_for_seller(&id).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(profile))
        .route("/{id}/follow", post(follow))
        .route("/{id}/follow/{target_id}", delete(unfollow))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
        .route("/{id}/suggestions", get(suggestions))
        .route("/{id}/products", get(seller_products))
}
