//! Collaboration workflow: request lifecycle and campaign promotion.

use std::collections::HashSet;

use chrono::Utc;
use soko_common::{AppError, AppResult, IdGenerator};
use soko_store::DocumentStore;
use soko_store::entities::{
    AdminAction, AdminActionStatus, CampaignRequest, CampaignSaga, CampaignStatus,
    CollaborationRequest, CollaborationStatus, Role,
};

use crate::services::notification::NotificationService;
use crate::services::subscription::{SubscriptionPolicy, Tier};

/// Input for promoting an accepted collaboration into a campaign.
#[derive(Debug, Clone)]
pub struct CreateCampaignInput {
    pub request_id: String,
    pub product_id: String,
    /// Influencer commission percentage, 1..=100.
    pub commission: u8,
    /// Campaign duration in days, > 0.
    pub duration_days: u32,
    pub details: Option<String>,
}

/// Result of a campaign creation: the campaign and its gating admin action.
#[derive(Debug, Clone)]
pub struct CampaignCreated {
    pub campaign: CampaignRequest,
    pub admin_action: AdminAction,
}

/// State machine over collaboration requests.
///
/// Pending requests move to accepted or declined by the seller; an accepted
/// request may be promoted into exactly one campaign request, which is the
/// single multi-entity transition in the system and runs as a saga keyed by
/// the collaboration id.
#[derive(Clone)]
pub struct CollaborationService {
    store: DocumentStore,
    notifier: NotificationService,
    policy: SubscriptionPolicy,
    id_gen: IdGenerator,
}

impl CollaborationService {
    /// Create a new collaboration service.
    #[must_use]
    pub const fn new(
        store: DocumentStore,
        notifier: NotificationService,
        policy: SubscriptionPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a pending collaboration request from an influencer to a
    /// seller. At most one active request may exist per pair.
    pub async fn create(
        &self,
        seller_id: &str,
        influencer_id: &str,
        product_name: Option<String>,
        details: Option<String>,
    ) -> AppResult<CollaborationRequest> {
        let seller_id = seller_id.to_string();
        let influencer_id = influencer_id.to_string();
        let id = self.id_gen.generate();

        self.store
            .update(move |doc| {
                let seller = doc
                    .user(&seller_id)
                    .ok_or_else(|| AppError::UserNotFound(seller_id.clone()))?;
                if seller.role != Role::Seller {
                    return Err(AppError::RoleViolation(
                        "Collaboration requests are addressed to sellers".to_string(),
                    ));
                }
                let influencer = doc
                    .user(&influencer_id)
                    .ok_or_else(|| AppError::UserNotFound(influencer_id.clone()))?;
                if influencer.role != Role::Influencer {
                    return Err(AppError::RoleViolation(
                        "Only influencers can request collaborations".to_string(),
                    ));
                }

                // Uniqueness is enforced here, at write time.
                let duplicate = doc.collaboration_requests.iter().any(|r| {
                    r.seller_id == seller_id && r.influencer_id == influencer_id && r.is_active()
                });
                if duplicate {
                    return Err(AppError::Conflict(
                        "An active collaboration request already exists for this pair"
                            .to_string(),
                    ));
                }

                let request = CollaborationRequest {
                    id: id.clone(),
                    seller_id: seller_id.clone(),
                    influencer_id: influencer_id.clone(),
                    status: CollaborationStatus::Pending,
                    product_name: product_name.clone(),
                    details: details.clone(),
                    campaign_request_id: None,
                    created_at: Utc::now(),
                    status_updated_at: None,
                };
                doc.collaboration_requests.push(request.clone());
                Ok(request)
            })
            .await
    }

    /// Accept a pending request as the seller.
    ///
    /// Refused with `LimitExceeded` when the seller's other active
    /// collaborations already fill the tier ceiling, unless
    /// `override_limit` is set by an administrative caller.
    pub async fn accept(
        &self,
        request_id: &str,
        seller_id: &str,
        override_limit: bool,
    ) -> AppResult<CollaborationRequest> {
        let request_id_owned = request_id.to_string();
        let seller_id_owned = seller_id.to_string();
        let policy = self.policy;

        let (request, seller_name) = self
            .store
            .update(move |doc| {
                let request = doc
                    .collaboration(&request_id_owned)
                    .ok_or_else(|| AppError::NotFound(format!("Request {request_id_owned}")))?;
                if request.seller_id != seller_id_owned {
                    return Err(AppError::RoleViolation(
                        "Request belongs to a different seller".to_string(),
                    ));
                }
                if request.status != CollaborationStatus::Pending {
                    return Err(AppError::Conflict(
                        "Only pending requests can be accepted".to_string(),
                    ));
                }

                let seller = doc
                    .user(&seller_id_owned)
                    .ok_or_else(|| AppError::UserNotFound(seller_id_owned.clone()))?;
                let tier = Tier::parse(seller.tier.as_deref());
                let seller_name = seller.name.clone().unwrap_or_else(|| seller.username.clone());

                // Other active collaborations; the request being accepted
                // does not count against its own ceiling.
                let active = doc
                    .collaboration_requests
                    .iter()
                    .filter(|r| {
                        r.seller_id == seller_id_owned && r.id != request_id_owned && r.is_active()
                    })
                    .count();
                if !override_limit && !policy.can_accept(active, tier) {
                    return Err(AppError::LimitExceeded {
                        current: active,
                        limit: tier.limits().collaborations.unwrap_or(0),
                    });
                }

                let request = doc
                    .collaboration_mut(&request_id_owned)
                    .ok_or_else(|| AppError::NotFound(format!("Request {request_id_owned}")))?;
                request.status = CollaborationStatus::Accepted;
                request.status_updated_at = Some(Utc::now());
                Ok((request.clone(), seller_name))
            })
            .await?;

        if let Err(e) = self
            .notifier
            .notify(
                seller_id,
                &request.influencer_id,
                &format!("{seller_name} accepted your collaboration request"),
            )
            .await
        {
            tracing::warn!(error = %e, request_id, "Failed to notify influencer of acceptance");
        }

        Ok(request)
    }

    /// Decline a pending request as the seller. No subscription check.
    pub async fn decline(&self, request_id: &str, seller_id: &str) -> AppResult<CollaborationRequest> {
        let request_id_owned = request_id.to_string();
        let seller_id_owned = seller_id.to_string();

        let (request, seller_name) = self
            .store
            .update(move |doc| {
                let request = doc
                    .collaboration(&request_id_owned)
                    .ok_or_else(|| AppError::NotFound(format!("Request {request_id_owned}")))?;
                if request.seller_id != seller_id_owned {
                    return Err(AppError::RoleViolation(
                        "Request belongs to a different seller".to_string(),
                    ));
                }
                if request.status != CollaborationStatus::Pending {
                    return Err(AppError::Conflict(
                        "Only pending requests can be declined".to_string(),
                    ));
                }

                let seller_name = doc
                    .user(&seller_id_owned)
                    .map(|s| s.name.clone().unwrap_or_else(|| s.username.clone()))
                    .unwrap_or_else(|| seller_id_owned.clone());

                let request = doc
                    .collaboration_mut(&request_id_owned)
                    .ok_or_else(|| AppError::NotFound(format!("Request {request_id_owned}")))?;
                request.status = CollaborationStatus::Declined;
                request.status_updated_at = Some(Utc::now());
                Ok((request.clone(), seller_name))
            })
            .await?;

        if let Err(e) = self
            .notifier
            .notify(
                seller_id,
                &request.influencer_id,
                &format!("{seller_name} declined your collaboration request"),
            )
            .await
        {
            tracing::warn!(error = %e, request_id, "Failed to notify influencer of decline");
        }

        Ok(request)
    }

    /// Promote an accepted collaboration into a campaign request.
    ///
    /// The one multi-entity transition: campaign request, collaboration
    /// linkage, admin action, and the outgoing message commit together. A
    /// saga marker persisted first makes a death between the two saves
    /// detectable; retrying with the same collaboration id completes the
    /// sequence (or returns the already-created campaign) instead of
    /// duplicating records.
    pub async fn create_campaign(&self, input: CreateCampaignInput) -> AppResult<CampaignCreated> {
        let campaign_id = self.id_gen.generate();

        // Phase one: validate and persist the saga marker.
        let reserved = {
            let input = input.clone();
            let campaign_id = campaign_id.clone();
            self.store
                .update(move |doc| {
                    let request = doc
                        .collaboration(&input.request_id)
                        .ok_or_else(|| AppError::NotFound(format!("Request {}", input.request_id)))?;

                    // Idempotent retry: the campaign already committed.
                    if let Some(existing) = &request.campaign_request_id
                        && let Some(campaign) = doc.campaign(existing)
                    {
                        return Ok(Some(campaign.id.clone()));
                    }

                    if request.status != CollaborationStatus::Accepted {
                        return Err(AppError::Conflict(
                            "Campaigns require an accepted collaboration".to_string(),
                        ));
                    }
                    if !(1..=100).contains(&input.commission) {
                        return Err(AppError::Validation(
                            "Commission must be between 1 and 100".to_string(),
                        ));
                    }
                    if input.duration_days == 0 {
                        return Err(AppError::Validation(
                            "Campaign duration must be at least one day".to_string(),
                        ));
                    }

                    let product = doc
                        .product(&input.product_id)
                        .ok_or_else(|| AppError::NotFound(format!("Product {}", input.product_id)))?;
                    if product.seller_id != request.seller_id {
                        return Err(AppError::Validation(
                            "Product belongs to a different seller".to_string(),
                        ));
                    }
                    if !product.verified {
                        return Err(AppError::Validation(
                            "Product must be verified before it can be campaigned".to_string(),
                        ));
                    }

                    // A marker left by an earlier partial run keeps its
                    // reserved campaign id.
                    if let Some(saga) = doc.saga(&input.request_id) {
                        return Ok(Some(saga.campaign_request_id.clone()));
                    }

                    doc.pending_sagas.push(CampaignSaga {
                        collaboration_request_id: input.request_id.clone(),
                        campaign_request_id: campaign_id.clone(),
                        started_at: Utc::now(),
                    });
                    Ok(None)
                })
                .await?
        };
        let campaign_id = reserved.unwrap_or(campaign_id);

        // Phase two: commit all entities and clear the marker in one save.
        let action_id = self.id_gen.generate();
        let result = {
            let input = input.clone();
            let campaign_id = campaign_id.clone();
            self.store
                .update(move |doc| {
                    let request = doc
                        .collaboration(&input.request_id)
                        .ok_or_else(|| AppError::NotFound(format!("Request {}", input.request_id)))?
                        .clone();

                    // Already committed by this or a concurrent retry.
                    if let Some(existing) = &request.campaign_request_id
                        && let Some(campaign) = doc.campaign(existing).cloned()
                    {
                        let admin_action = doc
                            .admin_actions
                            .iter()
                            .find(|a| a.campaign_request_id.as_deref() == Some(existing.as_str()))
                            .cloned()
                            .ok_or_else(|| {
                                AppError::Internal(format!(
                                    "Campaign {existing} has no admin action"
                                ))
                            })?;
                        doc.clear_saga(&input.request_id);
                        return Ok(CampaignCreated {
                            campaign,
                            admin_action,
                        });
                    }

                    let product = doc
                        .product(&input.product_id)
                        .ok_or_else(|| AppError::NotFound(format!("Product {}", input.product_id)))?
                        .clone();

                    let now = Utc::now();
                    let campaign = CampaignRequest {
                        id: campaign_id.clone(),
                        collaboration_request_id: request.id.clone(),
                        seller_id: request.seller_id.clone(),
                        influencer_id: request.influencer_id.clone(),
                        product_id: product.id.clone(),
                        product_name: product.name.clone(),
                        commission: input.commission,
                        campaign_duration_days: input.duration_days,
                        details: input.details.clone(),
                        status: CampaignStatus::Pending,
                        created_at: now,
                        status_updated_at: None,
                    };
                    doc.campaign_requests.push(campaign.clone());

                    let linked = doc
                        .collaboration_mut(&request.id)
                        .ok_or_else(|| AppError::NotFound(format!("Request {}", request.id)))?;
                    linked.campaign_request_id = Some(campaign_id.clone());
                    linked.product_name = Some(product.name.clone());

                    let admin_action = AdminAction {
                        id: action_id.clone(),
                        admin_id: None,
                        action: "Campaign Approval Request".to_string(),
                        user_id: request.seller_id.clone(),
                        campaign_request_id: Some(campaign_id.clone()),
                        status: AdminActionStatus::Pending,
                        details: Some(format!(
                            "Campaign approval requested for product {}",
                            product.name
                        )),
                        created_at: now,
                        status_updated_at: None,
                    };
                    doc.admin_actions.push(admin_action.clone());

                    NotificationService::append_in(
                        doc,
                        &request.seller_id,
                        &request.influencer_id,
                        format!(
                            "A campaign for {} was submitted for approval",
                            product.name
                        ),
                    );

                    doc.clear_saga(&request.id);
                    Ok(CampaignCreated {
                        campaign,
                        admin_action,
                    })
                })
                .await
        };

        // A failed second save leaves only the marker behind: detectable,
        // repairable partial state. Surface it distinctly so callers retry
        // with the same request id.
        match result {
            Err(AppError::StoreUnavailable(e)) => Err(AppError::PartialFailure(format!(
                "Campaign creation for request {} did not commit ({e}); retry with the same request id",
                input.request_id
            ))),
            other => other,
        }
    }

    /// Cancel a still-pending campaign, unlinking it so a new one can be
    /// created from the collaboration.
    pub async fn cancel_campaign(
        &self,
        request_id: &str,
        seller_id: &str,
    ) -> AppResult<CollaborationRequest> {
        let request_id = request_id.to_string();
        let seller_id = seller_id.to_string();

        self.store
            .update(move |doc| {
                let request = doc
                    .collaboration(&request_id)
                    .ok_or_else(|| AppError::NotFound(format!("Request {request_id}")))?
                    .clone();
                if request.seller_id != seller_id {
                    return Err(AppError::RoleViolation(
                        "Request belongs to a different seller".to_string(),
                    ));
                }
                let campaign_id = request.campaign_request_id.clone().ok_or_else(|| {
                    AppError::Conflict("Collaboration has no campaign to cancel".to_string())
                })?;
                let campaign = doc
                    .campaign(&campaign_id)
                    .ok_or_else(|| AppError::NotFound(format!("Campaign {campaign_id}")))?;
                if campaign.status != CampaignStatus::Pending {
                    return Err(AppError::Conflict(
                        "Only pending campaigns can be cancelled".to_string(),
                    ));
                }

                let now = Utc::now();
                doc.campaign_requests.retain(|c| c.id != campaign_id);
                if let Some(action) = doc.admin_action_for_campaign_mut(&campaign_id) {
                    action.status = AdminActionStatus::Rejected;
                    action.details = Some("Cancelled by seller".to_string());
                    action.status_updated_at = Some(now);
                }
                let request = doc
                    .collaboration_mut(&request_id)
                    .ok_or_else(|| AppError::NotFound(format!("Request {request_id}")))?;
                request.campaign_request_id = None;
                request.status_updated_at = Some(now);
                Ok(request.clone())
            })
            .await
    }

    /// Requests addressed to a seller, newest first, collapsed per
    /// (influencer, status) to the most recent record.
    pub async fn list_for_seller(&self, seller_id: &str) -> AppResult<Vec<CollaborationRequest>> {
        let doc = self.store.snapshot().await;
        let requests = doc
            .collaboration_requests
            .iter()
            .filter(|r| r.seller_id == seller_id)
            .cloned()
            .collect();
        Ok(dedup_latest(requests, |r| r.influencer_id.clone()))
    }

    /// Requests created by an influencer, newest first, collapsed per
    /// (seller, status) to the most recent record.
    pub async fn list_for_influencer(
        &self,
        influencer_id: &str,
    ) -> AppResult<Vec<CollaborationRequest>> {
        let doc = self.store.snapshot().await;
        let requests = doc
            .collaboration_requests
            .iter()
            .filter(|r| r.influencer_id == influencer_id)
            .cloned()
            .collect();
        Ok(dedup_latest(requests, |r| r.seller_id.clone()))
    }

    /// A campaign request by id.
    pub async fn get_campaign(&self, campaign_id: &str) -> AppResult<CampaignRequest> {
        let doc = self.store.snapshot().await;
        doc.campaign(campaign_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Campaign request {campaign_id}")))
    }

    /// Number of requests counting against a seller's subscription ceiling.
    pub async fn active_count(&self, seller_id: &str) -> AppResult<usize> {
        let doc = self.store.snapshot().await;
        Ok(doc
            .collaboration_requests
            .iter()
            .filter(|r| r.seller_id == seller_id && r.is_active())
            .count())
    }
}

/// Collapse duplicate records per (counterparty, status), keeping the most
/// recent by creation time. Legacy documents can hold duplicates written
/// before uniqueness was enforced at insert.
fn dedup_latest(
    mut requests: Vec<CollaborationRequest>,
    counterparty: impl Fn(&CollaborationRequest) -> String,
) -> Vec<CollaborationRequest> {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let mut seen = HashSet::new();
    requests.retain(|r| seen.insert((counterparty(r), r.status)));
    requests
}
