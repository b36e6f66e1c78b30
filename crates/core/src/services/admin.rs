//! Admin approval gate for campaign requests.

use chrono::Utc;
use soko_common::{AppError, AppResult};
use soko_store::DocumentStore;
use soko_store::entities::{
    AdminAction, AdminActionStatus, CampaignRequest, CampaignStatus, Role,
};

use crate::services::notification::NotificationService;

/// Gates campaign requests on administrator approval.
///
/// The campaign request is authoritative for approval state; the linked
/// admin action is a mirror mutated only here, so the two cannot diverge.
/// Repeating a decision is a no-op; reversing one is a conflict.
#[derive(Clone)]
pub struct AdminService {
    store: DocumentStore,
    notifier: NotificationService,
}

/// Outcome of an approval-gate transition.
#[derive(Debug, Clone)]
pub struct GateDecision {
    pub campaign: CampaignRequest,
    pub admin_action: AdminAction,
    /// False when the decision was already applied (idempotent repeat).
    pub changed: bool,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(store: DocumentStore, notifier: NotificationService) -> Self {
        Self { store, notifier }
    }

    /// Approve a pending campaign request.
    pub async fn approve(
        &self,
        campaign_request_id: &str,
        admin_id: &str,
    ) -> AppResult<GateDecision> {
        let decision = self
            .transition(campaign_request_id, admin_id, CampaignStatus::Approved)
            .await?;
        if decision.changed {
            self.notify_parties(&decision.campaign, "approved", admin_id)
                .await;
        }
        Ok(decision)
    }

    /// Reject a pending campaign request, clearing the collaboration's
    /// campaign linkage so a new campaign may be created.
    pub async fn reject(
        &self,
        campaign_request_id: &str,
        admin_id: &str,
    ) -> AppResult<GateDecision> {
        let decision = self
            .transition(campaign_request_id, admin_id, CampaignStatus::Rejected)
            .await?;
        if decision.changed {
            self.notify_parties(&decision.campaign, "rejected", admin_id)
                .await;
        }
        Ok(decision)
    }

    /// Resolve an admin action by id, propagating to its campaign.
    pub async fn resolve_by_action(
        &self,
        admin_action_id: &str,
        status: AdminActionStatus,
        admin_id: &str,
    ) -> AppResult<GateDecision> {
        let campaign_id = {
            let doc = self.store.snapshot().await;
            let action = doc
                .admin_action(admin_action_id)
                .ok_or_else(|| AppError::NotFound(format!("Admin action {admin_action_id}")))?;
            action.campaign_request_id.clone().ok_or_else(|| {
                AppError::Conflict("Admin action is not linked to a campaign".to_string())
            })?
        };

        match status {
            AdminActionStatus::Approved => self.approve(&campaign_id, admin_id).await,
            AdminActionStatus::Rejected => self.reject(&campaign_id, admin_id).await,
            AdminActionStatus::Pending => Err(AppError::Validation(
                "Status must be approved or rejected".to_string(),
            )),
        }
    }

    /// Pending admin actions, newest first.
    pub async fn list_pending(&self) -> AppResult<Vec<AdminAction>> {
        let doc = self.store.snapshot().await;
        let mut actions: Vec<AdminAction> = doc
            .admin_actions
            .into_iter()
            .filter(|a| a.status == AdminActionStatus::Pending)
            .collect();
        actions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(actions)
    }

    async fn transition(
        &self,
        campaign_request_id: &str,
        admin_id: &str,
        target: CampaignStatus,
    ) -> AppResult<GateDecision> {
        let campaign_request_id = campaign_request_id.to_string();
        let admin_id = admin_id.to_string();

        self.store
            .update(move |doc| {
                let admin = doc
                    .user(&admin_id)
                    .ok_or_else(|| AppError::UserNotFound(admin_id.clone()))?;
                if admin.role != Role::Admin {
                    return Err(AppError::RoleViolation(
                        "Only administrators can resolve campaign requests".to_string(),
                    ));
                }

                let campaign = doc
                    .campaign(&campaign_request_id)
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Campaign request {campaign_request_id}"))
                    })?
                    .clone();

                // Idempotent repeat; the opposite decision is refused.
                if campaign.status == target {
                    let admin_action = doc
                        .admin_action_for_campaign_mut(&campaign_request_id)
                        .cloned()
                        .ok_or_else(|| {
                            AppError::Internal(format!(
                                "Campaign {campaign_request_id} has no admin action"
                            ))
                        })?;
                    return Ok(GateDecision {
                        campaign,
                        admin_action,
                        changed: false,
                    });
                }
                if campaign.status != CampaignStatus::Pending {
                    return Err(AppError::Conflict(format!(
                        "Campaign request is already {:?}",
                        campaign.status
                    )));
                }

                let now = Utc::now();
                let campaign = {
                    let campaign = doc
                        .campaign_mut(&campaign_request_id)
                        .ok_or_else(|| {
                            AppError::NotFound(format!(
                                "Campaign request {campaign_request_id}"
                            ))
                        })?;
                    campaign.status = target;
                    campaign.status_updated_at = Some(now);
                    campaign.clone()
                };

                // Mirror onto the gating action.
                let admin_action = {
                    let action = doc
                        .admin_action_for_campaign_mut(&campaign_request_id)
                        .ok_or_else(|| {
                            AppError::Internal(format!(
                                "Campaign {campaign_request_id} has no admin action"
                            ))
                        })?;
                    action.status = match target {
                        CampaignStatus::Approved => AdminActionStatus::Approved,
                        CampaignStatus::Rejected => AdminActionStatus::Rejected,
                        CampaignStatus::Pending => AdminActionStatus::Pending,
                    };
                    action.admin_id = Some(admin_id.clone());
                    action.status_updated_at = Some(now);
                    action.clone()
                };

                // On rejection the collaboration frees its campaign slot;
                // on approval it stays accepted with the campaign linked.
                if target == CampaignStatus::Rejected
                    && let Some(request) =
                        doc.collaboration_mut(&campaign.collaboration_request_id)
                {
                    request.campaign_request_id = None;
                    request.status_updated_at = Some(now);
                }

                Ok(GateDecision {
                    campaign,
                    admin_action,
                    changed: true,
                })
            })
            .await
    }

    async fn notify_parties(&self, campaign: &CampaignRequest, verdict: &str, admin_id: &str) {
        let content = format!("Campaign for {} was {verdict}", campaign.product_name);
        for recipient in [&campaign.seller_id, &campaign.influencer_id] {
            if let Err(e) = self.notifier.notify(admin_id, recipient, &content).await {
                tracing::warn!(error = %e, recipient = %recipient, "Failed to send campaign verdict notification");
            }
        }
    }
}
