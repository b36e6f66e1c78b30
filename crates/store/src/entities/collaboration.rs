//! Collaboration request entity (seller/influencer workflow).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collaboration request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollaborationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

/// A collaboration request from an influencer to a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequest {
    pub id: String,

    pub seller_id: String,

    pub influencer_id: String,

    pub status: CollaborationStatus,

    /// Product the influencer proposed to promote (free text)
    #[serde(default)]
    pub product_name: Option<String>,

    #[serde(default)]
    pub details: Option<String>,

    /// Set once a campaign request has been created from this collaboration
    #[serde(default)]
    pub campaign_request_id: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub status_updated_at: Option<DateTime<Utc>>,
}

impl CollaborationRequest {
    /// Whether this request counts against the pair-uniqueness constraint
    /// and the seller's subscription ceiling: pending, or accepted with no
    /// campaign created yet.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        match self.status {
            CollaborationStatus::Pending => true,
            CollaborationStatus::Accepted => self.campaign_request_id.is_none(),
            CollaborationStatus::Declined => false,
        }
    }
}
