//! Campaign request entity (admin-gated promotion of a collaboration).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Campaign request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A campaign request created from an accepted collaboration.
///
/// Approval state here is authoritative; the linked admin action mirrors it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    pub id: String,

    /// The collaboration this campaign was created from
    pub collaboration_request_id: String,

    pub seller_id: String,

    pub influencer_id: String,

    pub product_id: String,

    /// Product name at creation time (denormalized)
    pub product_name: String,

    /// Influencer commission percentage, 1..=100
    pub commission: u8,

    /// Campaign duration in days, > 0
    pub campaign_duration_days: u32,

    #[serde(default)]
    pub details: Option<String>,

    pub status: CampaignStatus,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub status_updated_at: Option<DateTime<Utc>>,
}
