//! Admin action entity (administrator work queue).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Admin action status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdminActionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// A pending or resolved administrator action.
///
/// Mutated only through the approval gate, mirroring the linked campaign
/// request's status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAction {
    pub id: String,

    /// Admin who resolved the action
    #[serde(default)]
    pub admin_id: Option<String>,

    /// Action kind, e.g. "Campaign Approval Request"
    pub action: String,

    /// User the action concerns (the requesting seller)
    pub user_id: String,

    /// Campaign request this action gates
    #[serde(default)]
    pub campaign_request_id: Option<String>,

    pub status: AdminActionStatus,

    #[serde(default)]
    pub details: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub status_updated_at: Option<DateTime<Utc>>,
}
