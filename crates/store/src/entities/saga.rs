//! Pending-saga marker for campaign creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker persisted before the multi-entity campaign-creation writes and
/// cleared in the save that commits them.
///
/// A marker present without its entities means the sequence died between
/// saves; a retry keyed on `collaboration_request_id` completes it instead
/// of duplicating records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSaga {
    /// Idempotency key: the collaboration being promoted
    pub collaboration_request_id: String,

    /// Campaign id reserved for this run
    pub campaign_request_id: String,

    pub started_at: DateTime<Utc>,
}
