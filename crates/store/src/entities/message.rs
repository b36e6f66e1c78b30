//! Message entity (workflow notification records).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification message appended as a workflow side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned sequential id
    pub id: u64,

    pub from_user_id: String,

    pub to_user_id: String,

    pub content: String,

    /// Has the recipient read this message?
    #[serde(default)]
    pub is_read: bool,

    pub created_at: DateTime<Utc>,
}
