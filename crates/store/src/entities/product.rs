//! Product entity (seller catalog items).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product owned by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,

    /// Owning seller
    pub seller_id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub price: f64,

    /// Verified products are eligible for campaigns
    #[serde(default)]
    pub verified: bool,

    pub created_at: DateTime<Utc>,
}
