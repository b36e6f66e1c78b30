//! User entity and follow relationship entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper; the only role allowed to follow.
    #[default]
    Buyer,
    /// Store owner; can be followed and runs campaigns.
    Seller,
    /// Promoter; can be followed and joins campaigns.
    Influencer,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Whether accounts of this role may be followed.
    #[must_use]
    pub const fn is_followable(self) -> bool {
        matches!(self, Self::Seller | Self::Influencer)
    }
}

/// User account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    pub username: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Profile image URL
    #[serde(default)]
    pub profile_image: Option<String>,

    pub role: Role,

    /// Subscription tier name. Unknown or missing values resolve to the
    /// basic tier at the policy layer.
    #[serde(default)]
    pub tier: Option<String>,

    /// Accounts following this user (buyers only)
    #[serde(default)]
    pub followers: Vec<FollowEntry>,

    /// Accounts this user follows
    #[serde(default)]
    pub following: Vec<FollowEntry>,

    /// Followers count (denormalized)
    #[serde(default)]
    pub followers_count: u32,

    /// Following count (denormalized)
    #[serde(default)]
    pub following_count: u32,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Denormalized summary of this user for embedding in other records.
    #[must_use]
    pub fn summary(&self, followed_at: DateTime<Utc>) -> FollowEntry {
        FollowEntry {
            user_id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.username.clone()),
            profile_image: self.profile_image.clone(),
            account_type: self.role,
            followed_at,
        }
    }
}

/// A denormalized entry in a `followers`/`following` list.
///
/// Two persisted shapes exist historically: a bare user-id string and this
/// embedded object. Deserialization accepts both; bare ids come out with
/// empty display fields and an epoch timestamp, to be backfilled by
/// [`crate::Document::migrate_follow_entries`]. Serialization always emits
/// the object shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEntry {
    pub user_id: String,

    /// Display name at follow time (denormalized)
    pub name: String,

    /// Profile image URL at follow time (denormalized)
    pub profile_image: Option<String>,

    /// Role of the referenced account (denormalized)
    pub account_type: Role,

    pub followed_at: DateTime<Utc>,
}

impl FollowEntry {
    /// Whether this entry was read from the legacy bare-id shape and still
    /// needs its display fields backfilled.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.name.is_empty()
    }
}

impl<'de> Deserialize<'de> for FollowEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Entry(EntryRepr),
            LegacyId(String),
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct EntryRepr {
            user_id: String,
            #[serde(default)]
            name: String,
            #[serde(default)]
            profile_image: Option<String>,
            #[serde(default)]
            account_type: Role,
            #[serde(default = "epoch")]
            followed_at: DateTime<Utc>,
        }

        fn epoch() -> DateTime<Utc> {
            DateTime::<Utc>::UNIX_EPOCH
        }

        match Repr::deserialize(deserializer)? {
            Repr::Entry(e) => Ok(Self {
                user_id: e.user_id,
                name: e.name,
                profile_image: e.profile_image,
                account_type: e.account_type,
                followed_at: e.followed_at,
            }),
            Repr::LegacyId(user_id) => Ok(Self {
                user_id,
                name: String::new(),
                profile_image: None,
                account_type: Role::default(),
                followed_at: DateTime::<Utc>::UNIX_EPOCH,
            }),
        }
    }
}
