//! The persisted document: every aggregate, serialized as one JSON unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    AdminAction, CampaignRequest, CampaignSaga, CollaborationRequest, Message, Product, User,
};

/// Root of the persisted dataset.
///
/// The store owns the canonical copy; everything handed out is a deep copy
/// valid for one logical operation. Every collection defaults so documents
/// written by older versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub collaboration_requests: Vec<CollaborationRequest>,

    #[serde(default)]
    pub campaign_requests: Vec<CampaignRequest>,

    #[serde(default)]
    pub admin_actions: Vec<AdminAction>,

    #[serde(default)]
    pub messages: Vec<Message>,

    /// In-flight campaign-creation markers
    #[serde(default)]
    pub pending_sagas: Vec<CampaignSaga>,

    /// Next sequential message id
    #[serde(default = "first_message_id")]
    pub next_message_id: u64,
}

const fn first_message_id() -> u64 {
    1
}

impl Default for Document {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            products: Vec::new(),
            collaboration_requests: Vec::new(),
            campaign_requests: Vec::new(),
            admin_actions: Vec::new(),
            messages: Vec::new(),
            pending_sagas: Vec::new(),
            next_message_id: first_message_id(),
        }
    }
}

impl Document {
    /// Look up a user by id.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Look up a user by id, mutably.
    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Look up a product by id, mutably.
    pub fn product_mut(&mut self, id: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// Look up a collaboration request by id.
    #[must_use]
    pub fn collaboration(&self, id: &str) -> Option<&CollaborationRequest> {
        self.collaboration_requests.iter().find(|r| r.id == id)
    }

    /// Look up a collaboration request by id, mutably.
    pub fn collaboration_mut(&mut self, id: &str) -> Option<&mut CollaborationRequest> {
        self.collaboration_requests.iter_mut().find(|r| r.id == id)
    }

    /// Look up a campaign request by id.
    #[must_use]
    pub fn campaign(&self, id: &str) -> Option<&CampaignRequest> {
        self.campaign_requests.iter().find(|c| c.id == id)
    }

    /// Look up a campaign request by id, mutably.
    pub fn campaign_mut(&mut self, id: &str) -> Option<&mut CampaignRequest> {
        self.campaign_requests.iter_mut().find(|c| c.id == id)
    }

    /// Look up an admin action by id.
    #[must_use]
    pub fn admin_action(&self, id: &str) -> Option<&AdminAction> {
        self.admin_actions.iter().find(|a| a.id == id)
    }

    /// Look up an admin action by id, mutably.
    pub fn admin_action_mut(&mut self, id: &str) -> Option<&mut AdminAction> {
        self.admin_actions.iter_mut().find(|a| a.id == id)
    }

    /// Look up the admin action gating a campaign request.
    pub fn admin_action_for_campaign_mut(
        &mut self,
        campaign_request_id: &str,
    ) -> Option<&mut AdminAction> {
        self.admin_actions
            .iter_mut()
            .find(|a| a.campaign_request_id.as_deref() == Some(campaign_request_id))
    }

    /// Look up the in-flight saga marker for a collaboration, if any.
    #[must_use]
    pub fn saga(&self, collaboration_request_id: &str) -> Option<&CampaignSaga> {
        self.pending_sagas
            .iter()
            .find(|s| s.collaboration_request_id == collaboration_request_id)
    }

    /// Remove the saga marker for a collaboration.
    pub fn clear_saga(&mut self, collaboration_request_id: &str) {
        self.pending_sagas
            .retain(|s| s.collaboration_request_id != collaboration_request_id);
    }

    /// Append a message with the next sequential id and return it.
    pub fn append_message(
        &mut self,
        from_user_id: &str,
        to_user_id: &str,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Message {
        let message = Message {
            id: self.next_message_id,
            from_user_id: from_user_id.to_string(),
            to_user_id: to_user_id.to_string(),
            content: content.into(),
            is_read: false,
            created_at,
        };
        self.next_message_id += 1;
        self.messages.push(message.clone());
        message
    }

    /// Backfill display fields on follow entries read from the legacy
    /// bare-id shape, so no call site ever branches on the stored shape.
    ///
    /// Legacy entries referencing users no longer in the directory keep
    /// their id with empty display fields rather than being dropped.
    pub fn migrate_follow_entries(&mut self) -> usize {
        // Snapshot the directory first; entries are patched in a second pass
        // because the lists being patched live inside the same user records.
        let directory: Vec<(String, crate::entities::FollowEntry)> = self
            .users
            .iter()
            .map(|u| (u.id.clone(), u.summary(DateTime::<Utc>::UNIX_EPOCH)))
            .collect();

        let mut migrated = 0;
        for user in &mut self.users {
            for entry in user
                .followers
                .iter_mut()
                .chain(user.following.iter_mut())
                .filter(|e| e.is_legacy())
            {
                if let Some((_, summary)) = directory.iter().find(|(id, _)| *id == entry.user_id) {
                    let followed_at = entry.followed_at;
                    *entry = summary.clone();
                    entry.followed_at = followed_at;
                    migrated += 1;
                }
            }
        }
        migrated
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::Role;

    fn test_user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            username: format!("user_{id}"),
            name: Some(format!("User {id}")),
            profile_image: None,
            role,
            tier: None,
            followers: Vec::new(),
            following: Vec::new(),
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_ids_are_sequential() {
        let mut doc = Document::default();
        let m1 = doc.append_message("a", "b", "hello", Utc::now());
        let m2 = doc.append_message("b", "a", "hi", Utc::now());
        assert_eq!(m1.id, 1);
        assert_eq!(m2.id, 2);
        assert_eq!(doc.next_message_id, 3);
    }

    #[test]
    fn test_migrate_backfills_legacy_entries() {
        let mut doc = Document {
            users: vec![test_user("buyer1", Role::Buyer), test_user("seller1", Role::Seller)],
            ..Document::default()
        };

        // A legacy bare-id entry, as the deserializer produces it.
        let legacy: crate::entities::FollowEntry = serde_json::from_str(r#""buyer1""#).unwrap();
        doc.user_mut("seller1").unwrap().followers.push(legacy);

        let migrated = doc.migrate_follow_entries();
        assert_eq!(migrated, 1);

        let entry = &doc.user("seller1").unwrap().followers[0];
        assert_eq!(entry.user_id, "buyer1");
        assert_eq!(entry.name, "User buyer1");
        assert_eq!(entry.account_type, Role::Buyer);
    }

    #[test]
    fn test_migrate_keeps_dangling_legacy_entries() {
        let mut doc = Document {
            users: vec![test_user("seller1", Role::Seller)],
            ..Document::default()
        };
        let legacy: crate::entities::FollowEntry = serde_json::from_str(r#""ghost""#).unwrap();
        doc.user_mut("seller1").unwrap().followers.push(legacy);

        assert_eq!(doc.migrate_follow_entries(), 0);
        assert_eq!(doc.user("seller1").unwrap().followers[0].user_id, "ghost");
    }

    #[test]
    fn test_empty_document_loads_from_empty_object() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.users.is_empty());
        assert_eq!(doc.next_message_id, 1);
    }
}
