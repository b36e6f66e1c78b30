//! Social graph service: bidirectional follow relationships.

use chrono::Utc;
use soko_common::{AppError, AppResult};
use soko_store::DocumentStore;
use soko_store::entities::{FollowEntry, Role};

/// Maintains the denormalized follower/following lists and their counters.
///
/// Both sides of a relationship and both counters mutate inside one store
/// critical section, so a validation failure or a failed save leaves the
/// graph exactly as it was.
#[derive(Clone)]
pub struct SocialGraphService {
    store: DocumentStore,
}

/// A ranked follow suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedFollow {
    pub user_id: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub account_type: Role,
    pub followers_count: u32,
}

impl SocialGraphService {
    /// Create a new social graph service.
    #[must_use]
    pub const fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Follow a user.
    ///
    /// Only buyers may follow, and only sellers and influencers may be
    /// followed. Returns `false` without writing when the relationship
    /// already exists.
    pub async fn follow(&self, follower_id: &str, target_id: &str) -> AppResult<bool> {
        let follower_id = follower_id.to_string();
        let target_id = target_id.to_string();

        self.store
            .update(move |doc| {
                if follower_id == target_id {
                    return Err(AppError::Validation("Cannot follow yourself".to_string()));
                }

                let follower = doc
                    .user(&follower_id)
                    .ok_or_else(|| AppError::UserNotFound(follower_id.clone()))?;
                let target = doc
                    .user(&target_id)
                    .ok_or_else(|| AppError::UserNotFound(target_id.clone()))?;

                if follower.role != Role::Buyer {
                    return Err(AppError::RoleViolation(
                        "Only buyers can follow accounts".to_string(),
                    ));
                }
                if !target.role.is_followable() {
                    return Err(AppError::RoleViolation(
                        "Only sellers and influencers can be followed".to_string(),
                    ));
                }

                // Already following: no-op, nothing written.
                if follower.following.iter().any(|e| e.user_id == target_id) {
                    return Ok(false);
                }

                let now = Utc::now();
                let follower_entry = follower.summary(now);
                let target_entry = target.summary(now);

                // Both sides and both counters move together.
                let target = doc
                    .user_mut(&target_id)
                    .ok_or_else(|| AppError::UserNotFound(target_id.clone()))?;
                target.followers.push(follower_entry);
                target.followers_count += 1;

                let follower = doc
                    .user_mut(&follower_id)
                    .ok_or_else(|| AppError::UserNotFound(follower_id.clone()))?;
                follower.following.push(target_entry);
                follower.following_count += 1;

                Ok(true)
            })
            .await
    }

    /// Unfollow a user.
    ///
    /// Returns `false` without writing when no relationship exists. An entry
    /// present on only one side (a legacy half-applied write) is scrubbed
    /// from both, restoring symmetry.
    pub async fn unfollow(&self, follower_id: &str, target_id: &str) -> AppResult<bool> {
        let follower_id = follower_id.to_string();
        let target_id = target_id.to_string();

        self.store
            .update(move |doc| {
                if doc.user(&follower_id).is_none() {
                    return Err(AppError::UserNotFound(follower_id.clone()));
                }
                if doc.user(&target_id).is_none() {
                    return Err(AppError::UserNotFound(target_id.clone()));
                }

                let mut removed = false;

                if let Some(follower) = doc.user_mut(&follower_id) {
                    let before = follower.following.len();
                    follower.following.retain(|e| e.user_id != target_id);
                    if follower.following.len() < before {
                        follower.following_count = follower
                            .following_count
                            .saturating_sub((before - follower.following.len()) as u32);
                        removed = true;
                    }
                }

                if let Some(target) = doc.user_mut(&target_id) {
                    let before = target.followers.len();
                    target.followers.retain(|e| e.user_id != follower_id);
                    if target.followers.len() < before {
                        target.followers_count = target
                            .followers_count
                            .saturating_sub((before - target.followers.len()) as u32);
                        removed = true;
                    }
                }

                Ok(removed)
            })
            .await
    }

    /// A user by id.
    pub async fn get_user(&self, user_id: &str) -> AppResult<soko_store::entities::User> {
        let doc = self.store.snapshot().await;
        doc.user(user_id)
            .cloned()
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    /// Check whether a follow relationship exists.
    pub async fn is_following(&self, follower_id: &str, target_id: &str) -> AppResult<bool> {
        let doc = self.store.snapshot().await;
        Ok(doc
            .user(follower_id)
            .is_some_and(|u| u.following.iter().any(|e| e.user_id == target_id)))
    }

    /// Followers of a user, in follow order.
    pub async fn get_followers(&self, user_id: &str) -> AppResult<Vec<FollowEntry>> {
        let doc = self.store.snapshot().await;
        let user = doc
            .user(user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        Ok(user.followers.clone())
    }

    /// Accounts a user follows, in follow order.
    pub async fn get_following(&self, user_id: &str) -> AppResult<Vec<FollowEntry>> {
        let doc = self.store.snapshot().await;
        let user = doc
            .user(user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        Ok(user.following.clone())
    }

    /// Suggested accounts to follow: every seller and influencer the user
    /// does not already follow, most-followed first. Ties keep store order.
    pub async fn suggested_follows(&self, user_id: &str) -> AppResult<Vec<SuggestedFollow>> {
        let doc = self.store.snapshot().await;
        let user = doc
            .user(user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        let mut candidates: Vec<SuggestedFollow> = doc
            .users
            .iter()
            .filter(|u| u.role.is_followable())
            .filter(|u| u.id != user_id)
            .filter(|u| !user.following.iter().any(|e| e.user_id == u.id))
            .map(|u| SuggestedFollow {
                user_id: u.id.clone(),
                name: u.name.clone().unwrap_or_else(|| u.username.clone()),
                profile_image: u.profile_image.clone(),
                account_type: u.role,
                followers_count: u.followers_count,
            })
            .collect();

        // Stable sort preserves store order between equal counts.
        candidates.sort_by(|a, b| b.followers_count.cmp(&a.followers_count));
        Ok(candidates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use soko_store::entities::User;
    use std::time::Duration;
    use tempfile::TempDir;

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

    async fn seeded_service(users: Vec<User>) -> (SocialGraphService, DocumentStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("soko.json"), Duration::from_secs(5))
            .await
            .unwrap();
        store
            .update(move |doc| {
                doc.users = users;
                Ok(())
            })
            .await
            .unwrap();
        (SocialGraphService::new(store.clone()), store, dir)
    }

    #[tokio::test]
    async fn test_follow_updates_both_sides_and_counters() {
        let (service, store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("seller1", Role::Seller),
        ])
        .await;

        assert!(service.follow("buyer1", "seller1").await.unwrap());
        assert!(service.is_following("buyer1", "seller1").await.unwrap());

        let doc = store.snapshot().await;
        let seller = doc.user("seller1").unwrap();
        let buyer = doc.user("buyer1").unwrap();
        assert_eq!(seller.followers_count, 1);
        assert_eq!(seller.followers.len(), 1);
        assert_eq!(seller.followers[0].user_id, "buyer1");
        assert_eq!(buyer.following_count, 1);
        assert_eq!(buyer.following[0].user_id, "seller1");
    }

    #[tokio::test]
    async fn test_follow_twice_is_noop() {
        let (service, store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("seller1", Role::Seller),
        ])
        .await;

        assert!(service.follow("buyer1", "seller1").await.unwrap());
        assert!(!service.follow("buyer1", "seller1").await.unwrap());

        let doc = store.snapshot().await;
        assert_eq!(doc.user("seller1").unwrap().followers_count, 1);
        assert_eq!(doc.user("buyer1").unwrap().following_count, 1);
    }

    #[tokio::test]
    async fn test_follow_role_violations() {
        let (service, _store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("buyer2", Role::Buyer),
            test_user("seller1", Role::Seller),
        ])
        .await;

        // Sellers cannot follow.
        assert!(matches!(
            service.follow("seller1", "buyer1").await,
            Err(AppError::RoleViolation(_))
        ));
        // Buyers cannot be followed.
        assert!(matches!(
            service.follow("buyer1", "buyer2").await,
            Err(AppError::RoleViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_follow_missing_user() {
        let (service, _store, _dir) = seeded_service(vec![test_user("buyer1", Role::Buyer)]).await;
        assert!(matches!(
            service.follow("buyer1", "ghost").await,
            Err(AppError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_follow_leaves_graph_unchanged() {
        let (service, store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("buyer2", Role::Buyer),
        ])
        .await;

        let before = store.snapshot().await;
        assert!(service.follow("buyer1", "buyer2").await.is_err());
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_follow_unfollow_round_trip() {
        let (service, store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("seller1", Role::Seller),
        ])
        .await;

        assert!(service.follow("buyer1", "seller1").await.unwrap());
        assert!(service.unfollow("buyer1", "seller1").await.unwrap());

        let doc = store.snapshot().await;
        assert_eq!(doc.user("seller1").unwrap().followers_count, 0);
        assert!(doc.user("seller1").unwrap().followers.is_empty());
        assert_eq!(doc.user("buyer1").unwrap().following_count, 0);
        assert!(!service.is_following("buyer1", "seller1").await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_without_relationship_is_noop() {
        let (service, _store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("seller1", Role::Seller),
        ])
        .await;
        assert!(!service.unfollow("buyer1", "seller1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_followers_denormalized_fields() {
        let (service, _store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("seller1", Role::Seller),
        ])
        .await;
        service.follow("buyer1", "seller1").await.unwrap();

        let followers = service.get_followers("seller1").await.unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].user_id, "buyer1");
        assert_eq!(followers[0].name, "User buyer1");
        assert_eq!(followers[0].account_type, Role::Buyer);
    }

    #[tokio::test]
    async fn test_suggestions_exclude_self_and_followed_rank_by_count() {
        let mut big = test_user("seller_big", Role::Seller);
        big.followers_count = 10;
        let mut mid = test_user("influencer_mid", Role::Influencer);
        mid.followers_count = 5;
        let mut tied = test_user("seller_tied", Role::Seller);
        tied.followers_count = 5;

        let (service, _store, _dir) = seeded_service(vec![
            test_user("buyer1", Role::Buyer),
            test_user("seller_followed", Role::Seller),
            mid,
            tied,
            big,
        ])
        .await;
        service.follow("buyer1", "seller_followed").await.unwrap();

        let suggestions = service.suggested_follows("buyer1").await.unwrap();
        let ids: Vec<&str> = suggestions.iter().map(|s| s.user_id.as_str()).collect();
        // Followed account excluded; descending by count; tie keeps store order.
        assert_eq!(ids, vec!["seller_big", "influencer_mid", "seller_tied"]);
    }
}
