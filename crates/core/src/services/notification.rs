//! Notification dispatch as a workflow side effect.

use chrono::Utc;
use soko_common::{AppError, AppResult};
use soko_store::entities::Message;
use soko_store::{Document, DocumentStore};

/// Appends message records as side effects of workflow transitions.
///
/// Call sites treat dispatch as best-effort: a failed notification is logged
/// and never rolls back the transition that triggered it.
#[derive(Clone)]
pub struct NotificationService {
    store: DocumentStore,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Append a message from one user to another.
    pub async fn notify(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        content: &str,
    ) -> AppResult<Message> {
        let from = from_user_id.to_string();
        let to = to_user_id.to_string();
        let content = content.to_string();

        self.store
            .update(move |doc| {
                if doc.user(&to).is_none() {
                    return Err(AppError::UserNotFound(to));
                }
                Ok(doc.append_message(&from, &to, content, Utc::now()))
            })
            .await
    }

    /// Append a message inside an already-open critical section.
    ///
    /// Used where the outgoing message belongs to a larger atomic group
    /// (campaign creation) rather than being a follow-up write.
    pub fn append_in(
        doc: &mut Document,
        from_user_id: &str,
        to_user_id: &str,
        content: impl Into<String>,
    ) -> Message {
        doc.append_message(from_user_id, to_user_id, content, Utc::now())
    }

    /// Messages received by a user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Message>> {
        let doc = self.store.snapshot().await;
        if doc.user(user_id).is_none() {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }
        let mut messages: Vec<Message> = doc
            .messages
            .into_iter()
            .filter(|m| m.to_user_id == user_id)
            .collect();
        messages.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(messages)
    }

    /// Mark a received message as read.
    pub async fn mark_read(&self, user_id: &str, message_id: u64) -> AppResult<Message> {
        let user_id = user_id.to_string();

        self.store
            .update(move |doc| {
                let message = doc
                    .messages
                    .iter_mut()
                    .find(|m| m.id == message_id)
                    .ok_or_else(|| AppError::NotFound(format!("Message {message_id}")))?;
                if message.to_user_id != user_id {
                    return Err(AppError::BadRequest(
                        "Only the recipient can mark a message read".to_string(),
                    ));
                }
                message.is_read = true;
                Ok(message.clone())
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use soko_store::entities::{Role, User};
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

    async fn seeded_store(users: Vec<User>) -> (DocumentStore, TempDir) {
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
        (store, dir)
    }

    #[tokio::test]
    async fn test_notify_assigns_sequential_ids() {
        let (store, _dir) = seeded_store(vec![
            test_user("a", Role::Seller),
            test_user("b", Role::Influencer),
        ])
        .await;
        let service = NotificationService::new(store);

        let m1 = service.notify("a", "b", "first").await.unwrap();
        let m2 = service.notify("b", "a", "second").await.unwrap();
        assert_eq!(m1.id, 1);
        assert_eq!(m2.id, 2);
    }

    #[tokio::test]
    async fn test_notify_missing_recipient() {
        let (store, _dir) = seeded_store(vec![test_user("a", Role::Seller)]).await;
        let service = NotificationService::new(store);

        let result = service.notify("a", "ghost", "hello").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_read_requires_recipient() {
        let (store, _dir) = seeded_store(vec![
            test_user("a", Role::Seller),
            test_user("b", Role::Influencer),
        ])
        .await;
        let service = NotificationService::new(store);

        let message = service.notify("a", "b", "hello").await.unwrap();
        assert!(service.mark_read("a", message.id).await.is_err());

        let updated = service.mark_read("b", message.id).await.unwrap();
        assert!(updated.is_read);
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let (store, _dir) = seeded_store(vec![
            test_user("a", Role::Seller),
            test_user("b", Role::Influencer),
        ])
        .await;
        let service = NotificationService::new(store);

        service.notify("a", "b", "first").await.unwrap();
        service.notify("a", "b", "second").await.unwrap();

        let inbox = service.list_for_user("b").await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].content, "second");
    }
}
