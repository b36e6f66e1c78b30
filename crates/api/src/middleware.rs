//! Application state shared across handlers.

use soko_core::{
    AdminService, CatalogService, CollaborationService, NotificationService, SocialGraphService,
    SubscriptionPolicy,
};
use soko_store::DocumentStore;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub social_graph: SocialGraphService,
    pub collaborations: CollaborationService,
    pub admin: AdminService,
    pub notifications: NotificationService,
    pub catalog: CatalogService,
}

impl AppState {
    /// Wire the full service set over one store.
    #[must_use]
    pub fn from_store(store: DocumentStore) -> Self {
        let policy = SubscriptionPolicy::new();
        let notifications = NotificationService::new(store.clone());
        Self {
            social_graph: SocialGraphService::new(store.clone()),
            collaborations: CollaborationService::new(
                store.clone(),
                notifications.clone(),
                policy,
            ),
            admin: AdminService::new(store.clone(), notifications.clone()),
            catalog: CatalogService::new(store, policy),
            notifications,
        }
    }
}
