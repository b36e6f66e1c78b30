//! Business-logic services.

pub mod admin;
pub mod catalog;
pub mod collaboration;
pub mod notification;
pub mod social_graph;
pub mod subscription;

pub use admin::{AdminService, GateDecision};
pub use catalog::CatalogService;
pub use collaboration::{
    CampaignCreated, CollaborationService, CreateCampaignInput,
};
pub use notification::NotificationService;
pub use social_graph::{SocialGraphService, SuggestedFollow};
pub use subscription::{SubscriptionPolicy, Tier, TierLimits};
