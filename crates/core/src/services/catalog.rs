//! Product catalog service.

use chrono::Utc;
use soko_common::{AppError, AppResult, IdGenerator};
use soko_store::DocumentStore;
use soko_store::entities::{Product, Role};

use crate::services::subscription::{SubscriptionPolicy, Tier};

/// Seller catalog: product creation under the tier limit and admin
/// verification, which gates campaign eligibility.
#[derive(Clone)]
pub struct CatalogService {
    store: DocumentStore,
    policy: SubscriptionPolicy,
    id_gen: IdGenerator,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: DocumentStore, policy: SubscriptionPolicy) -> Self {
        Self {
            store,
            policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a product to a seller's catalog.
    pub async fn create_product(
        &self,
        seller_id: &str,
        name: &str,
        description: Option<String>,
        price: f64,
    ) -> AppResult<Product> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Product name is required".to_string()));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::Validation(
                "Price must be greater than zero".to_string(),
            ));
        }

        let seller_id = seller_id.to_string();
        let name = name.to_string();
        let id = self.id_gen.generate();
        let policy = self.policy;

        self.store
            .update(move |doc| {
                let seller = doc
                    .user(&seller_id)
                    .ok_or_else(|| AppError::UserNotFound(seller_id.clone()))?;
                if seller.role != Role::Seller {
                    return Err(AppError::RoleViolation(
                        "Only sellers can list products".to_string(),
                    ));
                }

                let tier = Tier::parse(seller.tier.as_deref());
                let count = doc
                    .products
                    .iter()
                    .filter(|p| p.seller_id == seller_id)
                    .count();
                if !policy.can_add_product(count, tier) {
                    return Err(AppError::LimitExceeded {
                        current: count,
                        limit: tier.limits().products.unwrap_or(0),
                    });
                }

                let product = Product {
                    id: id.clone(),
                    seller_id: seller_id.clone(),
                    name: name.clone(),
                    description: description.clone(),
                    price,
                    verified: false,
                    created_at: Utc::now(),
                };
                doc.products.push(product.clone());
                Ok(product)
            })
            .await
    }

    /// Mark a product verified. Idempotent.
    pub async fn verify_product(&self, product_id: &str, admin_id: &str) -> AppResult<Product> {
        let product_id = product_id.to_string();
        let admin_id = admin_id.to_string();

        self.store
            .update(move |doc| {
                let admin = doc
                    .user(&admin_id)
                    .ok_or_else(|| AppError::UserNotFound(admin_id.clone()))?;
                if admin.role != Role::Admin {
                    return Err(AppError::RoleViolation(
                        "Only administrators can verify products".to_string(),
                    ));
                }
                let product = doc
                    .product_mut(&product_id)
                    .ok_or_else(|| AppError::NotFound(format!("Product {product_id}")))?;
                product.verified = true;
                Ok(product.clone())
            })
            .await
    }

    /// A product by id.
    pub async fn get(&self, product_id: &str) -> AppResult<Product> {
        let doc = self.store.snapshot().await;
        doc.product(product_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Product {product_id}")))
    }

    /// A seller's catalog, in listing order.
    pub async fn list_for_seller(&self, seller_id: &str) -> AppResult<Vec<Product>> {
        let doc = self.store.snapshot().await;
        if doc.user(seller_id).is_none() {
            return Err(AppError::UserNotFound(seller_id.to_string()));
        }
        Ok(doc
            .products
            .iter()
            .filter(|p| p.seller_id == seller_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use soko_store::entities::User;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_user(id: &str, role: Role, tier: Option<&str>) -> User {
        User {
            id: id.to_string(),
            username: format!("user_{id}"),
            name: Some(format!("User {id}")),
            profile_image: None,
            role,
            tier: tier.map(String::from),
            followers: Vec::new(),
            following: Vec::new(),
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        }
    }

    async fn seeded() -> (CatalogService, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("soko.json"), Duration::from_secs(5))
            .await
            .unwrap();
        store
            .update(|doc| {
                doc.users = vec![
                    test_user("seller1", Role::Seller, Some("basic")),
                    test_user("buyer1", Role::Buyer, None),
                    test_user("admin1", Role::Admin, None),
                ];
                Ok(())
            })
            .await
            .unwrap();
        (
            CatalogService::new(store, SubscriptionPolicy::new()),
            dir,
        )
    }

    #[tokio::test]
    async fn test_create_product_starts_unverified() {
        let (service, _dir) = seeded().await;
        let product = service
            .create_product("seller1", "Kikapu", None, 30.0)
            .await
            .unwrap();
        assert!(!product.verified);
        assert_eq!(product.seller_id, "seller1");
    }

    #[tokio::test]
    async fn test_basic_tier_product_limit() {
        let (service, _dir) = seeded().await;
        for i in 0..3 {
            service
                .create_product("seller1", &format!("Product {i}"), None, 10.0)
                .await
                .unwrap();
        }
        let result = service.create_product("seller1", "One too many", None, 10.0).await;
        match result {
            Err(AppError::LimitExceeded { current, limit }) => {
                assert_eq!(current, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("Expected LimitExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_only_sellers_list_products() {
        let (service, _dir) = seeded().await;
        assert!(matches!(
            service.create_product("buyer1", "Kikapu", None, 30.0).await,
            Err(AppError::RoleViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_price_and_name_validation() {
        let (service, _dir) = seeded().await;
        assert!(matches!(
            service.create_product("seller1", "  ", None, 30.0).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.create_product("seller1", "Kikapu", None, 0.0).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_requires_admin_and_is_idempotent() {
        let (service, _dir) = seeded().await;
        let product = service
            .create_product("seller1", "Kikapu", None, 30.0)
            .await
            .unwrap();

        assert!(matches!(
            service.verify_product(&product.id, "seller1").await,
            Err(AppError::RoleViolation(_))
        ));

        let verified = service.verify_product(&product.id, "admin1").await.unwrap();
        assert!(verified.verified);
        let again = service.verify_product(&product.id, "admin1").await.unwrap();
        assert!(again.verified);
    }

    #[tokio::test]
    async fn test_list_for_missing_seller_is_not_found() {
        let (service, _dir) = seeded().await;
        assert!(matches!(
            service.list_for_seller("ghost").await,
            Err(AppError::UserNotFound(_))
        ));
    }
}
