//! Subscription tiers and the business limits they resolve to.

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    #[default]
    Basic,
    Pro,
    Enterprise,
}

impl Tier {
    /// Resolve a stored tier name. Unknown or missing values are basic.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("pro") => Self::Pro,
            Some("enterprise") => Self::Enterprise,
            _ => Self::Basic,
        }
    }

    /// The limits this tier resolves to.
    #[must_use]
    pub const fn limits(self) -> TierLimits {
        match self {
            Self::Basic => TierLimits {
                products: Some(3),
                collaborations: Some(1),
                fee_percent: 5.0,
            },
            Self::Pro => TierLimits {
                products: Some(25),
                collaborations: Some(50),
                fee_percent: 3.0,
            },
            Self::Enterprise => TierLimits {
                products: None,
                collaborations: None,
                fee_percent: 2.0,
            },
        }
    }
}

/// Numeric limits for a tier. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierLimits {
    /// Maximum catalog products.
    pub products: Option<usize>,
    /// Maximum active collaborations.
    pub collaborations: Option<usize>,
    /// Platform fee percentage on sales.
    pub fee_percent: f64,
}

/// Resolves tiers into enforceable business limits.
///
/// Pure; holds no state. The workflow engine must consult [`can_accept`]
/// before any accept transition and refuse the transition when it returns
/// false.
///
/// [`can_accept`]: SubscriptionPolicy::can_accept
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionPolicy;

impl SubscriptionPolicy {
    /// Create a new policy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Platform fee for a sale at `price` under `tier`.
    #[must_use]
    pub fn platform_fee(&self, price: f64, tier: Tier) -> f64 {
        price * tier.limits().fee_percent / 100.0
    }

    /// Whether a seller with `active_count` active collaborations may accept
    /// another one.
    #[must_use]
    pub fn can_accept(&self, active_count: usize, tier: Tier) -> bool {
        tier.limits()
            .collaborations
            .is_none_or(|limit| active_count < limit)
    }

    /// Whether a seller with `product_count` catalog products may add
    /// another one.
    #[must_use]
    pub fn can_add_product(&self, product_count: usize, tier: Tier) -> bool {
        tier.limits()
            .products
            .is_none_or(|limit| product_count < limit)
    }
}
