use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::{
    invoices::InvoiceEntity, payment_methods::PaymentMethodEntity,
    subscriptions::SubscriptionEntity,
};
use crate::domain::value_objects::enums::{
    billing_cycles::BillingCycle, subscription_statuses::SubscriptionStatus,
    subscription_tiers::SubscriptionTier,
};

/// Maps provider price ids to what the user is paying for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCatalog {
    pub premium_monthly: String,
    pub premium_yearly: String,
}

impl PriceCatalog {
    pub fn new(premium_monthly: impl Into<String>, premium_yearly: impl Into<String>) -> Self {
        Self {
            premium_monthly: premium_monthly.into(),
            premium_yearly: premium_yearly.into(),
        }
    }

    /// Unmapped ids resolve to free so an unknown price never grants premium.
    pub fn resolve(&self, price_id: Option<&str>) -> (SubscriptionTier, Option<BillingCycle>) {
        match price_id {
            Some(id) if !id.is_empty() && id == self.premium_monthly => {
                (SubscriptionTier::Premium, Some(BillingCycle::Monthly))
            }
            Some(id) if !id.is_empty() && id == self.premium_yearly => {
                (SubscriptionTier::Premium, Some(BillingCycle::Yearly))
            }
            other => {
                warn!(
                    price_id = other.unwrap_or("<none>"),
                    "subscriptions: unmapped price id, falling back to free tier"
                );
                (SubscriptionTier::Free, None)
            }
        }
    }

    pub fn price_for(&self, cycle: BillingCycle) -> &str {
        match cycle {
            BillingCycle::Monthly => &self.premium_monthly,
            BillingCycle::Yearly => &self.premium_yearly,
        }
    }
}

/// A row grants its stored tier only while it still points at a provider
/// subscription; without one the user is implicitly free.
pub fn effective_tier(subscription: Option<&SubscriptionEntity>) -> SubscriptionTier {
    match subscription {
        Some(row) if row.stripe_subscription_id.is_some() => SubscriptionTier::from_str(&row.tier),
        _ => SubscriptionTier::Free,
    }
}

/// Manual sync only looks at whether the row still points at a provider
/// subscription; the stored tier column is not consulted.
pub fn sync_tier(subscription: Option<&SubscriptionEntity>) -> SubscriptionTier {
    match subscription.and_then(|row| row.stripe_subscription_id.as_deref()) {
        Some(_) => SubscriptionTier::Premium,
        None => SubscriptionTier::Free,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionDto {
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    pub billing_cycle: Option<BillingCycle>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub has_provider_subscription: bool,
}

impl SubscriptionDto {
    pub fn implicit_free() -> Self {
        Self {
            tier: SubscriptionTier::Free,
            status: SubscriptionStatus::Active,
            billing_cycle: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
            has_provider_subscription: false,
        }
    }
}

impl From<SubscriptionEntity> for SubscriptionDto {
    fn from(value: SubscriptionEntity) -> Self {
        let has_provider_subscription = value.stripe_subscription_id.is_some();
        Self {
            tier: effective_tier(Some(&value)),
            status: SubscriptionStatus::from_str(&value.status),
            billing_cycle: value.billing_cycle.as_deref().and_then(BillingCycle::from_str),
            current_period_start: value.current_period_start,
            current_period_end: value.current_period_end,
            cancel_at_period_end: value.cancel_at_period_end,
            has_provider_subscription,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub billing_cycle: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionDto {
    pub checkout_url: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SyncResultDto {
    pub tier: SubscriptionTier,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDto {
    pub id: Uuid,
    pub stripe_invoice_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub invoice_pdf: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<InvoiceEntity> for InvoiceDto {
    fn from(value: InvoiceEntity) -> Self {
        Self {
            id: value.id,
            stripe_invoice_id: value.stripe_invoice_id,
            amount_minor: value.amount_minor,
            currency: value.currency,
            status: value.status,
            period_start: value.period_start,
            period_end: value.period_end,
            invoice_pdf: value.invoice_pdf,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentMethodDto {
    pub id: Uuid,
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<i32>,
    pub exp_year: Option<i32>,
    pub is_default: bool,
}

impl From<PaymentMethodEntity> for PaymentMethodDto {
    fn from(value: PaymentMethodEntity) -> Self {
        Self {
            id: value.id,
            brand: value.brand,
            last4: value.last4,
            exp_month: value.exp_month,
            exp_year: value.exp_year,
            is_default: value.is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_prices_and_falls_back_to_free() {
        let catalog = PriceCatalog::new("price_m", "price_y");

        assert_eq!(
            catalog.resolve(Some("price_m")),
            (SubscriptionTier::Premium, Some(BillingCycle::Monthly))
        );
        assert_eq!(
            catalog.resolve(Some("price_y")),
            (SubscriptionTier::Premium, Some(BillingCycle::Yearly))
        );
        assert_eq!(catalog.resolve(Some("price_legacy")), (SubscriptionTier::Free, None));
        assert_eq!(catalog.resolve(None), (SubscriptionTier::Free, None));
    }

    fn row(tier: &str, stripe_subscription_id: Option<&str>) -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tier: tier.to_string(),
            status: "active".to_string(),
            stripe_customer_id: None,
            stripe_subscription_id: stripe_subscription_id.map(str::to_string),
            billing_cycle: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn tier_requires_a_provider_subscription() {
        assert_eq!(effective_tier(None), SubscriptionTier::Free);
        assert_eq!(effective_tier(Some(&row("premium", None))), SubscriptionTier::Free);
        assert_eq!(
            effective_tier(Some(&row("premium", Some("sub_1")))),
            SubscriptionTier::Premium
        );
        assert_eq!(effective_tier(Some(&row("free", Some("sub_1")))), SubscriptionTier::Free);
    }

    #[test]
    fn sync_follows_the_provider_link_only() {
        assert_eq!(sync_tier(None), SubscriptionTier::Free);
        assert_eq!(sync_tier(Some(&row("premium", None))), SubscriptionTier::Free);
        assert_eq!(sync_tier(Some(&row("free", Some("sub_1")))), SubscriptionTier::Premium);
    }

    #[test]
    fn empty_catalog_entry_does_not_match_empty_price() {
        let catalog = PriceCatalog::new("", "price_y");
        assert_eq!(catalog.resolve(Some("")), (SubscriptionTier::Free, None));
    }
}
