use anyhow::Result;
use crates::domain::{
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{enums::subscription_tiers::SubscriptionTier, subscriptions::effective_tier},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Reads a user's tier from the subscription row, never from the profile mirror.
pub struct TierResolver<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> TierResolver<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    pub async fn resolve_tier_for_user(&self, user_id: Uuid) -> Result<SubscriptionTier> {
        let subscription = self.subscription_repo.find_by_user(user_id).await?;
        let tier = effective_tier(subscription.as_ref());

        debug!(
            %user_id,
            has_row = subscription.is_some(),
            tier = %tier,
            "tier_resolver: resolved tier"
        );

        Ok(tier)
    }
}
