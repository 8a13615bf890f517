use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Conflict target is `user_id`; there is one row per user.
    async fn upsert(&self, subscription: UpsertSubscriptionEntity) -> Result<SubscriptionEntity>;

    async fn set_cancel_at_period_end(&self, user_id: Uuid, cancel: bool) -> Result<()>;
}
