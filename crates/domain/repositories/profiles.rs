use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::profiles::{ProfileEntity, UpdatePreferencesEntity};
use crate::domain::value_objects::enums::{
    account_statuses::AccountStatus, subscription_tiers::SubscriptionTier,
};

#[automock]
#[async_trait]
pub trait ProfileRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<ProfileEntity>>;

    async fn set_subscription_tier(&self, user_id: Uuid, tier: SubscriptionTier) -> Result<()>;

    async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: UpdatePreferencesEntity,
    ) -> Result<Option<ProfileEntity>>;

    async fn set_account_status(
        &self,
        user_id: Uuid,
        status: AccountStatus,
        deletion_scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ProfileEntity>>;
}
