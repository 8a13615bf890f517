use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::profiles},
};
use domain::{
    entities::profiles::{ProfileEntity, UpdatePreferencesEntity},
    repositories::profiles::ProfileRepository,
    value_objects::enums::{account_statuses::AccountStatus, subscription_tiers::SubscriptionTier},
};

pub struct ProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProfileRepository for ProfilePostgres {
    async fn find(&self, user_id: Uuid) -> Result<Option<ProfileEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ProfileEntity>> {
            let mut conn = db_pool.get()?;

            let row = profiles::table
                .filter(profiles::id.eq(user_id))
                .select(ProfileEntity::as_select())
                .first::<ProfileEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn set_subscription_tier(&self, user_id: Uuid, tier: SubscriptionTier) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(profiles::table.filter(profiles::id.eq(user_id)))
                .set((
                    profiles::subscription_tier.eq(tier.as_str()),
                    profiles::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??)
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: UpdatePreferencesEntity,
    ) -> Result<Option<ProfileEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ProfileEntity>> {
            let mut conn = db_pool.get()?;

            let row = update(profiles::table.filter(profiles::id.eq(user_id)))
                .set(&preferences)
                .returning(ProfileEntity::as_returning())
                .get_result::<ProfileEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn set_account_status(
        &self,
        user_id: Uuid,
        status: AccountStatus,
        deletion_scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ProfileEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ProfileEntity>> {
            let mut conn = db_pool.get()?;

            let row = update(profiles::table.filter(profiles::id.eq(user_id)))
                .set((
                    profiles::account_status.eq(status.to_string()),
                    profiles::deletion_scheduled_at.eq(deletion_scheduled_at),
                    profiles::updated_at.eq(Utc::now()),
                ))
                .returning(ProfileEntity::as_returning())
                .get_result::<ProfileEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }
}
