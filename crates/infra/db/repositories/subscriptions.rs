use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::subscriptions},
};
use domain::{
    entities::subscriptions::{SubscriptionEntity, UpsertSubscriptionEntity},
    repositories::subscriptions::SubscriptionRepository,
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<SubscriptionEntity>> {
            let mut conn = db_pool.get()?;

            let row = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .select(SubscriptionEntity::as_select())
                .first::<SubscriptionEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn find_by_stripe_subscription_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<SubscriptionEntity>> {
        let stripe_subscription_id = stripe_subscription_id.to_owned();
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<SubscriptionEntity>> {
            let mut conn = db_pool.get()?;

            let row = subscriptions::table
                .filter(subscriptions::stripe_subscription_id.eq(stripe_subscription_id))
                .select(SubscriptionEntity::as_select())
                .first::<SubscriptionEntity>(&mut conn)
                .optional()?;

            Ok(row)
        })
        .await??)
    }

    async fn upsert(&self, subscription: UpsertSubscriptionEntity) -> Result<SubscriptionEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<SubscriptionEntity> {
            let mut conn = db_pool.get()?;

            let row = insert_into(subscriptions::table)
                .values(&subscription)
                .on_conflict(subscriptions::user_id)
                .do_update()
                .set(&subscription)
                .returning(SubscriptionEntity::as_returning())
                .get_result::<SubscriptionEntity>(&mut conn)?;

            Ok(row)
        })
        .await??)
    }

    async fn set_cancel_at_period_end(&self, user_id: Uuid, cancel: bool) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            update(subscriptions::table.filter(subscriptions::user_id.eq(user_id)))
                .set((
                    subscriptions::cancel_at_period_end.eq(cancel),
                    subscriptions::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;

            Ok(())
        })
        .await??)
    }
}
