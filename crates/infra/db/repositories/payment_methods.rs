use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::payment_methods},
};
use domain::{
    entities::payment_methods::PaymentMethodEntity,
    repositories::payment_methods::PaymentMethodRepository,
};

pub struct PaymentMethodPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentMethodPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentMethodRepository for PaymentMethodPostgres {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PaymentMethodEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<PaymentMethodEntity>> {
            let mut conn = db_pool.get()?;

            let rows = payment_methods::table
                .filter(payment_methods::user_id.eq(user_id))
                .order((
                    payment_methods::is_default.desc(),
                    payment_methods::created_at.desc(),
                ))
                .select(PaymentMethodEntity::as_select())
                .load::<PaymentMethodEntity>(&mut conn)?;

            Ok(rows)
        })
        .await??)
    }
}
