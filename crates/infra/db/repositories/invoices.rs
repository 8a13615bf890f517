use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::invoices},
};
use domain::{
    entities::invoices::{InsertInvoiceEntity, InvoiceEntity},
    repositories::invoices::InvoiceRepository,
};

pub struct InvoicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InvoicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InvoiceRepository for InvoicePostgres {
    async fn create_invoice(&self, invoice: InsertInvoiceEntity) -> Result<Uuid> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Uuid> {
            let mut conn = db_pool.get()?;

            let invoice_id = insert_into(invoices::table)
                .values(&invoice)
                .returning(invoices::id)
                .get_result::<Uuid>(&mut conn)?;

            Ok(invoice_id)
        })
        .await??)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<InvoiceEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<InvoiceEntity>> {
            let mut conn = db_pool.get()?;

            let rows = invoices::table
                .filter(invoices::user_id.eq(user_id))
                .order(invoices::created_at.desc())
                .select(InvoiceEntity::as_select())
                .load::<InvoiceEntity>(&mut conn)?;

            Ok(rows)
        })
        .await??)
    }
}
