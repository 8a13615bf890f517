use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::invoices::{InsertInvoiceEntity, InvoiceEntity};

#[automock]
#[async_trait]
pub trait InvoiceRepository {
    async fn create_invoice(&self, invoice: InsertInvoiceEntity) -> Result<Uuid>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<InvoiceEntity>>;
}
