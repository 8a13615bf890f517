use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payment_methods::PaymentMethodEntity;

#[automock]
#[async_trait]
pub trait PaymentMethodRepository {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PaymentMethodEntity>>;
}
