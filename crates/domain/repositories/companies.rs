use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::companies::{CompanyEntity, UpsertCompanyEntity};

#[automock]
#[async_trait]
pub trait CompanyRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<CompanyEntity>>;

    /// Insert, or overwrite the row that already holds `company.slug`.
    async fn upsert_by_slug(&self, company: UpsertCompanyEntity) -> Result<CompanyEntity>;
}
