use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::applications::{
    ApplicationEntity, InsertApplicationEntity, UpdateApplicationEntity,
};
use crate::domain::value_objects::enums::{
    application_statuses::ApplicationStatus, research_statuses::ResearchStatus,
};

#[automock]
#[async_trait]
pub trait ApplicationRepository {
    async fn insert(&self, application: InsertApplicationEntity) -> Result<ApplicationEntity>;

    /// Unscoped lookup, used by background tasks that only carry an id.
    async fn find_by_id(&self, application_id: Uuid) -> Result<Option<ApplicationEntity>>;

    async fn find_by_id_for_user(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> Result<Option<ApplicationEntity>>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ApplicationEntity>>;

    async fn update(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        changes: UpdateApplicationEntity,
    ) -> Result<Option<ApplicationEntity>>;

    async fn update_status(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationEntity>>;

    async fn link_company(&self, application_id: Uuid, company_id: Uuid) -> Result<()>;

    async fn set_research_status(&self, application_id: Uuid, status: ResearchStatus)
    -> Result<()>;

    async fn save_interview_questions(
        &self,
        application_id: Uuid,
        questions: Value,
        generated_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Deletes only rows owned by `user_id`; returns how many went.
    async fn delete_for_user(&self, user_id: Uuid, application_ids: Vec<Uuid>) -> Result<usize>;
}
